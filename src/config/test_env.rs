use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serializes env-var mutation across tests and puts every touched variable
/// back on drop.
pub(super) struct EnvScope {
    _lock: MutexGuard<'static, ()>,
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvScope {
    pub(super) fn new() -> Self {
        Self {
            _lock: ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner),
            saved: Vec::new(),
        }
    }

    pub(super) fn set(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.remember(key);
        // SAFETY: ENV_LOCK is held for the scope's lifetime.
        unsafe { std::env::set_var(key, value) };
        self
    }

    pub(super) fn unset(&mut self, key: &'static str) -> &mut Self {
        self.remember(key);
        // SAFETY: as above.
        unsafe { std::env::remove_var(key) };
        self
    }

    fn remember(&mut self, key: &'static str) {
        if !self.saved.iter().any(|(k, _)| *k == key) {
            self.saved.push((key, std::env::var(key).ok()));
        }
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            // SAFETY: the lock is released only after this loop.
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
