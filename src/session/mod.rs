pub mod manager;


pub use manager::{LoginEntry, Session, SessionManager};
