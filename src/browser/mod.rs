mod catalog;
mod chromium;
mod locator;
#[cfg(test)]
pub(crate) mod sim;
mod traits;
mod urls;
mod wait;


pub use catalog::SiteLocators;
pub use chromium::ChromiumDriver;
pub use locator::{Locator, LocatorChain, Resolution};
pub use traits::{Key, UiDriver, UiFuture};
pub use urls::{bin_id_from_url, is_authenticated_url, is_bin_url};
pub use wait::{UrlWait, wait_for_url};
