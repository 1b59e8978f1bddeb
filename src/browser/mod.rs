//! Browser control over the W3C WebDriver protocol

pub mod locator;
pub mod session;

pub use locator::Locator;
pub use session::{Browser, BrowserConfig, ElementHandle, PageInfo, WebDriverSession};
