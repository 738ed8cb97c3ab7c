mod chrome;
mod chromium;
mod request;

pub use chrome::{BrowserLauncher, BrowserSession, ChromeFetcher};
pub use chromium::ChromiumLauncher;
pub use request::RequestFetcher;
