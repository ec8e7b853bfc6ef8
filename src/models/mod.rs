pub mod locators;
pub mod order;

pub use locators::{Locator, SiteLocators};
pub use order::{OrderRecord, REQUIRED_COLUMNS};
