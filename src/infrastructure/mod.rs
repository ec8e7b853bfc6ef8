//! 基础设施层：持有页面资源，只暴露能力

pub mod chromium_page;
pub mod page_driver;
pub mod ui_actions;

pub use chromium_page::ChromiumPage;
pub use page_driver::PageDriver;
pub use ui_actions::UiActions;
