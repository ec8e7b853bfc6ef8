pub mod archiver;
pub mod failure_log;
pub mod navigation;
pub mod order_source;
pub mod pdf_embed;
pub mod receipt_capture;

pub use archiver::Archiver;
pub use failure_log::FailureLog;
pub use navigation::NavigationController;
pub use order_source::{parse_orders, OrderSource};
pub use receipt_capture::ReceiptCapture;
