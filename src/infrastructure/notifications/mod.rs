//! Customer notification adapters

mod log_notifier;

pub use log_notifier::{render_message, LogNotifier};
