/// Alerting: threshold evaluation and handler dispatch.

pub mod dispatch;
pub mod thresholds;

pub use dispatch::{AlertDispatcher, AlertHandler};
pub use thresholds::{Thresholds, evaluate};
