pub mod dispatcher;
pub mod math;
pub mod metrics;
pub mod providers;

pub use dispatcher::Dispatcher;
pub use metrics::{get_metrics, init_metrics};
