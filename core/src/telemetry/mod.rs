pub mod health;
pub mod log;
pub mod metrics;

pub use self::log::LogObserver;
pub use health::HealthReporter;
pub use metrics::{LinkMetrics, MetricsSnapshot};
