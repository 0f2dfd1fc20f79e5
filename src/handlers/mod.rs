mod health;
mod metrics;
mod reason;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use reason::reason_handler;
