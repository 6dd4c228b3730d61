pub mod metrics;
pub mod tracing;

pub use metrics::RunStats;
pub use self::tracing::init_tracing;
