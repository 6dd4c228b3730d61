pub mod batch;
pub mod evaluator;
pub mod metrics;
pub mod resolver;

pub use batch::{run, run_with, BatchOutput};
pub use evaluator::{evaluate, matches, MissingAttributePolicy};
pub use metrics::aggregate;
pub use resolver::{resolve, resolve_with};

#[cfg(test)]
mod properties;
