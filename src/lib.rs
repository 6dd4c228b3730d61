pub mod config;
pub mod controls;
pub mod domain;
pub mod engine;
pub mod error;
pub mod observability;
pub mod tables;

pub use config::Config;
pub use domain::{Action, Control, ControlCatalogue, DecisionRecord, HitRecord, Transaction};
pub use engine::{aggregate, resolve, run, BatchOutput};
pub use error::{ConfigError, SchemaError, TableError};
