use std::path::PathBuf;

use clap::Parser;

use crate::engine::MissingAttributePolicy;

/// Controls engine configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "railctl")]
#[command(about = "Evaluate payment risk controls over a transaction batch")]
pub struct Config {
    /// Path to the controls YAML file
    #[arg(long, default_value = "controls/controls.yaml", env = "RAILCTL_CONTROLS_PATH")]
    pub controls_path: PathBuf,

    /// Path to the transactions CSV file
    #[arg(
        long,
        default_value = "data/combined_transactions.csv",
        env = "RAILCTL_TRANSACTIONS_PATH"
    )]
    pub transactions_path: PathBuf,

    /// Directory the decisions, hits and metrics tables are written to
    #[arg(long, default_value = "data", env = "RAILCTL_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// How a condition on an attribute the transaction lacks is treated
    #[arg(
        long,
        value_enum,
        default_value_t = MissingAttributePolicy::NoMatch,
        env = "RAILCTL_MISSING_ATTRIBUTE"
    )]
    pub missing_attribute: MissingAttributePolicy,

    /// Write run statistics in Prometheus text format to this file (optional)
    #[arg(long, env = "RAILCTL_METRICS_PATH")]
    pub metrics_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, default_value = "false", env = "RAILCTL_LOG_JSON")]
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            controls_path: PathBuf::from("controls/controls.yaml"),
            transactions_path: PathBuf::from("data/combined_transactions.csv"),
            output_dir: PathBuf::from("data"),
            missing_attribute: MissingAttributePolicy::NoMatch,
            metrics_path: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}
