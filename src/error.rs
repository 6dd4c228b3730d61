use thiserror::Error;

/// Errors raised while loading and validating the control catalogue.
///
/// All of these are fatal: the run does not start.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("control #{index}: missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("control '{control_id}': invalid action '{value}' (expected ALLOW, REVIEW or BLOCK)")]
    InvalidAction { control_id: String, value: String },

    #[error("control '{control_id}': invalid rail '{value}' (expected ACH, CARD, CRYPTO or ALL)")]
    InvalidRail { control_id: String, value: String },

    #[error("control '{control_id}': unsupported operator '{operator}' on '{field}'")]
    UnsupportedOperator {
        control_id: String,
        field: String,
        operator: String,
    },

    #[error("control '{control_id}': invalid threshold for '{field}': {reason}")]
    InvalidThreshold {
        control_id: String,
        field: String,
        reason: String,
    },

    #[error("control '{control_id}': no conditions")]
    EmptyConditions { control_id: String },

    #[error("Duplicate control ID: {0}")]
    DuplicateId(String),
}

/// Structural problems with the transaction batch.
///
/// Any of these aborts the whole batch; no partial tables are produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: invalid value '{value}' for field '{field}'")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("row {row}: numeric value '{value}' for '{field}' is out of range")]
    NumberOutOfRange {
        row: usize,
        field: String,
        value: String,
    },

    #[error("transactions input has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("duplicate transaction id '{0}'")]
    DuplicateTransactionId(String),

    #[error("transaction '{tx_id}' has no attribute '{attribute}' required by control '{control_id}'")]
    MissingAttribute {
        tx_id: String,
        control_id: String,
        attribute: String,
    },
}

/// Errors from the tabular input/output adapters.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
