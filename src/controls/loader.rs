use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::shorthand;
use crate::domain::transaction::parse_decimal;
use crate::domain::{Action, Condition, Control, ControlCatalogue, Operator, RailTarget, Threshold, Value};
use crate::error::ConfigError;

/// Top-level controls document: a bare list, or a versioned mapping.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Versioned {
        #[serde(default)]
        version: Option<String>,
        controls: Vec<RawControl>,
    },
    List(Vec<RawControl>),
}

#[derive(Debug, Deserialize)]
struct RawControl {
    #[serde(default, alias = "control_id")]
    id: Option<String>,
    #[serde(default)]
    rail: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    conditions: Option<RawConditions>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawConditions {
    List(Vec<RawCondition>),
    Shorthand(serde_yaml::Mapping),
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    #[serde(default, alias = "attribute")]
    field: Option<String>,
    #[serde(default, alias = "operator")]
    op: Option<String>,
    #[serde(default, alias = "threshold")]
    value: Option<YamlValue>,
}

/// Load and validate a control catalogue from a YAML file.
pub fn load_controls(path: impl AsRef<Path>) -> Result<ControlCatalogue, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_controls(&content)
}

/// Parse and validate a control catalogue from YAML text.
///
/// Every control is checked here, so evaluation never sees a malformed one.
pub fn parse_controls(yaml: &str) -> Result<ControlCatalogue, ConfigError> {
    let document: RawDocument = serde_yaml::from_str(yaml)?;

    let (version, raw_controls) = match document {
        RawDocument::Versioned { version, controls } => (version, controls),
        RawDocument::List(controls) => (None, controls),
    };

    let controls = raw_controls
        .into_iter()
        .enumerate()
        .map(|(i, raw)| build_control(i + 1, raw))
        .collect::<Result<Vec<_>, _>>()?;

    validate_catalogue(&controls)?;

    for control in &controls {
        debug!(
            control_id = %control.id,
            rail = %control.rail,
            action = %control.action,
            conditions = control.conditions.len(),
            description = %control.description,
            "Loaded control"
        );
    }

    let mut catalogue = ControlCatalogue::new(controls);
    if let Some(version) = version {
        catalogue = catalogue.with_version(version);
    }

    info!(
        controls = catalogue.len(),
        version = catalogue.version().unwrap_or("unversioned"),
        "Control catalogue loaded"
    );

    Ok(catalogue)
}

/// Check for duplicate control IDs.
fn validate_catalogue(controls: &[Control]) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();
    for control in controls {
        if !seen_ids.insert(control.id.as_str()) {
            return Err(ConfigError::DuplicateId(control.id.clone()));
        }
    }
    Ok(())
}

fn build_control(index: usize, raw: RawControl) -> Result<Control, ConfigError> {
    let id = raw
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or(ConfigError::MissingField { index, field: "id" })?;
    let rail_raw = raw
        .rail
        .ok_or(ConfigError::MissingField { index, field: "rail" })?;
    let action_raw = raw
        .action
        .ok_or(ConfigError::MissingField { index, field: "action" })?;
    let raw_conditions = raw
        .conditions
        .ok_or(ConfigError::MissingField { index, field: "conditions" })?;

    let rail = RailTarget::parse(&rail_raw).ok_or_else(|| ConfigError::InvalidRail {
        control_id: id.clone(),
        value: rail_raw.clone(),
    })?;

    let action = Action::parse(&action_raw).ok_or_else(|| ConfigError::InvalidAction {
        control_id: id.clone(),
        value: action_raw.clone(),
    })?;

    let conditions = match raw_conditions {
        RawConditions::List(items) => items
            .into_iter()
            .map(|item| build_condition(index, &id, item))
            .collect::<Result<Vec<_>, _>>()?,
        RawConditions::Shorthand(mapping) => mapping
            .iter()
            .map(|(key, value)| build_shorthand_condition(&id, key, value))
            .collect::<Result<Vec<_>, _>>()?,
    };

    if conditions.is_empty() {
        return Err(ConfigError::EmptyConditions { control_id: id });
    }

    let mut control = Control::new(id, rail, conditions, action);
    if let Some(severity) = raw.severity {
        control = control.with_severity(severity);
    }
    if let Some(description) = raw.description {
        control = control.with_description(description);
    }

    Ok(control)
}

fn build_condition(index: usize, control_id: &str, raw: RawCondition) -> Result<Condition, ConfigError> {
    let field = raw
        .field
        .filter(|f| !f.trim().is_empty())
        .ok_or(ConfigError::MissingField { index, field: "conditions.field" })?;
    let op_raw = raw
        .op
        .ok_or(ConfigError::MissingField { index, field: "conditions.op" })?;
    let value = raw
        .value
        .ok_or(ConfigError::MissingField { index, field: "conditions.value" })?;

    let op = Operator::parse(&op_raw).ok_or_else(|| ConfigError::UnsupportedOperator {
        control_id: control_id.to_string(),
        field: field.clone(),
        operator: op_raw.clone(),
    })?;

    make_condition(control_id, field, op, &value)
}

fn build_shorthand_condition(
    control_id: &str,
    key: &YamlValue,
    value: &YamlValue,
) -> Result<Condition, ConfigError> {
    let key = key.as_str().ok_or_else(|| ConfigError::InvalidThreshold {
        control_id: control_id.to_string(),
        field: format!("{:?}", key),
        reason: "condition keys must be strings".to_string(),
    })?;

    let (field, op) = shorthand::parse_key(key);
    make_condition(control_id, field, op, value)
}

fn make_condition(
    control_id: &str,
    field: String,
    op: Operator,
    value: &YamlValue,
) -> Result<Condition, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidThreshold {
        control_id: control_id.to_string(),
        field: field.clone(),
        reason: reason.to_string(),
    };

    let threshold = to_threshold(op, value).ok_or_else(|| invalid("threshold must be a scalar or a list of scalars"))?;

    Condition::new(field.clone(), op, threshold).map_err(invalid)
}

/// Convert a YAML threshold. Ordering operators accept quoted numbers.
fn to_threshold(op: Operator, value: &YamlValue) -> Option<Threshold> {
    match value {
        YamlValue::Sequence(items) => items
            .iter()
            .map(to_scalar)
            .collect::<Option<Vec<_>>>()
            .map(Threshold::Set),
        other => {
            let scalar = match to_scalar(other)? {
                Value::Text(s) if op.is_ordering() => parse_decimal(s.trim())
                    .map(Value::Number)
                    .unwrap_or(Value::Text(s)),
                scalar => scalar,
            };
            Some(Threshold::Scalar(scalar))
        }
    }
}

fn to_scalar(value: &YamlValue) -> Option<Value> {
    match value {
        YamlValue::Bool(b) => Some(Value::Bool(*b)),
        YamlValue::Number(n) => parse_decimal(&n.to_string()).map(Value::Number),
        YamlValue::String(s) => Some(Value::Text(s.clone())),
        _ => None,
    }
}
