use rust_decimal::Decimal;
use std::fmt;

use super::{Action, RailTarget, Value};

/// Comparison operator of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Ne,
    In,
}

impl Operator {
    /// Parse an operator name (`gt`, `gte`, ...) or symbol (`>`, `>=`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gt" | ">" => Some(Operator::Gt),
            "gte" | "ge" | ">=" => Some(Operator::Gte),
            "lt" | "<" => Some(Operator::Lt),
            "lte" | "le" | "<=" => Some(Operator::Lte),
            "eq" | "==" | "=" => Some(Operator::Eq),
            "ne" | "neq" | "!=" => Some(Operator::Ne),
            "in" => Some(Operator::In),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::In => "in",
        }
    }

    /// Returns true for the numeric ordering operators.
    #[inline]
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Threshold {
    Scalar(Value),
    Set(Vec<Value>),
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Scalar(v) => v.fmt(f),
            Threshold::Set(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    v.fmt(f)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// One `(attribute, operator, threshold)` test.
///
/// The operator/threshold pairing is checked on construction, so a built
/// condition is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    field: String,
    op: Operator,
    threshold: Threshold,
}

impl Condition {
    /// Build a condition, checking that the threshold suits the operator.
    pub fn new(
        field: impl Into<String>,
        op: Operator,
        threshold: Threshold,
    ) -> Result<Self, &'static str> {
        match (&op, &threshold) {
            (op, Threshold::Scalar(Value::Number(_))) if op.is_ordering() => {}
            (op, _) if op.is_ordering() => return Err("ordering operators need a numeric threshold"),
            (Operator::In, Threshold::Set(_)) => {}
            (Operator::In, Threshold::Scalar(_)) => return Err("'in' needs a list threshold"),
            (_, Threshold::Set(_)) => return Err("only 'in' takes a list threshold"),
            _ => {}
        }

        Ok(Condition {
            field: field.into(),
            op,
            threshold,
        })
    }

    /// `field > n`
    pub fn gt(field: impl Into<String>, n: impl Into<Decimal>) -> Self {
        Self::ordering(field, Operator::Gt, n.into())
    }

    /// `field >= n`
    pub fn gte(field: impl Into<String>, n: impl Into<Decimal>) -> Self {
        Self::ordering(field, Operator::Gte, n.into())
    }

    /// `field < n`
    pub fn lt(field: impl Into<String>, n: impl Into<Decimal>) -> Self {
        Self::ordering(field, Operator::Lt, n.into())
    }

    /// `field <= n`
    pub fn lte(field: impl Into<String>, n: impl Into<Decimal>) -> Self {
        Self::ordering(field, Operator::Lte, n.into())
    }

    /// `field == value`
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition {
            field: field.into(),
            op: Operator::Eq,
            threshold: Threshold::Scalar(value.into()),
        }
    }

    /// `field != value`
    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition {
            field: field.into(),
            op: Operator::Ne,
            threshold: Threshold::Scalar(value.into()),
        }
    }

    /// `field in [values]`
    pub fn one_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        Condition {
            field: field.into(),
            op: Operator::In,
            threshold: Threshold::Set(values),
        }
    }

    fn ordering(field: impl Into<String>, op: Operator, n: Decimal) -> Self {
        Condition {
            field: field.into(),
            op,
            threshold: Threshold::Scalar(Value::Number(n)),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn op(&self) -> Operator {
        self.op
    }

    pub fn threshold(&self) -> &Threshold {
        &self.threshold
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.threshold)
    }
}

/// Default severity label for controls that don't declare one.
pub const DEFAULT_SEVERITY: &str = "MEDIUM";

/// A named risk control: all conditions must hold for the action to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    /// Unique control identifier
    pub id: String,

    /// Rail the control is scoped to
    pub rail: RailTarget,

    /// Conditions, all of which must hold
    pub conditions: Vec<Condition>,

    /// Action applied when the control matches
    pub action: Action,

    /// Free-form severity label (metadata only)
    pub severity: String,

    /// Human-readable description (metadata only)
    pub description: String,
}

impl Control {
    /// Create a control with default metadata.
    pub fn new(
        id: impl Into<String>,
        rail: RailTarget,
        conditions: Vec<Condition>,
        action: Action,
    ) -> Self {
        Control {
            id: id.into(),
            rail,
            conditions,
            action,
            severity: DEFAULT_SEVERITY.to_string(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = severity.into();
        self
    }
}

/// Ordered, validated set of controls for one run.
///
/// Catalogue order is significant: it breaks ties between equally severe
/// matches and fixes the row order of the hits and metrics tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlCatalogue {
    version: Option<String>,
    controls: Vec<Control>,
}

impl ControlCatalogue {
    pub fn new(controls: Vec<Control>) -> Self {
        ControlCatalogue {
            version: None,
            controls,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Create an empty catalogue.
    pub fn empty() -> Self {
        ControlCatalogue::default()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Control> {
        self.controls.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

impl<'a> IntoIterator for &'a ControlCatalogue {
    type Item = &'a Control;
    type IntoIter = std::slice::Iter<'a, Control>;

    fn into_iter(self) -> Self::IntoIter {
        self.controls.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rail;

    #[test]
    fn test_operator_parse() {
        assert_eq!(Operator::parse("gt"), Some(Operator::Gt));
        assert_eq!(Operator::parse(">="), Some(Operator::Gte));
        assert_eq!(Operator::parse("LT"), Some(Operator::Lt));
        assert_eq!(Operator::parse("!="), Some(Operator::Ne));
        assert_eq!(Operator::parse("in"), Some(Operator::In));
        assert_eq!(Operator::parse("contains"), None);
        assert_eq!(Operator::parse("~="), None);
    }

    #[test]
    fn test_condition_threshold_shape() {
        assert!(Condition::new("amount", Operator::Gt, Threshold::Scalar(Value::from(5000_i64))).is_ok());
        assert!(Condition::new("amount", Operator::Gt, Threshold::Scalar(Value::from("big"))).is_err());
        assert!(Condition::new("return_code", Operator::In, Threshold::Scalar(Value::from("R01"))).is_err());
        assert!(Condition::new("return_code", Operator::Eq, Threshold::Set(vec![])).is_err());
        assert!(Condition::new("funding_speed", Operator::Ne, Threshold::Scalar(Value::from("instant"))).is_ok());
    }

    #[test]
    fn test_condition_display() {
        let cond = Condition::gt("amount", 5000);
        assert_eq!(cond.to_string(), "amount gt 5000");

        let cond = Condition::one_of("return_code", vec![Value::from("R01"), Value::from("R10")]);
        assert_eq!(cond.to_string(), "return_code in [R01, R10]");
    }

    #[test]
    fn test_catalogue_lookup_preserves_order() {
        let catalogue = ControlCatalogue::new(vec![
            Control::new("b_second", RailTarget::All, vec![Condition::gt("amount", 1)], Action::Review),
            Control::new("a_first", RailTarget::Only(Rail::Ach), vec![Condition::gt("amount", 2)], Action::Block),
        ])
        .with_version("2025-01");

        let ids: Vec<&str> = catalogue.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b_second", "a_first"]);
        assert_eq!(catalogue.get("a_first").map(|c| c.action), Some(Action::Block));
        assert_eq!(catalogue.version(), Some("2025-01"));
        assert_eq!(catalogue.get("missing"), None);
    }
}
