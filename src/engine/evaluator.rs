use std::mem::discriminant;

use crate::domain::{Condition, Control, Operator, Threshold, Transaction, Value};
use crate::error::SchemaError;

/// What to do when a condition names an attribute the transaction lacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MissingAttributePolicy {
    /// The condition is false (rails carry different attributes)
    #[default]
    NoMatch,
    /// Abort the run with a schema error
    Fail,
}

/// Returns true if `control` matches `tx`.
///
/// The rail filter runs first. Under AND semantics a single false condition,
/// including one on a missing attribute, makes the whole control false.
pub fn matches(tx: &Transaction, control: &Control) -> bool {
    control.rail.covers(tx.rail())
        && control
            .conditions
            .iter()
            .all(|cond| tx.get(cond.field()).is_some_and(|actual| holds(actual, cond)))
}

/// Evaluate `control` against `tx` under an explicit missing-attribute policy.
///
/// Under [`MissingAttributePolicy::Fail`] every attribute the control names
/// must be present on an in-scope transaction, whatever the order of the
/// conditions or the outcome of the other comparisons.
pub fn evaluate(
    tx: &Transaction,
    control: &Control,
    policy: MissingAttributePolicy,
) -> Result<bool, SchemaError> {
    if !control.rail.covers(tx.rail()) {
        return Ok(false);
    }

    if policy == MissingAttributePolicy::Fail {
        if let Some(cond) = control.conditions.iter().find(|c| tx.get(c.field()).is_none()) {
            return Err(SchemaError::MissingAttribute {
                tx_id: tx.id().to_string(),
                control_id: control.id.clone(),
                attribute: cond.field().to_string(),
            });
        }
    }

    Ok(matches(tx, control))
}

/// Compare a present attribute against a condition's threshold.
///
/// Values of different kinds never satisfy a condition, not even `ne`.
#[inline]
fn holds(actual: &Value, cond: &Condition) -> bool {
    match (cond.op(), cond.threshold()) {
        (Operator::In, Threshold::Set(values)) => values.contains(actual),
        (Operator::Eq, Threshold::Scalar(expected)) => actual == expected,
        (Operator::Ne, Threshold::Scalar(expected)) => {
            discriminant(actual) == discriminant(expected) && actual != expected
        }
        (op, Threshold::Scalar(expected)) if op.is_ordering() => {
            match (actual.as_number(), expected.as_number()) {
                (Some(a), Some(b)) => match op {
                    Operator::Gt => a > b,
                    Operator::Gte => a >= b,
                    Operator::Lt => a < b,
                    Operator::Lte => a <= b,
                    _ => false,
                },
                _ => false,
            }
        }
        _ => false,
    }
}
