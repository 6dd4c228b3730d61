//! Suffix-keyed condition syntax.
//!
//! Controls may write their conditions as a mapping instead of a list:
//!
//! ```yaml
//! conditions:
//!   amount_gt: 5000
//!   account_age_lt_days: 30
//!   return_code_in: [R01, R10]
//!   funding_speed: instant
//! ```
//!
//! `_gt`, `_gte`, `_lt` and `_lte` (optionally followed by `_days`) select the
//! ordering operators, `_in` selects set membership and any other key is an
//! equality test on the key itself.

use crate::domain::Operator;

const ORDERING_SUFFIXES: [(&str, Operator); 8] = [
    ("_gte_days", Operator::Gte),
    ("_lte_days", Operator::Lte),
    ("_gt_days", Operator::Gt),
    ("_lt_days", Operator::Lt),
    ("_gte", Operator::Gte),
    ("_lte", Operator::Lte),
    ("_gt", Operator::Gt),
    ("_lt", Operator::Lt),
];

/// Split a shorthand key into attribute name and operator.
pub fn parse_key(key: &str) -> (String, Operator) {
    if let Some(field) = key.strip_suffix("_in").filter(|f| !f.is_empty()) {
        return (field.to_string(), Operator::In);
    }

    for (suffix, op) in ORDERING_SUFFIXES {
        if let Some(field) = key.strip_suffix(suffix).filter(|f| !f.is_empty()) {
            return (normalize_field(field), op);
        }
    }

    (key.to_string(), Operator::Eq)
}

/// Age attributes are stored with a `_days` unit suffix.
fn normalize_field(field: &str) -> String {
    match field {
        "account_age" => "account_age_days".to_string(),
        "wallet_age" => "wallet_age_days".to_string(),
        other => other.to_string(),
    }
}
