use ahash::AHashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Rail;
use crate::error::SchemaError;

/// Column holding the transaction identifier.
pub const TX_ID: &str = "tx_id";
/// Column holding the rail.
pub const RAIL: &str = "rail";
/// Column holding the amount. Also addressable as an attribute.
pub const AMOUNT: &str = "amount";
/// Column holding the synthetic fraud label.
pub const FRAUD_LABEL: &str = "is_fraud_pattern";
/// Accepted alternative name for the fraud label column.
pub const FRAUD_LABEL_ALIAS: &str = "is_fraud";

/// Unique transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        TxId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single risk attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Number(Decimal),
    Bool(bool),
    Text(String),
}

impl Value {
    /// Interpret a raw tabular cell.
    ///
    /// Empty cells are absent. `true`/`false` in any case load as booleans,
    /// decimal numerals (plain or scientific) as numbers, everything else as
    /// text. A numeral that does not fit in a [`Decimal`] is an error rather
    /// than text.
    pub fn from_cell(raw: &str) -> Result<Option<Value>, OutOfRange> {
        let cell = raw.trim();
        if cell.is_empty() {
            return Ok(None);
        }
        if let Some(b) = parse_bool(cell) {
            return Ok(Some(Value::Bool(b)));
        }
        if let Some(n) = parse_number(cell)? {
            return Ok(Some(Value::Number(n)));
        }
        Ok(Some(Value::Text(cell.to_string())))
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Parse `true`/`false` (any case).
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// A well-formed numeral outside the range or precision of [`Decimal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange;

/// Parse a plain or scientific-notation decimal numeral.
///
/// Only `[+-]digits[.digits][(e|E)[+-]digits]` is a numeral; anything else
/// (digit-group underscores, `inf`, hex) is `Ok(None)`.
pub(crate) fn parse_number(s: &str) -> Result<Option<Decimal>, OutOfRange> {
    let (sign, unsigned) = match s.as_bytes().first() {
        Some(b'-') => ("-", &s[1..]),
        Some(b'+') => ("", &s[1..]),
        _ => ("", s),
    };
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(i) => (&unsigned[..i], Some(&unsigned[i + 1..])),
        None => (unsigned, None),
    };
    let (int, frac) = match mantissa.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (mantissa, None),
    };
    let exponent = exponent.map(|e| e.strip_prefix('+').unwrap_or(e));

    let numeral = is_digits(int)
        && frac.map_or(true, is_digits)
        && exponent.map_or(true, |e| is_digits(e.strip_prefix('-').unwrap_or(e)));
    if !numeral {
        return Ok(None);
    }

    let parsed = match exponent {
        None => Decimal::from_str(&format!("{sign}{mantissa}")),
        Some(exp) => Decimal::from_scientific(&format!("{sign}{mantissa}e{exp}")),
    };
    parsed.map(Some).map_err(|_| OutOfRange)
}

/// Parse a numeral, treating out-of-range values like non-numerals.
pub(crate) fn parse_decimal(s: &str) -> Option<Decimal> {
    parse_number(s).ok().flatten()
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// A payment transaction as seen by the controls engine.
///
/// Immutable once built. Risk attributes are a flat name → value mapping;
/// attributes a rail does not carry are simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: TxId,
    rail: Rail,
    amount: Decimal,
    is_fraud: bool,
    attributes: AHashMap<String, Value>,
}

impl Transaction {
    /// Create a transaction with no risk attributes besides `amount`.
    pub fn new(id: impl Into<String>, rail: Rail, amount: Decimal) -> Self {
        let mut attributes = AHashMap::new();
        attributes.insert(AMOUNT.to_string(), Value::Number(amount));

        Transaction {
            id: TxId::new(id),
            rail,
            amount,
            is_fraud: false,
            attributes,
        }
    }

    /// Set the synthetic fraud label.
    pub fn with_fraud_label(mut self, is_fraud: bool) -> Self {
        self.is_fraud = is_fraud;
        self
    }

    /// Add a risk attribute. Setting `amount` to a number also updates the amount.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        if name == AMOUNT {
            match value {
                Value::Number(n) => self.amount = n,
                _ => return self,
            }
        }
        self.attributes.insert(name, value);
        self
    }

    /// Build a transaction from one tabular row.
    ///
    /// `row` is the 1-based data row number used in error messages.
    pub fn from_row<'a, I>(row: usize, fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut id = None;
        let mut rail = None;
        let mut amount = None;
        let mut is_fraud = None;
        let mut attributes = AHashMap::new();

        for (name, raw) in fields {
            let cell = raw.trim();
            match name {
                TX_ID => id = non_empty(cell),
                RAIL => {
                    if let Some(cell) = non_empty(cell) {
                        let parsed = Rail::parse(cell).ok_or_else(|| SchemaError::InvalidField {
                            row,
                            field: RAIL,
                            value: cell.to_string(),
                        })?;
                        rail = Some(parsed);
                    }
                }
                AMOUNT => {
                    if let Some(cell) = non_empty(cell) {
                        let parsed = parse_decimal(cell)
                            .filter(|n| !n.is_sign_negative() || n.is_zero())
                            .ok_or_else(|| SchemaError::InvalidField {
                                row,
                                field: AMOUNT,
                                value: cell.to_string(),
                            })?;
                        amount = Some(parsed);
                    }
                }
                FRAUD_LABEL | FRAUD_LABEL_ALIAS => {
                    if let Some(cell) = non_empty(cell) {
                        let parsed = parse_label(cell).ok_or_else(|| SchemaError::InvalidField {
                            row,
                            field: FRAUD_LABEL,
                            value: cell.to_string(),
                        })?;
                        is_fraud = Some(parsed);
                    }
                }
                _ => {
                    let value = Value::from_cell(cell).map_err(|OutOfRange| {
                        SchemaError::NumberOutOfRange {
                            row,
                            field: name.to_string(),
                            value: cell.to_string(),
                        }
                    })?;
                    if let Some(value) = value {
                        attributes.insert(name.to_string(), value);
                    }
                }
            }
        }

        let id = id.ok_or(SchemaError::MissingField { row, field: TX_ID })?;
        let rail = rail.ok_or(SchemaError::MissingField { row, field: RAIL })?;
        let amount = amount.ok_or(SchemaError::MissingField { row, field: AMOUNT })?;
        let is_fraud = is_fraud.ok_or(SchemaError::MissingField {
            row,
            field: FRAUD_LABEL,
        })?;

        attributes.insert(AMOUNT.to_string(), Value::Number(amount));

        Ok(Transaction {
            id: TxId::new(id),
            rail,
            amount,
            is_fraud,
            attributes,
        })
    }

    pub fn id(&self) -> &TxId {
        &self.id
    }

    pub fn rail(&self) -> Rail {
        self.rail
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Synthetic ground-truth label. Used for metrics only, never for decisioning.
    pub fn is_fraud(&self) -> bool {
        self.is_fraud
    }

    /// Look up a risk attribute. `None` is the missing sentinel.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

fn non_empty(cell: &str) -> Option<&str> {
    if cell.is_empty() {
        None
    } else {
        Some(cell)
    }
}

fn parse_label(cell: &str) -> Option<bool> {
    match cell {
        "1" => Some(true),
        "0" => Some(false),
        _ => parse_bool(cell),
    }
}
