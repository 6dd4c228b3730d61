use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment channel a transaction flows through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rail {
    Ach,
    Card,
    Crypto,
}

impl Rail {
    /// Parse from string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACH" => Some(Rail::Ach),
            "CARD" => Some(Rail::Card),
            "CRYPTO" => Some(Rail::Crypto),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rail::Ach => "ACH",
            Rail::Card => "CARD",
            Rail::Crypto => "CRYPTO",
        }
    }
}

impl fmt::Display for Rail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rail a control applies to: one specific rail, or every rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RailTarget {
    All,
    Only(Rail),
}

impl RailTarget {
    /// Parse `ALL` or a rail name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("ALL") {
            return Some(RailTarget::All);
        }
        Rail::parse(s).map(RailTarget::Only)
    }

    /// Returns true if a transaction on `rail` is in scope.
    #[inline]
    pub fn covers(&self, rail: Rail) -> bool {
        match self {
            RailTarget::All => true,
            RailTarget::Only(target) => *target == rail,
        }
    }
}

impl fmt::Display for RailTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RailTarget::All => f.write_str("ALL"),
            RailTarget::Only(rail) => rail.fmt(f),
        }
    }
}
