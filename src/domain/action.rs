use serde::{Deserialize, Serialize};
use std::fmt;

/// Control action with explicit severity ordering.
///
/// Actions are ordered by severity from least to most severe.
/// When multiple controls match a transaction, the most severe action wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Action {
    /// Transaction passes
    Allow = 0,
    /// Transaction is queued for manual review
    Review = 1,
    /// Transaction is stopped
    Block = 2,
}

impl Action {
    /// All actions, least to most severe.
    pub const ALL: [Action; 3] = [Action::Allow, Action::Review, Action::Block];

    /// Parse from string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ALLOW" => Some(Action::Allow),
            "REVIEW" => Some(Action::Review),
            "BLOCK" => Some(Action::Block),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allow => "ALLOW",
            Action::Review => "REVIEW",
            Action::Block => "BLOCK",
        }
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::Allow
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
