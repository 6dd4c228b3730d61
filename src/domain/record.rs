use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Action, Rail, TxId};

/// Control ids matched by one transaction. Most transactions match few.
pub type MatchedControls = SmallVec<[String; 4]>;

/// Final outcome for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub tx_id: TxId,

    pub rail: Rail,

    /// Most severe action among matching controls, ALLOW if none matched
    pub action: Action,

    /// Control that determined the action, if any matched
    pub determined_by: Option<String>,

    /// Every matching control id, in catalogue order
    pub matched: MatchedControls,
}

impl DecisionRecord {
    /// Decision for a transaction no control matched.
    pub fn allow(tx_id: TxId, rail: Rail) -> Self {
        DecisionRecord {
            tx_id,
            rail,
            action: Action::Allow,
            determined_by: None,
            matched: SmallVec::new(),
        }
    }

    /// Returns true if at least one control matched.
    pub fn is_hit(&self) -> bool {
        !self.matched.is_empty()
    }
}

/// One (transaction, matching control) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitRecord {
    pub tx_id: TxId,

    pub control_id: String,

    pub rail: Rail,

    /// Action of this control (not necessarily the final action)
    pub action: Action,

    /// Fraud label carried through for metrics
    pub is_fraud: bool,
}

/// Per-control monitoring summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMetric {
    pub control_id: String,

    /// Number of hit records for this control
    pub hits: u64,

    /// hits / batch size
    pub hit_rate: f64,

    /// Share of hits carrying the fraud label; 0 when there are no hits
    pub precision_proxy: f64,
}
