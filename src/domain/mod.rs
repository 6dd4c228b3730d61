pub mod action;
pub mod control;
pub mod rail;
pub mod record;
pub mod transaction;

pub use action::Action;
pub use control::{Condition, Control, ControlCatalogue, Operator, Threshold};
pub use rail::{Rail, RailTarget};
pub use record::{ControlMetric, DecisionRecord, HitRecord, MatchedControls};
pub use transaction::{Transaction, TxId, Value};
