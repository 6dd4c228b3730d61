use std::convert::Infallible;

use super::evaluator::{evaluate, matches, MissingAttributePolicy};
use crate::domain::{Control, ControlCatalogue, DecisionRecord, HitRecord, MatchedControls, Transaction};
use crate::error::SchemaError;

/// Run every control against `tx` and pick the final action.
///
/// The most severe matching action wins; among equally severe matches the
/// control listed first in the catalogue determines the decision. One hit is
/// emitted per matching control, in catalogue order.
pub fn resolve(tx: &Transaction, catalogue: &ControlCatalogue) -> (DecisionRecord, Vec<HitRecord>) {
    match resolve_by(tx, catalogue, |control| Ok::<_, Infallible>(matches(tx, control))) {
        Ok(resolution) => resolution,
        Err(never) => match never {},
    }
}

/// Like [`resolve`], with an explicit missing-attribute policy.
pub fn resolve_with(
    tx: &Transaction,
    catalogue: &ControlCatalogue,
    policy: MissingAttributePolicy,
) -> Result<(DecisionRecord, Vec<HitRecord>), SchemaError> {
    resolve_by(tx, catalogue, |control| evaluate(tx, control, policy))
}

fn resolve_by<E, F>(
    tx: &Transaction,
    catalogue: &ControlCatalogue,
    mut is_match: F,
) -> Result<(DecisionRecord, Vec<HitRecord>), E>
where
    F: FnMut(&Control) -> Result<bool, E>,
{
    let mut decision = DecisionRecord::allow(tx.id().clone(), tx.rail());
    let mut hits = Vec::new();
    let mut matched = MatchedControls::new();
    let mut winner: Option<&Control> = None;

    for control in catalogue {
        if !is_match(control)? {
            continue;
        }

        // strictly greater keeps the earliest control on ties
        if winner.map_or(true, |w| control.action > w.action) {
            winner = Some(control);
        }

        matched.push(control.id.clone());
        hits.push(HitRecord {
            tx_id: tx.id().clone(),
            control_id: control.id.clone(),
            rail: tx.rail(),
            action: control.action,
            is_fraud: tx.is_fraud(),
        });
    }

    if let Some(control) = winner {
        decision.action = control.action;
        decision.determined_by = Some(control.id.clone());
    }
    decision.matched = matched;

    Ok((decision, hits))
}
