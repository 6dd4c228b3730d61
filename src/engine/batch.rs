use ahash::AHashSet;
use tracing::{debug, trace};

use super::evaluator::MissingAttributePolicy;
use super::resolver::resolve_with;
use crate::domain::{ControlCatalogue, DecisionRecord, HitRecord, Transaction};
use crate::error::SchemaError;

/// Decisions and hits for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutput {
    /// One row per input transaction, in input order
    pub decisions: Vec<DecisionRecord>,

    /// One row per (transaction, matching control), input order then catalogue order
    pub hits: Vec<HitRecord>,
}

impl BatchOutput {
    /// Number of transactions decided.
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

/// Decide every transaction in the batch with the default (no-match) policy.
pub fn run(
    transactions: &[Transaction],
    catalogue: &ControlCatalogue,
) -> Result<BatchOutput, SchemaError> {
    run_with(transactions, catalogue, MissingAttributePolicy::NoMatch)
}

/// Decide every transaction in the batch.
///
/// Fails before producing any output if transaction ids are not unique, and
/// aborts on the first schema error; a partially decided batch is never
/// returned.
pub fn run_with(
    transactions: &[Transaction],
    catalogue: &ControlCatalogue,
    policy: MissingAttributePolicy,
) -> Result<BatchOutput, SchemaError> {
    check_unique_ids(transactions)?;

    let mut output = BatchOutput {
        decisions: Vec::with_capacity(transactions.len()),
        hits: Vec::new(),
    };

    for tx in transactions {
        let (decision, hits) = resolve_with(tx, catalogue, policy)?;

        if decision.is_hit() {
            debug!(
                tx_id = %decision.tx_id,
                rail = %decision.rail,
                action = %decision.action,
                determined_by = decision.determined_by.as_deref().unwrap_or(""),
                matched = decision.matched.len(),
                "Controls matched"
            );
        } else {
            trace!(tx_id = %decision.tx_id, "No controls matched");
        }

        output.decisions.push(decision);
        output.hits.extend(hits);
    }

    Ok(output)
}

fn check_unique_ids(transactions: &[Transaction]) -> Result<(), SchemaError> {
    let mut seen = AHashSet::with_capacity(transactions.len());
    for tx in transactions {
        if !seen.insert(tx.id().as_str()) {
            return Err(SchemaError::DuplicateTransactionId(tx.id().to_string()));
        }
    }
    Ok(())
}
