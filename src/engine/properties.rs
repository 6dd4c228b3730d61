//! Property-based tests for the engine.
//!
//! These use proptest to check, over random catalogues and batches:
//! - the final action is the most severe matching action
//! - decisions and hits agree per transaction
//! - metrics agree with the hits table
//! - repeated runs are identical

use super::{aggregate, run};
use crate::domain::{
    Action, Condition, Control, ControlCatalogue, Operator, Rail, RailTarget, Threshold,
    Transaction, Value,
};
use ahash::AHashMap;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn arb_rail() -> impl Strategy<Value = Rail> {
    prop_oneof![Just(Rail::Ach), Just(Rail::Card), Just(Rail::Crypto)]
}

fn arb_target() -> impl Strategy<Value = RailTarget> {
    prop_oneof![
        1 => Just(RailTarget::All),
        3 => arb_rail().prop_map(RailTarget::Only),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![Just(Action::Review), Just(Action::Block)]
}

fn arb_condition() -> impl Strategy<Value = Condition> {
    let field = prop_oneof![Just("amount"), Just("risk_score"), Just("account_age_days")];
    let op = prop_oneof![
        Just(Operator::Gt),
        Just(Operator::Gte),
        Just(Operator::Lt),
        Just(Operator::Lte),
        Just(Operator::Eq),
        Just(Operator::Ne),
    ];
    (field, op, 0i64..100).prop_map(|(field, op, n)| {
        Condition::new(field, op, Threshold::Scalar(Value::from(n)))
            .expect("numeric thresholds suit every scalar operator")
    })
}

fn arb_catalogue() -> impl Strategy<Value = ControlCatalogue> {
    prop::collection::vec(
        (arb_target(), prop::collection::vec(arb_condition(), 1..3), arb_action()),
        0..8,
    )
    .prop_map(|defs| {
        ControlCatalogue::new(
            defs.into_iter()
                .enumerate()
                .map(|(i, (rail, conditions, action))| {
                    Control::new(format!("control_{i}"), rail, conditions, action)
                })
                .collect(),
        )
    })
}

fn arb_batch() -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(
        (
            arb_rail(),
            0i64..100,
            prop::option::of(0i64..100),
            prop::option::of(0i64..100),
            any::<bool>(),
        ),
        0..30,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (rail, amount, score, age, is_fraud))| {
                let mut tx = Transaction::new(format!("tx_{i:06}"), rail, Decimal::from(amount))
                    .with_fraud_label(is_fraud);
                if let Some(score) = score {
                    tx = tx.with_attribute("risk_score", score);
                }
                if let Some(age) = age {
                    tx = tx.with_attribute("account_age_days", age);
                }
                tx
            })
            .collect()
    })
}

proptest! {
    /// The final action is the most severe matching action, ALLOW when nothing matched.
    #[test]
    fn final_action_is_most_severe_match(catalogue in arb_catalogue(), batch in arb_batch()) {
        let output = run(&batch, &catalogue).unwrap();

        for decision in &output.decisions {
            let strongest = decision
                .matched
                .iter()
                .filter_map(|id| catalogue.get(id))
                .map(|c| c.action)
                .max();

            match strongest {
                None => {
                    prop_assert_eq!(decision.action, Action::Allow);
                    prop_assert!(decision.determined_by.is_none());
                }
                Some(action) => {
                    prop_assert_eq!(decision.action, action);
                    let winner = decision.determined_by.as_deref().and_then(|id| catalogue.get(id));
                    prop_assert_eq!(winner.map(|c| c.action), Some(action));

                    // first matching control with the top action
                    let first = decision
                        .matched
                        .iter()
                        .find(|id| catalogue.get(id).map(|c| c.action) == Some(action));
                    prop_assert_eq!(first.map(|s| s.as_str()), decision.determined_by.as_deref());
                }
            }

            let any_block = decision
                .matched
                .iter()
                .any(|id| catalogue.get(id).map(|c| c.action) == Some(Action::Block));
            prop_assert_eq!(decision.action == Action::Block, any_block);
        }
    }

    /// Matched ids on a decision equal the hit rows for that transaction.
    #[test]
    fn decisions_and_hits_agree(catalogue in arb_catalogue(), batch in arb_batch()) {
        let output = run(&batch, &catalogue).unwrap();
        prop_assert_eq!(output.decisions.len(), batch.len());

        let mut by_tx: AHashMap<&str, Vec<&str>> = AHashMap::new();
        for hit in &output.hits {
            by_tx.entry(hit.tx_id.as_str()).or_default().push(hit.control_id.as_str());
        }

        for decision in &output.decisions {
            let from_hits = by_tx.remove(decision.tx_id.as_str()).unwrap_or_default();
            let from_decision: Vec<&str> = decision.matched.iter().map(|s| s.as_str()).collect();
            prop_assert_eq!(from_hits, from_decision);
        }
        prop_assert!(by_tx.is_empty());
    }

    /// Metric rows match the hits table, and the precision proxy stays in range.
    #[test]
    fn metrics_agree_with_hits(catalogue in arb_catalogue(), batch in arb_batch()) {
        let output = run(&batch, &catalogue).unwrap();
        let metrics = aggregate(&output.hits, &catalogue, batch.len());

        prop_assert_eq!(metrics.len(), catalogue.len());
        for (metric, control) in metrics.iter().zip(catalogue.iter()) {
            prop_assert_eq!(&metric.control_id, &control.id);

            let rows = output.hits.iter().filter(|h| h.control_id == control.id).count() as u64;
            prop_assert_eq!(metric.hits, rows);

            prop_assert!((0.0..=1.0).contains(&metric.precision_proxy));
            prop_assert!((0.0..=1.0).contains(&metric.hit_rate));
            if metric.hits == 0 {
                prop_assert_eq!(metric.precision_proxy, 0.0);
            }
        }
    }

    /// Identical input gives identical output.
    #[test]
    fn runs_are_deterministic(catalogue in arb_catalogue(), batch in arb_batch()) {
        let first = run(&batch, &catalogue).unwrap();
        let second = run(&batch, &catalogue).unwrap();
        prop_assert_eq!(&first, &second);

        let first_metrics = aggregate(&first.hits, &catalogue, batch.len());
        let second_metrics = aggregate(&second.hits, &catalogue, batch.len());
        prop_assert_eq!(first_metrics, second_metrics);
    }
}
