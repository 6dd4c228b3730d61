use ahash::AHashMap;

use crate::domain::{ControlCatalogue, ControlMetric, HitRecord};

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    hits: u64,
    fraud: u64,
}

/// Roll hits up into one metric row per control, in catalogue order.
///
/// Controls that never fired still get a row with zero hits and a zero
/// precision proxy. Hit rate is zero for an empty batch.
pub fn aggregate(
    hits: &[HitRecord],
    catalogue: &ControlCatalogue,
    total_transactions: usize,
) -> Vec<ControlMetric> {
    let mut tallies: AHashMap<&str, Tally> = AHashMap::with_capacity(catalogue.len());
    for hit in hits {
        let tally = tallies.entry(hit.control_id.as_str()).or_default();
        tally.hits += 1;
        if hit.is_fraud {
            tally.fraud += 1;
        }
    }

    catalogue
        .iter()
        .map(|control| {
            let tally = tallies.get(control.id.as_str()).copied().unwrap_or_default();
            ControlMetric {
                control_id: control.id.clone(),
                hits: tally.hits,
                hit_rate: ratio(tally.hits, total_transactions as u64),
                precision_proxy: ratio(tally.fraud, tally.hits),
            }
        })
        .collect()
}

#[inline]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, Condition, Control, Rail, RailTarget, TxId};

    fn hit(tx: &str, control: &str, is_fraud: bool) -> HitRecord {
        HitRecord {
            tx_id: TxId::new(tx),
            control_id: control.to_string(),
            rail: Rail::Card,
            action: Action::Review,
            is_fraud,
        }
    }

    fn catalogue(ids: &[&str]) -> ControlCatalogue {
        ControlCatalogue::new(
            ids.iter()
                .map(|id| {
                    Control::new(*id, RailTarget::All, vec![Condition::gt("amount", 0)], Action::Review)
                })
                .collect(),
        )
    }

    #[test]
    fn test_aggregate_counts_and_rates() {
        let hits = vec![
            hit("t1", "c_noisy", false),
            hit("t2", "c_noisy", false),
            hit("t3", "c_noisy", true),
            hit("t4", "c_noisy", false),
            hit("t3", "c_sharp", true),
        ];

        let metrics = aggregate(&hits, &catalogue(&["c_sharp", "c_noisy", "c_quiet"]), 10);

        assert_eq!(metrics.len(), 3);

        assert_eq!(metrics[0].control_id, "c_sharp");
        assert_eq!(metrics[0].hits, 1);
        assert_eq!(metrics[0].hit_rate, 0.1);
        assert_eq!(metrics[0].precision_proxy, 1.0);

        assert_eq!(metrics[1].control_id, "c_noisy");
        assert_eq!(metrics[1].hits, 4);
        assert_eq!(metrics[1].hit_rate, 0.4);
        assert_eq!(metrics[1].precision_proxy, 0.25);

        assert_eq!(metrics[2].control_id, "c_quiet");
        assert_eq!(metrics[2].hits, 0);
        assert_eq!(metrics[2].hit_rate, 0.0);
        assert_eq!(metrics[2].precision_proxy, 0.0);
    }

    #[test]
    fn test_empty_batch_lists_every_control() {
        let metrics = aggregate(&[], &catalogue(&["a", "b"]), 0);

        assert_eq!(metrics.len(), 2);
        for metric in metrics {
            assert_eq!(metric.hits, 0);
            assert_eq!(metric.hit_rate, 0.0);
            assert_eq!(metric.precision_proxy, 0.0);
        }
    }

    #[test]
    fn test_empty_catalogue() {
        let metrics = aggregate(&[hit("t1", "orphan", true)], &ControlCatalogue::empty(), 1);
        assert!(metrics.is_empty());
    }
}
