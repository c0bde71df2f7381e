use std::collections::BTreeSet;

use crate::domain::entities::metric::Metric;
use crate::domain::entities::record::{MergedSource, MetricRecord, OTHERS_KEY};

/// Sums every metric over the Format rows the user did not select.
///
/// Percentage metrics are summed as-is, not weighted by value. Returns
/// `None` when nothing is left unselected.
pub fn others(format: &MergedSource, selected: &BTreeSet<String>) -> Option<MetricRecord> {
    let mut unselected = format
        .iter()
        .filter(|record| !selected.contains(&record.product_key))
        .peekable();
    unselected.peek()?;

    let mut totals = MetricRecord::new(OTHERS_KEY);
    for record in unselected {
        for (metric, value) in record.values() {
            totals.set(metric, totals.get(metric) + value);
        }
    }
    for metric in Metric::ALL {
        totals.set(metric, metric.kind().round(totals.get(metric)));
    }
    Some(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_source() -> MergedSource {
        [
            MetricRecord::new("A")
                .with(Metric::Contribution, 10.0)
                .with(Metric::ValueMtd, 100.0),
            MetricRecord::new("B")
                .with(Metric::Contribution, 20.0)
                .with(Metric::ValueMtd, 200.0),
            MetricRecord::new("C")
                .with(Metric::Contribution, 5.0)
                .with(Metric::ValueMtd, 50.0),
        ]
        .into_iter()
        .collect()
    }

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn others_sums_the_unselected_rows() {
        let others = others(&format_source(), &keys(&["A"])).expect("others should exist");

        assert_eq!(others.product_key, OTHERS_KEY);
        assert_eq!(others.contribution, 25.0);
        assert_eq!(others.value_mtd, 250.0);
        assert_eq!(others.growth_ytd, 0.0);
    }

    #[test]
    fn no_others_when_everything_is_selected() {
        assert!(others(&format_source(), &keys(&["A", "B", "C"])).is_none());
        assert!(others(&MergedSource::default(), &BTreeSet::new()).is_none());
    }

    #[test]
    fn stale_selected_keys_do_not_hide_unselected_rows() {
        let others = others(&format_source(), &keys(&["A", "B", "Z"])).expect("C is unselected");
        assert_eq!(others.value_mtd, 50.0);
    }

    #[test]
    fn percentage_sums_are_not_weighted() {
        let source: MergedSource = [
            MetricRecord::new("A")
                .with(Metric::GrowthMtd, 0.1)
                .with(Metric::ValueMtd, 1.0),
            MetricRecord::new("B")
                .with(Metric::GrowthMtd, 0.2)
                .with(Metric::ValueMtd, 1000.0),
        ]
        .into_iter()
        .collect();

        let others = others(&source, &BTreeSet::new()).expect("others should exist");

        assert_eq!(others.growth_mtd, 0.3);
    }
}
