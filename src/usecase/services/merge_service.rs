use std::collections::BTreeMap;

use crate::domain::entities::metric::Metric;
use crate::domain::entities::record::{MergedSource, MetricRecord};
use crate::usecase::services::load_service::MetricColumn;

/// Joins per-metric columns on the product key.
///
/// Keys are the union over every column, ordered by first appearance while
/// walking metrics in canonical order. A metric that has no value for a key
/// (or whose value was unreadable) is zero and marked missing on the record.
pub fn merge(columns: &BTreeMap<Metric, MetricColumn>) -> MergedSource {
    let mut merged = MergedSource::default();
    for column in columns.values() {
        for key in column.keys() {
            if !merged.contains(key) {
                merged.push(MetricRecord::new(key));
            }
        }
    }

    let keys: Vec<String> = merged.iter().map(|r| r.product_key.clone()).collect();
    for key in keys {
        let Some(record) = merged.get_mut(&key) else {
            continue;
        };
        for metric in Metric::ALL {
            match columns.get(&metric).and_then(|column| {
                column
                    .get(&key)
                    .map(|value| (value, column.is_unparsed(&key)))
            }) {
                Some((value, unparsed)) => {
                    record.set(metric, value);
                    if unparsed {
                        record.missing.insert(metric);
                    }
                }
                None => {
                    record.set(metric, 0.0);
                    record.missing.insert(metric);
                }
            }
        }
    }
    merged
}
