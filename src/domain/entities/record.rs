use std::collections::{BTreeSet, HashMap};

use crate::domain::entities::metric::Metric;

pub const OTHERS_KEY: &str = "Others";

/// One product row with every canonical metric filled in.
///
/// Values that were absent or unparseable in the extract are stored as zero
/// and the metric is listed in `missing`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricRecord {
    pub product_key: String,
    pub contribution: f64,
    pub value_mtd: f64,
    pub value_ytd: f64,
    pub growth_mtd: f64,
    pub growth_l3m: f64,
    pub growth_ytd: f64,
    pub achievement_mtd: f64,
    pub achievement_ytd: f64,
    pub missing: BTreeSet<Metric>,
}

impl MetricRecord {
    pub fn new(product_key: impl Into<String>) -> Self {
        Self {
            product_key: product_key.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Contribution => self.contribution,
            Metric::ValueMtd => self.value_mtd,
            Metric::ValueYtd => self.value_ytd,
            Metric::GrowthMtd => self.growth_mtd,
            Metric::GrowthL3m => self.growth_l3m,
            Metric::GrowthYtd => self.growth_ytd,
            Metric::AchievementMtd => self.achievement_mtd,
            Metric::AchievementYtd => self.achievement_ytd,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::Contribution => &mut self.contribution,
            Metric::ValueMtd => &mut self.value_mtd,
            Metric::ValueYtd => &mut self.value_ytd,
            Metric::GrowthMtd => &mut self.growth_mtd,
            Metric::GrowthL3m => &mut self.growth_l3m,
            Metric::GrowthYtd => &mut self.growth_ytd,
            Metric::AchievementMtd => &mut self.achievement_mtd,
            Metric::AchievementYtd => &mut self.achievement_ytd,
        };
        *slot = value;
    }

    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set(metric, value);
        self
    }

    pub fn values(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.into_iter().map(move |m| (m, self.get(m)))
    }

    pub fn has_missing_data(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Merged records of one source, in first-seen key order.
#[derive(Debug, Clone, Default)]
pub struct MergedSource {
    records: Vec<MetricRecord>,
    index: HashMap<String, usize>,
}

impl MergedSource {
    /// Returns false and leaves the set untouched when the key is already present.
    pub fn push(&mut self, record: MetricRecord) -> bool {
        if self.index.contains_key(&record.product_key) {
            return false;
        }
        self.index
            .insert(record.product_key.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn get(&self, key: &str) -> Option<&MetricRecord> {
        self.index.get(key).map(|&idx| &self.records[idx])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut MetricRecord> {
        match self.index.get(key) {
            Some(&idx) => self.records.get_mut(idx),
            None => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetricRecord> {
        self.records.iter()
    }

    pub fn keys(&self) -> BTreeSet<String> {
        self.index.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<MetricRecord> for MergedSource {
    fn from_iter<I: IntoIterator<Item = MetricRecord>>(iter: I) -> Self {
        let mut merged = MergedSource::default();
        for record in iter {
            merged.push(record);
        }
        merged
    }
}
