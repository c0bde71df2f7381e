use crate::domain::entities::metric::Metric;
use crate::domain::entities::record::MetricRecord;
use crate::domain::entities::source::Source;

pub const KEY_HEADER: &str = "Product";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrigin {
    Source(Source),
    Others,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub origin: RowOrigin,
    pub record: MetricRecord,
}

/// Selected Kategori rows, then selected Format rows, then the Others row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayTable {
    pub rows: Vec<DisplayRow>,
}

impl DisplayTable {
    pub fn columns() -> Vec<&'static str> {
        std::iter::once(KEY_HEADER)
            .chain(Metric::ALL.into_iter().map(Metric::label))
            .collect()
    }

    pub fn count(&self, origin: RowOrigin) -> usize {
        self.rows.iter().filter(|row| row.origin == origin).count()
    }

    pub fn others(&self) -> Option<&MetricRecord> {
        self.rows
            .iter()
            .find(|row| row.origin == RowOrigin::Others)
            .map(|row| &row.record)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.record.product_key.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
