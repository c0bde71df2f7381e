use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use tracing::{debug, warn};

use crate::config::{LoadPolicy, MetricMapping};
use crate::domain::entities::metric::Metric;
use crate::domain::entities::sheet::{ExtractBook, SheetTable};
use crate::domain::entities::source::Source;
use crate::domain::parse::ValueParser;
use crate::error::ReportError;

/// Recovered problems found while loading; none of these stop a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadIssue {
    Unparsed {
        source: Source,
        metric: Metric,
        key: String,
    },
    DuplicateKey {
        source: Source,
        metric: Metric,
        key: String,
    },
    MetricOmitted {
        source: Source,
        metric: Metric,
        reason: String,
    },
    /// A product key that clashes with the aggregate row label.
    ReservedKey { source: Source, key: String },
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadIssue::Unparsed {
                source,
                metric,
                key,
            } => write!(f, "{source}/{metric}: unreadable value for {key}, using 0"),
            LoadIssue::DuplicateKey {
                source,
                metric,
                key,
            } => write!(f, "{source}/{metric}: duplicate key {key}, keeping first row"),
            LoadIssue::MetricOmitted {
                source,
                metric,
                reason,
            } => write!(f, "{source}/{metric}: omitted ({reason})"),
            LoadIssue::ReservedKey { source, key } => {
                write!(f, "{source}: product {key} shares the aggregate row label")
            }
        }
    }
}

/// `(key, value)` pairs of one metric, in sheet order.
///
/// Unreadable values are stored as zero and remembered in `unparsed`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricColumn {
    keys: Vec<String>,
    values: HashMap<String, f64>,
    unparsed: HashSet<String>,
    duplicates: Vec<String>,
}

impl MetricColumn {
    pub fn insert(&mut self, key: String, value: Option<f64>) -> bool {
        if self.values.contains_key(&key) {
            self.duplicates.push(key);
            return false;
        }
        if value.is_none() {
            self.unparsed.insert(key.clone());
        }
        self.values.insert(key.clone(), value.unwrap_or(0.0));
        self.keys.push(key);
        true
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn is_unparsed(&self, key: &str) -> bool {
        self.unparsed.contains(key)
    }

    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for MetricColumn {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut column = MetricColumn::default();
        for (key, value) in iter {
            column.insert(key.into(), Some(value));
        }
        column
    }
}

/// Reads one metric from `table`.
///
/// `row_skip` rows are skipped, the next row is the header, and every row
/// after it with a non-empty key contributes one value.
pub fn load_metric(
    table: &SheetTable,
    key_column: &str,
    value_column: &str,
    row_skip: usize,
    parser: ValueParser,
) -> Result<MetricColumn, ReportError> {
    let column_error = |column: &str| ReportError::ColumnNotFound {
        sheet: table.name.clone(),
        column: column.to_string(),
    };
    let key_idx = table
        .column_index(row_skip, key_column)
        .ok_or_else(|| column_error(key_column))?;
    let value_idx = table
        .column_index(row_skip, value_column)
        .ok_or_else(|| column_error(value_column))?;

    let mut column = MetricColumn::default();
    for row in table.rows.iter().skip(row_skip + 1) {
        let Some(key) = row.get(key_idx).and_then(|cell| cell.as_key()) else {
            continue;
        };
        let value = row.get(value_idx).and_then(|cell| parser.parse(cell));
        column.insert(key, value);
    }
    Ok(column)
}

/// Checks every mapping against the extract without loading values.
pub fn validate_mappings(book: &ExtractBook, mappings: &[MetricMapping]) -> Vec<ReportError> {
    let mut problems = Vec::new();
    for mapping in mappings {
        let Some(table) = book.sheet(&mapping.sheet) else {
            problems.push(ReportError::SheetNotFound {
                sheet: mapping.sheet.clone(),
            });
            continue;
        };
        for column in [&mapping.key_column, &mapping.value_column] {
            if table.column_index(mapping.row_skip, column).is_none() {
                problems.push(ReportError::ColumnNotFound {
                    sheet: mapping.sheet.clone(),
                    column: column.clone(),
                });
            }
        }
    }
    problems
}

#[derive(Debug, Clone, Default)]
pub struct SourceLoad {
    pub columns: BTreeMap<Metric, MetricColumn>,
    pub issues: Vec<LoadIssue>,
}

pub fn load_source(
    book: &ExtractBook,
    source: Source,
    mappings: &[MetricMapping],
    policy: LoadPolicy,
) -> Result<SourceLoad, ReportError> {
    let mut load = SourceLoad::default();

    for mapping in mappings {
        let loaded = book
            .sheet(&mapping.sheet)
            .ok_or_else(|| ReportError::SheetNotFound {
                sheet: mapping.sheet.clone(),
            })
            .and_then(|table| {
                load_metric(
                    table,
                    &mapping.key_column,
                    &mapping.value_column,
                    mapping.row_skip,
                    mapping.parser,
                )
            });

        let column = match loaded {
            Ok(column) => column,
            Err(err) if policy == LoadPolicy::Lenient && err.is_structural() => {
                warn!(%source, metric = %mapping.metric, error = %err, "metric omitted");
                load.issues.push(LoadIssue::MetricOmitted {
                    source,
                    metric: mapping.metric,
                    reason: err.to_string(),
                });
                continue;
            }
            Err(err) => return Err(err),
        };

        debug!(
            %source,
            metric = %mapping.metric,
            sheet = %mapping.sheet,
            rows = column.len(),
            "metric loaded"
        );

        for key in column.keys() {
            if column.is_unparsed(key) {
                warn!(%source, metric = %mapping.metric, key, "unreadable value");
                load.issues.push(LoadIssue::Unparsed {
                    source,
                    metric: mapping.metric,
                    key: key.to_string(),
                });
            }
        }
        for key in column.duplicates() {
            warn!(%source, metric = %mapping.metric, key = %key, "duplicate key");
            load.issues.push(LoadIssue::DuplicateKey {
                source,
                metric: mapping.metric,
                key: key.clone(),
            });
        }

        load.columns.insert(mapping.metric, column);
    }

    Ok(load)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_mappings;
    use crate::domain::entities::sheet::Cell;

    fn contribution_sheet() -> SheetTable {
        SheetTable::new(
            "Sheet 1",
            vec![
                vec![Cell::text("Exported 2024-03"), Cell::Empty],
                vec![Cell::text("Product P"), Cell::text("Contribution")],
                vec![Cell::text("A"), Cell::text("12.34%")],
                vec![Cell::Empty, Cell::text("99%")],
                vec![Cell::text("B"), Cell::Number(0.1234)],
                vec![Cell::text("C"), Cell::text("-")],
                vec![Cell::text("A"), Cell::text("50%")],
            ],
        )
    }

    #[test]
    fn load_metric_skips_rows_and_drops_empty_keys() {
        let column = load_metric(
            &contribution_sheet(),
            "Product P",
            "Contribution",
            1,
            ValueParser::Percentage,
        )
        .expect("metric should load");

        assert_eq!(column.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(column.get("A"), Some(12.3));
        assert_eq!(column.get("B"), Some(12.3));
        assert_eq!(column.get("C"), Some(0.0));
        assert!(column.is_unparsed("C"));
        assert_eq!(column.duplicates(), ["A".to_string()]);
    }

    #[test]
    fn load_metric_reports_missing_column() {
        let err = load_metric(
            &contribution_sheet(),
            "Product P",
            "vs LY",
            1,
            ValueParser::Percentage,
        )
        .expect_err("missing column should fail");

        assert!(matches!(
            err,
            ReportError::ColumnNotFound { ref sheet, ref column } if sheet == "Sheet 1" && column == "vs LY"
        ));
    }

    #[test]
    fn validate_mappings_lists_every_problem() {
        let book = ExtractBook::new("fmt.xlsx", vec![contribution_sheet()]);
        let mut mappings = default_mappings();
        mappings[0].row_skip = 1;

        let problems = validate_mappings(&book, &mappings[..2]);

        assert_eq!(problems.len(), 1);
        assert!(matches!(
            problems[0],
            ReportError::SheetNotFound { ref sheet } if sheet == "Sheet 3"
        ));
    }

    #[test]
    fn lenient_load_omits_broken_metrics() {
        let book = ExtractBook::new("fmt.xlsx", vec![contribution_sheet()]);
        let mut mappings = default_mappings();
        mappings[0].row_skip = 1;

        let load = load_source(&book, Source::Format, &mappings, LoadPolicy::Lenient)
            .expect("lenient load should succeed");

        assert_eq!(load.columns.len(), 1);
        let omitted = load
            .issues
            .iter()
            .filter(|issue| matches!(issue, LoadIssue::MetricOmitted { .. }))
            .count();
        assert_eq!(omitted, Metric::ALL.len() - 1);
        assert!(load.issues.contains(&LoadIssue::Unparsed {
            source: Source::Format,
            metric: Metric::Contribution,
            key: "C".to_string(),
        }));
        assert!(load.issues.contains(&LoadIssue::DuplicateKey {
            source: Source::Format,
            metric: Metric::Contribution,
            key: "A".to_string(),
        }));
    }

    #[test]
    fn strict_load_aborts_on_first_missing_sheet() {
        let book = ExtractBook::new("fmt.xlsx", vec![contribution_sheet()]);
        let mut mappings = default_mappings();
        mappings[0].row_skip = 1;

        let err = load_source(&book, Source::Format, &mappings, LoadPolicy::Strict)
            .expect_err("strict load should fail");

        assert!(matches!(err, ReportError::SheetNotFound { ref sheet } if sheet == "Sheet 3"));
    }
}
