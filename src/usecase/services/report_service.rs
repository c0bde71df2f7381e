use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::domain::entities::record::{MergedSource, OTHERS_KEY};
use crate::domain::entities::sheet::ExtractBook;
use crate::domain::entities::source::Source;
use crate::domain::entities::table::{DisplayRow, DisplayTable, RowOrigin};
use crate::error::ReportError;
use crate::ui::state::app_state::AppState;
use crate::usecase::ports::extract::ExtractReader;
use crate::usecase::services::aggregate_service::others;
use crate::usecase::services::load_service::{load_source, validate_mappings, LoadIssue};
use crate::usecase::services::merge_service::merge;
use crate::usecase::services::selection_service::{reconcile, SourceKeys};

/// Extract files of one reporting period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodInput {
    pub label: String,
    pub format: Option<PathBuf>,
    pub kategori: Option<PathBuf>,
}

impl PeriodInput {
    pub fn new(label: impl Into<String>, format: Option<PathBuf>, kategori: Option<PathBuf>) -> Self {
        Self {
            label: label.into(),
            format,
            kategori,
        }
    }

    pub fn path(&self, source: Source) -> Option<&Path> {
        match source {
            Source::Format => self.format.as_deref(),
            Source::Kategori => self.kategori.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadedPeriod {
    pub label: String,
    pub format: MergedSource,
    pub kategori: MergedSource,
    pub issues: Vec<LoadIssue>,
}

impl LoadedPeriod {
    pub fn source(&self, source: Source) -> &MergedSource {
        match source {
            Source::Format => &self.format,
            Source::Kategori => &self.kategori,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadedReport {
    pub periods: Vec<LoadedPeriod>,
}

impl LoadedReport {
    /// Union of every period's keys, per source.
    pub fn keys(&self) -> SourceKeys {
        let mut keys = SourceKeys::default();
        for period in &self.periods {
            for source in Source::ALL {
                keys.get_mut(source).extend(period.source(source).keys());
            }
        }
        keys
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodReport {
    pub label: String,
    pub table: DisplayTable,
    pub issues: Vec<LoadIssue>,
}

/// Selected rows in source order, Kategori first, then the Others row when
/// any Format key is unselected.
pub fn build_display_table(
    kategori: &MergedSource,
    format: &MergedSource,
    state: &AppState,
) -> DisplayTable {
    let mut rows = Vec::new();
    for (source, records) in [(Source::Kategori, kategori), (Source::Format, format)] {
        let selection = state.selection(source);
        rows.extend(
            records
                .iter()
                .filter(|record| selection.is_selected(&record.product_key))
                .map(|record| DisplayRow {
                    origin: RowOrigin::Source(source),
                    record: record.clone(),
                }),
        );
    }
    if let Some(record) = others(format, state.selected(Source::Format)) {
        rows.push(DisplayRow {
            origin: RowOrigin::Others,
            record,
        });
    }
    DisplayTable { rows }
}

pub struct ReportService {
    reader: Box<dyn ExtractReader>,
    config: ReportConfig,
}

impl ReportService {
    pub fn new(reader: Box<dyn ExtractReader>, config: ReportConfig) -> Self {
        Self { reader, config }
    }

    fn read_book(&self, source: Source, path: Option<&Path>) -> Result<ExtractBook, ReportError> {
        let path = path.ok_or(ReportError::MissingInput(source))?;
        self.reader.read(path)
    }

    pub fn load_period(&self, input: &PeriodInput) -> Result<LoadedPeriod, ReportError> {
        let mut period = LoadedPeriod {
            label: input.label.clone(),
            ..LoadedPeriod::default()
        };

        for source in Source::ALL {
            let book = self.read_book(source, input.path(source))?;
            let mappings = self.config.mappings(source);
            for problem in validate_mappings(&book, mappings) {
                warn!(period = %input.label, %source, error = %problem, "extract does not match mapping");
            }

            let load = load_source(&book, source, mappings, self.config.load_policy)?;
            let merged = merge(&load.columns);
            info!(
                period = %input.label,
                %source,
                records = merged.len(),
                issues = load.issues.len(),
                "source merged"
            );
            period.issues.extend(load.issues);
            if source == Source::Format && merged.contains(OTHERS_KEY) {
                warn!(period = %input.label, key = OTHERS_KEY, "format product shares the aggregate row label");
                period.issues.push(LoadIssue::ReservedKey {
                    source,
                    key: OTHERS_KEY.to_string(),
                });
            }
            match source {
                Source::Format => period.format = merged,
                Source::Kategori => period.kategori = merged,
            }
        }
        Ok(period)
    }

    pub fn load(&self, inputs: &[PeriodInput]) -> Result<LoadedReport, ReportError> {
        if inputs.is_empty() {
            return Err(ReportError::MissingInput(Source::Format));
        }
        let periods = inputs
            .iter()
            .map(|input| self.load_period(input))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LoadedReport { periods })
    }

    pub fn present(&self, loaded: &LoadedReport, state: &AppState) -> Vec<PeriodReport> {
        loaded
            .periods
            .iter()
            .map(|period| PeriodReport {
                label: period.label.clone(),
                table: build_display_table(&period.kategori, &period.format, state),
                issues: period.issues.clone(),
            })
            .collect()
    }

    /// One full recomputation: load, reconcile the selection, aggregate.
    pub fn run_pass(
        &self,
        inputs: &[PeriodInput],
        state: &mut AppState,
    ) -> Result<Vec<PeriodReport>, ReportError> {
        self.run_pass_with(inputs, state, |_, _| Ok(()))
    }

    /// Like [`run_pass`](Self::run_pass), with `interact` applied to the
    /// reconciled selection before the tables are built. Snapshot imports and
    /// selection commands go there; the selection is reconciled again after.
    pub fn run_pass_with<F>(
        &self,
        inputs: &[PeriodInput],
        state: &mut AppState,
        interact: F,
    ) -> Result<Vec<PeriodReport>, ReportError>
    where
        F: FnOnce(&mut AppState, &SourceKeys) -> Result<(), ReportError>,
    {
        let loaded = match self.load(inputs) {
            Ok(loaded) => loaded,
            Err(err) => {
                state.status = err.to_string();
                return Err(err);
            }
        };
        let keys = loaded.keys();
        reconcile(state, &keys);
        if let Err(err) = interact(state, &keys) {
            state.status = err.to_string();
            return Err(err);
        }
        reconcile(state, &keys);
        let reports = self.present(&loaded, state);
        let rows: usize = reports.iter().map(|r| r.table.len()).sum();
        state.status = format!("{} period(s), {rows} row(s)", reports.len());
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::metric::Metric;
    use crate::domain::entities::record::MetricRecord;
    use crate::usecase::services::selection_service::{apply_command, SelectionCommand};

    fn source(records: &[(&str, f64)]) -> MergedSource {
        records
            .iter()
            .map(|(key, value)| MetricRecord::new(*key).with(Metric::ValueMtd, *value))
            .collect()
    }

    fn state_for(kategori: &MergedSource, format: &MergedSource) -> (AppState, SourceKeys) {
        let keys = SourceKeys {
            format: format.keys(),
            kategori: kategori.keys(),
        };
        let mut state = AppState::new();
        reconcile(&mut state, &keys);
        (state, keys)
    }

    #[test]
    fn table_orders_kategori_then_format_then_others() {
        let kategori = source(&[("K2", 1.0), ("K1", 2.0)]);
        let format = source(&[("F1", 10.0), ("F2", 20.0), ("F3", 30.0)]);
        let (mut state, keys) = state_for(&kategori, &format);
        apply_command(
            &mut state,
            SelectionCommand::Set(Source::Format, vec!["F2".to_string()]),
            &keys,
        );

        let table = build_display_table(&kategori, &format, &state);

        assert_eq!(table.keys(), vec!["K2", "K1", "F2", "Others"]);
        assert_eq!(table.others().map(|r| r.value_mtd), Some(40.0));
    }

    #[test]
    fn clear_all_kategori_leaves_no_kategori_rows() {
        let kategori = source(&[("K1", 1.0)]);
        let format = source(&[("F1", 10.0)]);
        let (mut state, keys) = state_for(&kategori, &format);

        apply_command(&mut state, SelectionCommand::ClearAll(Source::Kategori), &keys);
        let table = build_display_table(&kategori, &format, &state);

        assert_eq!(table.count(RowOrigin::Source(Source::Kategori)), 0);
        assert_eq!(table.count(RowOrigin::Source(Source::Format)), 1);
        assert!(table.others().is_none());
    }

    #[test]
    fn empty_selection_renders_only_others() {
        let kategori = source(&[("K1", 1.0)]);
        let format = source(&[("F1", 10.0), ("F2", 5.0)]);
        let (mut state, keys) = state_for(&kategori, &format);

        apply_command(&mut state, SelectionCommand::ClearAll(Source::Kategori), &keys);
        apply_command(&mut state, SelectionCommand::ClearAll(Source::Format), &keys);
        let table = build_display_table(&kategori, &format, &state);

        assert_eq!(table.keys(), vec!["Others"]);
        assert_eq!(table.others().map(|r| r.value_mtd), Some(15.0));
    }

    #[test]
    fn missing_input_halts_the_pass() {
        struct NeverRead;
        impl ExtractReader for NeverRead {
            fn read(&self, path: &Path) -> Result<ExtractBook, ReportError> {
                Ok(ExtractBook::new(path, Vec::new()))
            }
        }

        let service = ReportService::new(Box::new(NeverRead), ReportConfig::default());
        let mut state = AppState::new();
        let inputs = vec![PeriodInput::new("Report", Some(PathBuf::from("fmt.xlsx")), None)];

        let err = service
            .run_pass(&inputs, &mut state)
            .expect_err("pass should stop");

        assert!(matches!(err, ReportError::MissingInput(Source::Kategori)));
        assert_eq!(state.status, "no Kategori extract provided");
        assert!(matches!(
            service.load(&[]),
            Err(ReportError::MissingInput(Source::Format))
        ));
    }
}
