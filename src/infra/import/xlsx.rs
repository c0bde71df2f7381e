use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use crate::domain::entities::sheet::{Cell, ExtractBook, SheetTable};
use crate::error::ReportError;
use crate::usecase::ports::extract::ExtractReader;

pub fn cell_from_data(cell: &Data) -> Cell {
    match cell {
        Data::String(v) => Cell::Text(v.to_string()),
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Bool(v) => Cell::Text(v.to_string()),
        Data::DateTime(v) => Cell::Text(v.to_string()),
        Data::DateTimeIso(v) => Cell::Text(v.to_string()),
        Data::DurationIso(v) => Cell::Text(v.to_string()),
        Data::Error(v) => Cell::Text(format!("{v:?}")),
        Data::Empty => Cell::Empty,
    }
}

/// Workbook extracts (`.xlsx`, `.xlsm`, `.xls`, `.ods`) read through calamine.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineReader;

impl ExtractReader for CalamineReader {
    fn read(&self, path: &Path) -> Result<ExtractBook, ReportError> {
        let open_error = |reason: String| ReportError::Open {
            path: path.to_path_buf(),
            reason,
        };

        let mut workbook = open_workbook_auto(path).map_err(|err| open_error(err.to_string()))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|err| open_error(format!("failed to read sheet {name}: {err}")))?;
            let rows: Vec<Vec<Cell>> = range
                .rows()
                .map(|r| r.iter().map(cell_from_data).collect())
                .collect();
            debug!(sheet = %name, rows = rows.len(), "sheet buffered");
            sheets.push(SheetTable::new(name, rows));
        }

        Ok(ExtractBook::new(path, sheets))
    }
}
