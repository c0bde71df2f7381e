use std::fs;
use std::path::Path;

use tracing::debug;

use crate::domain::entities::sheet::{Cell, ExtractBook, SheetTable};
use crate::error::ReportError;
use crate::usecase::ports::extract::ExtractReader;

/// A directory holding one `<sheet name>.csv` per sheet.
///
/// Fields that parse as plain numbers keep their text next to the value, so
/// the value parsers see what a workbook would give them while keys such as
/// `007` stay intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvDirReader;

fn cell_from_field(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Cell::NumberText {
            value,
            raw: field.to_string(),
        },
        _ => Cell::Text(field.to_string()),
    }
}

fn read_sheet(path: &Path, name: String) -> Result<SheetTable, ReportError> {
    let open_error = |reason: String| ReportError::Open {
        path: path.to_path_buf(),
        reason,
    };
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|err| open_error(err.to_string()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| open_error(format!("failed to parse csv record: {err}")))?;
        rows.push(record.iter().map(cell_from_field).collect());
    }
    Ok(SheetTable::new(name, rows))
}

impl ExtractReader for CsvDirReader {
    fn read(&self, path: &Path) -> Result<ExtractBook, ReportError> {
        let entries = fs::read_dir(path).map_err(|err| ReportError::Open {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let file_path = entry?.path();
            let is_csv = file_path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if !is_csv {
                continue;
            }
            let Some(name) = file_path
                .file_stem()
                .and_then(|name| name.to_str())
                .map(str::to_string)
            else {
                continue;
            };
            files.push((name, file_path));
        }
        files.sort();

        let mut sheets = Vec::with_capacity(files.len());
        for (name, file_path) in files {
            let sheet = read_sheet(&file_path, name)?;
            debug!(sheet = %sheet.name, rows = sheet.rows.len(), "csv sheet buffered");
            sheets.push(sheet);
        }

        Ok(ExtractBook::new(path, sheets))
    }
}
