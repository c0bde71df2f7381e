pub mod csv;
pub mod xlsx;

use std::path::Path;

use crate::domain::entities::sheet::ExtractBook;
use crate::error::ReportError;
use crate::usecase::ports::extract::ExtractReader;

/// Picks a reader from the path: a directory holds CSV sheets, anything
/// else goes to calamine.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoReader;

impl ExtractReader for AutoReader {
    fn read(&self, path: &Path) -> Result<ExtractBook, ReportError> {
        if path.is_dir() {
            csv::CsvDirReader.read(path)
        } else {
            xlsx::CalamineReader.read(path)
        }
    }
}
