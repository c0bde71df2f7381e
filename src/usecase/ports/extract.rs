use std::path::Path;

use crate::domain::entities::sheet::ExtractBook;
use crate::error::ReportError;

/// Reads every sheet of an extract into memory before any parsing happens.
pub trait ExtractReader {
    fn read(&self, path: &Path) -> Result<ExtractBook, ReportError>;
}
