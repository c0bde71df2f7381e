use std::path::Path;

use crate::domain::entities::table::DisplayTable;
use crate::error::ReportError;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSheet {
    pub name: String,
    pub table: DisplayTable,
}

pub trait ReportWriter {
    fn write(&self, sheets: &[ReportSheet], path: &Path) -> Result<(), ReportError>;
}
