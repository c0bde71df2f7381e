use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entities::source::Source;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("no {0} extract provided")]
    MissingInput(Source),

    #[error("sheet not found: {sheet}")]
    SheetNotFound { sheet: String },

    #[error("column not found: {column} (sheet: {sheet})")]
    ColumnNotFound { sheet: String, column: String },

    #[error("failed to open extract {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("selection snapshot error: {0}")]
    Snapshot(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// Sheet and column errors are the ones a lenient load may recover from.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ReportError::SheetNotFound { .. } | ReportError::ColumnNotFound { .. }
        )
    }
}
