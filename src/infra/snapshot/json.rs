use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::domain::entities::selection::SelectionSnapshot;
use crate::error::ReportError;
use crate::usecase::ports::snapshot::SnapshotStore;

/// Selection snapshot kept as a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    pub path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn load(&self) -> Result<Option<SelectionSnapshot>, ReportError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let snapshot = serde_json::from_str(&text).map_err(|err| {
            ReportError::Snapshot(format!("{}: {err}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), "selection snapshot loaded");
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &SelectionSnapshot) -> Result<(), ReportError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), "selection snapshot saved");
        Ok(())
    }
}
