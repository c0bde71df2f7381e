use std::collections::BTreeSet;

use crate::domain::entities::selection::{SelectionSnapshot, SelectionState};
use crate::domain::entities::source::Source;

/// Per-session state carried from one recomputation pass to the next.
#[derive(Debug, Clone)]
pub struct AppState {
    format: SelectionState,
    kategori: SelectionState,
    snapshot_applied: bool,
    pub status: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            format: SelectionState::default(),
            kategori: SelectionState::default(),
            snapshot_applied: false,
            status: "Ready".to_string(),
        }
    }

    pub fn selection(&self, source: Source) -> &SelectionState {
        match source {
            Source::Format => &self.format,
            Source::Kategori => &self.kategori,
        }
    }

    pub fn selection_mut(&mut self, source: Source) -> &mut SelectionState {
        match source {
            Source::Format => &mut self.format,
            Source::Kategori => &mut self.kategori,
        }
    }

    pub fn selected(&self, source: Source) -> &BTreeSet<String> {
        self.selection(source).selected()
    }

    pub fn snapshot_applied(&self) -> bool {
        self.snapshot_applied
    }

    pub fn mark_snapshot_applied(&mut self) {
        self.snapshot_applied = true;
    }

    /// Allows the next snapshot import to take effect.
    pub fn reset_import(&mut self) {
        self.snapshot_applied = false;
    }

    pub fn export_snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            format: self.format.selected().iter().cloned().collect(),
            kategori: self.kategori.selected().iter().cloned().collect(),
        }
    }
}
