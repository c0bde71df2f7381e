use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::domain::entities::selection::SelectionSnapshot;
use crate::domain::entities::source::Source;
use crate::error::ReportError;
use crate::ui::state::app_state::AppState;
use crate::usecase::ports::snapshot::SnapshotStore;

/// Current key set of each source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceKeys {
    pub format: BTreeSet<String>,
    pub kategori: BTreeSet<String>,
}

impl SourceKeys {
    pub fn get(&self, source: Source) -> &BTreeSet<String> {
        match source {
            Source::Format => &self.format,
            Source::Kategori => &self.kategori,
        }
    }

    pub fn get_mut(&mut self, source: Source) -> &mut BTreeSet<String> {
        match source {
            Source::Format => &mut self.format,
            Source::Kategori => &mut self.kategori,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionCommand {
    SelectAll(Source),
    ClearAll(Source),
    Set(Source, Vec<String>),
    Toggle(Source, String),
    SetLock(Source, bool),
}

pub fn apply_command(state: &mut AppState, command: SelectionCommand, keys: &SourceKeys) {
    debug!(?command, "selection command");
    match command {
        SelectionCommand::SelectAll(source) => {
            state.selection_mut(source).select_all(keys.get(source));
        }
        SelectionCommand::ClearAll(source) => state.selection_mut(source).clear_all(),
        SelectionCommand::Set(source, selected) => {
            state.selection_mut(source).set_selection(selected);
        }
        SelectionCommand::Toggle(source, key) => state.selection_mut(source).toggle(&key),
        SelectionCommand::SetLock(source, locked) => state.selection_mut(source).set_locked(locked),
    }
}

/// Brings both selections in line with the current key sets.
pub fn reconcile(state: &mut AppState, keys: &SourceKeys) {
    for source in Source::ALL {
        let outcome = state.selection_mut(source).reconcile(keys.get(source));
        if outcome.initialized {
            debug!(%source, keys = keys.get(source).len(), "selection initialized");
        }
        if !outcome.dropped.is_empty() {
            info!(%source, dropped = ?outcome.dropped, "dropped stale selection keys");
        }
    }
}

/// Applies `snapshot` unless one was already applied this session.
pub fn import_snapshot(state: &mut AppState, snapshot: &SelectionSnapshot, keys: &SourceKeys) -> bool {
    if state.snapshot_applied() {
        debug!("selection snapshot already applied, ignoring");
        return false;
    }
    for source in Source::ALL {
        state
            .selection_mut(source)
            .overwrite(snapshot.keys(source), keys.get(source));
    }
    state.mark_snapshot_applied();
    info!(
        format = snapshot.format.len(),
        kategori = snapshot.kategori.len(),
        "selection snapshot applied"
    );
    true
}

pub struct SelectionService {
    store: Box<dyn SnapshotStore>,
}

impl SelectionService {
    pub fn new(store: Box<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    pub fn import(&self, state: &mut AppState, keys: &SourceKeys) -> Result<bool, ReportError> {
        match self.store.load()? {
            Some(snapshot) => Ok(import_snapshot(state, &snapshot, keys)),
            None => Ok(false),
        }
    }

    pub fn export(&self, state: &AppState) -> Result<SelectionSnapshot, ReportError> {
        let snapshot = state.export_snapshot();
        self.store.save(&snapshot)?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::selection::SelectionMode;
    use std::cell::RefCell;

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn source_keys() -> SourceKeys {
        SourceKeys {
            format: keys(&["A", "B", "C"]),
            kategori: keys(&["X", "Y"]),
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<Option<SelectionSnapshot>>,
    }

    impl SnapshotStore for MemoryStore {
        fn load(&self) -> Result<Option<SelectionSnapshot>, ReportError> {
            Ok(self.saved.borrow().clone())
        }

        fn save(&self, snapshot: &SelectionSnapshot) -> Result<(), ReportError> {
            *self.saved.borrow_mut() = Some(snapshot.clone());
            Ok(())
        }
    }

    #[test]
    fn clear_all_empties_only_the_target_source() {
        let available = source_keys();
        let mut state = AppState::new();
        reconcile(&mut state, &available);

        apply_command(&mut state, SelectionCommand::ClearAll(Source::Kategori), &available);

        assert!(state.selected(Source::Kategori).is_empty());
        assert_eq!(state.selected(Source::Format), &available.format);
    }

    #[test]
    fn import_applies_once_until_reset() {
        let available = source_keys();
        let mut state = AppState::new();
        reconcile(&mut state, &available);

        let first = SelectionSnapshot {
            format: vec!["A".to_string()],
            kategori: vec!["X".to_string(), "Y".to_string()],
        };
        assert!(import_snapshot(&mut state, &first, &available));
        assert_eq!(state.selection(Source::Format).mode(), SelectionMode::PartialSelection);
        assert_eq!(state.selection(Source::Kategori).mode(), SelectionMode::AllSelected);

        let second = SelectionSnapshot::default();
        assert!(!import_snapshot(&mut state, &second, &available));
        assert_eq!(state.selected(Source::Format), &keys(&["A"]));

        state.reset_import();
        assert!(import_snapshot(&mut state, &second, &available));
        assert_eq!(state.selection(Source::Format).mode(), SelectionMode::Empty);
    }

    #[test]
    fn stale_imported_keys_are_dropped_unless_locked() {
        let available = source_keys();
        let snapshot = SelectionSnapshot {
            format: vec!["A".to_string(), "GONE".to_string()],
            kategori: vec!["OLD".to_string()],
        };
        let mut state = AppState::new();
        reconcile(&mut state, &available);
        apply_command(&mut state, SelectionCommand::SetLock(Source::Kategori, true), &available);

        import_snapshot(&mut state, &snapshot, &available);
        reconcile(&mut state, &available);

        assert_eq!(state.selected(Source::Format), &keys(&["A"]));
        assert_eq!(state.selected(Source::Kategori), &keys(&["OLD"]));
    }

    #[test]
    fn export_then_import_restores_selection() {
        let available = source_keys();
        let service = SelectionService::new(Box::new(MemoryStore::default()));

        let mut state = AppState::new();
        reconcile(&mut state, &available);
        apply_command(
            &mut state,
            SelectionCommand::Set(Source::Format, vec!["C".to_string(), "A".to_string()]),
            &available,
        );
        apply_command(
            &mut state,
            SelectionCommand::Toggle(Source::Kategori, "Y".to_string()),
            &available,
        );
        service.export(&state).expect("export should succeed");

        let mut restored = AppState::new();
        reconcile(&mut restored, &available);
        let applied = service
            .import(&mut restored, &available)
            .expect("import should succeed");

        assert!(applied);
        assert_eq!(restored.selected(Source::Format), state.selected(Source::Format));
        assert_eq!(restored.selected(Source::Kategori), state.selected(Source::Kategori));
    }

    #[test]
    fn import_without_saved_snapshot_is_a_no_op() {
        let available = source_keys();
        let service = SelectionService::new(Box::new(MemoryStore::default()));
        let mut state = AppState::new();
        reconcile(&mut state, &available);

        let applied = service.import(&mut state, &available).expect("import should succeed");

        assert!(!applied);
        assert!(!state.snapshot_applied());
        assert_eq!(state.selected(Source::Format), &available.format);
    }
}
