use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::entities::source::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Unset,
    AllSelected,
    PartialSelection,
    Empty,
}

impl SelectionMode {
    fn classify(selected: &BTreeSet<String>, available: &BTreeSet<String>) -> Self {
        if selected.is_empty() {
            SelectionMode::Empty
        } else if selected == available {
            SelectionMode::AllSelected
        } else {
            SelectionMode::PartialSelection
        }
    }
}

/// Keys dropped by one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub initialized: bool,
    pub dropped: BTreeSet<String>,
}

/// Selected product keys of one source, kept across recomputation passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: BTreeSet<String>,
    mode: SelectionMode,
    locked: bool,
    known_keys: BTreeSet<String>,
}

impl SelectionState {
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Runs at the top of every pass with the current key set.
    ///
    /// An unset selection becomes the full key set. A locked selection is
    /// left alone, stale keys included. Otherwise keys that disappeared are
    /// dropped and the mode is re-derived when the key set changed.
    pub fn reconcile(&mut self, available: &BTreeSet<String>) -> ReconcileOutcome {
        if self.mode == SelectionMode::Unset {
            self.selected = available.clone();
            self.mode = SelectionMode::AllSelected;
            self.known_keys = available.clone();
            return ReconcileOutcome {
                initialized: true,
                dropped: BTreeSet::new(),
            };
        }
        if self.locked {
            return ReconcileOutcome::default();
        }

        let dropped: BTreeSet<String> = self.selected.difference(available).cloned().collect();
        self.selected.retain(|key| available.contains(key));
        if &self.known_keys != available {
            self.mode = SelectionMode::classify(&self.selected, available);
            self.known_keys = available.clone();
        }
        ReconcileOutcome {
            initialized: false,
            dropped,
        }
    }

    pub fn select_all(&mut self, available: &BTreeSet<String>) {
        self.selected = available.clone();
        self.mode = SelectionMode::AllSelected;
        self.known_keys = available.clone();
    }

    pub fn clear_all(&mut self) {
        self.selected.clear();
        self.mode = SelectionMode::Empty;
    }

    pub fn set_selection<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.selected = keys.into_iter().collect();
        self.mode = SelectionMode::PartialSelection;
    }

    pub fn toggle(&mut self, key: &str) {
        if !self.selected.remove(key) {
            self.selected.insert(key.to_string());
        }
        self.mode = SelectionMode::PartialSelection;
    }

    /// Replaces the selection with imported keys, stale ones included.
    pub fn overwrite(&mut self, keys: BTreeSet<String>, available: &BTreeSet<String>) {
        self.mode = SelectionMode::classify(&keys, available);
        self.selected = keys;
        self.known_keys = available.clone();
    }
}

/// Persistable form of both selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    #[serde(default, alias = "fmt_select")]
    pub format: Vec<String>,
    #[serde(default, alias = "cat_select")]
    pub kategori: Vec<String>,
}

impl SelectionSnapshot {
    pub fn keys(&self, source: Source) -> BTreeSet<String> {
        match source {
            Source::Format => self.format.iter().cloned().collect(),
            Source::Kategori => self.kategori.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_reconcile_selects_everything() {
        let mut state = SelectionState::default();
        assert_eq!(state.mode(), SelectionMode::Unset);

        let outcome = state.reconcile(&keys(&["A", "B"]));

        assert!(outcome.initialized);
        assert_eq!(state.mode(), SelectionMode::AllSelected);
        assert_eq!(state.selected(), &keys(&["A", "B"]));
    }

    #[test]
    fn shrinking_key_set_drops_stale_keys() {
        let mut state = SelectionState::default();
        state.reconcile(&keys(&["A", "B", "C"]));

        let outcome = state.reconcile(&keys(&["A", "C"]));

        assert_eq!(state.selected(), &keys(&["A", "C"]));
        assert_eq!(outcome.dropped, keys(&["B"]));
        assert_eq!(state.mode(), SelectionMode::AllSelected);
    }

    #[test]
    fn locked_selection_keeps_stale_keys() {
        let mut state = SelectionState::default();
        state.reconcile(&keys(&["A", "B", "C"]));
        state.set_locked(true);

        let outcome = state.reconcile(&keys(&["A"]));

        assert!(outcome.dropped.is_empty());
        assert_eq!(state.selected(), &keys(&["A", "B", "C"]));
    }

    #[test]
    fn new_keys_are_not_added_to_an_existing_selection() {
        let mut state = SelectionState::default();
        state.reconcile(&keys(&["A", "B"]));

        state.reconcile(&keys(&["A", "B", "D"]));

        assert_eq!(state.selected(), &keys(&["A", "B"]));
        assert_eq!(state.mode(), SelectionMode::PartialSelection);
    }

    #[test]
    fn commands_drive_the_mode() {
        let available = keys(&["A", "B"]);
        let mut state = SelectionState::default();
        state.reconcile(&available);

        state.clear_all();
        assert_eq!(state.mode(), SelectionMode::Empty);
        assert!(state.selected().is_empty());

        state.toggle("B");
        assert_eq!(state.mode(), SelectionMode::PartialSelection);
        assert_eq!(state.selected(), &keys(&["B"]));

        state.toggle("B");
        assert!(state.selected().is_empty());

        state.select_all(&available);
        assert_eq!(state.mode(), SelectionMode::AllSelected);
        assert_eq!(state.selected(), &available);
    }

    #[test]
    fn manual_edit_stays_partial_while_keys_are_unchanged() {
        let available = keys(&["A", "B"]);
        let mut state = SelectionState::default();
        state.reconcile(&available);

        state.set_selection(vec!["A".to_string(), "B".to_string()]);
        state.reconcile(&available);

        assert_eq!(state.mode(), SelectionMode::PartialSelection);
    }

    #[test]
    fn overwrite_reflects_whether_all_keys_are_present() {
        let available = keys(&["A", "B"]);
        let mut state = SelectionState::default();

        state.overwrite(keys(&["A", "B"]), &available);
        assert_eq!(state.mode(), SelectionMode::AllSelected);

        state.overwrite(keys(&["A"]), &available);
        assert_eq!(state.mode(), SelectionMode::PartialSelection);

        state.overwrite(keys(&["A", "B", "GONE"]), &available);
        assert_eq!(state.mode(), SelectionMode::PartialSelection);

        state.overwrite(keys(&["X"]), &BTreeSet::new());
        assert_eq!(state.mode(), SelectionMode::PartialSelection);

        state.overwrite(BTreeSet::new(), &available);
        assert_eq!(state.mode(), SelectionMode::Empty);
    }

    #[test]
    fn snapshot_accepts_legacy_field_names() {
        let snapshot: SelectionSnapshot =
            serde_json::from_str(r#"{"fmt_select":["A"],"cat_select":["X","Y"]}"#)
                .expect("legacy snapshot should parse");
        assert_eq!(snapshot.keys(Source::Format), keys(&["A"]));
        assert_eq!(snapshot.keys(Source::Kategori), keys(&["X", "Y"]));
    }
}
