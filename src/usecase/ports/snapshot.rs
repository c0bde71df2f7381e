use crate::domain::entities::selection::SelectionSnapshot;
use crate::error::ReportError;

pub trait SnapshotStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<SelectionSnapshot>, ReportError>;
    fn save(&self, snapshot: &SelectionSnapshot) -> Result<(), ReportError>;
}
