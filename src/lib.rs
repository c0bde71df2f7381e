pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod ui;
pub mod usecase;


pub use config::{LoadPolicy, MetricMapping, ReportConfig};
pub use domain::entities::metric::{Metric, MetricKind};
pub use domain::entities::record::{MergedSource, MetricRecord, OTHERS_KEY};
pub use domain::entities::selection::{SelectionMode, SelectionSnapshot, SelectionState};
pub use domain::entities::source::Source;
pub use domain::entities::table::{DisplayRow, DisplayTable, RowOrigin};
pub use error::ReportError;
pub use ui::state::app_state::AppState;
