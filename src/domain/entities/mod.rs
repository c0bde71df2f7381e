pub mod metric;
pub mod record;
pub mod selection;
pub mod sheet;
pub mod source;
pub mod table;
