pub mod aggregate_service;
pub mod load_service;
pub mod merge_service;
pub mod report_service;
pub mod selection_service;
