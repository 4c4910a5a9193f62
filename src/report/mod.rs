//! Reporting: the run's record collection, CSV export and console summary.

pub mod aggregator;
pub mod export;
pub mod summary;

pub use aggregator::{AssignmentRecord, AssignmentType, CategoryCount, RecordAggregator, Summary};
pub use export::{default_export_path, write_records_csv};
pub use summary::write_summary;
