pub mod event_query;
pub mod event_type;
pub mod filter_range;
pub mod report;
pub mod timestamp;
