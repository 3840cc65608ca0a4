pub mod datetime;
pub mod usage_history;
