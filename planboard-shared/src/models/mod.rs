/// Database models for Planboard
///
/// # Models
///
/// - `user`: User accounts, roles, and credential storage
/// - `task`: Tasks, list filtering, date-bucketed queries, pagination

pub mod task;
pub mod user;
