/// API route handlers
///
/// - [`health`]: Health check endpoint
/// - [`auth`]: Registration, login, profile, and password changes
/// - [`tasks`]: Task CRUD, filtered lists, and planner day views

pub mod auth;
pub mod health;
pub mod tasks;
