//! # Planboard Shared Library
//!
//! Shared types and business logic used by the Planboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and query logic (users, tasks, filters)
//! - `auth`: Password hashing, session tokens, and the task access policy
//! - `db`: Connection pool and migration runner
//! - `dates`: Calendar-date parsing for planner views

pub mod auth;
pub mod dates;
pub mod db;
pub mod models;

/// Current version of the Planboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
