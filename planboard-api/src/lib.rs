//! # Planboard API Server Library
//!
//! REST API for the Planboard task planner: registration and sessions,
//! task CRUD with owner/assignee/admin access control, and date-bucketed
//! planner views.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder, and auth middleware
//! - `config`: Configuration management
//! - `error`: Error taxonomy and HTTP response mapping
//! - `response`: The shared `{success, message, data}` envelope
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod response;
pub mod routes;
