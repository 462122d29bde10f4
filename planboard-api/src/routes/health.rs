/// Health check endpoint
///
/// `GET /health` is public and unauthenticated. It reports process
/// liveness plus database reachability in the standard response
/// envelope:
///
/// ```json
/// {
///   "success": true,
///   "message": "Service is healthy",
///   "data": { "status": "healthy", "version": "0.1.0", "database": "connected" }
/// }
/// ```

use crate::{app::AppState, response::ApiResponse};
use axum::{extract::State, Json};
use planboard_shared::db::pool;
use serde::Serialize;

/// Database reachability as reported by the health endpoint
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

/// Health payload
#[derive(Debug, Serialize)]
pub struct HealthData {
    /// "healthy" when the database answers, "degraded" otherwise
    pub status: &'static str,

    /// Application version
    pub version: &'static str,

    /// Database status
    pub database: DatabaseStatus,
}

/// Reports service liveness and database connectivity
///
/// Never errors: an unreachable database degrades the payload rather
/// than failing the request, so load balancers always get an answer.
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    let database = match pool::health_check(&state.db).await {
        Ok(()) => DatabaseStatus::Connected,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            DatabaseStatus::Disconnected
        }
    };

    let (status, message) = match database {
        DatabaseStatus::Connected => ("healthy", "Service is healthy"),
        DatabaseStatus::Disconnected => ("degraded", "Database is unreachable"),
    };

    ApiResponse::ok(
        message,
        HealthData {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        },
    )
}
