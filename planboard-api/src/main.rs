//! # Planboard API Server
//!
//! REST API server for the Planboard task planner, built with Axum:
//! - Registration, login, and stateless session tokens
//! - Task CRUD with owner/assignee/admin access control
//! - Date-bucketed planner views (`/tasks/dashboard/:date`)
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p planboard-api
//! ```

use planboard_api::{
    app::{build_router, AppState},
    config::Config,
    error::set_expose_internal_errors,
};
use planboard_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Planboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    // 500 bodies carry a correlation id only outside production
    set_expose_internal_errors(!config.api.production);

    let db_config = DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DatabaseConfig::default()
    };
    let pool = create_pool(db_config).await?;

    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
