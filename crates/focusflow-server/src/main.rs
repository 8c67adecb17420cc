//! Standalone profile API server.
//!
//! Serves the `/api/users` and `/api/health` endpoints the core's
//! `ApiClient` consumes. State is held in memory and mirrored to a
//! JSON file so it survives restarts.

mod routes;
mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::store::UserDb;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db_path =
        std::env::var("FOCUSFLOW_DB").unwrap_or_else(|_| "data/users.json".to_string());
    let db = Arc::new(UserDb::open(&db_path));
    tracing::info!(db = %db_path, users = db.count(), "user db loaded");

    let addr =
        std::env::var("FOCUSFLOW_ADDR").unwrap_or_else(|_| "127.0.0.1:3001".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "profile API listening");

    axum::serve(listener, routes::router(db)).await?;
    Ok(())
}
