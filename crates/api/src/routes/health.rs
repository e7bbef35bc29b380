//! Liveness and schema readiness probe, mounted at the root (`/health`).

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database is reachable and fully migrated, else `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Newest migration applied to the database.
    pub schema_version: Option<i64>,
    /// Whether the database is behind the migrations this build ships with.
    pub migrations_pending: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = inventory_db::health_check(&state.pool).await.is_ok();

    let schema_version = if db_healthy {
        match inventory_db::applied_schema_version(&state.pool).await {
            Ok(version) => version,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read applied schema version");
                None
            }
        }
    } else {
        None
    };
    let migrations_pending = schema_version < inventory_db::expected_schema_version();

    let status = if db_healthy && !migrations_pending {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        schema_version,
        migrations_pending,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
