//! # API Handlers
//!
//! HTTP endpoint handlers. Tenant-scoped handlers receive their database
//! handle through the [`crate::auth::TenantDb`] extractor; they never pick
//! a schema themselves.

use axum::extract::State;
use axum::response::Json;

use crate::db;
use crate::error::ApiError;
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod auth;
pub mod branches;
pub mod buses;
pub mod companies;
pub mod routes;
pub mod schedules;
pub mod tickets;
pub mod types;
pub mod users;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Liveness/readiness probe: verifies the master schema is reachable.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Database unreachable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let master = state.router.master().await?;
    db::health_check(master.connection())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}
