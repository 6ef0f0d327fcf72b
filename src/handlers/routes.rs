//! # Route Handlers
//!
//! Read-only access to the seeded route catalogue.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::TenantDb;
use crate::error::ApiError;
use crate::handlers::types::ApiResponse;
use crate::models::route::Model as RouteModel;
use crate::repositories::RouteRepository;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RouteResponse {
    pub id: i32,
    pub stops: serde_json::Value,
    pub source: String,
    pub destination: String,
}

impl From<RouteModel> for RouteResponse {
    fn from(route: RouteModel) -> Self {
        Self {
            id: route.id,
            stops: route.stops,
            source: route.source,
            destination: route.destination,
        }
    }
}

/// List routes.
#[utoipa::path(
    get,
    path = "/api/v1/routes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Route catalogue", body = ApiResponse<Vec<RouteResponse>>)
    ),
    tag = "routes"
)]
pub async fn list_routes(
    TenantDb(db): TenantDb,
) -> Result<Json<ApiResponse<Vec<RouteResponse>>>, ApiError> {
    let routes = RouteRepository::new(db.connection()).list_routes().await?;

    Ok(Json(ApiResponse::new(
        routes.into_iter().map(RouteResponse::from).collect(),
    )))
}

/// Get a route by ID.
#[utoipa::path(
    get,
    path = "/api/v1/routes/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Route ID")),
    responses(
        (status = 200, description = "The route", body = ApiResponse<RouteResponse>),
        (status = 404, description = "No such route", body = ApiError)
    ),
    tag = "routes"
)]
pub async fn get_route(
    TenantDb(db): TenantDb,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RouteResponse>>, ApiError> {
    let route = RouteRepository::new(db.connection())
        .get_route(id)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found"))?;

    Ok(Json(ApiResponse::new(RouteResponse::from(route))))
}
