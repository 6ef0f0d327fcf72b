//! # Schedule Handlers

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::TenantDb;
use crate::error::ApiError;
use crate::handlers::types::ApiResponse;
use crate::models::schedule::Model as ScheduleModel;
use crate::repositories::schedule::CreateScheduleRequest;
use crate::repositories::ScheduleRepository;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleRequest {
    pub bus_id: i32,
    pub route_id: i32,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleResponse {
    pub id: i32,
    pub bus_id: i32,
    pub route_id: i32,
    pub departure_time: String,
    pub arrival_time: String,
}

impl From<ScheduleModel> for ScheduleResponse {
    fn from(schedule: ScheduleModel) -> Self {
        Self {
            id: schedule.id,
            bus_id: schedule.bus_id,
            route_id: schedule.route_id,
            departure_time: schedule.departure_time.to_rfc3339(),
            arrival_time: schedule.arrival_time.to_rfc3339(),
        }
    }
}

/// Schedule a bus on a route.
#[utoipa::path(
    post,
    path = "/api/v1/schedules",
    security(("bearer_auth" = [])),
    request_body = ScheduleRequest,
    responses(
        (status = 201, description = "Schedule created", body = ApiResponse<ScheduleResponse>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Bus or route not found", body = ApiError)
    ),
    tag = "schedules"
)]
pub async fn create_schedule(
    TenantDb(db): TenantDb,
    Json(request): Json<ScheduleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ScheduleResponse>>), ApiError> {
    let schedule = ScheduleRepository::new(db.connection())
        .create_schedule(CreateScheduleRequest {
            bus_id: request.bus_id,
            route_id: request.route_id,
            departure_time: request.departure_time,
            arrival_time: request.arrival_time,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(ScheduleResponse::from(schedule))),
    ))
}

/// Get a schedule by ID.
#[utoipa::path(
    get,
    path = "/api/v1/schedules/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "The schedule", body = ApiResponse<ScheduleResponse>),
        (status = 404, description = "No such schedule", body = ApiError)
    ),
    tag = "schedules"
)]
pub async fn get_schedule(
    TenantDb(db): TenantDb,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ScheduleResponse>>, ApiError> {
    let schedule = ScheduleRepository::new(db.connection())
        .get_schedule(id)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Schedule not found"))?;

    Ok(Json(ApiResponse::new(ScheduleResponse::from(schedule))))
}

/// List schedules.
#[utoipa::path(
    get,
    path = "/api/v1/schedules",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All schedules for this tenant", body = ApiResponse<Vec<ScheduleResponse>>)
    ),
    tag = "schedules"
)]
pub async fn list_schedules(
    TenantDb(db): TenantDb,
) -> Result<Json<ApiResponse<Vec<ScheduleResponse>>>, ApiError> {
    let schedules = ScheduleRepository::new(db.connection())
        .list_schedules()
        .await?;

    Ok(Json(ApiResponse::new(
        schedules.into_iter().map(ScheduleResponse::from).collect(),
    )))
}
