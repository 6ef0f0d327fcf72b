//! # Bus Handlers

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::TenantDb;
use crate::error::ApiError;
use crate::handlers::companies::CompanyResponse;
use crate::handlers::types::ApiResponse;
use crate::models::bus::Model as BusModel;
use crate::repositories::bus::CreateBusRequest;
use crate::repositories::BusRepository;

#[derive(Debug, Deserialize, ToSchema)]
pub struct BusRequest {
    pub company_id: i32,
    #[schema(example = "AP04AB1234")]
    pub bus_number: String,
    #[schema(example = "AC")]
    pub bus_type: String,
    pub total_seats: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BusResponse {
    pub id: i32,
    pub company_id: i32,
    pub bus_number: String,
    pub bus_type: String,
    pub total_seats: i32,
    pub is_active: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_data: Option<CompanyResponse>,
}

impl BusResponse {
    pub fn from_model(bus: BusModel, company: Option<CompanyResponse>) -> Self {
        Self {
            id: bus.id,
            company_id: bus.company_id,
            bus_number: bus.bus_number,
            bus_type: bus.bus_type,
            total_seats: bus.total_seats,
            is_active: bus.is_active,
            created_at: bus.created_at.to_rfc3339(),
            company_data: company,
        }
    }
}

/// Register a bus.
#[utoipa::path(
    post,
    path = "/api/v1/buses",
    security(("bearer_auth" = [])),
    request_body = BusRequest,
    responses(
        (status = 201, description = "Bus registered", body = ApiResponse<BusResponse>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Company not found", body = ApiError)
    ),
    tag = "buses"
)]
pub async fn create_bus(
    TenantDb(db): TenantDb,
    Json(request): Json<BusRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BusResponse>>), ApiError> {
    let bus = BusRepository::new(db.connection())
        .create_bus(CreateBusRequest {
            company_id: request.company_id,
            bus_number: request.bus_number,
            bus_type: request.bus_type,
            total_seats: request.total_seats,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(BusResponse::from_model(bus, None))),
    ))
}

/// List buses with their companies.
#[utoipa::path(
    get,
    path = "/api/v1/buses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All buses for this tenant", body = ApiResponse<Vec<BusResponse>>)
    ),
    tag = "buses"
)]
pub async fn list_buses(
    TenantDb(db): TenantDb,
) -> Result<Json<ApiResponse<Vec<BusResponse>>>, ApiError> {
    let buses = BusRepository::new(db.connection()).list_buses().await?;

    Ok(Json(ApiResponse::new(
        buses
            .into_iter()
            .map(|(bus, company)| BusResponse::from_model(bus, company.map(Into::into)))
            .collect(),
    )))
}

/// Get a bus by ID.
#[utoipa::path(
    get,
    path = "/api/v1/buses/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Bus ID")),
    responses(
        (status = 200, description = "The bus", body = ApiResponse<BusResponse>),
        (status = 404, description = "No such bus", body = ApiError)
    ),
    tag = "buses"
)]
pub async fn get_bus(
    TenantDb(db): TenantDb,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BusResponse>>, ApiError> {
    let bus = BusRepository::new(db.connection())
        .get_bus(id)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Bus not found"))?;

    Ok(Json(ApiResponse::new(BusResponse::from_model(bus, None))))
}
