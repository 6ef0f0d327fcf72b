//! # Company Handlers
//!
//! Tenant-scoped company CRUD. The handle from [`TenantDb`] is already
//! bound to the caller's schema.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::TenantDb;
use crate::error::ApiError;
use crate::handlers::types::{ApiResponse, MessageResponse};
use crate::models::company::Model as CompanyModel;
use crate::repositories::company::CompanyData;
use crate::repositories::CompanyRepository;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompanyRequest {
    #[schema(example = "Orange Tours and Travels")]
    pub name: String,
    pub contact_person_name: String,
    pub email: String,
    pub address: String,
    pub phone_number: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompanyResponse {
    pub id: i32,
    pub name: String,
    pub contact_person_name: String,
    pub email: String,
    pub address: String,
    pub phone_number: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CompanyModel> for CompanyResponse {
    fn from(company: CompanyModel) -> Self {
        Self {
            id: company.id,
            name: company.name,
            contact_person_name: company.contact_person_name,
            email: company.email,
            address: company.address,
            phone_number: company.phone_number,
            is_active: company.is_active,
            created_at: company.created_at.to_rfc3339(),
            updated_at: company.updated_at.to_rfc3339(),
        }
    }
}

impl From<CompanyRequest> for CompanyData {
    fn from(request: CompanyRequest) -> Self {
        Self {
            name: request.name,
            contact_person_name: request.contact_person_name,
            email: request.email,
            address: request.address,
            phone_number: request.phone_number,
        }
    }
}

/// Create a company.
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    security(("bearer_auth" = [])),
    request_body = CompanyRequest,
    responses(
        (status = 201, description = "Company created", body = ApiResponse<CompanyResponse>),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "companies"
)]
pub async fn create_company(
    TenantDb(db): TenantDb,
    Json(request): Json<CompanyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CompanyResponse>>), ApiError> {
    let company = CompanyRepository::new(db.connection())
        .create_company(request.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(CompanyResponse::from(company))),
    ))
}

/// List companies.
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All companies for this tenant", body = ApiResponse<Vec<CompanyResponse>>)
    ),
    tag = "companies"
)]
pub async fn list_companies(
    TenantDb(db): TenantDb,
) -> Result<Json<ApiResponse<Vec<CompanyResponse>>>, ApiError> {
    let companies = CompanyRepository::new(db.connection())
        .list_companies()
        .await?;

    Ok(Json(ApiResponse::new(
        companies.into_iter().map(CompanyResponse::from).collect(),
    )))
}

/// Get a company by ID.
#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Company ID")),
    responses(
        (status = 200, description = "The company", body = ApiResponse<CompanyResponse>),
        (status = 404, description = "No such company", body = ApiError)
    ),
    tag = "companies"
)]
pub async fn get_company(
    TenantDb(db): TenantDb,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CompanyResponse>>, ApiError> {
    let company = CompanyRepository::new(db.connection())
        .get_company(id)
        .await?
        .ok_or_else(|| {
            ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Company not found")
        })?;

    Ok(Json(ApiResponse::new(CompanyResponse::from(company))))
}

/// Update a company.
#[utoipa::path(
    put,
    path = "/api/v1/companies/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Company ID")),
    request_body = CompanyRequest,
    responses(
        (status = 200, description = "Updated company", body = ApiResponse<CompanyResponse>),
        (status = 404, description = "No such company", body = ApiError)
    ),
    tag = "companies"
)]
pub async fn update_company(
    TenantDb(db): TenantDb,
    Path(id): Path<i32>,
    Json(request): Json<CompanyRequest>,
) -> Result<Json<ApiResponse<CompanyResponse>>, ApiError> {
    let company = CompanyRepository::new(db.connection())
        .update_company(id, request.into())
        .await?;

    Ok(Json(ApiResponse::new(CompanyResponse::from(company))))
}

/// Delete a company.
#[utoipa::path(
    delete,
    path = "/api/v1/companies/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company deleted", body = ApiResponse<MessageResponse>),
        (status = 404, description = "No such company", body = ApiError)
    ),
    tag = "companies"
)]
pub async fn delete_company(
    TenantDb(db): TenantDb,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    CompanyRepository::new(db.connection())
        .delete_company(id)
        .await?;

    Ok(Json(ApiResponse::new(MessageResponse {
        message: "COMPANY_DELETED_SUCCESSFULLY".to_string(),
    })))
}
