//! # Branch Management Handlers
//!
//! Super-admin endpoints for provisioning and inspecting tenants. Creating
//! a branch is a full tenant provisioning run: schema allocation, master
//! registration, and migration to the chain's tip.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{validation_error, ApiError, ErrorType};
use crate::handlers::types::ApiResponse;
use crate::models::branch::Model as BranchModel;
use crate::repositories::BranchRepository;
use crate::server::AppState;
use crate::tenancy::ProvisionBranchRequest;

#[derive(Debug, Deserialize, ToSchema)]
pub struct BranchRequest {
    #[schema(example = "Orange Travels")]
    pub name: String,
    #[schema(example = "Kadapa")]
    pub city: String,
    #[schema(example = "kdp")]
    pub domain_name: String,
    pub logo_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BranchResponse {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub domain_name: String,
    /// Name of the tenant's isolated schema.
    pub schema: String,
    pub logo_path: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<BranchModel> for BranchResponse {
    fn from(branch: BranchModel) -> Self {
        Self {
            id: branch.id,
            name: branch.name,
            city: branch.city,
            domain_name: branch.domain_name,
            schema: branch.schema,
            logo_path: branch.logo_path,
            is_active: branch.is_active,
            created_at: branch.created_at.to_rfc3339(),
        }
    }
}

/// Provision a new branch (tenant).
#[utoipa::path(
    post,
    path = "/api/v1/branches",
    security(("bearer_auth" = [])),
    request_body = BranchRequest,
    responses(
        (status = 201, description = "Branch provisioned", body = ApiResponse<BranchResponse>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "City or domain already in use", body = ApiError),
        (status = 500, description = "Provisioning failed; tenant may need manual remediation", body = ApiError)
    ),
    tag = "branches"
)]
pub async fn create_branch(
    State(state): State<AppState>,
    Json(request): Json<BranchRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BranchResponse>>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(validation_error(
            "Branch name is required",
            serde_json::json!({ "name": "must not be empty" }),
        ));
    }
    if request.domain_name.trim().is_empty() || request.domain_name.len() > 10 {
        return Err(validation_error(
            "Domain name must be 1-10 characters",
            serde_json::json!({ "domain_name": "must be 1-10 characters" }),
        ));
    }

    let master = state.router.master().await?;
    let repo = BranchRepository::new(master.connection());

    if repo.city_exists(&request.city).await? {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            "A branch already exists in this city",
        ));
    }
    if repo.domain_name_exists(&request.domain_name).await? {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            "Domain name is already in use",
        ));
    }
    drop(master);

    let branch = state
        .provisioner
        .provision(ProvisionBranchRequest {
            name: request.name,
            city: request.city,
            domain_name: request.domain_name,
            logo_path: request.logo_path,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(BranchResponse::from(branch))),
    ))
}

/// List all branches.
#[utoipa::path(
    get,
    path = "/api/v1/branches",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All branches", body = ApiResponse<Vec<BranchResponse>>)
    ),
    tag = "branches"
)]
pub async fn list_branches(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BranchResponse>>>, ApiError> {
    let master = state.router.master().await?;
    let branches = BranchRepository::new(master.connection())
        .list_branches()
        .await?;

    Ok(Json(ApiResponse::new(
        branches.into_iter().map(BranchResponse::from).collect(),
    )))
}

/// Get a branch by ID.
#[utoipa::path(
    get,
    path = "/api/v1/branches/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Branch ID")),
    responses(
        (status = 200, description = "The branch", body = ApiResponse<BranchResponse>),
        (status = 404, description = "No such branch", body = ApiError)
    ),
    tag = "branches"
)]
pub async fn get_branch(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BranchResponse>>, ApiError> {
    let master = state.router.master().await?;
    let branch = BranchRepository::new(master.connection())
        .get_branch(id)
        .await?
        .ok_or(ErrorType::NotFound)?;

    Ok(Json(ApiResponse::new(BranchResponse::from(branch))))
}
