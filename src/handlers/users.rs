//! # User Management Handlers
//!
//! Super-admin endpoint for creating branch users in the master schema.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::error::{validation_error, ApiError};
use crate::handlers::types::ApiResponse;
use crate::repositories::{BranchRepository, CreateUserRequest, UserRepository};
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserCreationRequest {
    pub name: String,
    #[schema(example = "manager@example.com")]
    pub email: String,
    pub password: String,
    pub contact: String,
    #[schema(example = "Admin")]
    pub role: String,
    pub branch_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub role: String,
    pub branch_id: Option<i32>,
    pub is_active: bool,
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    security(("bearer_auth" = [])),
    request_body = UserCreationRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<UserCreationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let role = Role::parse(&request.role).ok_or_else(|| {
        validation_error(
            "Unknown role",
            serde_json::json!({ "role": "must be 'Super Admin' or 'Admin'" }),
        )
    })?;

    let master = state.router.master().await?;

    if let Some(branch_id) = request.branch_id {
        let branches = BranchRepository::new(master.connection());
        if branches.get_branch(branch_id).await?.is_none() {
            return Err(validation_error(
                "Unknown branch",
                serde_json::json!({ "branch_id": "no branch with this id" }),
            ));
        }
    }

    let repo = UserRepository::new(master.connection());
    if repo.email_exists(&request.email).await? {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            "Email is already registered",
        ));
    }

    let user = repo
        .create_user(CreateUserRequest {
            name: request.name,
            email: request.email,
            password: request.password,
            contact: request.contact,
            role,
            branch_id: request.branch_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            contact: user.contact,
            role: user.role,
            branch_id: user.branch_id,
            is_active: user.is_active,
        })),
    ))
}
