//! # Authentication Handlers
//!
//! Login issues a signed token carrying the caller's role and branch; the
//! tenancy layer later consumes only the `branch_id` claim.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{expiry_timestamp, issue_token, Claims, Role};
use crate::error::ApiError;
use crate::handlers::types::ApiResponse;
use crate::repositories::user::verify_password;
use crate::repositories::UserRepository;
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@busline.dev")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub name: String,
    pub email: String,
    pub role: String,
    pub contact: String,
    pub jwt_token: String,
}

/// Authenticate a user and issue a JWT on success.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Unknown user or wrong password", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let master = state.router.master().await?;
    let repo = UserRepository::new(master.connection());

    let user = repo.find_active_by_email(&request.email).await?;

    let Some(user) = user else {
        return Err(invalid_credentials());
    };

    if !verify_password(&request.password, &user.password_hash) {
        return Err(invalid_credentials());
    }

    let role = Role::parse(&user.role).ok_or_else(|| {
        tracing::error!(user_id = user.id, role = user.role, "user carries an unknown role");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An internal error occurred",
        )
    })?;

    let claims = Claims {
        id: user.id,
        name: user.name.clone(),
        contact: user.contact.clone(),
        role,
        branch_id: user.branch_id,
        sub: user.email.clone(),
        exp: expiry_timestamp(&state.config),
    };

    let jwt_token = issue_token(&state.config, &claims).map_err(|err| {
        tracing::error!(error = %err, "failed to sign token");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An internal error occurred",
        )
    })?;

    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(ApiResponse::new(LoginResponse {
        name: user.name,
        email: user.email,
        role: user.role,
        contact: user.contact,
        jwt_token,
    })))
}

fn invalid_credentials() -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        "INVALID_CREDENTIALS",
        "Incorrect email or password",
    )
}
