//! # Authentication and Authorization
//!
//! Bearer JWT verification for protected endpoints, plus the explicit
//! route-to-permission table. The tenancy core only ever consumes the
//! `branch_id` claim; everything else is for the business layer.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, MatchedPath, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{forbidden, unauthorized, ApiError};
use crate::server::AppState;
use crate::tenancy::TenantConnection;

/// User roles. Stored on the user row and carried in token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    #[serde(rename = "Admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Admin => "Admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Super Admin" => Some(Role::SuperAdmin),
            "Admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Claims carried by a signed token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub name: String,
    pub contact: String,
    pub role: Role,
    pub branch_id: Option<i32>,
    /// User email.
    pub sub: String,
    pub exp: usize,
}

/// Authenticated caller, inserted into request extensions by the middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

/// Routes that require a specific role, keyed by the matched route pattern.
/// Routes absent from this table only require a valid token.
const ROUTE_PERMISSIONS: &[(&str, Role)] = &[
    ("/api/v1/branches", Role::SuperAdmin),
    ("/api/v1/branches/{id}", Role::SuperAdmin),
    ("/api/v1/users", Role::SuperAdmin),
];

/// Minimum role for a matched route pattern, if the route is gated.
pub fn required_role(route: &str) -> Option<Role> {
    ROUTE_PERMISSIONS
        .iter()
        .find(|(pattern, _)| *pattern == route)
        .map(|(_, role)| *role)
}

/// Signs a token for the given claims.
pub fn issue_token(
    config: &AppConfig,
    claims: &Claims,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// Verifies a token's signature and expiry and returns its claims.
pub fn verify_token(
    config: &AppConfig,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Expiry timestamp for a token issued now.
pub fn expiry_timestamp(config: &AppConfig) -> usize {
    let expires = Utc::now() + chrono::Duration::minutes(config.jwt_expiry_minutes as i64);
    expires.timestamp() as usize
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

/// Authentication middleware: validates the bearer token and enforces the
/// route-permission table before handing the request to its handler.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&request)?;
    let claims =
        verify_token(&config, token).map_err(|_| unauthorized(Some("Invalid bearer token")))?;

    if let Some(required) = request
        .extensions()
        .get::<MatchedPath>()
        .and_then(|path| required_role(path.as_str()))
    {
        if claims.role != required {
            return Err(forbidden(None));
        }
    }

    tracing::debug!(user_id = claims.id, role = claims.role.as_str(), "authenticated request");
    request.extensions_mut().insert(CurrentUser(claims));

    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> Result<&str, ApiError> {
    request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))?
        .to_str()
        .map_err(|_| unauthorized(Some("Invalid Authorization header")))?
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| unauthorized(None))
    }
}

/// Extractor yielding a database handle bound to the caller's tenant schema.
///
/// The handle lives for the request only; it is returned to its pool when
/// dropped, whether the handler succeeded or failed.
pub struct TenantDb(pub TenantConnection);

impl FromRequestParts<AppState> for TenantDb {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| unauthorized(None))?;

        let branch_id = user
            .0
            .branch_id
            .ok_or_else(|| forbidden(Some("No branch associated with this account")))?;

        let conn = state.resolver.bind_for_branch(branch_id).await?;
        Ok(TenantDb(conn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> Claims {
        Claims {
            id: 7,
            name: "Asha".to_string(),
            contact: "9876543210".to_string(),
            role,
            branch_id: Some(3),
            sub: "asha@example.com".to_string(),
            exp: (Utc::now() + chrono::Duration::minutes(5)).timestamp() as usize,
        }
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let config = AppConfig::default();
        let original = claims(Role::Admin);

        let token = issue_token(&config, &original).unwrap();
        let decoded = verify_token(&config, &token).unwrap();

        assert_eq!(decoded.id, original.id);
        assert_eq!(decoded.sub, original.sub);
        assert_eq!(decoded.branch_id, Some(3));
        assert_eq!(decoded.role, Role::Admin);
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = AppConfig::default();
        let mut expired = claims(Role::Admin);
        expired.exp = (Utc::now() - chrono::Duration::hours(2)).timestamp() as usize;

        let token = issue_token(&config, &expired).unwrap();
        assert!(verify_token(&config, &token).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = AppConfig::default();
        let other = AppConfig {
            jwt_secret: "some-other-secret".to_string(),
            ..Default::default()
        };

        let token = issue_token(&other, &claims(Role::SuperAdmin)).unwrap();
        assert!(verify_token(&config, &token).is_err());
    }

    #[test]
    fn permission_table_gates_branch_management() {
        assert_eq!(required_role("/api/v1/branches"), Some(Role::SuperAdmin));
        assert_eq!(
            required_role("/api/v1/branches/{id}"),
            Some(Role::SuperAdmin)
        );
        assert_eq!(required_role("/api/v1/users"), Some(Role::SuperAdmin));
        assert_eq!(required_role("/api/v1/tickets"), None);
    }

    #[test]
    fn role_serde_uses_stored_spelling() {
        assert_eq!(Role::parse("Super Admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse("admin"), None);

        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"Super Admin\"");
    }
}
