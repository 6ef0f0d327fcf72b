//! Router-level tests that need no database: the auth middleware rejects
//! these requests before any handler or schema binding runs.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use tower::ServiceExt;

use busline::auth::{issue_token, Claims, Role};
use busline::config::AppConfig;
use busline::server::{create_app, AppState};

fn claims(role: Role) -> Claims {
    Claims {
        id: 1,
        name: "Asha".to_string(),
        contact: "9876543210".to_string(),
        role,
        branch_id: Some(1),
        sub: "asha@example.com".to_string(),
        exp: (Utc::now() + chrono::Duration::minutes(5)).timestamp() as usize,
    }
}

#[tokio::test]
async fn root_returns_service_info() {
    let app = create_app(AppState::new(AppConfig::default()));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["service"], "busline");
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = create_app(AppState::new(AppConfig::default()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/tickets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let app = create_app(AppState::new(AppConfig::default()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/buses")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn super_admin_routes_reject_admin_tokens() {
    let config = AppConfig::default();
    let token = issue_token(&config, &claims(Role::Admin)).unwrap();
    let app = create_app(AppState::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/branches")
                .header("Authorization", format!("Bearer {token}"))
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "Sly Branch",
                        "city": "Nowhere",
                        "domain_name": "sly"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn token_without_branch_cannot_reach_tenant_routes() {
    let config = AppConfig::default();
    let mut unbranched = claims(Role::Admin);
    unbranched.branch_id = None;
    let token = issue_token(&config, &unbranched).unwrap();
    let app = create_app(AppState::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/companies")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
