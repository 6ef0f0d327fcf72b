//! # Server Configuration
//!
//! Application state, router construction, and the startup sequence:
//! configuration validation, telemetry, database availability, tenant
//! reconciliation, then serving.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth;
use crate::config::AppConfig;
use crate::db;
use crate::handlers;
use crate::telemetry;
use crate::tenancy::{
    reconcile_all, MigrationApplier, Quarantine, SchemaRouter, TenantProvisioner, TenantResolver,
};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub router: Arc<SchemaRouter>,
    pub resolver: Arc<TenantResolver>,
    pub provisioner: Arc<TenantProvisioner>,
    pub applier: MigrationApplier,
    pub quarantine: Arc<Quarantine>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let config = Arc::new(config);
        let router = Arc::new(SchemaRouter::new(&config));
        let quarantine = Arc::new(Quarantine::new());
        let applier = MigrationApplier::new(Arc::clone(&router));
        let resolver = Arc::new(TenantResolver::new(
            Arc::clone(&router),
            Arc::clone(&quarantine),
        ));
        let provisioner = Arc::new(TenantProvisioner::new(Arc::clone(&router), applier.clone()));

        Self {
            config,
            router,
            resolver,
            provisioner,
            applier,
            quarantine,
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/v1/auth/login", post(handlers::auth::login));

    let protected = Router::new()
        .route(
            "/api/v1/branches",
            post(handlers::branches::create_branch).get(handlers::branches::list_branches),
        )
        .route("/api/v1/branches/{id}", get(handlers::branches::get_branch))
        .route("/api/v1/users", post(handlers::users::create_user))
        .route(
            "/api/v1/companies",
            post(handlers::companies::create_company).get(handlers::companies::list_companies),
        )
        .route(
            "/api/v1/companies/{id}",
            get(handlers::companies::get_company)
                .put(handlers::companies::update_company)
                .delete(handlers::companies::delete_company),
        )
        .route(
            "/api/v1/buses",
            post(handlers::buses::create_bus).get(handlers::buses::list_buses),
        )
        .route("/api/v1/buses/{id}", get(handlers::buses::get_bus))
        .route("/api/v1/routes", get(handlers::routes::list_routes))
        .route("/api/v1/routes/{id}", get(handlers::routes::get_route))
        .route(
            "/api/v1/schedules",
            post(handlers::schedules::create_schedule).get(handlers::schedules::list_schedules),
        )
        .route(
            "/api/v1/schedules/{id}",
            get(handlers::schedules::get_schedule),
        )
        .route(
            "/api/v1/tickets",
            post(handlers::tickets::create_ticket).get(handlers::tickets::list_tickets),
        )
        .route("/api/v1/tickets/{id}", get(handlers::tickets::get_ticket))
        .route(
            "/api/v1/tickets/{id}/cancel",
            post(handlers::tickets::cancel_ticket),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(telemetry::trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    telemetry::init_tracing(&config)?;
    migration::validate_chain().map_err(|err| format!("invalid migration chain: {err}"))?;

    db::wait_for_database(&config).await?;

    let state = AppState::new(config);

    // Master-schema unavailability here is fatal to the process; a failure
    // on an individual tenant quarantines that tenant and startup proceeds.
    let report = reconcile_all(&state.router, &state.applier).await?;
    for failure in &report.failed {
        state.quarantine.quarantine(failure.schema.clone());
    }
    if report.is_clean() {
        tracing::info!(
            tenants = report.upgraded.len(),
            "all tenant schemas reconciled"
        );
    } else {
        tracing::warn!(
            upgraded = report.upgraded.len(),
            failed = report.failed.len(),
            "reconciliation completed with failures; failed tenants are quarantined"
        );
    }

    let addr = state
        .config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;
    let profile = state.config.profile.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, profile, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Migrates the master schema, then re-applies pending migrations to every
/// tenant schema. This is the operator remediation path for tenants left
/// registered but unmigrated.
pub async fn run_migrations(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    telemetry::init_tracing(&config)?;
    migration::validate_chain().map_err(|err| format!("invalid migration chain: {err}"))?;

    db::wait_for_database(&config).await?;

    let state = AppState::new(config);

    let master_head = state.applier.bootstrap_master().await?;
    println!("master schema at {master_head}");

    let report = reconcile_all(&state.router, &state.applier).await?;
    for schema in &report.upgraded {
        println!("upgraded {schema}");
    }
    for failure in &report.failed {
        eprintln!(
            "FAILED {} (branch {}): {}",
            failure.schema, failure.branch_id, failure.reason
        );
    }

    if report.is_clean() {
        Ok(())
    } else {
        Err(format!("{} tenant schema(s) failed to migrate", report.failed.len()).into())
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::auth::login,
        crate::handlers::branches::create_branch,
        crate::handlers::branches::list_branches,
        crate::handlers::branches::get_branch,
        crate::handlers::users::create_user,
        crate::handlers::companies::create_company,
        crate::handlers::companies::list_companies,
        crate::handlers::companies::get_company,
        crate::handlers::companies::update_company,
        crate::handlers::companies::delete_company,
        crate::handlers::buses::create_bus,
        crate::handlers::buses::list_buses,
        crate::handlers::buses::get_bus,
        crate::handlers::routes::list_routes,
        crate::handlers::routes::get_route,
        crate::handlers::schedules::create_schedule,
        crate::handlers::schedules::get_schedule,
        crate::handlers::schedules::list_schedules,
        crate::handlers::tickets::create_ticket,
        crate::handlers::tickets::list_tickets,
        crate::handlers::tickets::get_ticket,
        crate::handlers::tickets::cancel_ticket,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
        )
    ),
    info(
        title = "Busline API",
        description = "Multi-tenant bus ticketing API",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
