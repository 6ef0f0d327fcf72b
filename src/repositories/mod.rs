//! # Repository Layer
//!
//! Repositories encapsulate SeaORM operations for the entities. Master
//! repositories (branch, user) run on the master handle; tenant
//! repositories only ever receive schema-bound handles, so they cannot
//! reach across tenants.

use axum::http::StatusCode;
use sea_orm::DbErr;
use thiserror::Error;

use crate::error::ApiError;

pub mod branch;
pub mod bus;
pub mod company;
pub mod route;
pub mod schedule;
pub mod ticket;
pub mod user;

pub use branch::BranchRepository;
pub use bus::BusRepository;
pub use company::CompanyRepository;
pub use route::RouteRepository;
pub use schedule::ScheduleRepository;
pub use ticket::TicketRepository;
pub use user::{CreateUserRequest, UserRepository};

/// Errors surfaced by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(message) => {
                ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", &message)
            }
            RepositoryError::Validation(message) => {
                ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
            }
            RepositoryError::Database(db_err) => db_err.into(),
        }
    }
}
