//! Multi-tenant schema routing and provisioning.
//!
//! Every tenant's data lives in its own Postgres schema. The pieces here
//! keep that isolation airtight: the [`SchemaRouter`] binds connections to
//! one schema for their whole life, the [`TenantResolver`] maps an
//! authenticated branch to its schema, the [`MigrationApplier`] keeps each
//! schema in lockstep with the compiled-in migration chain, and the
//! provisioner/reconciler orchestrate the two.

use thiserror::Error;

pub mod migrator;
pub mod provisioner;
pub mod reconciler;
pub mod resolver;
pub mod router;

pub use migration::MASTER_SCHEMA;
pub use migrator::MigrationApplier;
pub use provisioner::{ProvisionBranchRequest, TenantProvisioner};
pub use reconciler::{reconcile_all, ReconcileFailure, ReconcileReport};
pub use resolver::{Quarantine, TenantResolver};
pub use router::{SchemaRouter, TenantConnection};

/// Errors raised by the tenancy layer.
#[derive(Debug, Error)]
pub enum TenancyError {
    /// The referenced tenant is empty, unknown, inactive, or quarantined.
    #[error("tenant '{0}' not found")]
    TenantNotFound(String),

    /// The schema carries no migration ledger but a head was required.
    #[error("schema '{0}' has no migration ledger; run migrations before using it")]
    SchemaNotInitialized(String),

    /// The database head and the compiled-in migration chain disagree.
    /// Retrying without fixing the chain would fail the same way, so this
    /// is surfaced to the operator instead.
    #[error(
        "database head '{database_head}' does not match migration head '{config_head}'; \
         execute migrations before adding new tenants"
    )]
    MigrationsOutOfDate {
        database_head: String,
        config_head: String,
    },

    /// A schema name failed the identifier pattern. Schema names are
    /// generated internally, so this indicates a bug or tampered data.
    #[error("schema name '{0}' is not a valid identifier")]
    InvalidSchemaName(String),

    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
}
