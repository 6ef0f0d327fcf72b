//! Applies the migration chain to individual schemas.
//!
//! The ledger (`seaql_migrations`, one per schema thanks to the bound
//! search_path) is the sole source of truth for a schema's head revision.
//! Upgrades refuse to run when the caller's view of the head is behind the
//! compiled-in chain, and concurrent upgrades of the same schema are
//! serialized with a per-schema Postgres advisory lock.

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, RuntimeErr, Statement};

use crate::tenancy::router::{SchemaRouter, TenantConnection};
use crate::tenancy::TenancyError;

const LEDGER_HEAD_QUERY: &str =
    "SELECT version FROM seaql_migrations ORDER BY applied_at DESC, version DESC LIMIT 1";

#[derive(Clone)]
pub struct MigrationApplier {
    router: Arc<SchemaRouter>,
}

impl MigrationApplier {
    pub fn new(router: Arc<SchemaRouter>) -> Self {
        Self { router }
    }

    /// Tip revision of the compiled-in migration chain.
    pub fn config_head() -> &'static str {
        migration::config_head()
    }

    /// Head revision recorded in the schema's ledger, or `None` when the
    /// schema has never been touched by a migration.
    pub async fn current_head(
        &self,
        handle: &TenantConnection,
    ) -> Result<Option<String>, TenancyError> {
        let stmt = Statement::from_string(
            handle.connection().get_database_backend(),
            LEDGER_HEAD_QUERY.to_string(),
        );

        match handle.connection().query_one(stmt).await {
            Ok(Some(row)) => Ok(Some(row.try_get("", "version")?)),
            Ok(None) => Ok(None),
            Err(err) if is_undefined_table(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Like [`Self::current_head`], but the absence of a ledger is an error.
    pub async fn require_head(&self, handle: &TenantConnection) -> Result<String, TenancyError> {
        self.current_head(handle)
            .await?
            .ok_or_else(|| TenancyError::SchemaNotInitialized(handle.schema().to_string()))
    }

    /// Brings `schema` from its current ledger position to the chain's tip.
    ///
    /// `from_revision` is the caller's view of the master schema's head; it
    /// must match the compiled-in chain's tip, otherwise the migration
    /// definitions are stale relative to the database and provisioning new
    /// tenants against them would bake in drift. Each pending step applies
    /// atomically; a failure leaves the ledger at the last good revision.
    pub async fn upgrade(
        &self,
        schema: &str,
        from_revision: &str,
    ) -> Result<String, TenancyError> {
        let config_head = Self::config_head();
        if from_revision != config_head {
            return Err(TenancyError::MigrationsOutOfDate {
                database_head: from_revision.to_string(),
                config_head: config_head.to_string(),
            });
        }

        // Single-session handle: the advisory lock and the DDL it guards
        // must run on the same Postgres session.
        let handle = self.router.bind_schema_exclusive(schema).await?;
        let conn = handle.connection();

        acquire_schema_lock(conn, schema).await?;
        let outcome = Migrator::up(conn, None).await;
        if let Err(err) = release_schema_lock(conn, schema).await {
            tracing::warn!(schema, error = %err, "failed to release schema advisory lock");
        }
        outcome?;

        let head = self.require_head(&handle).await?;
        tracing::info!(schema, head, "schema upgraded to migration head");
        Ok(head)
    }

    /// Brings the master schema itself to the chain's tip.
    ///
    /// This is the bootstrap path (`busline migrate` against a fresh
    /// database): the master has no ledger yet, so the head precondition
    /// of [`Self::upgrade`] cannot apply. Tenant schemas never take this
    /// path.
    pub async fn bootstrap_master(&self) -> Result<String, TenancyError> {
        let handle = self
            .router
            .bind_schema_exclusive(crate::tenancy::MASTER_SCHEMA)
            .await?;
        let conn = handle.connection();

        acquire_schema_lock(conn, handle.schema()).await?;
        let outcome = Migrator::up(conn, None).await;
        if let Err(err) = release_schema_lock(conn, handle.schema()).await {
            tracing::warn!(error = %err, "failed to release master advisory lock");
        }
        outcome?;

        self.require_head(&handle).await
    }
}

async fn acquire_schema_lock(conn: &DatabaseConnection, schema: &str) -> Result<(), TenancyError> {
    conn.execute(Statement::from_sql_and_values(
        conn.get_database_backend(),
        "SELECT pg_advisory_lock(hashtext($1)::bigint)",
        [schema.into()],
    ))
    .await?;
    Ok(())
}

async fn release_schema_lock(conn: &DatabaseConnection, schema: &str) -> Result<(), TenancyError> {
    conn.execute(Statement::from_sql_and_values(
        conn.get_database_backend(),
        "SELECT pg_advisory_unlock(hashtext($1)::bigint)",
        [schema.into()],
    ))
    .await?;
    Ok(())
}

fn is_undefined_table(error: &DbErr) -> bool {
    const PG_UNDEFINED_TABLE: &str = "42P01";

    let runtime_err = match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    db_error
        .code()
        .is_some_and(|code| code.as_ref() == PG_UNDEFINED_TABLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn config_head_matches_migration_chain() {
        assert_eq!(MigrationApplier::config_head(), migration::config_head());
        migration::validate_chain().expect("chain validates");
    }

    #[tokio::test]
    async fn stale_from_revision_is_rejected_before_touching_the_database() {
        // No database is reachable here; the head check happens first, so
        // a stale revision must fail without any connection attempt.
        let config = AppConfig::default();
        let applier = MigrationApplier::new(Arc::new(SchemaRouter::new(&config)));

        let err = applier
            .upgrade("tn_0123abcd4567", "m2024_06_01_000001_init_master")
            .await
            .unwrap_err();

        assert!(matches!(err, TenancyError::MigrationsOutOfDate { .. }));
    }

    #[tokio::test]
    async fn stale_revision_error_names_both_heads() {
        let config = AppConfig::default();
        let applier = MigrationApplier::new(Arc::new(SchemaRouter::new(&config)));

        let err = applier
            .upgrade("tn_0123abcd4567", "not_a_real_revision")
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("not_a_real_revision"));
        assert!(message.contains(migration::config_head()));
    }
}
