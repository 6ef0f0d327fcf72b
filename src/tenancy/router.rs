//! Schema-bound database handles.
//!
//! A [`TenantConnection`] is a SeaORM pool whose `search_path` was fixed at
//! connect time, so every unqualified table reference issued through it
//! resolves inside exactly one schema. Business code never writes
//! schema-qualified SQL; it cannot reach another tenant's rows because the
//! names only resolve inside the bound schema.

use std::num::NonZeroUsize;
use std::sync::LazyLock;
use std::time::Duration;

use lru::LruCache;
use regex::Regex;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::tenancy::{TenancyError, MASTER_SCHEMA};

/// Schema names are generated internally, but they end up in DDL that
/// cannot be parameterized, so they are re-checked against this pattern
/// before every use.
static SCHEMA_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,62}$").expect("schema name pattern compiles"));

/// Rejects anything that is not a safe lowercase identifier.
pub fn validate_schema_name(schema: &str) -> Result<(), TenancyError> {
    if SCHEMA_NAME_PATTERN.is_match(schema) {
        Ok(())
    } else {
        Err(TenancyError::InvalidSchemaName(schema.to_string()))
    }
}

/// A database handle bound to a single schema for its entire lifetime.
#[derive(Debug, Clone)]
pub struct TenantConnection {
    schema: String,
    conn: DatabaseConnection,
}

impl TenantConnection {
    /// The schema this handle was bound to.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// The underlying SeaORM connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Asks Postgres which schema unqualified names currently resolve in.
    pub async fn current_schema(&self) -> Result<String, TenancyError> {
        let row = self
            .conn
            .query_one(Statement::from_string(
                self.conn.get_database_backend(),
                "SELECT current_schema() AS schema".to_string(),
            ))
            .await?;

        let schema: Option<String> = match row {
            Some(row) => row.try_get("", "schema")?,
            None => None,
        };

        schema.ok_or_else(|| TenancyError::TenantNotFound(self.schema.clone()))
    }
}

/// Builds schema-bound handles on top of one Postgres database.
///
/// Handles for frequently used schemas are kept in an LRU cache; evicted
/// entries drop their pool, which closes its connections.
pub struct SchemaRouter {
    database_url: String,
    max_connections: u32,
    acquire_timeout: Duration,
    recycle_after: Duration,
    test_before_acquire: bool,
    handles: Mutex<LruCache<String, DatabaseConnection>>,
}

impl SchemaRouter {
    pub fn new(config: &AppConfig) -> Self {
        let capacity = NonZeroUsize::new(config.db_schema_cache_size.max(1))
            .expect("cache capacity is at least one");

        Self {
            database_url: config.database_url.clone(),
            max_connections: config.db_max_connections,
            acquire_timeout: Duration::from_millis(config.db_acquire_timeout_ms),
            recycle_after: Duration::from_secs(config.db_recycle_seconds),
            test_before_acquire: config.db_test_before_acquire,
            handles: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Binds a pooled handle to `schema`.
    ///
    /// An empty or blank name means the caller never resolved a tenant, so
    /// it fails with [`TenancyError::TenantNotFound`]. Anything that is not
    /// a safe identifier is rejected before it can reach DDL.
    pub async fn bind_schema(&self, schema: &str) -> Result<TenantConnection, TenancyError> {
        let schema = schema.trim();
        if schema.is_empty() {
            return Err(TenancyError::TenantNotFound(schema.to_string()));
        }
        validate_schema_name(schema)?;

        {
            let mut handles = self.handles.lock().await;
            if let Some(conn) = handles.get(schema) {
                return Ok(TenantConnection {
                    schema: schema.to_string(),
                    conn: conn.clone(),
                });
            }
        }

        let conn = self.connect(schema, self.max_connections).await?;

        let mut handles = self.handles.lock().await;
        handles.put(schema.to_string(), conn.clone());

        Ok(TenantConnection {
            schema: schema.to_string(),
            conn,
        })
    }

    /// Binds a single-session handle to `schema`, bypassing the cache.
    ///
    /// The migration applier uses this so a session-level advisory lock and
    /// the DDL it protects are guaranteed to share one Postgres session.
    pub async fn bind_schema_exclusive(
        &self,
        schema: &str,
    ) -> Result<TenantConnection, TenancyError> {
        let schema = schema.trim();
        if schema.is_empty() {
            return Err(TenancyError::TenantNotFound(schema.to_string()));
        }
        validate_schema_name(schema)?;

        let conn = self.connect(schema, 1).await?;

        Ok(TenantConnection {
            schema: schema.to_string(),
            conn,
        })
    }

    /// Binds the master schema.
    pub async fn master(&self) -> Result<TenantConnection, TenancyError> {
        self.bind_schema(MASTER_SCHEMA).await
    }

    async fn connect(
        &self,
        schema: &str,
        max_connections: u32,
    ) -> Result<DatabaseConnection, TenancyError> {
        let mut options = ConnectOptions::new(&self.database_url);
        options
            .max_connections(max_connections)
            .acquire_timeout(self.acquire_timeout)
            .max_lifetime(self.recycle_after)
            .test_before_acquire(self.test_before_acquire)
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug)
            .set_schema_search_path(schema);

        Ok(Database::connect(options).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_generated_and_master_names() {
        validate_schema_name(MASTER_SCHEMA).unwrap();
        validate_schema_name("tn_0123abcd4567").unwrap();
        validate_schema_name("tn001").unwrap();
    }

    #[test]
    fn rejects_injection_unsafe_names() {
        for name in [
            "",
            "Tn_Upper",
            "1leading_digit",
            "tn-dash",
            "tn\"quote",
            "tn;drop schema public cascade",
            "tn space",
        ] {
            assert!(
                validate_schema_name(name).is_err(),
                "expected '{name}' to be rejected"
            );
        }
    }

    #[test]
    fn rejects_names_longer_than_postgres_identifier_limit() {
        let name = format!("a{}", "b".repeat(63));
        assert!(validate_schema_name(&name).is_err());
    }

    #[tokio::test]
    async fn binding_a_blank_schema_is_tenant_not_found() {
        let config = AppConfig::default();
        let router = SchemaRouter::new(&config);

        for name in ["", "   "] {
            let err = router.bind_schema(name).await.unwrap_err();
            assert!(matches!(err, TenancyError::TenantNotFound(_)));
        }
    }
}
