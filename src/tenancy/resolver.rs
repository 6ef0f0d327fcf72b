//! Maps an authenticated caller's branch to its tenant schema.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::models::branch::{Column as BranchColumn, Entity as Branch};
use crate::tenancy::router::{SchemaRouter, TenantConnection};
use crate::tenancy::TenancyError;

/// Schemas the startup reconciler failed to upgrade.
///
/// An under-migrated schema must not serve traffic; the resolver treats
/// membership here the same as a missing tenant until an operator re-runs
/// migrations and the schema is released.
#[derive(Debug, Default)]
pub struct Quarantine {
    schemas: RwLock<HashSet<String>>,
}

impl Quarantine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quarantine(&self, schema: impl Into<String>) {
        self.schemas
            .write()
            .expect("quarantine lock is never poisoned")
            .insert(schema.into());
    }

    pub fn release(&self, schema: &str) {
        self.schemas
            .write()
            .expect("quarantine lock is never poisoned")
            .remove(schema);
    }

    pub fn contains(&self, schema: &str) -> bool {
        self.schemas
            .read()
            .expect("quarantine lock is never poisoned")
            .contains(schema)
    }
}

/// Resolves branch ids to schema names via the master schema.
pub struct TenantResolver {
    router: Arc<SchemaRouter>,
    quarantine: Arc<Quarantine>,
}

impl TenantResolver {
    pub fn new(router: Arc<SchemaRouter>, quarantine: Arc<Quarantine>) -> Self {
        Self { router, quarantine }
    }

    /// Looks up the active branch and returns its schema name.
    ///
    /// The master handle is released before the caller binds the tenant
    /// handle; nothing here spans both schemas.
    pub async fn resolve_branch_schema(&self, branch_id: i32) -> Result<String, TenancyError> {
        let master = self.router.master().await?;
        let branch = Branch::find_by_id(branch_id)
            .filter(BranchColumn::IsActive.eq(true))
            .one(master.connection())
            .await?;
        drop(master);

        let Some(branch) = branch else {
            return Err(TenancyError::TenantNotFound(branch_id.to_string()));
        };

        // A branch row always carries a schema; an empty value means the
        // master data was tampered with, not that the caller erred.
        let schema = branch.schema.trim().to_string();
        if schema.is_empty() {
            tracing::error!(branch_id, "branch row carries an empty schema name");
            return Err(TenancyError::TenantNotFound(branch_id.to_string()));
        }

        if self.quarantine.contains(&schema) {
            tracing::warn!(
                branch_id,
                schema,
                "refusing to serve quarantined (under-migrated) tenant"
            );
            return Err(TenancyError::TenantNotFound(branch_id.to_string()));
        }

        Ok(schema)
    }

    /// Resolves the branch and binds a schema-scoped handle for it.
    pub async fn bind_for_branch(&self, branch_id: i32) -> Result<TenantConnection, TenancyError> {
        let schema = self.resolve_branch_schema(branch_id).await?;
        self.router.bind_schema(&schema).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarantine_round_trip() {
        let quarantine = Quarantine::new();
        assert!(!quarantine.contains("tn001"));

        quarantine.quarantine("tn001");
        assert!(quarantine.contains("tn001"));
        assert!(!quarantine.contains("tn002"));

        quarantine.release("tn001");
        assert!(!quarantine.contains("tn001"));
    }
}
