//! End-to-end creation of a new tenant.

use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};

use crate::models::branch;
use crate::tenancy::migrator::MigrationApplier;
use crate::tenancy::router::{validate_schema_name, SchemaRouter};
use crate::tenancy::TenancyError;

/// Caller-supplied branch attributes. The schema name is never part of
/// this: it is generated during provisioning.
#[derive(Debug, Clone)]
pub struct ProvisionBranchRequest {
    pub name: String,
    pub city: String,
    pub domain_name: String,
    pub logo_path: Option<String>,
}

pub struct TenantProvisioner {
    router: Arc<SchemaRouter>,
    applier: MigrationApplier,
}

impl TenantProvisioner {
    pub fn new(router: Arc<SchemaRouter>, applier: MigrationApplier) -> Self {
        Self { router, applier }
    }

    /// Provisions a new tenant: allocate a schema name, create the schema,
    /// register the branch in the master schema, then migrate the schema to
    /// the chain's tip.
    ///
    /// If migration fails after the branch row is committed, the tenant is
    /// left registered but unmigrated. That state is surfaced as a fatal
    /// provisioning error and never retried automatically; `busline
    /// migrate` re-runs the upgrade for the schema.
    pub async fn provision(
        &self,
        request: ProvisionBranchRequest,
    ) -> Result<branch::Model, TenancyError> {
        let schema = migration::generate_schema_name();
        // Generated names always satisfy the identifier pattern; the check
        // stands anyway because the name is about to be spliced into DDL.
        validate_schema_name(&schema)?;

        let master = self.router.master().await?;

        master
            .connection()
            .execute(Statement::from_string(
                master.connection().get_database_backend(),
                format!("CREATE SCHEMA IF NOT EXISTS \"{schema}\""),
            ))
            .await?;

        let branch = branch::ActiveModel {
            name: Set(request.name),
            city: Set(request.city),
            domain_name: Set(request.domain_name),
            schema: Set(schema.clone()),
            logo_path: Set(request.logo_path),
            ..Default::default()
        }
        .insert(master.connection())
        .await?;

        let master_head = self.applier.require_head(&master).await?;
        drop(master);

        match self.applier.upgrade(&schema, &master_head).await {
            Ok(head) => {
                metrics::counter!("busline_tenants_provisioned_total").increment(1);
                tracing::info!(
                    branch_id = branch.id,
                    schema,
                    head,
                    "provisioned new tenant"
                );
                Ok(branch)
            }
            Err(err) => {
                metrics::counter!("busline_tenant_provisioning_failures_total").increment(1);
                tracing::error!(
                    branch_id = branch.id,
                    schema,
                    error = %err,
                    "tenant is registered but unmigrated; run `busline migrate` to remediate"
                );
                Err(err)
            }
        }
    }
}
