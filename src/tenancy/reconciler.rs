//! Startup reconciliation: every known tenant schema is brought to the
//! migration head before the process serves traffic.

use std::sync::Arc;

use sea_orm::EntityTrait;

use crate::models::branch::Entity as Branch;
use crate::tenancy::migrator::MigrationApplier;
use crate::tenancy::router::SchemaRouter;
use crate::tenancy::TenancyError;

/// One tenant the reconciler could not upgrade.
#[derive(Debug)]
pub struct ReconcileFailure {
    pub branch_id: i32,
    pub schema: String,
    pub reason: String,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub upgraded: Vec<String>,
    pub failed: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Walks every branch row (active or not) and upgrades its schema.
///
/// A missing master ledger is an error to the caller: nothing can proceed
/// when the master schema itself was never migrated. A failure on one
/// tenant is recorded and the loop continues; the failed tenant stays
/// un-migrated and must be quarantined by the caller.
pub async fn reconcile_all(
    router: &Arc<SchemaRouter>,
    applier: &MigrationApplier,
) -> Result<ReconcileReport, TenancyError> {
    let master = router.master().await?;
    let master_head = applier.require_head(&master).await?;

    let branches = Branch::find().all(master.connection()).await?;
    drop(master);

    let mut report = ReconcileReport::default();
    for branch in branches {
        match applier.upgrade(&branch.schema, &master_head).await {
            Ok(head) => {
                tracing::info!(
                    branch_id = branch.id,
                    schema = branch.schema,
                    head,
                    "tenant schema reconciled"
                );
                report.upgraded.push(branch.schema);
            }
            Err(err) => {
                metrics::counter!("busline_tenant_reconcile_failures_total").increment(1);
                tracing::error!(
                    branch_id = branch.id,
                    schema = branch.schema,
                    error = %err,
                    "tenant schema failed to reconcile; leaving it un-migrated"
                );
                report.failed.push(ReconcileFailure {
                    branch_id: branch.id,
                    schema: branch.schema,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_clean() {
        assert!(ReconcileReport::default().is_clean());
    }

    #[test]
    fn report_with_failures_is_not_clean() {
        let report = ReconcileReport {
            upgraded: vec!["tn001".to_string()],
            failed: vec![ReconcileFailure {
                branch_id: 2,
                schema: "tn002".to_string(),
                reason: "duplicate seed".to_string(),
            }],
        };
        assert!(!report.is_clean());
    }
}
