//! Integration tests for schema routing, provisioning, and reconciliation.
//!
//! These tests need a real Postgres database and are gated on
//! `BUSLINE_TEST_DATABASE_URL`; without it every test returns early. The
//! database is shared across tests, so all generated names are unique per
//! run.

use std::sync::Arc;

use anyhow::Result;
use sea_orm::{ConnectionTrait, Statement};

use busline::config::AppConfig;
use busline::repositories::bus::CreateBusRequest;
use busline::repositories::company::CompanyData;
use busline::repositories::{BusRepository, CompanyRepository, RouteRepository};
use busline::tenancy::{
    reconcile_all, MigrationApplier, ProvisionBranchRequest, Quarantine, SchemaRouter,
    TenancyError, TenantProvisioner, TenantResolver,
};

struct TestContext {
    router: Arc<SchemaRouter>,
    applier: MigrationApplier,
    provisioner: TenantProvisioner,
}

async fn setup() -> Option<TestContext> {
    let url = std::env::var("BUSLINE_TEST_DATABASE_URL").ok()?;

    let config = AppConfig {
        profile: "test".to_string(),
        database_url: url,
        ..Default::default()
    };

    let router = Arc::new(SchemaRouter::new(&config));
    let applier = MigrationApplier::new(Arc::clone(&router));
    applier
        .bootstrap_master()
        .await
        .expect("master schema bootstraps");
    let provisioner = TenantProvisioner::new(Arc::clone(&router), applier.clone());

    Some(TestContext {
        router,
        applier,
        provisioner,
    })
}

fn unique_branch_request(label: &str) -> ProvisionBranchRequest {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let unique = &suffix[..8];
    ProvisionBranchRequest {
        name: format!("{label} Travels {unique}"),
        city: format!("{label}-{unique}"),
        domain_name: unique.to_string(),
        logo_path: None,
    }
}

async fn exec(ctx: &TestContext, sql: String) -> Result<()> {
    let master = ctx.router.master().await?;
    master
        .connection()
        .execute(Statement::from_string(
            master.connection().get_database_backend(),
            sql,
        ))
        .await?;
    Ok(())
}

#[tokio::test]
async fn bind_schema_round_trips_through_current_schema() -> Result<()> {
    let Some(ctx) = setup().await else {
        return Ok(());
    };

    let schema = migration::generate_schema_name();
    exec(&ctx, format!("CREATE SCHEMA IF NOT EXISTS \"{schema}\"")).await?;

    let handle = ctx.router.bind_schema(&schema).await?;
    assert_eq!(handle.schema(), schema);
    assert_eq!(handle.current_schema().await?, schema);

    exec(&ctx, format!("DROP SCHEMA \"{schema}\" CASCADE")).await?;
    Ok(())
}

#[tokio::test]
async fn freshly_provisioned_tenant_is_at_config_head() -> Result<()> {
    let Some(ctx) = setup().await else {
        return Ok(());
    };

    let branch = ctx
        .provisioner
        .provision(unique_branch_request("Head"))
        .await?;

    let handle = ctx.router.bind_schema(&branch.schema).await?;
    let head = ctx.applier.current_head(&handle).await?;

    assert_eq!(head.as_deref(), Some(MigrationApplier::config_head()));
    Ok(())
}

#[tokio::test]
async fn stale_from_revision_leaves_ledger_untouched() -> Result<()> {
    let Some(ctx) = setup().await else {
        return Ok(());
    };

    let branch = ctx
        .provisioner
        .provision(unique_branch_request("Stale"))
        .await?;

    let handle = ctx.router.bind_schema(&branch.schema).await?;
    let head_before = ctx.applier.current_head(&handle).await?;

    let err = ctx
        .applier
        .upgrade(&branch.schema, "m1999_01_01_000000_bogus")
        .await
        .unwrap_err();
    assert!(matches!(err, TenancyError::MigrationsOutOfDate { .. }));

    let head_after = ctx.applier.current_head(&handle).await?;
    assert_eq!(head_before, head_after);
    Ok(())
}

#[tokio::test]
async fn repeated_upgrade_is_idempotent() -> Result<()> {
    let Some(ctx) = setup().await else {
        return Ok(());
    };

    let branch = ctx
        .provisioner
        .provision(unique_branch_request("Twice"))
        .await?;

    let config_head = MigrationApplier::config_head();
    let first = ctx.applier.upgrade(&branch.schema, config_head).await?;
    let second = ctx.applier.upgrade(&branch.schema, config_head).await?;
    assert_eq!(first, second);
    assert_eq!(second, config_head);

    // Seeded catalogue rows must not be duplicated by the second pass.
    let handle = ctx.router.bind_schema(&branch.schema).await?;
    let routes = RouteRepository::new(handle.connection()).list_routes().await?;
    assert_eq!(routes.len(), 18);
    Ok(())
}

#[tokio::test]
async fn rows_in_one_tenant_are_invisible_to_another() -> Result<()> {
    let Some(ctx) = setup().await else {
        return Ok(());
    };

    let north = ctx
        .provisioner
        .provision(unique_branch_request("North"))
        .await?;
    let south = ctx
        .provisioner
        .provision(unique_branch_request("South"))
        .await?;

    let north_db = ctx.router.bind_schema(&north.schema).await?;
    let company = CompanyRepository::new(north_db.connection())
        .create_company(CompanyData {
            name: "Northern Lines".to_string(),
            contact_person_name: "Ravi".to_string(),
            email: "ops@northern.example".to_string(),
            address: "1 Depot Road".to_string(),
            phone_number: "0400123456".to_string(),
        })
        .await?;
    BusRepository::new(north_db.connection())
        .create_bus(CreateBusRequest {
            company_id: company.id,
            bus_number: "NT01".to_string(),
            bus_type: "AC".to_string(),
            total_seats: 40,
        })
        .await?;

    let south_db = ctx.router.bind_schema(&south.schema).await?;
    let south_buses = BusRepository::new(south_db.connection()).list_buses().await?;
    let south_companies = CompanyRepository::new(south_db.connection())
        .list_companies()
        .await?;

    assert!(south_buses.is_empty());
    assert!(south_companies.is_empty());

    let north_buses = BusRepository::new(north_db.connection()).list_buses().await?;
    assert_eq!(north_buses.len(), 1);
    Ok(())
}

#[tokio::test]
async fn reconcile_continues_past_a_broken_tenant() -> Result<()> {
    let Some(ctx) = setup().await else {
        return Ok(());
    };

    let first = ctx
        .provisioner
        .provision(unique_branch_request("RecA"))
        .await?;
    let broken = ctx
        .provisioner
        .provision(unique_branch_request("RecB"))
        .await?;
    let third = ctx
        .provisioner
        .provision(unique_branch_request("RecC"))
        .await?;

    // Sabotage the middle tenant: its branch row stays but the physical
    // schema is gone, so its upgrade must fail.
    exec(&ctx, format!("DROP SCHEMA \"{}\" CASCADE", broken.schema)).await?;

    let report = reconcile_all(&ctx.router, &ctx.applier).await?;

    assert!(report.upgraded.contains(&first.schema));
    assert!(report.upgraded.contains(&third.schema));
    assert!(
        report
            .failed
            .iter()
            .any(|failure| failure.schema == broken.schema)
    );

    // Repair the sabotaged tenant so later runs reconcile cleanly.
    exec(&ctx, format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", broken.schema)).await?;
    ctx.applier
        .upgrade(&broken.schema, MigrationApplier::config_head())
        .await?;
    Ok(())
}

#[tokio::test]
async fn create_if_not_exists_does_not_clobber_existing_data() -> Result<()> {
    let Some(ctx) = setup().await else {
        return Ok(());
    };

    let schema = migration::generate_schema_name();
    exec(&ctx, format!("CREATE SCHEMA \"{schema}\"")).await?;
    exec(
        &ctx,
        format!("CREATE TABLE \"{schema}\".keepsake (id integer primary key)"),
    )
    .await?;
    exec(&ctx, format!("INSERT INTO \"{schema}\".keepsake VALUES (7)")).await?;

    // The provisioning step uses the same statement shape; a name
    // collision must leave the existing schema untouched.
    exec(&ctx, format!("CREATE SCHEMA IF NOT EXISTS \"{schema}\"")).await?;

    let master = ctx.router.master().await?;
    let row = master
        .connection()
        .query_one(Statement::from_string(
            master.connection().get_database_backend(),
            format!("SELECT count(*) AS n FROM \"{schema}\".keepsake"),
        ))
        .await?
        .expect("count row");
    let count: i64 = row.try_get("", "n")?;
    assert_eq!(count, 1);

    exec(&ctx, format!("DROP SCHEMA \"{schema}\" CASCADE")).await?;
    Ok(())
}

#[tokio::test]
async fn resolver_maps_branches_and_refuses_quarantined_tenants() -> Result<()> {
    let Some(ctx) = setup().await else {
        return Ok(());
    };

    let branch = ctx
        .provisioner
        .provision(unique_branch_request("Resolve"))
        .await?;

    let quarantine = Arc::new(Quarantine::new());
    let resolver = TenantResolver::new(Arc::clone(&ctx.router), Arc::clone(&quarantine));

    let schema = resolver.resolve_branch_schema(branch.id).await?;
    assert_eq!(schema, branch.schema);

    let bound = resolver.bind_for_branch(branch.id).await?;
    assert_eq!(bound.current_schema().await?, branch.schema);

    let missing = resolver.resolve_branch_schema(i32::MAX).await.unwrap_err();
    assert!(matches!(missing, TenancyError::TenantNotFound(_)));

    quarantine.quarantine(branch.schema.clone());
    let refused = resolver.resolve_branch_schema(branch.id).await.unwrap_err();
    assert!(matches!(refused, TenancyError::TenantNotFound(_)));
    Ok(())
}

#[tokio::test]
async fn master_bootstrap_seeds_exactly_one_initial_tenant() -> Result<()> {
    let Some(ctx) = setup().await else {
        return Ok(());
    };

    let master = ctx.router.master().await?;
    let row = master
        .connection()
        .query_one(Statement::from_string(
            master.connection().get_database_backend(),
            "SELECT count(*) AS n FROM branches WHERE domain_name = 'kdp'".to_string(),
        ))
        .await?
        .expect("count row");
    let count: i64 = row.try_get("", "n")?;

    // Re-running bootstrap (every test calls it) must not duplicate the
    // seed branch.
    assert_eq!(count, 1);
    Ok(())
}
