//! Root migration: bootstraps the master schema.
//!
//! Against any schema other than the master this step is a no-op (the
//! ledger still records it, so tenant schemas share the same chain).
//! Against the master it creates the branches and users tables, allocates
//! a schema for the first tenant, and seeds one branch plus one super
//! admin user.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

use crate::{generate_schema_name, MASTER_SCHEMA};

const SEED_BRANCH_NAME: &str = "Bus Travels";
const SEED_BRANCH_CITY: &str = "Kadapa";
const SEED_BRANCH_DOMAIN: &str = "kdp";
const SEED_ADMIN_EMAIL: &str = "admin@busline.dev";
const SEED_ADMIN_PASSWORD: &str = "ChangeMe@123";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !is_master_schema(manager).await? {
            return Ok(());
        }

        manager
            .create_table(
                Table::create()
                    .table(Branches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Branches::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Branches::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Branches::City).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Branches::DomainName)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Branches::Schema).string_len(50).not_null())
                    .col(ColumnDef::new(Branches::LogoPath).string_len(500).null())
                    .col(
                        ColumnDef::new(Branches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Branches::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Branches::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_branches_schema")
                    .table(Branches::Table)
                    .col(Branches::Schema)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(100).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                    .col(ColumnDef::new(Users::Contact).string_len(50).not_null())
                    .col(ColumnDef::new(Users::Role).string_len(50).not_null())
                    .col(ColumnDef::new(Users::BranchId).integer().null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_branch_id")
                            .from(Users::Table, Users::BranchId)
                            .to(Branches::Table, Branches::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_users_contact")
                    .table(Users::Table)
                    .col(Users::Contact)
                    .unique()
                    .to_owned(),
            )
            .await?;

        seed_initial_tenant(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !is_master_schema(manager).await? {
            return Ok(());
        }

        manager
            .drop_index(Index::drop().name("ix_users_contact").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("ix_users_email").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("ix_branches_schema").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Branches::Table).to_owned())
            .await
    }
}

async fn is_master_schema(manager: &SchemaManager<'_>) -> Result<bool, DbErr> {
    let backend = manager.get_database_backend();
    let row = manager
        .get_connection()
        .query_one(Statement::from_string(
            backend,
            "SELECT current_schema() AS schema".to_string(),
        ))
        .await?;

    let current: Option<String> = match row {
        Some(row) => row.try_get("", "schema")?,
        None => None,
    };

    Ok(current.as_deref() == Some(MASTER_SCHEMA))
}

async fn seed_initial_tenant(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let backend = manager.get_database_backend();
    let conn = manager.get_connection();

    // The first tenant's schema is allocated here; its tables are created
    // when the chain is applied to it (startup reconciliation).
    let schema = generate_schema_name();
    conn.execute(Statement::from_string(
        backend,
        format!("CREATE SCHEMA IF NOT EXISTS \"{schema}\""),
    ))
    .await?;

    manager
        .exec_stmt(
            Query::insert()
                .into_table(Branches::Table)
                .columns([
                    Branches::Name,
                    Branches::City,
                    Branches::DomainName,
                    Branches::Schema,
                ])
                .values_panic([
                    SEED_BRANCH_NAME.into(),
                    SEED_BRANCH_CITY.into(),
                    SEED_BRANCH_DOMAIN.into(),
                    schema.clone().into(),
                ])
                .to_owned(),
        )
        .await?;

    let branch_id: i32 = conn
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT id FROM branches WHERE domain_name = $1",
            [SEED_BRANCH_DOMAIN.into()],
        ))
        .await?
        .ok_or_else(|| DbErr::Migration("seed branch row not found after insert".to_string()))?
        .try_get("", "id")?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(SEED_ADMIN_PASSWORD.as_bytes(), &salt)
        .map_err(|err| DbErr::Migration(format!("failed to hash seed password: {err}")))?
        .to_string();

    manager
        .exec_stmt(
            Query::insert()
                .into_table(Users::Table)
                .columns([
                    Users::Name,
                    Users::Email,
                    Users::PasswordHash,
                    Users::Contact,
                    Users::Role,
                    Users::BranchId,
                ])
                .values_panic([
                    "Super Admin".into(),
                    SEED_ADMIN_EMAIL.into(),
                    password_hash.into(),
                    "1234567890".into(),
                    "Super Admin".into(),
                    branch_id.into(),
                ])
                .to_owned(),
        )
        .await?;

    Ok(())
}

#[derive(DeriveIden)]
enum Branches {
    Table,
    Id,
    Name,
    City,
    DomainName,
    Schema,
    LogoPath,
    CreatedAt,
    UpdatedAt,
    IsActive,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Contact,
    Role,
    BranchId,
    CreatedAt,
    UpdatedAt,
    IsActive,
}
