//! Migration to create the buses table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Buses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Buses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Buses::CompanyId).integer().not_null())
                    .col(ColumnDef::new(Buses::BusNumber).string_len(10).not_null())
                    .col(ColumnDef::new(Buses::BusType).string_len(10).not_null())
                    .col(ColumnDef::new(Buses::TotalSeats).integer().not_null())
                    .col(
                        ColumnDef::new(Buses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Buses::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_buses_company_id")
                            .from(Buses::Table, Buses::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_buses_company_id")
                    .table(Buses::Table)
                    .col(Buses::CompanyId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("ix_buses_company_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Buses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Buses {
    Table,
    Id,
    CompanyId,
    BusNumber,
    BusType,
    TotalSeats,
    CreatedAt,
    IsActive,
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
}
