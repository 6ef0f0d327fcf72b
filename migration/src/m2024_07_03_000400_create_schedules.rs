//! Migration to create the schedules table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Schedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Schedules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Schedules::BusId).integer().not_null())
                    .col(ColumnDef::new(Schedules::RouteId).integer().not_null())
                    .col(
                        ColumnDef::new(Schedules::DepartureTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Schedules::ArrivalTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Schedules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Schedules::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedules_bus_id")
                            .from(Schedules::Table, Schedules::BusId)
                            .to(Buses::Table, Buses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedules_route_id")
                            .from(Schedules::Table, Schedules::RouteId)
                            .to(Routes::Table, Routes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_schedules_bus_id")
                    .table(Schedules::Table)
                    .col(Schedules::BusId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("ix_schedules_bus_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Schedules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Schedules {
    Table,
    Id,
    BusId,
    RouteId,
    DepartureTime,
    ArrivalTime,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Buses {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Routes {
    Table,
    Id,
}
