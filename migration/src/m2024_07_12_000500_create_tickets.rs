//! Migration to create the tickets table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Tickets::TicketNumber)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tickets::BusId).integer().not_null())
                    .col(ColumnDef::new(Tickets::SeatNumber).integer().not_null())
                    .col(
                        ColumnDef::new(Tickets::PassengerName)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tickets::PassengerContact)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tickets::PassengerEmail)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tickets::Status).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Tickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Tickets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_bus_id")
                            .from(Tickets::Table, Tickets::BusId)
                            .to(Buses::Table, Buses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_tickets_ticket_number")
                    .table(Tickets::Table)
                    .col(Tickets::TicketNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_tickets_bus_id")
                    .table(Tickets::Table)
                    .col(Tickets::BusId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("ix_tickets_bus_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("ix_tickets_ticket_number").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    TicketNumber,
    BusId,
    SeatNumber,
    PassengerName,
    PassengerContact,
    PassengerEmail,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Buses {
    Table,
    Id,
}
