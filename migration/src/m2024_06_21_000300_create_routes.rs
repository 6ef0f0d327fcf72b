//! Migration to create the routes table and seed the route catalogue.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

const SEED_ROUTES: &[(&str, &str, &str)] = &[
    (
        r#"["Hyderabad","Shadnagar","Mahbubnagar","Kurnool"]"#,
        "Hyderabad",
        "Kurnool",
    ),
    (
        r#"["Hyderabad","Siddipet","Karimnagar","Ramagundam"]"#,
        "Hyderabad",
        "Ramagundam",
    ),
    (
        r#"["Vijayawada","Guntur","Ongole","Nellore"]"#,
        "Vijayawada",
        "Nellore",
    ),
    (
        r#"["Tirupati","Rajampet","Kadapa","Rayachoti"]"#,
        "Tirupati",
        "Rayachoti",
    ),
    (
        r#"["Chennai","Vellore","Krishnagiri","Hosur"]"#,
        "Chennai",
        "Hosur",
    ),
    (
        r#"["Chennai","Pondicherry","Cuddalore","Villupuram"]"#,
        "Chennai",
        "Villupuram",
    ),
    (
        r#"["Bangalore","Tumkur","Chitradurga","Davangere"]"#,
        "Bangalore",
        "Davangere",
    ),
    (r#"["Bangalore","Mandya","Mysore"]"#, "Bangalore", "Mysore"),
    (
        r#"["Hyderabad","Anantapur","Bangalore"]"#,
        "Hyderabad",
        "Bangalore",
    ),
    (
        r#"["Vijayawada","Tirupati","Chennai"]"#,
        "Vijayawada",
        "Chennai",
    ),
    (r#"["Chennai","Hosur","Bangalore"]"#, "Chennai", "Bangalore"),
    (r#"["Bangalore","Mysore","Wayanad"]"#, "Bangalore", "Wayanad"),
    (r#"["Hyderabad","Warangal"]"#, "Hyderabad", "Warangal"),
    (r#"["Tirupati","Chittoor"]"#, "Tirupati", "Chittoor"),
    (
        r#"["Vijayawada","Rajahmundry"]"#,
        "Vijayawada",
        "Rajahmundry",
    ),
    (
        r#"["Tirupati","Rajampet","Kadapa","Rayachoti","Kurnool","Bangalore"]"#,
        "Tirupati",
        "Bangalore",
    ),
    (
        r#"["Hyderabad","Kurnool","Kadapa","Tirupati","Chennai"]"#,
        "Hyderabad",
        "Chennai",
    ),
    (
        r#"["Vijayawada","Guntur","Kadapa","Anantapur","Bangalore"]"#,
        "Vijayawada",
        "Bangalore",
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Routes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Routes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Routes::Stops).json_binary().not_null())
                    .col(ColumnDef::new(Routes::Source).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Routes::Destination)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Routes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        for (stops, source, destination) in SEED_ROUTES {
            conn.execute(Statement::from_sql_and_values(
                backend,
                "INSERT INTO routes (stops, source, destination) VALUES ($1::jsonb, $2, $3)",
                [
                    (*stops).into(),
                    (*source).into(),
                    (*destination).into(),
                ],
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Routes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Routes {
    Table,
    Id,
    Stops,
    Source,
    Destination,
    CreatedAt,
}
