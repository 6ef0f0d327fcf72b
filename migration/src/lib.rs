//! Database migrations for the Busline API.
//!
//! The migrations form a strictly ordered chain: every step names its
//! predecessor revision and exactly one step (the root) has none. The same
//! chain is applied to the master schema and to every tenant schema; the
//! root step only materializes against the master schema.

pub use sea_orm_migration::prelude::*;

mod m2024_06_01_000001_init_master;
mod m2024_06_09_000100_create_companies;
mod m2024_06_14_000200_create_buses;
mod m2024_06_21_000300_create_routes;
mod m2024_07_03_000400_create_schedules;
mod m2024_07_12_000500_create_tickets;

/// The shared schema holding branches and users.
pub const MASTER_SCHEMA: &str = "public";

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_06_01_000001_init_master::Migration),
            Box::new(m2024_06_09_000100_create_companies::Migration),
            Box::new(m2024_06_14_000200_create_buses::Migration),
            Box::new(m2024_06_21_000300_create_routes::Migration),
            Box::new(m2024_07_03_000400_create_schedules::Migration),
            Box::new(m2024_07_12_000500_create_tickets::Migration),
        ]
    }
}

/// Revision chain as `(revision, predecessor)` pairs, in application order.
pub fn revision_chain() -> Vec<(&'static str, Option<&'static str>)> {
    vec![
        ("m2024_06_01_000001_init_master", None),
        (
            "m2024_06_09_000100_create_companies",
            Some("m2024_06_01_000001_init_master"),
        ),
        (
            "m2024_06_14_000200_create_buses",
            Some("m2024_06_09_000100_create_companies"),
        ),
        (
            "m2024_06_21_000300_create_routes",
            Some("m2024_06_14_000200_create_buses"),
        ),
        (
            "m2024_07_03_000400_create_schedules",
            Some("m2024_06_21_000300_create_routes"),
        ),
        (
            "m2024_07_12_000500_create_tickets",
            Some("m2024_07_03_000400_create_schedules"),
        ),
    ]
}

/// Revision name of the chain's tip.
pub fn config_head() -> &'static str {
    revision_chain()
        .last()
        .map(|(revision, _)| *revision)
        .expect("migration chain is never empty")
}

/// Checks that the chain is linear: exactly one root, each step's
/// predecessor is the previous step's revision, and the chain matches the
/// migrations registered on [`Migrator`] in order.
pub fn validate_chain() -> Result<(), String> {
    let chain = revision_chain();
    let migrations = Migrator::migrations();

    if chain.len() != migrations.len() {
        return Err(format!(
            "revision chain has {} entries but {} migrations are registered",
            chain.len(),
            migrations.len()
        ));
    }

    let mut previous: Option<&str> = None;
    for ((revision, predecessor), migration) in chain.iter().zip(migrations.iter()) {
        if migration.name() != *revision {
            return Err(format!(
                "chain entry '{}' does not match registered migration '{}'",
                revision,
                migration.name()
            ));
        }
        if *predecessor != previous {
            return Err(format!(
                "migration '{}' declares predecessor {:?} but follows {:?}",
                revision, predecessor, previous
            ));
        }
        previous = Some(revision);
    }

    Ok(())
}

/// Generates a fresh tenant schema name. Names are never derived from user
/// input; they must satisfy the router's identifier pattern.
pub fn generate_schema_name() -> String {
    let unique = uuid::Uuid::new_v4().simple().to_string();
    format!("tn_{}", &unique[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_linear_and_matches_migrator() {
        validate_chain().expect("chain validates");
    }

    #[test]
    fn exactly_one_root() {
        let roots = revision_chain()
            .iter()
            .filter(|(_, predecessor)| predecessor.is_none())
            .count();
        assert_eq!(roots, 1);
    }

    #[test]
    fn config_head_is_last_registered_migration() {
        let migrations = Migrator::migrations();
        assert_eq!(config_head(), migrations.last().unwrap().name());
    }

    #[test]
    fn generated_schema_names_are_valid_identifiers() {
        for _ in 0..32 {
            let name = generate_schema_name();
            assert!(name.starts_with("tn_"));
            assert_eq!(name.len(), 15);
            assert!(
                name.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            );
        }
    }

    #[test]
    fn generated_schema_names_do_not_collide() {
        let a = generate_schema_name();
        let b = generate_schema_name();
        assert_ne!(a, b);
    }
}
