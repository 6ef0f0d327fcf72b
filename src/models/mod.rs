//! # Data Models
//!
//! SeaORM entity models. `branch` and `user` live in the master schema;
//! everything else lives in each tenant's own schema and is only ever
//! queried through a schema-bound handle.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod branch;
pub mod bus;
pub mod company;
pub mod route;
pub mod schedule;
pub mod ticket;
pub mod user;

pub use branch::Entity as Branch;
pub use bus::Entity as Bus;
pub use company::Entity as Company;
pub use route::Entity as Route;
pub use schedule::Entity as Schedule;
pub use ticket::Entity as Ticket;
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "busline".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
