//! # Route Repository
//!
//! Routes are a seeded catalogue; tenants read them, they do not write.

use sea_orm::{DatabaseConnection, EntityTrait};

use crate::models::route::{Entity as Route, Model as RouteModel};
use crate::repositories::RepositoryError;

pub struct RouteRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RouteRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_route(&self, id: i32) -> Result<Option<RouteModel>, RepositoryError> {
        Ok(Route::find_by_id(id).one(self.db).await?)
    }

    pub async fn list_routes(&self) -> Result<Vec<RouteModel>, RepositoryError> {
        Ok(Route::find().all(self.db).await?)
    }
}
