//! # Bus Repository

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::models::bus::{ActiveModel as BusActiveModel, Entity as Bus, Model as BusModel};
use crate::models::company::{Entity as Company, Model as CompanyModel};
use crate::repositories::RepositoryError;

/// Valid bus types.
pub const BUS_TYPES: &[&str] = &["AC", "NON_AC"];

/// Request data for registering a bus.
#[derive(Debug, Clone)]
pub struct CreateBusRequest {
    pub company_id: i32,
    pub bus_number: String,
    pub bus_type: String,
    pub total_seats: i32,
}

pub struct BusRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BusRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_bus(&self, request: CreateBusRequest) -> Result<BusModel, RepositoryError> {
        if !BUS_TYPES.contains(&request.bus_type.as_str()) {
            return Err(RepositoryError::Validation(format!(
                "Bus type must be one of {:?}",
                BUS_TYPES
            )));
        }
        if request.total_seats <= 0 {
            return Err(RepositoryError::Validation(
                "Total seats must be greater than zero".to_string(),
            ));
        }

        Company::find_by_id(request.company_id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Company not found".to_string()))?;

        let bus = BusActiveModel {
            company_id: Set(request.company_id),
            bus_number: Set(request.bus_number),
            bus_type: Set(request.bus_type),
            total_seats: Set(request.total_seats),
            ..Default::default()
        };

        Ok(bus.insert(self.db).await?)
    }

    pub async fn get_bus(&self, id: i32) -> Result<Option<BusModel>, RepositoryError> {
        Ok(Bus::find_by_id(id).one(self.db).await?)
    }

    /// Buses with their companies, for response shaping.
    pub async fn list_buses(
        &self,
    ) -> Result<Vec<(BusModel, Option<CompanyModel>)>, RepositoryError> {
        Ok(Bus::find().find_also_related(Company).all(self.db).await?)
    }
}
