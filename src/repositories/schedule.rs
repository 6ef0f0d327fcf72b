//! # Schedule Repository

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::models::bus::Entity as Bus;
use crate::models::route::Entity as Route;
use crate::models::schedule::{
    ActiveModel as ScheduleActiveModel, Entity as Schedule, Model as ScheduleModel,
};
use crate::repositories::RepositoryError;

/// Request data for scheduling a bus on a route.
#[derive(Debug, Clone)]
pub struct CreateScheduleRequest {
    pub bus_id: i32,
    pub route_id: i32,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
}

pub struct ScheduleRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ScheduleRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_schedule(
        &self,
        request: CreateScheduleRequest,
    ) -> Result<ScheduleModel, RepositoryError> {
        if request.arrival_time <= request.departure_time {
            return Err(RepositoryError::Validation(
                "Arrival time must be after departure time".to_string(),
            ));
        }

        Bus::find_by_id(request.bus_id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Bus not found".to_string()))?;

        Route::find_by_id(request.route_id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Route not found".to_string()))?;

        let schedule = ScheduleActiveModel {
            bus_id: Set(request.bus_id),
            route_id: Set(request.route_id),
            departure_time: Set(request.departure_time.into()),
            arrival_time: Set(request.arrival_time.into()),
            ..Default::default()
        };

        Ok(schedule.insert(self.db).await?)
    }

    pub async fn get_schedule(&self, id: i32) -> Result<Option<ScheduleModel>, RepositoryError> {
        Ok(Schedule::find_by_id(id).one(self.db).await?)
    }

    pub async fn list_schedules(&self) -> Result<Vec<ScheduleModel>, RepositoryError> {
        Ok(Schedule::find().all(self.db).await?)
    }
}
