//! # Ticket Repository
//!
//! Ticket booking and lookup. Ticket numbers embed the operating company,
//! the booking year, and a per-tenant sequence, and are generated inside
//! the booking transaction so the sequence cannot race the insert.

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};

use crate::models::bus::{Entity as Bus, Model as BusModel};
use crate::models::company::{Column as CompanyColumn, Entity as Company, Model as CompanyModel};
use crate::models::ticket::{
    ActiveModel as TicketActiveModel, Entity as Ticket, Model as TicketModel,
};
use crate::repositories::RepositoryError;

pub const STATUS_BOOKED: &str = "Booked";
pub const STATUS_CANCELLED: &str = "Cancelled";

/// Request data for booking a ticket.
#[derive(Debug, Clone)]
pub struct CreateTicketRequest {
    pub bus_id: i32,
    pub seat_number: i32,
    pub passenger_name: String,
    pub passenger_contact: String,
    pub passenger_email: String,
}

/// A ticket joined with its bus and the bus's company.
#[derive(Debug)]
pub struct TicketDetails {
    pub ticket: TicketModel,
    pub bus: Option<BusModel>,
    pub company: Option<CompanyModel>,
}

pub struct TicketRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TicketRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_ticket(
        &self,
        request: CreateTicketRequest,
    ) -> Result<TicketModel, RepositoryError> {
        let txn = self.db.begin().await?;

        let bus = Bus::find_by_id(request.bus_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Bus not found".to_string()))?;

        if request.seat_number <= 0 || request.seat_number > bus.total_seats {
            return Err(RepositoryError::Validation(format!(
                "Seat number must be between 1 and {}",
                bus.total_seats
            )));
        }

        let company = Company::find_by_id(bus.company_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Company not found".to_string()))?;

        let sequence = Ticket::find().count(&txn).await? + 1;
        let ticket_number = generate_ticket_number(&company.name, sequence);

        let ticket = TicketActiveModel {
            ticket_number: Set(ticket_number),
            bus_id: Set(request.bus_id),
            seat_number: Set(request.seat_number),
            passenger_name: Set(request.passenger_name),
            passenger_contact: Set(request.passenger_contact),
            passenger_email: Set(request.passenger_email),
            status: Set(STATUS_BOOKED.to_string()),
            ..Default::default()
        };

        let ticket = ticket.insert(&txn).await?;
        txn.commit().await?;

        Ok(ticket)
    }

    pub async fn get_ticket(&self, id: i32) -> Result<TicketDetails, RepositoryError> {
        let ticket = Ticket::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Ticket not found".to_string()))?;

        let bus = Bus::find_by_id(ticket.bus_id).one(self.db).await?;
        let company = match &bus {
            Some(bus) => Company::find_by_id(bus.company_id).one(self.db).await?,
            None => None,
        };

        Ok(TicketDetails {
            ticket,
            bus,
            company,
        })
    }

    /// All tickets with their bus and company data, fetched in three
    /// queries rather than per ticket.
    pub async fn list_tickets(&self) -> Result<Vec<TicketDetails>, RepositoryError> {
        let tickets_with_buses = Ticket::find().find_also_related(Bus).all(self.db).await?;

        let company_ids: Vec<i32> = tickets_with_buses
            .iter()
            .filter_map(|(_, bus)| bus.as_ref().map(|b| b.company_id))
            .collect();

        let companies: HashMap<i32, CompanyModel> = if company_ids.is_empty() {
            HashMap::new()
        } else {
            Company::find()
                .filter(CompanyColumn::Id.is_in(company_ids))
                .all(self.db)
                .await?
                .into_iter()
                .map(|company| (company.id, company))
                .collect()
        };

        Ok(tickets_with_buses
            .into_iter()
            .map(|(ticket, bus)| {
                let company = bus
                    .as_ref()
                    .and_then(|b| companies.get(&b.company_id).cloned());
                TicketDetails {
                    ticket,
                    bus,
                    company,
                }
            })
            .collect())
    }

    pub async fn cancel_ticket(&self, id: i32) -> Result<TicketModel, RepositoryError> {
        let ticket = Ticket::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Ticket not found".to_string()))?;

        let mut active = ticket.into_active_model();
        active.status = Set(STATUS_CANCELLED.to_string());
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(self.db).await?)
    }
}

fn generate_ticket_number(company_name: &str, sequence: u64) -> String {
    let prefix: String = company_name.chars().take(3).collect::<String>().to_uppercase();
    let year = Utc::now().year();
    format!("{prefix}{year}{sequence:07}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_number_embeds_company_year_and_sequence() {
        let number = generate_ticket_number("Orange Tours", 42);
        let year = Utc::now().year().to_string();

        assert!(number.starts_with("ORA"));
        assert!(number.contains(&year));
        assert!(number.ends_with("0000042"));
    }

    #[test]
    fn short_company_names_still_produce_a_prefix() {
        let number = generate_ticket_number("Go", 1);
        assert!(number.starts_with("GO"));
        assert!(number.ends_with("0000001"));
    }
}
