//! # Ticket Handlers

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::TenantDb;
use crate::error::ApiError;
use crate::handlers::buses::BusResponse;
use crate::handlers::types::ApiResponse;
use crate::repositories::ticket::{CreateTicketRequest, TicketDetails};
use crate::repositories::TicketRepository;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TicketRequest {
    pub bus_id: i32,
    pub seat_number: i32,
    pub passenger_name: String,
    #[schema(example = "+919876543210")]
    pub passenger_contact: String,
    pub passenger_email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TicketResponse {
    pub id: i32,
    pub ticket_number: String,
    pub seat_number: i32,
    pub passenger_name: String,
    pub passenger_contact: String,
    pub passenger_email: String,
    pub status: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_data: Option<BusResponse>,
}

impl From<TicketDetails> for TicketResponse {
    fn from(details: TicketDetails) -> Self {
        let bus_data = details
            .bus
            .map(|bus| BusResponse::from_model(bus, details.company.map(Into::into)));

        Self {
            id: details.ticket.id,
            ticket_number: details.ticket.ticket_number,
            seat_number: details.ticket.seat_number,
            passenger_name: details.ticket.passenger_name,
            passenger_contact: details.ticket.passenger_contact,
            passenger_email: details.ticket.passenger_email,
            status: details.ticket.status,
            created_at: details.ticket.created_at.to_rfc3339(),
            bus_data,
        }
    }
}

/// Book a ticket.
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    security(("bearer_auth" = [])),
    request_body = TicketRequest,
    responses(
        (status = 201, description = "Ticket booked", body = ApiResponse<TicketResponse>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Bus not found", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn create_ticket(
    TenantDb(db): TenantDb,
    Json(request): Json<TicketRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TicketResponse>>), ApiError> {
    let ticket = TicketRepository::new(db.connection())
        .create_ticket(CreateTicketRequest {
            bus_id: request.bus_id,
            seat_number: request.seat_number,
            passenger_name: request.passenger_name,
            passenger_contact: request.passenger_contact,
            passenger_email: request.passenger_email,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(TicketResponse {
            id: ticket.id,
            ticket_number: ticket.ticket_number,
            seat_number: ticket.seat_number,
            passenger_name: ticket.passenger_name,
            passenger_contact: ticket.passenger_contact,
            passenger_email: ticket.passenger_email,
            status: ticket.status,
            created_at: ticket.created_at.to_rfc3339(),
            bus_data: None,
        })),
    ))
}

/// List tickets with bus and company data.
#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All tickets for this tenant", body = ApiResponse<Vec<TicketResponse>>)
    ),
    tag = "tickets"
)]
pub async fn list_tickets(
    TenantDb(db): TenantDb,
) -> Result<Json<ApiResponse<Vec<TicketResponse>>>, ApiError> {
    let tickets = TicketRepository::new(db.connection()).list_tickets().await?;

    Ok(Json(ApiResponse::new(
        tickets.into_iter().map(TicketResponse::from).collect(),
    )))
}

/// Get a ticket by ID.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "The ticket", body = ApiResponse<TicketResponse>),
        (status = 404, description = "No such ticket", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn get_ticket(
    TenantDb(db): TenantDb,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TicketResponse>>, ApiError> {
    let details = TicketRepository::new(db.connection()).get_ticket(id).await?;

    Ok(Json(ApiResponse::new(TicketResponse::from(details))))
}

/// Cancel a ticket.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/cancel",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket cancelled", body = ApiResponse<TicketResponse>),
        (status = 404, description = "No such ticket", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn cancel_ticket(
    TenantDb(db): TenantDb,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TicketResponse>>, ApiError> {
    let ticket = TicketRepository::new(db.connection())
        .cancel_ticket(id)
        .await?;

    Ok(Json(ApiResponse::new(TicketResponse {
        id: ticket.id,
        ticket_number: ticket.ticket_number,
        seat_number: ticket.seat_number,
        passenger_name: ticket.passenger_name,
        passenger_contact: ticket.passenger_contact,
        passenger_email: ticket.passenger_email,
        status: ticket.status,
        created_at: ticket.created_at.to_rfc3339(),
        bus_data: None,
    })))
}
