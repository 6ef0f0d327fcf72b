//! # Busline API Library
//!
//! Core functionality for the Busline multi-tenant bus-ticketing service:
//! schema-per-tenant routing and provisioning, handlers, models, and
//! server configuration.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub mod tenancy;
pub use migration;
