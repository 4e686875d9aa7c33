//! Core contracts for airseed.
//!
//! This crate defines the flight-booking entity types, the ordered output
//! batch handed to storage, and the integrity checks shared by the generator
//! and the store.

pub mod batch;
pub mod error;
pub mod model;
pub mod validation;

pub use batch::{EntityKind, OutputBatch};
pub use error::{Error, Result};
pub use model::{Airline, Airport, Favorite, FareClass, Flight, Ticket, TicketKey, User};
pub use validation::validate_batch;

/// Text format used for flight timestamps in persisted artifacts.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
