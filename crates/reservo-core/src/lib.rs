//! Reservo Core Library
//!
//! Shared functionality for Reservo components:
//! - Free-text reservation parsing (assistant booking path)
//! - Configuration resolution and hierarchy
//! - Database pool helpers
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod parse;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use parse::{Field, ParsedReservation, parse_reservation, parse_reservation_at};
