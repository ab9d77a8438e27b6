//! SQLite storage for booking records.

mod db;
mod models;
mod queries;

pub use db::{Database, DatabaseError};
pub use models::{Booking, BookingMethod, NewBooking};
