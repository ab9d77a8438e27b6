//! Database models for Reservo bookings.

use serde::{Deserialize, Serialize};

/// Booking record from the database.
///
/// `id` and `created_at` are assigned at insert and immutable; `created_at`
/// is milliseconds since epoch. The optional fields come from the timing
/// experiment in the booking UI (how long the reservation took and whether
/// the assistant or the manual form was used).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: String,
    pub name: String,
    pub email: String,
    pub date: String,
    pub time: String,
    pub people: i64,
    pub created_at: i64,
    pub completion_time: Option<i64>,
    pub booking_method: Option<String>,
    pub start_time: Option<String>,
}

impl Booking {
    /// Short human-facing reference (last 6 characters of the id).
    pub fn reference(&self) -> &str {
        let n = self.id.len();
        &self.id[n.saturating_sub(6)..]
    }
}

/// Input for creating a booking: a [`Booking`] without the server-assigned
/// `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub name: String,
    pub email: String,
    pub date: String,
    pub time: String,
    pub people: i64,
    #[serde(default)]
    pub completion_time: Option<i64>,
    #[serde(default)]
    pub booking_method: Option<BookingMethod>,
    #[serde(default)]
    pub start_time: Option<String>,
}

/// How the reservation was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingMethod {
    Ai,
    Manual,
}

impl BookingMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for BookingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai" => Ok(Self::Ai),
            "manual" => Ok(Self::Manual),
            other => Err(format!("unknown booking method: {other}")),
        }
    }
}
