//! Types produced by the reservation parser.

use serde::{Deserialize, Serialize};

/// A booking field the parser may fail to extract from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Date,
    Time,
    People,
}

impl Field {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Date => "date",
            Self::Time => "time",
            Self::People => "people",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Best-effort extraction result for one free-text reservation request.
///
/// Fields the parser could not find are `None` and listed in `missing`,
/// except `date`, which always resolves (defaulting to today). Not
/// persisted; the booking lifecycle turns a complete parse into a booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReservation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub people: Option<u32>,
    /// Fields that could not be extracted, in check order
    /// (people, time, name, email). Each appears at most once.
    pub missing: Vec<Field>,
}

impl ParsedReservation {
    /// True when every bookable field was extracted.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}
