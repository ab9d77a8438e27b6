//! Free-text reservation parsing.
//!
//! Turns one natural-language request ("table for 4 at 7:30pm under smith,
//! smith@mail.com") into structured booking fields plus the list of fields
//! that could not be extracted. Parsing is deterministic and never fails.

mod reservation;
mod types;

pub use reservation::{parse_reservation, parse_reservation_at};
pub use types::{Field, ParsedReservation};
