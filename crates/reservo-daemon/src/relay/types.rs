//! Notification event types.

use serde::{Deserialize, Serialize};

use reservo_core::db::unix_timestamp_ms;

use crate::storage::Booking;

/// Event delivered to subscribers when a booking is inserted.
///
/// Serialized shape is the wire contract consumed by admin views:
/// `{"type":"new_booking","booking":{...},"timestamp":<ms epoch>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "new_booking")]
pub struct NotificationEvent {
    pub booking: Booking,
    /// Creation instant of the event, milliseconds since epoch.
    pub timestamp: i64,
}

impl NotificationEvent {
    /// Wrap a freshly inserted booking, stamping the current instant.
    pub fn new(booking: Booking) -> Self {
        Self {
            booking,
            timestamp: unix_timestamp_ms(),
        }
    }
}
