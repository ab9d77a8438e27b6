//! Booking lifecycle: validate, persist, notify, confirm by email.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::email::{ConfirmationSender, EmailOutcome};
use crate::relay::{NotificationEvent, NotificationHub};
use crate::storage::{Booking, Database, DatabaseError, NewBooking};

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("static regex is valid")
});
static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex is valid"));
static TIME_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("static regex is valid"));

/// Booking lifecycle errors.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Invalid booking: {0}")]
    Invalid(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Composes storage, the notification hub, and the email collaborator.
///
/// Constructed once per application (or per test); owns no background
/// tasks itself — the insert watcher is wired up separately by whoever
/// needs the remote channel.
pub struct BookingService {
    db: Database,
    hub: NotificationHub,
    mailer: Arc<dyn ConfirmationSender>,
}

impl BookingService {
    pub fn new(db: Database, hub: NotificationHub, mailer: Arc<dyn ConfirmationSender>) -> Self {
        Self { db, hub, mailer }
    }

    /// Create one booking: validate, insert, publish the notification, and
    /// fire off the confirmation email.
    ///
    /// The email send races independently; its outcome (including total
    /// failure) never affects the returned booking or the notification. On
    /// insert failure nothing is published and no email is attempted.
    pub async fn create(&self, input: NewBooking) -> Result<Booking, BookingError> {
        validate(&input)?;

        let booking = self.db.insert_booking(&input).await?;
        info!(booking_id = %booking.id, name = %booking.name, "Booking created");

        self.hub.publish(NotificationEvent::new(booking.clone()));

        let mailer = Arc::clone(&self.mailer);
        let for_email = booking.clone();
        tokio::spawn(async move {
            match mailer.send_confirmation(&for_email).await {
                Ok(EmailOutcome::Sent { id }) => {
                    info!(booking_id = %for_email.id, email_id = ?id, "Confirmation email sent");
                }
                Ok(EmailOutcome::Demo) => {}
                Err(e) => {
                    warn!(booking_id = %for_email.id, error = %e, "Confirmation email failed");
                }
            }
        });

        Ok(booking)
    }

    /// All bookings, newest first.
    pub async fn list(&self) -> Result<Vec<Booking>, BookingError> {
        Ok(self.db.list_bookings().await?)
    }

    /// Administrative bulk clear. Returns the number of deleted bookings.
    pub async fn clear(&self) -> Result<u64, BookingError> {
        Ok(self.db.clear_bookings().await?)
    }
}

/// Field-local checks only; no cross-field validation against the current
/// time.
fn validate(input: &NewBooking) -> Result<(), BookingError> {
    if input.name.trim().is_empty() {
        return Err(BookingError::Invalid("name must not be empty".into()));
    }
    if !EMAIL_SHAPE.is_match(&input.email) {
        return Err(BookingError::Invalid(format!(
            "email '{}' is not a valid address",
            input.email
        )));
    }
    if !DATE_SHAPE.is_match(&input.date) {
        return Err(BookingError::Invalid(format!(
            "date '{}' is not in YYYY-MM-DD form",
            input.date
        )));
    }
    if !TIME_SHAPE.is_match(&input.time) {
        return Err(BookingError::Invalid(format!(
            "time '{}' is not in 24-hour HH:MM form",
            input.time
        )));
    }
    if input.people < 1 {
        return Err(BookingError::Invalid("people must be at least 1".into()));
    }
    if input.completion_time.is_some_and(|t| t < 0) {
        return Err(BookingError::Invalid(
            "completion_time must be non-negative".into(),
        ));
    }
    Ok(())
}
