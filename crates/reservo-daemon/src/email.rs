//! Confirmation email collaborator.
//!
//! The booking lifecycle treats email as best-effort: send failures are
//! logged and never affect the booking. With an API key configured, mail
//! goes out through a Resend-style HTTP API; without one, the daemon runs
//! in demo mode and only logs what would have been sent.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use reservo_core::config::EmailConfig;

use crate::storage::Booking;

/// Email collaborator errors.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// How a confirmation was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailOutcome {
    /// Sent through the provider; id is the provider's message id, if any.
    Sent { id: Option<String> },
    /// Demo mode: logged only, nothing sent.
    Demo,
}

/// Seam between the booking lifecycle and whatever delivers mail.
#[async_trait]
pub trait ConfirmationSender: Send + Sync {
    /// Send (or simulate) the confirmation for one created booking.
    async fn send_confirmation(&self, booking: &Booking) -> Result<EmailOutcome, EmailError>;
}

/// Pick a sender from config: HTTP when an API key is present, demo
/// otherwise.
pub fn mailer_from_config(config: &EmailConfig) -> Box<dyn ConfirmationSender> {
    match &config.api_key {
        Some(key) => Box::new(HttpMailer::new(
            config.endpoint.clone(),
            key.clone(),
            config.from.clone(),
        )),
        None => Box::new(DemoMailer),
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Sends confirmations through a Resend-style `/emails` endpoint.
pub struct HttpMailer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: String, from: String) -> Self {
        // reqwest is built with rustls-no-provider; the Err case just means
        // a crypto provider was already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl ConfirmationSender for HttpMailer {
    async fn send_confirmation(&self, booking: &Booking) -> Result<EmailOutcome, EmailError> {
        let subject = confirmation_subject(booking);
        let html = confirmation_body(booking);
        let request = SendRequest {
            from: &self.from,
            to: [booking.email.as_str()],
            subject: &subject,
            html: &html,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EmailError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").into(),
            });
        }

        let id = resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_str().map(String::from)));

        Ok(EmailOutcome::Sent { id })
    }
}

/// Demo-mode sender: logs the confirmation instead of delivering it.
pub struct DemoMailer;

#[async_trait]
impl ConfirmationSender for DemoMailer {
    async fn send_confirmation(&self, booking: &Booking) -> Result<EmailOutcome, EmailError> {
        info!(
            to = %booking.email,
            subject = %confirmation_subject(booking),
            "Demo mode: confirmation email logged, not sent"
        );
        Ok(EmailOutcome::Demo)
    }
}

fn confirmation_subject(booking: &Booking) -> String {
    format!(
        "Reservation Confirmed - {} at {}",
        booking.date, booking.time
    )
}

fn confirmation_body(booking: &Booking) -> String {
    let guests = if booking.people == 1 { "guest" } else { "guests" };
    format!(
        "<html><body>\
         <h1>Hi {name}!</h1>\
         <p>Your table has been reserved.</p>\
         <ul>\
         <li>Date: {date}</li>\
         <li>Time: {time}</li>\
         <li>Party size: {people} {guests}</li>\
         <li>Reference: #{reference}</li>\
         </ul>\
         <p>Please arrive 10 minutes before your reservation time.</p>\
         </body></html>",
        name = booking.name,
        date = booking.date,
        time = booking.time,
        people = booking.people,
        reference = booking.reference(),
    )
}
