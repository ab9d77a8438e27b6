//! Notification relay: delivers a [`NotificationEvent`] to every registered
//! listener for each row inserted into the `bookings` table, via two
//! channels:
//! - direct in-process publish from the booking lifecycle, and
//! - the insert watcher, which observes bookings created by other
//!   processes sharing the database.

mod hub;
mod types;
mod watcher;

pub use hub::{NotificationHub, Subscription};
pub use types::NotificationEvent;
pub use watcher::InsertWatcher;
