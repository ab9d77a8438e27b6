//! Remote insert watcher.
//!
//! Bookings created by other processes sharing the database never pass
//! through the local hub, so the watcher polls the `bookings` table for
//! rows beyond the last seen rowid and republishes them. Delivery is
//! at-least-once: an insert made by this process is observed both through
//! the direct publish and through the poll, so consumers that need
//! exactly-once display semantics de-duplicate by booking id.
//!
//! A failed poll is logged and retried on the next tick; there is no
//! separate reconnection machinery.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::storage::Database;

use super::hub::NotificationHub;
use super::types::NotificationEvent;

/// Handle to the background poll task. Stopping (or dropping) the handle
/// aborts the task; the hub itself is unaffected.
pub struct InsertWatcher {
    handle: JoinHandle<()>,
}

impl InsertWatcher {
    /// Start watching for out-of-band inserts, publishing each new row to
    /// `hub`. Rows present before the watcher starts are not replayed.
    pub async fn spawn(db: Database, hub: NotificationHub, poll_interval: Duration) -> Self {
        // Read the cursor before spawning so rows inserted from here on
        // are guaranteed to be observed.
        let mut cursor = match db.max_booking_rowid().await {
            Ok(rowid) => rowid,
            Err(e) => {
                warn!(error = %e, "Insert watcher failed to read initial cursor");
                0
            }
        };

        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(poll_interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tick.tick().await;

                let max = match db.max_booking_rowid().await {
                    Ok(rowid) => rowid,
                    Err(e) => {
                        warn!(error = %e, "Insert poll failed");
                        continue;
                    }
                };
                if max <= cursor {
                    continue;
                }

                match db.bookings_after_rowid(cursor).await {
                    Ok(rows) => {
                        debug!(count = rows.len(), "Insert watcher observed new bookings");
                        for booking in rows {
                            hub.publish(NotificationEvent::new(booking));
                        }
                        cursor = max;
                    }
                    Err(e) => warn!(error = %e, "Failed to read new bookings"),
                }
            }
        });

        Self { handle }
    }

    /// Stop polling. Idempotent; also runs on drop.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for InsertWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::NewBooking;

    fn input(name: &str) -> NewBooking {
        NewBooking {
            name: name.to_string(),
            email: "a@b.com".to_string(),
            date: "2025-06-01".to_string(),
            time: "19:30".to_string(),
            people: 2,
            completion_time: None,
            booking_method: None,
            start_time: None,
        }
    }

    #[tokio::test]
    async fn watcher_publishes_out_of_band_inserts() {
        let db = Database::open_in_memory().await.unwrap();
        let hub = NotificationHub::new();
        let mut sub = hub.subscribe();

        let _watcher = InsertWatcher::spawn(db.clone(), hub.clone(), Duration::from_millis(20)).await;

        // Insert directly at the storage layer, as another process would.
        let created = db.insert_booking(&input("Out Of Band")).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.booking.id, created.id);
    }

    #[tokio::test]
    async fn pre_existing_rows_are_not_replayed() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_booking(&input("Old")).await.unwrap();

        let hub = NotificationHub::new();
        let mut sub = hub.subscribe();
        let _watcher = InsertWatcher::spawn(db.clone(), hub.clone(), Duration::from_millis(20)).await;

        let fresh = db.insert_booking(&input("Fresh")).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.booking.id, fresh.id);
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn stopped_watcher_goes_quiet() {
        let db = Database::open_in_memory().await.unwrap();
        let hub = NotificationHub::new();
        let mut sub = hub.subscribe();

        let watcher = InsertWatcher::spawn(db.clone(), hub.clone(), Duration::from_millis(20)).await;
        watcher.stop();

        db.insert_booking(&input("Unseen")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(sub.try_recv().is_none());
    }
}
