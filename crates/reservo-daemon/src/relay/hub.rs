//! In-process fan-out of booking notifications.
//!
//! The hub is an explicit event-bus object owned by whoever composes the
//! store and the relay; it is constructed once per application (or per
//! test) and torn down with [`NotificationHub::close`]. No module-level
//! singletons.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::debug;

use super::types::NotificationEvent;

struct HubState {
    /// Listener list in registration order.
    listeners: Vec<(u64, mpsc::UnboundedSender<NotificationEvent>)>,
    next_id: u64,
    closed: bool,
}

/// Fan-out point for [`NotificationEvent`]s.
///
/// Cheap to clone; all clones share the same subscriber list. Every
/// registered subscriber receives every published event once, in
/// registration order.
#[derive(Clone)]
pub struct NotificationHub {
    state: Arc<Mutex<HubState>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                listeners: Vec::new(),
                next_id: 0,
                closed: false,
            })),
        }
    }

    /// Register a subscriber. Dropping the returned [`Subscription`] (or
    /// calling its `unsubscribe`) removes exactly this registration.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        if !state.closed {
            state.listeners.push((id, tx));
        }
        drop(state);

        Subscription {
            id,
            rx,
            state: Arc::clone(&self.state),
            active: true,
        }
    }

    /// Deliver an event to every current subscriber.
    ///
    /// Iterates over a snapshot of the listener list so registration and
    /// unregistration during dispatch cannot invalidate the iteration. A
    /// send to a dropped receiver is ignored.
    pub fn publish(&self, event: NotificationEvent) {
        let targets: Vec<mpsc::UnboundedSender<NotificationEvent>> = {
            let state = self.lock();
            if state.closed {
                return;
            }
            state.listeners.iter().map(|(_, tx)| tx.clone()).collect()
        };

        debug!(
            booking_id = %event.booking.id,
            receivers = targets.len(),
            "Notification published"
        );

        for tx in targets {
            let _ = tx.send(event.clone());
        }
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Tear down the hub: drop all registrations and refuse future
    /// deliveries. Existing subscriptions see their channel close.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.listeners.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one hub registration.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<NotificationEvent>,
    state: Arc<Mutex<HubState>>,
    active: bool,
}

impl Subscription {
    /// Wait for the next event. Returns `None` once unsubscribed or the
    /// hub is closed and the backlog is drained.
    pub async fn recv(&mut self) -> Option<NotificationEvent> {
        self.rx.recv().await
    }

    /// Non-blocking receive of an already-delivered event.
    pub fn try_recv(&mut self) -> Option<NotificationEvent> {
        self.rx.try_recv().ok()
    }

    /// Remove this registration. Idempotent: calling it twice has no
    /// additional effect. Also runs on drop.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.listeners.retain(|(id, _)| *id != self.id);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
