//! # Cross-surface bus.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that carries
//! [`SurfaceEvent`]s from surfaces (or the glue code that talks to them) to the
//! manager task.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                   Subscriber (one):
//!   Surface 1 ──┐
//!   Surface 2 ──┼──────► Bus ───────► manager task ──► Slot lookup by id
//!   Surface N ──┘  (broadcast chan)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks, so a surface may publish from
//!   inside `attach()` or `send_refresh()`. The event is handled after the current command.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active subscribers at send time.

use tokio::sync::broadcast;

use super::event::SurfaceEvent;

/// Broadcast channel for surface reports.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<SurfaceEvent>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<SurfaceEvent>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    pub fn publish(&self, ev: SurfaceEvent) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
