//! # Completion callbacks.
//!
//! Every render/refresh request may carry a [`Callback`]. It fires exactly once
//! per slot it was registered on, with an [`Outcome`] holding a snapshot of the
//! slot and the error, if any.
//!
//! ## Example
//! ```rust
//! use slotvisor::{Callback, Outcome};
//!
//! let cb = Callback::new(|outcome: &Outcome| {
//!     match &outcome.error {
//!         None => println!("{} rendered {} times", outcome.slot.id, outcome.slot.rendered.times),
//!         Some(e) => println!("{} failed: {e}", outcome.slot.id),
//!     }
//! });
//! # let _ = cb;
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::SlotError;

use super::slot::SlotSnapshot;

/// Result of one resolution, as seen by a callback.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Slot state right after resolution.
    pub slot: SlotSnapshot,
    /// `None` on success.
    pub error: Option<SlotError>,
}

impl Outcome {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Shared completion callback `(error, slot)`.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(&Outcome) + Send + Sync>);

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Outcome) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Callback that ignores every outcome.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    #[inline]
    pub fn call(&self, outcome: &Outcome) {
        (self.0)(outcome)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

impl<F> From<F> for Callback
where
    F: Fn(&Outcome) + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}
