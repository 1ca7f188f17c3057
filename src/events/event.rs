//! # Inbound events reported by sandboxed surfaces.
//!
//! The [`SurfaceEventKind`] enum classifies what a surface can tell the host:
//! - **Rendered**: content is in place; carries observed width/height (required);
//! - **Failure reports**: `Failed`, `TimedOut`, `Rejected`.
//!
//! Events are addressed by slot id. Unknown ids are ignored by the manager.
//!
//! ## Example
//! ```rust
//! use slotvisor::{SlotId, SurfaceEvent, SurfaceEventKind};
//!
//! let ev = SurfaceEvent::rendered(SlotId::from_raw("top-1"), 310, 225)
//!     .with_extra("origin", "https://cdn.example");
//!
//! assert_eq!(ev.kind, SurfaceEventKind::Rendered);
//! assert_eq!(ev.width, Some(310));
//! assert_eq!(ev.kind.as_str(), "rendered");
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::slots::SlotId;

/// Classification of surface reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEventKind {
    /// Content rendered (or re-rendered after a refresh).
    ///
    /// Sets:
    /// - `id`: slot id
    /// - `width` / `height`: observed size
    /// - `extra`: any other reported keys
    Rendered,

    /// Content failed to render.
    ///
    /// Sets:
    /// - `id`: slot id
    /// - `reason`: failure message
    Failed,

    /// Content did not report within the advisory timeout.
    ///
    /// Sets:
    /// - `id`: slot id
    TimedOut,

    /// Content was refused by the surface.
    ///
    /// Sets:
    /// - `id`: slot id
    /// - `reason`: why
    Rejected,
}

impl SurfaceEventKind {
    /// Message type on the cross-surface channel.
    pub fn as_str(self) -> &'static str {
        match self {
            SurfaceEventKind::Rendered => "rendered",
            SurfaceEventKind::Failed => "failed",
            SurfaceEventKind::TimedOut => "timed-out",
            SurfaceEventKind::Rejected => "rejected",
        }
    }
}

/// Report from a surface, addressed to one slot.
#[derive(Debug, Clone)]
pub struct SurfaceEvent {
    /// Event classification.
    pub kind: SurfaceEventKind,
    /// Target slot.
    pub id: SlotId,
    /// Observed width in pixels.
    pub width: Option<u32>,
    /// Observed height in pixels.
    pub height: Option<u32>,
    /// Human-readable reason (failure reports).
    pub reason: Option<Arc<str>>,
    /// Other reported keys, merged into the slot's rendered metrics.
    pub extra: Map<String, Value>,
}

impl SurfaceEvent {
    /// Creates a new event of the given kind with no size, reason or extra keys.
    pub fn new(kind: SurfaceEventKind, id: SlotId) -> Self {
        Self {
            kind,
            id,
            width: None,
            height: None,
            reason: None,
            extra: Map::new(),
        }
    }

    /// `rendered` report with the observed size.
    #[inline]
    pub fn rendered(id: SlotId, width: u32, height: u32) -> Self {
        Self::new(SurfaceEventKind::Rendered, id).with_size(width, height)
    }

    #[inline]
    pub fn failed(id: SlotId, reason: impl Into<Arc<str>>) -> Self {
        Self::new(SurfaceEventKind::Failed, id).with_reason(reason)
    }

    #[inline]
    pub fn timed_out(id: SlotId) -> Self {
        Self::new(SurfaceEventKind::TimedOut, id)
    }

    #[inline]
    pub fn rejected(id: SlotId, reason: impl Into<Arc<str>>) -> Self {
        Self::new(SurfaceEventKind::Rejected, id).with_reason(reason)
    }

    #[inline]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reports_carry_reason() {
        let ev = SurfaceEvent::rejected(SlotId::from_raw("a-1"), "policy");
        assert_eq!(ev.kind, SurfaceEventKind::Rejected);
        assert_eq!(ev.reason.as_deref(), Some("policy"));
        assert_eq!(ev.width, None);
    }

    #[test]
    fn test_rendered_carries_size_and_extra() {
        let ev = SurfaceEvent::rendered(SlotId::from_raw("a-1"), 728, 90).with_extra("n", 1);
        assert_eq!((ev.width, ev.height), (Some(728), Some(90)));
        assert_eq!(ev.extra.get("n"), Some(&Value::from(1)));
        assert_eq!(SurfaceEventKind::TimedOut.as_str(), "timed-out");
    }
}
