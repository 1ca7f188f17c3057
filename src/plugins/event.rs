//! # Lifecycle notifications delivered to plugins.

use crate::error::SlotError;
use crate::slots::SlotSnapshot;

/// Lifecycle stage a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleKind {
    /// A slot was queued.
    Queued,
    /// A surface is about to be created for the slot.
    BeforeRender,
    /// The slot resolved (`error` is set when it resolved with a failure).
    AfterRender,
}

impl LifecycleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleKind::Queued => "slot:queue",
            LifecycleKind::BeforeRender => "slot:beforerender",
            LifecycleKind::AfterRender => "slot:afterrender",
        }
    }
}

/// Observational notification carrying a slot snapshot.
#[derive(Debug, Clone)]
pub struct LifecycleEvent {
    pub kind: LifecycleKind,
    pub slot: SlotSnapshot,
    pub error: Option<SlotError>,
}

impl LifecycleEvent {
    pub fn new(kind: LifecycleKind, slot: SlotSnapshot) -> Self {
        Self {
            kind,
            slot,
            error: None,
        }
    }

    #[inline]
    pub fn with_error(mut self, error: Option<SlotError>) -> Self {
        self.error = error;
        self
    }
}
