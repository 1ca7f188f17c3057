//! # Sandboxed surface boundary.
//!
//! A [`Surface`] is the isolated rendering resource a slot owns. The orchestrator
//! talks to it only through this trait and never inspects its internals; the
//! surface answers asynchronously by publishing on the cross-surface
//! [`Bus`](crate::events::Bus).
//!
//! ```text
//! Manager ──create()──► SurfaceFactory ──► Box<dyn Surface>
//!    │                                        │
//!    ├── attach(container) ──────────────────►│
//!    ├── update_data(data) ──────────────────►│
//!    ├── send_refresh(cmd) ──► Ok / Err(SendError::Unreachable)
//!    └── detach() ───────────────────────────►│
//!                                             │
//!              Bus ◄── SurfaceEvent::rendered(id, w, h) ──┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::slots::{Dimension, SlotId};

use super::container::ContainerHandle;

/// Outbound data handed to a surface (slot payload merged with injected data).
pub type SurfaceData = Map<String, Value>;

/// Construction parameters for a surface.
#[derive(Debug, Clone, Serialize)]
pub struct SurfaceInit {
    /// Base address of the sandboxed document (orchestrator-wide).
    pub url: Arc<str>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub hidden: bool,
    pub data: SurfaceData,
}

/// `refresh` command sent to a live surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshCommand {
    /// Target slot.
    pub id: SlotId,
    /// JSON serialization of the outbound data.
    pub hash: String,
}

impl RefreshCommand {
    /// Message type on the cross-surface channel.
    pub const KIND: &'static str = "refresh";

    pub fn new(id: SlotId, data: &SurfaceData) -> Self {
        let hash = Value::Object(data.clone()).to_string();
        Self { id, hash }
    }
}

/// Delivery failure of a command to a surface.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The surface is torn down or otherwise unreachable.
    #[error("surface unreachable: {reason}")]
    Unreachable {
        /// Human-readable reason.
        reason: String,
    },
}

impl SendError {
    pub fn as_label(&self) -> &'static str {
        match self {
            SendError::Unreachable { .. } => "surface_unreachable",
        }
    }
}

/// Isolated rendering resource exclusively owned by one slot.
pub trait Surface: Send + 'static {
    /// Id of the owning slot.
    fn id(&self) -> &SlotId;

    /// Inserts the surface into `container`.
    fn attach(&mut self, container: &ContainerHandle);

    /// Replaces the outbound data used by the next load or refresh.
    fn update_data(&mut self, data: SurfaceData);

    /// Delivers a `refresh` command to the surface.
    fn send_refresh(&mut self, command: &RefreshCommand) -> Result<(), SendError>;

    /// Removes the surface. The slot drops it right after.
    fn detach(&mut self);
}

/// Creates surfaces on behalf of the orchestrator.
pub trait SurfaceFactory: Send + Sync + 'static {
    fn create(&self, id: &SlotId, init: SurfaceInit) -> Box<dyn Surface>;
}
