//! Cross-surface events: types and broadcast bus.
//!
//! ## Contents
//! - [`SurfaceEventKind`], [`SurfaceEvent`]: reports addressed to a slot id
//! - [`Bus`]: thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: surfaces (through the embedding glue), tests.
//! - **Consumers**: the manager task (one receiver), optional observers via
//!   [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{SurfaceEvent, SurfaceEventKind};
