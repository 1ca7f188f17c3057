//! # slotvisor
//!
//! **Slotvisor** orchestrates content slots rendered inside sandboxed surfaces.
//!
//! A surface can only be reached asynchronously through a message channel. It
//! may answer once, many times or never. Slotvisor still offers
//! synchronous-looking `queue` / `render` / `refresh` calls with completion
//! callbacks that fire exactly once, keeps per-slot ordering, renders priority
//! names strictly in order, and recovers when a surface becomes unreachable or
//! its container disappears.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ queue("top") │   │ render_all() │   │ refresh(..)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Orchestrator (handle, returns immediately)                       │
//! │  - Command channel (unbounded mpsc)                               │
//! │  - Sequence tasks (priority ordering, hold a command sender only) │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Manager task (single owner of all state)                         │
//! │  - Vec<Slot> (state machine, callbacks, owned Surface)            │
//! │  - named configs, inject map, last priority ordering              │
//! └──────┬──────────────────┬─────────────────────────────▲───────────┘
//!        │ create/attach    │ emit                        │ SurfaceEvent
//!        ▼                  ▼                             │
//!  ┌──────────────┐  ┌──────────────┐          ┌──────────┴──────────┐
//!  │   Surface    │  │  PluginSet   │          │ Bus (broadcast chan)│
//!  │ (sandboxed)  │  │ (per-plugin  │          │ rendered / failed / │
//!  └──────┬───────┘  │   queues)    │          │ timed-out / rejected│
//!         │          └──────────────┘          └──────────▲──────────┘
//!         └──────────────── publish ──────────────────────┘
//! ```
//!
//! ### Slot lifecycle
//! ```text
//! queue ──► Created
//!             │ render
//!             ├─ missing url/container ─► Incomplete ──► callbacks(err)
//!             ├─ container gone ────────► Destroyed (purged) ──► callbacks(err)
//!             └─ surface attached ──────► Active
//!                                           │ rendered event / resolve()
//!                                           ▼
//!                                        Resolved ──► done hook ──► callbacks(ok)
//!                                           │ refresh_all
//!                                           ▼
//!                                       NeedsRefresh ──► Refreshing ──► Resolved
//!                                                            │ send failed
//!                                                            ▼
//!                                                         Removed ──► render again (Reactivated)
//! ```
//!
//! ## Features
//! | Area              | Description                                                        | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------------|---------------------------------------------|
//! | **Orchestration** | Queue, render, refresh, bulk priority ordering.                    | [`Orchestrator`], [`OrchestratorBuilder`]   |
//! | **Slots**         | Banded state machine, merged options, snapshots.                   | [`SlotState`], [`SlotConfig`], [`SlotSnapshot`] |
//! | **Callbacks**     | Exactly-once completion delivery.                                  | [`Callback`], [`Outcome`]                   |
//! | **Surfaces**      | Boundary to the sandboxed rendering environment.                   | [`Surface`], [`SurfaceFactory`], [`ContainerHost`] |
//! | **Events**        | Cross-surface reports (rendered, failed, ...).                     | [`Bus`], [`SurfaceEvent`]                   |
//! | **Plugins**       | Observe `slot:queue`, `slot:beforerender`, `slot:afterrender`.     | [`Plugin`], [`PluginSet`]                   |
//! | **Errors**        | Typed configuration, runtime and per-slot errors.                  | [`ConfigError`], [`RuntimeError`], [`SlotError`] |
//! | **Configuration** | Orchestrator-wide settings.                                        | [`OrchestratorConfig`]                      |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] plugin writing lifecycle notifications through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use slotvisor::{
//!     Bus, Callback, ContainerHandle, ContainerHost, Orchestrator, OrchestratorConfig, Outcome,
//!     RefreshCommand, SendError, SlotConfig, SlotId, Surface, SurfaceData, SurfaceEvent,
//!     SurfaceFactory, SurfaceInit,
//! };
//!
//! // A surface that reports `rendered` as soon as it is attached.
//! struct Instant { id: SlotId, bus: Bus }
//!
//! impl Surface for Instant {
//!     fn id(&self) -> &SlotId { &self.id }
//!     fn attach(&mut self, _container: &ContainerHandle) {
//!         self.bus.publish(SurfaceEvent::rendered(self.id.clone(), 300, 250));
//!     }
//!     fn update_data(&mut self, _data: SurfaceData) {}
//!     fn send_refresh(&mut self, _cmd: &RefreshCommand) -> Result<(), SendError> { Ok(()) }
//!     fn detach(&mut self) {}
//! }
//!
//! struct Frames { bus: Bus }
//!
//! impl SurfaceFactory for Frames {
//!     fn create(&self, id: &SlotId, _init: SurfaceInit) -> Box<dyn Surface> {
//!         Box::new(Instant { id: id.clone(), bus: self.bus.clone() })
//!     }
//! }
//!
//! struct Page;
//!
//! impl ContainerHost for Page {
//!     fn lookup(&self, name: &str) -> Option<ContainerHandle> { Some(ContainerHandle::new(name)) }
//!     fn contains(&self, _container: &ContainerHandle) -> bool { true }
//!     fn allocate(&self) -> ContainerHandle { ContainerHandle::new("generated") }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Bus::new(64);
//!     let orchestrator = Orchestrator::builder(OrchestratorConfig::new("/frame.html"))
//!         .with_surfaces(Arc::new(Frames { bus: bus.clone() }))
//!         .with_host(Arc::new(Page))
//!         .with_bus(bus)
//!         .build()?;
//!
//!     orchestrator.queue("top", SlotConfig::new().with_url("/ads/top.js"))?;
//!
//!     let (tx, rx) = tokio::sync::oneshot::channel();
//!     let tx = std::sync::Mutex::new(Some(tx));
//!     orchestrator.render("top", Callback::new(move |outcome: &Outcome| {
//!         if let Some(tx) = tx.lock().ok().and_then(|mut t| t.take()) {
//!             let _ = tx.send(outcome.slot.rendered.times);
//!         }
//!     }))?;
//!
//!     assert_eq!(rx.await?, 1);
//!     orchestrator.shutdown().await;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod plugins;
mod slots;
mod surface;

// ---- Public re-exports ----

pub use core::{EnvSignal, Orchestrator, OrchestratorBuilder, OrchestratorConfig};
pub use error::{ConfigError, RuntimeError, SlotError};
pub use events::{Bus, SurfaceEvent, SurfaceEventKind};
pub use plugins::{LifecycleEvent, LifecycleKind, Plugin, PluginSet};
pub use slots::{
    Callback, DEFAULT_MIN_SIZE, DEFAULT_RETRIES, DEFAULT_TIMEOUT, Dimension, Outcome, Payload,
    Rendered, SlotConfig, SlotId, SlotOptions, SlotSnapshot, SlotState,
};
pub use surface::{
    ContainerHandle, ContainerHost, ContainerRef, RefreshCommand, SendError, Surface, SurfaceData,
    SurfaceFactory, SurfaceInit,
};

// Optional: expose a built-in logging plugin.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use plugins::LogWriter;
