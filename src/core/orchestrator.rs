//! # Orchestrator: the public handle.
//!
//! [`Orchestrator`] turns every call into a command for the manager task and
//! returns immediately. Completion is reported through [`Callback`]s, never
//! through return values; the only synchronous errors are misconfiguration
//! ([`ConfigError`]) and a stopped manager ([`RuntimeError::Closed`]).
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use slotvisor::{Callback, ContainerHandle, ContainerHost, Orchestrator, OrchestratorConfig,
//!     Outcome, SlotConfig, SlotId, Surface, SurfaceFactory, SurfaceInit};
//! # struct Frames;
//! # impl SurfaceFactory for Frames {
//! #     fn create(&self, _id: &SlotId, _init: SurfaceInit) -> Box<dyn Surface> { unimplemented!() }
//! # }
//! # struct Page;
//! # impl ContainerHost for Page {
//! #     fn lookup(&self, name: &str) -> Option<ContainerHandle> { Some(ContainerHandle::new(name)) }
//! #     fn contains(&self, _c: &ContainerHandle) -> bool { true }
//! #     fn allocate(&self) -> ContainerHandle { ContainerHandle::new("generated") }
//! # }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::builder(OrchestratorConfig::new("/frame.html"))
//!         .with_surfaces(Arc::new(Frames))
//!         .with_host(Arc::new(Page))
//!         .build()?;
//!
//!     orchestrator.config("top", SlotConfig::new().with_container("top-banner"))?;
//!     orchestrator.queue("top", SlotConfig::new().with_url("/ads/top.js"))?;
//!     orchestrator.render_all("top", Callback::new(|outcome: &Outcome| {
//!         println!("{} done, ok={}", outcome.slot.id, outcome.is_ok());
//!     }))?;
//!
//!     orchestrator.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Map, Value};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ConfigError, RuntimeError};
use crate::events::Bus;
use crate::slots::{Callback, SlotConfig, SlotId, SlotOptions, SlotSnapshot};

use super::builder::OrchestratorBuilder;
use super::command::{Command, CommandTx};
use super::config::OrchestratorConfig;
use super::sequence::{Mode, Sequence};
use super::signal::{EnvSignal, parse_priority};

/// Handle to a running orchestrator.
///
/// Dropping every handle stops the manager once no bulk sequence is running;
/// [`Orchestrator::shutdown`] stops it right away.
pub struct Orchestrator {
    tx: CommandTx,
    bus: Bus,
    token: CancellationToken,
    manager: Mutex<Option<JoinHandle<()>>>,
}

impl Orchestrator {
    /// Starts building an orchestrator.
    pub fn builder(cfg: OrchestratorConfig) -> OrchestratorBuilder {
        OrchestratorBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        tx: CommandTx,
        bus: Bus,
        token: CancellationToken,
        manager: JoinHandle<()>,
    ) -> Self {
        Self {
            tx,
            bus,
            token,
            manager: Mutex::new(Some(manager)),
        }
    }

    /// Cross-surface bus; surfaces publish their reports here.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Stores or overwrites the named defaults for `name`.
    pub fn config(&self, name: &str, config: SlotConfig) -> Result<(), RuntimeError> {
        require_name(name)?;
        SlotOptions::resolve(config.clone())?;
        self.send(Command::Config {
            name: name.to_string(),
            config,
        })
    }

    /// Queues a new slot under `name` and returns its id.
    ///
    /// `overrides` win over the named defaults field by field. Without a
    /// container from either, the host allocates a fresh one.
    pub fn queue(&self, name: &str, overrides: SlotConfig) -> Result<SlotId, RuntimeError> {
        require_name(name)?;
        SlotOptions::resolve(overrides.clone())?;
        let id = SlotId::next(name);
        self.send(Command::Queue {
            id: id.clone(),
            name: name.to_string(),
            overrides,
        })?;
        Ok(id)
    }

    /// Renders every slot named `name`; `cb` fires once per slot.
    pub fn render(&self, name: &str, cb: impl Into<Callback>) -> Result<(), RuntimeError> {
        self.send(Command::Render {
            name: name.to_string(),
            cb: cb.into(),
            ack: None,
        })
    }

    /// Renders the comma separated `priority` names one after another, then
    /// every other untouched slot in no particular order.
    pub fn render_all(&self, priority: &str, cb: impl Into<Callback>) -> Result<(), RuntimeError> {
        let order = parse_priority(priority);
        self.send(Command::BeginRenderAll {
            order: order.clone(),
        })?;
        Sequence::new(self.tx.clone(), Mode::Render, order, cb.into()).spawn();
        Ok(())
    }

    /// Sends fresh data to every slot named `name`; `cb` fires once per slot.
    pub fn refresh(&self, name: &str, cb: impl Into<Callback>) -> Result<(), RuntimeError> {
        self.send(Command::Refresh {
            name: name.to_string(),
            cb: cb.into(),
            ack: None,
        })
    }

    /// Marks every slot for refresh, then refreshes like [`Orchestrator::render_all`] renders.
    pub fn refresh_all(&self, priority: &str, cb: impl Into<Callback>) -> Result<(), RuntimeError> {
        let order = parse_priority(priority);
        self.send(Command::BeginRefreshAll {
            order: order.clone(),
        })?;
        Sequence::new(self.tx.clone(), Mode::Refresh, order, cb.into()).spawn();
        Ok(())
    }

    /// Resolves the slot successfully without waiting for its surface.
    pub fn resolve(&self, id: &SlotId) -> Result<(), RuntimeError> {
        self.send(Command::Resolve { id: id.clone() })
    }

    /// Fails the slot; its callbacks get [`SlotError::Failed`](crate::SlotError::Failed).
    pub fn fail(&self, id: &SlotId, reason: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(Command::Fail {
            id: id.clone(),
            reason: reason.into(),
        })
    }

    /// Merges `config` into every live slot named `name` without rendering.
    pub fn update(&self, name: &str, config: SlotConfig) -> Result<(), RuntimeError> {
        SlotOptions::resolve(config.clone())?;
        self.send(Command::Update {
            name: name.to_string(),
            config,
        })
    }

    /// Merges `data` into the slots named `name`, then refreshes them.
    pub fn set_data(
        &self,
        name: &str,
        data: Map<String, Value>,
        cb: impl Into<Callback>,
    ) -> Result<(), RuntimeError> {
        self.update(name, SlotConfig::new().with_data(data))?;
        self.refresh(name, cb)
    }

    /// Points the slots named `name` at a new content url, then refreshes them.
    pub fn set_url(
        &self,
        name: &str,
        url: impl Into<String>,
        cb: impl Into<Callback>,
    ) -> Result<(), RuntimeError> {
        self.update(name, SlotConfig::new().with_url(url))?;
        self.refresh(name, cb)
    }

    /// [`Orchestrator::set_url`] for every entry of `urls`, sharing one callback.
    pub fn set_url_map(
        &self,
        urls: HashMap<String, String>,
        cb: impl Into<Callback>,
    ) -> Result<(), RuntimeError> {
        let cb = cb.into();
        for (name, url) in urls {
            self.set_url(&name, url, cb.clone())?;
        }
        Ok(())
    }

    /// Extends the data merged on top of every outbound payload.
    pub fn extend_inject(&self, data: Map<String, Value>) -> Result<(), RuntimeError> {
        self.send(Command::ExtendInject { data })
    }

    /// Forwards a page-level event from the host environment.
    pub fn signal(&self, signal: EnvSignal) -> Result<(), RuntimeError> {
        self.send(Command::Signal(signal))
    }

    /// Snapshots of the live slots named `name`.
    pub async fn slots(&self, name: &str) -> Result<Vec<SlotSnapshot>, RuntimeError> {
        self.query_slots(Some(name.to_string())).await
    }

    /// Snapshot of one live slot.
    pub async fn slot(&self, id: &SlotId) -> Result<Option<SlotSnapshot>, RuntimeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Slot {
            id: id.clone(),
            reply,
        })?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    /// Number of live slots.
    pub async fn len(&self) -> Result<usize, RuntimeError> {
        Ok(self.query_slots(None).await?.len())
    }

    /// Stops the manager: detaches every surface and drains the plugins.
    ///
    /// Pending callbacks are dropped without firing.
    pub async fn shutdown(&self) {
        self.token.cancel();
        let manager = self.manager.lock().ok().and_then(|mut guard| guard.take());
        if let Some(manager) = manager {
            let _ = manager.await;
        }
    }

    async fn query_slots(&self, name: Option<String>) -> Result<Vec<SlotSnapshot>, RuntimeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Slots { name, reply })?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    fn send(&self, cmd: Command) -> Result<(), RuntimeError> {
        self.tx.send(cmd).map_err(|_| RuntimeError::Closed)
    }
}

fn require_name(name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::MissingName);
    }
    Ok(())
}
