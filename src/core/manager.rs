//! # Manager: the task that owns every slot.
//!
//! The manager is the only writer of orchestrator state. It handles
//! [`Command`]s from handles and [`SurfaceEvent`]s from the cross-surface bus,
//! one at a time, so no state is ever shared or locked.
//!
//! ## Loop
//! ```text
//! loop select! (biased) {
//!   token.cancelled()  ─► teardown, exit
//!   commands.recv()    ─► handle(Command)         (render, refresh, queue, ...)
//!   events.recv()      ─► on_surface_event(ev)    (rendered, failed, ...)
//! }
//! ```
//! Commands win over bus events. An event published by a surface while a
//! command is being handled (for example from inside `attach`) waits in the
//! bus until that command and any already queued ones are done.
//!
//! ## Resolution
//! ```text
//! resolve(slot, error):
//!   take callbacks ─► snapshot ─► afterrender ─► done/fail hook ─► callbacks (FIFO)
//! ```
//! Every registered callback fires exactly once. A panicking callback is
//! caught and logged.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::error::SlotError;
use crate::events::{SurfaceEvent, SurfaceEventKind};
use crate::plugins::{LifecycleEvent, LifecycleKind, PluginSet};
use crate::slots::{Callback, Outcome, Slot, SlotConfig, SlotId, SlotOptions, SlotSnapshot, SlotState};
use crate::surface::{
    ContainerHandle, ContainerHost, ContainerRef, RefreshCommand, SurfaceData, SurfaceFactory,
    SurfaceInit,
};

use super::command::{Command, CommandRx};
use super::sequence::{Mode, Sequence};
use super::signal::EnvSignal;

pub(crate) struct Manager {
    surface_url: Arc<str>,
    surfaces: Arc<dyn SurfaceFactory>,
    host: Arc<dyn ContainerHost>,
    plugins: PluginSet,
    tx: mpsc::WeakUnboundedSender<Command>,

    slots: Vec<Slot>,
    configs: HashMap<String, SlotConfig>,
    inject: Map<String, Value>,
    last_order: Vec<String>,
}

pub(crate) struct ManagerParts {
    pub surface_url: Arc<str>,
    pub surfaces: Arc<dyn SurfaceFactory>,
    pub host: Arc<dyn ContainerHost>,
    pub plugins: PluginSet,
    pub tx: mpsc::WeakUnboundedSender<Command>,
    pub inject: Map<String, Value>,
}

impl Manager {
    pub(crate) fn new(parts: ManagerParts) -> Self {
        Self {
            surface_url: parts.surface_url,
            surfaces: parts.surfaces,
            host: parts.host,
            plugins: parts.plugins,
            tx: parts.tx,
            slots: Vec::new(),
            configs: HashMap::new(),
            inject: parts.inject,
            last_order: Vec::new(),
        }
    }

    /// Runs until cancelled or until every handle is gone.
    pub(crate) async fn run(
        mut self,
        mut commands: CommandRx,
        mut events: broadcast::Receiver<SurfaceEvent>,
        token: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => break,

                cmd = commands.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },

                ev = events.recv() => match ev {
                    Ok(ev) => self.on_surface_event(ev),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "surface events lost: bus lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        self.teardown().await;
    }

    async fn teardown(mut self) {
        for slot in &mut self.slots {
            slot.drop_surface();
        }
        let remaining = self.slots.len();
        // Dropping pending callbacks ends any sequence still waiting on them.
        self.slots.clear();
        tracing::debug!(remaining, "orchestrator stopped");
        self.plugins.shutdown().await;
    }

    fn handle(&mut self, cmd: Command) {
        tracing::trace!(cmd = cmd.as_label(), "command");
        match cmd {
            Command::Config { name, config } => {
                self.configs.insert(name, config);
            }
            Command::Queue {
                id,
                name,
                overrides,
            } => self.queue(id, name, overrides),
            Command::Update { name, config } => self.update(&name, config),
            Command::Render { name, cb, ack } => {
                let fired = self.render(&name, &cb);
                if let Some(ack) = ack {
                    let _ = ack.send(fired);
                }
            }
            Command::Refresh { name, cb, ack } => {
                let fired = self.refresh(&name, &cb);
                if let Some(ack) = ack {
                    let _ = ack.send(fired);
                }
            }
            Command::BeginRenderAll { order } => self.last_order = order,
            Command::BeginRefreshAll { order } => {
                self.last_order = order;
                self.mark_for_refresh();
            }
            Command::RenderUntouched { cb } => self.render_untouched(&cb),
            Command::RefreshUntouched { cb } => self.refresh_untouched(&cb),
            Command::Resolve { id } => self.resolve(&id),
            Command::Fail { id, reason } => self.fail(&id, reason),
            Command::ExtendInject { data } => self.inject.extend(data),
            Command::Signal(signal) => self.signal(signal),
            Command::Slots { name, reply } => {
                let _ = reply.send(self.snapshots(name.as_deref()));
            }
            Command::Slot { id, reply } => {
                let snapshot = self.position(&id).map(|idx| self.slots[idx].snapshot());
                let _ = reply.send(snapshot);
            }
        }
    }

    fn queue(&mut self, id: SlotId, name: String, overrides: SlotConfig) {
        let mut merged = match self.configs.get(&name) {
            Some(named) => named.merged(&overrides),
            None => overrides,
        };
        if merged.container.is_none() {
            merged.container = Some(ContainerRef::Handle(self.host.allocate()));
        }

        let options = match SlotOptions::resolve(merged) {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!(slot = %id, err = %e, "queue rejected");
                return;
            }
        };

        let slot = Slot::create(id, &name, options);
        tracing::debug!(slot = %slot.id(), name = %name, "queued");
        self.plugins
            .emit(LifecycleEvent::new(LifecycleKind::Queued, slot.snapshot()));
        self.slots.push(slot);
    }

    fn update(&mut self, name: &str, config: SlotConfig) {
        for slot in self.slots.iter_mut().filter(|s| s.name() == name) {
            if let Err(e) = slot.options.apply(config.clone()) {
                tracing::warn!(slot = %slot.id(), err = %e, "update rejected");
            }
        }
    }

    /// Renders every slot named `name`. Returns how many callbacks were registered or fired.
    fn render(&mut self, name: &str, cb: &Callback) -> usize {
        let ids = self.ids_where(|s| s.name() == name);
        if ids.is_empty() {
            tracing::debug!(name, "render: no slots queued");
        }
        ids.iter().map(|id| self.render_slot(id, cb.clone())).sum()
    }

    fn render_untouched(&mut self, cb: &Callback) {
        let ids = self.ids_where(|s| s.state().is_untouched());
        for id in &ids {
            self.render_slot(id, cb.clone());
        }
    }

    fn render_slot(&mut self, id: &SlotId, cb: Callback) -> usize {
        let Some(idx) = self.position(id) else { return 0 };
        let slot = &mut self.slots[idx];
        let state = slot.state();

        if state.is_resolved() {
            tracing::debug!(slot = %id, "render: already resolved");
            return 0;
        }
        slot.push_callback(cb);
        if state.is_active() {
            return 1;
        }

        let missing = match (&slot.options.container, &slot.options.url) {
            (None, _) => Some("container"),
            (_, None) => Some("url"),
            _ => None,
        };
        if let Some(missing) = missing {
            slot.set_state(SlotState::Incomplete);
            let err = SlotError::Incomplete {
                slot: id.clone(),
                missing,
            };
            Self::finish(&self.plugins, slot, Some(err));
            return 1;
        }

        let Some(container) = self.locate(idx) else {
            self.destroy(idx);
            return 1;
        };

        let slot = &mut self.slots[idx];
        self.plugins
            .emit(LifecycleEvent::new(LifecycleKind::BeforeRender, slot.snapshot()));

        let init = SurfaceInit {
            url: Arc::clone(&self.surface_url),
            width: slot.options.width.clone(),
            height: slot.options.height.clone(),
            hidden: slot.options.hidden,
            data: outbound(slot, &self.inject),
        };
        let mut surface = self.surfaces.create(id, init);

        let next = if state == SlotState::Created {
            SlotState::Active
        } else {
            SlotState::Reactivated
        };
        slot.set_state(next);
        surface.attach(&container);
        slot.replace_surface(surface);
        tracing::debug!(slot = %id, state = ?next, container = %container, "surface attached");
        1
    }

    /// Refreshes every slot named `name`. Returns how many callbacks were registered or fired.
    fn refresh(&mut self, name: &str, cb: &Callback) -> usize {
        let ids = self.ids_where(|s| s.name() == name);
        if ids.is_empty() {
            tracing::debug!(name, "refresh: no slots queued");
        }
        ids.iter().map(|id| self.refresh_slot(id, cb.clone())).sum()
    }

    fn refresh_untouched(&mut self, cb: &Callback) {
        let ids = self.ids_where(|s| s.state().needs_refresh());
        for id in &ids {
            self.refresh_slot(id, cb.clone());
        }
    }

    fn refresh_slot(&mut self, id: &SlotId, cb: Callback) -> usize {
        let Some(idx) = self.position(id) else { return 0 };
        let slot = &mut self.slots[idx];
        let state = slot.state();

        if !state.is_usable() {
            let err = SlotError::NotUsable {
                slot: id.clone(),
                state,
            };
            invoke(&cb, &Outcome {
                slot: slot.snapshot(),
                error: Some(err),
            });
            return 1;
        }

        if slot.options.container.is_some() && self.locate(idx).is_none() {
            self.slots[idx].push_callback(cb);
            self.destroy(idx);
            return 1;
        }

        let slot = &mut self.slots[idx];
        let refreshable = state == SlotState::Refreshing || state.can_transition(SlotState::Refreshing);
        if !slot.has_surface() || !refreshable {
            return self.render_slot(id, cb);
        }

        let data = outbound(slot, &self.inject);
        let command = RefreshCommand::new(id.clone(), &data);
        if state != SlotState::Refreshing {
            slot.set_state(SlotState::Refreshing);
        }

        let sent = match slot.surface_mut() {
            Some(surface) => {
                surface.update_data(data);
                surface.send_refresh(&command)
            }
            None => Ok(()),
        };

        match sent {
            Ok(()) => {
                slot.push_callback(cb);
                tracing::debug!(slot = %id, "refresh sent");
                1
            }
            Err(e) => {
                tracing::debug!(slot = %id, err = %e, "refresh undeliverable, rendering again");
                slot.drop_surface();
                slot.set_state(SlotState::Removed);
                self.render_slot(id, cb)
            }
        }
    }

    fn mark_for_refresh(&mut self) {
        for slot in &mut self.slots {
            if slot.state().can_transition(SlotState::NeedsRefresh) {
                slot.set_state(SlotState::NeedsRefresh);
            }
        }
    }

    fn signal(&mut self, signal: EnvSignal) {
        if !signal.wants_refresh() {
            return;
        }
        let Some(tx) = self.tx.upgrade() else { return };
        tracing::debug!(order = ?self.last_order, "page restored, refreshing all");
        self.mark_for_refresh();
        Sequence::new(tx, Mode::Refresh, self.last_order.clone(), Callback::noop()).spawn();
    }

    fn on_surface_event(&mut self, ev: SurfaceEvent) {
        let Some(idx) = self.position(&ev.id) else {
            tracing::debug!(slot = %ev.id, kind = ev.kind.as_str(), "event for unknown slot");
            return;
        };

        match ev.kind {
            SurfaceEventKind::Rendered => {
                let slot = &mut self.slots[idx];
                slot.merge_metrics(ev.width, ev.height, &ev.extra);
                if slot.state().can_transition(SlotState::Resolved) {
                    self.resolve_at(idx);
                } else {
                    tracing::debug!(slot = %ev.id, width = ?ev.width, height = ?ev.height, "size report");
                }
            }
            SurfaceEventKind::Failed => {
                let reason = ev
                    .reason
                    .unwrap_or_else(|| Arc::from("surface reported failure"));
                let err = SlotError::Failed {
                    slot: ev.id,
                    reason,
                };
                self.fail_at(idx, SlotState::Failed, err);
            }
            SurfaceEventKind::TimedOut => {
                let err = SlotError::TimedOut { slot: ev.id };
                self.fail_at(idx, SlotState::TimedOut, err);
            }
            SurfaceEventKind::Rejected => {
                let reason = ev.reason.unwrap_or_else(|| Arc::from("rejected by surface"));
                let err = SlotError::Rejected {
                    slot: ev.id,
                    reason,
                };
                self.fail_at(idx, SlotState::Rejected, err);
            }
        }
    }

    fn resolve(&mut self, id: &SlotId) {
        match self.position(id) {
            Some(idx) if self.slots[idx].state().can_transition(SlotState::Resolved) => {
                self.resolve_at(idx);
            }
            Some(_) => tracing::debug!(slot = %id, "resolve: nothing in flight"),
            None => tracing::debug!(slot = %id, "resolve: unknown slot"),
        }
    }

    fn fail(&mut self, id: &SlotId, reason: String) {
        let Some(idx) = self.position(id) else {
            tracing::debug!(slot = %id, "fail: unknown slot");
            return;
        };
        let err = SlotError::Failed {
            slot: id.clone(),
            reason: Arc::from(reason),
        };
        self.fail_at(idx, SlotState::Failed, err);
    }

    fn resolve_at(&mut self, idx: usize) {
        let slot = &mut self.slots[idx];
        if slot.mark_resolved() {
            Self::finish(&self.plugins, slot, None);
        }
    }

    fn fail_at(&mut self, idx: usize, state: SlotState, err: SlotError) {
        let slot = &mut self.slots[idx];
        if slot.set_state(state) {
            Self::finish(&self.plugins, slot, Some(err));
        }
    }

    /// Destroyed path: purge the slot, then run its callbacks with the error.
    fn destroy(&mut self, idx: usize) {
        let mut slot = self.slots.remove(idx);
        slot.drop_surface();
        slot.options.container = None;
        slot.set_state(SlotState::Destroyed);
        let err = SlotError::ContainerMissing {
            slot: slot.id().clone(),
        };
        tracing::debug!(slot = %slot.id(), "container missing, slot destroyed");
        Self::finish(&self.plugins, &mut slot, Some(err));
    }

    fn finish(plugins: &PluginSet, slot: &mut Slot, error: Option<SlotError>) {
        let callbacks = slot.take_callbacks();
        let outcome = Outcome {
            slot: slot.snapshot(),
            error,
        };
        plugins.emit(
            LifecycleEvent::new(LifecycleKind::AfterRender, outcome.slot.clone())
                .with_error(outcome.error.clone()),
        );

        let hook = match outcome.error {
            None => slot.options.done.as_ref(),
            Some(_) => slot.options.fail.as_ref(),
        };
        if let Some(hook) = hook {
            invoke(hook, &outcome);
        }

        tracing::debug!(
            slot = %outcome.slot.id,
            state = ?outcome.slot.state,
            callbacks = callbacks.len(),
            err = outcome.error.as_ref().map(SlotError::as_label),
            "resolved"
        );
        for cb in &callbacks {
            invoke(cb, &outcome);
        }
    }

    /// Resolves the slot's container against the host, pinning named containers.
    fn locate(&mut self, idx: usize) -> Option<ContainerHandle> {
        let slot = &mut self.slots[idx];
        let handle = match slot.options.container.as_ref()? {
            ContainerRef::Handle(h) => self.host.contains(h).then(|| h.clone())?,
            ContainerRef::Named(name) => self.host.lookup(name)?,
        };
        slot.options.container = Some(ContainerRef::Handle(handle.clone()));
        Some(handle)
    }

    fn position(&self, id: &SlotId) -> Option<usize> {
        self.slots.iter().position(|s| s.id() == id)
    }

    fn ids_where(&self, pred: impl Fn(&Slot) -> bool) -> Vec<SlotId> {
        self.slots
            .iter()
            .filter(|s| pred(s))
            .map(|s| s.id().clone())
            .collect()
    }

    fn snapshots(&self, name: Option<&str>) -> Vec<SlotSnapshot> {
        self.slots
            .iter()
            .filter(|s| name.is_none_or(|n| s.name() == n))
            .map(Slot::snapshot)
            .collect()
    }
}

/// Data sent to a surface: the slot payload with the inject map on top.
fn outbound(slot: &Slot, inject: &Map<String, Value>) -> SurfaceData {
    let mut data = match serde_json::to_value(slot.payload()) {
        Ok(Value::Object(map)) => map,
        _ => {
            tracing::warn!(slot = %slot.id(), "payload is not an object");
            Map::new()
        }
    };
    data.extend(inject.clone());
    data
}

fn invoke(cb: &Callback, outcome: &Outcome) {
    if let Err(panic) = std::panic::catch_unwind(AssertUnwindSafe(|| cb.call(outcome))) {
        tracing::error!(slot = %outcome.slot.id, panic = ?panic, "callback panicked");
    }
}
