//! In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use slotvisor::{
    Bus, Callback, ContainerHandle, ContainerHost, LifecycleEvent, LifecycleKind, Orchestrator,
    OrchestratorConfig, Outcome, Plugin, RefreshCommand, SendError, SlotId, Surface, SurfaceData,
    SurfaceEvent, SurfaceFactory, SurfaceInit,
};
use tokio::sync::mpsc;

pub const WIDTH: u32 = 310;
pub const HEIGHT: u32 = 225;

/// What a surface was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(SlotId),
    Attach(SlotId, String),
    Update(SlotId),
    Refresh(SlotId, String),
    Detach(SlotId),
}

#[derive(Default)]
pub struct Journal {
    calls: Mutex<Vec<Call>>,
    inits: Mutex<Vec<(SlotId, SurfaceInit)>>,
    data: Mutex<Vec<(SlotId, SurfaceData)>>,
}

impl Journal {
    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self, id: &SlotId) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create(x) if x == id))
            .count()
    }

    pub fn total_creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create(_)))
            .count()
    }

    pub fn refreshes(&self, id: &SlotId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Refresh(x, hash) if &x == id => Some(hash),
                _ => None,
            })
            .collect()
    }

    pub fn detaches(&self, id: &SlotId) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Detach(x) if x == id))
            .count()
    }

    /// Init parameters of the most recent surface created for `id`.
    pub fn last_init(&self, id: &SlotId) -> Option<SurfaceInit> {
        self.inits
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(x, _)| x == id)
            .map(|(_, init)| init.clone())
    }

    /// Most recent data pushed through `update_data` for `id`.
    pub fn last_data(&self, id: &SlotId) -> Option<SurfaceData> {
        self.data
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(x, _)| x == id)
            .map(|(_, d)| d.clone())
    }
}

/// Surface factory recording every call.
///
/// - `echo = true`: surfaces publish `rendered` on attach and on refresh;
/// - `broken = true`: `send_refresh` fails with `SendError::Unreachable`.
pub struct Frames {
    bus: Bus,
    journal: Arc<Journal>,
    echo: Arc<AtomicBool>,
    broken: Arc<AtomicBool>,
}

impl Frames {
    pub fn echoing(bus: &Bus) -> Arc<Self> {
        Arc::new(Self {
            bus: bus.clone(),
            journal: Arc::new(Journal::default()),
            echo: Arc::new(AtomicBool::new(true)),
            broken: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn silent(bus: &Bus) -> Arc<Self> {
        let frames = Self::echoing(bus);
        frames.set_echo(false);
        frames
    }

    pub fn set_echo(&self, on: bool) {
        self.echo.store(on, Ordering::SeqCst);
    }

    pub fn set_broken(&self, on: bool) {
        self.broken.store(on, Ordering::SeqCst);
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}

impl SurfaceFactory for Frames {
    fn create(&self, id: &SlotId, init: SurfaceInit) -> Box<dyn Surface> {
        self.journal.push(Call::Create(id.clone()));
        self.journal.inits.lock().unwrap().push((id.clone(), init));
        Box::new(Frame {
            id: id.clone(),
            bus: self.bus.clone(),
            journal: Arc::clone(&self.journal),
            echo: Arc::clone(&self.echo),
            broken: Arc::clone(&self.broken),
        })
    }
}

struct Frame {
    id: SlotId,
    bus: Bus,
    journal: Arc<Journal>,
    echo: Arc<AtomicBool>,
    broken: Arc<AtomicBool>,
}

impl Frame {
    fn report(&self) {
        if self.echo.load(Ordering::SeqCst) {
            self.bus
                .publish(SurfaceEvent::rendered(self.id.clone(), WIDTH, HEIGHT));
        }
    }
}

impl Surface for Frame {
    fn id(&self) -> &SlotId {
        &self.id
    }

    fn attach(&mut self, container: &ContainerHandle) {
        self.journal
            .push(Call::Attach(self.id.clone(), container.key().to_string()));
        self.report();
    }

    fn update_data(&mut self, data: SurfaceData) {
        self.journal.push(Call::Update(self.id.clone()));
        self.journal.data.lock().unwrap().push((self.id.clone(), data));
    }

    fn send_refresh(&mut self, command: &RefreshCommand) -> Result<(), SendError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(SendError::Unreachable {
                reason: "frame window is gone".into(),
            });
        }
        self.journal
            .push(Call::Refresh(self.id.clone(), command.hash.clone()));
        self.report();
        Ok(())
    }

    fn detach(&mut self) {
        self.journal.push(Call::Detach(self.id.clone()));
    }
}

/// Container host backed by a set of keys.
#[derive(Default)]
pub struct Page {
    present: Mutex<HashSet<String>>,
    generated: Mutex<u32>,
}

impl Page {
    pub fn with(names: &[&str]) -> Arc<Self> {
        let page = Self::default();
        {
            let mut present = page.present.lock().unwrap();
            present.extend(names.iter().map(|n| n.to_string()));
        }
        Arc::new(page)
    }

    pub fn insert(&self, name: &str) {
        self.present.lock().unwrap().insert(name.to_string());
    }

    /// Removes a container from the document.
    pub fn remove(&self, name: &str) {
        self.present.lock().unwrap().remove(name);
    }
}

impl ContainerHost for Page {
    fn lookup(&self, name: &str) -> Option<ContainerHandle> {
        self.present
            .lock()
            .unwrap()
            .contains(name)
            .then(|| ContainerHandle::new(name))
    }

    fn contains(&self, container: &ContainerHandle) -> bool {
        self.present.lock().unwrap().contains(container.key())
    }

    fn allocate(&self) -> ContainerHandle {
        let mut n = self.generated.lock().unwrap();
        *n += 1;
        let key = format!("generated-{n}");
        self.present.lock().unwrap().insert(key.clone());
        ContainerHandle::new(key)
    }
}

/// Plugin forwarding every notification to a channel.
pub struct Recorder {
    tx: mpsc::UnboundedSender<LifecycleEvent>,
}

impl Recorder {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<LifecycleEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl Plugin for Recorder {
    async fn on_event(&self, event: &LifecycleEvent) {
        let _ = self.tx.send(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

/// Kinds received so far, in order.
pub fn drain_kinds(rx: &mut mpsc::UnboundedReceiver<LifecycleEvent>) -> Vec<LifecycleKind> {
    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    kinds
}

/// Callback that forwards every outcome to a channel.
pub fn channel_cb() -> (Callback, mpsc::UnboundedReceiver<Outcome>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let cb = Callback::new(move |outcome: &Outcome| {
        let _ = tx.send(outcome.clone());
    });
    (cb, rx)
}

/// Waits for the next outcome, failing the test after one second.
pub async fn next(rx: &mut mpsc::UnboundedReceiver<Outcome>) -> Outcome {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("callback did not fire in time")
        .expect("callback channel closed")
}

/// Asserts nothing else arrives within a short window.
///
/// A closed channel counts as quiet: the orchestrator drops a callback once
/// every slot it was registered on has resolved.
pub async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<Outcome>) {
    let extra = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
    assert!(
        matches!(extra, Err(_) | Ok(None)),
        "unexpected extra callback: {extra:?}"
    );
}

/// Everything a test needs, wired together.
pub struct Harness {
    pub orchestrator: Orchestrator,
    pub bus: Bus,
    pub frames: Arc<Frames>,
    pub page: Arc<Page>,
}

impl Harness {
    pub fn echoing(containers: &[&str]) -> Self {
        Self::build(containers, true, Vec::new())
    }

    pub fn silent(containers: &[&str]) -> Self {
        Self::build(containers, false, Vec::new())
    }

    pub fn with_plugins(containers: &[&str], plugins: Vec<Arc<dyn Plugin>>) -> Self {
        Self::build(containers, true, plugins)
    }

    fn build(containers: &[&str], echo: bool, plugins: Vec<Arc<dyn Plugin>>) -> Self {
        let mut cfg = OrchestratorConfig::new("/frame.html");
        cfg.bus_capacity = 64;
        Self::build_with(cfg, containers, echo, plugins)
    }

    pub fn build_with(
        cfg: OrchestratorConfig,
        containers: &[&str],
        echo: bool,
        plugins: Vec<Arc<dyn Plugin>>,
    ) -> Self {
        let bus = Bus::new(64);
        let frames = if echo {
            Frames::echoing(&bus)
        } else {
            Frames::silent(&bus)
        };
        let page = Page::with(containers);
        let orchestrator = Orchestrator::builder(cfg)
            .with_surfaces(frames.clone())
            .with_host(page.clone())
            .with_plugins(plugins)
            .with_bus(bus.clone())
            .build()
            .expect("valid config");
        Self {
            orchestrator,
            bus,
            frames,
            page,
        }
    }
}
