//! Renders three slots with a priority ordering, then refreshes them.
//!
//! Surfaces here are in-process stand-ins that answer after a short delay.
//!
//! ```text
//! cargo run --example render_all --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use slotvisor::{
    Bus, Callback, ContainerHandle, ContainerHost, LogWriter, Orchestrator, OrchestratorConfig,
    Outcome, Plugin, RefreshCommand, SendError, SlotConfig, SlotId, Surface, SurfaceData,
    SurfaceEvent, SurfaceFactory, SurfaceInit,
};

struct DelayedFrame {
    id: SlotId,
    bus: Bus,
    delay: Duration,
}

impl DelayedFrame {
    fn answer(&self) {
        let (id, bus, delay) = (self.id.clone(), self.bus.clone(), self.delay);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            bus.publish(SurfaceEvent::rendered(id, 300, 250));
        });
    }
}

impl Surface for DelayedFrame {
    fn id(&self) -> &SlotId {
        &self.id
    }

    fn attach(&mut self, _container: &ContainerHandle) {
        self.answer();
    }

    fn update_data(&mut self, _data: SurfaceData) {}

    fn send_refresh(&mut self, _command: &RefreshCommand) -> Result<(), SendError> {
        self.answer();
        Ok(())
    }

    fn detach(&mut self) {}
}

struct Frames {
    bus: Bus,
}

impl SurfaceFactory for Frames {
    fn create(&self, id: &SlotId, init: SurfaceInit) -> Box<dyn Surface> {
        println!("[frames] {id} loads {} (hidden={})", init.url, init.hidden);
        Box::new(DelayedFrame {
            id: id.clone(),
            bus: self.bus.clone(),
            delay: Duration::from_millis(50),
        })
    }
}

struct Page;

impl ContainerHost for Page {
    fn lookup(&self, name: &str) -> Option<ContainerHandle> {
        Some(ContainerHandle::new(name))
    }

    fn contains(&self, _container: &ContainerHandle) -> bool {
        true
    }

    fn allocate(&self) -> ContainerHandle {
        ContainerHandle::new("body")
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,slotvisor=debug".into()),
        )
        .init();

    let bus = Bus::new(128);
    let plugins: Vec<Arc<dyn Plugin>> = vec![Arc::new(LogWriter::new())];
    let orchestrator = Orchestrator::builder(OrchestratorConfig::new("/frame.html"))
        .with_surfaces(Arc::new(Frames { bus: bus.clone() }))
        .with_host(Arc::new(Page))
        .with_plugins(plugins)
        .with_bus(bus)
        .build()?;

    orchestrator.config("top", SlotConfig::new().with_container("top-banner"))?;
    orchestrator.queue("side", SlotConfig::new().with_url("/ads/side.js?cb=GARDR_UNIQUE_ID"))?;
    orchestrator.queue("top", SlotConfig::new().with_url("/ads/top.js"))?;
    orchestrator.queue("bottom", SlotConfig::new().with_url("/ads/bottom.js"))?;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let done = Callback::new(move |outcome: &Outcome| {
        let _ = tx.send((outcome.slot.id.clone(), outcome.slot.rendered.times));
    });

    orchestrator.render_all("top,side", done.clone())?;
    for _ in 0..3 {
        if let Some((id, times)) = rx.recv().await {
            println!("[demo] rendered {id} (times={times})");
        }
    }

    orchestrator.refresh_all("top", done)?;
    for _ in 0..3 {
        if let Some((id, times)) = rx.recv().await {
            println!("[demo] refreshed {id} (times={times})");
        }
    }

    orchestrator.shutdown().await;
    Ok(())
}
