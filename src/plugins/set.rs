//! # PluginSet: non-blocking fan-out over registered plugins.
//!
//! [`PluginSet`] is the plugin registry. It is built from the plugins the caller
//! hands to the builder, spawns one worker per plugin on construction (init) and
//! drains them in [`PluginSet::shutdown`] (teardown).
//!
//! ## What it guarantees
//! - `emit(LifecycleEvent)` returns immediately.
//! - Per-plugin FIFO (queue order).
//! - Panics inside plugins are caught and logged (isolation).
//!
//! ## What it does **not** guarantee
//! - No global ordering across different plugins.
//! - No retries on per-plugin queue overflow.
//!
//! ## Diagram
//! ```text
//!    emit(LifecycleEvent)
//!        │                        (Arc-clone per plugin)
//!        ├────────────────► [queue P1] ─► worker P1 ─► on_event()
//!        ├────────────────► [queue P2] ─► worker P2 ─► on_event()
//!        └────────────────► [queue PN] ─► worker PN ─► on_event()
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use super::Plugin;
use super::event::LifecycleEvent;

struct PluginChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<LifecycleEvent>>,
}

/// Plugin registry with per-plugin bounded queues and worker tasks.
pub struct PluginSet {
    channels: Vec<PluginChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl PluginSet {
    /// Registers `plugins` and spawns one worker per plugin.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(plugins: Vec<Arc<dyn Plugin>>) -> Self {
        let mut channels = Vec::with_capacity(plugins.len());
        let mut workers = Vec::with_capacity(plugins.len());

        for plugin in plugins {
            let cap = plugin.queue_capacity().max(1);
            let name = plugin.name();
            let (tx, mut rx) = mpsc::channel::<Arc<LifecycleEvent>>(cap);
            let p = Arc::clone(&plugin);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = p.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        tracing::error!(plugin = p.name(), panic = ?panic_err, "plugin panicked");
                    }
                }
            });

            channels.push(PluginChannel { name, sender: tx });
            workers.push(handle);
        }

        Self { channels, workers }
    }

    /// Fan-out one notification to all plugins (non-blocking).
    pub fn emit(&self, event: LifecycleEvent) {
        if self.channels.is_empty() {
            return;
        }
        let ev = Arc::new(event);
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(plugin = channel.name, "plugin dropped event: queue full");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::warn!(plugin = channel.name, "plugin dropped event: worker closed");
                }
            }
        }
    }

    /// Graceful teardown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }
}
