//! # LogWriter: lifecycle notifications as tracing records.
//!
//! ## Example output (with a fmt subscriber)
//! ```text
//! INFO slot:queue slot=top-1 name=top
//! INFO slot:beforerender slot=top-1 name=top
//! INFO slot:afterrender slot=top-1 name=top times=1 width=Some(310) height=Some(225)
//! WARN slot:afterrender slot=side-2 name=side err=side-2: container missing from document
//! ```

use async_trait::async_trait;

use super::Plugin;
use super::event::{LifecycleEvent, LifecycleKind};

/// Plugin that logs every lifecycle notification.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for LogWriter {
    async fn on_event(&self, e: &LifecycleEvent) {
        let kind = e.kind.as_str();
        match (e.kind, &e.error) {
            (LifecycleKind::AfterRender, Some(err)) => {
                tracing::warn!(slot = %e.slot.id, name = %e.slot.name, err = %err, "{kind}");
            }
            (LifecycleKind::AfterRender, None) => {
                tracing::info!(
                    slot = %e.slot.id,
                    name = %e.slot.name,
                    times = e.slot.rendered.times,
                    width = ?e.slot.rendered.width,
                    height = ?e.slot.rendered.height,
                    "{kind}"
                );
            }
            _ => {
                tracing::info!(slot = %e.slot.id, name = %e.slot.name, "{kind}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
