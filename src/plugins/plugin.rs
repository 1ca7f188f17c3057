//! # Plugin trait.
//!
//! Provides [`Plugin`], the extension point for observing slot lifecycle
//! notifications (`queue`, `beforerender`, `afterrender`).
//!
//! Each plugin gets:
//! - **Dedicated worker task** (runs independently of the manager)
//! - **Per-plugin bounded queue** (capacity via [`Plugin::queue_capacity`])
//! - **Panic isolation** (a panicking plugin is logged and keeps receiving)
//!
//! ## Architecture
//! ```text
//! PluginSet ──► [bounded queue] ──► worker task ──► plugin.on_event()
//!                                └─► panic caught → tracing::error!
//! ```
//!
//! ## Rules
//! - Notifications are purely observational; nothing a plugin does feeds back
//!   into slot state.
//! - Events are processed sequentially (FIFO) per plugin.
//! - Queue overflow drops the event **for this plugin only**.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use slotvisor::{LifecycleEvent, LifecycleKind, Plugin};
//!
//! struct Impressions;
//!
//! #[async_trait]
//! impl Plugin for Impressions {
//!     async fn on_event(&self, ev: &LifecycleEvent) {
//!         if ev.kind == LifecycleKind::AfterRender && ev.error.is_none() {
//!             // count an impression for ev.slot.name
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "impressions" }
//! }
//! ```

use async_trait::async_trait;

use super::event::LifecycleEvent;

/// Observer of slot lifecycle notifications.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// Processes a single notification.
    ///
    /// Called from the plugin's worker task, not from the manager.
    async fn on_event(&self, event: &LifecycleEvent);

    /// Plugin name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity (clamped to a minimum of 1). Default: 256.
    fn queue_capacity(&self) -> usize {
        256
    }
}
