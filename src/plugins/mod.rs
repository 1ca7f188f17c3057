//! # Lifecycle plugins.
//!
//! The orchestrator notifies plugins about slot lifecycle stages. Plugins are
//! observers: they receive snapshots and cannot influence slot state.
//!
//! ```text
//! Manager ── emit(LifecycleEvent) ──► PluginSet ──► per-plugin queue ──► Plugin::on_event
//!                                                   ├──► LogWriter (feature "logging")
//!                                                   └──► custom plugins
//! ```

mod event;
#[cfg(feature = "logging")]
mod log;
mod plugin;
mod set;

pub use event::{LifecycleEvent, LifecycleKind};
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use plugin::Plugin;
pub use set::PluginSet;
