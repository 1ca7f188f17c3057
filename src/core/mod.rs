//! Runtime core: the orchestrator handle and the manager task behind it.
//!
//! The only public API from this module is [`Orchestrator`], its builder and
//! configuration, and [`EnvSignal`].
//!
//! Internal modules:
//! - [`manager`]: owns every slot, handles commands and surface events;
//! - [`command`]: messages from handles to the manager;
//! - [`sequence`]: priority ordering for bulk render and refresh;
//! - [`signal`]: page-level environment signals;
//! - [`orchestrator`] / [`builder`]: the public handle and its construction.

mod builder;
mod command;
mod config;
mod manager;
mod orchestrator;
mod sequence;
mod signal;

pub use builder::OrchestratorBuilder;
pub use config::OrchestratorConfig;
pub use orchestrator::Orchestrator;
pub use signal::EnvSignal;
