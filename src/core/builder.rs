use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ConfigError;
use crate::events::Bus;
use crate::plugins::{Plugin, PluginSet};
use crate::surface::{ContainerHost, SurfaceFactory};

use super::config::OrchestratorConfig;
use super::manager::{Manager, ManagerParts};
use super::orchestrator::Orchestrator;

/// Builder wiring an [`Orchestrator`] to its collaborators.
///
/// A surface factory and a container host are required; plugins and the bus
/// are optional.
pub struct OrchestratorBuilder {
    cfg: OrchestratorConfig,
    surfaces: Option<Arc<dyn SurfaceFactory>>,
    host: Option<Arc<dyn ContainerHost>>,
    plugins: Vec<Arc<dyn Plugin>>,
    bus: Option<Bus>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: OrchestratorConfig) -> Self {
        Self {
            cfg,
            surfaces: None,
            host: None,
            plugins: Vec::new(),
            bus: None,
        }
    }

    /// Sets the factory that creates one sandboxed surface per render.
    pub fn with_surfaces(mut self, surfaces: Arc<dyn SurfaceFactory>) -> Self {
        self.surfaces = Some(surfaces);
        self
    }

    /// Sets the host that looks up, checks and allocates containers.
    pub fn with_host(mut self, host: Arc<dyn ContainerHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets lifecycle plugins.
    ///
    /// Plugins receive `slot:queue`, `slot:beforerender` and `slot:afterrender`
    /// notifications through dedicated workers with bounded queues.
    pub fn with_plugins(mut self, plugins: Vec<Arc<dyn Plugin>>) -> Self {
        self.plugins = plugins;
        self
    }

    /// Uses an existing cross-surface bus instead of creating one.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Validates the configuration and starts the manager task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<Orchestrator, ConfigError> {
        self.cfg.validate()?;
        let surfaces = self.surfaces.ok_or(ConfigError::MissingOption {
            option: "surfaces",
        })?;
        let host = self
            .host
            .ok_or(ConfigError::MissingOption { option: "host" })?;

        let bus = self
            .bus
            .unwrap_or_else(|| Bus::new(self.cfg.bus_capacity_clamped()));
        let events = bus.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        let manager = Manager::new(ManagerParts {
            surface_url: self.cfg.surface_url(),
            surfaces,
            host,
            plugins: PluginSet::new(self.plugins),
            tx: tx.downgrade(),
            inject: self.cfg.initial_inject(),
        });
        let join = tokio::spawn(manager.run(rx, events, token.clone()));

        Ok(Orchestrator::from_parts(tx, bus, token, join))
    }
}
