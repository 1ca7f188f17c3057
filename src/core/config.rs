//! # Orchestrator configuration.
//!
//! Provides [`OrchestratorConfig`], centralized settings for one orchestrator.
//!
//! ## Sentinel values
//! - `log_level = 0` → no log settings injected into surface payloads
//! - `bus_capacity = 0` → clamped to 1

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Global configuration for the orchestrator.
///
/// ## Field semantics
/// - `surface_url`: base address of the sandboxed document every surface loads (required)
/// - `bus_capacity`: ring buffer size of the default cross-surface bus (min 1)
/// - `log_level`: log level forwarded to surfaces (`0` = off)
/// - `log_to`: log sink name forwarded to surfaces (only with `log_level > 0`)
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over checking sentinels inline.
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Base address handed to every surface on construction.
    pub surface_url: String,

    /// Capacity of the cross-surface bus created when the builder gets none.
    pub bus_capacity: usize,

    /// Log level forwarded in every outbound payload as `loglevel`.
    pub log_level: u8,

    /// Log sink forwarded as `logto` when `log_level > 0`.
    pub log_to: Option<String>,
}

impl OrchestratorConfig {
    /// Config with the given surface url and defaults for everything else.
    pub fn new(surface_url: impl Into<String>) -> Self {
        Self {
            surface_url: surface_url.into(),
            ..Self::default()
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks required options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.surface_url.trim().is_empty() {
            return Err(ConfigError::MissingOption {
                option: "surface_url",
            });
        }
        Ok(())
    }

    pub(crate) fn surface_url(&self) -> Arc<str> {
        Arc::from(self.surface_url.as_str())
    }

    /// Keys injected into every outbound payload by configuration.
    pub fn initial_inject(&self) -> Map<String, Value> {
        let mut inject = Map::new();
        if self.log_level > 0 {
            inject.insert("loglevel".into(), Value::from(self.log_level));
            if let Some(to) = &self.log_to {
                inject.insert("logto".into(), Value::from(to.as_str()));
            }
        }
        inject
    }
}

impl Default for OrchestratorConfig {
    /// Default configuration:
    ///
    /// - `surface_url = ""` (must be set before `build()`)
    /// - `bus_capacity = 1024`
    /// - `log_level = 0` (off)
    /// - `log_to = None`
    fn default() -> Self {
        Self {
            surface_url: String::new(),
            bus_capacity: 1024,
            log_level: 0,
            log_to: None,
        }
    }
}
