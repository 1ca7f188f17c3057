//! # Slot configuration and merged options.
//!
//! [`SlotConfig`] is what callers hand in: named defaults through
//! `Orchestrator::config` and per-call overrides through `Orchestrator::queue`.
//! Every field is optional. [`SlotOptions`] is the merged, validated result that a
//! slot carries for its whole life.
//!
//! ## Precedence
//! ```text
//! built-in defaults  <  named config  <  queue overrides
//! ```
//! Merging is shallow (an override replaces the whole field), except for
//! [`SlotOptions::apply`] which extends `data` and `extra` key by key.
//!
//! ## Defaults
//! - `retries = 5`
//! - `timeout = 200ms` (advisory, handed to the surface)
//! - `min_size = 39`
//! - `hidden = false`

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::surface::ContainerRef;

use super::callback::Callback;

/// Default retry budget handed to the surface.
pub const DEFAULT_RETRIES: u32 = 5;
/// Default advisory timeout handed to the surface.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);
/// Default minimum size (pixels) below which the surface treats content as empty.
pub const DEFAULT_MIN_SIZE: u32 = 39;

/// Width or height: plain pixels or a CSS length (`"100%"`, `"250px"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(u32),
    Css(String),
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self {
        Dimension::Pixels(px)
    }
}

impl From<&str> for Dimension {
    fn from(css: &str) -> Self {
        Dimension::Css(css.to_string())
    }
}

/// Per-name defaults or per-queue overrides. Unset fields fall through.
#[derive(Debug, Clone, Default)]
pub struct SlotConfig {
    pub container: Option<ContainerRef>,
    pub url: Option<String>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub data: Option<Map<String, Value>>,
    pub hidden: Option<bool>,
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
    pub min_size: Option<u32>,
    /// Hook run on every successful resolution.
    pub done: Option<Callback>,
    /// Hook run on every failed resolution.
    pub fail: Option<Callback>,
    /// Keys without a dedicated field; kept and forwarded as-is.
    pub extra: Map<String, Value>,
}

impl SlotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, container: impl Into<ContainerRef>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_size(mut self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.width = Some(width.into());
        self.height = Some(height.into());
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn with_min_size(mut self, min_size: u32) -> Self {
        self.min_size = Some(min_size);
        self
    }

    pub fn with_done(mut self, hook: impl Into<Callback>) -> Self {
        self.done = Some(hook.into());
        self
    }

    pub fn with_fail(mut self, hook: impl Into<Callback>) -> Self {
        self.fail = Some(hook.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns `self` overridden by `overrides` (override wins per field).
    pub fn merged(&self, overrides: &SlotConfig) -> SlotConfig {
        let mut extra = self.extra.clone();
        extra.extend(overrides.extra.clone());

        SlotConfig {
            container: overrides.container.clone().or_else(|| self.container.clone()),
            url: overrides.url.clone().or_else(|| self.url.clone()),
            width: overrides.width.clone().or_else(|| self.width.clone()),
            height: overrides.height.clone().or_else(|| self.height.clone()),
            data: overrides.data.clone().or_else(|| self.data.clone()),
            hidden: overrides.hidden.or(self.hidden),
            timeout: overrides.timeout.or(self.timeout),
            retries: overrides.retries.or(self.retries),
            min_size: overrides.min_size.or(self.min_size),
            done: overrides.done.clone().or_else(|| self.done.clone()),
            fail: overrides.fail.clone().or_else(|| self.fail.clone()),
            extra,
        }
    }
}

/// Merged and validated options carried by a slot.
#[derive(Debug, Clone)]
pub struct SlotOptions {
    pub container: Option<ContainerRef>,
    pub url: Option<String>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub data: Map<String, Value>,
    pub hidden: bool,
    pub timeout: Duration,
    pub retries: u32,
    pub min_size: u32,
    pub done: Option<Callback>,
    pub fail: Option<Callback>,
    pub extra: Map<String, Value>,
}

impl Default for SlotOptions {
    fn default() -> Self {
        Self {
            container: None,
            url: None,
            width: None,
            height: None,
            data: Map::new(),
            hidden: false,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            min_size: DEFAULT_MIN_SIZE,
            done: None,
            fail: None,
            extra: Map::new(),
        }
    }
}

impl SlotOptions {
    /// Applies built-in defaults to a merged config and validates it once.
    pub fn resolve(config: SlotConfig) -> Result<Self, ConfigError> {
        let mut opts = SlotOptions::default();
        opts.apply(config)?;
        Ok(opts)
    }

    /// Overwrites every field set in `config`; `data` and `extra` are extended.
    pub fn apply(&mut self, config: SlotConfig) -> Result<(), ConfigError> {
        validate_dimension("width", config.width.as_ref())?;
        validate_dimension("height", config.height.as_ref())?;

        if let Some(container) = config.container {
            self.container = Some(container);
        }
        if let Some(url) = config.url {
            self.url = Some(url).filter(|u| !u.is_empty());
        }
        if let Some(width) = config.width {
            self.width = Some(width);
        }
        if let Some(height) = config.height {
            self.height = Some(height);
        }
        if let Some(data) = config.data {
            self.data.extend(data);
        }
        if let Some(hidden) = config.hidden {
            self.hidden = hidden;
        }
        if let Some(timeout) = config.timeout {
            self.timeout = timeout;
        }
        if let Some(retries) = config.retries {
            self.retries = retries;
        }
        if let Some(min_size) = config.min_size {
            self.min_size = min_size;
        }
        if let Some(done) = config.done {
            self.done = Some(done);
        }
        if let Some(fail) = config.fail {
            self.fail = Some(fail);
        }
        self.extra.extend(config.extra);
        Ok(())
    }
}

fn validate_dimension(option: &'static str, dim: Option<&Dimension>) -> Result<(), ConfigError> {
    match dim {
        Some(Dimension::Css(css)) if css.trim().is_empty() => Err(ConfigError::InvalidOption {
            option,
            reason: "empty css length".to_string(),
        }),
        _ => Ok(()),
    }
}
