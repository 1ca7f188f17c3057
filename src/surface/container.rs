//! # Containers: where a surface is attached.
//!
//! A slot refers to its container either by a concrete [`ContainerHandle`] or by
//! a name that the [`ContainerHost`] resolves at render time. The host is the
//! only authority on whether a container is still part of the page.

use std::fmt;
use std::sync::Arc;

/// Opaque handle to a container owned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerHandle(Arc<str>);

impl ContainerHandle {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// Host-specific key for this container.
    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Container reference as given in slot configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerRef {
    /// Already resolved container.
    Handle(ContainerHandle),
    /// Name to look up through [`ContainerHost::lookup`] at render time.
    Named(String),
}

impl From<ContainerHandle> for ContainerRef {
    fn from(h: ContainerHandle) -> Self {
        ContainerRef::Handle(h)
    }
}

impl From<&str> for ContainerRef {
    fn from(name: &str) -> Self {
        ContainerRef::Named(name.to_string())
    }
}

impl From<String> for ContainerRef {
    fn from(name: String) -> Self {
        ContainerRef::Named(name)
    }
}

/// The page (or equivalent) that owns containers.
///
/// Implementations must be cheap and non-blocking: every method is called from
/// the manager task while it processes a command.
pub trait ContainerHost: Send + Sync + 'static {
    /// Resolves a named container. `None` if no such container exists.
    fn lookup(&self, name: &str) -> Option<ContainerHandle>;

    /// Returns `true` while the container is attached to the page.
    fn contains(&self, container: &ContainerHandle) -> bool;

    /// Allocates a fresh generic container (used when a slot is queued without one).
    fn allocate(&self) -> ContainerHandle;
}
