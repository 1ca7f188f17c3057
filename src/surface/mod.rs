//! Collaborator boundary: sandboxed surfaces and the containers they attach to.
//!
//! Nothing in this module renders anything. It only describes what the
//! orchestrator needs from the embedding environment:
//! - [`SurfaceFactory`] / [`Surface`]: create, attach, feed and refresh surfaces;
//! - [`ContainerHost`]: resolve, check and allocate containers.

mod container;
#[allow(clippy::module_inception)]
mod surface;

pub use container::{ContainerHandle, ContainerHost, ContainerRef};
pub use surface::{RefreshCommand, SendError, Surface, SurfaceData, SurfaceFactory, SurfaceInit};
