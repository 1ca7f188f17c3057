//! Slots: data model and state machine.
//!
//! - [`SlotState`]: banded lifecycle states and the transition table;
//! - [`SlotConfig`] / [`SlotOptions`]: caller configuration and merged options;
//! - [`Callback`] / [`Outcome`]: completion delivery;
//! - [`SlotId`], [`SlotSnapshot`], [`Rendered`], [`Payload`]: identity and views.

mod callback;
mod options;
mod slot;
mod state;

pub use callback::{Callback, Outcome};
pub use options::{
    DEFAULT_MIN_SIZE, DEFAULT_RETRIES, DEFAULT_TIMEOUT, Dimension, SlotConfig, SlotOptions,
};
pub use slot::{Payload, Rendered, SlotId, SlotSnapshot};
pub use state::SlotState;

pub(crate) use slot::Slot;
