//! Error types used by the slotvisor runtime and by individual slots.
//!
//! This module defines three main error enums:
//!
//! - [`ConfigError`]: misconfiguration detected synchronously (construction, `queue`).
//! - [`RuntimeError`]: failures of the orchestrator handle itself.
//! - [`SlotError`]: per-slot outcomes delivered through callbacks, never returned.
//!
//! All of them provide `as_label` for logs; [`SlotError`] also offers
//! [`SlotError::is_retryable`].

use std::sync::Arc;

use thiserror::Error;

use crate::slots::{SlotId, SlotState};

/// # Misconfiguration detected before any slot work starts.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `queue` was called with an empty name.
    #[error("can't queue without a name")]
    MissingName,

    /// A required construction option is missing.
    #[error("missing option for {option}")]
    MissingOption {
        /// Name of the missing option.
        option: &'static str,
    },

    /// An option was present but rejected when merging.
    #[error("invalid option {option}: {reason}")]
    InvalidOption {
        /// Name of the rejected option.
        option: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingName => "config_missing_name",
            ConfigError::MissingOption { .. } => "config_missing_option",
            ConfigError::InvalidOption { .. } => "config_invalid_option",
        }
    }
}

/// # Errors produced by the orchestrator handle.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Synchronous misconfiguration (the caller's responsibility).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The manager task has stopped; no more commands are accepted.
    #[error("orchestrator is closed")]
    Closed,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use slotvisor::{ConfigError, RuntimeError};
    ///
    /// let err = RuntimeError::from(ConfigError::MissingName);
    /// assert_eq!(err.as_label(), "config_missing_name");
    /// assert_eq!(RuntimeError::Closed.as_label(), "runtime_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Config(e) => e.as_label(),
            RuntimeError::Closed => "runtime_closed",
        }
    }
}

/// # Per-slot failure, delivered as `Outcome::error`.
///
/// Every variant resolves the slot's callbacks; none of them is thrown.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// Required configuration (container or url) was missing at render time.
    ///
    /// The slot is left `Incomplete` and is not retried automatically.
    #[error("{slot} missing queued config: {missing}")]
    Incomplete {
        /// Slot that failed.
        slot: SlotId,
        /// Which field was missing.
        missing: &'static str,
    },

    /// The backing container is gone; the slot was destroyed and purged.
    #[error("{slot}: container missing from document")]
    ContainerMissing {
        /// Slot that was destroyed.
        slot: SlotId,
    },

    /// Refresh was requested on a slot that can no longer be used.
    #[error("{slot} is not usable (state {state:?})")]
    NotUsable {
        /// Slot that was left untouched.
        slot: SlotId,
        /// State at the time of the request.
        state: SlotState,
    },

    /// Explicit failure, reported by the surface or signalled by the caller.
    #[error("{slot} failed: {reason}")]
    Failed {
        /// Slot that failed.
        slot: SlotId,
        /// Human-readable reason.
        reason: Arc<str>,
    },

    /// The surface reported that its content timed out.
    #[error("{slot} timed out")]
    TimedOut {
        /// Slot that timed out.
        slot: SlotId,
    },

    /// The surface rejected its content.
    #[error("{slot} rejected: {reason}")]
    Rejected {
        /// Slot that was rejected.
        slot: SlotId,
        /// Human-readable reason.
        reason: Arc<str>,
    },
}

impl SlotError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SlotError::Incomplete { .. } => "slot_incomplete",
            SlotError::ContainerMissing { .. } => "slot_container_missing",
            SlotError::NotUsable { .. } => "slot_not_usable",
            SlotError::Failed { .. } => "slot_failed",
            SlotError::TimedOut { .. } => "slot_timed_out",
            SlotError::Rejected { .. } => "slot_rejected",
        }
    }

    /// Returns the id of the slot this error belongs to.
    pub fn slot(&self) -> &SlotId {
        match self {
            SlotError::Incomplete { slot, .. }
            | SlotError::ContainerMissing { slot }
            | SlotError::NotUsable { slot, .. }
            | SlotError::Failed { slot, .. }
            | SlotError::TimedOut { slot }
            | SlotError::Rejected { slot, .. } => slot,
        }
    }

    /// Indicates whether rendering the slot again may succeed.
    ///
    /// Returns `true` for [`SlotError::Failed`] and [`SlotError::TimedOut`].
    /// A destroyed, incomplete, rejected or unusable slot needs caller action first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SlotError::Failed { .. } | SlotError::TimedOut { .. })
    }
}
