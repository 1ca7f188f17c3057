//! # Slot state machine.
//!
//! States are grouped into ordered bands; the discriminant encodes the band so a
//! numeric comparison answers coarse questions ("has this slot started?").
//!
//! ```text
//!   Created (0)
//!     < Removed, NeedsRefresh, Destroyed            housekeeping  (1..=3)
//!     < Active, Reactivated, Refreshing             active        (10..=12)
//!     < Failed, TimedOut, Rejected, Incomplete      failure       (20..=23)
//!     < Resolved                                    success       (30)
//! ```
//!
//! ## Transitions
//! ```text
//! Created ───────────render──────────► Active ──rendered──► Resolved
//! Removed / NeedsRefresh / failure ──render──► Reactivated ──rendered──► Resolved
//! active / Resolved ──refresh_all──► NeedsRefresh ──refresh──► Refreshing ──rendered──► Resolved
//! active / Resolved ──refresh──► Refreshing
//! Refreshing / NeedsRefresh ──send failed──► Removed ──render──► Reactivated
//! any (except Destroyed) ──container gone──► Destroyed   (terminal)
//! not yet started / failure ──missing url──► Incomplete
//! active / Resolved ──failure report──► Failed | TimedOut | Rejected
//! ```

use serde::Serialize;

/// Lifecycle state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SlotState {
    /// Queued, never rendered.
    Created = 0,

    /// Surface detached after an unreachable refresh; waiting for re-render.
    Removed = 1,
    /// Marked by a bulk refresh; the next refresh pass picks it up.
    NeedsRefresh = 2,
    /// Container vanished; the slot is purged. Terminal.
    Destroyed = 3,

    /// Surface attached, first render in flight.
    Active = 10,
    /// Surface re-created after removal or failure, render in flight.
    Reactivated = 11,
    /// Refresh command delivered, waiting for the surface to report.
    Refreshing = 12,

    /// Explicit failure.
    Failed = 20,
    /// Surface reported a timeout.
    TimedOut = 21,
    /// Surface rejected its content.
    Rejected = 22,
    /// Required configuration missing at render time.
    Incomplete = 23,

    /// Render or refresh satisfied.
    Resolved = 30,
}

impl SlotState {
    /// Numeric band value.
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// `Active`, `Reactivated` or `Refreshing`: a surface owes us a report.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active | Self::Reactivated | Self::Refreshing)
    }

    #[inline]
    pub fn is_resolved(self) -> bool {
        self >= Self::Resolved
    }

    /// Anything except `Rejected` and `Incomplete`.
    #[inline]
    pub fn is_usable(self) -> bool {
        !matches!(self, Self::Rejected | Self::Incomplete)
    }

    #[inline]
    pub fn needs_refresh(self) -> bool {
        self == Self::NeedsRefresh
    }

    /// Failure band (`Failed`, `TimedOut`, `Rejected`, `Incomplete`).
    #[inline]
    pub fn has_failed(self) -> bool {
        self >= Self::Failed && self < Self::Resolved
    }

    /// Below the active band: never rendered, or waiting in housekeeping.
    #[inline]
    pub fn is_untouched(self) -> bool {
        self < Self::Active
    }

    /// Returns `true` if `self → next` is part of the transition table.
    pub fn can_transition(self, next: SlotState) -> bool {
        use SlotState::*;

        if self == Destroyed {
            return false;
        }
        match next {
            Created => false,
            Destroyed => true,
            Active => self == Created,
            Reactivated => matches!(self, Removed | NeedsRefresh) || self.has_failed(),
            Removed => matches!(self, NeedsRefresh | Refreshing | Active | Reactivated | Resolved),
            NeedsRefresh => self.is_active() || self == Resolved,
            Refreshing => matches!(self, NeedsRefresh | Active | Reactivated | Resolved),
            Resolved => self.is_active(),
            Incomplete => self < Active || self.has_failed(),
            Failed | TimedOut | Rejected => self.is_active() || self == Resolved,
        }
    }
}
