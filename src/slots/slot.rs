//! # Slot: one queued or rendered content placement.
//!
//! A [`Slot`] is owned by the manager task and mutated only there. Callers see
//! [`SlotSnapshot`]s, cloned at the moment of a query or a resolution.
//!
//! ## Rules
//! - `id` = `name` + `-` + a process-wide counter; never reused, even after destruction.
//! - `state` changes only through [`Slot::set_state`], which enforces the transition table.
//! - `rendered.times` grows only in [`Slot::mark_resolved`].
//! - The slot owns at most one surface; swapping always detaches the previous one.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, LazyLock};
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::surface::Surface;

use super::callback::Callback;
use super::options::{Dimension, SlotOptions};
use super::state::SlotState;

/// Global counter for slot ids.
static SLOT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Placeholder replaced in slot urls by a fresh unique value on every payload read.
static UNIQUE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(GARDR|PASTIES)_UNIQUE_ID").expect("unique token pattern is valid")
});

/// Unique slot identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SlotId(Arc<str>);

impl SlotId {
    /// Allocates the next id for `name`.
    pub(crate) fn next(name: &str) -> Self {
        let n = SLOT_SEQ.fetch_add(1, AtomicOrdering::Relaxed) + 1;
        Self(format!("{name}-{n}").into())
    }

    /// Wraps an id received from the outside (e.g. a surface report).
    pub fn from_raw(raw: impl Into<Arc<str>>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metrics reported by the surface, accumulated across renders and refreshes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rendered {
    /// Number of successful resolutions.
    pub times: u32,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Any other keys the surface reported.
    pub extra: Map<String, Value>,
}

/// Data describing the slot to its surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub id: SlotId,
    pub name: String,
    pub min_size: u32,
    /// Advisory timeout in milliseconds.
    pub timeout: u64,
    pub url: Option<String>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub data: Map<String, Value>,
}

/// Read-only view of a slot.
#[derive(Debug, Clone)]
pub struct SlotSnapshot {
    pub id: SlotId,
    pub name: String,
    pub state: SlotState,
    pub last_state: Option<SlotState>,
    pub options: SlotOptions,
    pub rendered: Rendered,
    /// `true` while the slot owns a live surface.
    pub has_surface: bool,
    /// Callbacks still waiting for resolution.
    pub pending: usize,
}

impl SlotSnapshot {
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.state.is_resolved()
    }
}

pub(crate) struct Slot {
    id: SlotId,
    name: String,
    state: SlotState,
    last_state: Option<SlotState>,
    pub(crate) options: SlotOptions,
    pub(crate) rendered: Rendered,
    callbacks: VecDeque<Callback>,
    surface: Option<Box<dyn Surface>>,
}

impl Slot {
    pub(crate) fn create(id: SlotId, name: &str, options: SlotOptions) -> Self {
        Self {
            id,
            name: name.to_string(),
            state: SlotState::Created,
            last_state: None,
            options,
            rendered: Rendered::default(),
            callbacks: VecDeque::new(),
            surface: None,
        }
    }

    pub(crate) fn id(&self) -> &SlotId {
        &self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn state(&self) -> SlotState {
        self.state
    }

    /// Moves to `next` if the transition table allows it. Returns `false` otherwise.
    pub(crate) fn set_state(&mut self, next: SlotState) -> bool {
        if !self.state.can_transition(next) {
            tracing::warn!(slot = %self.id, from = ?self.state, to = ?next, "invalid slot transition");
            return false;
        }
        self.last_state = Some(self.state);
        self.state = next;
        true
    }

    /// Counts a successful resolution and moves to `Resolved`.
    pub(crate) fn mark_resolved(&mut self) -> bool {
        if !self.set_state(SlotState::Resolved) {
            return false;
        }
        self.rendered.times += 1;
        true
    }

    /// Merges a surface report into `rendered`, keeping `times`.
    pub(crate) fn merge_metrics(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
        extra: &Map<String, Value>,
    ) {
        if width.is_some() {
            self.rendered.width = width;
        }
        if height.is_some() {
            self.rendered.height = height;
        }
        self.rendered.extra.extend(extra.clone());
    }

    pub(crate) fn push_callback(&mut self, cb: Callback) {
        self.callbacks.push_back(cb);
    }

    pub(crate) fn take_callbacks(&mut self) -> VecDeque<Callback> {
        std::mem::take(&mut self.callbacks)
    }

    pub(crate) fn surface_mut(&mut self) -> Option<&mut (dyn Surface + 'static)> {
        self.surface.as_deref_mut()
    }

    pub(crate) fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Installs a new surface, detaching the previous one if any.
    pub(crate) fn replace_surface(&mut self, surface: Box<dyn Surface>) {
        self.drop_surface();
        self.surface = Some(surface);
    }

    /// Detaches and drops the current surface.
    pub(crate) fn drop_surface(&mut self) {
        if let Some(mut old) = self.surface.take() {
            old.detach();
        }
    }

    /// Builds the payload; the url placeholder gets a fresh value on every call.
    pub(crate) fn payload(&self) -> Payload {
        Payload {
            id: self.id.clone(),
            name: self.name.clone(),
            min_size: self.options.min_size,
            timeout: self.options.timeout.as_millis().min(u128::from(u64::MAX)) as u64,
            url: self.options.url.as_deref().map(|u| self.unique_url(u)),
            width: self.options.width.clone(),
            height: self.options.height.clone(),
            data: self.options.data.clone(),
        }
    }

    fn unique_url(&self, url: &str) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let token = format!("{millis}{}", self.id);
        replace_unique_tokens(url, &token)
    }

    pub(crate) fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            state: self.state,
            last_state: self.last_state,
            options: self.options.clone(),
            rendered: self.rendered.clone(),
            has_surface: self.surface.is_some(),
            pending: self.callbacks.len(),
        }
    }
}

/// Replaces placeholders one at a time, re-scanning after every substitution so
/// a placeholder formed by a previous replacement is caught too.
fn replace_unique_tokens(url: &str, token: &str) -> String {
    let mut out = url.to_string();
    // Bounded so a token that itself matches cannot loop forever.
    let mut budget = url.len();
    while budget > 0 {
        let Some(m) = UNIQUE_TOKEN.find(&out) else { break };
        out.replace_range(m.range(), token);
        budget -= 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::SlotConfig;

    fn slot(name: &str, url: &str) -> Slot {
        let opts = SlotOptions::resolve(SlotConfig::new().with_url(url)).expect("valid");
        Slot::create(SlotId::next(name), name, opts)
    }

    #[test]
    fn test_ids_are_unique_for_same_name() {
        let a = slot("top", "a.js");
        let b = slot("top", "a.js");
        assert_ne!(a.id(), b.id());
        assert!(a.id().as_str().starts_with("top-"));
    }

    #[test]
    fn test_set_state_records_last_state() {
        let mut s = slot("top", "a.js");
        assert!(s.set_state(SlotState::Active));
        assert_eq!(s.state(), SlotState::Active);
        assert_eq!(s.snapshot().last_state, Some(SlotState::Created));
    }

    #[test]
    fn test_invalid_transition_is_ignored() {
        let mut s = slot("top", "a.js");
        assert!(!s.set_state(SlotState::Resolved));
        assert_eq!(s.state(), SlotState::Created);
        assert_eq!(s.rendered.times, 0);
    }

    #[test]
    fn test_times_grow_only_on_resolution() {
        let mut s = slot("top", "a.js");
        s.set_state(SlotState::Active);
        assert!(s.mark_resolved());
        assert_eq!(s.rendered.times, 1);
        assert!(!s.mark_resolved());
        assert_eq!(s.rendered.times, 1);
        s.set_state(SlotState::Failed);
        assert_eq!(s.rendered.times, 1);
    }

    #[test]
    fn test_merge_metrics_keeps_times() {
        let mut s = slot("top", "a.js");
        s.set_state(SlotState::Active);
        s.mark_resolved();
        let mut extra = Map::new();
        extra.insert("times".into(), Value::from(99));
        extra.insert("origin".into(), Value::from("surface"));
        s.merge_metrics(Some(310), Some(225), &extra);
        assert_eq!(s.rendered.times, 1);
        assert_eq!(s.rendered.width, Some(310));
        assert_eq!(s.rendered.extra.get("origin"), Some(&Value::from("surface")));
    }

    #[test]
    fn test_payload_replaces_every_placeholder() {
        let s = slot("top", "ad.js?a=GARDR_UNIQUE_ID&b=PASTIES_UNIQUE_ID");
        let url = s.payload().url.expect("url set");
        assert!(!UNIQUE_TOKEN.is_match(&url), "left a placeholder in {url}");
        assert!(url.contains(s.id().as_str()));
    }

    #[test]
    fn test_payload_keeps_unrelated_uppercase_tokens() {
        let s = slot("top", "ad.js?key=MY_UNIQUE_ID&x=GARDR_UNIQUE_ID");
        let url = s.payload().url.expect("url set");
        assert!(url.contains("key=MY_UNIQUE_ID&"), "rewrote a foreign token in {url}");
        assert!(!url.contains("GARDR_UNIQUE_ID"));
    }

    #[test]
    fn test_replace_rescans_after_substitution() {
        // The first substitution forms "GARDR_UNIQUE_ID", which a single pass would miss.
        let out = replace_unique_tokens("GARDR_UNIQUE_ID_UNIQUE_ID", "GARDR");
        assert_eq!(out, "GARDR");
    }

    #[test]
    fn test_payload_carries_options() {
        let opts = SlotOptions::resolve(
            SlotConfig::new().with_url("a.js").with_size(310u32, 225u32),
        )
        .expect("valid");
        let s = Slot::create(SlotId::next("side"), "side", opts);
        let p = s.payload();
        assert_eq!(p.name, "side");
        assert_eq!(p.min_size, 39);
        assert_eq!(p.timeout, 200);
        assert_eq!(p.width, Some(Dimension::Pixels(310)));
        let json = serde_json::to_value(&p).expect("serializable");
        assert_eq!(json["minSize"], Value::from(39));
    }
}
