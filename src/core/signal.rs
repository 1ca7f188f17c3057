//! # Environment signals.
//!
//! The host environment can tell the orchestrator about page-level events it
//! cannot observe itself.
//!
//! ## Signals
//! - [`EnvSignal::PageShow`] with `persisted = true`: the page was restored from
//!   a back/forward cache. Every surface may hold stale content, so the
//!   orchestrator replays a bulk refresh with the last used priority ordering.
//! - `persisted = false` is a regular first show and is ignored.

/// Page-level event forwarded by the host environment.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvSignal {
    /// The page became visible.
    PageShow {
        /// `true` when restored from cache rather than freshly loaded.
        persisted: bool,
    },
}

impl EnvSignal {
    /// Whether this signal asks for a bulk refresh.
    pub fn wants_refresh(&self) -> bool {
        matches!(self, EnvSignal::PageShow { persisted: true })
    }
}

/// Splits a comma separated priority list. Blank entries are skipped.
pub(crate) fn parse_priority(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_persisted_pageshow_refreshes() {
        assert!(EnvSignal::PageShow { persisted: true }.wants_refresh());
        assert!(!EnvSignal::PageShow { persisted: false }.wants_refresh());
    }

    #[test]
    fn test_parse_priority_trims_and_skips_blanks() {
        assert_eq!(parse_priority("top, side,,bottom "), vec!["top", "side", "bottom"]);
        assert!(parse_priority("").is_empty());
        assert!(parse_priority(" , ").is_empty());
    }
}
