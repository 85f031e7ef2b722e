//! Blocklist snapshot and host matching
//!
//! The snapshot is a read-only copy of the store's patterns. It keeps the
//! store's order for iteration and a hash set for membership checks.

use std::collections::HashSet;

use crate::hierarchy::ancestors;
use crate::types::MatchResult;

// =============================================================================
// Blocklist
// =============================================================================

/// Cached copy of the user's blocklist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocklist {
    patterns: Vec<String>,
    index: HashSet<String>,
}

impl Blocklist {
    /// Create an empty blocklist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from store patterns. Duplicates and empty entries
    /// are dropped; the first occurrence keeps its position.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut blocklist = Self::new();
        for pattern in patterns {
            blocklist.insert(pattern.as_ref());
        }
        blocklist
    }

    /// Canonical form of a pattern: trimmed, lowercased, no trailing dot.
    pub fn normalize_pattern(pattern: &str) -> Option<String> {
        let pattern = pattern.trim().trim_end_matches('.');
        if pattern.is_empty() {
            return None;
        }
        Some(pattern.to_ascii_lowercase())
    }

    /// Add a pattern. Returns false if it was empty or already present.
    pub fn insert(&mut self, pattern: &str) -> bool {
        let Some(pattern) = Self::normalize_pattern(pattern) else {
            return false;
        };
        if !self.index.insert(pattern.clone()) {
            return false;
        }
        self.patterns.push(pattern);
        true
    }

    /// Remove a pattern. Returns false if it was not present.
    pub fn remove(&mut self, pattern: &str) -> bool {
        let Some(pattern) = Self::normalize_pattern(pattern) else {
            return false;
        };
        if !self.index.remove(&pattern) {
            return false;
        }
        self.patterns.retain(|p| *p != pattern);
        true
    }

    #[inline]
    pub fn contains(&self, pattern: &str) -> bool {
        self.index.contains(pattern)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns in store order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    /// Match a host against the blocklist.
    ///
    /// Ancestors are checked broadest first, so when several of them are
    /// listed the broadest one is reported. That pattern is what an unblock
    /// control offers to remove.
    pub fn match_host(&self, host: &str) -> MatchResult {
        if self.is_empty() {
            return MatchResult::NoMatch;
        }

        ancestors(host)
            .find(|candidate| self.contains(candidate))
            .map_or(MatchResult::NoMatch, |pattern| {
                MatchResult::Matched(pattern.to_string())
            })
    }
}

impl<S: AsRef<str>> FromIterator<S> for Blocklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_patterns(iter)
    }
}
