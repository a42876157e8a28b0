//! Match evaluation
//!
//! Decides whether a single line satisfies a [`Query`]. Comparison is
//! case-insensitive throughout.

use crate::query::builder::{Logic, MatchKind, Query};

/// A query with its keywords lower-cased once, for scanning many lines.
#[derive(Debug, Clone)]
pub struct LineMatcher {
    needles: Vec<(String, MatchKind)>,
    logic: Logic,
}

impl LineMatcher {
    pub fn new(query: &Query) -> Self {
        Self {
            needles: query
                .keywords()
                .iter()
                .map(|k| (k.value.to_lowercase(), k.kind))
                .collect(),
            logic: query.logic(),
        }
    }

    pub fn is_match(&self, line: &str) -> bool {
        if self.needles.is_empty() {
            return false;
        }

        let line = line.to_lowercase();
        let mut hits = self
            .needles
            .iter()
            .map(|(needle, kind)| keyword_matches(&line, needle, *kind));

        match self.logic {
            Logic::And => hits.all(|hit| hit),
            Logic::Or => hits.any(|hit| hit),
        }
    }
}

/// Both arguments must already be lower-cased
fn keyword_matches(line: &str, needle: &str, kind: MatchKind) -> bool {
    match kind {
        MatchKind::Exact | MatchKind::Literal => line.contains(needle),
        MatchKind::Word => line.split_whitespace().any(|word| word == needle),
    }
}

/// Evaluate one line against a query
pub fn matches(line: &str, query: &Query) -> bool {
    LineMatcher::new(query).is_match(line)
}
