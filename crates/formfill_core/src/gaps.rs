//! Gap detection: enumerate explicitly-null fields of a member.
//!
//! # Responsibility
//! - Walk a member mapping depth-first, in insertion order.
//! - Report the dotted path of every leaf whose value is `null`.
//! - Narrow results to caller-requested field prefixes.
//!
//! # Invariants
//! - Keys starting with `_` are metadata; they and their subtree are skipped.
//! - Only leaves are reported: a mapping is never a gap itself.
//! - Empty strings, zero, `false` and empty arrays are values, not gaps.

use crate::path::PATH_SEPARATOR;
use serde_json::{Map, Value};

/// Key prefix reserved for comments and metadata entries.
pub const METADATA_PREFIX: char = '_';

/// Returns the dotted paths of all null leaves in `member`.
pub fn scan_gaps(member: &Map<String, Value>) -> Vec<String> {
    let mut gaps = Vec::new();
    collect_gaps(member, None, &mut gaps);
    gaps
}

fn collect_gaps(map: &Map<String, Value>, prefix: Option<&str>, gaps: &mut Vec<String>) {
    for (key, value) in map {
        if key.starts_with(METADATA_PREFIX) {
            continue;
        }
        let full_key = match prefix {
            Some(prefix) => format!("{prefix}{PATH_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Null => gaps.push(full_key),
            Value::Object(nested) => collect_gaps(nested, Some(full_key.as_str()), gaps),
            Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {}
        }
    }
}

/// Prefix filter over gap paths.
///
/// A gap is retained when it equals a requested prefix or is nested under it
/// at a segment boundary, so `health` keeps `health.allergies` but not
/// `health_notes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapFilter {
    prefixes: Vec<String>,
}

impl GapFilter {
    /// Builds a filter from explicit prefixes. Blank entries are dropped.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(|prefix| prefix.as_ref().trim().to_string())
            .filter(|prefix| !prefix.is_empty())
            .collect();
        Self { prefixes }
    }

    /// Builds a filter from a comma separated list such as `first_name,health`.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Returns whether no prefixes were requested.
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Returns whether `gap` falls under one of the requested prefixes.
    pub fn matches(&self, gap: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            gap == prefix
                || gap
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR))
        })
    }

    /// Keeps only matching gaps, preserving their order.
    pub fn apply(&self, gaps: Vec<String>) -> Vec<String> {
        gaps.into_iter().filter(|gap| self.matches(gap)).collect()
    }
}
