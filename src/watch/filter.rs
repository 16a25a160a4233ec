// src/watch/filter.rs

use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::Result;

/// Compiled `--ignore` globs.
///
/// Patterns are matched against entry names relative to the watch root
/// (e.g. `"target/debug/app"`). An entry is ignored when it, or any of its
/// parent directories, matches a pattern, so `.git` also covers
/// `.git/index`.
#[derive(Clone, Default)]
pub struct IgnoreFilter {
    patterns: Vec<String>,
    set: Option<GlobSet>,
}

impl fmt::Debug for IgnoreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreFilter")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl IgnoreFilter {
    /// Compile the given glob patterns. An empty list ignores nothing.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern.as_ref())?);
        }

        Ok(Self {
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
            set: Some(builder.build()?),
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether a change to `entry` should be dropped.
    ///
    /// Changes without an entry name are never ignored.
    pub fn is_ignored(&self, entry: Option<&str>) -> bool {
        let (Some(set), Some(entry)) = (&self.set, entry) else {
            return false;
        };

        if set.is_match(entry) {
            return true;
        }

        // Walk parent prefixes: "a/b/c" -> "a", "a/b".
        entry
            .match_indices('/')
            .any(|(idx, _)| set.is_match(&entry[..idx]))
    }
}
