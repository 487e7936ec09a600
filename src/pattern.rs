//! Search-path collection and glob-style path filters

use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use std::env;

/// `*` and `?` match across `/`, so `/opt/*` covers everything below `/opt`.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A compiled list of glob patterns matched against whole path strings.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile every pattern, failing on the first invalid one.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p.as_ref()).map_err(Error::Glob))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// True when any pattern matches `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(path, MATCH_OPTIONS))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Match a path against a single glob pattern
pub fn glob_match(pattern: &str, path: &str) -> Result<bool> {
    let pattern = Pattern::new(pattern).map_err(Error::Glob)?;
    Ok(pattern.matches_with(path, MATCH_OPTIONS))
}

/// Read each variable, split it on the platform path-list separator and
/// concatenate the entries in order. Unset variables and empty entries are
/// skipped; duplicates are kept.
pub fn collect_search_paths<S: AsRef<str>>(vars: &[S]) -> Vec<String> {
    let mut paths = Vec::new();
    for var in vars {
        let Some(value) = env::var_os(var.as_ref()) else {
            continue;
        };
        paths.extend(
            env::split_paths(&value)
                .map(|p| p.to_string_lossy().into_owned())
                .filter(|p| !p.is_empty()),
        );
    }
    paths
}
