//! # Path Identity
//!
//! Derives a logical package name and a short, deterministic fingerprint for
//! any absolute search path.
//!
//! A path is decomposed against an ordered list of root prefixes. When the
//! path lives under one of them, the first segment after the prefix is the
//! package name and everything after that segment is the remainder:
//!
//! ```
//! use confgen::identity::RootPrefixes;
//!
//! let roots = RootPrefixes::new(["/site/packages/int/"]);
//! let id = roots.decompose("/site/packages/int/foo/1.2.0/python");
//! assert_eq!(id.root_prefix, "/site/packages/int/");
//! assert_eq!(id.package_name, "foo");
//! assert_eq!(id.remainder, "/1.2.0/python");
//! ```
//!
//! Paths outside every root fall back to their basename. The fingerprint is
//! only used to keep mirror directories apart; it is not a security property.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Number of hex characters kept from the path digest.
pub const FINGERPRINT_LEN: usize = 6;

/// The result of splitting a search path against the configured roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathIdentity {
    /// The matching root prefix exactly as configured, or empty.
    pub root_prefix: String,
    /// First segment after the root, or the basename when no root matched.
    pub package_name: String,
    /// Everything after the package segment, including its leading `/`.
    pub remainder: String,
}

/// An ordered list of root prefixes. Earlier entries win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootPrefixes {
    prefixes: Vec<String>,
}

impl RootPrefixes {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.prefixes
    }

    /// Split `path` into `(root_prefix, package_name, remainder)`.
    pub fn decompose(&self, path: &str) -> PathIdentity {
        for prefix in &self.prefixes {
            if let Some((package_name, remainder)) = split_under(prefix, path) {
                return PathIdentity {
                    root_prefix: prefix.clone(),
                    package_name: package_name.to_string(),
                    remainder: remainder.to_string(),
                };
            }
        }

        PathIdentity {
            root_prefix: String::new(),
            package_name: basename(path),
            remainder: String::new(),
        }
    }

    /// Package name used for the mirror directory of `path`.
    pub fn package_name(&self, path: &str) -> String {
        self.decompose(path).package_name
    }
}

/// Match `path` against a single root and return `(package, remainder)`.
///
/// The root may be written with or without a trailing separator; the path
/// must continue with a separator and a non-empty segment after it.
fn split_under<'a>(prefix: &str, path: &'a str) -> Option<(&'a str, &'a str)> {
    let root = prefix.trim_end_matches('/');
    let rest = path.strip_prefix(root)?.strip_prefix('/')?;
    let rest = rest.strip_prefix('/').unwrap_or(rest);

    let (package, remainder) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    if package.is_empty() {
        return None;
    }
    Some((package, remainder))
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// First [`FINGERPRINT_LEN`] hex characters of the SHA-256 of `path`.
///
/// Distinct paths can collide in the truncated digest. That only merges two
/// mirror directories of the same package and is accepted.
pub fn fingerprint(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}
