//! # Repository Directory
//!
//! Maps logical package names to cloned repositories. The package name of a
//! repository comes from the `name = "..."` line of the manifest file at its
//! root; repositories without one are left out of the mapping.
//!
//! The mapping is built once per run and is read-only afterwards. When two
//! repositories declare the same name the later one wins.

use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::Result;

/// File at a repository root declaring its package name.
pub const MANIFEST_FILE: &str = "package.py";

/// A local working directory of a cloned repository.
#[derive(Debug)]
pub struct RepositoryHandle {
    root: PathBuf,
    package_name: OnceLock<Option<String>>,
}

impl RepositoryHandle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            package_name: OnceLock::new(),
        }
    }

    /// Root of the working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Package name declared in the manifest, read on first access.
    pub fn package_name(&self) -> Option<&str> {
        self.package_name
            .get_or_init(|| read_package_name(&self.root))
            .as_deref()
    }
}

impl Clone for RepositoryHandle {
    fn clone(&self) -> Self {
        let package_name = OnceLock::new();
        if let Some(name) = self.package_name.get() {
            let _ = package_name.set(name.clone());
        }
        Self {
            root: self.root.clone(),
            package_name,
        }
    }
}

impl PartialEq for RepositoryHandle {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

/// Read the package name from the manifest under `repo_root`.
///
/// Returns `None` when the manifest is missing, unreadable or has no
/// `name = ...` line. The first matching line wins.
pub fn read_package_name(repo_root: &Path) -> Option<String> {
    let content = fs::read_to_string(repo_root.join(MANIFEST_FILE)).ok()?;
    parse_package_name(&content)
}

/// Extract the package name from manifest text.
///
/// An empty name on the first `name = ...` line counts as no name.
pub fn parse_package_name(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(parse_name_line)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// `name = "value"` or `name = 'value'` at the very start of a line.
fn parse_name_line(line: &str) -> Option<&str> {
    let value = line
        .strip_prefix("name")?
        .trim_start()
        .strip_prefix('=')?
        .trim();
    let inner = value
        .strip_prefix(['"', '\''])?
        .strip_suffix(['"', '\''])?;
    Some(inner)
}

/// Package name to repository, built once from a set of handles.
#[derive(Debug, Clone, Default)]
pub struct PackageRepoMap {
    entries: HashMap<String, RepositoryHandle>,
}

impl PackageRepoMap {
    /// Build the mapping in input order; later handles overwrite earlier ones
    /// declaring the same package.
    pub fn build(handles: Vec<RepositoryHandle>) -> Self {
        let mut entries = HashMap::new();
        for handle in handles {
            let Some(name) = handle.package_name().map(str::to_string) else {
                debug!("No package name in {}, skipping", handle.root().display());
                continue;
            };
            if let Some(previous) = entries.insert(name.clone(), handle) {
                debug!(
                    "Package {} declared again, replacing {}",
                    name,
                    previous.root().display()
                );
            }
        }
        Self { entries }
    }

    pub fn get(&self, package_name: &str) -> Option<&RepositoryHandle> {
        self.entries.get(package_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by package name.
    pub fn sorted(&self) -> Vec<(&str, &RepositoryHandle)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, handle)| (name.as_str(), handle))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Supplies the repositories the package mapping is built from.
pub trait RepositorySource {
    fn repositories(&self) -> Result<Vec<RepositoryHandle>>;
}

/// A fixed set of already-known repositories.
impl RepositorySource for Vec<RepositoryHandle> {
    fn repositories(&self) -> Result<Vec<RepositoryHandle>> {
        Ok(self.clone())
    }
}

/// Find existing clones under `clone_dir/<organization>`.
///
/// Every subdirectory holding a `.git` entry counts, in name order. A
/// missing organization directory yields an empty list.
pub fn discover_clones(clone_dir: &Path, organization: &str) -> Result<Vec<RepositoryHandle>> {
    let org_dir = clone_dir.join(organization);
    if !org_dir.is_dir() {
        info!("{} does not exist", org_dir.display());
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for entry in fs::read_dir(&org_dir)? {
        let path = entry?.path();
        if path.is_dir() && path.join(".git").exists() {
            dirs.push(path);
        }
    }
    dirs.sort();

    Ok(dirs.into_iter().map(RepositoryHandle::new).collect())
}
