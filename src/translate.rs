//! # Path Translator
//!
//! Decides, for each search path, whether it is dropped, kept verbatim, or
//! rewritten into a directory inside a cloned repository. Rules are applied
//! in order and the first match wins:
//!
//! 1.  Matches an ignore pattern: dropped.
//! 2.  Matches a no-translate pattern: kept verbatim in `copied`.
//! 3.  Does not exist on disk: dropped.
//! 4.  Otherwise the path is split into package name and remainder and the
//!     package is looked up in the [`PackageRepoMap`]:
//!     - no repository: kept verbatim in `copied`;
//!     - a repository: the remainder is searched for inside its working
//!       tree (see [`PathTranslator::locate`]); a hit goes to `translated`,
//!       a miss to `copied`.
//!
//! The package mapping is only built when the first path reaches rule 4,
//! and only once.

use log::{debug, info};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use crate::directory::{PackageRepoMap, RepositoryHandle, RepositorySource};
use crate::error::Result;
use crate::identity::RootPrefixes;
use crate::pattern::PatternSet;

/// Result of translating a list of search paths, both in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    /// Paths rewritten into a clone.
    pub translated: Vec<String>,
    /// Original paths kept as they were.
    pub copied: Vec<String>,
}

/// Rewrites search paths against a set of cloned repositories.
pub struct PathTranslator<'a> {
    roots: RootPrefixes,
    ignore: PatternSet,
    no_translate: PatternSet,
    clone_root: PathBuf,
    source: &'a dyn RepositorySource,
    mapping: OnceCell<PackageRepoMap>,
}

impl<'a> PathTranslator<'a> {
    /// `clone_root` is the directory translated paths are expressed under,
    /// as given (relative roots stay relative).
    pub fn new(
        roots: RootPrefixes,
        ignore: PatternSet,
        no_translate: PatternSet,
        clone_root: impl Into<PathBuf>,
        source: &'a dyn RepositorySource,
    ) -> Self {
        Self {
            roots,
            ignore,
            no_translate,
            clone_root: clone_root.into(),
            source,
            mapping: OnceCell::new(),
        }
    }

    /// Apply the translation rules to every path.
    ///
    /// Fails only when the package mapping cannot be built.
    pub fn translate<S: AsRef<str>>(&self, paths: &[S]) -> Result<Translation> {
        let mut result = Translation::default();

        for path in paths {
            let path = path.as_ref();

            if self.ignore.matches(path) {
                debug!("ignoring {}", path);
                continue;
            }
            if self.no_translate.matches(path) {
                result.copied.push(path.to_string());
                continue;
            }
            if !Path::new(path).exists() {
                debug!("{} does not exist, skipping", path);
                continue;
            }

            let identity = self.roots.decompose(path);
            let Some(repo) = self.mapping()?.get(&identity.package_name) else {
                result.copied.push(path.to_string());
                continue;
            };

            match self.locate(repo, &identity.remainder) {
                Some(found) => {
                    let found = found.to_string_lossy().into_owned();
                    info!("translating {} to: {}", identity.package_name, found);
                    result.translated.push(found);
                }
                None => result.copied.push(path.to_string()),
            }
        }

        Ok(result)
    }

    fn mapping(&self) -> Result<&PackageRepoMap> {
        if let Some(mapping) = self.mapping.get() {
            return Ok(mapping);
        }
        let mapping = PackageRepoMap::build(self.source.repositories()?);
        info!("{} packages mapped to clones", mapping.len());
        Ok(self.mapping.get_or_init(|| mapping))
    }

    /// Find the directory inside `repo` that `remainder` corresponds to.
    ///
    /// Candidates are the remainder with leading segments stripped one at a
    /// time (`a/b/c`, `b/c`, `c`), so version or variant directories in
    /// front of the repository layout are skipped. When none of those
    /// exists, the longest existing leading part (`a/b`, `a`) is used. An
    /// empty remainder never matches.
    pub fn locate(&self, repo: &RepositoryHandle, remainder: &str) -> Option<PathBuf> {
        let workdir = self.workdir(repo);
        let segments: Vec<&str> = remainder.split('/').filter(|s| !s.is_empty()).collect();

        let suffixes = (0..segments.len()).map(|start| &segments[start..]);
        let prefixes = (1..segments.len()).rev().map(|end| &segments[..end]);

        suffixes
            .chain(prefixes)
            .map(|candidate| workdir.join(candidate.join("/")))
            .find(|candidate| candidate.is_dir())
    }

    /// The repository's working tree expressed under the clone root.
    ///
    /// A working tree outside the clone root is used as is.
    fn workdir(&self, repo: &RepositoryHandle) -> PathBuf {
        let absolute_root =
            std::path::absolute(&self.clone_root).unwrap_or_else(|_| self.clone_root.clone());
        let absolute_repo =
            std::path::absolute(repo.root()).unwrap_or_else(|_| repo.root().to_path_buf());

        match absolute_repo.strip_prefix(&absolute_root) {
            Ok(relative) => self.clone_root.join(relative),
            Err(_) => repo.root().to_path_buf(),
        }
    }
}
