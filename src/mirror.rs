//! # Local Mirror Store
//!
//! Produces a local copy (or symlink) of each search path inside a
//! content-addressed tree:
//!
//! ```text
//! <target_root>/<package name>/<fingerprint>
//! ```
//!
//! The same source path always lands in the same location. A location that
//! already exists is reused as-is, without checking whether it is stale.
//!
//! Every source path gets a [`MirrorOutcome`]. A failed copy is recorded and
//! logged but never aborts the rest of the batch, and a failed path is not
//! part of [`MirrorReport::translated`].

use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::identity::{fingerprint, RootPrefixes};
use crate::pattern::PatternSet;

/// What happened to a single source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// A new mirror was created at `target`.
    Mirrored { source: String, target: PathBuf },
    /// `target` already existed and was reused.
    Reused { source: String, target: PathBuf },
    /// The source matched an exclude pattern.
    Excluded { source: String },
    /// The source does not exist on disk.
    Missing { source: String },
    /// Populating `target` failed.
    Failed {
        source: String,
        target: PathBuf,
        reason: String,
    },
}

/// Per-path outcomes in input order.
#[derive(Debug, Clone, Default)]
pub struct MirrorReport {
    pub outcomes: Vec<MirrorOutcome>,
}

impl MirrorReport {
    /// Mirror locations created or reused, in input order.
    pub fn translated(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                MirrorOutcome::Mirrored { target, .. } | MirrorOutcome::Reused { target, .. } => {
                    Some(target.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Source paths that matched an exclude pattern, in input order.
    pub fn ignored(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                MirrorOutcome::Excluded { source } => Some(source.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MirrorOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, MirrorOutcome::Failed { .. }))
    }
}

/// How a mirror location is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MirrorMode {
    /// Recursively copy the source tree.
    #[default]
    Copy,
    /// Create a symbolic link to the source.
    Symlink,
}

/// Mirror `sources` into `target_root`.
///
/// `target_root` is created if needed but never cleared; use [`reset_dir`]
/// for that. Only failing to create `target_root` itself is an error.
pub fn mirror<S: AsRef<str>>(
    target_root: &Path,
    sources: &[S],
    roots: &RootPrefixes,
    exclude: &PatternSet,
    mode: MirrorMode,
) -> Result<MirrorReport> {
    fs::create_dir_all(target_root)?;

    let mut report = MirrorReport::default();
    for source in sources {
        let source = source.as_ref();
        report
            .outcomes
            .push(mirror_one(target_root, source, roots, exclude, mode));
    }
    Ok(report)
}

/// Location of the mirror for `source` under `target_root`.
pub fn mirror_location(target_root: &Path, source: &str, roots: &RootPrefixes) -> PathBuf {
    target_root
        .join(roots.package_name(source))
        .join(fingerprint(source))
}

fn mirror_one(
    target_root: &Path,
    source: &str,
    roots: &RootPrefixes,
    exclude: &PatternSet,
    mode: MirrorMode,
) -> MirrorOutcome {
    let source_path = Path::new(source);
    if !source_path.exists() {
        return MirrorOutcome::Missing {
            source: source.to_string(),
        };
    }
    if exclude.matches(source) {
        return MirrorOutcome::Excluded {
            source: source.to_string(),
        };
    }

    let target = mirror_location(target_root, source, roots);
    if target.exists() || target.is_symlink() {
        info!("{} -> {} (reused)", source, target.display());
        return MirrorOutcome::Reused {
            source: source.to_string(),
            target,
        };
    }

    match populate(source_path, &target, mode) {
        Ok(()) => {
            info!("{} -> {}", source, target.display());
            MirrorOutcome::Mirrored {
                source: source.to_string(),
                target,
            }
        }
        Err(e) => {
            let error = Error::Mirror {
                src: source.to_string(),
                dst: target.display().to_string(),
                message: e.to_string(),
            };
            warn!("{}", error);
            discard_partial(&target);
            MirrorOutcome::Failed {
                source: source.to_string(),
                target,
                reason: e.to_string(),
            }
        }
    }
}

fn populate(source: &Path, target: &Path, mode: MirrorMode) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    match mode {
        MirrorMode::Symlink => symlink_dir(source, target),
        MirrorMode::Copy => copy_tree(source, target),
    }
}

/// Remove whatever a failed population left at `target` so the next run
/// does not mistake it for a finished mirror.
fn discard_partial(target: &Path) {
    let removed = match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(target),
        Ok(_) => fs::remove_file(target),
        Err(_) => return,
    };
    match removed {
        Ok(()) => debug!("Removed partial mirror {}", target.display()),
        Err(e) => warn!(
            "Failed to remove partial mirror {}: {}",
            target.display(),
            e
        ),
    }
}

#[cfg(unix)]
fn symlink_dir(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn symlink_dir(source: &Path, target: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(source, target)
}

/// Recursively copy `source` to `target`. A plain file source is copied as a
/// single file.
fn copy_tree(source: &Path, target: &Path) -> io::Result<()> {
    if source.is_file() {
        fs::copy(source, target)?;
        return Ok(());
    }

    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}

/// Recursively delete `dir` if present, then recreate it empty.
pub fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}
