//! # Clone Orchestrator
//!
//! Clones or updates every repository of an organization below a clone root,
//! one task per repository on a bounded rayon pool.
//!
//! ## Behavior
//!
//! - A repository whose directory `clone_root/<full_name>` already exists is
//!   force-pulled from its default branch. Remote state wins: local commits
//!   and edits in the clone are discarded.
//! - Any other repository is cloned fresh into that directory.
//! - A failing repository never aborts its siblings. The call waits for all
//!   tasks and returns a [`SyncReport`] with a handle for every success and
//!   the error for every failure.
//! - Each git process is bounded by the timeout of [`DefaultGitOperations`].
//!
//! Access tokens reach git through the clone URL only and are redacted from
//! log lines and errors.

use log::{info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::credentials::CredentialProvider;
use crate::directory::{discover_clones, RepositoryHandle, RepositorySource};
use crate::error::{Error, Result};
use crate::git::redact_url;
use crate::hosting::{RepoDescriptor, RepositoryHost};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clone `clone_url` into `target_dir`.
    fn clone_repo(&self, clone_url: &str, token: Option<&str>, target_dir: &Path) -> Result<()>;

    /// Reset an existing clone to the remote head of `branch`.
    fn force_pull(
        &self,
        repo_dir: &Path,
        clone_url: &str,
        branch: &str,
        token: Option<&str>,
    ) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
pub struct DefaultGitOperations {
    timeout: Duration,
}

impl DefaultGitOperations {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl GitOperations for DefaultGitOperations {
    fn clone_repo(&self, clone_url: &str, token: Option<&str>, target_dir: &Path) -> Result<()> {
        crate::git::clone(clone_url, token, target_dir, self.timeout)
    }

    fn force_pull(
        &self,
        repo_dir: &Path,
        clone_url: &str,
        branch: &str,
        token: Option<&str>,
    ) -> Result<()> {
        crate::git::force_pull(repo_dir, clone_url, branch, token, self.timeout)
    }
}

/// A repository that could not be cloned or updated.
#[derive(Debug)]
pub struct SyncFailure {
    pub full_name: String,
    pub error: Error,
}

/// Outcome of one [`CloneOrchestrator::sync_all`] run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Handles for every repository that synced, in input order.
    pub handles: Vec<RepositoryHandle>,
    pub failures: Vec<SyncFailure>,
}

/// Clones and updates repositories under a clone root.
pub struct CloneOrchestrator {
    git_ops: Box<dyn GitOperations>,
    clone_root: PathBuf,
    jobs: Option<usize>,
}

impl CloneOrchestrator {
    /// Uses the system `git` with the given per-command timeout.
    pub fn new(clone_root: PathBuf, timeout: Duration) -> Self {
        Self::with_operations(Box::new(DefaultGitOperations::new(timeout)), clone_root)
    }

    /// Uses custom `GitOperations`, e.g. a mock in tests.
    pub fn with_operations(git_ops: Box<dyn GitOperations>, clone_root: PathBuf) -> Self {
        Self {
            git_ops,
            clone_root,
            jobs: None,
        }
    }

    /// Limit the number of concurrent git tasks. `None` uses rayon's default.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn clone_root(&self) -> &Path {
        &self.clone_root
    }

    /// Clone or update every repository and wait for all of them.
    ///
    /// Only failing to create the clone root or the worker pool is an error;
    /// per-repository failures end up in [`SyncReport::failures`].
    pub fn sync_all(&self, repos: &[RepoDescriptor], token: Option<&str>) -> Result<SyncReport> {
        fs::create_dir_all(&self.clone_root)?;

        let results: Vec<(&RepoDescriptor, Result<RepositoryHandle>)> = match self.jobs {
            Some(jobs) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build()
                    .map_err(|e| Error::WorkerPool {
                        message: e.to_string(),
                    })?;
                pool.install(|| self.sync_parallel(repos, token))
            }
            None => self.sync_parallel(repos, token),
        };

        let mut report = SyncReport::default();
        for (repo, result) in results {
            match result {
                Ok(handle) => report.handles.push(handle),
                Err(error) => {
                    warn!("Failed to sync {}: {}", repo.full_name, error);
                    report.failures.push(SyncFailure {
                        full_name: repo.full_name.clone(),
                        error,
                    });
                }
            }
        }
        Ok(report)
    }

    fn sync_parallel<'r>(
        &self,
        repos: &'r [RepoDescriptor],
        token: Option<&str>,
    ) -> Vec<(&'r RepoDescriptor, Result<RepositoryHandle>)> {
        repos
            .par_iter()
            .map(|repo| (repo, self.sync_one(repo, token)))
            .collect()
    }

    fn sync_one(&self, repo: &RepoDescriptor, token: Option<&str>) -> Result<RepositoryHandle> {
        let repo_dir = self.clone_root.join(&repo.full_name);
        let url = redact_url(&repo.clone_url);

        if repo_dir.exists() {
            info!("Pulling {} from {}", repo.default_branch, url);
            self.git_ops
                .force_pull(&repo_dir, &repo.clone_url, &repo.default_branch, token)?;
        } else {
            info!("Cloning from {} to {}", url, repo_dir.display());
            self.git_ops.clone_repo(&repo.clone_url, token, &repo_dir)?;
        }
        Ok(RepositoryHandle::new(repo_dir))
    }
}

/// Repositories of one organization below a clone root.
///
/// Existing clones are used as they are. Only when there are none yet is the
/// organization listed on the host and cloned in full, which is the one
/// point where a missing token is fatal.
pub struct CloneRoot<'a> {
    orchestrator: &'a CloneOrchestrator,
    host: &'a dyn RepositoryHost,
    credentials: &'a dyn CredentialProvider,
    organization: String,
}

impl<'a> CloneRoot<'a> {
    pub fn new(
        orchestrator: &'a CloneOrchestrator,
        host: &'a dyn RepositoryHost,
        credentials: &'a dyn CredentialProvider,
        organization: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator,
            host,
            credentials,
            organization: organization.into(),
        }
    }

    /// List the organization and clone or update all of it.
    pub fn sync(&self) -> Result<SyncReport> {
        let token = self.credentials.token()?;
        let repos = self.host.list_repositories(&self.organization)?;
        self.orchestrator.sync_all(&repos, Some(&token))
    }
}

impl RepositorySource for CloneRoot<'_> {
    fn repositories(&self) -> Result<Vec<RepositoryHandle>> {
        let clones = discover_clones(self.orchestrator.clone_root(), &self.organization)?;
        info!("number of clones: {}", clones.len());
        if !clones.is_empty() {
            return Ok(clones);
        }

        let report = self.sync()?;
        if !report.failures.is_empty() {
            warn!(
                "{} of {} repositories failed to sync",
                report.failures.len(),
                report.failures.len() + report.handles.len()
            );
        }
        Ok(report.handles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticToken;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clone(String, Option<String>, PathBuf),
        Pull(PathBuf, String),
    }

    /// Mock git operations for testing
    #[derive(Clone, Default)]
    struct MockGitOperations {
        calls: Arc<Mutex<Vec<Call>>>,
        fail_on: Option<String>,
    }

    impl MockGitOperations {
        fn failing_on(url: &str) -> Self {
            Self {
                fail_on: Some(url.to_string()),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn check(&self, url: &str) -> Result<()> {
            if self.fail_on.as_deref() == Some(url) {
                return Err(Error::GitClone {
                    url: url.to_string(),
                    message: "network unreachable".to_string(),
                });
            }
            Ok(())
        }
    }

    impl GitOperations for MockGitOperations {
        fn clone_repo(&self, clone_url: &str, token: Option<&str>, target_dir: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Clone(
                clone_url.to_string(),
                token.map(str::to_string),
                target_dir.to_path_buf(),
            ));
            self.check(clone_url)?;
            fs::create_dir_all(target_dir.join(".git"))?;
            Ok(())
        }

        fn force_pull(
            &self,
            repo_dir: &Path,
            clone_url: &str,
            branch: &str,
            _token: Option<&str>,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Pull(repo_dir.to_path_buf(), branch.to_string()));
            self.check(clone_url)
        }
    }

    struct MockHost {
        repos: Vec<RepoDescriptor>,
    }

    impl RepositoryHost for MockHost {
        fn list_repositories(&self, _organization: &str) -> Result<Vec<RepoDescriptor>> {
            Ok(self.repos.clone())
        }
    }

    struct NoToken;

    impl CredentialProvider for NoToken {
        fn token(&self) -> Result<String> {
            Err(Error::Credentials {
                message: "no token configured".to_string(),
            })
        }
    }

    fn descriptor(full_name: &str) -> RepoDescriptor {
        RepoDescriptor {
            full_name: full_name.to_string(),
            clone_url: format!("https://github.com/{}.git", full_name),
            default_branch: "main".to_string(),
        }
    }

    #[test]
    fn test_sync_all_clones_new_and_pulls_existing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("clones");
        fs::create_dir_all(root.join("acme/existing/.git")).unwrap();

        let git = MockGitOperations::default();
        let orchestrator = CloneOrchestrator::with_operations(Box::new(git.clone()), root.clone());
        let repos = vec![descriptor("acme/existing"), descriptor("acme/fresh")];

        let report = orchestrator.sync_all(&repos, Some("tok")).unwrap();
        assert!(report.failures.is_empty());
        let roots: Vec<_> = report.handles.iter().map(|h| h.root().to_path_buf()).collect();
        assert_eq!(roots, vec![root.join("acme/existing"), root.join("acme/fresh")]);

        let calls = git.calls();
        assert!(calls.contains(&Call::Pull(root.join("acme/existing"), "main".to_string())));
        assert!(calls.contains(&Call::Clone(
            "https://github.com/acme/fresh.git".to_string(),
            Some("tok".to_string()),
            root.join("acme/fresh"),
        )));
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn test_sync_all_isolates_failures() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("clones");
        let git = MockGitOperations::failing_on("https://github.com/acme/broken.git");
        let orchestrator =
            CloneOrchestrator::with_operations(Box::new(git), root.clone()).with_jobs(Some(2));
        let repos = vec![
            descriptor("acme/one"),
            descriptor("acme/broken"),
            descriptor("acme/two"),
        ];

        let report = orchestrator.sync_all(&repos, None).unwrap();
        assert_eq!(report.handles.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].full_name, "acme/broken");
        assert!(matches!(report.failures[0].error, Error::GitClone { .. }));
        assert!(root.join("acme/one/.git").exists());
        assert!(root.join("acme/two/.git").exists());
    }

    #[test]
    fn test_sync_all_empty() {
        let temp = TempDir::new().unwrap();
        let orchestrator = CloneOrchestrator::with_operations(
            Box::new(MockGitOperations::default()),
            temp.path().join("clones"),
        );
        let report = orchestrator.sync_all(&[], None).unwrap();
        assert!(report.handles.is_empty());
        assert!(temp.path().join("clones").is_dir());
    }

    #[test]
    fn test_clone_root_prefers_existing_clones() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("clones");
        fs::create_dir_all(root.join("acme/local/.git")).unwrap();

        let git = MockGitOperations::default();
        let orchestrator = CloneOrchestrator::with_operations(Box::new(git.clone()), root.clone());
        let host = MockHost {
            repos: vec![descriptor("acme/remote")],
        };
        // No token is needed while clones exist.
        let source = CloneRoot::new(&orchestrator, &host, &NoToken, "acme");

        let handles = source.repositories().unwrap();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].root(), root.join("acme/local"));
        assert!(git.calls().is_empty());
    }

    #[test]
    fn test_clone_root_clones_everything_when_empty() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("clones");

        let git = MockGitOperations::default();
        let orchestrator = CloneOrchestrator::with_operations(Box::new(git.clone()), root.clone());
        let host = MockHost {
            repos: vec![descriptor("acme/a"), descriptor("acme/b")],
        };
        let token = StaticToken("tok".to_string());
        let source = CloneRoot::new(&orchestrator, &host, &token, "acme");

        let handles = source.repositories().unwrap();
        assert_eq!(handles.len(), 2);
        assert_eq!(git.calls().len(), 2);
    }

    #[test]
    fn test_clone_root_without_token_is_fatal_when_cloning() {
        let temp = TempDir::new().unwrap();
        let orchestrator = CloneOrchestrator::with_operations(
            Box::new(MockGitOperations::default()),
            temp.path().join("clones"),
        );
        let host = MockHost { repos: vec![] };
        let source = CloneRoot::new(&orchestrator, &host, &NoToken, "acme");

        let err = source.repositories().unwrap_err();
        assert!(matches!(err, Error::Credentials { .. }));
    }
}
