//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, helper functions, and snippets
//! to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_settings(settings::ACME);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::git_available;
    #[allow(unused_imports)]
    pub use super::settings;
    pub use super::TestFixture;
}

/// Common `confgen.json` snippets for testing.
#[allow(dead_code)]
pub mod settings {
    /// Organization `acme`, packages deployed below `/site/packages/int/`.
    pub const ACME: &str = r#"{
  "root_prefixes": ["/site/packages/int/"],
  "organization": "acme",
  "path_variables": ["CONFGEN_TEST_PATH"]
}"#;

    /// Settings that are not valid JSON.
    pub const INVALID_JSON: &str = "{ organization: acme";

    /// Settings with a misspelled field.
    pub const UNKNOWN_FIELD: &str = r#"{"organisation": "acme"}"#;
}

/// Check if a `git` binary is available for tests that need real repositories.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// A test fixture that provides a temporary workspace with optional settings.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_settings(settings::ACME)
///     .with_clone("acme", "foo-repo", "foo", &["python"]);
///
/// fixture.command().arg("packages").assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `confgen.json` settings file with the given content.
    pub fn with_settings(self, content: &str) -> Self {
        self.temp_dir
            .child("confgen.json")
            .write_str(content)
            .expect("Failed to write settings file");
        self
    }

    /// Add settings for organization `acme` whose packages are deployed
    /// below this fixture's `deploy/` directory. Paths under `*/vendor/*`
    /// are never translated.
    #[allow(dead_code)]
    pub fn with_deploy_settings(self) -> Self {
        let settings = serde_json::json!({
            "root_prefixes": [format!("{}/", self.path().join("deploy").display())],
            "no_translate_patterns": ["*/vendor/*"],
            "organization": "acme",
            "path_variables": ["CONFGEN_TEST_PATH"],
            "ide_defaults": {"venv": "devenv39"},
        });
        self.with_settings(&settings.to_string())
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a fake clone at `clones/<org>/<dir>` providing `package` with the
    /// given subdirectories.
    #[allow(dead_code)]
    pub fn with_clone(self, org: &str, dir: &str, package: &str, subdirs: &[&str]) -> Self {
        let root = self.temp_dir.child("clones").child(org).child(dir);
        root.child(".git")
            .create_dir_all()
            .expect("Failed to create .git");
        root.child("package.py")
            .write_str(&format!("name = \"{}\"\nversion = \"1.0.0\"\n", package))
            .expect("Failed to write package.py");
        for subdir in subdirs {
            root.child(subdir)
                .create_dir_all()
                .expect("Failed to create clone subdirectory");
        }
        self
    }

    /// Create a directory outside the clones, standing in for a deployed package.
    #[allow(dead_code)]
    pub fn deployed(&self, path: &str) -> PathBuf {
        let dir = self.temp_dir.child("deploy").child(path);
        dir.create_dir_all().expect("Failed to create deployed dir");
        dir.child("module.py")
            .write_str("VALUE = 1\n")
            .expect("Failed to write module");
        dir.path().to_path_buf()
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the settings file.
    #[allow(dead_code)]
    pub fn settings_path(&self) -> PathBuf {
        self.temp_dir.path().join("confgen.json")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Read and parse the generated IDE configuration.
    #[allow(dead_code)]
    pub fn ide_config(&self) -> serde_json::Value {
        let content = std::fs::read_to_string(self.path().join("pyrightconfig.json"))
            .expect("Failed to read pyrightconfig.json");
        serde_json::from_str(&content).expect("pyrightconfig.json is not JSON")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command running in this fixture's directory with a clean
    /// confgen environment and no reachable token.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("confgen");
        cmd.current_dir(self.path())
            .env_remove("CONFGEN_CONFIG")
            .env_remove("CONFGEN_ORGANIZATION")
            .env_remove("CONFGEN_GH_TOKEN")
            .env_remove("PYTHONPATH")
            .env_remove("BD_HOOKPATH")
            .env_remove("CONFGEN_TEST_PATH")
            .env("HOME", self.path().join("home"));
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_clone() {
        let fixture = TestFixture::new().with_clone("acme", "foo-repo", "foo", &["python"]);
        let root = fixture.path().join("clones/acme/foo-repo");
        assert!(root.join(".git").is_dir());
        assert!(root.join("python").is_dir());
        assert!(root.join("package.py").is_file());
    }

    #[test]
    fn test_settings_are_valid_json() {
        serde_json::from_str::<serde_json::Value>(settings::ACME).expect("ACME should be valid JSON");
        assert!(serde_json::from_str::<serde_json::Value>(settings::INVALID_JSON).is_err());
    }
}
