//! # CLI Command Implementations
//!
//! Each subcommand of the `confgen` tool lives in its own file with an
//! `Args` struct derived using `clap` and an `execute` function that calls
//! into the `confgen` library.
//!
//! Options shared by several commands are defined here and flattened into
//! the command arguments.

pub mod generate;
pub mod packages;
pub mod sync;

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use confgen::config::Settings;
use confgen::credentials::{CredentialProvider, StaticToken, TokenFile};
use confgen::defaults;
use confgen::orchestrator::CloneOrchestrator;

/// Where settings come from and which organization they target
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Path to the settings file (defaults to ./confgen.json when present)
    #[arg(short, long, value_name = "PATH", env = "CONFGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Organization whose repositories are cloned
    #[arg(long, value_name = "NAME", env = "CONFGEN_ORGANIZATION")]
    pub organization: Option<String>,

    /// Directory organization clones live in
    #[arg(long, value_name = "PATH")]
    pub clone_dir: Option<PathBuf>,
}

impl SettingsArgs {
    /// Load the settings file and apply the command-line overrides.
    pub fn load(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                if !path.exists() {
                    bail!("Settings file not found: {}", path.display());
                }
                Settings::from_file(path)?
            }
            None => Settings::load_or_default(&PathBuf::from(defaults::SETTINGS_FILE))?,
        };

        if let Some(organization) = &self.organization {
            settings.organization = organization.clone();
        }
        if let Some(clone_dir) = &self.clone_dir {
            settings.clone_dir = clone_dir.clone();
        }
        Ok(settings)
    }
}

/// Access to the hosting service and the git worker pool
#[derive(Args, Debug, Clone, Default)]
pub struct GitArgs {
    /// Access token for the hosting service
    #[arg(long, value_name = "TOKEN", env = "CONFGEN_GH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// JSON file holding {"gh_token": "..."} (defaults to ~/.confgen.json)
    #[arg(long, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Number of concurrent git tasks
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
}

impl GitArgs {
    pub fn apply(&self, settings: &mut Settings) -> Result<()> {
        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                bail!("--jobs must be at least 1");
            }
            settings.jobs = Some(jobs);
        }
        Ok(())
    }

    /// The token source: an explicit token wins over the token file.
    pub fn credentials(&self) -> Box<dyn CredentialProvider> {
        match &self.token {
            Some(token) => Box::new(StaticToken(token.clone())),
            None => Box::new(TokenFile::new(
                self.token_file.clone().unwrap_or_else(defaults::token_file),
            )),
        }
    }
}

/// Fail with a hint when no organization is configured.
pub fn require_organization(settings: &Settings) -> Result<&str> {
    if settings.organization.is_empty() {
        bail!(
            "No organization configured. Set \"organization\" in {} or pass --organization",
            defaults::SETTINGS_FILE
        );
    }
    Ok(&settings.organization)
}

pub fn clone_orchestrator(settings: &Settings) -> CloneOrchestrator {
    CloneOrchestrator::new(
        settings.clone_dir.clone(),
        Duration::from_secs(settings.clone_timeout_secs),
    )
    .with_jobs(settings.jobs)
}
