//! Sync command implementation
//!
//! Lists every repository of the organization and clones it, or force-updates
//! an existing clone to the remote default branch.

use anyhow::Result;
use clap::Args;
use std::time::Instant;

use confgen::hosting::{GitHubHost, RepositoryHost};
use confgen::orchestrator::SyncReport;

use super::{clone_orchestrator, require_organization, GitArgs, SettingsArgs};

/// Arguments for the sync command
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(flatten)]
    pub git: GitArgs,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the sync command
///
/// Failures of single repositories are reported but do not fail the command.
pub fn execute(args: SyncArgs) -> Result<()> {
    let mut settings = args.settings.load()?;
    args.git.apply(&mut settings)?;
    let organization = require_organization(&settings)?;

    let start_time = Instant::now();
    let credentials = args.git.credentials();
    let token = credentials.token()?;
    let host = GitHubHost::new(credentials.as_ref());
    let repos = host.list_repositories(organization)?;

    let orchestrator = clone_orchestrator(&settings);
    let report = orchestrator.sync_all(&repos, Some(&token))?;

    if !args.quiet {
        print_summary(&report, start_time.elapsed().as_secs_f64());
    }
    Ok(())
}

fn print_summary(report: &SyncReport, seconds: f64) {
    println!(
        "Synced {} repositories in {:.2}s",
        report.handles.len(),
        seconds
    );
    for handle in &report.handles {
        println!("   {}", handle.root().display());
    }
    if !report.failures.is_empty() {
        println!("{} repositories failed:", report.failures.len());
        for failure in &report.failures {
            println!("   {}: {}", failure.full_name, failure.error);
        }
    }
}
