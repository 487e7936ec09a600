//! Generate command implementation
//!
//! Collects the search paths from the environment, makes them local and
//! writes the IDE configuration:
//! 1. `repo`: rewrite each path into the matching organization clone
//! 2. `localized`: mirror each path below the mirror directory

use anyhow::Result;
use clap::{Args, ValueEnum};
use log::info;
use std::path::PathBuf;

use confgen::config::Settings;
use confgen::hosting::GitHubHost;
use confgen::ide_config::IdeConfig;
use confgen::mirror::{self, MirrorMode};
use confgen::orchestrator::CloneRoot;
use confgen::pattern::collect_search_paths;
use confgen::translate::PathTranslator;

use super::{clone_orchestrator, require_organization, GitArgs, SettingsArgs};

/// How search paths are made local
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    /// Point paths into clones of the organization's repositories
    #[default]
    Repo,
    /// Copy or link paths below the mirror directory
    Localized,
}

/// Arguments for the generate command
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(flatten)]
    pub git: GitArgs,

    /// How search paths are made local
    #[arg(short, long, value_enum, default_value_t = Method::Repo)]
    pub method: Method,

    /// IDE configuration file to write
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Directory mirrors are placed in (localized method)
    #[arg(long, value_name = "PATH")]
    pub mirror_dir: Option<PathBuf>,

    /// Empty the mirror directory first (localized method)
    #[arg(long)]
    pub clean: bool,

    /// Mirror with symlinks instead of copies (localized method)
    #[arg(long)]
    pub symlink: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the generate command
pub fn execute(args: GenerateArgs) -> Result<()> {
    let mut settings = args.settings.load()?;
    args.git.apply(&mut settings)?;
    if let Some(output) = &args.output {
        settings.output = output.clone();
    }
    if let Some(mirror_dir) = &args.mirror_dir {
        settings.mirror_dir = mirror_dir.clone();
    }
    settings.symlink |= args.symlink;

    let search_paths = collect_search_paths(&settings.path_variables);
    info!("collected {} search paths", search_paths.len());

    let (translated, copied) = match args.method {
        Method::Localized => localize(&settings, &search_paths, args.clean)?,
        Method::Repo => translate_to_clones(&settings, &args.git, &search_paths)?,
    };

    let mut ide_config = IdeConfig::load(&settings.output, settings.ide_defaults())?;
    for field in &settings.add_to {
        ide_config.extend_paths(field, &translated);
        ide_config.extend_paths(field, &copied);
    }

    if !args.quiet {
        println!("writing conf to {} ...", settings.output.display());
    }
    ide_config.write(&settings.output)?;
    Ok(())
}

fn localize(
    settings: &Settings,
    search_paths: &[String],
    clean: bool,
) -> Result<(Vec<String>, Vec<String>)> {
    let ignore = settings.ignore()?;
    let kept: Vec<&str> = search_paths
        .iter()
        .map(String::as_str)
        .filter(|path| !ignore.matches(path))
        .collect();

    if clean {
        info!("cleaning {}", settings.mirror_dir.display());
        mirror::reset_dir(&settings.mirror_dir)?;
    }

    let mode = if settings.symlink {
        MirrorMode::Symlink
    } else {
        MirrorMode::Copy
    };
    let report = mirror::mirror(
        &settings.mirror_dir,
        &kept,
        &settings.roots(),
        &settings.no_translate()?,
        mode,
    )?;

    let failed = report.failures().count();
    if failed > 0 {
        info!("{} search paths could not be mirrored", failed);
    }

    let translated = report
        .translated()
        .iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect();
    Ok((translated, report.ignored()))
}

fn translate_to_clones(
    settings: &Settings,
    git: &GitArgs,
    search_paths: &[String],
) -> Result<(Vec<String>, Vec<String>)> {
    let organization = require_organization(settings)?;
    let credentials = git.credentials();
    let host = GitHubHost::new(credentials.as_ref());
    let orchestrator = clone_orchestrator(settings);
    let source = CloneRoot::new(&orchestrator, &host, credentials.as_ref(), organization);

    let translator = PathTranslator::new(
        settings.roots(),
        settings.ignore()?,
        settings.no_translate()?,
        settings.clone_dir.clone(),
        &source,
    );
    let translation = translator.translate(search_paths)?;
    info!(
        "{} paths translated, {} kept as they are",
        translation.translated.len(),
        translation.copied.len()
    );
    Ok((translation.translated, translation.copied))
}
