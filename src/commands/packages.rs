//! Packages command implementation
//!
//! Prints the package name each existing clone provides, one per line as
//! `<package>\t<clone directory>`. Never clones or contacts the host.

use anyhow::Result;
use clap::Args;

use confgen::directory::{discover_clones, PackageRepoMap};

use super::{require_organization, SettingsArgs};

/// Arguments for the packages command
#[derive(Args, Debug, Default)]
pub struct PackagesArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Execute the packages command
pub fn execute(args: PackagesArgs) -> Result<()> {
    let settings = args.settings.load()?;
    let organization = require_organization(&settings)?;

    let clones = discover_clones(&settings.clone_dir, organization)?;
    let mapping = PackageRepoMap::build(clones);
    for (package_name, handle) in mapping.sorted() {
        println!("{}\t{}", package_name, handle.root().display());
    }
    Ok(())
}
