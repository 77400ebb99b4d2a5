//! Install command for the bunenv CLI.
//!
//! Downloads and installs a Bun version, then regenerates shims.
//!
//! ## Usage
//!
//! ```bash
//! bunenv install            # BUNENV_DEFAULT_VERSION, or the latest release
//! bunenv install 1.1.0      # Install a specific version
//! bunenv install latest     # Explicitly install the latest release
//! bunenv install 1.1.0 -f   # Reinstall over an existing copy
//! ```

use anyhow::Result;
use clap::Args;

use bunenv::toolchain::BunenvPaths;
use bunenv::toolchain::conflict::{detect_path_conflicts, format_conflict_warning};
use bunenv::toolchain::install::{InstallOutcome, install_version, resolve_install_target};

use super::rehash::regenerate;

/// Arguments for the install command.
#[derive(Args)]
pub struct InstallArgs {
    /// Version to install (e.g., "1.1.0" or "latest").
    pub version: Option<String>,

    /// Reinstall even if the version is already installed.
    #[clap(short = 'f', long = "force", action = clap::ArgAction::SetTrue)]
    pub force: bool,
}

/// Executes the install command.
///
/// # Process
///
/// 1. Resolve the requested version (`latest` via the GitHub API)
/// 2. Download and verify the release archive for this platform
/// 3. Extract `bun` into `versions/<version>/bin`
/// 4. Regenerate shims
///
/// # Errors
///
/// Returns an error if the version is malformed, or if the download,
/// verification, extraction or rehash fails.
pub async fn execute(args: &InstallArgs) -> Result<()> {
    let paths = BunenvPaths::new()?;
    let version = resolve_install_target(args.version.as_deref()).await?;

    match install_version(&paths, &version, args.force).await? {
        InstallOutcome::AlreadyInstalled => {
            println!("Bun {version} is already installed.");
            return Ok(());
        }
        InstallOutcome::Installed => println!("Bun {version} installed successfully."),
    }

    let count = regenerate(&paths)?;
    println!("Generated {count} shims.");

    if paths.global_version().is_none() {
        println!("Run 'bunenv global {version}' to use it by default.");
    }

    let conflicts = detect_path_conflicts(&paths.shims);
    if !conflicts.is_empty() {
        eprintln!();
        eprintln!("{}", format_conflict_warning(&conflicts));
    }

    Ok(())
}
