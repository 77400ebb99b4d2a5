//! Uninstall command for the bunenv CLI.
//!
//! ## Usage
//!
//! ```bash
//! bunenv uninstall 1.1.0
//! ```

use anyhow::Result;
use clap::Args;

use bunenv::toolchain::install::uninstall_version;
use bunenv::toolchain::{BunenvPaths, normalize_version};

use super::rehash::regenerate;

/// Arguments for the uninstall command.
#[derive(Args)]
pub struct UninstallArgs {
    /// Version to uninstall (e.g., "1.1.0").
    pub version: String,
}

/// Executes the uninstall command.
///
/// Warns when removing the global version; the global marker itself is left
/// untouched.
///
/// # Errors
///
/// Returns an error if the version is not installed or cannot be removed,
/// or if shims cannot be regenerated.
pub fn execute(args: &UninstallArgs) -> Result<()> {
    let paths = BunenvPaths::new()?;
    let version = normalize_version(&args.version);

    uninstall_version(&paths, version)?;
    regenerate(&paths)?;
    println!("Bun {version} uninstalled successfully.");

    if paths.global_version().as_deref() == Some(version) {
        eprintln!(
            "Warning: {version} is still set as the global version. \
             Run 'bunenv global <version>' to pick another."
        );
    }

    Ok(())
}
