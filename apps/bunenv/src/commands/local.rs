//! Local command for the bunenv CLI.
//!
//! Shows or sets the per-project version recorded in `.bun-version`.
//!
//! ## Usage
//!
//! ```bash
//! bunenv local          # Print the nearest .bun-version
//! bunenv local 1.1.0    # Write .bun-version in the current directory
//! ```

use anyhow::{Context, Result};
use clap::Args;

use bunenv::toolchain::BunenvPaths;
use bunenv::toolchain::paths::write_local_version;
use bunenv::toolchain::resolver::find_local_marker;

use super::require_installed;

/// Arguments for the local command.
#[derive(Args)]
pub struct LocalArgs {
    /// Version to pin for this directory (e.g., "1.1.0").
    ///
    /// If omitted, prints the version from the nearest `.bun-version`.
    pub version: Option<String>,
}

/// Executes the local command.
///
/// # Errors
///
/// Returns an error if the version is malformed or not installed, or if
/// `.bun-version` cannot be written.
pub fn execute(args: &LocalArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let Some(requested) = &args.version else {
        match find_local_marker(&cwd) {
            Some((_, Some(version))) => println!("Current local Bun version: {version}"),
            _ => println!("No local Bun version set. No .bun-version file found."),
        }
        return Ok(());
    };

    let paths = BunenvPaths::new()?;
    let version = require_installed(&paths, requested)?;
    write_local_version(&cwd, &version)?;
    println!("Local Bun version set to {version}.");

    Ok(())
}
