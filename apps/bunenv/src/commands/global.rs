//! Global command for the bunenv CLI.
//!
//! Shows or sets the version used when no `BUNENV_VERSION`, `.bun-version`
//! or `engines.bun` applies.
//!
//! ## Usage
//!
//! ```bash
//! bunenv global          # Print the global version
//! bunenv global 1.1.0    # Set the global version
//! ```

use anyhow::Result;
use clap::Args;

use bunenv::toolchain::BunenvPaths;

use super::require_installed;

/// Arguments for the global command.
#[derive(Args)]
pub struct GlobalArgs {
    /// Version to set globally (e.g., "1.1.0").
    ///
    /// If omitted, prints the current global version.
    pub version: Option<String>,
}

/// Executes the global command.
///
/// # Errors
///
/// Returns an error if the version is malformed or not installed, or if the
/// global marker cannot be written.
pub fn execute(args: &GlobalArgs) -> Result<()> {
    let paths = BunenvPaths::new()?;

    let Some(requested) = &args.version else {
        match paths.global_version() {
            Some(version) => println!("Current global Bun version: {version}"),
            None => println!("No global Bun version set."),
        }
        return Ok(());
    };

    let version = require_installed(&paths, requested)?;
    paths.set_global_version(&version)?;
    println!("Global Bun version set to {version}.");

    Ok(())
}
