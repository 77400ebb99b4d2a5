//! Rehash command for the bunenv CLI.
//!
//! Regenerates one shim per executable found in any installed version.

use anyhow::Result;

use bunenv::toolchain::BunenvPaths;
use bunenv::toolchain::shims::{locate_launcher, rehash};

/// Executes the rehash command.
///
/// # Errors
///
/// Returns an error if the launcher is missing or any shim cannot be written.
pub fn execute() -> Result<()> {
    let paths = BunenvPaths::new()?;
    let count = regenerate(&paths)?;
    println!("Generated {count} shims in {}.", paths.shims.display());
    Ok(())
}

/// Regenerates shims and returns how many were written.
pub(crate) fn regenerate(paths: &BunenvPaths) -> Result<usize> {
    let launcher = locate_launcher()?;
    Ok(rehash(paths, &launcher)?.len())
}
