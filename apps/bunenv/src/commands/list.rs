//! List command for the bunenv CLI.
//!
//! ## Output Format
//!
//! ```text
//! Installed Bun versions:
//!   1.0.0
//! * 1.1.0 (current)
//! ```

use anyhow::{Context, Result};
use clap::Args;

use bunenv::toolchain::inventory::list_entries;
use bunenv::toolchain::{BunenvPaths, VersionResolver, list_installed};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Also show directories under `versions/` that are not usable installs.
    #[clap(short = 'a', long = "all", action = clap::ArgAction::SetTrue)]
    pub all: bool,
}

/// Executes the list command.
///
/// Marks the version effective in the current directory with an asterisk.
///
/// # Errors
///
/// Returns an error if the install root or current directory cannot be
/// determined.
pub fn execute(args: &ListArgs) -> Result<()> {
    let paths = BunenvPaths::new()?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let entries: Vec<(String, bool)> = if args.all {
        list_entries(&paths)
            .into_iter()
            .map(|entry| (entry.name, entry.valid))
            .collect()
    } else {
        list_installed(&paths).into_iter().map(|v| (v, true)).collect()
    };

    if entries.is_empty() {
        println!("No Bun versions installed.");
        println!("You can install a version with: bunenv install <version>");
        return Ok(());
    }

    let current = VersionResolver::new(&paths).resolve(&cwd).map(|r| r.version);

    println!("Installed Bun versions:");
    for (version, valid) in &entries {
        let is_current = current.as_deref() == Some(version.as_str());
        let marker = if is_current { "*" } else { " " };
        let mut notes = Vec::new();
        if is_current {
            notes.push("current");
        }
        if !valid {
            notes.push("invalid");
        }

        if notes.is_empty() {
            println!("{marker} {version}");
        } else {
            println!("{marker} {version} ({})", notes.join(", "));
        }
    }

    Ok(())
}
