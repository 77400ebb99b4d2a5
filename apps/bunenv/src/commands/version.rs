//! Version command for the bunenv CLI.
//!
//! Prints the Bun version effective in the current directory. With
//! `--verbose`, also shows where it was selected and which binary runs.

use anyhow::{Context, Result};
use clap::Args;

use bunenv::errors::BunenvError;
use bunenv::toolchain::{BunenvPaths, ResolvedVersion, VersionResolver, is_installed};

/// Arguments for the version command.
#[derive(Args)]
pub struct VersionArgs {
    /// Show the selector, its source and the binary path.
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::SetTrue)]
    pub verbose: bool,
}

/// Executes the version command.
///
/// # Errors
///
/// Returns [`BunenvError::ProcessExitCode`] with code 1 when no version
/// applies, after printing hints.
pub fn execute(args: &VersionArgs) -> Result<()> {
    let paths = BunenvPaths::new()?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let Some(resolved) = VersionResolver::new(&paths).resolve(&cwd) else {
        println!("No active Bun version found.");
        println!("Use bunenv global <version> to set a global version");
        println!("or bunenv local <version> to set a version for this directory.");
        return Err(BunenvError::process_exit_code(1).into());
    };

    if args.verbose {
        print_verbose(&paths, &resolved);
    } else {
        println!("{}", resolved.version);
    }

    Ok(())
}

fn print_verbose(paths: &BunenvPaths, resolved: &ResolvedVersion) {
    let binary = paths.bun_binary(&resolved.version);
    println!("{}", resolved.version);
    println!();
    println!("  Source:   {}", resolved.source);
    println!("  Selector: {}", resolved.selector);
    if is_installed(paths, &resolved.version) {
        println!("  Binary:   {}", binary.display());
    } else {
        println!("  Binary:   {} (not installed)", binary.display());
    }
}
