//! Shell command for the bunenv CLI.
//!
//! Starts an interactive subshell with `BUNENV_VERSION` set, so every shim
//! invoked inside it uses that version.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use bunenv::errors::BunenvError;
use bunenv::toolchain::BunenvPaths;
use bunenv::toolchain::paths::BUNENV_VERSION_ENV;
use bunenv::toolchain::shell::path_with_prepended;

use super::require_installed;

/// Arguments for the shell command.
#[derive(Args)]
pub struct ShellArgs {
    /// Version to use in the subshell (e.g., "1.1.0").
    pub version: String,
}

/// Executes the shell command.
///
/// # Errors
///
/// Returns an error if the version is malformed or not installed, or if the
/// shell cannot be started. A non-zero shell exit becomes
/// [`BunenvError::ProcessExitCode`].
pub fn execute(args: &ShellArgs) -> Result<()> {
    let paths = BunenvPaths::new()?;
    let version = require_installed(&paths, &args.version)?;
    let program = user_shell();

    let path = path_with_prepended(&paths.shims, std::env::var_os("PATH"))?;

    println!("Switching to Bun {version}");

    let status = std::process::Command::new(&program)
        .env(BUNENV_VERSION_ENV, &version)
        .env("PATH", path)
        .status()
        .with_context(|| format!("Failed to start shell: {}", program.display()))?;

    let code = status.code().unwrap_or(1);
    println!("Shell exited with code {code}");

    if code != 0 {
        return Err(BunenvError::process_exit_code(code).into());
    }
    Ok(())
}

#[cfg(unix)]
fn user_shell() -> PathBuf {
    std::env::var_os("SHELL")
        .filter(|s| !s.is_empty())
        .map_or_else(|| PathBuf::from("/bin/bash"), PathBuf::from)
}

#[cfg(not(unix))]
fn user_shell() -> PathBuf {
    std::env::var_os("COMSPEC")
        .filter(|s| !s.is_empty())
        .map_or_else(|| PathBuf::from("cmd.exe"), PathBuf::from)
}
