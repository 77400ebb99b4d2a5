//! Subcommand implementations for the bunenv CLI.
//!
//! ## Version Management
//!
//! - [`install`] - Download and install a Bun version
//! - [`uninstall`] - Remove an installed version
//! - [`list`] - List installed versions
//!
//! ## Version Selection
//!
//! - [`global`] - Show or set the global version
//! - [`local`] - Show or set the per-project version
//! - [`version`] - Show the effective version
//! - [`shell`] - Start a subshell pinned to a version
//!
//! ## Shell Integration
//!
//! - [`rehash`] - Regenerate shims
//! - [`init`] - Print the shell integration snippet
//! - [`doctor`] - Check installation health

pub mod doctor;
pub mod global;
pub mod init;
pub mod install;
pub mod list;
pub mod local;
pub mod rehash;
pub mod shell;
pub mod uninstall;
pub mod version;

use anyhow::Result;

use bunenv::errors::BunenvError;
use bunenv::toolchain::{BunenvPaths, is_installed, is_valid_version_format, normalize_version};

/// Validates a version argument and checks that it is installed.
///
/// Returns the version without its `v` prefix.
pub(crate) fn require_installed(paths: &BunenvPaths, version: &str) -> Result<String> {
    if !is_valid_version_format(version) {
        return Err(BunenvError::invalid_version(version).into());
    }
    let version = normalize_version(version);
    if !is_installed(paths, version) {
        return Err(BunenvError::version_not_installed(version).into());
    }
    Ok(version.to_string())
}
