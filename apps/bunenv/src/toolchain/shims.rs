//! Shim generation.
//!
//! Every shim is a hard link to (or, across filesystems, a copy of) the
//! `bunenv-shim` launcher, named after the executable it stands in for.
//! The launcher reads its own name at run time, so all shims share one
//! binary and carry no state of their own.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::inventory::list_installed;
use super::paths::{BunenvPaths, PRIMARY_EXECUTABLE, is_executable_file};
use crate::errors::BunenvError;

/// File name of the launcher binary, without platform suffix.
pub const LAUNCHER_NAME: &str = "bunenv-shim";

/// Locates the launcher installed next to the running executable.
///
/// # Errors
///
/// Returns an error if the current executable's path is unavailable or no
/// launcher sits beside it.
pub fn locate_launcher() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Cannot determine the bunenv executable path")?;
    let dir = exe
        .parent()
        .context("The bunenv executable has no parent directory")?;
    let launcher = dir.join(format!("{LAUNCHER_NAME}{}", std::env::consts::EXE_SUFFIX));

    if !launcher.is_file() {
        return Err(BunenvError::shim_error(format!(
            "shim launcher not found at {}. \
             Reinstall bunenv so that {LAUNCHER_NAME} sits next to bunenv.",
            launcher.display()
        ))
        .into());
    }
    Ok(launcher)
}

/// Collects the names of all executables across installed versions.
///
/// The result is deduplicated, sorted, and always contains `bun`.
#[must_use]
pub fn collect_executable_names(paths: &BunenvPaths) -> BTreeSet<String> {
    let mut names = BTreeSet::from([PRIMARY_EXECUTABLE.to_string()]);

    for version in list_installed(paths) {
        let bin_dir = paths.bin_dir(&version);
        let Ok(entries) = std::fs::read_dir(&bin_dir) else {
            continue;
        };
        for entry in entries.filter_map(Result::ok) {
            if let Some(name) = executable_name(&entry.path()) {
                names.insert(name);
            }
        }
    }

    names
}

/// Returns the shim name for a file in a `bin` directory, if it is executable.
#[cfg(unix)]
fn executable_name(path: &Path) -> Option<String> {
    if !is_executable_file(path) {
        return None;
    }
    path.file_name()?.to_str().map(ToString::to_string)
}

/// Returns the shim name for a file in a `bin` directory, if it is executable.
#[cfg(not(unix))]
fn executable_name(path: &Path) -> Option<String> {
    if !is_executable_file(path) {
        return None;
    }
    let is_exe = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("exe"));
    if !is_exe {
        return None;
    }
    path.file_stem()?.to_str().map(ToString::to_string)
}

/// Regenerates all shims and returns the names written.
///
/// Existing shims are removed first so that names no longer provided by any
/// installed version disappear. The first filesystem error aborts the run.
///
/// # Errors
///
/// Returns an error if the shims directory cannot be created or cleaned, or
/// if any shim cannot be written.
pub fn rehash(paths: &BunenvPaths, launcher: &Path) -> Result<Vec<String>> {
    std::fs::create_dir_all(&paths.shims)
        .with_context(|| format!("Failed to create directory: {}", paths.shims.display()))?;

    remove_existing_shims(&paths.shims)?;

    let names = collect_executable_names(paths);
    for name in &names {
        write_shim(launcher, &paths.shim_path(name))?;
    }

    debug!(count = names.len(), "regenerated shims");
    Ok(names.into_iter().collect())
}

fn remove_existing_shims(shims_dir: &Path) -> Result<()> {
    let entries = std::fs::read_dir(shims_dir)
        .with_context(|| format!("Failed to read shims directory: {}", shims_dir.display()))?;

    for entry in entries {
        let path = entry
            .with_context(|| "Failed to read directory entry")?
            .path();
        let removed = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        removed.with_context(|| format!("Failed to remove stale shim: {}", path.display()))?;
    }
    Ok(())
}

fn write_shim(launcher: &Path, shim: &Path) -> Result<()> {
    if let Err(e) = std::fs::hard_link(launcher, shim) {
        debug!(error = %e, shim = %shim.display(), "hard link failed, copying launcher");
        std::fs::copy(launcher, shim)
            .with_context(|| format!("Failed to write shim: {}", shim.display()))?;
    }
    make_executable(shim)
}

/// Sets executable permissions (0o755) on a file unless it already has them.
///
/// # Errors
///
/// Returns an error if metadata cannot be read or permissions cannot be set.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if is_executable_file(path) {
        return Ok(());
    }
    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("Failed to get metadata: {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to set permissions: {}", path.display()))
}

/// Sets executable permissions (no-op on Windows).
#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
pub fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
