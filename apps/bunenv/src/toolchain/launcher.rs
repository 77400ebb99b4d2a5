//! Runtime behavior of a shim.
//!
//! When invoked as `N ARGS`, a shim decides on one of four outcomes:
//!
//! ```text
//! START ── N == "bunenv" ──────────────────────────────▶ run management CLI
//!   │
//!   └─ resolve ── found & installed ──────────────────▶ run versions/V/bin/N
//!        │
//!        └─ not found / not installed ── N == "bun"
//!              and ~/.bun/bin/bun exists ─────────────▶ warn, run system bun
//!              otherwise ─────────────────────────────▶ print error, exit 1
//! ```
//!
//! [`plan`] computes the outcome without side effects; [`exec`] carries it out.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::paths::{
    BunenvPaths, CLI_NAME, PRIMARY_EXECUTABLE, executable_file_name, is_executable_file,
};
use super::resolver::VersionResolver;

/// What a shim should do for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Run the management CLI, bypassing version resolution.
    Management(PathBuf),
    /// Run an executable from the resolved version.
    Versioned {
        /// Executable to run.
        program: PathBuf,
        /// Version it belongs to.
        version: String,
    },
    /// Warn, then run the system-wide Bun.
    Fallback {
        /// The system Bun executable.
        program: PathBuf,
        /// Warning printed to stderr first.
        warning: String,
    },
    /// Print the message to stderr and exit with status 1.
    Fail(String),
}

/// Derives the shim name from `argv[0]`.
///
/// The directory part and, on Windows, the `.exe` suffix are removed.
#[must_use]
pub fn invoked_name(argv0: &OsStr) -> Option<String> {
    let file_name = Path::new(argv0).file_name()?.to_str()?;
    let name = strip_exe_suffix(file_name, std::env::consts::EXE_SUFFIX);
    (!name.is_empty()).then(|| name.to_string())
}

/// Removes `suffix` from the end of `file_name`, ignoring ASCII case.
fn strip_exe_suffix<'a>(file_name: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return file_name;
    }
    file_name
        .len()
        .checked_sub(suffix.len())
        .and_then(|cut| Some((file_name.get(..cut)?, file_name.get(cut..)?)))
        .filter(|(_, tail)| tail.eq_ignore_ascii_case(suffix))
        .map_or(file_name, |(stem, _)| stem)
}

/// Returns the system-wide Bun installation used as a fallback.
#[must_use]
pub fn system_bun(home: &Path) -> PathBuf {
    home.join(".bun")
        .join("bin")
        .join(executable_file_name(PRIMARY_EXECUTABLE))
}

/// Decides what a shim named `name` should run from `cwd`.
#[must_use]
pub fn plan(
    name: &str,
    cwd: &Path,
    paths: &BunenvPaths,
    resolver: &VersionResolver<'_>,
    home: Option<&Path>,
) -> Dispatch {
    if name == CLI_NAME {
        return match find_management_cli(home, &paths.shims, cwd) {
            Some(program) => Dispatch::Management(program),
            None => Dispatch::Fail(
                "bunenv: could not find the bunenv executable. Please reinstall bunenv."
                    .to_string(),
            ),
        };
    }

    let Some(resolved) = resolver.resolve(cwd) else {
        return fallback_or_fail(name, None, home);
    };
    let version = resolved.version;

    if !is_executable_file(&paths.bun_binary(&version)) {
        return fallback_or_fail(name, Some(&version), home);
    }

    let program = paths.executable_path(&version, name);
    if !is_executable_file(&program) {
        return Dispatch::Fail(format!("bunenv: '{name}' is not provided by Bun {version}."));
    }

    debug!(program = %program.display(), %version, "dispatching shim");
    Dispatch::Versioned { program, version }
}

fn fallback_or_fail(name: &str, version: Option<&str>, home: Option<&Path>) -> Dispatch {
    if name == PRIMARY_EXECUTABLE
        && let Some(home) = home
    {
        let program = system_bun(home);
        if is_executable_file(&program) {
            let warning = match version {
                None => {
                    "bunenv: warning: no version specified, using system bun instead.".to_string()
                }
                Some(v) => format!(
                    "bunenv: warning: version '{v}' is not installed, using system bun instead."
                ),
            };
            return Dispatch::Fallback { program, warning };
        }
    }

    Dispatch::Fail(match version {
        None => "bunenv: no Bun version specified. Set BUNENV_VERSION or add a .bun-version file."
            .to_string(),
        Some(v) => format!(
            "bunenv: version '{v}' is not installed. Run 'bunenv install {v}' to install it."
        ),
    })
}

/// Finds the real `bunenv` executable outside the shims directory.
///
/// `~/.cargo/bin/bunenv` is preferred; otherwise `PATH` is searched with the
/// shims directory removed.
fn find_management_cli(home: Option<&Path>, shims_dir: &Path, cwd: &Path) -> Option<PathBuf> {
    if let Some(home) = home {
        let cargo_bin = home
            .join(".cargo")
            .join("bin")
            .join(executable_file_name(CLI_NAME));
        if is_executable_file(&cargo_bin) {
            return Some(cargo_bin);
        }
    }

    let path = std::env::var_os("PATH")?;
    let search: Vec<PathBuf> = std::env::split_paths(&path)
        .filter(|dir| !same_dir(dir, shims_dir))
        .collect();
    let search = std::env::join_paths(search).ok()?;
    which::which_in(CLI_NAME, Some(search), cwd).ok()
}

fn same_dir(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Replaces the current process with `program ARGS`.
///
/// Only returns if the exec itself fails.
///
/// # Errors
///
/// Returns an error describing why `program` could not be started.
#[cfg(unix)]
pub fn exec(program: &Path, args: &[OsString]) -> Result<i32> {
    use std::os::unix::process::CommandExt;

    let err = std::process::Command::new(program).args(args).exec();
    Err(err).with_context(|| format!("Failed to execute {}", program.display()))
}

/// Runs `program ARGS` and returns its exit code.
///
/// # Errors
///
/// Returns an error if `program` could not be started.
#[cfg(not(unix))]
pub fn exec(program: &Path, args: &[OsString]) -> Result<i32> {
    let status = std::process::Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("Failed to execute {}", program.display()))?;
    Ok(status.code().unwrap_or(1))
}
