//! Shell integration snippets.
//!
//! `bunenv init` prints a snippet meant to be evaluated from a shell profile:
//!
//! ```bash
//! eval "$(bunenv init)"
//! ```
//!
//! It puts the shims directory first on `PATH`, exports `BUNENV_ROOT` and
//! regenerates shims once per shell startup.

use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result};

/// Supported shells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    /// Detects the user's shell from the `SHELL` environment variable.
    ///
    /// Returns `None` if `SHELL` is unset or names an unsupported shell.
    #[must_use]
    pub fn detect() -> Option<Self> {
        let shell_path = std::env::var("SHELL").ok()?;
        Self::from_name(&shell_path)
    }

    /// Parses a shell name or path such as `zsh` or `/usr/bin/fish`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let shell_name = Path::new(name.trim()).file_name()?.to_str()?;
        match shell_name {
            "bash" => Some(Self::Bash),
            "zsh" => Some(Self::Zsh),
            "fish" => Some(Self::Fish),
            _ => None,
        }
    }

    /// Generates the integration snippet for this shell.
    #[must_use]
    pub fn init_script(self, shims_dir: &Path, root: &Path) -> String {
        match self {
            Self::Bash | Self::Zsh => format!(
                "# bunenv shell integration\n\
                 export PATH=\"{shims}:$PATH\"\n\
                 export BUNENV_ROOT=\"{root}\"\n\
                 \n\
                 bunenv_init() {{\n\
                 \x20 command bunenv rehash 2>/dev/null\n\
                 }}\n\
                 \n\
                 bunenv_init\n",
                shims = escape_double_quoted(shims_dir),
                root = escape_double_quoted(root),
            ),
            Self::Fish => format!(
                "# bunenv shell integration\n\
                 set -gx PATH {shims} $PATH\n\
                 set -gx BUNENV_ROOT {root}\n\
                 \n\
                 function bunenv_init\n\
                 \x20 command bunenv rehash 2>/dev/null\n\
                 end\n\
                 \n\
                 bunenv_init\n",
                shims = quote_fish(shims_dir),
                root = quote_fish(root),
            ),
        }
    }
}

/// Escapes `$`, backticks, `"` and `\` for use inside POSIX double quotes.
fn escape_double_quoted(path: &Path) -> String {
    path.display()
        .to_string()
        .replace('\\', "\\\\")
        .replace('$', "\\$")
        .replace('`', "\\`")
        .replace('"', "\\\"")
}

/// Single-quotes a path for fish, which expands nothing inside single quotes.
fn quote_fish(path: &Path) -> String {
    let escaped = path
        .display()
        .to_string()
        .replace('\\', "\\\\")
        .replace('\'', "\\'");
    format!("'{escaped}'")
}

/// Returns `PATH` with `dir` as its first entry.
///
/// Any other occurrence of `dir` is dropped, so an existing entry further
/// down cannot be shadowed by something ahead of it.
///
/// Used by `bunenv shell` so the subshell resolves `bun` through the shims.
///
/// # Errors
///
/// Returns an error if `dir` cannot be placed in `PATH`, for example because
/// it contains the platform's path separator.
pub fn path_with_prepended(dir: &Path, current: Option<OsString>) -> Result<OsString> {
    let rest = current
        .as_deref()
        .map(|p| std::env::split_paths(p).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .filter(|entry| entry != dir);

    std::env::join_paths(std::iter::once(dir.to_path_buf()).chain(rest))
        .with_context(|| format!("Cannot add {} to PATH", dir.display()))
}
