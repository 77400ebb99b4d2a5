//! Path management for bunenv.
//!
//! The install root defaults to `~/.bunenv/` and can be overridden by setting
//! the `BUNENV_ROOT` environment variable. The root is read once, when
//! [`BunenvPaths::new`] runs, and every other location is derived from it.
//!
//! ## Directory Structure
//!
//! ```text
//! ~/.bunenv/                  # Root directory (or BUNENV_ROOT)
//!   versions/                 # Installed Bun versions
//!     1.1.0/
//!       bin/
//!         bun                 # Primary executable
//!         bunx                # Optional bundled executables
//!   shims/                    # One launcher per managed executable name
//!     bun
//!     bunx
//!   downloads/                # Temporary download area
//!   version                   # Global version marker
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable to override the install root.
pub const BUNENV_ROOT_ENV: &str = "BUNENV_ROOT";

/// Environment variable holding the highest-precedence version selector.
pub const BUNENV_VERSION_ENV: &str = "BUNENV_VERSION";

/// Name of the per-project version marker file.
pub const LOCAL_VERSION_FILE: &str = ".bun-version";

/// Name of the project manifest consulted for `engines.bun`.
pub const MANIFEST_FILE: &str = "package.json";

/// Name of the global version marker under the root.
const GLOBAL_VERSION_FILE: &str = "version";

/// Name of the primary managed executable.
pub const PRIMARY_EXECUTABLE: &str = "bun";

/// Name of the management CLI.
pub const CLI_NAME: &str = "bunenv";

/// Well-known locations of a bunenv installation.
///
/// All fields are derived from `root` at construction time, so a single
/// value gives a consistent view for the lifetime of a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BunenvPaths {
    /// Root directory for all bunenv data (`~/.bunenv` or `BUNENV_ROOT`).
    pub root: PathBuf,
    /// Directory containing installed versions.
    pub versions: PathBuf,
    /// Directory containing generated shims.
    pub shims: PathBuf,
    /// Directory for in-flight downloads.
    pub downloads: PathBuf,
}

impl BunenvPaths {
    /// Creates a new `BunenvPaths` from the environment.
    ///
    /// The root directory is `BUNENV_ROOT` when set and non-empty, otherwise
    /// `.bunenv` in the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let root = match std::env::var_os(BUNENV_ROOT_ENV) {
            Some(root) if !root.is_empty() => PathBuf::from(root),
            _ => dirs::home_dir()
                .context("Cannot determine home directory. Set BUNENV_ROOT environment variable.")?
                .join(".bunenv"),
        };

        Ok(Self::with_root(root))
    }

    /// Creates a new `BunenvPaths` with a specific root directory.
    #[must_use = "returns new paths instance without side effects"]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            versions: root.join("versions"),
            shims: root.join("shims"),
            downloads: root.join("downloads"),
            root,
        }
    }

    /// Returns the installation directory of a version.
    #[must_use = "returns the path without side effects"]
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.versions.join(version)
    }

    /// Returns the `bin` directory of a version.
    #[must_use = "returns the path without side effects"]
    pub fn bin_dir(&self, version: &str) -> PathBuf {
        self.version_dir(version).join("bin")
    }

    /// Returns the path of a named executable inside a version's `bin` directory.
    #[must_use = "returns the path without side effects"]
    pub fn executable_path(&self, version: &str, name: &str) -> PathBuf {
        self.bin_dir(version).join(executable_file_name(name))
    }

    /// Returns the path of the primary `bun` executable of a version.
    #[must_use = "returns the path without side effects"]
    pub fn bun_binary(&self, version: &str) -> PathBuf {
        self.executable_path(version, PRIMARY_EXECUTABLE)
    }

    /// Returns the path of the shim for an executable name.
    #[must_use = "returns the path without side effects"]
    pub fn shim_path(&self, name: &str) -> PathBuf {
        self.shims.join(executable_file_name(name))
    }

    /// Returns the path to the global version marker.
    #[must_use = "returns the path without side effects"]
    pub fn global_version_file(&self) -> PathBuf {
        self.root.join(GLOBAL_VERSION_FILE)
    }

    /// Reads the global version marker.
    ///
    /// Returns `None` when the file is missing, unreadable or blank.
    #[must_use]
    pub fn global_version(&self) -> Option<String> {
        read_marker(&self.global_version_file())
    }

    /// Writes the global version marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory or the marker cannot be written.
    pub fn set_global_version(&self, version: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create directory: {}", self.root.display()))?;
        let file = self.global_version_file();
        std::fs::write(&file, version)
            .with_context(|| format!("Failed to write global version to {}", file.display()))
    }

    /// Ensures the root, versions and shims directories exist.
    ///
    /// # Errors
    ///
    /// Returns an error if any directory cannot be created.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.root, &self.versions, &self.shims] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }
}

/// Returns the on-disk file name of an executable for the current platform.
#[must_use]
pub fn executable_file_name(name: &str) -> String {
    format!("{name}{}", std::env::consts::EXE_SUFFIX)
}

/// Writes the per-project marker in `dir` and returns its path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_local_version(dir: &Path, version: &str) -> Result<PathBuf> {
    let file = dir.join(LOCAL_VERSION_FILE);
    std::fs::write(&file, version)
        .with_context(|| format!("Failed to write local version to {}", file.display()))?;
    Ok(file)
}

/// Reads a marker file and returns its trimmed content.
///
/// Missing, unreadable and blank files all yield `None`.
#[must_use]
pub fn read_marker(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Returns whether `path` is a regular file the current user may execute.
///
/// On Windows every regular file counts, since executability is decided by
/// the file extension instead of permission bits.
#[must_use]
pub fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_test_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("bunenv_test_{}_{}", name, rand::random::<u64>()));
        std::fs::create_dir_all(&dir).expect("Should create temp dir");
        dir
    }

    #[test]
    fn layout_is_derived_from_root() {
        let root = env::temp_dir().join("bunenv_test_root");
        let paths = BunenvPaths::with_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.versions, root.join("versions"));
        assert_eq!(paths.shims, root.join("shims"));
        assert_eq!(paths.global_version_file(), root.join("version"));
    }

    #[test]
    fn bun_binary_lives_in_version_bin_dir() {
        let paths = BunenvPaths::with_root(PathBuf::from("/opt/bunenv"));
        let expected = PathBuf::from("/opt/bunenv/versions/1.1.0/bin")
            .join(format!("bun{}", env::consts::EXE_SUFFIX));
        assert_eq!(paths.bun_binary("1.1.0"), expected);
    }

    #[test]
    #[serial_test::serial]
    fn new_respects_root_override() {
        let root = temp_test_dir("root_env");
        // SAFETY: guarded by `serial` so no other test reads the environment concurrently.
        unsafe { env::set_var(BUNENV_ROOT_ENV, &root) };
        let paths = BunenvPaths::new().expect("Should resolve paths");
        unsafe { env::remove_var(BUNENV_ROOT_ENV) };

        assert_eq!(paths.root, root);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    #[serial_test::serial]
    fn new_ignores_empty_root_override() {
        // SAFETY: guarded by `serial` so no other test reads the environment concurrently.
        unsafe { env::set_var(BUNENV_ROOT_ENV, "") };
        let paths = BunenvPaths::new();
        unsafe { env::remove_var(BUNENV_ROOT_ENV) };

        if let Ok(paths) = paths {
            assert!(paths.root.ends_with(".bunenv"));
        }
    }

    #[test]
    fn global_version_round_trips_without_whitespace() {
        let root = temp_test_dir("global_round_trip");
        let paths = BunenvPaths::with_root(root.join("nested"));

        paths.set_global_version("1.0.0").expect("Should write");

        let raw = std::fs::read_to_string(paths.global_version_file()).expect("Should read");
        assert_eq!(raw, "1.0.0");
        assert_eq!(paths.global_version().as_deref(), Some("1.0.0"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn blank_marker_reads_as_none() {
        let dir = temp_test_dir("blank_marker");
        let marker = dir.join(LOCAL_VERSION_FILE);
        std::fs::write(&marker, "  \n\t").expect("Should write");

        assert_eq!(read_marker(&marker), None);
        assert_eq!(read_marker(&dir.join("missing")), None);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn local_marker_is_written_in_given_directory() {
        let dir = temp_test_dir("local_marker");

        let file = write_local_version(&dir, "1.2.3").expect("Should write");

        assert_eq!(file, dir.join(".bun-version"));
        assert_eq!(read_marker(&file).as_deref(), Some("1.2.3"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn executable_check_uses_mode_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = temp_test_dir("exec_bits");
        let file = dir.join("tool");
        std::fs::write(&file, "#!/bin/sh\n").expect("Should write");

        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!is_executable_file(&file));

        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(is_executable_file(&file));

        assert!(!is_executable_file(&dir));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
