//! Health checks for `bunenv doctor`.
//!
//! ## Checks Performed
//!
//! - Platform detection
//! - Install root existence
//! - Shims directory on `PATH`
//! - Shim launcher next to the `bunenv` executable
//! - Installed versions
//! - Global version installed
//! - Effective version for the current directory
//! - `bun` on `PATH` ahead of the shims

use std::ffi::OsStr;
use std::path::Path;

use super::conflict::detect_path_conflicts;
use super::inventory::{is_installed, list_installed};
use super::paths::BunenvPaths;
use super::platform::Platform;
use super::resolver::VersionResolver;
use super::shims::locate_launcher;

/// Status of a doctor check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoctorCheckStatus {
    /// Check passed.
    Ok,
    /// Check passed with warnings.
    Warning,
    /// Check failed.
    Error,
}

/// Result of a single doctor check.
#[derive(Debug, Clone)]
pub struct DoctorCheck {
    /// Name of the check.
    pub name: String,
    /// Status of the check.
    pub status: DoctorCheckStatus,
    /// Descriptive message.
    pub message: String,
}

impl DoctorCheck {
    /// Creates a new check with Ok status.
    #[must_use]
    pub fn ok(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DoctorCheckStatus::Ok,
            message: message.into(),
        }
    }

    /// Creates a new check with Warning status.
    #[must_use]
    pub fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DoctorCheckStatus::Warning,
            message: message.into(),
        }
    }

    /// Creates a new check with Error status.
    #[must_use]
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DoctorCheckStatus::Error,
            message: message.into(),
        }
    }

    /// Returns the CLI prefix for this check status.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self.status {
            DoctorCheckStatus::Ok => "[OK]",
            DoctorCheckStatus::Warning => "[WARN]",
            DoctorCheckStatus::Error => "[FAIL]",
        }
    }
}

/// Runs all doctor checks for `cwd`.
#[must_use]
pub fn run_all_checks(paths: &BunenvPaths, cwd: &Path) -> Vec<DoctorCheck> {
    let path_var = std::env::var_os("PATH");
    vec![
        check_platform(),
        check_install_root(paths),
        check_shims_on_path(paths, path_var.as_deref()),
        check_launcher(),
        check_installed_versions(paths),
        check_global_version(paths),
        check_effective_version(&VersionResolver::new(paths), paths, cwd),
        check_path_conflicts(paths),
    ]
}

/// Checks platform detection.
#[must_use]
pub fn check_platform() -> DoctorCheck {
    match Platform::detect() {
        Ok(platform) => DoctorCheck::ok("Platform", format!("Detected {platform}")),
        Err(e) => DoctorCheck::error("Platform", format!("Detection failed: {e}")),
    }
}

/// Checks that the install root exists.
#[must_use]
pub fn check_install_root(paths: &BunenvPaths) -> DoctorCheck {
    if paths.root.is_dir() {
        DoctorCheck::ok("Install root", format!("Found at {}", paths.root.display()))
    } else {
        DoctorCheck::warning(
            "Install root",
            format!(
                "Not found at {}. Run 'bunenv install' to create it.",
                paths.root.display()
            ),
        )
    }
}

/// Checks that the shims directory is on `path_var`.
#[must_use]
pub fn check_shims_on_path(paths: &BunenvPaths, path_var: Option<&OsStr>) -> DoctorCheck {
    let on_path = path_var.is_some_and(|p| std::env::split_paths(p).any(|dir| dir == paths.shims));

    if on_path {
        DoctorCheck::ok("Shims on PATH", format!("{} is on PATH", paths.shims.display()))
    } else {
        DoctorCheck::error(
            "Shims on PATH",
            format!(
                "{} is not on PATH. Add 'eval \"$(bunenv init)\"' to your shell profile.",
                paths.shims.display()
            ),
        )
    }
}

/// Checks that the shim launcher sits next to the running executable.
#[must_use]
pub fn check_launcher() -> DoctorCheck {
    match locate_launcher() {
        Ok(path) => DoctorCheck::ok("Shim launcher", format!("Found at {}", path.display())),
        Err(e) => DoctorCheck::error("Shim launcher", e.to_string()),
    }
}

/// Checks that at least one version is installed.
#[must_use]
pub fn check_installed_versions(paths: &BunenvPaths) -> DoctorCheck {
    let installed = list_installed(paths);
    if installed.is_empty() {
        DoctorCheck::warning(
            "Installed versions",
            "No Bun versions installed. Run 'bunenv install' to install one.",
        )
    } else {
        DoctorCheck::ok("Installed versions", installed.join(", "))
    }
}

/// Checks that the global version, if set, is installed.
#[must_use]
pub fn check_global_version(paths: &BunenvPaths) -> DoctorCheck {
    let installed = list_installed(paths);
    match paths.global_version() {
        Some(version) if is_installed(paths, &version) => {
            DoctorCheck::ok("Global version", format!("Set to {version}"))
        }
        Some(version) => DoctorCheck::error(
            "Global version",
            format!(
                "{version} is set as global but not installed. Run 'bunenv install {version}'."
            ),
        ),
        None => match installed.last() {
            Some(latest) => DoctorCheck::warning(
                "Global version",
                format!("No global version set. Run 'bunenv global {latest}' to set one."),
            ),
            None => DoctorCheck::warning(
                "Global version",
                "No global version set. Run 'bunenv install' first.",
            ),
        },
    }
}

/// Checks which version applies in `cwd` and whether it is installed.
#[must_use]
pub fn check_effective_version(
    resolver: &VersionResolver<'_>,
    paths: &BunenvPaths,
    cwd: &Path,
) -> DoctorCheck {
    match resolver.resolve(cwd) {
        Some(resolved) if is_installed(paths, &resolved.version) => DoctorCheck::ok(
            "Effective version",
            format!("{} (set by {})", resolved.version, resolved.source),
        ),
        Some(resolved) => DoctorCheck::error(
            "Effective version",
            format!(
                "{} (set by {}) is not installed. Run 'bunenv install {}'.",
                resolved.selector, resolved.source, resolved.version
            ),
        ),
        None => DoctorCheck::warning("Effective version", "No version applies in this directory."),
    }
}

/// Checks whether `bun` on `PATH` resolves through the shims.
#[must_use]
pub fn check_path_conflicts(paths: &BunenvPaths) -> DoctorCheck {
    match detect_path_conflicts(&paths.shims).first() {
        Some(conflict) => DoctorCheck::warning(
            "PATH conflicts",
            format!(
                "'{}' resolves to {} instead of {}",
                conflict.binary,
                conflict.found.display(),
                conflict.expected.display()
            ),
        ),
        None => DoctorCheck::ok("PATH conflicts", "None found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::shims::make_executable;
    use std::path::PathBuf;

    fn temp_test_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("bunenv_test_{}_{}", name, rand::random::<u64>()));
        std::fs::create_dir_all(&dir).expect("Should create temp dir");
        dir
    }

    fn install_fake(paths: &BunenvPaths, version: &str) {
        std::fs::create_dir_all(paths.bin_dir(version)).unwrap();
        std::fs::write(paths.bun_binary(version), "bun").unwrap();
        make_executable(&paths.bun_binary(version)).unwrap();
    }

    #[test]
    fn doctor_check_prefix_returns_correct_strings() {
        assert_eq!(DoctorCheck::ok("test", "message").prefix(), "[OK]");
        assert_eq!(DoctorCheck::warning("test", "message").prefix(), "[WARN]");
        assert_eq!(DoctorCheck::error("test", "message").prefix(), "[FAIL]");
    }

    #[test]
    fn missing_root_is_a_warning() {
        let dir = temp_test_dir("doctor_root");
        let paths = BunenvPaths::with_root(dir.join("absent"));

        assert_eq!(check_install_root(&paths).status, DoctorCheckStatus::Warning);
        assert_eq!(
            check_install_root(&BunenvPaths::with_root(dir.clone())).status,
            DoctorCheckStatus::Ok
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn shims_must_be_on_path() {
        let paths = BunenvPaths::with_root(PathBuf::from("/opt/bunenv"));
        let with = std::env::join_paths([PathBuf::from("/usr/bin"), paths.shims.clone()]).unwrap();
        let without = std::env::join_paths([PathBuf::from("/usr/bin")]).unwrap();

        assert_eq!(
            check_shims_on_path(&paths, Some(&with)).status,
            DoctorCheckStatus::Ok
        );
        assert_eq!(
            check_shims_on_path(&paths, Some(&without)).status,
            DoctorCheckStatus::Error
        );
        assert_eq!(check_shims_on_path(&paths, None).status, DoctorCheckStatus::Error);
    }

    #[test]
    fn global_version_must_be_installed() {
        let dir = temp_test_dir("doctor_global");
        let paths = BunenvPaths::with_root(dir.clone());
        install_fake(&paths, "1.0.0");

        let unset = check_global_version(&paths);
        assert_eq!(unset.status, DoctorCheckStatus::Warning);
        assert!(unset.message.contains("bunenv global 1.0.0"));

        paths.set_global_version("2.0.0").unwrap();
        assert_eq!(check_global_version(&paths).status, DoctorCheckStatus::Error);

        paths.set_global_version("1.0.0").unwrap();
        assert_eq!(check_global_version(&paths).status, DoctorCheckStatus::Ok);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn effective_version_reports_source() {
        let dir = temp_test_dir("doctor_effective");
        let paths = BunenvPaths::with_root(dir.join("root"));
        install_fake(&paths, "1.1.0");

        let resolver = VersionResolver::with_env_version(&paths, Some("1.1.0".to_string()));
        let check = check_effective_version(&resolver, &paths, &dir);
        assert_eq!(check.status, DoctorCheckStatus::Ok);
        assert_eq!(check.message, "1.1.0 (set by BUNENV_VERSION environment variable)");

        let resolver = VersionResolver::with_env_version(&paths, Some("^2".to_string()));
        let check = check_effective_version(&resolver, &paths, &dir);
        assert_eq!(check.status, DoctorCheckStatus::Error);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_inventory_is_a_warning() {
        let dir = temp_test_dir("doctor_inventory");
        let paths = BunenvPaths::with_root(dir.clone());

        assert_eq!(
            check_installed_versions(&paths).status,
            DoctorCheckStatus::Warning
        );
        install_fake(&paths, "1.0.0");
        let check = check_installed_versions(&paths);
        assert_eq!(check.status, DoctorCheckStatus::Ok);
        assert_eq!(check.message, "1.0.0");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
