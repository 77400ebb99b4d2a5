//! PATH conflict detection.
//!
//! A `bun` found on `PATH` before the shims directory bypasses version
//! resolution entirely, which is the most common reason `bun --version`
//! disagrees with `bunenv version`.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::paths::{PRIMARY_EXECUTABLE, executable_file_name};

/// A managed executable that resolves somewhere other than its shim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConflict {
    /// Name of the executable (e.g. `bun`).
    pub binary: String,
    /// Where `PATH` lookup actually lands.
    pub found: PathBuf,
    /// The shim that should have been found.
    pub expected: PathBuf,
}

/// Detects whether `bun` on the current `PATH` resolves outside `shims_dir`.
#[must_use]
pub fn detect_path_conflicts(shims_dir: &Path) -> Vec<PathConflict> {
    let Some(path) = std::env::var_os("PATH") else {
        return Vec::new();
    };
    let cwd = std::env::current_dir().unwrap_or_else(|_| shims_dir.to_path_buf());
    detect_in(shims_dir, &path, &cwd)
}

fn detect_in(shims_dir: &Path, path: &OsStr, cwd: &Path) -> Vec<PathConflict> {
    let binary = executable_file_name(PRIMARY_EXECUTABLE);
    let expected = shims_dir.join(&binary);

    match which::which_in(PRIMARY_EXECUTABLE, Some(path), cwd) {
        Ok(found) if found.parent() != Some(shims_dir) => vec![PathConflict {
            binary,
            found,
            expected,
        }],
        _ => Vec::new(),
    }
}

/// Formats a warning describing PATH conflicts.
///
/// Returns an empty string when there are none.
#[must_use]
pub fn format_conflict_warning(conflicts: &[PathConflict]) -> String {
    if conflicts.is_empty() {
        return String::new();
    }

    let mut lines = vec!["Warning: PATH conflict detected".to_string()];

    for conflict in conflicts {
        lines.push(format!(
            "  '{}' found at: {}",
            conflict.binary,
            conflict.found.display()
        ));
        lines.push(format!("  Expected:        {}", conflict.expected.display()));
    }

    lines.push(String::new());
    lines.push("bunenv shims may not be used. To fix:".to_string());

    if let Some(parent) = conflicts.first().and_then(|c| c.expected.parent()) {
        lines.push(format!(
            "  - Put {} before other paths in $PATH (see 'bunenv init')",
            parent.display()
        ));
    }

    lines.push("  - Run 'bunenv doctor' for more information".to_string());

    lines.join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::toolchain::shims::make_executable;

    fn temp_test_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("bunenv_test_{}_{}", name, rand::random::<u64>()));
        std::fs::create_dir_all(&dir).expect("Should create temp dir");
        dir
    }

    fn fake_bun(dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        let bun = dir.join("bun");
        std::fs::write(&bun, "#!/bin/sh\n").unwrap();
        make_executable(&bun).unwrap();
    }

    #[test]
    fn bun_ahead_of_shims_is_a_conflict() {
        let dir = temp_test_dir("conflict_ahead");
        let system = dir.join("system");
        let shims = dir.join("shims");
        fake_bun(&system);
        fake_bun(&shims);
        let path = std::env::join_paths([&system, &shims]).unwrap();

        let conflicts = detect_in(&shims, &path, &dir);

        assert_eq!(
            conflicts,
            vec![PathConflict {
                binary: "bun".to_string(),
                found: system.join("bun"),
                expected: shims.join("bun"),
            }]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn shims_first_is_not_a_conflict() {
        let dir = temp_test_dir("conflict_first");
        let system = dir.join("system");
        let shims = dir.join("shims");
        fake_bun(&system);
        fake_bun(&shims);
        let path = std::env::join_paths([&shims, &system]).unwrap();

        assert!(detect_in(&shims, &path, &dir).is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn warning_lists_found_and_expected() {
        let conflicts = vec![PathConflict {
            binary: "bun".to_string(),
            found: PathBuf::from("/usr/local/bin/bun"),
            expected: PathBuf::from("/home/u/.bunenv/shims/bun"),
        }];

        let warning = format_conflict_warning(&conflicts);

        assert!(warning.starts_with("Warning: PATH conflict detected"));
        assert!(warning.contains("'bun' found at: /usr/local/bin/bun"));
        assert!(warning.contains("Expected:        /home/u/.bunenv/shims/bun"));
        assert!(warning.contains("Put /home/u/.bunenv/shims before other paths"));
        assert!(format_conflict_warning(&[]).is_empty());
    }
}
