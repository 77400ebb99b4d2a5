//! Installed version inventory.
//!
//! A version counts as installed when its directory name under `versions/`
//! parses as a semantic version. Whether it is usable is decided separately
//! by [`is_installed`], which looks for the primary executable.

use std::path::PathBuf;

use semver::Version;

use super::paths::{BunenvPaths, is_executable_file};

/// A directory found under `versions/`, valid or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// Directory name.
    pub name: String,
    /// Full path of the directory.
    pub path: PathBuf,
    /// Whether the name parses as a version and the `bun` binary exists.
    pub valid: bool,
}

/// Lists installed versions in ascending semantic-version order.
///
/// Entries whose names are not valid versions are skipped. A missing or
/// unreadable versions directory yields an empty list.
#[must_use]
pub fn list_installed(paths: &BunenvPaths) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(&paths.versions) else {
        return Vec::new();
    };

    let mut versions: Vec<(Version, String)> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter_map(|name| Version::parse(&name).ok().map(|v| (v, name)))
        .collect();

    versions.sort_by(|a, b| a.0.cmp(&b.0));
    versions.into_iter().map(|(_, name)| name).collect()
}

/// Returns whether a version's primary executable exists and is executable.
///
/// Uses the same test as the shim launcher, so a version the CLI accepts is
/// one the shims can run.
#[must_use]
pub fn is_installed(paths: &BunenvPaths, version: &str) -> bool {
    is_executable_file(&paths.bun_binary(version))
}

/// Lists every directory under `versions/`, marking which are usable.
///
/// Valid entries come first in version order, followed by the rest sorted
/// by name.
#[must_use]
pub fn list_entries(paths: &BunenvPaths) -> Vec<VersionEntry> {
    let installed = list_installed(paths);

    let mut entries: Vec<VersionEntry> = installed
        .iter()
        .map(|name| VersionEntry {
            name: name.clone(),
            path: paths.version_dir(name),
            valid: is_installed(paths, name),
        })
        .collect();

    let Ok(dir) = std::fs::read_dir(&paths.versions) else {
        return entries;
    };

    let mut others: Vec<VersionEntry> = dir
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            (!installed.contains(&name)).then(|| VersionEntry {
                name,
                path: entry.path(),
                valid: false,
            })
        })
        .collect();
    others.sort_by(|a, b| a.name.cmp(&b.name));

    entries.extend(others);
    entries
}
