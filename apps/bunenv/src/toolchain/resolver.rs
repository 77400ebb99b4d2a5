//! Effective version resolution.
//!
//! The effective Bun version for a directory is taken from the first source
//! that yields a selector:
//!
//! 1. `BUNENV_VERSION`
//! 2. the nearest `.bun-version`, searching from the directory to the root
//! 3. the nearest `package.json` with a string `engines.bun`
//! 4. the global marker `<root>/version`
//!
//! The selector is then expanded against the installed versions (see
//! [`resolve_selector`]). The CLI and the shim launcher both go through
//! [`VersionResolver`], so they always agree.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::inventory::list_installed;
use super::paths::{
    BUNENV_VERSION_ENV, BunenvPaths, LOCAL_VERSION_FILE, MANIFEST_FILE, read_marker,
};
use super::selector::resolve_selector;

/// Where a selector was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// The `BUNENV_VERSION` environment variable.
    Environment,
    /// A per-project `.bun-version` file.
    LocalFile(PathBuf),
    /// `engines.bun` in a `package.json`.
    Manifest(PathBuf),
    /// The global marker under the install root.
    GlobalFile(PathBuf),
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => write!(f, "{BUNENV_VERSION_ENV} environment variable"),
            Self::LocalFile(path) | Self::GlobalFile(path) => write!(f, "{}", path.display()),
            Self::Manifest(path) => write!(f, "{} (engines.bun)", path.display()),
        }
    }
}

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// The expanded version (or the original selector if nothing matched).
    pub version: String,
    /// The selector as written in its source, trimmed.
    pub selector: String,
    /// Where the selector came from.
    pub source: VersionSource,
}

/// Resolves the effective version for a directory.
#[derive(Debug, Clone)]
pub struct VersionResolver<'a> {
    paths: &'a BunenvPaths,
    env_version: Option<String>,
}

impl<'a> VersionResolver<'a> {
    /// Creates a resolver that reads `BUNENV_VERSION` from the process environment.
    #[must_use]
    pub fn new(paths: &'a BunenvPaths) -> Self {
        Self::with_env_version(paths, std::env::var(BUNENV_VERSION_ENV).ok())
    }

    /// Creates a resolver with an explicit value for `BUNENV_VERSION`.
    #[must_use]
    pub fn with_env_version(paths: &'a BunenvPaths, env_version: Option<String>) -> Self {
        let env_version = env_version
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Self { paths, env_version }
    }

    /// Resolves the effective version for `cwd`.
    ///
    /// Returns `None` when no source provides a selector.
    #[must_use]
    pub fn resolve(&self, cwd: &Path) -> Option<ResolvedVersion> {
        let (selector, source) = self.find_selector(cwd)?;
        let version = resolve_selector(&selector, &list_installed(self.paths));
        debug!(%selector, %version, %source, "resolved Bun version");
        Some(ResolvedVersion {
            version,
            selector,
            source,
        })
    }

    /// Finds the raw selector and its source without expanding it.
    #[must_use]
    pub fn find_selector(&self, cwd: &Path) -> Option<(String, VersionSource)> {
        if let Some(version) = &self.env_version {
            return Some((version.clone(), VersionSource::Environment));
        }

        if let Some((path, content)) = find_local_marker(cwd) {
            match content {
                Some(version) => return Some((version, VersionSource::LocalFile(path))),
                None => debug!(path = %path.display(), "empty version marker, skipping"),
            }
        }

        if let Some((path, version)) = find_manifest_engine(cwd) {
            return Some((version, VersionSource::Manifest(path)));
        }

        let global = self.paths.global_version_file();
        match read_marker(&global) {
            Some(version) => Some((version, VersionSource::GlobalFile(global))),
            None => {
                debug!("no version selector found");
                None
            }
        }
    }
}

/// Finds the nearest readable `.bun-version`, starting at `start`.
///
/// Returns the marker's path and its trimmed content, or `None` content if
/// the marker is blank. Unreadable markers are skipped as if absent.
#[must_use]
pub fn find_local_marker(start: &Path) -> Option<(PathBuf, Option<String>)> {
    start.ancestors().find_map(|dir| {
        let path = dir.join(LOCAL_VERSION_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        let trimmed = content.trim();
        debug!(path = %path.display(), "found version marker");
        let version = (!trimmed.is_empty()).then(|| trimmed.to_string());
        Some((path, version))
    })
}

/// Finds the nearest `package.json` declaring `engines.bun`, starting at `start`.
///
/// Manifests that are unreadable, malformed, or lack a non-empty string
/// `engines.bun` are skipped and the search continues upward.
#[must_use]
pub fn find_manifest_engine(start: &Path) -> Option<(PathBuf, String)> {
    start.ancestors().find_map(|dir| {
        let path = dir.join(MANIFEST_FILE);
        let version = read_manifest_engine(&path)?;
        Some((path, version))
    })
}

/// Reads `engines.bun` from a manifest file.
#[must_use]
pub fn read_manifest_engine(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let manifest: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ignoring malformed manifest");
            return None;
        }
    };
    let version = manifest.get("engines")?.get("bun")?.as_str()?.trim();
    (!version.is_empty()).then(|| version.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::shims::make_executable;

    fn temp_test_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("bunenv_test_{}_{}", name, rand::random::<u64>()));
        std::fs::create_dir_all(&dir).expect("Should create temp dir");
        dir
    }

    struct Fixture {
        dir: PathBuf,
        paths: BunenvPaths,
        project: PathBuf,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            let dir = temp_test_dir(name);
            let paths = BunenvPaths::with_root(dir.join("root"));
            let project = dir.join("project");
            std::fs::create_dir_all(&project).expect("Should create project dir");
            Self {
                dir,
                paths,
                project,
            }
        }

        fn install(&self, version: &str) {
            std::fs::create_dir_all(self.paths.bin_dir(version)).unwrap();
            std::fs::write(self.paths.bun_binary(version), "fake").unwrap();
            make_executable(&self.paths.bun_binary(version)).unwrap();
        }

        fn resolve(&self, cwd: &Path, env: Option<&str>) -> Option<ResolvedVersion> {
            VersionResolver::with_env_version(&self.paths, env.map(String::from)).resolve(cwd)
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    fn write_manifest(dir: &Path, content: &str) {
        std::fs::write(dir.join(MANIFEST_FILE), content).unwrap();
    }

    #[test]
    fn marker_wins_over_manifest_and_env_wins_over_both() {
        let fx = Fixture::new("precedence");
        std::fs::write(fx.project.join(LOCAL_VERSION_FILE), "1.0.0\n").unwrap();
        write_manifest(&fx.project, r#"{"engines": {"bun": "1.2.0"}}"#);

        let resolved = fx.resolve(&fx.project, None).unwrap();
        assert_eq!(resolved.version, "1.0.0");
        assert_eq!(
            resolved.source,
            VersionSource::LocalFile(fx.project.join(LOCAL_VERSION_FILE))
        );

        let resolved = fx.resolve(&fx.project, Some("2.0.0")).unwrap();
        assert_eq!(resolved.version, "2.0.0");
        assert_eq!(resolved.source, VersionSource::Environment);
    }

    #[test]
    fn blank_env_var_is_ignored() {
        let fx = Fixture::new("blank_env");
        fx.paths.set_global_version("1.1.0").unwrap();

        let resolved = fx.resolve(&fx.project, Some("   ")).unwrap();
        assert_eq!(resolved.version, "1.1.0");
    }

    #[test]
    fn env_alias_expands_immediately() {
        let fx = Fixture::new("env_latest");
        fx.install("1.0.0");
        fx.install("1.2.0");
        std::fs::write(fx.project.join(LOCAL_VERSION_FILE), "1.0.0").unwrap();

        let resolved = fx.resolve(&fx.project, Some("latest")).unwrap();
        assert_eq!(resolved.version, "1.2.0");
        assert_eq!(resolved.selector, "latest");
        assert_eq!(resolved.source, VersionSource::Environment);
    }

    #[test]
    fn marker_in_ancestor_is_found() {
        let fx = Fixture::new("ancestor_marker");
        let nested = fx.project.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(fx.project.join(LOCAL_VERSION_FILE), "v1.1.0").unwrap();

        let resolved = fx.resolve(&nested, None).unwrap();
        assert_eq!(resolved.version, "1.1.0");
        assert_eq!(resolved.selector, "v1.1.0");
    }

    #[test]
    fn nearest_marker_wins() {
        let fx = Fixture::new("nearest_marker");
        let nested = fx.project.join("child");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(fx.project.join(LOCAL_VERSION_FILE), "1.0.0").unwrap();
        std::fs::write(nested.join(LOCAL_VERSION_FILE), "1.1.0").unwrap();

        assert_eq!(fx.resolve(&nested, None).unwrap().version, "1.1.0");
    }

    // A found-but-blank marker ends the marker search and falls through to
    // the next source; farther markers are not consulted.
    #[test]
    fn blank_marker_falls_through_to_next_source() {
        let fx = Fixture::new("blank_marker");
        let nested = fx.project.join("child");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(fx.project.join(LOCAL_VERSION_FILE), "1.0.0").unwrap();
        std::fs::write(nested.join(LOCAL_VERSION_FILE), "  \n").unwrap();
        fx.paths.set_global_version("1.1.0").unwrap();

        let resolved = fx.resolve(&nested, None).unwrap();
        assert_eq!(resolved.version, "1.1.0");
        assert!(matches!(resolved.source, VersionSource::GlobalFile(_)));
    }

    #[test]
    fn blank_marker_still_consults_manifest() {
        let fx = Fixture::new("blank_marker_manifest");
        std::fs::write(fx.project.join(LOCAL_VERSION_FILE), "").unwrap();
        write_manifest(&fx.project, r#"{"engines": {"bun": "1.2.0"}}"#);

        let resolved = fx.resolve(&fx.project, None).unwrap();
        assert_eq!(resolved.version, "1.2.0");
        assert!(matches!(resolved.source, VersionSource::Manifest(_)));
    }

    #[test]
    fn unreadable_marker_is_treated_as_missing() {
        let fx = Fixture::new("unreadable_marker");
        let nested = fx.project.join("child");
        // A directory with the marker's name cannot be read as a file.
        std::fs::create_dir_all(nested.join(LOCAL_VERSION_FILE)).unwrap();
        std::fs::write(fx.project.join(LOCAL_VERSION_FILE), "1.0.0").unwrap();

        assert_eq!(fx.resolve(&nested, None).unwrap().version, "1.0.0");
    }

    #[test]
    fn malformed_manifest_does_not_block_ancestor_manifest() {
        let fx = Fixture::new("malformed_manifest");
        let nested = fx.project.join("packages").join("app");
        std::fs::create_dir_all(&nested).unwrap();
        write_manifest(&nested, "{ not json");
        write_manifest(&fx.project.join("packages"), r#"{"name": "no-engines"}"#);
        write_manifest(&fx.project, r#"{"engines": {"bun": "^1.0.0"}}"#);
        fx.install("1.0.0");
        fx.install("1.3.0");
        fx.paths.set_global_version("1.0.0").unwrap();

        let resolved = fx.resolve(&nested, None).unwrap();
        assert_eq!(resolved.version, "1.3.0");
        assert_eq!(
            resolved.source,
            VersionSource::Manifest(fx.project.join(MANIFEST_FILE))
        );
    }

    #[test]
    fn non_string_engine_is_ignored() {
        let fx = Fixture::new("non_string_engine");
        write_manifest(&fx.project, r#"{"engines": {"bun": 1}}"#);

        assert_eq!(fx.resolve(&fx.project, None), None);
    }

    #[test]
    fn global_marker_is_last_resort() {
        let fx = Fixture::new("global");
        fx.paths.set_global_version("1.1.0").unwrap();

        let resolved = fx.resolve(&fx.project, None).unwrap();
        assert_eq!(resolved.version, "1.1.0");
        assert_eq!(
            resolved.source,
            VersionSource::GlobalFile(fx.paths.global_version_file())
        );
    }

    #[test]
    fn nothing_found_is_none() {
        let fx = Fixture::new("nothing");
        assert_eq!(fx.resolve(&fx.project, None), None);
    }

    #[test]
    fn uninstalled_range_keeps_selector() {
        let fx = Fixture::new("uninstalled_range");
        std::fs::write(fx.project.join(LOCAL_VERSION_FILE), "^2.0.0").unwrap();
        fx.install("1.0.0");

        assert_eq!(fx.resolve(&fx.project, None).unwrap().version, "^2.0.0");
    }

    #[test]
    fn ancestor_walk_ends_at_filesystem_root() {
        let fx = Fixture::new("walk_root");
        let deep = fx.project.join("a").join("b").join("c");
        std::fs::create_dir_all(&deep).unwrap();

        let visited: Vec<&Path> = deep.ancestors().collect();
        assert_eq!(visited[0], deep.as_path());
        assert_eq!(visited[1], fx.project.join("a").join("b").as_path());
        assert_eq!(visited[2], fx.project.join("a").as_path());
        assert!(visited.last().unwrap().parent().is_none());

        assert_eq!(find_local_marker(&deep), None);
        assert_eq!(find_manifest_engine(&deep), None);
    }

    #[test]
    fn source_display_names_origin() {
        assert_eq!(
            VersionSource::Environment.to_string(),
            "BUNENV_VERSION environment variable"
        );
        let manifest = VersionSource::Manifest(PathBuf::from("/p/package.json"));
        assert_eq!(manifest.to_string(), "/p/package.json (engines.bun)");
    }
}
