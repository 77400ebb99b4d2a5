//! Installing and removing Bun versions.
//!
//! ## Install process
//!
//! 1. Download `bun-<platform>.zip` for the version into `downloads/`
//! 2. Verify it against the release's `SHASUMS256.txt` when listed there
//! 3. Extract it into a staging directory
//! 4. Copy the `bun` executable to `versions/<version>/bin/bun`
//!
//! Any failure after the version directory has been touched removes it again,
//! so a version is either fully installed or absent.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::archive::{extract_zip, find_file};
use super::download::{download_file, fetch_text};
use super::inventory::is_installed;
use super::paths::{BunenvPaths, PRIMARY_EXECUTABLE, executable_file_name};
use super::platform::Platform;
use super::release::{
    DEFAULT_VERSION_ENV, asset_url, download_base, fetch_latest_version, shasums_url,
};
use super::selector::{LATEST_ALIAS, is_valid_version_format, normalize_version};
use super::shims::make_executable;
use super::verify::{parse_shasums, verify_checksum};
use crate::errors::BunenvError;

/// Result of [`install_version`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The version was downloaded and installed.
    Installed,
    /// The version was already present and `force` was not set.
    AlreadyInstalled,
}

/// Turns the `install` argument into a concrete version.
///
/// With no argument, `BUNENV_DEFAULT_VERSION` is used, else `latest`.
/// `latest` is looked up through the GitHub releases API. Anything else must
/// be an exact version; a leading `v` is removed.
///
/// # Errors
///
/// Returns [`BunenvError::InvalidVersion`] for malformed input, or an error
/// if the latest release cannot be determined.
pub async fn resolve_install_target(requested: Option<&str>) -> Result<String> {
    let requested = requested
        .map(ToString::to_string)
        .or_else(|| {
            std::env::var(DEFAULT_VERSION_ENV)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or_else(|| LATEST_ALIAS.to_string());

    if requested == LATEST_ALIAS {
        println!("Looking up the latest Bun release...");
        return fetch_latest_version().await;
    }

    if !is_valid_version_format(&requested) {
        return Err(BunenvError::invalid_version(requested).into());
    }
    Ok(normalize_version(&requested).to_string())
}

/// Downloads and installs `version` for the current platform.
///
/// # Errors
///
/// Returns an error if the platform is unsupported, the download or checksum
/// verification fails, or the archive does not contain a `bun` executable.
pub async fn install_version(
    paths: &BunenvPaths,
    version: &str,
    force: bool,
) -> Result<InstallOutcome> {
    let version = normalize_version(version);
    let version_dir = paths.version_dir(version);

    if is_installed(paths, version) && !force {
        return Ok(InstallOutcome::AlreadyInstalled);
    }
    if version_dir.exists() {
        if force {
            println!("Removing existing installation of Bun {version}...");
        }
        std::fs::remove_dir_all(&version_dir).with_context(|| {
            format!("Failed to remove version directory: {}", version_dir.display())
        })?;
    }

    let platform = Platform::detect()?;
    paths.ensure_directories()?;

    println!("Installing Bun {version} for {platform}...");

    let result = download_and_place(paths, version, platform).await;
    if result.is_err() {
        debug!(dir = %version_dir.display(), "removing partial installation");
        let _ = std::fs::remove_dir_all(&version_dir);
    }
    result.map(|()| InstallOutcome::Installed)
}

async fn download_and_place(paths: &BunenvPaths, version: &str, platform: Platform) -> Result<()> {
    let base = download_base();
    let asset = platform.asset_name();
    let url = asset_url(&base, version, &asset);
    let archive_path = paths.downloads.join(format!("bun-v{version}-{asset}"));

    println!("Downloading from {url}...");
    download_file(&url, &archive_path).await?;

    let result = verify_release_checksum(&base, version, &asset, &archive_path)
        .await
        .and_then(|()| install_from_archive(paths, version, &archive_path));

    let _ = std::fs::remove_file(&archive_path);
    result
}

async fn verify_release_checksum(
    base: &str,
    version: &str,
    asset: &str,
    archive_path: &Path,
) -> Result<()> {
    let listing = fetch_text(&shasums_url(base, version)).await?;

    match listing.as_deref().and_then(|text| parse_shasums(text, asset)) {
        Some(expected) => {
            println!("Verifying checksum...");
            verify_checksum(archive_path, &expected)
        }
        None => {
            warn!("no checksum published for {asset}, skipping verification");
            Ok(())
        }
    }
}

/// Installs `version` from an already downloaded release archive.
///
/// # Errors
///
/// Returns an error if extraction fails or the archive holds no `bun`
/// executable. The version directory is removed on failure.
pub fn install_from_archive(paths: &BunenvPaths, version: &str, archive: &Path) -> Result<()> {
    let staging = paths.downloads.join(format!("bun-v{version}-staging"));
    if staging.exists() {
        std::fs::remove_dir_all(&staging)
            .with_context(|| format!("Failed to clear staging directory: {}", staging.display()))?;
    }

    println!("Extracting...");
    let result =
        extract_zip(archive, &staging).and_then(|()| place_executable(paths, version, &staging));

    let _ = std::fs::remove_dir_all(&staging);
    if result.is_err() {
        let _ = std::fs::remove_dir_all(paths.version_dir(version));
    }
    result
}

fn place_executable(paths: &BunenvPaths, version: &str, staging: &Path) -> Result<()> {
    let file_name = executable_file_name(PRIMARY_EXECUTABLE);
    let source = find_file(staging, &file_name).ok_or_else(|| {
        BunenvError::install_error(format!(
            "archive for Bun {version} does not contain {file_name}"
        ))
    })?;

    let bin_dir = paths.bin_dir(version);
    std::fs::create_dir_all(&bin_dir)
        .with_context(|| format!("Failed to create directory: {}", bin_dir.display()))?;

    let target: PathBuf = paths.bun_binary(version);
    std::fs::copy(&source, &target)
        .with_context(|| format!("Failed to install {}", target.display()))?;
    make_executable(&target)
}

/// Removes an installed version.
///
/// # Errors
///
/// Returns [`BunenvError::VersionNotInstalled`] if the version directory
/// does not exist, or an error if it cannot be removed.
///
/// `version` must name a single entry under `versions/`; anything else is
/// rejected as [`BunenvError::InvalidVersion`].
pub fn uninstall_version(paths: &BunenvPaths, version: &str) -> Result<()> {
    let version = normalize_version(version);
    let mut components = Path::new(version).components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return Err(BunenvError::invalid_version(version).into());
    }

    let version_dir = paths.version_dir(version);

    if !version_dir.is_dir() {
        return Err(BunenvError::version_not_installed(version).into());
    }

    std::fs::remove_dir_all(&version_dir).with_context(|| {
        format!("Failed to remove version directory: {}", version_dir.display())
    })
}
