//! Bun release locations.
//!
//! Release assets live at `{base}/bun-v{version}/{asset}`, where `base`
//! defaults to the GitHub releases download URL and may be overridden with
//! `BUNENV_DOWNLOAD_URL` (for mirrors).

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use super::download::fetch_text;
use super::verify::SHASUMS_FILE;
use crate::errors::BunenvError;

/// Environment variable overriding the release download base URL.
pub const DOWNLOAD_URL_ENV: &str = "BUNENV_DOWNLOAD_URL";

/// Environment variable naming the version `bunenv install` picks by default.
pub const DEFAULT_VERSION_ENV: &str = "BUNENV_DEFAULT_VERSION";

/// Default release download base URL.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://github.com/oven-sh/bun/releases/download";

/// GitHub API endpoint describing the newest stable release.
const LATEST_RELEASE_API: &str = "https://api.github.com/repos/oven-sh/bun/releases/latest";

/// Prefix of Bun release tags (`bun-v1.1.0`).
const TAG_PREFIX: &str = "bun-v";

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
}

/// Returns the download base URL, honouring `BUNENV_DOWNLOAD_URL`.
#[must_use]
pub fn download_base() -> String {
    std::env::var(DOWNLOAD_URL_ENV)
        .ok()
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_URL.to_string())
}

/// URL of a release asset.
#[must_use]
pub fn asset_url(base: &str, version: &str, asset: &str) -> String {
    format!("{base}/{TAG_PREFIX}{version}/{asset}")
}

/// URL of a release's checksum listing.
#[must_use]
pub fn shasums_url(base: &str, version: &str) -> String {
    asset_url(base, version, SHASUMS_FILE)
}

/// Extracts the version from a release tag such as `bun-v1.1.0`.
#[must_use]
pub fn version_from_tag(tag: &str) -> Option<&str> {
    tag.strip_prefix(TAG_PREFIX)
        .or_else(|| tag.strip_prefix('v'))
        .filter(|v| !v.is_empty())
}

/// Asks the GitHub API for the newest stable Bun version.
///
/// # Errors
///
/// Returns an error if the request fails or the response does not carry a
/// recognisable release tag.
pub async fn fetch_latest_version() -> Result<String> {
    let body = fetch_text(LATEST_RELEASE_API)
        .await?
        .ok_or_else(|| BunenvError::download_error("no latest Bun release found"))?;

    parse_latest_release(&body)
}

fn parse_latest_release(body: &str) -> Result<String> {
    let release: LatestRelease =
        serde_json::from_str(body).context("Failed to parse latest release information")?;
    debug!(tag = %release.tag_name, "latest release");

    version_from_tag(&release.tag_name)
        .map(ToString::to_string)
        .ok_or_else(|| {
            BunenvError::download_error(format!("unexpected release tag: {}", release.tag_name))
                .into()
        })
}
