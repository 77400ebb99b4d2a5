//! HTTP downloads for release assets.
//!
//! ## Features
//!
//! - Streaming downloads with a text progress line on stdout
//! - Automatic retry with exponential backoff (3 attempts)
//! - Downloads to a temporary file, then renames on success
//! - Small in-memory fetches for checksum listings and release metadata

use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures_util::StreamExt;
use rand::Rng;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::errors::BunenvError;

/// Maximum number of download attempts.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Minimum interval between progress updates in milliseconds.
const PROGRESS_INTERVAL_MS: u128 = 250;

/// `User-Agent` sent with every request; the GitHub API rejects anonymous agents.
const USER_AGENT: &str = concat!("bunenv/", env!("CARGO_PKG_VERSION"));

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")
}

/// Downloads a file from `url` to `dest` with progress display.
///
/// The body is streamed into `<dest>.tmp`, which is renamed to `dest` only
/// after the whole body has been written.
///
/// # Errors
///
/// Returns an error if:
/// - The request fails or returns a non-success status after all retries
/// - The destination file cannot be created or written
pub async fn download_file(url: &str, dest: &Path) -> Result<()> {
    let temp_path = dest.with_extension("tmp");

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut last_error = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            let delay = calculate_retry_delay(attempt);
            println!(
                "Retrying download (attempt {}/{})...",
                attempt + 1,
                MAX_RETRIES
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        match download_with_progress(url, &temp_path).await {
            Ok(()) => {
                tokio::fs::rename(&temp_path, dest).await.with_context(|| {
                    format!(
                        "Failed to rename {} to {}",
                        temp_path.display(),
                        dest.display()
                    )
                })?;
                return Ok(());
            }
            Err(e) => {
                warn!(attempt = attempt + 1, error = %e, "download attempt failed");
                last_error = Some(e);
                let _ = tokio::fs::remove_file(&temp_path).await;
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        BunenvError::download_error(format!("Download failed after {MAX_RETRIES} attempts")).into()
    }))
}

async fn download_with_progress(url: &str, dest: &Path) -> Result<()> {
    let response = http_client()?
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;

    if !response.status().is_success() {
        let message = format!("HTTP {} for {url}", response.status());
        return Err(BunenvError::download_error(message).into());
    }

    let total_size = response.content_length().unwrap_or(0);
    debug!(%url, total_size, "downloading");

    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("Failed to create file: {}", dest.display()))?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;
    let start_time = Instant::now();
    let mut last_update = Instant::now();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("Failed to read chunk from {url}"))?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write to {}", dest.display()))?;
        downloaded += chunk.len() as u64;

        let now = Instant::now();
        if now.duration_since(last_update).as_millis() >= PROGRESS_INTERVAL_MS {
            print_progress(downloaded, total_size, start_time.elapsed().as_secs_f64());
            last_update = now;
        }
    }

    file.flush()
        .await
        .with_context(|| format!("Failed to flush {}", dest.display()))?;

    print_progress(downloaded, total_size, start_time.elapsed().as_secs_f64());
    println!();

    Ok(())
}

/// Fetches a small text resource such as a checksum listing.
///
/// Returns `Ok(None)` for a 404 so callers can treat the resource as absent.
///
/// # Errors
///
/// Returns an error if the request fails or the server answers with any
/// other non-success status.
pub async fn fetch_text(url: &str) -> Result<Option<String>> {
    let response = http_client()?
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(BunenvError::download_error(format!("HTTP {status} for {url}")).into());
    }

    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read response body from {url}"))?;
    Ok(Some(body))
}

#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
fn print_progress(downloaded: u64, total: u64, elapsed_secs: f64) {
    let percent = if total > 0 {
        (downloaded as f64 / total as f64 * 100.0) as u8
    } else {
        0
    };
    let speed = if elapsed_secs > 0.0 {
        downloaded as f64 / elapsed_secs
    } else {
        0.0
    };

    print!(
        "\r{}/{} ({percent}%) {}     ",
        format_bytes(downloaded),
        format_bytes(total),
        format_speed(speed)
    );
    let _ = std::io::stdout().flush();
}

/// Formats bytes into a human-readable string (KB, MB, GB).
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    #[allow(clippy::cast_precision_loss)]
    let bytes_f = bytes as f64;

    if bytes_f >= GB {
        format!("{:.2} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.2} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}

/// Formats speed (bytes/sec) into a human-readable string.
fn format_speed(speed: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    if speed >= MB {
        format!("{:.2} MB/s", speed / MB)
    } else if speed >= KB {
        format!("{:.2} KB/s", speed / KB)
    } else {
        format!("{speed:.0} B/s")
    }
}

/// Calculates the retry delay with exponential backoff and jitter.
///
/// The delay doubles with each attempt (1s, 2s, 4s) with +/- 25% jitter.
fn calculate_retry_delay(attempt: u32) -> u64 {
    let base_delay = BASE_RETRY_DELAY_MS * 2u64.pow(attempt);
    let jitter_range = base_delay / 4;
    let jitter = rand::rng().random_range(0..=jitter_range * 2);
    base_delay - jitter_range + jitter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_increases_exponentially() {
        let delay_0 = calculate_retry_delay(0);
        let delay_1 = calculate_retry_delay(1);
        let delay_2 = calculate_retry_delay(2);

        assert!((750..=1250).contains(&delay_0));
        assert!((1500..=2500).contains(&delay_1));
        assert!((3000..=5000).contains(&delay_2));
    }

    #[test]
    fn byte_sizes_pick_largest_fitting_unit() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(35 * 1024 * 1024), "35.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn speeds_pick_largest_fitting_unit() {
        assert_eq!(format_speed(100.0), "100 B/s");
        assert_eq!(format_speed(1536.0), "1.50 KB/s");
        assert_eq!(format_speed(5.0 * 1024.0 * 1024.0), "5.00 MB/s");
    }

    #[tokio::test]
    async fn unreachable_host_fails_after_retries() {
        let dir =
            std::env::temp_dir().join(format!("bunenv_test_download_{}", rand::random::<u64>()));
        let dest = dir.join("asset.zip");

        let result = download_file("http://127.0.0.1:9/asset.zip", &dest).await;

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!dest.with_extension("tmp").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
