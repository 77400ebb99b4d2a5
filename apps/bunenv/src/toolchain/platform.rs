//! Platform detection for Bun release downloads.
//!
//! Bun publishes one zip per OS/architecture pair, named
//! `bun-{os}-{arch}.zip`.
//!
//! ## Supported Platforms
//!
//! - Linux `x86_64` / `aarch64`
//! - macOS `x86_64` / `aarch64`
//! - Windows `x86_64`

use anyhow::{Result, bail};
use std::fmt;

/// A supported OS/architecture combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Linux on `x86_64`.
    LinuxX64,
    /// Linux on ARM64.
    LinuxAarch64,
    /// macOS on Intel.
    DarwinX64,
    /// macOS on Apple Silicon.
    DarwinAarch64,
    /// Windows on `x86_64`.
    WindowsX64,
}

impl Platform {
    /// Detects the current platform based on compile-time configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if Bun publishes no build for this OS/architecture.
    pub fn detect() -> Result<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Maps Rust's `OS`/`ARCH` constants onto a platform.
    ///
    /// `arm64` is accepted as an alias for `aarch64`.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported combinations.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self> {
        match (os, arch) {
            ("linux", "x86_64") => Ok(Self::LinuxX64),
            ("linux", "aarch64" | "arm64") => Ok(Self::LinuxAarch64),
            ("macos", "x86_64") => Ok(Self::DarwinX64),
            ("macos", "aarch64" | "arm64") => Ok(Self::DarwinAarch64),
            ("windows", "x86_64") => Ok(Self::WindowsX64),
            _ => bail!(
                "Unsupported platform: {os} on {arch}. Bun is published for \
                 linux-x64, linux-aarch64, darwin-x64, darwin-aarch64 and windows-x64"
            ),
        }
    }

    /// Returns the `{os}-{arch}` identifier used in Bun asset names.
    #[must_use = "returns the platform string without side effects"]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinuxX64 => "linux-x64",
            Self::LinuxAarch64 => "linux-aarch64",
            Self::DarwinX64 => "darwin-x64",
            Self::DarwinAarch64 => "darwin-aarch64",
            Self::WindowsX64 => "windows-x64",
        }
    }

    /// Returns the release asset file name, e.g. `bun-linux-x64.zip`.
    #[must_use = "returns the asset name without side effects"]
    pub fn asset_name(self) -> String {
        format!("bun-{}.zip", self.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
