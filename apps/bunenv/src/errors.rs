//! Error types for bunenv.
//!
//! Most operations return `anyhow::Result` and attach context as they
//! propagate. `BunenvError` names the failures that callers inspect or that
//! carry user-facing remediation text, and is downcast from `anyhow::Error`
//! at the process boundary.

use thiserror::Error;

/// Domain errors raised by bunenv operations.
#[derive(Debug, Error)]
pub enum BunenvError {
    /// A version argument does not look like `x.y.z`.
    #[error("Invalid version format: {version}. Expected format: x.y.z")]
    InvalidVersion {
        /// The rejected input.
        version: String,
    },

    /// A version is required to be installed but is not.
    #[error("Bun {version} is not installed. Use 'bunenv install {version}' to install it.")]
    VersionNotInstalled {
        /// The missing version.
        version: String,
    },

    /// Network error while fetching a release artifact.
    #[error("download error: {message}")]
    DownloadError {
        /// Description of the download error.
        message: String,
    },

    /// Checksum verification failed.
    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// File that failed verification.
        file: String,
        /// The expected checksum.
        expected: String,
        /// The actual checksum.
        actual: String,
    },

    /// Installation failed after the download succeeded.
    #[error("installation failed: {message}")]
    InstallError {
        /// Description of the installation error.
        message: String,
    },

    /// Shim generation failed.
    #[error("shim error: {message}")]
    ShimError {
        /// Description of the shim error.
        message: String,
    },

    /// The command finished with a specific exit code.
    ///
    /// Whatever needed saying has already been printed, so the process exits
    /// with `code` and no further output.
    #[error("process exited with code {code}")]
    ProcessExitCode {
        /// The exit code to propagate.
        code: i32,
    },
}

impl BunenvError {
    /// Creates a new `InvalidVersion` error.
    #[must_use]
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Creates a new `VersionNotInstalled` error.
    #[must_use]
    pub fn version_not_installed(version: impl Into<String>) -> Self {
        Self::VersionNotInstalled {
            version: version.into(),
        }
    }

    /// Creates a new `DownloadError`.
    #[must_use]
    pub fn download_error(message: impl Into<String>) -> Self {
        Self::DownloadError {
            message: message.into(),
        }
    }

    /// Creates a new `ChecksumMismatch` error.
    #[must_use]
    pub fn checksum_mismatch(
        file: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ChecksumMismatch {
            file: file.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new `InstallError`.
    #[must_use]
    pub fn install_error(message: impl Into<String>) -> Self {
        Self::InstallError {
            message: message.into(),
        }
    }

    /// Creates a new `ShimError`.
    #[must_use]
    pub fn shim_error(message: impl Into<String>) -> Self {
        Self::ShimError {
            message: message.into(),
        }
    }

    /// Creates a new `ProcessExitCode` error.
    #[must_use]
    pub const fn process_exit_code(code: i32) -> Self {
        Self::ProcessExitCode { code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_version_mentions_expected_format() {
        let err = BunenvError::invalid_version("1.2");
        assert_eq!(
            err.to_string(),
            "Invalid version format: 1.2. Expected format: x.y.z"
        );
    }

    #[test]
    fn version_not_installed_suggests_install() {
        let err = BunenvError::version_not_installed("1.1.0");
        assert_eq!(
            err.to_string(),
            "Bun 1.1.0 is not installed. Use 'bunenv install 1.1.0' to install it."
        );
    }

    #[test]
    fn download_error_displays_message() {
        let err = BunenvError::download_error("connection timeout");
        assert_eq!(err.to_string(), "download error: connection timeout");
    }

    #[test]
    fn checksum_mismatch_displays_all_values() {
        let err = BunenvError::checksum_mismatch("bun-linux-x64.zip", "abc123", "def456");
        assert_eq!(
            err.to_string(),
            "checksum mismatch for bun-linux-x64.zip: expected abc123, got def456"
        );
    }

    #[test]
    fn install_error_displays_message() {
        let err = BunenvError::install_error("extraction failed");
        assert_eq!(err.to_string(), "installation failed: extraction failed");
    }

    #[test]
    fn process_exit_code_displays_code() {
        let err = BunenvError::process_exit_code(42);
        assert_eq!(err.to_string(), "process exited with code 42");
    }

    #[test]
    fn downcasts_through_anyhow() {
        let err: anyhow::Error = BunenvError::process_exit_code(3).into();
        assert!(matches!(
            err.downcast_ref::<BunenvError>(),
            Some(BunenvError::ProcessExitCode { code: 3 })
        ));
    }
}
