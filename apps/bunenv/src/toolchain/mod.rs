//! Bun version management.
//!
//! ## Module Structure
//!
//! - [`paths`] - Install root layout and marker files
//! - [`inventory`] - Installed version discovery
//! - [`selector`] - Version, alias and range selectors
//! - [`resolver`] - Effective version resolution
//! - [`shims`] - Shim generation (rehash)
//! - [`launcher`] - Runtime behavior of a shim
//! - [`platform`] - OS and architecture detection
//! - [`release`] - Release URLs and latest version lookup
//! - [`download`] - HTTP download with progress tracking
//! - [`verify`] - SHA256 checksum verification
//! - [`archive`] - ZIP extraction
//! - [`install`] - Install and uninstall pipeline
//! - [`shell`] - Shell integration snippets
//! - [`conflict`] - PATH conflict detection
//! - [`doctor`] - Installation health checks

pub mod archive;
pub mod conflict;
pub mod doctor;
pub mod download;
pub mod install;
pub mod inventory;
pub mod launcher;
pub mod paths;
pub mod platform;
pub mod release;
pub mod resolver;
pub mod selector;
pub mod shell;
pub mod shims;
pub mod verify;

pub use inventory::{is_installed, list_installed};
pub use paths::BunenvPaths;
pub use platform::Platform;
pub use resolver::{ResolvedVersion, VersionResolver, VersionSource};
pub use selector::{is_valid_version_format, normalize_version};
