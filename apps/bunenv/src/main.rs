#![warn(clippy::pedantic)]

//! # bunenv
//!
//! Installs Bun versions side by side and selects one per directory.
//!
//! ## Subcommands
//!
//! - `install` - Install a Bun version
//! - `uninstall` - Remove a Bun version
//! - `list` - List installed versions
//! - `global` - Show or set the global version
//! - `local` - Show or set the version for the current directory
//! - `version` - Show the effective version
//! - `rehash` - Regenerate shims
//! - `shell` - Start a subshell using a specific version
//! - `init` - Print shell integration code
//! - `doctor` - Check installation health
//!
//! ## Examples
//!
//! ```bash
//! eval "$(bunenv init)"
//! bunenv install 1.1.0
//! bunenv global 1.1.0
//! bun --version
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{doctor, global, init, install, list, local, rehash, shell, uninstall, version};

use bunenv::errors::BunenvError;
use bunenv::logging;

/// Bun version manager.
#[derive(Parser)]
#[command(
    name = "bunenv",
    author,
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUNENV_GIT_COMMIT"), ")"),
    about = "Manage multiple versions of the Bun runtime",
    after_help = "\
VERSION RESOLUTION:
    The effective Bun version is taken from the first of:
    1. BUNENV_VERSION environment variable
    2. .bun-version in the current directory or any parent
    3. engines.bun in the nearest package.json
    4. Global version file (~/.bunenv/version)

ENVIRONMENT VARIABLES:
    BUNENV_ROOT             Install root (default: ~/.bunenv)
    BUNENV_VERSION          Version to use, overriding all files
    BUNENV_DEFAULT_VERSION  Version installed by 'bunenv install' (default: latest)
    BUNENV_DOWNLOAD_URL     Release download base URL
    BUNENV_LOG              Log filter (e.g. debug)"
)]
pub struct Cli {
    /// Enable debug logging on stderr.
    #[clap(long = "debug", global = true, action = clap::ArgAction::SetTrue)]
    pub debug: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the bunenv CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Install a Bun version.
    ///
    /// Downloads the release for this platform, verifies its checksum and
    /// regenerates shims.
    Install(install::InstallArgs),

    /// Uninstall a Bun version.
    Uninstall(uninstall::UninstallArgs),

    /// List installed Bun versions.
    ///
    /// The version effective in the current directory is marked with '*'.
    #[command(alias = "ls")]
    List(list::ListArgs),

    /// Show or set the global Bun version.
    Global(global::GlobalArgs),

    /// Show or set the Bun version for the current directory.
    ///
    /// Writes a .bun-version file.
    Local(local::LocalArgs),

    /// Show the effective Bun version.
    Version(version::VersionArgs),

    /// Regenerate shims for all installed executables.
    Rehash,

    /// Start a subshell that uses a specific Bun version.
    Shell(shell::ShellArgs),

    /// Print shell integration code.
    ///
    /// Add 'eval "$(bunenv init)"' to your shell profile.
    Init(init::InitArgs),

    /// Check installation health.
    Doctor,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let exit_code = handle_error(&e);
        std::process::exit(exit_code);
    }
}

/// Handles an error and returns the appropriate exit code.
///
/// For `ProcessExitCode` errors, returns the embedded exit code without
/// printing anything. For all other errors, prints the error and returns 1.
fn handle_error(e: &anyhow::Error) -> i32 {
    if let Some(BunenvError::ProcessExitCode { code }) = e.downcast_ref::<BunenvError>() {
        return *code;
    }
    eprintln!("Error: {e:?}");
    1
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    match cli.command {
        Commands::Install(args) => install::execute(&args).await,
        Commands::Uninstall(args) => uninstall::execute(&args),
        Commands::List(args) => list::execute(&args),
        Commands::Global(args) => global::execute(&args),
        Commands::Local(args) => local::execute(&args),
        Commands::Version(args) => version::execute(&args),
        Commands::Rehash => rehash::execute(),
        Commands::Shell(args) => shell::execute(&args),
        Commands::Init(args) => init::execute(&args),
        Commands::Doctor => doctor::execute(),
    }
}
