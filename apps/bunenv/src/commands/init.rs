//! Init command for the bunenv CLI.
//!
//! Prints a shell snippet; it does not modify any profile.
//!
//! ## Usage
//!
//! ```bash
//! eval "$(bunenv init)"            # bash / zsh
//! bunenv init --shell fish | source
//! ```

use anyhow::Result;
use clap::Args;
use tracing::warn;

use bunenv::toolchain::BunenvPaths;
use bunenv::toolchain::shell::Shell;

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Shell to generate the snippet for (bash, zsh, fish).
    ///
    /// Defaults to the shell named by `SHELL`, falling back to bash.
    #[clap(short = 's', long = "shell")]
    pub shell: Option<String>,
}

/// Executes the init command.
///
/// # Errors
///
/// Returns an error if the install root cannot be determined.
pub fn execute(args: &InitArgs) -> Result<()> {
    let paths = BunenvPaths::new()?;

    let shell = match args.shell.as_deref() {
        Some(name) => Shell::from_name(name).unwrap_or_else(|| {
            warn!("unsupported shell '{name}', using bash");
            Shell::Bash
        }),
        None => Shell::detect().unwrap_or(Shell::Bash),
    };

    print!("{}", shell.init_script(&paths.shims, &paths.root));
    Ok(())
}
