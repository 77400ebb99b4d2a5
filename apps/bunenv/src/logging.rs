//! Diagnostic logging setup shared by the CLI and the shim launcher.
//!
//! Logs go to stderr so they never mix with command output or with the
//! output of a program executed through a shim.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV: &str = "BUNENV_LOG";

/// Filter used when neither `--debug` nor `BUNENV_LOG` is given.
const DEFAULT_FILTER: &str = "warn";

/// Filter used with `--debug`.
const DEBUG_FILTER: &str = "bunenv=debug,warn";

/// Installs the global tracing subscriber.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::new(DEBUG_FILTER)
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
