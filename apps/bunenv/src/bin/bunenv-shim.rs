#![warn(clippy::pedantic)]

//! Shim launcher for bunenv.
//!
//! `bunenv rehash` links this binary into the shims directory once per
//! managed executable name. At run time it reads its own name from argv[0],
//! resolves the effective Bun version and execs the matching executable.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};

use bunenv::logging;
use bunenv::toolchain::launcher::{Dispatch, exec, invoked_name, plan};
use bunenv::toolchain::{BunenvPaths, VersionResolver};

fn main() {
    logging::init(false);

    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("bunenv: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let mut args = std::env::args_os();
    let argv0 = args.next().context("missing program name")?;
    let rest: Vec<OsString> = args.collect();

    let name = invoked_name(&argv0)
        .with_context(|| format!("cannot determine shim name from {}", argv0.to_string_lossy()))?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let paths = BunenvPaths::new()?;
    let home: Option<PathBuf> = dirs::home_dir();
    let resolver = VersionResolver::new(&paths);

    match plan(&name, &cwd, &paths, &resolver, home.as_deref()) {
        Dispatch::Management(program) | Dispatch::Versioned { program, .. } => {
            exec(&program, &rest)
        }
        Dispatch::Fallback { program, warning } => {
            eprintln!("{warning}");
            exec(&program, &rest)
        }
        Dispatch::Fail(message) => {
            eprintln!("{message}");
            Ok(1)
        }
    }
}
