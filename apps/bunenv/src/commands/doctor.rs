//! Doctor command for the bunenv CLI.
//!
//! Verifies the installation and reports issues with remediation steps.

use anyhow::{Context, Result};

use bunenv::toolchain::BunenvPaths;
use bunenv::toolchain::conflict::{detect_path_conflicts, format_conflict_warning};
use bunenv::toolchain::doctor::{DoctorCheckStatus, run_all_checks};

/// Executes the doctor command.
///
/// Failed checks are reported, not returned as errors.
///
/// # Errors
///
/// Returns an error if the install root or current directory cannot be
/// determined.
pub fn execute() -> Result<()> {
    let paths = BunenvPaths::new()?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    println!("Checking bunenv installation...");
    println!();

    let mut has_errors = false;
    let mut has_warnings = false;

    for check in run_all_checks(&paths, &cwd) {
        println!("  {} {}: {}", check.prefix(), check.name, check.message);
        match check.status {
            DoctorCheckStatus::Ok => {}
            DoctorCheckStatus::Warning => has_warnings = true,
            DoctorCheckStatus::Error => has_errors = true,
        }
    }

    let conflicts = detect_path_conflicts(&paths.shims);
    if !conflicts.is_empty() {
        println!();
        for line in format_conflict_warning(&conflicts).lines() {
            println!("  {line}");
        }
    }

    println!();

    if has_errors {
        println!("Some checks failed. See the messages above for how to fix them.");
    } else if has_warnings {
        println!("Some warnings were found. bunenv may work but could have issues.");
    } else {
        println!("All checks passed. bunenv is ready to use.");
    }

    Ok(())
}
