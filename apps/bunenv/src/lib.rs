#![warn(clippy::pedantic)]

//! Core library of `bunenv`, a version manager for the Bun runtime.
//!
//! Shared by the `bunenv` management CLI and the `bunenv-shim` launcher so
//! both resolve versions with exactly the same code.

pub mod errors;
pub mod logging;
pub mod toolchain;
