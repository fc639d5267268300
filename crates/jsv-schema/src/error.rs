//! # Error Types
//!
//! [`JsvError`] gathers every failure the entry point can report. A failing
//! instance is not an error: it is an `Ok` report with `success = false`.
//! Only fail-fast aborts arrive here as [`JsvError::Validation`].

use thiserror::Error;

use jsv_core::CoreError;

use crate::config::ConfigError;
use crate::context::ValidationFailure;
use crate::loader::LoadError;

/// Top-level error type for `jsv-schema`.
#[derive(Error, Debug)]
pub enum JsvError {
    /// Pointer or node-kind error from `jsv-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Fail-fast abort.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A document could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
}
