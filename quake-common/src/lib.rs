//! Common types and utilities shared across Quake crates.
//!
//! This crate holds the shared error type and the observability helpers used by
//! the loader, the HTTP client and the `quake` binary. It stays small so every
//! crate in the workspace can depend on it.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`QuakeError`] and [`Result`]: Shared error handling
//! - [`LogSettings`] and [`LogFormat`]: the `log:` config section, read by
//!   [`observability::init_logging`]
//!
//! # Examples
//!
//! ```rust
//! use quake_common::{LogFormat, QuakeError};
//!
//! let err = QuakeError::Config("missing endpoint".into());
//! assert_eq!(err.to_string(), "Configuration error: missing endpoint");
//! assert!(matches!(LogFormat::default(), LogFormat::Text));
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

pub use observability::{LogFormat, LogSettings};

/// Error types used across the Quake workspace.
#[derive(thiserror::Error, Debug)]
pub enum QuakeError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP transport could not be set up.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Convenient alias for results that use [`QuakeError`].
pub type Result<T> = std::result::Result<T, QuakeError>;

/// Which of the two fixed feeds a loader reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Roughly a hundred records.
    #[default]
    Small,
    /// Roughly ten thousand records.
    Large,
}

impl Endpoint {
    pub fn from_use_large(use_large: bool) -> Self {
        if use_large {
            Endpoint::Large
        } else {
            Endpoint::Small
        }
    }

    pub fn is_large(self) -> bool {
        matches!(self, Endpoint::Large)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Small => "small",
            Endpoint::Large => "large",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
