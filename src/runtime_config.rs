//! # Runtime Configuration Module
//!
//! Environment-variable configuration for the front controller: where the
//! error routing document lives and which environment branch of it applies.
//!
//! ## Environment Variables
//!
//! ### `FAULTROUTE_CONFIG`
//!
//! Path of the routing document (YAML, or JSON with a `.json` extension).
//!
//! Default: `faultroute.yaml`
//!
//! ### `FAULTROUTE_ENV`
//!
//! Environment name selecting the `display_errors` flag and reporter list.
//!
//! Default: `local`
//!
//! ### `FAULTROUTE_INCLUDE_PATH`
//!
//! Directory view files resolve against. When unset, the document's own
//! directory is used. File reporter paths are not affected; a relative
//! `path` resolves against the working directory.
//!
//! ### `FAULTROUTE_DISPLAY_FORMAT`
//!
//! Format name forced for every response, overriding route and default
//! formats (for instance `json` for an API process).
//!
//! ## Usage
//!
//! ```rust
//! use faultroute::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("routing faults with {}", config.document.display());
//! ```

use std::env;
use std::path::PathBuf;

/// Default document path.
pub const DEFAULT_DOCUMENT: &str = "faultroute.yaml";
/// Default environment name.
pub const DEFAULT_ENVIRONMENT: &str = "local";

/// Inputs of a [`FrontController`](crate::dispatcher::FrontController)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Routing document path
    pub document: PathBuf,
    /// Active environment
    pub environment: String,
    /// Root for view files; the document's directory when `None`
    pub include_path: Option<PathBuf>,
    /// Format name overriding every route
    pub display_format: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            document: PathBuf::from(DEFAULT_DOCUMENT),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            include_path: None,
            display_format: None,
        }
    }
}

impl RuntimeConfig {
    pub fn new(document: impl Into<PathBuf>, environment: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            environment: environment.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_include_path(mut self, include_path: impl Into<PathBuf>) -> Self {
        self.include_path = Some(include_path.into());
        self
    }

    #[must_use]
    pub fn with_display_format(mut self, format: impl Into<String>) -> Self {
        self.display_format = Some(format.into());
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            document: get("FAULTROUTE_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.document),
            environment: get("FAULTROUTE_ENV").unwrap_or(defaults.environment),
            include_path: get("FAULTROUTE_INCLUDE_PATH").map(PathBuf::from),
            display_format: get("FAULTROUTE_DISPLAY_FORMAT"),
        }
    }
}
