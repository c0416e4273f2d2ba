//! Core types for the bootstrapper
//!
//! Holds the error system shared by every component:
//! - [`LauncherError`] - typed failures of fetch, download, persist and launch
//! - [`ErrorContext`] - user-facing wrapper with suggestions and details
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] for display
//!
//! Components return `Result<T, LauncherError>`; the CLI boundary works with
//! [`anyhow::Result`] and converts back through [`user_friendly_error`].

pub mod error;

pub use error::{ErrorContext, LauncherError, user_friendly_error};
