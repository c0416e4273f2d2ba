//! Bootstrapper - a self-updating application launcher
//!
//! Given the URL of a remote manifest, the bootstrapper checks whether the
//! locally cached artifact is current, downloads a newer one when needed,
//! records what is installed and launches the artifact as a child process,
//! relaying its exit code.
//!
//! # Run Sequence
//!
//! 1. Fetch the manifest ([`manifest`]); any failure means offline mode
//! 2. Load the local state ([`state`])
//! 3. Decide whether to update ([`planner`])
//! 4. Download the artifact into the cache ([`download`]) and save the state
//! 5. Launch the cached artifact ([`launcher`])
//!
//! [`bootstrapper::Bootstrapper`] sequences these steps and exposes the
//! resolved session through query methods.
//!
//! # Manifest Format
//!
//! ```json
//! {
//!   "name": "App",
//!   "version": "2",
//!   "downloadUrl": "https://example.com/releases/app-2.jar"
//! }
//! ```
//!
//! # Local State Format
//!
//! ```json
//! {
//!   "installedVersion": "2",
//!   "installedProduct": "App",
//!   "autoUpdate": true,
//!   "forceUpdate": false
//! }
//! ```
//!
//! # Cache Layout
//!
//! ```text
//! <install dir>/
//! └── cache/
//!     └── <product>-v<version>.<ext>
//! ```
//!
//! # Modules
//!
//! - [`bootstrapper`] - the orchestrator
//! - [`cli`] - command-line interface
//! - [`config`] - launcher configuration (TOML)
//! - [`core`] - error types and user-facing error display
//! - [`utils`] - file system, HTTP, logging and progress helpers

pub mod bootstrapper;
pub mod cli;
pub mod config;
pub mod core;
pub mod download;
pub mod launcher;
pub mod manifest;
pub mod planner;
pub mod state;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
