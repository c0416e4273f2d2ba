//! Error handling for the bootstrapper
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`LauncherError`]) so the orchestrator can tell
//!    recoverable conditions (offline, failed download) from fatal ones
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!    for the terminal
//!
//! # Error Categories
//!
//! - **Connectivity**: [`LauncherError::ManifestUnavailable`], [`LauncherError::InvalidManifest`],
//!   [`LauncherError::NetworkError`], [`LauncherError::HttpStatus`], [`LauncherError::InvalidUrl`]
//! - **Initialization**: [`LauncherError::FirstRunOffline`], [`LauncherError::ConfigError`],
//!   [`LauncherError::ConfigNotFound`]
//! - **Update**: [`LauncherError::DownloadFailed`], [`LauncherError::ArtifactBusy`],
//!   [`LauncherError::StatePersist`]
//! - **Launch**: [`LauncherError::ExecutableNotFound`], [`LauncherError::RunnerNotFound`],
//!   [`LauncherError::SpawnFailed`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use bootstrapper::core::{LauncherError, user_friendly_error};
//!
//! let error = LauncherError::FirstRunOffline {
//!     path: "bootstrapper-meta.json".to_string(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for bootstrapper operations.
///
/// Variants carry the URL or path involved so messages can be shown to users
/// without further context. Only [`LauncherError::FirstRunOffline`] and
/// configuration errors are fatal; the orchestrator converts everything else
/// into offline mode, a failed `update()` or a launch exit code.
#[derive(Error, Debug)]
pub enum LauncherError {
    /// The remote manifest could not be fetched or decoded
    #[error("Manifest unavailable at {url}: {reason}")]
    ManifestUnavailable {
        /// Manifest URL
        url: String,
        /// Why the manifest could not be used
        reason: String,
    },

    /// The manifest body is not a JSON object
    #[error("Invalid manifest: {reason}")]
    InvalidManifest {
        /// What is wrong with the document
        reason: String,
    },

    /// No manifest and no local state: nothing is known about what to install
    #[error(
        "The local state file {path} does not exist. An internet connection is required for the first launch."
    )]
    FirstRunOffline {
        /// Expected location of the local state file
        path: String,
    },

    /// A URL could not be parsed or uses an unsupported scheme
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Parse or scheme error
        reason: String,
    },

    /// Transport-level failure (connect, TLS, timeout)
    #[error("Network error while {operation}: {reason}")]
    NetworkError {
        /// The network operation that failed
        operation: String,
        /// Reason for the network failure
        reason: String,
    },

    /// The server answered with a non-2xx status
    #[error("HTTP error {status} while {operation}: {url}")]
    HttpStatus {
        /// What the request was for
        operation: String,
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// Streaming the artifact to disk failed
    #[error("Failed to download artifact from {url}: {reason}")]
    DownloadFailed {
        /// Artifact URL
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// A file already occupies the download target and could not be removed
    #[error("Failed to delete existing file at {path}: {reason}")]
    ArtifactBusy {
        /// Download target
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// The local state file could not be written after a download
    #[error("Failed to persist local state to {path}: {reason}")]
    StatePersist {
        /// State file path
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// The cached artifact to launch does not exist
    #[error("Executable not found at path: {path}")]
    ExecutableNotFound {
        /// Expected artifact path
        path: String,
    },

    /// The configured runner program is not on `PATH`
    #[error("Runner '{program}' not found in PATH")]
    RunnerNotFound {
        /// Runner program name
        program: String,
    },

    /// The child process could not be started or awaited
    #[error("Failed to launch {path}: {reason}")]
    SpawnFailed {
        /// Artifact path
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// File system error
    #[error("File system error while {operation}: {path}")]
    FileSystemError {
        /// The file system operation that failed
        operation: String,
        /// Path where the file system error occurred
        path: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Configuration file passed explicitly but missing
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing configuration file
        path: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl LauncherError {
    /// Whether the error must stop the process before anything is launched.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::FirstRunOffline { .. } | Self::ConfigError { .. } | Self::ConfigNotFound { .. }
        )
    }
}

/// Error wrapper with user-facing details and a suggestion.
///
/// Rendered by `main` with terminal colors: the error in red, details in
/// yellow, the suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: LauncherError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: LauncherError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions where known.
///
/// [`LauncherError`]s get tailored suggestions; I/O errors are mapped by kind;
/// anything else is shown with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<LauncherError>() {
        Ok(launcher_error) => return create_error_context(launcher_error),
        Err(other) => other,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(LauncherError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check the permissions of the install directory and state file")
                .with_details("The bootstrapper needs write access to its install directory");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(LauncherError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(LauncherError::Other {
        message,
    })
}

fn create_error_context(error: LauncherError) -> ErrorContext {
    match &error {
        LauncherError::FirstRunOffline { .. } => ErrorContext::new(error)
            .with_suggestion("Connect to the internet and start the launcher again")
            .with_details("Nothing has been installed yet and the manifest could not be fetched"),

        LauncherError::ManifestUnavailable { url, .. } => {
            let suggestion = format!("Check that {url} is reachable and serves a JSON object");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        LauncherError::InvalidUrl { .. } => ErrorContext::new(error)
            .with_suggestion("Use an http://, https:// or file:// URL"),

        LauncherError::ConfigError { .. } | LauncherError::TomlError(_) => ErrorContext::new(error)
            .with_suggestion("Check the TOML syntax and field names in the configuration file"),

        LauncherError::ConfigNotFound { path } => {
            let suggestion = format!("Create {path} or omit --config to use the defaults");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        LauncherError::RunnerNotFound { program } => {
            let suggestion = format!(
                "Install '{program}' or set `runner = []` in the configuration to execute the artifact directly"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        LauncherError::ExecutableNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Start the launcher while online so the artifact can be downloaded")
            .with_details("The cache directory does not contain the installed version"),

        LauncherError::StatePersist { .. } => ErrorContext::new(error)
            .with_suggestion("Check the permissions of the state file; the update is retried on the next launch"),

        _ => ErrorContext::new(error),
    }
}
