//! Local installation state
//!
//! The state file records what is currently cached and the user's update
//! preferences:
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
//! It is read once at startup and written at most once, after a successful
//! download. Reading never fails: a missing or unreadable file yields
//! [`LocalState::default`]. Writing goes through a temp file that is renamed
//! over the target.

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, error};

use crate::core::LauncherError;
use crate::manifest::strip_line_breaks;
use crate::utils::fs::safe_write;

/// Version recorded when nothing has been installed yet.
pub const NOTHING_INSTALLED: &str = "0";

/// Product name recorded when no product has been installed yet.
pub const DEFAULT_PRODUCT: &str = "application";

/// Persisted installation state.
///
/// Field order is the order written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalState {
    /// Version of the cached artifact, `"0"` if nothing is installed.
    pub installed_version: String,
    /// Product name of the cached artifact.
    pub installed_product: String,
    /// Whether new versions are installed automatically.
    pub auto_update: bool,
    /// One-shot request to reinstall on the next online run.
    pub force_update: bool,
}

impl Default for LocalState {
    fn default() -> Self {
        Self {
            installed_version: NOTHING_INSTALLED.to_string(),
            installed_product: DEFAULT_PRODUCT.to_string(),
            auto_update: true,
            force_update: false,
        }
    }
}

impl LocalState {
    /// Decode a state document.
    ///
    /// Unknown fields are ignored. Each known field that is missing or has the
    /// wrong JSON type falls back to its own default.
    ///
    /// # Errors
    ///
    /// [`LauncherError::JsonError`] for malformed JSON and
    /// [`LauncherError::Other`] if the document is not an object.
    pub fn from_json(text: &str) -> Result<Self, LauncherError> {
        let Value::Object(fields) = serde_json::from_str::<Value>(text)? else {
            return Err(LauncherError::Other {
                message: "local state is not a JSON object".to_string(),
            });
        };

        let defaults = Self::default();
        Ok(Self {
            installed_version: string_field(&fields, "installedVersion")
                .unwrap_or(defaults.installed_version),
            installed_product: string_field(&fields, "installedProduct")
                .unwrap_or(defaults.installed_product),
            auto_update: bool_field(&fields, "autoUpdate").unwrap_or(defaults.auto_update),
            force_update: bool_field(&fields, "forceUpdate").unwrap_or(defaults.force_update),
        })
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, LauncherError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn bool_field(fields: &Map<String, Value>, key: &str) -> Option<bool> {
    fields.get(key)?.as_bool()
}

/// Reads and writes the local state file.
pub struct LocalStateStore;

impl LocalStateStore {
    /// Whether a state file exists at `path`.
    #[must_use]
    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }

    /// Load the state at `path`.
    ///
    /// Lines are joined without a separator before parsing. A missing file
    /// gives the defaults silently; unreadable or unparseable content gives
    /// the defaults and is logged on the error channel.
    #[must_use]
    pub fn load(path: &Path) -> LocalState {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No local state at {}, using defaults", path.display());
                return LocalState::default();
            }
            Err(e) => {
                error!("Failed to read local state {}: {e}", path.display());
                return LocalState::default();
            }
        };

        match LocalState::from_json(&strip_line_breaks(&content)) {
            Ok(state) => state,
            Err(e) => {
                error!("Failed to parse local state {}: {e}", path.display());
                LocalState::default()
            }
        }
    }

    /// Write `state` to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// [`LauncherError::StatePersist`] if the file cannot be written.
    pub fn save(path: &Path, state: &LocalState) -> Result<(), LauncherError> {
        let json = state.to_json()?;
        safe_write(path, &json).map_err(|e| LauncherError::StatePersist {
            path: path.display().to_string(),
            reason: format!("{e:#}"),
        })?;
        debug!("Saved local state to {}", path.display());
        Ok(())
    }
}
