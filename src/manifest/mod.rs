//! Remote manifest fetching and decoding
//!
//! The manifest is a small JSON object published next to the artifact:
//!
//! ```json
//! {
//!   "name": "App",
//!   "version": "2",
//!   "downloadUrl": "https://example.com/app-2.jar"
//! }
//! ```
//!
//! Every field is optional. [`RemoteManifest::from_json`] decodes it once into
//! an immutable value; the fallback rules for missing fields are applied by
//! the orchestrator when it resolves the session.
//!
//! [`ManifestFetcher`] retrieves the document over HTTP(S) or from the local
//! file system. Any failure (transport, status, encoding, JSON) is reported as
//! "no manifest", which switches the launcher to offline mode.

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::config::LauncherConfig;
use crate::core::LauncherError;
use crate::utils::http::{UrlTarget, build_client, describe_error, resolve_url};

/// Decoded remote manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteManifest {
    /// Product identifier, used to name cached artifacts.
    pub name: Option<String>,
    /// Latest available version, compared by string equality only.
    pub version: Option<String>,
    /// Where the artifact for `version` can be downloaded.
    pub download_url: Option<String>,
}

impl RemoteManifest {
    /// Decode a manifest document.
    ///
    /// String fields are taken as-is, numbers and booleans are rendered as
    /// their JSON text, anything else counts as absent. A blank `downloadUrl`
    /// counts as absent as well.
    ///
    /// `name` and `version` become part of the cached artifact's file name,
    /// so they must not contain path separators.
    ///
    /// # Errors
    ///
    /// - [`LauncherError::JsonError`] for empty or malformed JSON
    /// - [`LauncherError::InvalidManifest`] if the document is not an object
    ///   or `name`/`version` would escape the cache directory
    pub fn from_json(text: &str) -> Result<Self, LauncherError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(fields) = value else {
            return Err(LauncherError::InvalidManifest {
                reason: format!("expected a JSON object, found {}", json_kind(&value)),
            });
        };

        Ok(Self {
            name: file_name_field(&fields, "name")?,
            version: file_name_field(&fields, "version")?,
            download_url: scalar_field(&fields, "downloadUrl").filter(|url| !url.trim().is_empty()),
        })
    }
}

/// A manifest together with the text it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedManifest {
    /// Response body with line breaks removed.
    pub raw: String,
    /// Decoded manifest.
    pub manifest: RemoteManifest,
}

/// Retrieves the manifest with the manifest timeout profile.
pub struct ManifestFetcher {
    client: reqwest::Client,
}

impl ManifestFetcher {
    /// Create a fetcher using the manifest timeouts and user agent of `config`.
    pub fn new(config: &LauncherConfig) -> Result<Self, LauncherError> {
        Ok(Self {
            client: build_client(&config.manifest_timeouts, &config.user_agent)?,
        })
    }

    /// Fetch the document at `url` as text.
    ///
    /// Any 2xx response is accepted. The body must be UTF-8; line breaks are
    /// removed, joining lines without a separator.
    ///
    /// # Errors
    ///
    /// [`LauncherError::InvalidUrl`], [`LauncherError::NetworkError`],
    /// [`LauncherError::HttpStatus`] or [`LauncherError::ManifestUnavailable`]
    /// for unreadable files and non-UTF-8 bodies.
    pub async fn fetch(&self, url: &str) -> Result<String, LauncherError> {
        debug!("Fetching data from: {url}");

        let bytes = match resolve_url(url)? {
            UrlTarget::Http(target) => {
                let response =
                    self.client.get(target).send().await.map_err(|e| LauncherError::NetworkError {
                        operation: format!("fetching manifest from {url}"),
                        reason: describe_error(&e),
                    })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(LauncherError::HttpStatus {
                        operation: "fetching manifest".to_string(),
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }

                response.bytes().await.map_err(|e| LauncherError::NetworkError {
                    operation: format!("reading manifest from {url}"),
                    reason: describe_error(&e),
                })?
                .to_vec()
            }
            UrlTarget::File(path) => {
                tokio::fs::read(&path).await.map_err(|e| LauncherError::ManifestUnavailable {
                    url: url.to_string(),
                    reason: format!("cannot read {}: {e}", path.display()),
                })?
            }
        };

        let text = String::from_utf8(bytes).map_err(|e| LauncherError::ManifestUnavailable {
            url: url.to_string(),
            reason: format!("body is not valid UTF-8: {e}"),
        })?;

        Ok(strip_line_breaks(&text))
    }

    /// Fetch and decode the manifest, or `None` if it is unavailable.
    ///
    /// Failures are logged on the error channel and never returned: the
    /// caller treats `None` as offline mode.
    pub async fn fetch_manifest(&self, url: &str) -> Option<FetchedManifest> {
        let raw = match self.fetch(url).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Error fetching data from URL: {e}");
                return None;
            }
        };

        match RemoteManifest::from_json(&raw) {
            Ok(manifest) => Some(FetchedManifest {
                raw,
                manifest,
            }),
            Err(e) => {
                error!("The data from {url} could not be parsed: {e}");
                None
            }
        }
    }
}

/// Join lines without a separator, dropping `\n` and `\r\n`.
pub(crate) fn strip_line_breaks(text: &str) -> String {
    text.lines().collect()
}

fn scalar_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn file_name_field(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, LauncherError> {
    match scalar_field(fields, key) {
        Some(value) if value.contains(['/', '\\', '\0']) => Err(LauncherError::InvalidManifest {
            reason: format!("{key} '{}' contains a path separator", value.escape_default()),
        }),
        other => Ok(other),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
