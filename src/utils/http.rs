//! HTTP client construction and URL handling
//!
//! Both network calls of a run (manifest and artifact) go through a client
//! built by [`build_client`] with their own [`TimeoutProfile`]. Manifest and
//! artifact URLs may also point at the local file system: `file://` URLs and
//! plain paths resolve to [`UrlTarget::File`].

use reqwest::Url;
use std::path::PathBuf;

use crate::config::TimeoutProfile;
use crate::core::LauncherError;

/// Where a URL points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlTarget {
    /// Remote resource fetched over HTTP(S).
    Http(Url),
    /// Local file read from disk.
    File(PathBuf),
}

/// Classify a manifest or artifact URL.
///
/// - `http://` and `https://` URLs are fetched over the network
/// - `file://` URLs are converted to local paths
/// - strings that are not URLs at all (relative or Windows paths) are paths
///
/// # Errors
///
/// [`LauncherError::InvalidUrl`] for empty input, other schemes, or `file://`
/// URLs that do not map to a local path.
pub fn resolve_url(raw: &str) -> Result<UrlTarget, LauncherError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid(raw, "URL is empty"));
    }

    // Plain paths, including Windows drive paths like `C:\app\meta.json`
    if !trimmed.contains("://") && !trimmed.starts_with("file:") {
        return Ok(UrlTarget::File(PathBuf::from(trimmed)));
    }

    let url = Url::parse(trimmed).map_err(|e| invalid(raw, &e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(UrlTarget::Http(url)),
        "file" => url
            .to_file_path()
            .map(UrlTarget::File)
            .map_err(|()| invalid(raw, "file URL does not name a local path")),
        scheme => Err(invalid(raw, &format!("unsupported scheme '{scheme}'"))),
    }
}

/// Build an HTTP client with the given timeouts and user agent.
///
/// # Errors
///
/// [`LauncherError::NetworkError`] if the TLS backend cannot be initialised.
pub fn build_client(
    profile: &TimeoutProfile,
    user_agent: &str,
) -> Result<reqwest::Client, LauncherError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(profile.connect())
        .read_timeout(profile.read())
        .build()
        .map_err(|e| LauncherError::NetworkError {
            operation: "creating HTTP client".to_string(),
            reason: e.to_string(),
        })
}

/// Describe a `reqwest` failure including its source chain.
///
/// `reqwest` keeps the interesting part (connection refused, timed out) in
/// the source errors.
#[must_use]
pub fn describe_error(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn invalid(url: &str, reason: &str) -> LauncherError {
    LauncherError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
