//! Update decision
//!
//! A pure function over already resolved facts. Versions are opaque strings
//! compared for equality only, so a manifest advertising an "older" version
//! is still an update.

use std::fmt;

/// Facts the decision is made from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanInput<'a> {
    /// The manifest could not be fetched or parsed.
    pub offline: bool,
    /// Version recorded in the local state.
    pub current_version: &'a str,
    /// Version advertised by the manifest, after fallbacks.
    pub latest_version: &'a str,
    /// Automatic updates are enabled.
    pub auto_update: bool,
    /// A one-shot reinstall was requested.
    pub force_update: bool,
    /// The cached artifact for the current version exists on disk.
    pub artifact_present: bool,
}

/// Outcome of [`plan`], with the reason it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateDecision {
    /// Skip: no manifest, updating is impossible.
    Offline,
    /// Skip: the installed version is the latest one.
    UpToDate,
    /// Skip: a new version exists but automatic updates are off.
    AutoUpdateDisabled,
    /// Update: the cached artifact is missing.
    ArtifactMissing,
    /// Update: a reinstall was forced.
    Forced,
    /// Update: a different version is available.
    NewVersion,
}

impl UpdateDecision {
    /// Whether a download should happen.
    #[must_use]
    pub const fn needs_update(self) -> bool {
        matches!(self, Self::ArtifactMissing | Self::Forced | Self::NewVersion)
    }
}

impl fmt::Display for UpdateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Offline => "offline, skipping update",
            Self::UpToDate => "installed version is up to date",
            Self::AutoUpdateDisabled => "new version available but auto-update is disabled",
            Self::ArtifactMissing => "cached artifact is missing",
            Self::Forced => "update was forced",
            Self::NewVersion => "new version available",
        };
        f.write_str(text)
    }
}

/// Decide whether to update.
///
/// ```text
/// offline ? skip : !artifact_present || force_update || (current != latest && auto_update)
/// ```
#[must_use]
pub fn plan(input: &PlanInput<'_>) -> UpdateDecision {
    if input.offline {
        return UpdateDecision::Offline;
    }
    if !input.artifact_present {
        return UpdateDecision::ArtifactMissing;
    }
    if input.force_update {
        return UpdateDecision::Forced;
    }
    if input.current_version == input.latest_version {
        return UpdateDecision::UpToDate;
    }
    if input.auto_update {
        UpdateDecision::NewVersion
    } else {
        UpdateDecision::AutoUpdateDisabled
    }
}
