//! Presentation boundary for update progress
//!
//! The orchestrator reports what it is doing through the [`UpdateProgress`]
//! trait: `show_progress()` before an update, `set_status_text()` while
//! downloading and `hide_progress()` afterwards. Every method has a no-op
//! default, so the core works the same with [`NoProgress`] or with no
//! presentation layer at all.
//!
//! [`SpinnerProgress`] is the terminal implementation used by the CLI: an
//! `indicatif` spinner on stderr showing the latest status text.
//!
//! # Environment Variables
//!
//! - `BOOTSTRAPPER_NO_PROGRESS`: Set to any value to keep the spinner hidden
//!
//! # Examples
//!
//! ```rust,no_run
//! use bootstrapper::utils::progress::{SpinnerProgress, UpdateProgress};
//!
//! let progress = SpinnerProgress::new();
//! progress.show_progress();
//! progress.set_status_text("Updating to version 2...");
//! progress.hide_progress();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressDrawTarget, ProgressStyle as IndicatifStyle};
use std::sync::Arc;
use std::time::Duration;

/// Checks if progress indicators should be disabled.
///
/// Progress is disabled when the `BOOTSTRAPPER_NO_PROGRESS` environment
/// variable is set to any value.
fn is_progress_disabled() -> bool {
    std::env::var("BOOTSTRAPPER_NO_PROGRESS").is_ok()
}

/// Receiver of progress notifications from the orchestrator.
///
/// Implementations must never influence control flow: the orchestrator ignores
/// everything that happens inside these calls.
pub trait UpdateProgress: Send + Sync {
    /// Called before the update check starts.
    fn show_progress(&self) {}

    /// Called once the update phase is over, successful or not.
    fn hide_progress(&self) {}

    /// Called with a human-readable status while updating.
    fn set_status_text(&self, _message: &str) {}
}

impl<T: UpdateProgress + ?Sized> UpdateProgress for Arc<T> {
    fn show_progress(&self) {
        (**self).show_progress();
    }

    fn hide_progress(&self) {
        (**self).hide_progress();
    }

    fn set_status_text(&self, message: &str) {
        (**self).set_status_text(message);
    }
}

/// Presentation layer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl UpdateProgress for NoProgress {}

/// Terminal spinner showing the current status text.
///
/// The spinner is created hidden and only starts drawing on
/// [`UpdateProgress::show_progress`].
pub struct SpinnerProgress {
    inner: IndicatifBar,
}

impl SpinnerProgress {
    /// Creates a hidden spinner with the initial status "Checking for updates...".
    #[must_use]
    pub fn new() -> Self {
        let bar = IndicatifBar::hidden();
        bar.set_style(spinner_style());
        bar.set_message("Checking for updates...");
        Self {
            inner: bar,
        }
    }

    /// Current status text, mostly useful in tests.
    #[must_use]
    pub fn status_text(&self) -> String {
        self.inner.message()
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateProgress for SpinnerProgress {
    fn show_progress(&self) {
        if is_progress_disabled() {
            return;
        }
        self.inner.set_draw_target(ProgressDrawTarget::stderr());
        self.inner.enable_steady_tick(Duration::from_millis(100));
    }

    fn hide_progress(&self) {
        self.inner.finish_and_clear();
    }

    fn set_status_text(&self, message: &str) {
        self.inner.set_message(message.to_string());
    }
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}

/// Render a byte count the way status messages show it.
#[must_use]
pub fn human_readable_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}
