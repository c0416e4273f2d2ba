//! Supporting utilities
//!
//! - [`fs`] - directory creation and atomic writes
//! - [`http`] - HTTP client profiles and URL classification
//! - [`logging`] - the two log channels
//! - [`progress`] - presentation boundary notified while updating

pub mod fs;
pub mod http;
pub mod logging;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, safe_write};
pub use http::{UrlTarget, build_client, resolve_url};
pub use progress::{NoProgress, SpinnerProgress, UpdateProgress};
