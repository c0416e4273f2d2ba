//! File system helpers shared by the state store and the artifact cache.
//!
//! - [`dirs`] - directory creation and best-effort file removal
//! - [`atomic`] - temp-file-and-rename writes for the local state file

pub mod atomic;
pub mod dirs;

pub use atomic::{atomic_write, safe_write};
pub use dirs::{ensure_dir, ensure_parent_dir, remove_file_if_exists};
