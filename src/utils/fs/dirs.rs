//! Directory operations and file removal.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// Returns `Ok(true)` when the directory had to be created, `Ok(false)` when it
/// already existed.
///
/// # Errors
///
/// Fails if the path exists but is not a directory, or creation fails.
///
/// # Examples
///
/// ```rust,no_run
/// use bootstrapper::utils::fs::ensure_dir;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// if ensure_dir(Path::new("install/cache"))? {
///     println!("first launch");
/// }
/// # Ok(())
/// # }
/// ```
pub fn ensure_dir(path: &Path) -> Result<bool> {
    if !path.exists() {
        fs::create_dir_all(path).with_context(|| {
            format!(
                "Failed to create directory: {}\n\nCheck directory permissions and path validity",
                path.display()
            )
        })?;
        return Ok(true);
    }

    if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(false)
}

/// Ensures that the parent directory of a file path exists.
///
/// Paths without a parent (bare file names) need no directory.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Removes a file if it exists.
///
/// Returns `Ok(true)` if a file was removed and `Ok(false)` if there was
/// nothing to remove.
pub fn remove_file_if_exists(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
