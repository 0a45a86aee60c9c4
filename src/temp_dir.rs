//! Scoped temporary directories
//!
//! A [`ScopedTempDir`] owns a freshly created, uniquely named directory and
//! removes it recursively when the scope ends. [`ScopedTempDir::close`]
//! surfaces removal failures; dropping without `close` logs them instead.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{FixtureError, Result};

/// Name prefix of every directory created here
pub const DIR_PREFIX: &str = "fluxflow-";

/// Temporary directory removed at end of scope
///
/// # Example
///
/// ```rust
/// use fluxflow_fixtures::ScopedTempDir;
///
/// let dir = ScopedTempDir::acquire().unwrap();
/// let path = dir.path().to_path_buf();
/// std::fs::write(path.join("model.safetensors"), b"stub").unwrap();
///
/// dir.close().unwrap();
/// assert!(!path.exists());
/// ```
#[derive(Debug)]
pub struct ScopedTempDir {
    inner: Option<TempDir>,
    path: PathBuf,
}

impl ScopedTempDir {
    /// Create a new empty directory under the system temp dir
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the directory cannot be created.
    pub fn acquire() -> Result<Self> {
        Self::create(tempfile::Builder::new().prefix(DIR_PREFIX).tempdir())
    }

    /// Create a new empty directory under `parent`
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the directory cannot be created.
    pub fn acquire_in(parent: impl AsRef<Path>) -> Result<Self> {
        Self::create(
            tempfile::Builder::new()
                .prefix(DIR_PREFIX)
                .tempdir_in(parent.as_ref()),
        )
    }

    fn create(created: std::io::Result<TempDir>) -> Result<Self> {
        let dir = created.map_err(|e| FixtureError::IoError {
            message: format!("Failed to create scoped directory: {e}"),
        })?;
        let path = dir.path().to_path_buf();
        debug!(path = %path.display(), "acquired scoped directory");
        Ok(Self {
            inner: Some(dir),
            path,
        })
    }

    /// Directory path, valid until the scope ends
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory currently exists on disk
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Remove the directory and its contents
    ///
    /// # Errors
    ///
    /// Returns `Cleanup` if removal fails.
    pub fn close(mut self) -> Result<()> {
        match self.inner.take() {
            Some(dir) => remove(dir, &self.path),
            None => Ok(()),
        }
    }
}

impl AsRef<Path> for ScopedTempDir {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedTempDir {
    fn drop(&mut self) {
        if let Some(dir) = self.inner.take() {
            if let Err(e) = remove(dir, &self.path) {
                warn!(error = %e, "scoped directory left behind on drop");
            }
        }
    }
}

fn remove(dir: TempDir, path: &Path) -> Result<()> {
    dir.close().map_err(|e| FixtureError::Cleanup {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), "removed scoped directory");
    Ok(())
}

/// Run `f` with a scoped directory, removing it afterwards
///
/// An error from `f` takes precedence over a cleanup error; the cleanup
/// error is then only logged. If `f` panics, the directory is removed while
/// unwinding.
///
/// # Errors
///
/// Returns the error from `f`, or the creation/cleanup error converted into `E`.
///
/// # Example
///
/// ```rust
/// use fluxflow_fixtures::{temp_dir::with_temp_dir, FixtureError};
///
/// let kept = with_temp_dir(|dir| {
///     let file = dir.join("dims.json");
///     std::fs::write(&file, "{}").map_err(|e| FixtureError::IoError {
///         message: e.to_string(),
///     })?;
///     Ok::<_, FixtureError>(file)
/// })
/// .unwrap();
/// assert!(!kept.exists());
/// ```
pub fn with_temp_dir<T, E, F>(f: F) -> std::result::Result<T, E>
where
    F: FnOnce(&Path) -> std::result::Result<T, E>,
    E: From<FixtureError>,
{
    let dir = ScopedTempDir::acquire()?;
    let outcome = f(dir.path());
    let cleanup = dir.close();

    match (outcome, cleanup) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(cleanup_err)) => Err(cleanup_err.into()),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(cleanup_err)) => {
            warn!(error = %cleanup_err, "cleanup failed after in-scope error");
            Err(err)
        }
    }
}
