//! Exclusive access to a manifest for the duration of a synchronization run
//!
//! Two `srcsync` processes writing the same manifest would each save their own
//! view of it and one set of edits would be lost. A run therefore holds an
//! advisory lock on a sidecar `<manifest>.lock` file. Locks are released when
//! dropped.

use anyhow::{Context, Result, bail};
use fs4::fs_std::FileExt;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, warn};

/// Lock files older than this are left over from a crashed run
const STALE_THRESHOLD: Duration = Duration::from_secs(300);

/// Holds an exclusive lock on a manifest
///
/// The lock is automatically released when this struct is dropped.
#[derive(Debug)]
pub struct ManifestLock {
    /// Lock file handle
    lock_file: File,
    /// Path to the lock file (for error messages)
    lock_path: PathBuf,
}

impl ManifestLock {
    /// Sidecar lock path for a manifest
    #[must_use]
    pub fn lock_path_for(manifest: &Path) -> PathBuf {
        let mut name = manifest
            .file_name()
            .map_or_else(OsString::new, ToOwned::to_owned);
        name.push(".lock");
        manifest.with_file_name(name)
    }

    /// Acquire an exclusive lock for a manifest
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The lock file cannot be created
    /// - Another run holds the lock past the timeout
    pub fn acquire(manifest: &Path) -> Result<Self> {
        let lock_path = Self::lock_path_for(manifest);

        // Clean up a stale lock before attempting to acquire
        Self::cleanup_stale_lock(&lock_path);

        let lock_file = Self::try_acquire_lock(&lock_path, manifest)?;
        debug!(lock = %lock_path.display(), "manifest lock acquired");

        Ok(Self {
            lock_file,
            lock_path,
        })
    }

    /// Path of the held lock file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.lock_path
    }

    fn try_acquire_lock(lock_path: &Path, manifest: &Path) -> Result<File> {
        // Use shorter timeouts in test mode for faster test execution
        let lock_timeout = if cfg!(test) {
            Duration::from_millis(100)
        } else {
            Duration::from_secs(30)
        };
        let retry_interval = if cfg!(test) {
            Duration::from_millis(10)
        } else {
            Duration::from_millis(100)
        };

        let start = Instant::now();

        loop {
            let file = File::options()
                .create(true)
                .truncate(false)
                .write(true)
                .open(lock_path)
                .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

            match file.try_lock_exclusive() {
                Ok(true) => {
                    // Record the holder for whoever finds the file later
                    use std::io::Write;
                    file.set_len(0)
                        .with_context(|| format!("Failed to truncate lock file: {}", lock_path.display()))?;
                    let mut file_ref = &file;
                    writeln!(
                        file_ref,
                        "manifest={}\npid={}\ntime={}",
                        manifest.display(),
                        std::process::id(),
                        humantime::format_rfc3339(SystemTime::now())
                    )
                    .with_context(|| format!("Failed to write lock file: {}", lock_path.display()))?;
                    return Ok(file);
                }
                Ok(false) | Err(_) if start.elapsed() < lock_timeout => {
                    std::thread::sleep(retry_interval);
                }
                Ok(false) | Err(_) => {
                    bail!(
                        "Another srcsync run is already updating {}. \
                         Please wait for it to complete or remove stale lock at: {}",
                        manifest.display(),
                        lock_path.display()
                    );
                }
            }
        }
    }

    /// Remove the lock file if it is older than five minutes
    fn cleanup_stale_lock(lock_path: &Path) {
        if let Ok(metadata) = fs::metadata(lock_path)
            && let Ok(modified) = metadata.modified()
            && let Ok(elapsed) = modified.elapsed()
            && elapsed > STALE_THRESHOLD
        {
            if let Err(e) = fs::remove_file(lock_path) {
                warn!(lock = %lock_path.display(), error = %e, "failed to remove stale lock");
            } else {
                debug!(lock = %lock_path.display(), "removed stale lock");
            }
        }
    }

    /// Release the lock explicitly (normally handled by Drop)
    ///
    /// # Errors
    ///
    /// Returns an error if the unlock operation fails
    pub fn release(self) -> Result<()> {
        self.lock_file.unlock()?;
        // Drop removes the file
        Ok(())
    }
}

impl Drop for ManifestLock {
    fn drop(&mut self) {
        let _ = self.lock_file.unlock();

        if let Err(e) = fs::remove_file(&self.lock_path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(lock = %self.lock_path.display(), error = %e, "failed to remove lock file");
        }
    }
}
