use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::common::cancel::CancelToken;
use crate::common::errors::DeleteError;
use crate::common::logging::OPS_TARGET;
use crate::common::safety::PathGuard;
use crate::scanner::walker;
use crate::whitelist::Whitelist;

/// Anything that can delete one path on behalf of a batch.
pub trait Deleter: Sync {
    /// Delete `path` (or only size it when `dry_run`), returning bytes freed.
    fn delete(&self, path: &Path, dry_run: bool) -> Result<u64, DeleteError>;
}

/// The single choke point every deletion passes through.
///
/// Holds no mutable state: safety comes from validating each input, so one
/// instance can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct SafeDelete {
    guard: PathGuard,
    whitelist: Option<Arc<Whitelist>>,
    cancel: CancelToken,
}

impl SafeDelete {
    pub fn new(guard: PathGuard) -> Self {
        Self {
            guard,
            whitelist: None,
            cancel: CancelToken::new(),
        }
    }

    /// Consult `whitelist` before the guard on every [`Deleter::delete`].
    pub fn with_whitelist(mut self, whitelist: Arc<Whitelist>) -> Self {
        self.whitelist = Some(whitelist);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    /// Validate, size and (unless `dry_run`) remove `path`.
    ///
    /// - A guard rejection returns [`DeleteError::Blocked`] and does no I/O.
    /// - A path that does not exist frees 0 bytes and is not an error.
    /// - The size is computed now, never taken from an earlier scan.
    /// - With `dry_run` nothing on disk is modified.
    /// - Removal failures are returned as [`DeleteError::Io`] without retry.
    pub fn safe_delete(&self, path: &Path, dry_run: bool) -> Result<u64, DeleteError> {
        self.guard
            .validate_path(path)
            .map_err(|reason| DeleteError::Blocked {
                path: path.to_path_buf(),
                reason,
            })?;

        let metadata = match std::fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "already gone");
                return Ok(0);
            }
            Err(source) => {
                return Err(DeleteError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let size = if metadata.is_dir() {
            walker::dir_size(path)
        } else {
            metadata.len()
        };

        if dry_run {
            return Ok(size);
        }

        if self.cancel.is_cancelled() {
            return Err(DeleteError::Cancelled {
                path: path.to_path_buf(),
            });
        }

        let removed = if metadata.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };

        match removed {
            Ok(()) => {
                info!(target: OPS_TARGET, op = "DELETE", status = "OK", path = %path.display(), size, "deleted");
                Ok(size)
            }
            Err(source) => {
                warn!(target: OPS_TARGET, op = "DELETE", status = "ERROR", path = %path.display(), error = %source, "delete failed");
                Err(DeleteError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Like [`SafeDelete::safe_delete`], but the operator's whitelist is
    /// consulted first and reported as [`DeleteError::Whitelisted`].
    pub fn safe_delete_with_whitelist<F>(
        &self,
        path: &Path,
        dry_run: bool,
        is_whitelisted: F,
    ) -> Result<u64, DeleteError>
    where
        F: Fn(&Path) -> bool,
    {
        if is_whitelisted(path) {
            return Err(DeleteError::Whitelisted {
                path: path.to_path_buf(),
            });
        }
        self.safe_delete(path, dry_run)
    }
}

impl Deleter for SafeDelete {
    fn delete(&self, path: &Path, dry_run: bool) -> Result<u64, DeleteError> {
        match &self.whitelist {
            Some(whitelist) => {
                self.safe_delete_with_whitelist(path, dry_run, |p| whitelist.is_whitelisted(p))
            }
            None => self.safe_delete(path, dry_run),
        }
    }
}

/// [`SafeDelete::safe_delete`] with the platform's default guard.
pub fn safe_delete(path: &Path, dry_run: bool) -> Result<u64, DeleteError> {
    SafeDelete::default().safe_delete(path, dry_run)
}

/// [`SafeDelete::safe_delete_with_whitelist`] with the platform's default guard.
pub fn safe_delete_with_whitelist<F>(
    path: &Path,
    dry_run: bool,
    is_whitelisted: F,
) -> Result<u64, DeleteError>
where
    F: Fn(&Path) -> bool,
{
    SafeDelete::default().safe_delete_with_whitelist(path, dry_run, is_whitelisted)
}
