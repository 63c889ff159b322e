use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::targets::{CleanItem, CleanTarget};
use super::ScanContext;
use crate::common::errors::ScanPathError;
use crate::common::paths;

/// Expand env tokens, then globs. A pattern whose glob yields nothing (or
/// is not a valid glob) falls back to the literal expanded path.
pub fn expand_pattern(raw: &str) -> Vec<PathBuf> {
    let expanded = paths::expand_env(raw);

    let matches: Vec<PathBuf> = match glob::glob(&expanded) {
        Ok(entries) => entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    debug!(pattern = %expanded, error = %e, "glob entry skipped");
                    None
                }
            })
            .collect(),
        Err(source) => {
            let err = ScanPathError::Glob {
                pattern: expanded.clone(),
                source,
            };
            debug!(error = %err, "treating pattern as a literal path");
            Vec::new()
        }
    };

    if matches.is_empty() {
        vec![PathBuf::from(expanded)]
    } else {
        matches
    }
}

/// What one target's walk produced.
#[derive(Debug, Default)]
pub struct TargetScan {
    pub items: Vec<CleanItem>,
    /// Paths dropped because they could not be read or walked.
    pub skipped: usize,
    /// Files the guard would refuse to delete, left out of the items.
    pub blocked: usize,
}

impl TargetScan {
    fn skip(&mut self, target: &CleanTarget, err: ScanPathError) {
        debug!(target_name = %target.name, error = %err, "path skipped");
        self.skipped += 1;
    }

    /// Keep a file only if deleting it would pass the full guard, so that a
    /// preview never lists what execution is bound to refuse.
    fn offer(&mut self, path: PathBuf, size_bytes: u64, target: &CleanTarget, ctx: &ScanContext<'_>) {
        match ctx.guard.validate_path(&path) {
            Ok(()) => self.items.push(make_item(path, size_bytes, target)),
            Err(reason) => {
                debug!(target_name = %target.name, path = %path.display(), %reason, "blocked; skipped");
                self.blocked += 1;
            }
        }
    }
}

/// Collect every regular file a target's patterns resolve to.
///
/// Whitelisted and protected paths are pruned, symlinks are never followed,
/// and per-path I/O failures are logged and counted.
pub fn scan_target(target: &CleanTarget, ctx: &ScanContext<'_>) -> TargetScan {
    let mut scan = TargetScan::default();

    for raw in &target.paths {
        for path in expand_pattern(raw) {
            if ctx.cancel.is_cancelled() {
                return scan;
            }
            if !is_scannable_root(&path, ctx) {
                continue;
            }

            let metadata = match std::fs::symlink_metadata(&path) {
                Ok(m) => m,
                Err(source) => {
                    scan.skip(target, ScanPathError::Stat { path, source });
                    continue;
                }
            };

            if metadata.is_dir() {
                walk_directory(&path, target, ctx, &mut scan);
            } else if metadata.is_file() {
                scan.offer(path, metadata.len(), target, ctx);
            }
        }
    }

    scan
}

fn is_scannable_root(path: &Path, ctx: &ScanContext<'_>) -> bool {
    let normalized = paths::normalize(&path.to_string_lossy());
    if !paths::is_absolute(&normalized) || paths::is_volume_root(&normalized) {
        debug!(path = %path.display(), "not an absolute, non-root path; skipped");
        return false;
    }
    if ctx.is_whitelisted(path) {
        debug!(path = %path.display(), "whitelisted; skipped");
        return false;
    }
    if ctx.guard.protects_contents(path) {
        debug!(path = %path.display(), "protected; skipped");
        return false;
    }
    true
}

fn walk_directory(
    dir: &Path,
    target: &CleanTarget,
    ctx: &ScanContext<'_>,
    scan: &mut TargetScan,
) {
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || (!ctx.is_whitelisted(e.path()) && ctx.guard.is_safe_path(e.path()))
        });

    for entry in walker {
        if ctx.cancel.is_cancelled() {
            debug!(target_name = %target.name, "walk cancelled");
            return;
        }

        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                scan.skip(target, ScanPathError::from(e));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => scan.offer(entry.into_path(), metadata.len(), target, ctx),
            Err(e) => scan.skip(target, ScanPathError::from(e)),
        }
    }
}

fn make_item(path: PathBuf, size_bytes: u64, target: &CleanTarget) -> CleanItem {
    CleanItem {
        path,
        size_bytes,
        category: target.category,
        description: target.description.clone(),
    }
}

/// Total size of the regular files under `path` (or of `path` itself when it
/// is a file). Symlinks are not followed and unreadable entries count as 0.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.metadata().map(|m| m.len()).unwrap_or(0))
        .sum()
}
