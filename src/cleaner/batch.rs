use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use super::engine::Deleter;
use crate::common::cancel::CancelToken;
use crate::common::format;
use crate::common::logging::OPS_TARGET;
use crate::scanner::targets::{CleanItem, ScanResult};

/// Outcome of a batch: a best-effort summary, never all-or-nothing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub session_id: String,
    pub dry_run: bool,
    pub bytes_freed: u64,
    pub items_deleted: usize,
    /// Every failed item, policy refusals included
    pub error_count: usize,
    /// The subset of `error_count` refused by the guard or the whitelist
    pub blocked_count: usize,
    pub last_error: Option<String>,
    pub failures: Vec<BatchFailure>,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub message: String,
    /// `true` when the tool refused, `false` when the OS refused
    pub policy: bool,
}

impl BatchReport {
    pub fn items_attempted(&self) -> usize {
        self.items_deleted + self.error_count
    }
}

/// Delete each item independently.
///
/// A failing item is recorded and skipped; it never stops the remaining
/// deletions. Cancellation stops the loop before the next item.
pub fn delete_items<D>(
    deleter: &D,
    items: &[CleanItem],
    dry_run: bool,
    cancel: &CancelToken,
    show_progress: bool,
) -> BatchReport
where
    D: Deleter + ?Sized,
{
    let mut report = BatchReport {
        session_id: uuid::Uuid::new_v4().to_string(),
        dry_run,
        ..BatchReport::default()
    };

    if !dry_run {
        info!(target: OPS_TARGET, session = %report.session_id, items = items.len(), "SESSION START");
    }

    let pb = if show_progress {
        let pb = ProgressBar::new(items.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.red} [{bar:40.red/blue}] {pos}/{len} Deleting... {msg}")
        {
            pb.set_style(style.progress_chars("━━░"));
        }
        Some(pb)
    } else {
        None
    };

    for item in items {
        if cancel.is_cancelled() {
            report.cancelled = true;
            debug!(remaining = items.len() - report.items_attempted(), "batch cancelled");
            break;
        }

        if let Some(ref pb) = pb {
            pb.set_message(format::truncate_middle(&format::format_path(&item.path), 40));
        }

        match deleter.delete(&item.path, dry_run) {
            Ok(freed) => {
                report.bytes_freed += freed;
                report.items_deleted += 1;
            }
            Err(e) => {
                debug!(path = %item.path.display(), error = %e, "item skipped");
                report.error_count += 1;
                if e.is_policy() {
                    report.blocked_count += 1;
                }
                report.last_error = Some(e.to_string());
                report.failures.push(BatchFailure {
                    path: item.path.clone(),
                    message: e.to_string(),
                    policy: e.is_policy(),
                });
            }
        }

        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(ref pb) = pb {
        pb.finish_and_clear();
    }

    if !dry_run {
        info!(
            target: OPS_TARGET,
            session = %report.session_id,
            freed = %format::format_size(report.bytes_freed),
            files = report.items_deleted,
            errors = report.error_count,
            cancelled = report.cancelled,
            "SESSION END"
        );
    }

    report
}

/// Delete every item of every result, in result order.
pub fn delete_results<D>(
    deleter: &D,
    results: &[ScanResult],
    dry_run: bool,
    cancel: &CancelToken,
    show_progress: bool,
) -> BatchReport
where
    D: Deleter + ?Sized,
{
    let items: Vec<CleanItem> = results
        .iter()
        .flat_map(|r| r.items().iter().cloned())
        .collect();
    delete_items(deleter, &items, dry_run, cancel, show_progress)
}
