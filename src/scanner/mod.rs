pub mod aggregate;
pub mod targets;
pub mod walker;

use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

use crate::common::cancel::CancelToken;
use crate::common::safety::PathGuard;
use crate::whitelist::Whitelist;
use targets::{CleanTarget, ScanResult};

pub use aggregate::{group_by_category, total_item_count, total_size_all};

/// Everything a scan worker needs besides its target.
#[derive(Debug, Clone)]
pub struct ScanContext<'a> {
    pub guard: &'a PathGuard,
    pub whitelist: Option<&'a Whitelist>,
    pub has_elevated_privilege: bool,
    pub cancel: CancelToken,
}

impl<'a> ScanContext<'a> {
    pub fn new(guard: &'a PathGuard) -> Self {
        Self {
            guard,
            whitelist: None,
            has_elevated_privilege: false,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_whitelist(mut self, whitelist: Option<&'a Whitelist>) -> Self {
        self.whitelist = whitelist;
        self
    }

    pub fn elevated(mut self, has_elevated_privilege: bool) -> Self {
        self.has_elevated_privilege = has_elevated_privilege;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_whitelisted(&self, path: &Path) -> bool {
        self.whitelist.is_some_and(|w| w.is_whitelisted(path))
    }
}

/// Scan all targets with the platform's default guard.
pub fn scan_all(
    targets: &[CleanTarget],
    whitelist: Option<&Whitelist>,
    has_elevated_privilege: bool,
) -> Vec<ScanResult> {
    let guard = PathGuard::system_default();
    let ctx = ScanContext::new(&guard)
        .with_whitelist(whitelist)
        .elevated(has_elevated_privilege);
    scan_all_with(targets, &ctx)
}

/// Main scan orchestrator: one parallel task per eligible target.
///
/// Targets that need elevation are left out entirely when the caller lacks
/// it, and targets that find nothing produce no result, so "skipped" and
/// "found nothing" stay distinguishable from "found something". Results are
/// sorted by target name regardless of completion order.
pub fn scan_all_with(targets: &[CleanTarget], ctx: &ScanContext<'_>) -> Vec<ScanResult> {
    let start = Instant::now();
    let results = Mutex::new(Vec::new());
    let skipped = AtomicUsize::new(0);
    let blocked = AtomicUsize::new(0);

    targets
        .par_iter()
        .filter(|target| {
            let allowed = !target.requires_elevated_privilege || ctx.has_elevated_privilege;
            if !allowed {
                debug!(target_name = %target.name, "requires elevation; skipped");
            }
            allowed
        })
        .for_each(|target| {
            let scan = walker::scan_target(target, ctx);
            skipped.fetch_add(scan.skipped, Ordering::Relaxed);
            blocked.fetch_add(scan.blocked, Ordering::Relaxed);
            debug!(
                target_name = %target.name,
                items = scan.items.len(),
                skipped = scan.skipped,
                blocked = scan.blocked,
                "target scanned"
            );
            if scan.items.is_empty() {
                return;
            }
            let result = ScanResult::from_items(target.name.clone(), scan.items);
            results
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(result);
        });

    let mut results = results.into_inner().unwrap_or_else(PoisonError::into_inner);
    results.sort_by(|a, b| a.name().cmp(b.name()));

    info!(
        targets = results.len(),
        items = total_item_count(&results),
        bytes = total_size_all(&results),
        skipped = skipped.into_inner(),
        blocked = blocked.into_inner(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        cancelled = ctx.cancel.is_cancelled(),
        "scan finished"
    );
    results
}
