use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::common::format::format_size;
use crate::scanner::targets::ScanResult;

/// One path that would be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DryRunItem {
    pub path: PathBuf,
    pub size: u64,
    pub category: String,
}

/// Per-category totals of a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    pub count: usize,
    pub size: u64,
}

/// Records what a cleanup WOULD delete, for review before execution.
///
/// Append-only and safe to fill from several threads. Lives for one
/// session; only [`DryRunLedger::export_to_file`] persists anything.
#[derive(Debug, Default)]
pub struct DryRunLedger {
    items: Mutex<Vec<DryRunItem>>,
}

impl DryRunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger over the same result set a real cleanup would consume.
    pub fn from_results(results: &[ScanResult]) -> Self {
        let ledger = Self::new();
        for result in results {
            for item in result.items() {
                ledger.add(item.path.clone(), item.size_bytes, item.category);
            }
        }
        ledger
    }

    pub fn add(&self, path: impl Into<PathBuf>, size: u64, category: impl ToString) {
        self.lock().push(DryRunItem {
            path: path.into(),
            size,
            category: category.to_string(),
        });
    }

    pub fn total_size(&self) -> u64 {
        self.lock().iter().map(|i| i.size).sum()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// A copy of the recorded items in insertion order.
    pub fn items(&self) -> Vec<DryRunItem> {
        self.lock().clone()
    }

    /// Totals grouped by category, ordered by category name.
    pub fn category_summary(&self) -> BTreeMap<String, CategoryTotals> {
        summarize(&self.lock())
    }

    /// The terminal summary: banner, one row per category, a TOTAL row.
    pub fn render_summary(&self) -> String {
        let items = self.lock();
        if items.is_empty() {
            return "  Nothing to clean.\n".to_string();
        }

        let mut out = String::new();
        out.push('\n');
        out.push_str("  ╔══════════════════════════════════════════╗\n");
        out.push_str("  ║        DRY RUN — No files deleted        ║\n");
        out.push_str("  ╚══════════════════════════════════════════╝\n\n");

        for (category, totals) in summarize(&items) {
            let _ = writeln!(
                out,
                "  {:<20}  {:>5} items  {:>10}",
                category.to_uppercase(),
                totals.count,
                format_size(totals.size)
            );
        }

        let total: u64 = items.iter().map(|i| i.size).sum();
        out.push_str("  ──────────────────────────────────────────\n");
        let _ = writeln!(
            out,
            "  {:<20}  {:>5} items  {:>10}",
            "TOTAL",
            items.len(),
            format_size(total)
        );
        out.push('\n');
        out.push_str("  Run with --execute to perform the cleanup.\n");
        out
    }

    pub fn print_summary(&self) {
        print!("{}", self.render_summary());
    }

    /// The plain-text report, stamped with `timestamp`.
    ///
    /// Categories are sorted by name and items keep insertion order, so two
    /// runs over the same filesystem state diff cleanly apart from the header.
    pub fn render_report(&self, timestamp: DateTime<Local>) -> String {
        let items = self.lock();
        let rule = "=".repeat(60);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "SweepSafe Dry Run Report — {}",
            timestamp.format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(out, "{}\n", rule);

        let mut grouped: BTreeMap<&str, Vec<&DryRunItem>> = BTreeMap::new();
        for item in items.iter() {
            grouped.entry(item.category.as_str()).or_default().push(item);
        }

        for (category, entries) in &grouped {
            let size: u64 = entries.iter().map(|i| i.size).sum();
            let _ = writeln!(
                out,
                "[{}] — {} items, {}",
                category.to_uppercase(),
                entries.len(),
                format_size(size)
            );
            for item in entries {
                let _ = writeln!(out, "  {:>10}  {}", format_size(item.size), item.path.display());
            }
            out.push('\n');
        }

        let total: u64 = items.iter().map(|i| i.size).sum();
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Total: {} items, {}", items.len(), format_size(total));
        out
    }

    /// Write the report to `path`, creating parent directories.
    pub fn export_to_file(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create export directory: {}", dir.display()))?;
        }
        let report = self.render_report(Local::now());
        std::fs::write(path, report)
            .with_context(|| format!("Cannot write export file: {}", path.display()))?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DryRunItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn summarize(items: &[DryRunItem]) -> BTreeMap<String, CategoryTotals> {
    let mut summary: BTreeMap<String, CategoryTotals> = BTreeMap::new();
    for item in items {
        let entry = summary.entry(item.category.clone()).or_default();
        entry.count += 1;
        entry.size += item.size;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> DryRunLedger {
        let ledger = DryRunLedger::new();
        ledger.add("/cache/b.bin", 2048, "dev");
        ledger.add("/tmp/a.tmp", 10, "user");
        ledger.add("/cache/a.bin", 1024, "dev");
        ledger
    }

    #[test]
    fn test_totals_and_summary() {
        let ledger = sample();
        assert_eq!(ledger.count(), 3);
        assert_eq!(ledger.total_size(), 3082);

        let summary = ledger.category_summary();
        assert_eq!(summary["dev"], CategoryTotals { count: 2, size: 3072 });
        assert_eq!(summary["user"], CategoryTotals { count: 1, size: 10 });
    }

    #[test]
    fn test_report_layout() {
        let ts = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let report = sample().render_report(ts);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "SweepSafe Dry Run Report — 2026-01-02 03:04:05");
        assert_eq!(lines[1], "=".repeat(60));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "[DEV] — 2 items, 3.0 KB");
        assert_eq!(lines[4], "      2.0 KB  /cache/b.bin");
        assert_eq!(lines[5], "      1.0 KB  /cache/a.bin");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "[USER] — 1 items, 10 B");
        assert_eq!(lines[8], "        10 B  /tmp/a.tmp");
        assert_eq!(lines.last(), Some(&"Total: 3 items, 3.0 KB"));
    }

    #[test]
    fn test_report_is_deterministic() {
        let ts = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(sample().render_report(ts), sample().render_report(ts));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(DryRunLedger::new().render_summary(), "  Nothing to clean.\n");
    }

    #[test]
    fn test_concurrent_adds() {
        let ledger = DryRunLedger::new();
        std::thread::scope(|s| {
            for t in 0..8 {
                let ledger = &ledger;
                s.spawn(move || {
                    for i in 0..100 {
                        ledger.add(format!("/scan/{}/{}", t, i), 1, "user");
                    }
                });
            }
        });
        assert_eq!(ledger.count(), 800);
        assert_eq!(ledger.total_size(), 800);
    }
}
