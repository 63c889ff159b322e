use colored::*;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::cleaner::BatchReport;
use crate::common::format::{self, format_path, format_size, format_size_colored};
use crate::common::permissions::permission_hint;
use crate::scanner::targets::{Category, ScanResult};
use crate::scanner::{group_by_category, total_item_count, total_size_all};

/// Print scan results in human-readable format, grouped by category
pub fn print_scan_results(results: &[ScanResult], elapsed: Duration, detailed: bool) {
    let total_size = total_size_all(results);

    println!();
    println!("{}  SweepSafe Scan Results", "🧹");
    println!("{}", "─".repeat(60).dimmed());
    println!(
        "  Scanned in {}  •  {} reclaimable  •  {}",
        format::format_duration(elapsed).cyan(),
        format_size_colored(total_size),
        format::format_count(total_item_count(results)).dimmed()
    );
    println!("{}", "─".repeat(60).dimmed());
    println!();

    if results.is_empty() {
        println!("  {} Nothing to clean!", "✨");
        println!();
        return;
    }

    for (category, group) in group_by_category(results) {
        let group_total: u64 = group.iter().map(|r| r.total_size()).sum();
        println!(
            "  {} {} ({})",
            "●".green(),
            category_label(category).bold(),
            format_size_colored(group_total)
        );
        println!();
        for result in group {
            print_scan_result(result, detailed);
        }
        println!();
    }

    println!("{}", "─".repeat(60).dimmed());
    println!(
        "  {} Total reclaimable: {}",
        "💾",
        format_size_colored(total_size)
    );
    println!(
        "  {} Run {} to preview the cleanup",
        "💡",
        "sweepsafe clean".cyan()
    );
    println!();
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::User => "User Files",
        Category::Browser => "Browser Caches",
        Category::Dev => "Developer Caches",
        Category::System => "System Files",
    }
}

fn print_scan_result(result: &ScanResult, detailed: bool) {
    println!(
        "    {:<40} {:>10}  ({})",
        format::truncate_middle(result.name(), 40),
        format_size(result.total_size()),
        format::format_count(result.item_count()).dimmed()
    );

    if detailed {
        let mut sorted: Vec<_> = result.items().iter().collect();
        sorted.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
        for item in sorted.iter().take(5) {
            println!(
                "        {} {} ({})",
                "•".dimmed(),
                format_path(&item.path).dimmed(),
                format_size(item.size_bytes).dimmed()
            );
        }
        if result.item_count() > 5 {
            println!(
                "        {} ... and {} more",
                "•".dimmed(),
                (result.item_count() - 5).to_string().dimmed()
            );
        }
    }
}

#[derive(Serialize)]
struct ScanSummaryJson<'a> {
    total_size: u64,
    item_count: usize,
    results: &'a [ScanResult],
}

/// Print scan results as JSON
pub fn print_scan_json(results: &[ScanResult]) {
    let summary = ScanSummaryJson {
        total_size: total_size_all(results),
        item_count: total_item_count(results),
        results,
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing results: {}", e),
    }
}

/// Print a minimal summary
pub fn print_scan_quiet(results: &[ScanResult]) {
    println!(
        "{}  {}  {}",
        format_size(total_size_all(results)),
        total_item_count(results),
        results.len()
    );
}

/// Print the outcome of a real (or simulated) batch deletion
pub fn print_batch_report(report: &BatchReport) {
    println!();
    let (icon, label) = if report.dry_run {
        ("ℹ️", "Dry run")
    } else {
        ("🔥", "Deleted")
    };

    println!(
        "  {} {} — {} items, {}",
        icon,
        label.bold(),
        report.items_deleted.to_string().cyan(),
        format_size_colored(report.bytes_freed),
    );
    println!("  {} Session: {}", "💾", report.session_id.cyan());

    if report.cancelled {
        println!("  {} Cancelled before every item was processed", "⚠".yellow());
    }

    if report.error_count > 0 {
        println!();
        println!(
            "  {} {} errors ({} blocked by policy):",
            "⚠".yellow(),
            report.error_count,
            report.blocked_count
        );
        for (i, failure) in report.failures.iter().enumerate().take(10) {
            println!(
                "    {} {}",
                format!("{}.", i + 1).dimmed(),
                failure.message.dimmed()
            );
        }
        if report.failures.len() > 10 {
            println!(
                "    ... and {} more",
                (report.failures.len() - 10).to_string().dimmed()
            );
        }
        if let Some(failure) = report.failures.iter().find(|f| !f.policy) {
            println!("  {} {}", "💡", permission_hint(&failure.path).dimmed());
        }
    }
    println!();
}

pub fn print_batch_json(report: &BatchReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing report: {}", e),
    }
}

pub fn print_batch_quiet(report: &BatchReport) {
    println!(
        "{}  {}  {}  {}",
        format_size(report.bytes_freed),
        report.items_deleted,
        report.error_count,
        report.session_id
    );
}

/// Print whitelist patterns with the file they live in
pub fn print_whitelist(patterns: &[String], file: &Path) {
    println!();
    println!("  {} Whitelist ({})", "🛡", format_path(file).dimmed());
    println!("{}", "─".repeat(60).dimmed());
    if patterns.is_empty() {
        println!("  {}", "No patterns.".dimmed());
    }
    for pattern in patterns {
        println!("    {} {}", "•".dimmed(), pattern);
    }
    println!();
}
