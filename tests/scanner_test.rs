use std::fs;
use std::path::Path;
use tempfile::TempDir;

use sweepsafe::common::cancel::CancelToken;
use sweepsafe::common::format;
use sweepsafe::common::safety::{NeverDeleteSet, PathGuard};
use sweepsafe::scanner::targets::{Category, CleanTarget, ScanResult};
use sweepsafe::scanner::{self, walker, ScanContext};
use sweepsafe::whitelist::Whitelist;

fn test_guard() -> PathGuard {
    PathGuard::new(NeverDeleteSet::from_paths(["/srv/never-touch"]))
}

fn write_file(path: &Path, size: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![b'x'; size]).unwrap();
}

fn no_whitelist(dir: &TempDir) -> Whitelist {
    Whitelist::with_patterns(dir.path().join("whitelist.txt"), Vec::<String>::new())
}

// ─── Temp scenario ───────────────────────────────────────────────────────────

#[test]
fn test_temp_target_honors_whitelist() {
    let temp = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    write_file(&temp.path().join("a.tmp"), 10);
    write_file(&temp.path().join("b.tmp"), 20);
    write_file(&temp.path().join("c.tmp"), 30);

    std::env::set_var("SWEEPSAFE_TEST_SCAN_TEMP", temp.path());
    let target = CleanTarget::new("Temp", Category::User).with_path("%SWEEPSAFE_TEST_SCAN_TEMP%");

    let whitelist = no_whitelist(&config);
    whitelist
        .add(&temp.path().join("b.tmp").to_string_lossy())
        .unwrap();

    let guard = test_guard();
    let ctx = ScanContext::new(&guard).with_whitelist(Some(&whitelist));
    let results = scanner::scan_all_with(&[target], &ctx);

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.name(), "Temp");
    assert_eq!(result.item_count(), 2);
    assert_eq!(result.total_size(), 40);
    assert!(result.total_size() <= 50);
    assert_eq!(
        result.total_size(),
        result.items().iter().map(|i| i.size_bytes).sum::<u64>()
    );
    assert!(result.items().iter().all(|i| i.category == Category::User));
    assert!(result.items().iter().all(|i| !i.path.ends_with("b.tmp")));
}

#[test]
fn test_whitelisted_directory_is_pruned() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("keep/inner/a.bin"), 100);
    write_file(&temp.path().join("drop/b.bin"), 7);

    let whitelist = no_whitelist(&temp);
    whitelist
        .add(&temp.path().join("keep").to_string_lossy())
        .unwrap();

    let target = CleanTarget::new("Cache", Category::Dev).with_path(temp.path().to_string_lossy());
    let guard = test_guard();
    let ctx = ScanContext::new(&guard).with_whitelist(Some(&whitelist));
    let results = scanner::scan_all_with(&[target], &ctx);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].item_count(), 1);
    assert_eq!(results[0].total_size(), 7);
}

#[test]
fn test_protected_subtree_is_not_descended() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("system/core.dat"), 50);
    write_file(&temp.path().join("cache/junk.dat"), 5);

    let guard = PathGuard::new(NeverDeleteSet::from_paths([temp
        .path()
        .join("system")
        .to_string_lossy()]));
    let target = CleanTarget::new("Mixed", Category::User).with_path(temp.path().to_string_lossy());
    let results = scanner::scan_all_with(&[target], &ScanContext::new(&guard));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].total_size(), 5);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_skipped_not_followed() {
    use std::os::unix::fs::symlink;

    let outside = TempDir::new().unwrap();
    write_file(&outside.path().join("precious/data.db"), 500);
    write_file(&outside.path().join("single.bin"), 300);

    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("real.tmp"), 9);
    symlink(outside.path().join("precious"), temp.path().join("dir_link")).unwrap();
    symlink(outside.path().join("single.bin"), temp.path().join("file_link")).unwrap();
    symlink(temp.path().join("gone"), temp.path().join("dangling")).unwrap();

    let guard = test_guard();
    let target = CleanTarget::new("Linked", Category::User).with_path(temp.path().to_string_lossy());
    let results = scanner::scan_all_with(&[target], &ScanContext::new(&guard));

    assert_eq!(results.len(), 1);
    let paths: Vec<_> = results[0].items().iter().map(|i| i.path.clone()).collect();
    assert_eq!(paths, vec![temp.path().join("real.tmp")]);
    assert_eq!(results[0].total_size(), 9);

    // A link used as the target root is not walked either.
    let link_root = CleanTarget::new("LinkRoot", Category::User)
        .with_path(temp.path().join("dir_link").to_string_lossy());
    let scan = walker::scan_target(&link_root, &ScanContext::new(&guard));
    assert!(scan.items.is_empty());
    assert!(scanner::scan_all_with(&[link_root], &ScanContext::new(&guard)).is_empty());
}

#[cfg(unix)]
#[test]
fn test_files_the_guard_refuses_are_not_listed() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("ok.tmp"), 4);
    write_file(&temp.path().join("bad\u{1}name.tmp"), 6);

    let target = CleanTarget::new("Temp", Category::User).with_path(temp.path().to_string_lossy());
    let guard = test_guard();
    let scan = walker::scan_target(&target, &ScanContext::new(&guard));

    assert_eq!(scan.items.len(), 1);
    assert_eq!(scan.items[0].size_bytes, 4);
    assert_eq!(scan.blocked, 1);
    assert_eq!(scan.skipped, 0);
}

// ─── Orchestration ───────────────────────────────────────────────────────────

#[test]
fn test_results_sorted_and_empty_targets_dropped() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("zeta/f"), 1);
    write_file(&temp.path().join("alpha/f"), 2);
    write_file(&temp.path().join("mid/f"), 3);

    let targets: Vec<CleanTarget> = ["Zeta", "Alpha", "Mid"]
        .iter()
        .map(|name| {
            CleanTarget::new(*name, Category::User)
                .with_path(temp.path().join(name.to_lowercase()).to_string_lossy())
        })
        .chain(std::iter::once(
            CleanTarget::new("Missing", Category::User)
                .with_path(temp.path().join("not-there").to_string_lossy()),
        ))
        .collect();

    let guard = test_guard();
    let results = scanner::scan_all_with(&targets, &ScanContext::new(&guard));
    let names: Vec<&str> = results.iter().map(ScanResult::name).collect();
    assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    assert_eq!(scanner::total_size_all(&results), 6);
    assert_eq!(scanner::total_item_count(&results), 3);
}

#[test]
fn test_elevated_targets_skipped_without_privilege() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("sys/f"), 4);

    let target = CleanTarget::new("SystemTemp", Category::System)
        .with_path(temp.path().join("sys").to_string_lossy())
        .elevated();
    let guard = test_guard();

    let plain = scanner::scan_all_with(&[target.clone()], &ScanContext::new(&guard));
    assert!(plain.is_empty());

    let elevated = scanner::scan_all_with(&[target], &ScanContext::new(&guard).elevated(true));
    assert_eq!(elevated.len(), 1);
    assert_eq!(elevated[0].total_size(), 4);
}

#[test]
fn test_cancelled_scan_returns_nothing_new() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("f"), 4);

    let cancel = CancelToken::new();
    cancel.cancel();
    let target = CleanTarget::new("Temp", Category::User).with_path(temp.path().to_string_lossy());
    let guard = test_guard();
    let results = scanner::scan_all_with(&[target], &ScanContext::new(&guard).with_cancel(cancel));
    assert!(results.is_empty());
}

#[test]
fn test_group_by_category() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("a/f"), 1);
    write_file(&temp.path().join("b/f"), 1);
    write_file(&temp.path().join("c/f"), 1);

    let targets = vec![
        CleanTarget::new("A", Category::Dev).with_path(temp.path().join("a").to_string_lossy()),
        CleanTarget::new("B", Category::Browser).with_path(temp.path().join("b").to_string_lossy()),
        CleanTarget::new("C", Category::Dev).with_path(temp.path().join("c").to_string_lossy()),
    ];
    let guard = test_guard();
    let results = scanner::scan_all_with(&targets, &ScanContext::new(&guard));
    let groups = scanner::group_by_category(&results);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[&Category::Dev].len(), 2);
    assert_eq!(groups[&Category::Browser].len(), 1);
}

// ─── Walker helpers ──────────────────────────────────────────────────────────

#[test]
fn test_expand_pattern_glob_and_literal_fallback() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("one/cache/x"), 1);
    write_file(&temp.path().join("two/cache/y"), 1);

    let pattern = format!("{}/*/cache", temp.path().display());
    let mut expanded = walker::expand_pattern(&pattern);
    expanded.sort();
    assert_eq!(
        expanded,
        vec![temp.path().join("one/cache"), temp.path().join("two/cache")]
    );

    let missing = temp.path().join("nothing-here");
    assert_eq!(
        walker::expand_pattern(&missing.to_string_lossy()),
        vec![missing]
    );
}

#[test]
fn test_dir_size_counts_nested_files() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("a"), 100);
    write_file(&temp.path().join("sub/b"), 50);
    write_file(&temp.path().join("sub/deeper/c"), 25);
    assert_eq!(walker::dir_size(temp.path()), 175);
}

#[test]
fn test_file_root_becomes_single_item() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("dump.log");
    write_file(&file, 12);

    let target = CleanTarget::new("Dump", Category::System).with_path(file.to_string_lossy());
    let guard = test_guard();
    let items = walker::scan_target(&target, &ScanContext::new(&guard)).items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].path, file);
    assert_eq!(items[0].size_bytes, 12);
}

// ─── Format ──────────────────────────────────────────────────────────────────

#[test]
fn test_format_size_boundaries() {
    assert_eq!(format::format_size(0), "0 B");
    assert_eq!(format::format_size(1023), "1023 B");
    assert_eq!(format::format_size(1024), "1.0 KB");
    assert_eq!(format::format_size(1024 * 1024 - 1), "1024.0 KB");
    assert_eq!(format::format_size(1024 * 1024), "1.00 MB");
    assert!(format::format_size(u64::MAX).contains("TB"));
}
