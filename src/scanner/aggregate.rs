use std::collections::BTreeMap;

use super::targets::{Category, ScanResult};

/// Combined size across all results.
pub fn total_size_all(results: &[ScanResult]) -> u64 {
    results.iter().map(ScanResult::total_size).sum()
}

/// Combined item count across all results.
pub fn total_item_count(results: &[ScanResult]) -> usize {
    results.iter().map(ScanResult::item_count).sum()
}

/// Group results by the category of their first item, for display
/// sectioning. Empty results have no category and are left out.
pub fn group_by_category(results: &[ScanResult]) -> BTreeMap<Category, Vec<&ScanResult>> {
    let mut groups: BTreeMap<Category, Vec<&ScanResult>> = BTreeMap::new();
    for result in results {
        if let Some(category) = result.category() {
            groups.entry(category).or_default().push(result);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::targets::CleanItem;
    use std::path::PathBuf;

    fn result(name: &str, category: Category, sizes: &[u64]) -> ScanResult {
        let items = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| CleanItem {
                path: PathBuf::from(format!("/scan/{}/{}", name, i)),
                size_bytes: *size,
                category,
                description: name.to_string(),
            })
            .collect();
        ScanResult::from_items(name, items)
    }

    #[test]
    fn test_totals() {
        let results = vec![
            result("A", Category::User, &[1, 2, 3]),
            result("B", Category::Dev, &[10]),
        ];
        assert_eq!(total_size_all(&results), 16);
        assert_eq!(total_item_count(&results), 4);
        assert_eq!(total_size_all(&[]), 0);
    }

    #[test]
    fn test_grouping_is_stable_and_pure() {
        let results = vec![
            result("Chrome", Category::Browser, &[5]),
            result("Npm", Category::Dev, &[7]),
            result("Yarn", Category::Dev, &[1]),
            result("Empty", Category::System, &[]),
        ];
        let first = group_by_category(&results);
        let second = group_by_category(&results);
        assert_eq!(first, second);

        assert_eq!(first.len(), 2);
        let dev: Vec<&str> = first[&Category::Dev].iter().map(|r| r.name()).collect();
        assert_eq!(dev, vec!["Npm", "Yarn"]);
        assert!(!first.contains_key(&Category::System));
    }
}
