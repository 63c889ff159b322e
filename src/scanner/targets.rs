use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─── Core types ───────────────────────────────────────────────────────────────

/// High-level grouping of a clean target, used for display sectioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    User,
    Browser,
    Dev,
    System,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::User,
        Category::Browser,
        Category::Dev,
        Category::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::User => "user",
            Category::Browser => "browser",
            Category::Dev => "dev",
            Category::System => "system",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Coarse risk classification carried for the UI/policy layers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// Static description of a cleanup category, supplied by the target catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanTarget {
    /// Unique identifier (e.g. "UserTemp", "ChromeCache")
    pub name: String,

    /// Path patterns; may contain env tokens (`%TEMP%`, `$HOME`, `~`) and globs
    pub paths: Vec<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub requires_elevated_privilege: bool,

    pub category: Category,

    #[serde(default)]
    pub risk_level: RiskLevel,
}

impl CleanTarget {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            paths: Vec::new(),
            description: String::new(),
            requires_elevated_privilege: false,
            category,
            risk_level: RiskLevel::Low,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn elevated(mut self) -> Self {
        self.requires_elevated_privilege = true;
        self
    }

    pub fn with_risk(mut self, risk: RiskLevel) -> Self {
        self.risk_level = risk;
        self
    }
}

/// One discovered filesystem object eligible for deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanItem {
    /// Absolute, resolved path
    pub path: PathBuf,

    pub size_bytes: u64,

    /// Inherited from the target
    pub category: Category,

    /// Inherited from the target
    pub description: String,
}

/// Everything discovered for one target.
///
/// Totals are derived from `items` on every construction and mutation, so
/// `total_size == Σ size_bytes` and `item_count == items.len()` always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Name of the target that produced these items
    name: String,
    items: Vec<CleanItem>,
    total_size: u64,
    item_count: usize,
}

impl ScanResult {
    pub fn from_items(name: impl Into<String>, items: Vec<CleanItem>) -> Self {
        let mut result = Self {
            name: name.into(),
            items,
            total_size: 0,
            item_count: 0,
        };
        result.recalculate();
        result
    }

    fn recalculate(&mut self) {
        self.total_size = self.items.iter().map(|i| i.size_bytes).sum();
        self.item_count = self.items.len();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[CleanItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CleanItem> {
        self.items
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The high-level category of the first item.
    pub fn category(&self) -> Option<Category> {
        self.items.first().map(|i| i.category)
    }

    /// Keep only the items matching `keep`.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&CleanItem) -> bool,
    {
        self.items.retain(keep);
        self.recalculate();
    }
}
