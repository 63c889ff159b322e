use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use tracing::{debug, info, warn};

use super::pattern::{pattern_matches, validate_pattern};
use crate::common::errors::WhitelistError;
use crate::common::paths;

/// Seed entries written when no whitelist file exists yet: common developer
/// tooling that should never be swept up by a cache cleanup.
pub const DEFAULT_PATTERNS: &[&str] = &[
    r"%USERPROFILE%\.cargo\bin\*",
    r"%LOCALAPPDATA%\JetBrains\*",
    r"%APPDATA%\Code\User\*",
];

const FILE_HEADER: &str = "\
# SweepSafe whitelist - one glob pattern per line
# Lines starting with # are comments
# Environment variables (e.g. %USERPROFILE%, $HOME) are expanded at runtime
";

/// Operator-maintained exclusion patterns, shared by concurrent scan workers.
///
/// The pattern list sits behind a read/write lock: `is_whitelisted` and
/// `list` take the read side, `add` and `remove` the write side. `save`
/// copies the list under the read lock and writes the file outside it, so
/// readers are never held up by disk I/O.
#[derive(Debug)]
pub struct Whitelist {
    path: PathBuf,
    patterns: RwLock<Vec<String>>,
    save_lock: Mutex<()>,
}

impl Whitelist {
    /// A whitelist with the given patterns that persists to `path`.
    /// Patterns are taken as-is, without breadth validation.
    pub fn with_patterns<I, S>(path: impl Into<PathBuf>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            patterns: RwLock::new(patterns.into_iter().map(Into::into).collect()),
            save_lock: Mutex::new(()),
        }
    }

    /// Read patterns from `path`, skipping blank lines and `#` comments.
    ///
    /// A missing file is seeded with [`DEFAULT_PATTERNS`] and persisted.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, WhitelistError> {
        let path = path.into();

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let whitelist = Self::with_patterns(path, DEFAULT_PATTERNS.iter().copied());
                whitelist.save()?;
                info!(path = %whitelist.path.display(), "seeded default whitelist");
                return Ok(whitelist);
            }
            Err(source) => return Err(WhitelistError::Io { path, source }),
        };

        let patterns: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter(|line| match validate_pattern(line) {
                Ok(()) => true,
                Err(reason) => {
                    warn!(pattern = %line, %reason, "ignoring whitelist entry");
                    false
                }
            })
            .map(String::from)
            .collect();
        debug!(path = %path.display(), count = patterns.len(), "loaded whitelist");

        Ok(Self::with_patterns(path, patterns))
    }

    /// Persist the current patterns, creating the parent directory if needed.
    pub fn save(&self) -> Result<(), WhitelistError> {
        let _serialized = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.list();

        let io_err = |source| WhitelistError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }

        let mut contents = String::from(FILE_HEADER);
        contents.push('\n');
        for pattern in &snapshot {
            contents.push_str(pattern);
            contents.push('\n');
        }

        std::fs::write(&self.path, contents).map_err(io_err)
    }

    /// Append a pattern after rejecting empty, too-broad and duplicate ones.
    /// Duplicates are detected case-insensitively.
    pub fn add(&self, pattern: &str) -> Result<(), WhitelistError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(WhitelistError::Empty);
        }

        validate_pattern(pattern).map_err(|reason| WhitelistError::Rejected {
            pattern: pattern.to_string(),
            reason,
        })?;

        let folded = paths::fold(pattern);
        let mut patterns = self.patterns.write().unwrap_or_else(PoisonError::into_inner);
        if patterns.iter().any(|p| paths::fold(p) == folded) {
            return Err(WhitelistError::AlreadyExists(pattern.to_string()));
        }
        patterns.push(pattern.to_string());
        Ok(())
    }

    /// Remove a pattern (case-insensitive match).
    pub fn remove(&self, pattern: &str) -> Result<(), WhitelistError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(WhitelistError::Empty);
        }

        let mut patterns = self.patterns.write().unwrap_or_else(PoisonError::into_inner);
        let folded = paths::fold(pattern);
        match patterns.iter().position(|p| paths::fold(p) == folded) {
            Some(index) => {
                patterns.remove(index);
                Ok(())
            }
            None => Err(WhitelistError::NotFound(pattern.to_string())),
        }
    }

    /// Whether any pattern excludes `path`. Env tokens in patterns are
    /// expanded at match time; the first matching pattern wins.
    pub fn is_whitelisted(&self, path: &Path) -> bool {
        self.is_whitelisted_str(&path.to_string_lossy())
    }

    pub fn is_whitelisted_str(&self, path: &str) -> bool {
        let patterns = self.patterns.read().unwrap_or_else(PoisonError::into_inner);
        patterns
            .iter()
            .any(|pattern| pattern_matches(&paths::expand_env(pattern), path))
    }

    /// A copy of the current patterns.
    pub fn list(&self) -> Vec<String> {
        self.patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.patterns.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
