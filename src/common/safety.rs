use std::path::Path;

use super::errors::BlockReason;
use super::paths;

/// Windows locations that must NEVER be deleted, nor anything beneath them.
const WINDOWS_NEVER_DELETE: &[&str] = &[
    r"C:\Windows",
    r"C:\Windows\System32",
    r"C:\Windows\SysWOW64",
    r"C:\Windows\WinSxS",
    r"C:\Windows\assembly",
    r"C:\Windows\System32\config",
    r"C:\Boot",
    r"C:\bootmgr",
    r"C:\EFI",
    r"C:\Program Files",
    r"C:\Program Files (x86)",
    r"C:\Users",
    r"C:\ProgramData",
    r"C:\Recovery",
    r"C:\Windows\Installer",
    r"C:\Windows\servicing",
    r"C:\Windows\Prefetch",
];

/// Unix system trees that must NEVER be deleted, nor anything beneath them.
const UNIX_NEVER_DELETE: &[&str] = &[
    "/bin",
    "/boot",
    "/dev",
    "/etc",
    "/lib",
    "/lib32",
    "/lib64",
    "/opt",
    "/proc",
    "/sbin",
    "/sys",
    "/usr",
    "/var/lib",
    "/System",
    "/Applications",
    "/Library",
    "/private/etc",
    "/private/var/db",
    "/cores",
    "/run",
    "/srv",
    "/mnt",
    "/media",
    "/snap",
];

/// Unix locations protected as themselves only: the user-profile roots.
/// Their contents (caches, temp dirs) stay reachable for cleanup.
const UNIX_NEVER_DELETE_EXACT: &[&str] = &["/", "/home", "/Users", "/root", "/var", "/Volumes", "/tmp"];

/// Directories holding one profile per user. Each direct child is a profile
/// root, protected like the current user's home.
const UNIX_PROFILE_PARENTS: &[&str] = &["/home", "/Users"];

/// Home subdirectories protected together with everything inside them.
const PROTECTED_HOME_DIRS: &[&str] = &[
    "Desktop",
    "Documents",
    "Downloads",
    "Pictures",
    "Music",
    "Movies",
    "Videos",
    ".ssh",
    ".gnupg",
];

/// The hardcoded set of paths no destructive operation may touch.
///
/// `subtrees` entries block the path and everything nested under it.
/// `exact` entries block only the path itself. Volume roots are always
/// compared exactly, whichever list they appear in. Every child of a
/// `profile_parents` entry is a profile root: blocked itself, with its
/// personal-data directories blocked as subtrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeverDeleteSet {
    subtrees: Vec<String>,
    exact: Vec<String>,
    profile_parents: Vec<String>,
}

impl NeverDeleteSet {
    /// A set that protects `paths` and their subtrees.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            subtrees: paths
                .into_iter()
                .map(|p| paths::normalize(p.as_ref()))
                .collect(),
            exact: Vec::new(),
            profile_parents: Vec::new(),
        }
    }

    /// Add paths that are protected as themselves only.
    pub fn with_exact<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exact
            .extend(paths.into_iter().map(|p| paths::normalize(p.as_ref())));
        self
    }

    /// Add directories whose children are user profiles (`/home`).
    pub fn with_profile_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.profile_parents
            .extend(parents.into_iter().map(|p| paths::normalize(p.as_ref())));
        self
    }

    /// The Windows list: OS root, system directories, boot files, every
    /// user-profile root and the program-install roots.
    pub fn windows() -> Self {
        Self::from_paths(WINDOWS_NEVER_DELETE)
    }

    /// The Unix list: system trees, every profile under `/home` and `/Users`,
    /// and the current user's home wherever it lives (`/root` under sudo).
    pub fn unix() -> Self {
        let mut set = Self::from_paths(UNIX_NEVER_DELETE)
            .with_exact(UNIX_NEVER_DELETE_EXACT)
            .with_profile_parents(UNIX_PROFILE_PARENTS);
        if let Some(home) = dirs::home_dir() {
            let home = home.to_string_lossy().into_owned();
            set.exact.push(paths::normalize(&home));
            set.subtrees.extend(
                PROTECTED_HOME_DIRS
                    .iter()
                    .map(|d| paths::normalize(&format!("{}/{}", home, d))),
            );
        }
        set
    }

    /// The list for the platform this binary was built for.
    pub fn system_default() -> Self {
        if cfg!(windows) {
            Self::windows()
        } else {
            Self::unix()
        }
    }

    /// The protected entry `normalized` falls under, if any.
    pub fn matching(&self, normalized: &str) -> Option<String> {
        let folded = paths::fold(normalized);

        for entry in &self.exact {
            if paths::fold(entry) == folded {
                return Some(entry.clone());
            }
        }
        for entry in &self.subtrees {
            let hit = if paths::is_volume_root(entry) {
                paths::fold(entry) == folded
            } else {
                paths::is_same_or_under(normalized, entry)
            };
            if hit {
                return Some(entry.clone());
            }
        }
        match self.profile_parts(normalized)? {
            (root, None) => Some(root.to_string()),
            (root, Some(dir)) if is_personal_dir(dir) => Some(format!("{}/{}", root, dir)),
            _ => None,
        }
    }

    /// Whether `normalized` lies in a protected subtree, so that its contents
    /// are off limits as well as the path itself.
    pub fn covers_contents(&self, normalized: &str) -> bool {
        self.subtrees
            .iter()
            .any(|entry| !paths::is_volume_root(entry) && paths::is_same_or_under(normalized, entry))
            || matches!(self.profile_parts(normalized), Some((_, Some(dir))) if is_personal_dir(dir))
    }

    /// Splits a path inside `<parent>/<user>` into the profile root and the
    /// first component below it: `/home/ann/.ssh/x` gives `("/home/ann", Some(".ssh"))`.
    fn profile_parts<'a>(&self, normalized: &'a str) -> Option<(&'a str, Option<&'a str>)> {
        self.profile_parents.iter().find_map(|parent| {
            let head = normalized.get(..parent.len())?;
            if !head.eq_ignore_ascii_case(parent) {
                return None;
            }
            let tail = normalized[parent.len()..].strip_prefix('/')?;
            let (user, below) = match tail.split_once('/') {
                Some((user, rest)) => (user, rest.split('/').next()),
                None => (tail, None),
            };
            if user.is_empty() {
                return None;
            }
            let root = &normalized[..parent.len() + 1 + user.len()];
            Some((root, below.filter(|c| !c.is_empty())))
        })
    }

    /// Every entry, subtree entries first, profile parents last.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.subtrees
            .iter()
            .chain(self.exact.iter())
            .chain(self.profile_parents.iter())
            .map(String::as_str)
    }
}

fn is_personal_dir(name: &str) -> bool {
    PROTECTED_HOME_DIRS
        .iter()
        .any(|dir| dir.eq_ignore_ascii_case(name))
}

/// Pure validation in front of every destructive operation.
///
/// A guard owns its [`NeverDeleteSet`]; production code uses
/// [`PathGuard::system_default`], tests inject a smaller set.
#[derive(Debug, Clone)]
pub struct PathGuard {
    never_delete: NeverDeleteSet,
}

impl Default for PathGuard {
    fn default() -> Self {
        Self::system_default()
    }
}

impl PathGuard {
    pub fn new(never_delete: NeverDeleteSet) -> Self {
        Self { never_delete }
    }

    pub fn system_default() -> Self {
        Self::new(NeverDeleteSet::system_default())
    }

    pub fn never_delete(&self) -> &NeverDeleteSet {
        &self.never_delete
    }

    /// The protected-path test alone: `false` if the path is, or is nested
    /// under, a NEVER_DELETE entry.
    pub fn is_safe(&self, path: &str) -> bool {
        self.never_delete.matching(&paths::normalize(path)).is_none()
    }

    /// Whether everything beneath `path` is protected too. Scanners use this
    /// to decide whether a directory may be descended into at all.
    pub fn protects_contents(&self, path: &Path) -> bool {
        self.never_delete
            .covers_contents(&paths::normalize(&path.to_string_lossy()))
    }

    /// Path-based convenience for [`PathGuard::is_safe`].
    pub fn is_safe_path(&self, path: &Path) -> bool {
        self.is_safe(&path.to_string_lossy())
    }

    /// Full validation. Checks run in a fixed order and the first failure
    /// wins. The only I/O is an `lstat` and, for links, a resolution.
    pub fn validate(&self, path: &str) -> Result<(), BlockReason> {
        if path.trim().is_empty() {
            return Err(BlockReason::EmptyPath);
        }

        let cleaned = paths::normalize(path);
        if !paths::is_absolute(&cleaned) {
            return Err(BlockReason::NotAbsolute);
        }

        if paths::is_volume_root(&cleaned) {
            return Err(BlockReason::DriveRoot);
        }

        if path.split(['/', '\\']).any(|part| part == "..") {
            return Err(BlockReason::Traversal);
        }

        if let Some(c) = path.chars().find(|c| c.is_control() && *c != '\t') {
            return Err(BlockReason::ControlCharacter(c));
        }

        if let Some(entry) = self.never_delete.matching(&cleaned) {
            return Err(BlockReason::Protected { matched: entry });
        }

        self.check_link_target(path)
    }

    /// Path-based convenience for [`PathGuard::validate`].
    pub fn validate_path(&self, path: &Path) -> Result<(), BlockReason> {
        self.validate(&path.to_string_lossy())
    }

    /// Symlinks and reparse points are re-checked against their resolved
    /// target. A link that cannot be resolved is refused.
    fn check_link_target(&self, path: &str) -> Result<(), BlockReason> {
        let is_link = std::fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        if !is_link {
            return Ok(());
        }

        let resolved = std::fs::canonicalize(path).map_err(|_| BlockReason::UnresolvableSymlink)?;
        let resolved = paths::normalize(&resolved.to_string_lossy());
        if self.never_delete.matching(&resolved).is_some() || paths::is_volume_root(&resolved) {
            return Err(BlockReason::SymlinkToProtected { target: resolved });
        }
        Ok(())
    }
}

/// Maximum number of items to delete in a single operation without an
/// explicit override.
pub const MAX_FILES_PER_OPERATION: usize = 100_000;

/// Total bytes above which a batch needs an explicit override (50 GB).
pub const MAX_BYTES_WARNING_THRESHOLD: u64 = 50 * 1024 * 1024 * 1024;

/// Sanity limits checked before a batch is executed.
pub fn validate_clean_operation(file_count: usize, total_bytes: u64) -> Result<(), String> {
    if file_count > MAX_FILES_PER_OPERATION {
        return Err(format!(
            "Operation would affect {} files (limit: {}). Use --yes to override.",
            file_count, MAX_FILES_PER_OPERATION
        ));
    }

    if total_bytes > MAX_BYTES_WARNING_THRESHOLD {
        return Err(format!(
            "Operation would delete {} (>{} threshold). Use --yes to override.",
            super::format::format_size(total_bytes),
            super::format::format_size(MAX_BYTES_WARNING_THRESHOLD),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windows_guard() -> PathGuard {
        PathGuard::new(NeverDeleteSet::windows())
    }

    #[test]
    fn test_windows_set_blocks_system_dirs_case_insensitively() {
        let guard = windows_guard();
        for p in [r"C:\Windows", r"c:\windows", r"C:\WINDOWS", r"C:\Program Files"] {
            assert!(!guard.is_safe(p), "{} must be protected", p);
        }
    }

    #[test]
    fn test_windows_set_blocks_nested_paths() {
        let guard = windows_guard();
        assert!(!guard.is_safe(r"C:\Windows\System32\drivers\etc\hosts"));
        assert!(!guard.is_safe(r"C:\Users\dev\AppData\Local\Temp"));
    }

    #[test]
    fn test_windows_set_allows_siblings() {
        let guard = windows_guard();
        assert!(guard.is_safe(r"C:\WindowsApps"));
        assert!(guard.is_safe(r"D:\Scratch\build"));
        assert!(guard.is_safe(r"C:\Temp\x.log"));
    }

    #[test]
    fn test_exact_entries_do_not_cover_children() {
        let set = NeverDeleteSet::from_paths(["/srv/data"]).with_exact(["/home"]);
        let guard = PathGuard::new(set);
        assert!(!guard.is_safe("/home"));
        assert!(guard.is_safe("/home/dev/.cache/x"));
        assert!(!guard.is_safe("/srv/data/x"));
        assert!(!guard.protects_contents(Path::new("/home")));
        assert!(guard.protects_contents(Path::new("/srv/data")));
    }

    #[test]
    fn test_unix_default_protects_home_and_system() {
        let guard = PathGuard::new(NeverDeleteSet::unix());
        assert!(!guard.is_safe("/usr/bin/ls"));
        assert!(!guard.is_safe("/etc"));
        assert!(!guard.is_safe("/"));
        if let Some(home) = dirs::home_dir() {
            assert!(!guard.is_safe_path(&home));
            assert!(!guard.is_safe_path(&home.join("Documents/report.pdf")));
            assert!(!guard.is_safe_path(&home.join(".ssh/id_ed25519")));
            assert!(guard.is_safe_path(&home.join(".cache/pip/x.whl")));
        }
    }

    #[test]
    fn test_every_profile_root_is_protected() {
        let guard = PathGuard::new(NeverDeleteSet::unix());
        for p in [
            "/home/someone_else",
            "/home/someone_else/Documents",
            "/home/someone_else/documents/taxes.pdf",
            "/home/someone_else/.ssh/id_rsa",
            "/Users/Alice",
            "/Users/Alice/Desktop/notes.txt",
        ] {
            assert!(
                matches!(guard.validate(p), Err(BlockReason::Protected { .. })),
                "{} must be protected",
                p
            );
        }
        assert!(guard.is_safe("/home/someone_else/.cache/pip/x.whl"));
        assert!(guard.is_safe("/home/someone_else/project/target/debug/x.o"));
        assert!(guard.protects_contents(Path::new("/home/someone_else/Documents")));
        assert!(!guard.protects_contents(Path::new("/home/someone_else")));
        assert!(!guard.protects_contents(Path::new("/home/someone_else/.cache")));
    }

    #[test]
    fn test_profile_match_names_the_root() {
        let set = NeverDeleteSet::from_paths(Vec::<&str>::new()).with_profile_parents(["/home"]);
        assert_eq!(set.matching("/home/ann").as_deref(), Some("/home/ann"));
        assert_eq!(set.matching("/home/ann/.ssh/k").as_deref(), Some("/home/ann/.ssh"));
        assert_eq!(set.matching("/home/ann/.cache/k"), None);
        assert_eq!(set.matching("/homes/ann"), None);
        assert_eq!(set.matching("/home"), None);
    }

    #[test]
    fn test_unix_system_mounts_are_protected() {
        let guard = PathGuard::new(NeverDeleteSet::unix());
        for p in ["/run", "/run/user/1000/x", "/srv", "/srv/www/index.html", "/mnt/data", "/media/usb", "/snap/core"] {
            assert!(!guard.is_safe(p), "{} must be protected", p);
        }
    }

    #[test]
    fn test_validate_order_and_reasons() {
        let guard = windows_guard();
        assert_eq!(guard.validate("  "), Err(BlockReason::EmptyPath));
        assert_eq!(guard.validate(r"relative\x"), Err(BlockReason::NotAbsolute));
        assert_eq!(guard.validate(r"C:\"), Err(BlockReason::DriveRoot));
        assert_eq!(guard.validate(r"C:\a\..\..\b"), Err(BlockReason::Traversal));
        assert_eq!(
            guard.validate("C:\\dir\x01name\\file"),
            Err(BlockReason::ControlCharacter('\u{1}'))
        );
        assert!(matches!(
            guard.validate(r"C:\Windows\Temp\x"),
            Err(BlockReason::Protected { .. })
        ));
        assert_eq!(guard.validate(r"C:\Scratch\a.tmp"), Ok(()));
    }

    #[test]
    fn test_tab_is_allowed() {
        let guard = windows_guard();
        assert_eq!(guard.validate("C:\\Scratch\\odd\tname.tmp"), Ok(()));
    }

    #[test]
    fn test_validate_clean_within_limits() {
        assert!(validate_clean_operation(100, 1024 * 1024).is_ok());
    }

    #[test]
    fn test_validate_clean_too_many_files() {
        assert!(validate_clean_operation(MAX_FILES_PER_OPERATION + 1, 1024).is_err());
    }

    #[test]
    fn test_validate_clean_too_many_bytes() {
        assert!(validate_clean_operation(10, MAX_BYTES_WARNING_THRESHOLD + 1).is_err());
    }
}
