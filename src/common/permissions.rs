use std::path::Path;

/// Whether the process runs with administrator rights (effective uid 0).
/// Targets flagged `requires_elevated_privilege` are skipped otherwise.
#[cfg(unix)]
pub fn is_elevated() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_elevated() -> bool {
    false
}

/// Get a helpful message for a failed deletion
pub fn permission_hint(path: &Path) -> String {
    if cfg!(windows) {
        format!(
            "'{}' may be locked by a running program or need an elevated prompt.",
            path.display()
        )
    } else {
        format!(
            "Check file permissions for '{}'. You may need to run with sudo for system paths.",
            path.display()
        )
    }
}
