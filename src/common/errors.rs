//! Typed error taxonomy for the deletion core.
//!
//! `anyhow` is used at the binary edge and for configuration plumbing; the
//! engine itself returns these so callers can tell policy refusals apart
//! from operating-system failures.

use std::path::PathBuf;

use thiserror::Error;

/// Why the path guard refused a path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockReason {
    #[error("empty path")]
    EmptyPath,

    #[error("path must be absolute")]
    NotAbsolute,

    #[error("path is a drive root")]
    DriveRoot,

    #[error("path contains a traversal component (..)")]
    Traversal,

    #[error("path contains a control character (U+{:04X})", code_point(.0))]
    ControlCharacter(char),

    #[error("protected path (under '{matched}')")]
    Protected { matched: String },

    #[error("symlink resolves to a protected path: '{target}'")]
    SymlinkToProtected { target: String },

    #[error("symlink target cannot be resolved")]
    UnresolvableSymlink,
}

fn code_point(c: &char) -> u32 {
    u32::from(*c)
}

/// Failure of a single guarded deletion.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// The path guard refused the operation; retrying will not help.
    #[error("deletion blocked for '{}': {reason}", .path.display())]
    Blocked { path: PathBuf, reason: BlockReason },

    /// The operator's own whitelist excludes the path.
    #[error("whitelisted path: '{}'", .path.display())]
    Whitelisted { path: PathBuf },

    /// The filesystem refused: locked, permission denied, vanished.
    #[error("I/O error at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cancellation was requested before or while the path was removed.
    #[error("cancelled before '{}' was removed", .path.display())]
    Cancelled { path: PathBuf },
}

impl DeleteError {
    /// `true` when the tool refused, `false` when the OS refused.
    pub fn is_policy(&self) -> bool {
        matches!(self, DeleteError::Blocked { .. } | DeleteError::Whitelisted { .. })
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            DeleteError::Blocked { path, .. }
            | DeleteError::Whitelisted { path }
            | DeleteError::Io { path, .. }
            | DeleteError::Cancelled { path } => path,
        }
    }
}

/// Why a whitelist pattern is too broad to accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternRejection {
    #[error("pattern would match everything")]
    WildcardOnly,

    #[error("pattern is a drive root")]
    DriveRoot,

    #[error("pattern has {separators} path separator(s); at least 2 are required")]
    TooShallow { separators: usize },
}

/// Whitelist mutation and persistence failures.
#[derive(Debug, Error)]
pub enum WhitelistError {
    #[error("pattern cannot be empty")]
    Empty,

    #[error("pattern '{pattern}' rejected: {reason}")]
    Rejected {
        pattern: String,
        reason: PatternRejection,
    },

    #[error("pattern already exists: {0}")]
    AlreadyExists(String),

    #[error("pattern not found: {0}")]
    NotFound(String),

    #[error("whitelist file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A non-fatal failure while expanding or walking one scan path.
///
/// These are logged and counted, never propagated.
#[derive(Debug, Error)]
pub enum ScanPathError {
    #[error("invalid glob '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("cannot stat '{}': {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
