//! Path text handling shared by the guard, the whitelist and the scanner.
//!
//! All safety decisions are made on a canonical *text* form of a path rather
//! than on `std::path::Path`, so the same rules apply whichever separator
//! style a path was written in. `\` and `/` are both treated as separators,
//! drive prefixes (`C:`) and UNC roots (`\\server\share`) are recognised, and
//! comparisons are case-insensitive.

/// Characters that turn a pattern into a glob.
pub const GLOB_META: &[char] = &['*', '?', '['];

/// Returns `true` if the string contains glob metacharacters.
pub fn has_glob_meta(s: &str) -> bool {
    s.contains(GLOB_META)
}

/// Canonical text form: `/` separators, no empty or `.` components, `..`
/// resolved lexically, verbatim (`\\?\`) prefixes stripped.
///
/// The drive letter keeps its original case; use [`fold`] before comparing.
pub fn normalize(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let mut rest: &str = &unified;
    let mut head = String::new();

    if let Some(verbatim) = rest
        .strip_prefix("//?/")
        .or_else(|| rest.strip_prefix("//./"))
    {
        rest = verbatim;
        if rest.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("UNC/")) {
            head.push_str("//");
            rest = &rest[4..];
        }
    } else if let Some(unc) = rest.strip_prefix("//") {
        head.push_str("//");
        rest = unc;
    }

    if head.is_empty() {
        if let Some(letter) = drive_letter(rest) {
            head.push(letter);
            head.push(':');
            rest = &rest[2..];
        }
    }

    let is_unc = head == "//";
    let rooted = is_unc || rest.starts_with('/');
    if rooted && !is_unc {
        head.push('/');
    }

    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let mut out = head;
    out.push_str(&parts.join("/"));
    if out.is_empty() {
        out.push('.');
    }
    out
}

/// Case-folded form used for every comparison.
pub fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// The drive letter of `C:...`, if present.
pub fn drive_letter(s: &str) -> Option<char> {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        Some(bytes[0] as char)
    } else {
        None
    }
}

/// Whether a normalized path is absolute.
///
/// `C:/...` and UNC paths are absolute everywhere. A leading `/` without a
/// drive is absolute only on non-Windows hosts.
pub fn is_absolute(normalized: &str) -> bool {
    if normalized.starts_with("//") {
        return true;
    }
    if drive_letter(normalized).is_some() {
        return normalized[2..].starts_with('/');
    }
    !cfg!(windows) && normalized.starts_with('/')
}

/// Whether a normalized path names a bare volume: `C:`, `C:/`, `/`, or a UNC
/// share root such as `//server/share`.
pub fn is_volume_root(normalized: &str) -> bool {
    if normalized == "/" {
        return true;
    }
    if drive_letter(normalized).is_some() {
        return normalized.len() == 2 || normalized == format!("{}/", &normalized[..2]);
    }
    if let Some(unc) = normalized.strip_prefix("//") {
        return unc.split('/').filter(|p| !p.is_empty()).count() <= 2;
    }
    false
}

/// Case-insensitive "same path or nested under" test on normalized paths.
///
/// The comparison is separator-bounded: `/data/cache` is not under `/data/ca`.
pub fn is_same_or_under(candidate: &str, base: &str) -> bool {
    let candidate = fold(candidate);
    let base = fold(base);
    if candidate == base {
        return true;
    }
    let mut bounded = base.trim_end_matches('/').to_string();
    bounded.push('/');
    let mut probe = candidate;
    probe.push('/');
    probe.starts_with(&bounded)
}

/// Expand environment tokens using the process environment.
///
/// See [`expand_env_with`] for the accepted syntax.
pub fn expand_env(input: &str) -> String {
    expand_env_with(input, lookup_env)
}

/// Expand `%VAR%`, `${VAR}`, `$VAR` and a leading `~` through `lookup`.
///
/// Tokens whose variable is unknown are left verbatim, so an unexpanded
/// pattern can never silently widen into a shorter path.
pub fn expand_env_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    if let Some(after) = rest.strip_prefix('~') {
        if after.is_empty() || after.starts_with('/') || after.starts_with('\\') {
            match lookup("HOME") {
                Some(home) => out.push_str(&home),
                None => out.push('~'),
            }
            rest = after;
        }
    }

    while let Some(pos) = rest.find(['%', '$']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let (token_len, name) = if tail.starts_with('%') {
            percent_token(tail)
        } else {
            dollar_token(tail)
        };

        match name.and_then(|n| lookup(n)) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&tail[..token_len]),
        }
        rest = &tail[token_len..];
    }

    out.push_str(rest);
    out
}

/// Parses `%NAME%` at the start of `tail`; returns consumed length and name.
fn percent_token(tail: &str) -> (usize, Option<&str>) {
    let body = &tail[1..];
    match body.find('%') {
        Some(end) if end > 0 && body[..end].chars().all(is_percent_name_char) => {
            (end + 2, Some(&body[..end]))
        }
        _ => (1, None),
    }
}

/// Parses `${NAME}` or `$NAME` at the start of `tail`.
fn dollar_token(tail: &str) -> (usize, Option<&str>) {
    let body = &tail[1..];
    if let Some(braced) = body.strip_prefix('{') {
        return match braced.find('}') {
            Some(end) if end > 0 && braced[..end].chars().all(is_shell_name_char) => {
                (end + 3, Some(&braced[..end]))
            }
            _ => (1, None),
        };
    }

    let starts_ok = body
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok {
        return (1, None);
    }
    let end = body
        .find(|c: char| !is_shell_name_char(c))
        .unwrap_or(body.len());
    (end + 1, Some(&body[..end]))
}

fn is_percent_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '(' | ')')
}

fn is_shell_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Environment lookup with platform fallbacks for the well-known locations.
fn lookup_env(name: &str) -> Option<String> {
    if let Some(value) = std::env::var_os(name).filter(|v| !v.is_empty()) {
        return Some(value.to_string_lossy().into_owned());
    }

    let fallback = match name.to_ascii_uppercase().as_str() {
        "TEMP" | "TMP" | "TMPDIR" => Some(std::env::temp_dir()),
        "HOME" | "USERPROFILE" => dirs::home_dir(),
        "LOCALAPPDATA" => dirs::data_local_dir(),
        "APPDATA" => dirs::config_dir(),
        _ => None,
    };
    fallback.map(|p| p.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(name: &str) -> Option<String> {
        match name {
            "TEMP" => Some(r"C:\Users\dev\AppData\Local\Temp".to_string()),
            "HOME" => Some("/home/dev".to_string()),
            "CACHE_ROOT" => Some("/var/cache".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_normalize_windows_paths() {
        assert_eq!(normalize(r"C:\Windows\System32\"), "C:/Windows/System32");
        assert_eq!(normalize(r"C:\a\.\b\\c"), "C:/a/b/c");
        assert_eq!(normalize(r"C:\a\b\..\c"), "C:/a/c");
        assert_eq!(normalize(r"C:\"), "C:/");
        assert_eq!(normalize("C:"), "C:");
        assert_eq!(normalize(r"\\?\C:\Temp\x"), "C:/Temp/x");
        assert_eq!(normalize(r"\\?\UNC\server\share\dir"), "//server/share/dir");
    }

    #[test]
    fn test_normalize_unix_paths() {
        assert_eq!(normalize("/tmp//foo/./bar/"), "/tmp/foo/bar");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("/../.."), "/");
        assert_eq!(normalize("relative/../x"), "x");
        assert_eq!(normalize(""), ".");
    }

    #[test]
    fn test_volume_roots() {
        assert!(is_volume_root("C:"));
        assert!(is_volume_root("c:/"));
        assert!(is_volume_root("/"));
        assert!(is_volume_root("//server/share"));
        assert!(!is_volume_root("C:/Temp"));
        assert!(!is_volume_root("//server/share/dir"));
        assert!(!is_volume_root("/tmp"));
    }

    #[test]
    fn test_absolute() {
        assert!(is_absolute("C:/x"));
        assert!(is_absolute("//server/share"));
        assert!(!is_absolute("C:x"));
        assert!(!is_absolute("relative/x"));
        if !cfg!(windows) {
            assert!(is_absolute("/tmp"));
        }
    }

    #[test]
    fn test_same_or_under_is_separator_bounded() {
        assert!(is_same_or_under("C:/Windows", "c:/windows"));
        assert!(is_same_or_under("C:/WINDOWS/System32/drivers", "C:/Windows"));
        assert!(!is_same_or_under("C:/WindowsApps", "C:/Windows"));
        assert!(!is_same_or_under("C:/Win", "C:/Windows"));
    }

    #[test]
    fn test_expand_percent_tokens() {
        assert_eq!(
            expand_env_with(r"%TEMP%\x", vars),
            r"C:\Users\dev\AppData\Local\Temp\x"
        );
        assert_eq!(expand_env_with("%UNKNOWN%/x", vars), "%UNKNOWN%/x");
        assert_eq!(expand_env_with("100%", vars), "100%");
    }

    #[test]
    fn test_expand_dollar_tokens() {
        assert_eq!(expand_env_with("$CACHE_ROOT/pip", vars), "/var/cache/pip");
        assert_eq!(expand_env_with("${CACHE_ROOT}/pip", vars), "/var/cache/pip");
        assert_eq!(expand_env_with("$NOPE/pip", vars), "$NOPE/pip");
        assert_eq!(expand_env_with("cost$", vars), "cost$");
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_env_with("~/.cache", vars), "/home/dev/.cache");
        assert_eq!(expand_env_with("~user/x", vars), "~user/x");
    }

    #[test]
    fn test_glob_meta() {
        assert!(has_glob_meta("C:/x/*"));
        assert!(has_glob_meta("/a/file?.log"));
        assert!(!has_glob_meta("/a/b"));
    }
}
