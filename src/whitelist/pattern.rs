use glob::{MatchOptions, Pattern};

use crate::common::errors::PatternRejection;
use crate::common::paths;

/// Reject patterns so broad they would silently disable most cleanup.
///
/// Checks the raw (trimmed, unexpanded) text: wildcard-only tokens, drive
/// roots with or without a trailing wildcard, a `**` component hanging off a
/// volume root, paths made only of wildcard components, and anything with
/// fewer than two path separators.
pub fn validate_pattern(pattern: &str) -> Result<(), PatternRejection> {
    let cleaned = pattern.trim();

    if cleaned.chars().all(|c| c == '*') && !cleaned.is_empty() {
        return Err(PatternRejection::WildcardOnly);
    }

    if paths::drive_letter(cleaned).is_some() {
        let rest = &cleaned[2..];
        if matches!(rest, "" | "\\" | "/" | "\\*" | "/*" | "\\**" | "/**") {
            return Err(PatternRejection::DriveRoot);
        }
    }

    let unified = cleaned.replace('\\', "/");
    let components: Vec<&str> = unified.split('/').collect();

    // `**` crosses separators, so everything after it is reachable from the
    // literal prefix in front of it.
    if let Some(idx) = components.iter().position(|c| c.contains("**")) {
        let prefix = components[..idx].join("/");
        if prefix.is_empty() || paths::is_volume_root(&paths::normalize(&prefix)) {
            return Err(PatternRejection::DriveRoot);
        }
    }

    let mut named = components
        .iter()
        .filter(|c| !c.is_empty() && paths::drive_letter(c).is_none())
        .peekable();
    if named.peek().is_some() && named.all(|c| c.chars().all(|ch| matches!(ch, '*' | '?'))) {
        return Err(PatternRejection::WildcardOnly);
    }

    let separators = cleaned.matches(['\\', '/']).count();
    if separators < 2 {
        return Err(PatternRejection::TooShallow { separators });
    }

    Ok(())
}

/// Test one already-expanded pattern against a candidate path.
///
/// Both sides are normalized and case-folded. The tests run in order and
/// the first hit wins: exact match, glob match (`*` does not cross a
/// separator), then, for patterns without glob metacharacters, a
/// separator-bounded "nested under" test.
pub fn pattern_matches(expanded_pattern: &str, candidate: &str) -> bool {
    let pattern = paths::fold(&paths::normalize(expanded_pattern));
    let candidate = paths::fold(&paths::normalize(candidate));

    if pattern == candidate {
        return true;
    }

    if let Ok(glob) = Pattern::new(&pattern) {
        if glob.matches_with(&candidate, glob_options()) {
            return true;
        }
    }

    !paths::has_glob_meta(&pattern) && paths::is_same_or_under(&candidate, &pattern)
}

fn glob_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}
