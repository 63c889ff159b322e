use colored::*;
use std::path::Path;
use std::time::Duration;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

const GB: u64 = 1024 * 1024 * 1024;
const MB100: u64 = 100 * 1024 * 1024;

/// Human-readable size: whole bytes, one decimal for KB, two above that
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    match unit {
        0 => format!("{} B", bytes),
        1 => format!("{:.1} KB", value),
        _ => format!("{:.2} {}", value, UNITS[unit]),
    }
}

/// Size colored by how much it would reclaim
pub fn format_size_colored(bytes: u64) -> ColoredString {
    let s = format_size(bytes);
    match bytes {
        b if b >= GB => s.red().bold(),
        b if b >= MB100 => s.yellow(),
        _ => s.white(),
    }
}

pub fn format_count(count: usize) -> String {
    format!("{} {}", count, if count == 1 { "item" } else { "items" })
}

/// Display a path with the home directory shortened to `~`
pub fn format_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => Path::new("~").join(rest).display().to_string(),
        None => path.display().to_string(),
    }
}

pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", elapsed.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let whole = elapsed.as_secs();
        format!("{}m {}s", whole / 60, whole % 60)
    }
}

/// Shorten to `max_len` characters keeping both ends, so the file name of a
/// long path stays visible: `/home/de...cache.bin`
pub fn truncate_middle(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return ".".repeat(max_len);
    }

    let keep = max_len - 3;
    let head = keep / 2;
    let tail = keep - head;
    let start: String = s.chars().take(head).collect();
    let end: String = s.chars().skip(len - tail).collect();
    format!("{}...{}", start, end)
}
