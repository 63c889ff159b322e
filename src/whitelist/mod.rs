pub mod pattern;
pub mod store;

pub use pattern::{pattern_matches, validate_pattern};
pub use store::{Whitelist, DEFAULT_PATTERNS};
