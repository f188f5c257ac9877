//! Key helpers: deterministic key generation and invalidation patterns.

use sha2::{Digest, Sha256};

// == Generate Key ==
/// Builds a fixed-length cache key from its parts.
///
/// The parts are joined as `part1:part2:...` and hashed with SHA-256, so
/// callers can compose keys from arbitrary user input without worrying
/// about length or separators.
pub fn generate_key<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            hasher.update(b":");
        }
        hasher.update(part.as_ref().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

// == Key Pattern ==
/// Restricted glob used by `invalidate`.
///
/// `*` matches everything, a single trailing `*` is a prefix match, anything
/// without `*` is an exact match. Any other use of `*` matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPattern {
    All,
    Prefix(String),
    Exact(String),
    Nothing,
}

impl KeyPattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern == "*" {
            return KeyPattern::All;
        }
        match pattern.strip_suffix('*') {
            Some(prefix) if !prefix.contains('*') => KeyPattern::Prefix(prefix.to_string()),
            Some(_) => KeyPattern::Nothing,
            None if pattern.contains('*') => KeyPattern::Nothing,
            None => KeyPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::All => true,
            KeyPattern::Prefix(prefix) => key.starts_with(prefix.as_str()),
            KeyPattern::Exact(exact) => key == exact,
            KeyPattern::Nothing => false,
        }
    }
}
