//! Candidate path normalization and validation
//!
//! A candidate path is the path part of a page or sitemap URL: scheme, host,
//! query string and fragment are removed, the trailing slash is stripped, and
//! the result must consist only of letters, digits, `/`, `_`, `-` and `.`.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// The homepage path
pub const ROOT_PATH: &str = "/";

/// A normalized, validated URL path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidatePath(String);

impl CandidatePath {
    /// Normalize `raw` and accept it only if it passes path validation
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_path(raw);
        is_valid_path(&normalized).then_some(Self(normalized))
    }

    /// The homepage path
    pub fn root() -> Self {
        Self(ROOT_PATH.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_PATH
    }

    pub fn segment_count(&self) -> usize {
        segment_count(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CandidatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CandidatePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reduce a URL or path to a path-only form without trailing slash
///
/// Idempotent: `normalize_path(&normalize_path(p)) == normalize_path(p)`.
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim();

    let path = match Url::parse(trimmed) {
        Ok(url) if url.has_host() => url.path().to_string(),
        _ => {
            let end = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
            trimmed[..end].to_string()
        }
    };

    let path = path.trim_end_matches(|c: char| c == '/' || c.is_whitespace());
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Whether `path` is made only of letters, digits, `/`, `_`, `-` and `.`
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '.'))
}

/// Number of non-empty `/`-delimited segments
pub fn segment_count(path: &str) -> usize {
    path.split('/').filter(|segment| !segment.is_empty()).count()
}

/// Parse every entry, keep valid ones no deeper than `max_segments`, dedupe in order
pub fn shallow_paths<I, S>(raw: I, max_segments: usize) -> Vec<CandidatePath>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .filter_map(|entry| CandidatePath::parse(entry.as_ref()))
        .filter(|path| path.segment_count() <= max_segments)
        .filter(|path| seen.insert(path.clone()))
        .collect()
}
