//! Strict parsers for free-text oracle responses
//!
//! Nothing here panics or returns an error: a response that does not parse is
//! an empty list or `None`.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::debug;

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)\s*```").expect("fence regex is valid")
    })
}

fn fenced_json_object() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("json fence regex is valid")
    })
}

/// Content of the first fenced block, or the whole text
fn unfence(text: &str) -> &str {
    fenced_block()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
}

/// Split a comma-separated list of paths
///
/// Newlines also separate entries; surrounding whitespace, quotes and
/// backticks are trimmed; empty entries are dropped.
pub fn parse_path_list(text: &str) -> Vec<String> {
    unfence(text)
        .split([',', '\n'])
        .map(|entry| {
            entry
                .trim()
                .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
                .trim()
        })
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract a single JSON object from a response
///
/// A ```json fenced block wins; otherwise the span from the first `{` to the
/// last `}` is tried.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let candidate = match fenced_json_object().captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => {
            let start = text.find('{')?;
            let end = text.rfind('}')?;
            if end < start {
                return None;
            }
            &text[start..=end]
        }
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            debug!("Oracle response is not valid JSON: {}", e);
            None
        }
    }
}
