//! Extraction of a file name and code body from a free-form model response.
//!
//! The model is asked to wrap the name in `[fileName]...[/fileName]` and the
//! source in `[code]...[/code]`. Anything else in the response is ignored,
//! and missing pieces fall back to defaults rather than failing.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "// The generator returned an empty response.";

/// What the parser found in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub file_name: String,
    pub code: String,
}

fn file_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)\[fileName\](.*?)\[/fileName\]").expect("file name pattern is valid")
    })
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\[code\](.*)\[/code\]").expect("code pattern is valid"))
}

/// Date-stamped name used whenever the response does not supply one.
pub fn default_file_name(now: DateTime<Utc>, extension: &str) -> String {
    format!("CodeOfTheDay_{}.{}", now.format("%Y%m%d"), extension)
}

/// Parse a raw response. Never fails.
pub fn parse_response(raw: Option<&str>, now: DateTime<Utc>, extension: &str) -> ParsedResponse {
    let raw = match raw.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => {
            return ParsedResponse {
                file_name: default_file_name(now, extension),
                code: EMPTY_RESPONSE_PLACEHOLDER.to_string(),
            }
        }
    };

    let file_name = file_name_pattern()
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|name| is_plain_file_name(name))
        .map(str::to_string)
        .unwrap_or_else(|| default_file_name(now, extension));

    let code = code_pattern()
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    ParsedResponse { file_name, code }
}

/// Characters that would change the meaning of a URL path or a Markdown link.
const URL_RESERVED: &[char] = &['#', '?', '%'];

/// A single path component with no traversal.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && !name.contains(URL_RESERVED)
        && !name.chars().any(char::is_control)
}
