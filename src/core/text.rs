//! Text utilities shared by sessions, exports and model-response parsing
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Add markdown stripping and word wrapping for paginated exports
//! - 1.0.0: Title truncation, JSON fence stripping, file-name sanitizing

use regex::Regex;
use std::sync::OnceLock;

/// Maximum number of characters taken from the first message for a chat title
pub const TITLE_LIMIT: usize = 35;

static JSON_FENCE: OnceLock<Regex> = OnceLock::new();
static MD_HEADING: OnceLock<Regex> = OnceLock::new();
static MD_BOLD: OnceLock<Regex> = OnceLock::new();
static MD_BULLET: OnceLock<Regex> = OnceLock::new();

fn json_fence() -> &'static Regex {
    JSON_FENCE.get_or_init(|| {
        Regex::new(r"^\s*```(?:json)?\s*|\s*```\s*$").expect("static regex is valid")
    })
}

/// Build a chat title from the user's first message
///
/// Counts characters (not bytes) so multi-byte input never splits mid-character.
pub fn truncate_title(input: &str) -> String {
    let mut chars = input.chars();
    let head: String = chars.by_ref().take(TITLE_LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Remove a leading ```` ```json ```` (or bare ```` ``` ````) fence and a trailing fence
pub fn strip_json_fence(text: &str) -> String {
    json_fence().replace_all(text, "").trim().to_string()
}

/// Turn a chat title into a lowercase file-name stem (`[a-z0-9_]` only)
pub fn safe_file_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .to_lowercase()
}

/// Strip the small markdown subset the model uses (headings, bold, bullets)
pub fn strip_markdown(text: &str) -> String {
    let heading = MD_HEADING.get_or_init(|| Regex::new(r"(?m)^## (.*)$").expect("static regex is valid"));
    let bold = MD_BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("static regex is valid"));
    let bullet = MD_BULLET.get_or_init(|| Regex::new(r"(?m)^\* (.*)$").expect("static regex is valid"));

    let text = heading.replace_all(text, "$1");
    let text = bold.replace_all(&text, "$1");
    bullet.replace_all(&text, "- $1").into_owned()
}

/// Word-wrap text to `width` characters per line
///
/// Existing line breaks are kept (blank lines included). Words longer than
/// `width` are split on character boundaries.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        if raw_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let word_len = word.chars().count();
            let current_len = current.chars().count();

            if word_len > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                lines.extend(split_long_word(word, width));
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
            } else if current_len + 1 + word_len <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Split a single long word into pieces of at most `width` characters
fn split_long_word(word: &str, width: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();

    for ch in word.chars() {
        if current.chars().count() == width {
            result.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }

    if !current.is_empty() {
        result.push(current);
    }

    result
}
