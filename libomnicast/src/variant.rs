//! Message variant generation
//!
//! Rewrites a draft into a more "social" variant: sentences are normalized
//! onto one line, up to six keywords are appended as hashtags, and a call to
//! action closes the post. Purely textual, no I/O.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

pub const CALL_TO_ACTION: &str = "Follow for more and share your thoughts!";

const MAX_HASHTAGS: usize = 6;

fn keyword_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-z0-9]{4,}").expect("keyword pattern is valid"))
}

/// Build the variant of `text`
///
/// Blank input is returned unchanged.
pub fn generate_variant(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return text.to_string();
    }

    let sentences = split_sentences(trimmed).join(" ");
    let hashtags = hashtags(trimmed).join(" ");

    format!("{}\n\n{}\n{}", sentences, hashtags, CALL_TO_ACTION)
}

/// Split at runs of whitespace that directly follow `.`, `!` or `?`
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = idx + c.len_utf8();
        let mut next_start = end;
        while let Some(&(ws_idx, ws)) = chars.peek() {
            if !ws.is_whitespace() {
                break;
            }
            next_start = ws_idx + ws.len_utf8();
            chars.next();
        }
        if next_start > end {
            sentences.push(&text[start..end]);
            start = next_start;
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Distinct lowercase keywords of four or more ASCII alphanumerics, first
/// occurrence order, prefixed with `#`
fn hashtags(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();

    keyword_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|word| seen.insert(word.to_string()))
        .take(MAX_HASHTAGS)
        .map(|word| format!("#{}", word))
        .collect()
}
