//! Interpretation of free-text model replies.
//!
//! The model is asked to either echo English input, translate it, or answer
//! `Unintelligible`. Nothing forces it to, so everything here is heuristic.

use regex::Regex;
use std::sync::LazyLock;

pub const UNINTELLIGIBLE: &str = "Unintelligible";

/// Phrases signalling the model did not follow instructions.
const ERROR_PHRASES: [&str; 3] = ["i don't understand", "unrecognized format", "error"];

/// Greedy prefix (which may span lines) anchors the capture at the last trigger phrase.
static TRANSLATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^(?s:.*)(?:means:|is:|translation:|to English is:)\s*["']?(.+?)["']?\n?$"#)
        .expect("valid regex")
});

static ENGLISH_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:already in English|text is in English)\b").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyClass {
    /// Reply looks like an error or a refusal.
    Malformed,
    Unintelligible,
    /// Source text was already English, the caller keeps the original.
    English,
    Translated(String),
}

/// Extracts the translated part of a reply, dropping the model's preamble.
///
/// Falls back to the whole reply when no trigger phrase is present.
pub fn extract_translation(reply: &str) -> String {
    match TRANSLATION_REGEX.captures(reply) {
        Some(caps) => caps[1].to_owned(),
        None => reply.to_owned(),
    }
}

pub fn classify_reply(original: &str, reply: &str) -> ReplyClass {
    let reply = reply.trim();
    let reply_lc = reply.to_lowercase();

    if ERROR_PHRASES.iter().any(|p| reply_lc.contains(p)) {
        return ReplyClass::Malformed;
    }

    if reply_lc == UNINTELLIGIBLE.to_lowercase() {
        return ReplyClass::Unintelligible;
    }

    // Exact echo only, the model paraphrasing English input is not detected
    let is_english = ENGLISH_MARKER_REGEX.is_match(reply) || reply == original;

    if is_english {
        ReplyClass::English
    } else {
        ReplyClass::Translated(extract_translation(reply))
    }
}
