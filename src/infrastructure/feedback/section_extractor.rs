// ============================================================
// SECTION EXTRACTOR
// ============================================================
// Split a conversation transcript into its four labeled sections

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::feedback::ExtractedFields;

static ISSUE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<b>Customer Issue:</b>(.*?)<b>Agent's Actions:</b>").unwrap()
});

static ACTIONS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<b>Agent's Actions:</b>(.*?)<b>Customer's Anxiety:</b>").unwrap()
});

static ANXIETY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<b>Customer's Anxiety:</b>(.*?)<b>Important Keywords:</b>").unwrap()
});

static KEYWORDS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<b>Important Keywords:</b>(.*)").unwrap());

/// Extract the four sections of a transcript.
///
/// Each of the first three sections runs from its label to the next label, so a
/// missing label empties both its own section and the one before it. Markup
/// inside a section body is kept verbatim.
pub fn extract_sections(text: &str) -> ExtractedFields {
    ExtractedFields {
        customer_issue: capture(&ISSUE_PATTERN, text),
        agent_actions: capture(&ACTIONS_PATTERN, text),
        customer_anxiety: capture(&ANXIETY_PATTERN, text),
        important_keywords: capture(&KEYWORDS_PATTERN, text),
    }
}

fn capture(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
