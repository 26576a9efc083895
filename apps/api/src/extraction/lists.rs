//! Parsers for the free-form sections: summary, certifications, languages,
//! projects and awards.

use crate::models::resume::ListEntry;

pub const SUMMARY_PARSE_CAP: usize = 500;

/// Cuts `text` so the result, marker included, is at most `cap` characters.
pub fn truncate_with_marker(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        return text.to_string();
    }
    let mut out: String = text.chars().take(cap.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

pub fn parse_summary(lines: &[String]) -> Option<String> {
    let text = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.chars().count() > 20 {
        Some(truncate_with_marker(&text, SUMMARY_PARSE_CAP))
    } else {
        None
    }
}

/// Keeps trimmed lines whose length lies strictly between `min` and `max`.
fn lines_between(lines: &[String], min: usize, max: usize) -> Vec<ListEntry> {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| {
            let len = l.chars().count();
            len > min && len < max
        })
        .map(ListEntry::from)
        .collect()
}

pub fn parse_certifications(lines: &[String]) -> Vec<ListEntry> {
    lines_between(lines, 2, 100)
}

pub fn parse_languages(lines: &[String]) -> Vec<ListEntry> {
    lines
        .join("\n")
        .split(&[',', ';', '•', '\n', '|'][..])
        .map(str::trim)
        .filter(|token| {
            let len = token.chars().count();
            len > 1 && len < 30
        })
        .map(ListEntry::from)
        .collect()
}

pub fn parse_projects(lines: &[String]) -> Vec<ListEntry> {
    lines_between(lines, 5, 200)
}

pub fn parse_awards(lines: &[String]) -> Vec<ListEntry> {
    lines_between(lines, 5, 200)
}
