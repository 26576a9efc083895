//! Normalizes raw PDF text before line splitting.

use once_cell::sync::Lazy;
use regex::Regex;

static LOWER_UPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("lower/upper boundary regex is valid"));
static DIGIT_UPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9])([A-Z])").expect("digit/upper boundary regex is valid"));
static BULLETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[•▪▫◦‣⁃]").expect("bullet glyph regex is valid"));
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[–—]").expect("dash regex is valid"));
static HORIZONTAL_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("horizontal whitespace regex is valid"));
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("blank line regex is valid"));

/// Undoes the usual PDF text-extraction artifacts. Total over all inputs.
pub fn preprocess_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = LOWER_UPPER.replace_all(&text, "$1 $2");
    let text = DIGIT_UPPER.replace_all(&text, "$1 $2");
    let text = BULLETS.replace_all(&text, "•");
    let text = DASHES.replace_all(&text, "-");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    BLANK_LINES.replace_all(&text, "\n").into_owned()
}

/// Splits normalized text into trimmed, non-empty lines.
pub fn to_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
