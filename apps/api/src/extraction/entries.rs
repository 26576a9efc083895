//! Experience and education parsers.
//!
//! Both follow the same shape: structured split rules first, then content
//! signals (dates, role or degree keywords) to detect entry starts, peeking at
//! the next line when the company or institution is not on the same line.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::extraction::patterns::{first_match, RuleLayout, SplitRule};
use crate::models::resume::{EducationEntry, ExperienceEntry};

pub const UNKNOWN_POSITION: &str = "Unknown Position";
pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const UNKNOWN_DURATION: &str = "Unknown Duration";
pub const UNKNOWN_DEGREE: &str = "Unknown Degree";
pub const UNKNOWN_INSTITUTION: &str = "Unknown Institution";
pub const UNKNOWN_YEAR: &str = "Unknown Year";

static EXPERIENCE_RULES: Lazy<Vec<SplitRule>> = Lazy::new(|| {
    vec![
        SplitRule::new(
            "title-company-duration",
            r"^(.+?)\s+[-–—]\s+(.+?)\s+[-–—]\s+(.+)$",
            RuleLayout::Triple,
        ),
        SplitRule::new(
            "title-at-company-(duration)",
            r"^(.+?)\s+at\s+(.+?)\s+\((.+?)\)$",
            RuleLayout::Triple,
        ),
        SplitRule::new(
            "title|company|duration",
            r"^(.+?)\s+\|\s+(.+?)\s+\|\s+(.+)$",
            RuleLayout::Triple,
        ),
        SplitRule::new(
            "title@company-duration",
            r"^(.+?)\s+@\s+(.+?)\s+[-–—]\s+(.+)$",
            RuleLayout::Triple,
        ),
        SplitRule::new("title-(duration)", r"^(.+?)\s+\((.+?)\)$", RuleLayout::PrimaryDate),
    ]
});

static EXPERIENCE_SPLITS: Lazy<Vec<SplitRule>> = Lazy::new(|| {
    vec![
        SplitRule::new("title-company", r"^(.+?)\s+[-–—]\s+(.+)$", RuleLayout::Pair),
        SplitRule::new("title-at-company", r"^(.+?)\s+at\s+(.+)$", RuleLayout::Pair),
        SplitRule::new("title@company", r"^(.+?)\s+@\s+(.+)$", RuleLayout::Pair),
        SplitRule::new("title|company", r"^(.+?)\s+\|\s+(.+)$", RuleLayout::Pair),
        SplitRule::new("title,company", r"^(.+?)\s*,\s*(.+)$", RuleLayout::Pair),
    ]
});

static EDUCATION_RULES: Lazy<Vec<SplitRule>> = Lazy::new(|| {
    vec![
        SplitRule::new(
            "degree-institution-year",
            r"^(.+?)\s+[-–—]\s+(.+?)\s+[-–—]\s+(.+)$",
            RuleLayout::Triple,
        ),
        SplitRule::new(
            "degree-at-institution-(year)",
            r"^(.+?)\s+at\s+(.+?)\s+\((.+?)\)$",
            RuleLayout::Triple,
        ),
        SplitRule::new(
            "degree|institution|year",
            r"^(.+?)\s+\|\s+(.+?)\s+\|\s+(.+)$",
            RuleLayout::Triple,
        ),
        SplitRule::new(
            "degree-from-institution-year",
            r"^(.+?)\s+from\s+(.+?)\s+[-–—]\s+(.+)$",
            RuleLayout::Triple,
        ),
        SplitRule::new("degree-(year)", r"^(.+?)\s+\((.+?)\)$", RuleLayout::PrimaryDate),
    ]
});

static EDUCATION_SPLITS: Lazy<Vec<SplitRule>> = Lazy::new(|| {
    vec![
        SplitRule::new("degree-institution", r"^(.+?)\s+[-–—]\s+(.+)$", RuleLayout::Pair),
        SplitRule::new("degree-at-institution", r"^(.+?)\s+at\s+(.+)$", RuleLayout::Pair),
        SplitRule::new("degree-from-institution", r"^(.+?)\s+from\s+(.+)$", RuleLayout::Pair),
        SplitRule::new("degree|institution", r"^(.+?)\s+\|\s+(.+)$", RuleLayout::Pair),
        SplitRule::new("degree,institution", r"^(.+?)\s*,\s*(.+)$", RuleLayout::Pair),
    ]
});

/// English and Indonesian month names plus their common abbreviations.
const MONTH: &str = "(?:january|february|march|april|may|june|july|august|september|october|november|december\
|januari|februari|maret|mei|juni|juli|agustus|oktober|desember\
|jan|feb|mar|apr|jun|jul|aug|agu|sept|sep|oct|okt|nov|dec|des)";

/// Duration patterns, most specific first.
static DURATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    let month_range = format!(
        r"(?i)\b(?:{MONTH}\.?\s+)?\d{{4}}\s*[-–—]\s*(?:(?:{MONTH}\.?\s+)?\d{{4}}|present|current|now|sekarang)\b"
    );
    [
        month_range.as_str(),
        r"(?i)\b(\d{4}\s*[-–—]\s*\d{4}|\d{4}\s*[-–—]\s*present|present)\b",
        r"(?i)\b(januari|februari|maret|april|mei|juni|juli|agustus|september|oktober|november|desember)\s+\d{4}",
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{4}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("duration regex is valid"))
    .collect()
});

static ROLE_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(designer|developer|manager|analyst|engineer|coordinator|specialist|assistant|director|lead|senior|junior)\b",
    )
    .expect("role keyword regex is valid")
});

/// Year patterns, ranges before single years.
static YEAR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:19|20)\d{2}\s*[-–—]\s*(?:(?:19|20)\d{2}|present|sekarang)\b",
        r"\b\d{4}\s*[-–—]\s*\d{4}\b",
        r"\b(?:19|20)\d{2}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("year regex is valid"))
    .collect()
});

static DEGREE_KEYWORDS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(bachelor|master|phd|doctorate|diploma|certificate|sarjana|magister|doktor)\b",
        r"(?i)\b(s1|s2|s3|d3|d4)\b",
        r"(?i)\b(bsc|msc|ba|ma|bs|ms|mba|beng|meng|bcom|mcom)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("degree keyword regex is valid"))
    .collect()
});

static INSTITUTION_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(university|college|institute|school|universitas|institut|sekolah|politeknik)\b")
        .expect("institution keyword regex is valid")
});

static ALL_CAPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z\s]+$").expect("all caps regex is valid"));

static TRAILING_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-–—,]+$").expect("trailing punctuation regex is valid"));

// ────────────────────────────────────────────────────────────────────────────
// Predicates
// ────────────────────────────────────────────────────────────────────────────

pub fn find_duration(line: &str) -> Option<String> {
    DURATION_PATTERNS
        .iter()
        .find_map(|p| p.find(line).map(|m| m.as_str().trim().to_string()))
}

pub fn has_duration(line: &str) -> bool {
    DURATION_PATTERNS.iter().any(|p| p.is_match(line))
}

pub fn has_role_keyword(line: &str) -> bool {
    ROLE_KEYWORDS.is_match(line)
}

pub fn find_year(line: &str) -> Option<String> {
    YEAR_PATTERNS
        .iter()
        .find_map(|p| p.find(line).map(|m| m.as_str().trim().to_string()))
}

pub fn has_year(line: &str) -> bool {
    YEAR_PATTERNS.iter().any(|p| p.is_match(line))
}

pub fn has_degree_keyword(line: &str) -> bool {
    DEGREE_KEYWORDS.iter().any(|p| p.is_match(line))
}

pub fn has_institution_keyword(line: &str) -> bool {
    INSTITUTION_KEYWORDS.is_match(line)
}

/// Removes the first occurrence of `part` and any dangling trailing separator.
fn strip_part(line: &str, part: &str, trailing: &Regex) -> String {
    let remaining = line.replacen(part, "", 1);
    trailing.replace(remaining.trim(), "").trim().to_string()
}

/// Consumes `lines[*next]` when `accept` approves it as the missing second field.
fn take_next_line<F>(lines: &[String], next: &mut usize, accept: F) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    let candidate = lines.get(*next)?.trim();
    if accept(candidate) {
        *next += 1;
        Some(candidate.to_string())
    } else {
        None
    }
}

fn company_candidate(line: &str) -> bool {
    let len = line.chars().count();
    len > 2 && len < 80 && !has_duration(line)
}

fn institution_candidate(line: &str) -> bool {
    let len = line.chars().count();
    len > 2 && len < 100 && (has_institution_keyword(line) || !has_year(line))
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Experience
// ────────────────────────────────────────────────────────────────────────────

pub fn parse_experience(lines: &[String]) -> Vec<ExperienceEntry> {
    let mut entries = Vec::new();
    let mut current: Option<ExperienceEntry> = None;
    let mut next = 0;

    while next < lines.len() {
        let line = lines[next].trim();
        next += 1;
        if line.is_empty() {
            continue;
        }

        if let Some(m) = first_match(&EXPERIENCE_RULES, line) {
            trace!(rule = m.label, "experience line matched");
            let company = match m.secondary {
                Some(company) => company,
                None => take_next_line(lines, &mut next, company_candidate).unwrap_or_default(),
            };
            entries.extend(current.take());
            current = Some(ExperienceEntry {
                title: m.primary,
                company,
                duration: m.date.unwrap_or_default(),
                description: String::new(),
            });
            continue;
        }

        let len = line.chars().count();
        if (has_duration(line) || has_role_keyword(line)) && len > 5 && len < 100 {
            let duration = find_duration(line).unwrap_or_default();
            let remaining = if duration.is_empty() {
                line.to_string()
            } else {
                strip_part(line, &duration, &TRAILING_PUNCT)
            };

            // A bare date line completes the open entry instead of starting one.
            if remaining.is_empty() {
                if let Some(entry) = current.as_mut() {
                    if entry.duration.is_empty() || entry.duration == UNKNOWN_DURATION {
                        entry.duration = duration;
                    }
                }
                continue;
            }

            let (title, company) = match first_match(&EXPERIENCE_SPLITS, &remaining) {
                Some(m) => (m.primary, m.secondary.unwrap_or_default()),
                None => {
                    let company =
                        take_next_line(lines, &mut next, company_candidate).unwrap_or_default();
                    (remaining, company)
                }
            };

            entries.extend(current.take());
            current = Some(ExperienceEntry {
                title: or_default(title, UNKNOWN_POSITION),
                company: or_default(company, UNKNOWN_COMPANY),
                duration: or_default(duration, UNKNOWN_DURATION),
                description: String::new(),
            });
            continue;
        }

        if let Some(entry) = current.as_mut() {
            if len > 5 && !ALL_CAPS.is_match(line) {
                if !entry.description.is_empty() {
                    entry.description.push(' ');
                }
                entry.description.push_str(line);
            }
        }
    }

    entries.extend(current);
    entries
}

// ────────────────────────────────────────────────────────────────────────────
// Education
// ────────────────────────────────────────────────────────────────────────────

pub fn parse_education(lines: &[String]) -> Vec<EducationEntry> {
    let mut entries: Vec<EducationEntry> = Vec::new();
    let mut next = 0;

    while next < lines.len() {
        let line = lines[next].trim();
        next += 1;
        if line.is_empty() {
            continue;
        }

        if let Some(m) = first_match(&EDUCATION_RULES, line) {
            trace!(rule = m.label, "education line matched");
            let institution = match m.secondary {
                Some(institution) => institution,
                None => take_next_line(lines, &mut next, institution_candidate).unwrap_or_default(),
            };
            entries.push(EducationEntry {
                degree: m.primary,
                institution,
                year: m.date.unwrap_or_default(),
            });
            continue;
        }

        let len = line.chars().count();
        let degree_hit = has_degree_keyword(line);
        let institution_hit = has_institution_keyword(line);
        if !((has_year(line) || degree_hit || institution_hit) && len > 5 && len < 150) {
            continue;
        }

        let year = find_year(line).unwrap_or_default();
        let remaining = if year.is_empty() {
            line.to_string()
        } else {
            strip_part(line, &year, &TRAILING_PUNCT)
        };

        if remaining.is_empty() {
            if let Some(last) = entries.last_mut() {
                if last.year.is_empty() || last.year == UNKNOWN_YEAR {
                    last.year = year;
                }
            }
            continue;
        }

        let (degree, institution) = match first_match(&EDUCATION_SPLITS, &remaining) {
            Some(m) => {
                let first = m.primary;
                let second = m.secondary.unwrap_or_default();
                if has_institution_keyword(&first) && !has_degree_keyword(&first) {
                    (second, first)
                } else {
                    (first, second)
                }
            }
            None if degree_hit => {
                let institution =
                    take_next_line(lines, &mut next, institution_candidate).unwrap_or_default();
                (remaining, institution)
            }
            None if institution_hit => (UNKNOWN_DEGREE.to_string(), remaining),
            None => (remaining, String::new()),
        };

        entries.push(EducationEntry {
            degree: or_default(degree, UNKNOWN_DEGREE),
            institution: or_default(institution, UNKNOWN_INSTITUTION),
            year: or_default(year, UNKNOWN_YEAR),
        });
    }

    entries
}
