//! Final normalization pass. Running it twice yields the same record as running
//! it once, so remote results and local results can both be passed through it.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

use crate::extraction::lists::truncate_with_marker;
use crate::models::resume::{ListEntry, ResumeRecord, UNKNOWN_NAME};

const NAME_CAP: usize = 100;
const LOCATION_CAP: usize = 100;
const SUMMARY_CAP: usize = 1000;
const ENTRY_FIELD_CAP: usize = 100;

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));
static NAME_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:resume|cv|curriculum vitae|profile|about|summary)\b[:\s]*)+")
        .expect("name prefix regex is valid")
});
static SKILL_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:and|or|also|including|such as|like)\b[:\s]*)+")
        .expect("skill noise regex is valid")
});
static VALID_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));
static PHONE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\d+\-()\s]").expect("phone char regex is valid"));
static SOCIAL_DOMAINS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:www\.)?(?:linkedin\.com|github\.com|twitter\.com|instagram\.com)")
        .expect("social domain regex is valid")
});

fn strip_tags(text: &str) -> String {
    TAGS.replace_all(text, "").trim().to_string()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

pub fn clean_record(mut record: ResumeRecord) -> ResumeRecord {
    record.name = clean_name(&record.name);
    record.email = record.email.as_deref().and_then(clean_email);
    record.phone = record.phone.as_deref().and_then(clean_phone);
    record.location = record
        .location
        .as_deref()
        .and_then(|loc| non_empty(truncate_with_marker(&strip_tags(loc), LOCATION_CAP)));
    record.summary = record.summary.as_deref().and_then(clean_summary);

    record.experience.retain_mut(|exp| {
        exp.title = strip_tags(&exp.title);
        exp.company = strip_tags(&exp.company);
        exp.duration = strip_tags(&exp.duration);
        exp.description = strip_tags(&exp.description);
        if char_len(&exp.title) < 2 || char_len(&exp.company) < 2 {
            return false;
        }
        exp.title = truncate_with_marker(&exp.title, ENTRY_FIELD_CAP);
        exp.company = truncate_with_marker(&exp.company, ENTRY_FIELD_CAP);
        true
    });

    record.education.retain_mut(|edu| {
        edu.degree = strip_tags(&edu.degree);
        edu.institution = strip_tags(&edu.institution);
        edu.year = strip_tags(&edu.year);
        if char_len(&edu.degree) < 2 || char_len(&edu.institution) < 2 {
            return false;
        }
        edu.degree = truncate_with_marker(&edu.degree, ENTRY_FIELD_CAP);
        edu.institution = truncate_with_marker(&edu.institution, ENTRY_FIELD_CAP);
        true
    });

    record.skills = clean_skills(std::mem::take(&mut record.skills));
    record.certifications = clean_list(std::mem::take(&mut record.certifications), 2);
    record.languages = clean_list(std::mem::take(&mut record.languages), 1);
    record.projects = clean_list(std::mem::take(&mut record.projects), 5);
    record.awards = clean_list(std::mem::take(&mut record.awards), 5);

    let mut seen_urls = HashSet::new();
    record.links.retain_mut(|link| {
        link.url = link.url.trim().to_string();
        is_valid_link(&link.url) && seen_urls.insert(link.url.to_lowercase())
    });

    record
}

/// Truncates before the plausibility check so a second pass sees the same input.
fn clean_name(raw: &str) -> String {
    let name = strip_tags(raw);
    let name = NAME_PREFIX.replace(&name, "").trim().to_string();
    let name = truncate_with_marker(&name, NAME_CAP);

    let len = char_len(&name);
    if len < 2 {
        return UNKNOWN_NAME.to_string();
    }
    let special = name
        .chars()
        .filter(|c| !(c.is_alphabetic() || c.is_whitespace() || *c == '-' || *c == '.'))
        .count();
    if special * 10 > len * 3 {
        return UNKNOWN_NAME.to_string();
    }
    name
}

fn clean_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    VALID_EMAIL.is_match(&email).then_some(email)
}

fn clean_phone(raw: &str) -> Option<String> {
    let phone = PHONE_CHARS.replace_all(raw, "").trim().to_string();
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    (7..=15).contains(&digits).then_some(phone)
}

fn clean_summary(raw: &str) -> Option<String> {
    let summary = TAGS.replace_all(raw, "");
    let summary = WHITESPACE.replace_all(&summary, " ").trim().to_string();
    non_empty(truncate_with_marker(&summary, SUMMARY_CAP))
}

fn clean_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut cleaned: Vec<String> = skills
        .iter()
        .map(|skill| {
            let skill = strip_tags(skill);
            SKILL_NOISE.replace(&skill, "").trim().to_string()
        })
        .filter(|skill| (2..=50).contains(&char_len(skill)))
        .filter(|skill| seen.insert(skill.to_lowercase()))
        .collect();
    cleaned.sort_by(|a, b| char_len(b).cmp(&char_len(a)));
    cleaned
}

/// Trims text items, drops labels of `min_len` chars or fewer, dedupes by label.
fn clean_list(entries: Vec<ListEntry>, min_len: usize) -> Vec<ListEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .map(|entry| match entry {
            ListEntry::Text(text) => ListEntry::Text(strip_tags(&text)),
            record => record,
        })
        .filter(|entry| {
            let label = entry.label();
            char_len(label.trim()) > min_len && seen.insert(label.trim().to_lowercase())
        })
        .collect()
}

fn is_valid_link(url: &str) -> bool {
    if char_len(url) < 5 {
        return false;
    }
    Url::parse(url).is_ok() || SOCIAL_DOMAINS.is_match(url)
}
