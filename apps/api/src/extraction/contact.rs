//! Header-area extraction: name, email, phone, location, and links.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::resume::{Link, ResumeRecord, UNKNOWN_NAME};

/// Contact details are only searched for in the first lines of the document.
const CONTACT_SCAN_LINES: usize = 10;
const NAME_SCAN_LINES: usize = 5;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email regex is valid")
});

static PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\+?[1-9]\d{1,14}",
        r"(?:\+?1[-\s]?)?\(?([0-9]{3})\)?[-\s]?([0-9]{3})[-\s]?([0-9]{4})",
        r"\(?\d{3}\)?[-\s]?\d{3}[-\s]?\d{4}",
        r"\d{3}[-.]\d{3}[-.]\d{4}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("phone regex is valid"))
    .collect()
});

static LOCATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b[A-Z][a-z]+\s+[A-Z][a-z]+,\s*[A-Z]{2}\b",
        r"\b[A-Z][a-z]+,\s*[A-Z]{2}\b",
        r"\b[A-Z][a-z]+,\s*[A-Z][a-z]+\b",
        r"\b\d{5}(?:-\d{4})?\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("location regex is valid"))
    .collect()
});

static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^[A-Z][a-z]+\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?$",
        r"^[A-Z]\s+[A-Z][a-z]+\s+[A-Z][a-z]+\s+[A-Z][a-z]+$",
        r"^[A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,3}$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("name regex is valid"))
    .collect()
});

static THREE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{3}").expect("digit run regex is valid"));

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("url regex is valid"));

static BARE_SOCIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:www\.)?((?:linkedin\.com/in|github\.com|twitter\.com|instagram\.com)/[^\s,;|()]+)")
        .expect("social link regex is valid")
});

/// Fills `name`, `email`, `phone` and `location` from the top of the document.
pub fn extract_contact_info(lines: &[String], record: &mut ResumeRecord) {
    for line in lines.iter().take(CONTACT_SCAN_LINES) {
        if record.email.is_none() {
            record.email = find_email(line);
        }
        if record.phone.is_none() {
            record.phone = find_phone(line);
        }
        if record.location.is_none() {
            record.location = find_location(line);
        }
    }

    if record.name.is_empty() {
        record.name = find_name(lines);
    }
}

pub fn find_email(line: &str) -> Option<String> {
    EMAIL.find(line).map(|m| m.as_str().to_string())
}

/// First phone-shaped substring carrying a plausible number of digits.
///
/// The unformatted international pattern runs first so long numbers are not cut
/// down to their first ten digits by the US pattern.
pub fn find_phone(line: &str) -> Option<String> {
    PHONE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .find(line)
            .map(|m| m.as_str().trim().to_string())
            .filter(|candidate| is_plausible_phone(candidate))
    })
}

pub fn find_location(line: &str) -> Option<String> {
    LOCATION_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(line).map(|m| m.as_str().to_string()))
}

/// True when the candidate has between 7 and 15 digits.
pub fn is_plausible_phone(candidate: &str) -> bool {
    let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
    (7..=15).contains(&digits)
}

fn find_name(lines: &[String]) -> String {
    for line in lines.iter().take(NAME_SCAN_LINES) {
        let line = line.trim();
        if carries_contact_content(line) || line.chars().count() > 100 {
            continue;
        }
        let len = line.chars().count();
        if len > 2 && len < 80 && NAME_PATTERNS.iter().any(|p| p.is_match(line)) {
            return line.to_string();
        }
    }

    match lines.first().map(|l| l.trim()) {
        Some(first) if first.chars().count() < 80 && !carries_contact_content(first) => {
            first.to_string()
        }
        Some(_) => UNKNOWN_NAME.to_string(),
        None => String::new(),
    }
}

fn carries_contact_content(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.contains('@')
        || line.contains("http")
        || lower.contains("resume")
        || lower.contains("curriculum")
        || lower.contains("cv")
        || THREE_DIGITS.is_match(line)
}

/// Collects explicit URLs and bare social-profile mentions from every line.
pub fn extract_links(lines: &[String], record: &mut ResumeRecord) {
    for line in lines {
        for m in URL.find_iter(line) {
            let url = trim_url(m.as_str());
            record.links.push(Link {
                link_type: link_type_for(url).to_string(),
                url: url.to_string(),
            });
        }

        let without_urls = URL.replace_all(line, " ");
        for caps in BARE_SOCIAL.captures_iter(&without_urls) {
            if let Some(m) = caps.get(1) {
                let url = trim_url(m.as_str());
                record.links.push(Link {
                    link_type: link_type_for(url).to_string(),
                    url: url.to_string(),
                });
            }
        }
    }
}

fn trim_url(url: &str) -> &str {
    url.trim_end_matches(&['.', ',', ';', ')'][..])
}

pub fn link_type_for(url: &str) -> &'static str {
    let lower = url.to_lowercase();
    if lower.contains("linkedin.com/in/") {
        "linkedin"
    } else if lower.contains("github.com/") {
        "github"
    } else if lower.contains("twitter.com/") {
        "twitter"
    } else if lower.contains("instagram.com/") {
        "instagram"
    } else {
        "website"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_contact_block() {
        let mut record = ResumeRecord::default();
        extract_contact_info(
            &lines(&[
                "John Doe",
                "john@example.com",
                "(555) 123-4567",
                "Austin, TX",
            ]),
            &mut record,
        );
        assert_eq!(record.name, "John Doe");
        assert_eq!(record.email.as_deref(), Some("john@example.com"));
        assert_eq!(record.phone.as_deref(), Some("(555) 123-4567"));
        assert_eq!(record.location.as_deref(), Some("Austin, TX"));
    }

    #[test]
    fn test_year_is_not_a_phone() {
        assert_eq!(find_phone("Engineer 2020 - 2023"), None);
    }

    #[test]
    fn test_international_phone() {
        assert_eq!(find_phone("Phone: +6281234567890").as_deref(), Some("+6281234567890"));
    }

    #[test]
    fn test_two_word_city_preferred() {
        assert_eq!(
            find_location("Based in San Francisco, CA").as_deref(),
            Some("San Francisco, CA")
        );
    }

    #[test]
    fn test_name_skips_resume_heading() {
        let mut record = ResumeRecord::default();
        extract_contact_info(&lines(&["Resume", "Maria Garcia Lopez"]), &mut record);
        assert_eq!(record.name, "Maria Garcia Lopez");
    }

    #[test]
    fn test_indonesian_initial_name() {
        let mut record = ResumeRecord::default();
        extract_contact_info(&lines(&["I Gede Agus Putra"]), &mut record);
        assert_eq!(record.name, "I Gede Agus Putra");
    }

    #[test]
    fn test_name_fallback_to_first_line() {
        let mut record = ResumeRecord::default();
        extract_contact_info(&lines(&["jane roe", "jane@x.io"]), &mut record);
        assert_eq!(record.name, "jane roe");
    }

    #[test]
    fn test_name_sentinel_when_first_line_is_contact() {
        let mut record = ResumeRecord::default();
        extract_contact_info(&lines(&["jane@x.io | 555-123-4567"]), &mut record);
        assert_eq!(record.name, UNKNOWN_NAME);
    }

    #[test]
    fn test_name_left_empty_without_lines() {
        let mut record = ResumeRecord::default();
        extract_contact_info(&[], &mut record);
        assert_eq!(record.name, "");
    }

    #[test]
    fn test_links_typed() {
        let mut record = ResumeRecord::default();
        extract_links(
            &lines(&[
                "https://www.linkedin.com/in/jdoe, https://jdoe.dev",
                "Code: github.com/jdoe",
            ]),
            &mut record,
        );
        assert_eq!(record.links.len(), 3);
        assert_eq!(record.links[0].link_type, "linkedin");
        assert_eq!(record.links[0].url, "https://www.linkedin.com/in/jdoe");
        assert_eq!(record.links[1].link_type, "website");
        assert_eq!(record.links[2].link_type, "github");
        assert_eq!(record.links[2].url, "github.com/jdoe");
    }

    #[test]
    fn test_bare_link_inside_url_not_duplicated() {
        let mut record = ResumeRecord::default();
        extract_links(&lines(&["https://github.com/jdoe"]), &mut record);
        assert_eq!(record.links.len(), 1);
    }
}
