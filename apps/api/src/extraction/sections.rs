//! Section segmentation: splits resume lines into labelled regions.
//!
//! Explicit headers always win. While still in the header region, content
//! classifiers may open a section early so resumes without headings still
//! yield experience/education/skills content.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Header,
    Experience,
    Education,
    Skills,
    Summary,
    Certifications,
    Languages,
    Projects,
    Awards,
}

/// Section name → raw lines, built once per extraction run.
#[derive(Debug, Default)]
pub struct SectionMap {
    sections: HashMap<SectionKind, Vec<String>>,
}

impl SectionMap {
    /// Lines for `kind`, empty when the section never appeared.
    pub fn lines(&self, kind: SectionKind) -> &[String] {
        self.sections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Appends so that a section split across the document keeps all its lines.
    fn flush(&mut self, kind: SectionKind, buffer: &mut Vec<String>) {
        if buffer.is_empty() {
            return;
        }
        self.sections
            .entry(kind)
            .or_default()
            .append(buffer);
    }
}

/// Ordered header table; the first matching row names the section.
static HEADER_PATTERNS: Lazy<Vec<(SectionKind, Regex)>> = Lazy::new(|| {
    [
        (
            SectionKind::Experience,
            r"experience|work\s+experience|professional\s+experience|employment|career|work\s+history|pengalaman(?:\s+kerja)?",
        ),
        (
            SectionKind::Education,
            r"education|academic|qualifications|degrees?|pendidikan|riwayat\s+pendidikan",
        ),
        (
            SectionKind::Skills,
            r"skills|technical\s+skills|competencies|technologies|expertise|keahlian|kemampuan",
        ),
        (
            SectionKind::Summary,
            r"summary|profile|objective|about|about\s+me|overview|ringkasan|profil",
        ),
        (
            SectionKind::Certifications,
            r"certifications?|certificates?|licenses?|sertifikat|sertifikasi",
        ),
        (SectionKind::Languages, r"languages?|linguistic|bahasa"),
        (
            SectionKind::Projects,
            r"projects?|portfolio|personal\s+projects?|proyek",
        ),
        (
            SectionKind::Awards,
            r"awards?|achievements?|honors?|recognition|penghargaan",
        ),
    ]
    .into_iter()
    .map(|(kind, alternatives)| {
        let pattern = format!(r"(?i)^(?:{alternatives})\s*:?$");
        (kind, Regex::new(&pattern).expect("section header regex is valid"))
    })
    .collect()
});

static EXPERIENCE_SIGNALS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(designer|developer|manager|analyst|engineer|coordinator|specialist|assistant)\b",
        r"(?i)\b(\d{4}\s*-\s*\d{4}|\d{4}\s*-\s*present|present)\b",
        r"(?i)\b(company|corporation|llc)\b|\b(inc|ltd)\.",
        r"(?i)\b(januari|februari|maret|april|mei|juni|juli|agustus|september|oktober|november|desember)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("experience signal regex is valid"))
    .collect()
});

static EDUCATION_SIGNALS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(university|college|school|institute|akademi|universitas)\b",
        r"(?i)\b(bachelor|master|phd|degree|diploma|sarjana)\b",
        r"(?i)\b(graduated|graduation|lulus)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("education signal regex is valid"))
    .collect()
});

static SKILLS_SIGNALS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(javascript|python|java|html|css|react|vue|angular)\b",
        r"(?i)\b(photoshop|illustrator|figma|sketch|canva)\b",
        r"(?i)\b(microsoft|excel|word|powerpoint)\b",
        r"(?i)\b(programming|coding|development)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("skills signal regex is valid"))
    .collect()
});

/// Returns the section a full-line heading names, if any.
pub fn match_header(line: &str) -> Option<SectionKind> {
    let line = line.trim();
    HEADER_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(line))
        .map(|(kind, _)| *kind)
}

pub fn looks_like_experience(line: &str) -> bool {
    EXPERIENCE_SIGNALS.iter().any(|p| p.is_match(line))
}

pub fn looks_like_education(line: &str) -> bool {
    EDUCATION_SIGNALS.iter().any(|p| p.is_match(line))
}

pub fn looks_like_skills(line: &str) -> bool {
    SKILLS_SIGNALS.iter().any(|p| p.is_match(line))
}

/// Content classifiers consulted, in order, while still inside the header.
const CONTENT_CLASSIFIERS: &[(SectionKind, fn(&str) -> bool)] = &[
    (SectionKind::Experience, looks_like_experience),
    (SectionKind::Education, looks_like_education),
    (SectionKind::Skills, looks_like_skills),
];

/// Splits trimmed, non-empty lines into a `SectionMap`.
pub fn identify_sections(lines: &[String]) -> SectionMap {
    let mut map = SectionMap::default();
    let mut current = SectionKind::Header;
    let mut buffer: Vec<String> = Vec::new();

    for line in lines {
        let trimmed = line.trim();

        if trimmed.chars().count() < 2 {
            if current != SectionKind::Header {
                buffer.push(line.clone());
            }
            continue;
        }

        if let Some(kind) = match_header(trimmed) {
            map.flush(current, &mut buffer);
            current = kind;
            continue;
        }

        if current == SectionKind::Header {
            let classified = CONTENT_CLASSIFIERS
                .iter()
                .find(|(_, looks_like)| looks_like(trimmed))
                .map(|(kind, _)| *kind);
            if let Some(kind) = classified {
                map.flush(current, &mut buffer);
                current = kind;
            }
        }

        buffer.push(line.clone());
    }

    map.flush(current, &mut buffer);
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_header_patterns_english_and_indonesian() {
        assert_eq!(match_header("Work Experience"), Some(SectionKind::Experience));
        assert_eq!(match_header("PENGALAMAN"), Some(SectionKind::Experience));
        assert_eq!(match_header("Pendidikan"), Some(SectionKind::Education));
        assert_eq!(match_header("Technical Skills:"), Some(SectionKind::Skills));
        assert_eq!(match_header("Certificates"), Some(SectionKind::Certifications));
        assert_eq!(match_header("Bahasa"), Some(SectionKind::Languages));
        assert_eq!(match_header("Personal Projects"), Some(SectionKind::Projects));
        assert_eq!(match_header("Honors"), Some(SectionKind::Awards));
        assert_eq!(match_header("Profile"), Some(SectionKind::Summary));
    }

    #[test]
    fn test_header_requires_full_line() {
        assert_eq!(match_header("Experience with Rust"), None);
    }

    #[test]
    fn test_classifiers() {
        assert!(looks_like_experience("Senior Developer 2019 - 2022"));
        assert!(looks_like_experience("Maret 2020"));
        assert!(!looks_like_experience("John Doe"));
        assert!(looks_like_education("Bachelor of Arts"));
        assert!(looks_like_skills("Python and React"));
        assert!(!looks_like_skills("john@example.com"));
    }

    #[test]
    fn test_explicit_sections() {
        let map = identify_sections(&lines(&[
            "John Doe",
            "Experience",
            "Engineer - Acme - 2020",
            "Education",
            "BS - MIT - 2019",
        ]));
        assert_eq!(map.lines(SectionKind::Header), ["John Doe"]);
        assert_eq!(map.lines(SectionKind::Experience), ["Engineer - Acme - 2020"]);
        assert_eq!(map.lines(SectionKind::Education), ["BS - MIT - 2019"]);
        assert!(map.lines(SectionKind::Skills).is_empty());
    }

    #[test]
    fn test_duplicate_section_appends() {
        let map = identify_sections(&lines(&["Skills", "Rust", "Education", "BSc", "Skills", "Go"]));
        assert_eq!(map.lines(SectionKind::Skills), ["Rust", "Go"]);
    }

    #[test]
    fn test_content_classifier_opens_section_from_header() {
        let map = identify_sections(&lines(&[
            "Jane Roe",
            "Software Developer at Initech",
            "Built the TPS pipeline",
        ]));
        assert_eq!(map.lines(SectionKind::Header), ["Jane Roe"]);
        assert_eq!(
            map.lines(SectionKind::Experience),
            ["Software Developer at Initech", "Built the TPS pipeline"]
        );
    }

    #[test]
    fn test_content_classifier_ignored_outside_header() {
        let map = identify_sections(&lines(&["Summary", "Python developer who loves data"]));
        assert_eq!(
            map.lines(SectionKind::Summary),
            ["Python developer who loves data"]
        );
        assert!(map.lines(SectionKind::Experience).is_empty());
    }

    #[test]
    fn test_single_char_lines_dropped_in_header_only() {
        let map = identify_sections(&lines(&["•", "Jane Roe", "Projects", "•", "Folio site builder"]));
        assert_eq!(map.lines(SectionKind::Header), ["Jane Roe"]);
        assert_eq!(map.lines(SectionKind::Projects), ["•", "Folio site builder"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(identify_sections(&[]).len(), 0);
    }
}
