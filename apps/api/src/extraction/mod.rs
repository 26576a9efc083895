//! Resume extraction: the local heuristic pipeline plus the remote model fallback.
//!
//! Pipeline order: preprocess → lines → contact/links → sections → section
//! parsers → cleaner. Every stage is total; local extraction never fails.

pub mod cleaner;
pub mod contact;
pub mod entries;
pub mod handlers;
pub mod lists;
pub mod patterns;
pub mod pdf;
pub mod preprocess;
pub mod prompts;
pub mod remote;
pub mod sections;
pub mod service;
pub mod skills;

use tracing::debug;

use crate::extraction::sections::SectionKind;
use crate::models::resume::{ResumeRecord, UNKNOWN_NAME};

/// Runs the local pipeline over raw resume text.
pub fn extract_basic_resume_data(text: &str) -> ResumeRecord {
    let normalized = preprocess::preprocess_text(text);
    let lines = preprocess::to_lines(&normalized);

    let mut record = ResumeRecord::default();
    contact::extract_contact_info(&lines, &mut record);
    contact::extract_links(&lines, &mut record);

    let sections = sections::identify_sections(&lines);
    debug!(lines = lines.len(), sections = sections.len(), "segmented resume text");

    record.experience = entries::parse_experience(sections.lines(SectionKind::Experience));
    record.education = entries::parse_education(sections.lines(SectionKind::Education));
    record.skills = skills::parse_skills(sections.lines(SectionKind::Skills));
    record.summary = lists::parse_summary(sections.lines(SectionKind::Summary));
    record.certifications = lists::parse_certifications(sections.lines(SectionKind::Certifications));
    record.languages = lists::parse_languages(sections.lines(SectionKind::Languages));
    record.projects = lists::parse_projects(sections.lines(SectionKind::Projects));
    record.awards = lists::parse_awards(sections.lines(SectionKind::Awards));

    let record = cleaner::clean_record(record);
    debug!(
        experience = record.experience.len(),
        education = record.education.len(),
        skills = record.skills.len(),
        links = record.links.len(),
        "local extraction finished"
    );
    record
}

/// Weighted presence score in `[0, 1]` for a cleaned record.
pub fn compute_confidence(record: &ResumeRecord) -> f64 {
    let weights = [
        (!record.name.is_empty() && record.name != UNKNOWN_NAME, 0.25),
        (record.email.is_some(), 0.15),
        (record.phone.is_some(), 0.10),
        (!record.experience.is_empty(), 0.25),
        (!record.education.is_empty(), 0.15),
        (!record.skills.is_empty(), 0.10),
    ];
    let score: f64 = weights
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, weight)| weight)
        .sum();
    (score * 100.0).round() / 100.0
}
