use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name used when no plausible name line survives cleaning.
pub const UNKNOWN_NAME: &str = "Unknown Name";

/// Canonical structured output of one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<String>,
    pub certifications: Vec<ListEntry>,
    pub languages: Vec<ListEntry>,
    pub projects: Vec<ListEntry>,
    pub awards: Vec<ListEntry>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "type")]
    pub link_type: String,
    pub url: String,
}

/// An item of a loosely-typed list section (certifications, languages, projects, awards).
///
/// The local parser only produces `Text`; the remote model may return objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListEntry {
    Text(String),
    Record(Map<String, Value>),
}

/// Keys tried, in order, when a structured list item needs a display label.
const LABEL_KEYS: &[&str] = &["name", "title", "language", "label"];

impl ListEntry {
    /// The human-readable label used for length checks and deduplication.
    pub fn label(&self) -> String {
        match self {
            ListEntry::Text(text) => text.clone(),
            ListEntry::Record(map) => LABEL_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
        }
    }

    fn record_str(&self, key: &str) -> String {
        match self {
            ListEntry::Text(_) => String::new(),
            ListEntry::Record(map) => map
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl From<&str> for ListEntry {
    fn from(text: &str) -> Self {
        ListEntry::Text(text.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Editor document
// ────────────────────────────────────────────────────────────────────────────

/// The richer shape the resume editor consumes. Fields the extractor cannot
/// know (dates, proficiency, issuers) are left empty for the user to fill in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub summary: String,
    pub experience: Vec<DocumentExperience>,
    pub education: Vec<DocumentEducation>,
    pub skills: Vec<String>,
    pub certifications: Vec<DocumentCertification>,
    pub languages: Vec<DocumentLanguage>,
    pub projects: Vec<DocumentProject>,
    pub awards: Vec<DocumentAward>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentExperience {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub is_current: bool,
    pub location: String,
    pub contract_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEducation {
    pub degree: String,
    pub institution: String,
    pub year: String,
    pub start_date: String,
    pub end_date: String,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentCertification {
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLanguage {
    pub language: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentProject {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentAward {
    pub title: String,
    pub organization: String,
    pub date: String,
    pub description: String,
}

impl From<&ResumeRecord> for ResumeDocument {
    fn from(record: &ResumeRecord) -> Self {
        let name = if record.name.is_empty() {
            "Unknown".to_string()
        } else {
            record.name.clone()
        };

        ResumeDocument {
            name,
            email: record.email.clone().unwrap_or_default(),
            phone: record.phone.clone().unwrap_or_default(),
            location: record.location.clone().unwrap_or_default(),
            summary: record.summary.clone().unwrap_or_default(),
            experience: record
                .experience
                .iter()
                .map(|exp| DocumentExperience {
                    title: exp.title.clone(),
                    company: exp.company.clone(),
                    duration: exp.duration.clone(),
                    description: exp.description.clone(),
                    start_date: String::new(),
                    end_date: String::new(),
                    is_current: false,
                    location: String::new(),
                    contract_type: String::new(),
                })
                .collect(),
            education: record
                .education
                .iter()
                .map(|edu| DocumentEducation {
                    degree: edu.degree.clone(),
                    institution: edu.institution.clone(),
                    year: edu.year.clone(),
                    start_date: String::new(),
                    end_date: String::new(),
                    is_current: false,
                })
                .collect(),
            skills: record.skills.clone(),
            certifications: record
                .certifications
                .iter()
                .map(|cert| DocumentCertification {
                    name: cert.label(),
                    issuer: cert.record_str("issuer"),
                    date: cert.record_str("date"),
                    description: cert.record_str("description"),
                })
                .collect(),
            languages: record
                .languages
                .iter()
                .map(|lang| DocumentLanguage {
                    language: lang.label(),
                    proficiency: lang.record_str("proficiency"),
                })
                .collect(),
            projects: record
                .projects
                .iter()
                .map(|project| DocumentProject {
                    name: project.label(),
                    description: project.record_str("description"),
                    technologies: match project {
                        ListEntry::Record(map) => map
                            .get("technologies")
                            .and_then(|v| v.as_array())
                            .map(|arr| {
                                arr.iter()
                                    .filter_map(|t| t.as_str().map(String::from))
                                    .collect()
                            })
                            .unwrap_or_default(),
                        ListEntry::Text(_) => Vec::new(),
                    },
                })
                .collect(),
            awards: record
                .awards
                .iter()
                .map(|award| DocumentAward {
                    title: award.label(),
                    organization: award.record_str("organization"),
                    date: award.record_str("date"),
                    description: award.record_str("description"),
                })
                .collect(),
            links: record.links.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_entry_deserializes_string_and_object() {
        let entries: Vec<ListEntry> =
            serde_json::from_value(json!(["AWS Certified", {"name": "CKA", "issuer": "CNCF"}]))
                .unwrap();
        assert_eq!(entries[0], ListEntry::Text("AWS Certified".to_string()));
        assert_eq!(entries[1].label(), "CKA");
    }

    #[test]
    fn test_record_label_falls_back_to_json() {
        let entry: ListEntry = serde_json::from_value(json!({"issuer": "CNCF"})).unwrap();
        assert!(entry.label().contains("CNCF"));
    }

    #[test]
    fn test_record_omits_empty_optional_fields() {
        let record = ResumeRecord {
            name: "Jane Roe".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("email").is_none());
        assert_eq!(value["skills"], json!([]));
    }

    #[test]
    fn test_link_serializes_type_key() {
        let link = Link {
            link_type: "github".to_string(),
            url: "https://github.com/jane".to_string(),
        };
        assert_eq!(serde_json::to_value(&link).unwrap()["type"], "github");
    }

    #[test]
    fn test_document_fills_editor_defaults() {
        let record = ResumeRecord {
            name: "Jane Roe".to_string(),
            email: Some("jane@example.com".to_string()),
            experience: vec![ExperienceEntry {
                title: "Engineer".to_string(),
                company: "Acme".to_string(),
                duration: "2020-2023".to_string(),
                description: String::new(),
            }],
            certifications: vec![ListEntry::from("AWS Certified")],
            projects: vec![serde_json::from_value(json!({
                "name": "Folio",
                "description": "Site builder",
                "technologies": ["Rust", "Svelte"]
            }))
            .unwrap()],
            ..Default::default()
        };

        let doc = ResumeDocument::from(&record);
        assert_eq!(doc.phone, "");
        assert_eq!(doc.experience[0].contract_type, "");
        assert!(!doc.experience[0].is_current);
        assert_eq!(doc.certifications[0].name, "AWS Certified");
        assert_eq!(doc.projects[0].technologies, vec!["Rust", "Svelte"]);

        let value = serde_json::to_value(&doc).unwrap();
        assert!(value["experience"][0].get("startDate").is_some());
    }

    #[test]
    fn test_document_empty_name_becomes_unknown() {
        let doc = ResumeDocument::from(&ResumeRecord::default());
        assert_eq!(doc.name, "Unknown");
    }
}
