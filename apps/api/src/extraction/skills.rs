//! Skills section parser: tokenizes each line, then buckets tokens by category.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

const TECHNICAL: &[&str] = &[
    "javascript", "python", "java", "react", "angular", "vue", "node", "html", "css", "sql",
    "mongodb", "postgresql", "mysql", "php", "ruby", "c++", "c#", "swift", "kotlin", "flutter",
    "dart", "typescript", "go", "rust", "scala", "r", "matlab", "tensorflow", "pytorch", "docker",
    "kubernetes", "aws", "azure", "gcp", "git", "linux", "windows", "macos", "android", "ios",
    "web", "mobile", "frontend", "backend", "fullstack", "devops", "machine learning", "ai",
    "data science", "blockchain", "cybersecurity",
];

const SOFT: &[&str] = &[
    "leadership", "communication", "teamwork", "problem solving", "analytical", "creative",
    "adaptable", "organized", "time management", "project management", "critical thinking",
    "collaboration", "presentation", "negotiation", "customer service", "mentoring", "training",
];

const LANGUAGES: &[&str] = &[
    "english", "indonesian", "mandarin", "spanish", "french", "german", "japanese", "korean",
    "arabic", "portuguese", "russian", "italian", "dutch", "hindi", "thai", "vietnamese", "bahasa",
];

const TOOLS: &[&str] = &[
    "photoshop", "illustrator", "figma", "sketch", "canva", "office", "excel", "word",
    "powerpoint", "outlook", "slack", "trello", "jira", "confluence", "notion", "zoom", "teams",
    "salesforce", "hubspot", "mailchimp", "google analytics", "tableau", "power bi",
];

const STOPWORDS: &[&str] = &[
    "and", "or", "the", "a", "an", "in", "on", "at", "to", "for", "with", "by", "from", "of",
    "as", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "can", "must",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillCategory {
    Technical,
    Soft,
    Language,
    Tool,
    Other,
}

/// Word-list matcher. `+` and `#` count as word characters so `c++` and `c#` match whole.
fn dictionary(terms: &[&str]) -> Regex {
    let alternation = terms
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?i)(?:^|[^a-z0-9+#])(?:{alternation})(?:$|[^a-z0-9+#])"
    ))
    .expect("skill dictionary regex is valid")
}

/// Checked in order; the first hit decides the category.
static CATEGORIES: Lazy<Vec<(SkillCategory, Regex)>> = Lazy::new(|| {
    vec![
        (SkillCategory::Technical, dictionary(TECHNICAL)),
        (SkillCategory::Soft, dictionary(SOFT)),
        (SkillCategory::Language, dictionary(LANGUAGES)),
        (SkillCategory::Tool, dictionary(TOOLS)),
    ]
});

static BULLET_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[•·\-\*]|\d+[.)])").expect("bullet start regex is valid"));
static BULLET_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[•·\-\*\s]|\d+[.)])+").expect("bullet prefix regex is valid"));
static LABEL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:skills?|proficient in|experience with)\b[:\s]*")
        .expect("skill label regex is valid")
});
static BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[()\[\]"']"#).expect("bracket regex is valid"));
static NON_TOKEN_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9+#]").expect("token char regex is valid"));

/// Category for a cleaned token; `None` for stopwords that would land in `Other`.
pub fn classify(skill: &str) -> Option<SkillCategory> {
    if let Some((category, _)) = CATEGORIES.iter().find(|(_, re)| re.is_match(skill)) {
        return Some(*category);
    }
    let lower = skill.to_lowercase();
    if STOPWORDS.contains(&lower.as_str()) {
        None
    } else {
        Some(SkillCategory::Other)
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct SkillBuckets {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    pub languages: Vec<String>,
    pub tools: Vec<String>,
    pub other: Vec<String>,
}

impl SkillBuckets {
    fn bucket_mut(&mut self, category: SkillCategory) -> &mut Vec<String> {
        match category {
            SkillCategory::Technical => &mut self.technical,
            SkillCategory::Soft => &mut self.soft,
            SkillCategory::Language => &mut self.languages,
            SkillCategory::Tool => &mut self.tools,
            SkillCategory::Other => &mut self.other,
        }
    }

    /// Flattened in bucket order.
    pub fn into_skills(self) -> Vec<String> {
        let mut skills = self.technical;
        skills.extend(self.soft);
        skills.extend(self.languages);
        skills.extend(self.tools);
        skills.extend(self.other);
        skills
    }
}

fn split_tokens(line: &str, separators: &[char]) -> Vec<String> {
    line.split(separators)
        .map(str::trim)
        .filter(|token| token.chars().count() > 1)
        .map(String::from)
        .collect()
}

/// Token candidates for a single line, before cleaning.
fn tokenize(line: &str) -> Vec<String> {
    let line = line.trim();
    if BULLET_START.is_match(line) {
        let stripped = BULLET_PREFIX.replace(line, "");
        return split_tokens(stripped.trim(), &[',', ';', '|']);
    }
    if line.contains(',') || line.contains(';') {
        return split_tokens(line, &[',', ';']);
    }
    if line.contains('|') {
        return split_tokens(line, &['|']);
    }
    let len = line.chars().count();
    if len > 1 && len < 50 {
        return vec![line.to_string()];
    }

    line.split_whitespace()
        .map(|word| NON_TOKEN_CHARS.replace_all(word, "").to_lowercase())
        .filter(|word| word.chars().count() > 2)
        .filter(|word| {
            CATEGORIES
                .iter()
                .any(|(_, re)| re.is_match(word))
        })
        .collect()
}

fn clean_token(token: &str) -> Option<String> {
    let len = token.chars().count();
    if !(2..=50).contains(&len) {
        return None;
    }
    let token = LABEL_PREFIX.replace(token, "");
    let token = BRACKETS.replace_all(&token, "");
    let token = token.trim();
    if token.chars().count() < 2 {
        return None;
    }
    Some(token.to_string())
}

pub fn categorize_skills(lines: &[String]) -> SkillBuckets {
    let mut buckets = SkillBuckets::default();
    let mut seen: HashSet<String> = HashSet::new();

    for line in lines {
        for token in tokenize(line) {
            let Some(skill) = clean_token(&token) else {
                continue;
            };
            let Some(category) = classify(&skill) else {
                continue;
            };
            if seen.insert(skill.to_lowercase()) {
                buckets.bucket_mut(category).push(skill);
            }
        }
    }

    buckets
}

pub fn parse_skills(lines: &[String]) -> Vec<String> {
    categorize_skills(lines).into_skills()
}
