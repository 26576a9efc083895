// Remote extraction prompt templates.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

pub const RESUME_EXTRACTION_PROMPT: &str = r#"You are a professional resume parser. Extract structured data from the following resume and return it as valid JSON.

Please extract the following information and format it as a JSON object:
{
  "name": "Full name",
  "email": "Email address (if found)",
  "phone": "Phone number (if found)",
  "location": "Location/City (if found)",
  "summary": "Professional summary or objective",
  "experience": [
    {
      "title": "Job title",
      "company": "Company name",
      "duration": "Duration (e.g., 2020-2023)",
      "description": "Job description and achievements"
    }
  ],
  "education": [
    {
      "degree": "Degree name",
      "institution": "Institution name",
      "year": "Graduation year"
    }
  ],
  "skills": ["skill1", "skill2", "skill3"],
  "certifications": ["Certification name"],
  "languages": ["Language"],
  "projects": ["Project name and one-line description"],
  "awards": ["Award name"],
  "links": [
    {
      "type": "LinkedIn/GitHub/Portfolio",
      "url": "URL"
    }
  ]
}

Resume text:
{resume_text}

{json_only}"#;

pub fn build_extraction_prompt(resume_text: &str) -> String {
    RESUME_EXTRACTION_PROMPT
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{resume_text}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_text_and_instruction() {
        let prompt = build_extraction_prompt("Jane Roe\nRust engineer");
        assert!(prompt.contains("Resume text:\nJane Roe\nRust engineer"));
        assert!(prompt.ends_with(JSON_ONLY_INSTRUCTION));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_placeholder_like_text_is_not_expanded() {
        let prompt = build_extraction_prompt("literal {json_only} here");
        assert!(prompt.contains("literal {json_only} here"));
    }
}
