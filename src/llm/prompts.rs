//! Prompt templates for the profile and matching agents

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub candidate_profile: String,
    pub job_matching: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            candidate_profile: CANDIDATE_PROFILE_TEMPLATE.to_string(),
            job_matching: JOB_MATCHING_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePromptParams {
    pub source_file: String,
    pub resume_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPromptParams {
    /// Candidate profiles as a JSON array
    pub candidates_json: String,
    /// Job descriptions as a JSON array
    pub jobs_json: String,
}

impl PromptTemplates {
    pub fn render_candidate_profile(&self, params: &ProfilePromptParams) -> String {
        self.candidate_profile
            .replace("{source_file}", &params.source_file)
            .replace("{resume}", &params.resume_text)
    }

    pub fn render_job_matching(&self, params: &MatchPromptParams) -> String {
        self.job_matching
            .replace("{candidates}", &params.candidates_json)
            .replace("{jobs}", &params.jobs_json)
    }
}

/// Cut `text` to at most `max_graphemes` user-perceived characters
pub fn truncate_graphemes(text: &str, max_graphemes: usize) -> &str {
    match text.grapheme_indices(true).nth(max_graphemes) {
        Some((byte_offset, _)) => &text[..byte_offset],
        None => text,
    }
}

const CANDIDATE_PROFILE_TEMPLATE: &str = r#"TASK: Convert the resume text below into a structured candidate profile.

<RESUME source="{source_file}">
{resume}
</RESUME>

Return one JSON object with exactly these fields:
{
  "name": string,
  "contact": {"email": string|null, "phone": string|null, "location": string|null, "links": [string]},
  "summary": string|null,
  "skills": [string],
  "experience": [{"employer": string, "title": string, "duration": string|null, "description": string|null}],
  "education": [{"institution": string, "degree": string|null, "field": string|null, "year": string|null}],
  "certifications": [string],
  "languages": [string],
  "years_experience": number|null,
  "seniority": "intern"|"junior"|"mid"|"senior"|"lead"|"principal"|"unknown"
}

RULES:
- List experience most recent first.
- Use null or [] for anything the resume does not state. Do not invent facts.
- Infer seniority from titles and years of experience."#;

const JOB_MATCHING_TEMPLATE: &str = r#"TASK: Match every candidate against every open position and rank the fits.

<CANDIDATES>
{candidates}
</CANDIDATES>

<JOBS>
{jobs}
</JOBS>

Return one JSON object:
{
  "matches": [
    {
      "candidate": string,
      "job_id": string,
      "job_title": string,
      "score": number from 0 to 100,
      "rank": integer,
      "justification": string
    }
  ],
  "summary": string
}

RULES:
- Use the candidate "name" and the job "id" exactly as given.
- Rank 1 is the best fit for that job.
- Keep each justification to one or two sentences grounded in the profile."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_profile_rendering() {
        let templates = PromptTemplates::default();
        let params = ProfilePromptParams {
            source_file: "alice.txt".to_string(),
            resume_text: "Alice Smith, 5 years Python".to_string(),
        };

        let prompt = templates.render_candidate_profile(&params);
        assert!(prompt.contains("Alice Smith, 5 years Python"));
        assert!(prompt.contains(r#"<RESUME source="alice.txt">"#));
        assert!(prompt.contains("\"seniority\""));
        assert!(!prompt.contains("{resume}"));
    }

    #[test]
    fn test_job_matching_rendering() {
        let templates = PromptTemplates::default();
        let params = MatchPromptParams {
            candidates_json: r#"[{"name":"Alice"}]"#.to_string(),
            jobs_json: r#"[{"id":"backend"}]"#.to_string(),
        };

        let prompt = templates.render_job_matching(&params);
        assert!(prompt.contains(r#"[{"name":"Alice"}]"#));
        assert!(prompt.contains(r#"[{"id":"backend"}]"#));
        assert!(prompt.contains("<CANDIDATES>"));
        assert!(prompt.contains("</JOBS>"));
    }

    #[test]
    fn test_truncate_graphemes() {
        assert_eq!(truncate_graphemes("héllo wörld", 5), "héllo");
        assert_eq!(truncate_graphemes("short", 50), "short");
        assert_eq!(truncate_graphemes("", 3), "");
    }
}
