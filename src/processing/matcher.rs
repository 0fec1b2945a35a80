//! Stage 3: match candidate profiles against the job knowledge base

use crate::error::Result;
use crate::input::file_detector::FileType;
use crate::input::manager::InputManager;
use crate::llm::agent::{AgentRequest, AgentRole, LanguageModel};
use crate::llm::prompts::{MatchPromptParams, PromptTemplates};
use crate::llm::response::{null_as_default, parse_reply};
use crate::output::report::{CandidateMatch, MatchReport};
use crate::processing::knowledge::KnowledgeBase;
use crate::processing::profile::CandidateProfile;
use chrono::Utc;
use log::{info, warn};
use serde::Deserialize;
use std::path::Path;

/// The part of the report the agent writes. Entries are checked one by one
/// so a single malformed match does not discard the rest.
#[derive(Debug, Deserialize)]
struct MatchReply {
    #[serde(default, deserialize_with = "null_as_default")]
    matches: Vec<serde_json::Value>,
    #[serde(default)]
    summary: Option<String>,
}

pub struct JobMatcher<'a, M: LanguageModel> {
    model: &'a M,
    knowledge: &'a KnowledgeBase,
    templates: PromptTemplates,
}

impl<'a, M: LanguageModel> JobMatcher<'a, M> {
    pub fn new(model: &'a M, knowledge: &'a KnowledgeBase) -> Self {
        Self {
            model,
            knowledge,
            templates: PromptTemplates::default(),
        }
    }

    /// Load every profile in `profiles_dir`, sorted by file name
    pub async fn load_profiles(&self, profiles_dir: &Path) -> Result<Vec<CandidateProfile>> {
        let files = InputManager::new().list_files_of_type(profiles_dir, FileType::Json)?;
        let mut profiles = Vec::with_capacity(files.len());
        for file in &files {
            profiles.push(CandidateProfile::load(file).await?);
        }
        Ok(profiles)
    }

    pub async fn match_dir(&self, profiles_dir: &Path) -> Result<MatchReport> {
        let profiles = self.load_profiles(profiles_dir).await?;
        self.match_profiles(&profiles).await
    }

    /// One consolidated report for all candidates against all jobs
    pub async fn match_profiles(&self, profiles: &[CandidateProfile]) -> Result<MatchReport> {
        let mut report = MatchReport {
            generated_at: Utc::now(),
            model: self.model.model_name().to_string(),
            candidates_considered: profiles.len(),
            jobs_considered: self.knowledge.len(),
            matches: Vec::new(),
            summary: None,
        };

        if profiles.is_empty() {
            warn!("No candidate profiles to match; writing an empty report");
            return Ok(report);
        }

        let params = MatchPromptParams {
            candidates_json: serde_json::to_string_pretty(profiles)?,
            jobs_json: serde_json::to_string_pretty(self.knowledge.jobs())?,
        };
        let request = AgentRequest::new(AgentRole::JobMatcher, self.templates.render_job_matching(&params));

        info!(
            "Matching {} candidate(s) against {} job(s)",
            profiles.len(),
            self.knowledge.len()
        );
        let response = self.model.complete(&request).await?;
        let reply: MatchReply = parse_reply(&response.text)?;

        report.matches = self.fill_job_titles(parse_matches(reply.matches));
        report.summary = reply.summary.filter(|s| !s.trim().is_empty());
        Ok(report)
    }

    fn fill_job_titles(&self, matches: Vec<CandidateMatch>) -> Vec<CandidateMatch> {
        matches
            .into_iter()
            .map(|mut m| {
                match self.knowledge.get(&m.job_id) {
                    Some(job) if m.job_title.trim().is_empty() => m.job_title = job.title.clone(),
                    Some(_) => {}
                    None => warn!("Match for '{}' names unknown job id '{}'", m.candidate, m.job_id),
                }
                m
            })
            .collect()
    }
}

fn parse_matches(entries: Vec<serde_json::Value>) -> Vec<CandidateMatch> {
    let total = entries.len();
    let matches: Vec<CandidateMatch> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value::<CandidateMatch>(entry) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!("Skipping match entry {} of {}: {}", i + 1, total, e);
                None
            }
        })
        .collect();
    if matches.len() < total {
        warn!("Kept {} of {} match entries", matches.len(), total);
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::MatchScore;
    use serde_json::json;

    #[test]
    fn test_malformed_entries_are_skipped() {
        let matches = parse_matches(vec![
            json!({"candidate": "Alice", "job_id": "backend", "score": "85%", "justification": null}),
            json!({"candidate": "Bob", "job_id": "backend", "score": "stellar"}),
            json!({"job_id": "backend", "score": 40}),
            json!({"candidate": "Carol", "job_id": "data", "score": "85/100", "job_title": null}),
        ]);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].candidate, "Alice");
        assert_eq!(matches[0].score, MatchScore::Numeric(85.0));
        assert_eq!(matches[0].justification, "");
        assert_eq!(matches[1].candidate, "Carol");
    }

    #[test]
    fn test_null_matches_is_empty_reply() {
        let reply: MatchReply = parse_reply(r#"{"matches": null, "summary": "none fit"}"#).unwrap();
        assert!(parse_matches(reply.matches).is_empty());
        assert_eq!(reply.summary.as_deref(), Some("none fit"));
    }
}
