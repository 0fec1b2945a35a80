//! The language-model capability the pipeline's agents run on

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role-bound agents of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentRole {
    ProfileBuilder,
    JobMatcher,
}

impl AgentRole {
    pub fn title(&self) -> &'static str {
        match self {
            AgentRole::ProfileBuilder => "Candidate Profile Analyst",
            AgentRole::JobMatcher => "Talent Matching Specialist",
        }
    }

    pub fn goal(&self) -> &'static str {
        match self {
            AgentRole::ProfileBuilder => {
                "Turn raw resume text into an accurate, structured candidate profile \
                 without inventing facts that are not in the text."
            }
            AgentRole::JobMatcher => {
                "Compare candidate profiles against the open positions and rank how well \
                 each candidate fits each job, with a short evidence-based justification."
            }
        }
    }

    pub fn backstory(&self) -> &'static str {
        match self {
            AgentRole::ProfileBuilder => {
                "You are an experienced HR analyst who has screened thousands of resumes \
                 and knows how to read career histories, skills and seniority signals."
            }
            AgentRole::JobMatcher => {
                "You are a senior technical recruiter who matches people to roles based on \
                 skills, experience and seniority, and who explains every recommendation."
            }
        }
    }

    /// System message combining role, goal and backstory
    pub fn system_prompt(&self) -> String {
        format!(
            "Role: {}\nGoal: {}\n{}\nAlways answer with a single JSON object and nothing else.",
            self.title(),
            self.goal(),
            self.backstory()
        )
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One model invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    pub role: AgentRole,
    pub system: String,
    pub prompt: String,
    pub expect_json: bool,
}

impl AgentRequest {
    pub fn new(role: AgentRole, prompt: String) -> Self {
        Self {
            role,
            system: role.system_prompt(),
            prompt,
            expect_json: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub text: String,
    pub token_usage: Option<TokenUsage>,
}

impl AgentResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            token_usage: None,
        }
    }
}

/// A language model that answers agent requests.
///
/// Stages are generic over this trait so file handling can run against a
/// scripted model in tests.
pub trait LanguageModel: Send + Sync {
    fn complete(
        &self,
        request: &AgentRequest,
    ) -> impl std::future::Future<Output = Result<AgentResponse>> + Send;

    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_carries_role_and_goal() {
        let request = AgentRequest::new(AgentRole::JobMatcher, "rank them".to_string());
        assert!(request.system.contains("Talent Matching Specialist"));
        assert!(request.system.contains("Goal:"));
        assert!(request.expect_json);
        assert_eq!(request.prompt, "rank them");
    }
}
