//! Candidate profiles and the stage that builds them from extracted text

use crate::error::{PipelineError, Result};
use crate::input::file_detector::FileType;
use crate::input::manager::InputManager;
use crate::llm::agent::{AgentRequest, AgentRole, LanguageModel};
use crate::llm::prompts::{truncate_graphemes, ProfilePromptParams, PromptTemplates};
use crate::llm::response::{null_as_default, parse_reply};
use crate::output::progress_bar;
use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Structured view of one resume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub contact: ContactInfo,
    pub summary: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: BTreeSet<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub certifications: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(deserialize_with = "lenient_years")]
    pub years_experience: Option<f32>,
    pub seniority: SeniorityLevel,
    /// Extracted-text file this profile was built from
    #[serde(deserialize_with = "null_as_default")]
    pub source_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub employer: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub institution: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeniorityLevel {
    Intern,
    Junior,
    Mid,
    Senior,
    Lead,
    Principal,
    #[default]
    Unknown,
}

impl SeniorityLevel {
    pub fn parse(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "intern" | "internship" | "trainee" | "student" => SeniorityLevel::Intern,
            "junior" | "entry" | "entry-level" | "entry level" | "graduate" => SeniorityLevel::Junior,
            "mid" | "mid-level" | "mid level" | "intermediate" | "medior" => SeniorityLevel::Mid,
            "senior" | "sr" | "experienced" => SeniorityLevel::Senior,
            "lead" | "staff" | "manager" | "team lead" | "tech lead" => SeniorityLevel::Lead,
            "principal" | "director" | "head" | "executive" | "architect" => SeniorityLevel::Principal,
            _ => SeniorityLevel::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for SeniorityLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.as_deref().map(SeniorityLevel::parse).unwrap_or_default())
    }
}

impl fmt::Display for SeniorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SeniorityLevel::Intern => "Intern",
            SeniorityLevel::Junior => "Junior",
            SeniorityLevel::Mid => "Mid-level",
            SeniorityLevel::Senior => "Senior",
            SeniorityLevel::Lead => "Lead",
            SeniorityLevel::Principal => "Principal",
            SeniorityLevel::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Models sometimes answer `2019` where a string is expected
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts `5`, `5.5` or `"5+"`
fn lenient_years<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<f32>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().map(|n| n as f32),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .trim_end_matches(|c: char| !c.is_ascii_digit())
            .parse()
            .ok(),
        _ => None,
    })
}

impl CandidateProfile {
    /// Read a profile previously written by [`ProfileBuilder`]
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| {
            PipelineError::InvalidInput(format!("Invalid candidate profile '{}': {}", path.display(), e))
        })
    }

    /// Fill what the model left out from what the pipeline knows
    fn complete(mut self, source: &Path) -> Self {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.name.trim().is_empty() {
            self.name = stem;
        }
        self.source_file = source
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.skills = self
            .skills
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }
}

/// Stage 2: extracted text to candidate profile JSON
pub struct ProfileBuilder<'a, M: LanguageModel> {
    model: &'a M,
    templates: PromptTemplates,
    inputs: InputManager,
    max_input_chars: usize,
    show_progress: bool,
}

impl<'a, M: LanguageModel> ProfileBuilder<'a, M> {
    pub fn new(model: &'a M, max_input_chars: usize) -> Self {
        Self {
            model,
            templates: PromptTemplates::default(),
            inputs: InputManager::new(),
            max_input_chars,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Build a profile for every `.txt` in `input_dir`, writing
    /// `<output_dir>/<stem>.json` for each. Returns the written paths.
    pub async fn build_all(&self, input_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let inputs = self.inputs.list_files_of_type(input_dir, FileType::Text)?;
        fs::create_dir_all(output_dir).await?;

        let bar = progress_bar(inputs.len(), "Building profiles", self.show_progress);
        let mut written = Vec::with_capacity(inputs.len());
        for path in &inputs {
            bar.set_message(display_name(path));
            if let Some(output) = self.build_one(path, output_dir).await? {
                written.push(output);
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        info!("Wrote {} candidate profile(s) to {}", written.len(), output_dir.display());
        Ok(written)
    }

    /// Returns `None` when the text file is empty
    pub async fn build_one(&self, text_path: &Path, output_dir: &Path) -> Result<Option<PathBuf>> {
        let text = fs::read_to_string(text_path).await?;
        if text.trim().is_empty() {
            warn!("Skipping empty text file {}", text_path.display());
            return Ok(None);
        }

        let profile = self.structure_text(text_path, &text).await?;

        let output_path = output_dir.join(format!(
            "{}.json",
            text_path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default()
        ));
        fs::write(&output_path, serde_json::to_string_pretty(&profile)?).await?;
        info!("{} -> {}", text_path.display(), output_path.display());
        Ok(Some(output_path))
    }

    /// Ask the model to structure `text` into a profile
    pub async fn structure_text(&self, source: &Path, text: &str) -> Result<CandidateProfile> {
        let params = ProfilePromptParams {
            source_file: display_name(source),
            resume_text: truncate_graphemes(text.trim(), self.max_input_chars).to_string(),
        };
        let request = AgentRequest::new(
            AgentRole::ProfileBuilder,
            self.templates.render_candidate_profile(&params),
        );

        let response = self.model.complete(&request).await?;
        let profile: CandidateProfile = parse_reply(&response.text).map_err(|e| match e {
            PipelineError::AgentOutput(detail) => {
                PipelineError::AgentOutput(format!("{}: {}", source.display(), detail))
            }
            other => other,
        })?;
        Ok(profile.complete(source))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
