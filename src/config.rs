//! Configuration management for the CV pipeline

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub agent: AgentConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

/// Stage directories. Relative paths resolve against the working directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    pub cv_dir: PathBuf,
    pub preprocessed_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub results_dir: PathBuf,
    pub knowledge_dir: PathBuf,
    /// Also load job descriptions from subdirectories of `knowledge_dir`
    pub knowledge_recursive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Resume text longer than this many graphemes is truncated before prompting
    pub max_input_chars: usize,
    /// Accept .txt and .md resumes in the CV directory alongside PDFs
    pub accept_text_resumes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
    pub show_progress: bool,
    /// File stem of the consolidated report in the results directory
    pub report_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cv_dir: PathBuf::from("CV"),
            preprocessed_dir: PathBuf::from("preprocessed-CVs"),
            processed_dir: PathBuf::from("processed-CVs"),
            results_dir: PathBuf::from("job-matches-results"),
            knowledge_dir: PathBuf::from("knowledge"),
            knowledge_recursive: false,
        }
    }
}

impl PathsConfig {
    /// Resolve every relative stage directory against `root`
    pub fn rooted_at(&self, root: &Path) -> Self {
        let join = |p: &PathBuf| if p.is_absolute() { p.clone() } else { root.join(p) };
        Self {
            cv_dir: join(&self.cv_dir),
            preprocessed_dir: join(&self.preprocessed_dir),
            processed_dir: join(&self.processed_dir),
            results_dir: join(&self.results_dir),
            knowledge_dir: join(&self.knowledge_dir),
            knowledge_recursive: self.knowledge_recursive,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.2,
            max_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            agent: AgentConfig::default(),
            processing: ProcessingConfig {
                max_input_chars: 12_000,
                accept_text_resumes: true,
            },
            output: OutputConfig {
                format: OutputFormat::Markdown,
                detailed: false,
                color_output: true,
                show_progress: true,
                report_name: "match_report".to_string(),
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults there on first use
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| PipelineError::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-pipeline")
            .join("config.toml")
    }

    /// Read the model API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.agent.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(PipelineError::Configuration(format!(
                "{} is not set; export it or add it to .env",
                self.agent.api_key_env
            ))),
        }
    }
}
