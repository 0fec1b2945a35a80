//! Error handling for the CV pipeline

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Profile,
    Match,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extract => write!(f, "Text extraction"),
            Stage::Profile => write!(f, "Candidate profile"),
            Stage::Match => write!(f, "Job matching"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Text processing error: {0}")]
    TextProcessing(String),

    #[error("LLM inference error: {0}")]
    LlmInference(String),

    #[error("Agent returned unusable output: {0}")]
    AgentOutput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Knowledge error: {0}")]
    Knowledge(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        source: Box<PipelineError>,
    },

    #[error("An error occurred while running the pipeline: {0}")]
    RunFailed(Box<PipelineError>),
}

impl PipelineError {
    /// Attach the failing stage to an error
    pub fn in_stage(self, stage: Stage) -> Self {
        PipelineError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage an error was raised in, if it was raised inside one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            PipelineError::RunFailed(inner) => inner.stage(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::TextProcessing(err.to_string())
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PipelineError::Network(format!("request timed out: {}", err))
        } else if err.is_decode() {
            PipelineError::LlmInference(format!("failed to decode response: {}", err))
        } else {
            PipelineError::Network(err.to_string())
        }
    }
}
