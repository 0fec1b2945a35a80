//! Job descriptions loaded from the knowledge directory

use crate::error::{PipelineError, Result};
use crate::input::file_detector::FileType;
use crate::input::manager::InputManager;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDescription {
    pub id: String,
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub min_years_experience: Option<f32>,
    pub seniority: Option<String>,
    /// Fields this crate does not interpret, passed through to the matcher
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KnowledgeFile {
    Many(Vec<JobDescription>),
    One(JobDescription),
}

/// Every job description known to the matcher
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    jobs: Vec<JobDescription>,
    sources: Vec<PathBuf>,
}

impl KnowledgeBase {
    /// Load all `.json` files in `dir`, descending into subdirectories when
    /// `recursive` is set. A file may hold one job or an array of jobs.
    pub fn load(dir: &Path, recursive: bool) -> Result<Self> {
        let files = InputManager::new()
            .list_files(dir, recursive, |t| t == FileType::Json)
            .map_err(|e| match e {
                PipelineError::MissingDirectory(path) => PipelineError::Knowledge(format!(
                    "knowledge directory {} does not exist",
                    path.display()
                )),
                other => other,
            })?;

        let mut base = KnowledgeBase::default();
        for file in &files {
            base.add_file(file)?;
        }

        if base.jobs.is_empty() {
            return Err(PipelineError::Knowledge(format!(
                "no job descriptions found in {}",
                dir.display()
            )));
        }

        info!(
            "Loaded {} job description(s) from {} file(s) in {}",
            base.jobs.len(),
            base.sources.len(),
            dir.display()
        );
        Ok(base)
    }

    fn add_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let parsed: KnowledgeFile = serde_json::from_str(&content).map_err(|e| {
            PipelineError::Knowledge(format!("invalid job description file {}: {}", path.display(), e))
        })?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let jobs = match parsed {
            KnowledgeFile::One(job) => vec![(stem, job)],
            KnowledgeFile::Many(jobs) => jobs
                .into_iter()
                .enumerate()
                .map(|(i, job)| (format!("{}-{}", stem, i + 1), job))
                .collect(),
        };

        for (fallback_id, job) in jobs {
            self.push(fallback_id, job)?;
        }
        self.sources.push(path.to_path_buf());
        debug!("Read job descriptions from {}", path.display());
        Ok(())
    }

    fn push(&mut self, fallback_id: String, mut job: JobDescription) -> Result<()> {
        if job.id.trim().is_empty() {
            job.id = fallback_id;
        }
        if job.title.trim().is_empty() {
            job.title = job.id.clone();
        }
        if self.jobs.iter().any(|existing| existing.id == job.id) {
            return Err(PipelineError::Knowledge(format!("duplicate job id '{}'", job.id)));
        }
        self.jobs.push(job);
        Ok(())
    }

    pub fn from_jobs(jobs: Vec<JobDescription>) -> Self {
        Self { jobs, sources: Vec::new() }
    }

    pub fn jobs(&self) -> &[JobDescription] {
        &self.jobs
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&JobDescription> {
        self.jobs.iter().find(|job| job.id == id)
    }
}
