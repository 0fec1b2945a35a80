//! Pipeline runner: extract, profile, match, in that order

use crate::config::{Config, OutputFormat, PathsConfig};
use crate::error::{PipelineError, Result, Stage};
use crate::input::file_detector::FileType;
use crate::input::manager::InputManager;
use crate::input::pdf_reader::{text_output_path, PdfReaderTool};
use crate::llm::agent::LanguageModel;
use crate::output::formatter::{save_report_to_file, ReportGenerator};
use crate::output::progress_bar;
use crate::output::report::{ExtractionOutcome, MatchReport, RunSummary};
use crate::processing::knowledge::KnowledgeBase;
use crate::processing::matcher::JobMatcher;
use crate::processing::profile::ProfileBuilder;
use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;

pub struct Pipeline<M: LanguageModel> {
    model: M,
    config: Config,
    knowledge: KnowledgeBase,
    tool: PdfReaderTool,
    inputs: InputManager,
}

impl<M: LanguageModel> Pipeline<M> {
    /// Set up a run. Job descriptions are loaded here, before any stage runs.
    pub fn new(model: M, config: Config) -> Result<Self> {
        let knowledge = KnowledgeBase::load(
            &config.paths.knowledge_dir,
            config.paths.knowledge_recursive,
        )?;

        Ok(Self {
            model,
            config,
            knowledge,
            tool: PdfReaderTool::new(),
            inputs: InputManager::new(),
        })
    }

    pub fn paths(&self) -> &PathsConfig {
        &self.config.paths
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Run every stage. The first stage error aborts the run.
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_stages()
            .await
            .map_err(|e| PipelineError::RunFailed(Box::new(e)))
    }

    async fn run_stages(&self) -> Result<RunSummary> {
        let start = Instant::now();
        let paths = &self.config.paths;

        println!("📄 Stage 1: {} -> {}", paths.cv_dir.display(), paths.preprocessed_dir.display());
        let extractions = self
            .extract_stage()
            .await
            .map_err(|e| e.in_stage(Stage::Extract))?;

        println!("🧠 Stage 2: {} -> {}", paths.preprocessed_dir.display(), paths.processed_dir.display());
        let profiles = self
            .profile_stage()
            .await
            .map_err(|e| e.in_stage(Stage::Profile))?;

        println!("💼 Stage 3: {} + {} -> {}",
            paths.processed_dir.display(),
            paths.knowledge_dir.display(),
            paths.results_dir.display()
        );
        let (report, report_path, rendered_report_path) = self
            .match_stage()
            .await
            .map_err(|e| e.in_stage(Stage::Match))?;

        Ok(RunSummary {
            extractions,
            profiles,
            report_path,
            rendered_report_path,
            report,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Stage 1. Per-file tool failures are recorded, not raised.
    pub async fn extract_stage(&self) -> Result<Vec<ExtractionOutcome>> {
        let paths = &self.config.paths;
        let accept_text = self.config.processing.accept_text_resumes;
        let sources = self.inputs.list_files(&paths.cv_dir, false, |t| match t {
            FileType::Pdf => true,
            FileType::Text | FileType::Markdown => accept_text,
            _ => false,
        })?;
        fs::create_dir_all(&paths.preprocessed_dir).await?;

        if sources.is_empty() {
            warn!("No resumes found in {}", paths.cv_dir.display());
        }

        let bar = progress_bar(sources.len(), "Extracting text", self.config.output.show_progress);
        let mut outcomes = Vec::with_capacity(sources.len());
        // Text file -> resume that wrote it; `alice.pdf` and `alice.txt` share a target
        let mut written: HashMap<PathBuf, PathBuf> = HashMap::new();
        for source in sources {
            bar.set_message(source.display().to_string());
            let target = text_output_path(&source, &paths.preprocessed_dir);
            let outcome = match written.get(&target) {
                Some(first) => ExtractionOutcome {
                    source: source.clone(),
                    output: None,
                    message: format!(
                        "Error: {} would overwrite {}, already extracted from {}",
                        source.display(),
                        target.display(),
                        first.display()
                    ),
                },
                None => match FileType::from_path(&source) {
                    FileType::Pdf => self.extract_pdf(&source, &paths.preprocessed_dir).await,
                    _ => self.normalize_text_resume(&source, &paths.preprocessed_dir).await?,
                },
            };
            if let Some(output) = &outcome.output {
                written.insert(output.clone(), source.clone());
            }
            if !outcome.succeeded() {
                warn!("{}: {}", source.display(), outcome.message);
            }
            outcomes.push(outcome);
            bar.inc(1);
        }
        bar.finish_and_clear();

        let succeeded = outcomes.iter().filter(|o| o.succeeded()).count();
        info!("Extracted {}/{} resume(s)", succeeded, outcomes.len());
        Ok(outcomes)
    }

    async fn extract_pdf(&self, source: &Path, output_dir: &Path) -> ExtractionOutcome {
        match self.tool.extract(source, Some(output_dir)).await {
            Ok(extraction) => ExtractionOutcome {
                source: source.to_path_buf(),
                message: extraction.message(),
                output: extraction.output_path,
            },
            Err(e) => ExtractionOutcome {
                source: source.to_path_buf(),
                output: None,
                message: e.to_string(),
            },
        }
    }

    /// Plain-text and Markdown resumes skip the PDF tool
    async fn normalize_text_resume(&self, source: &Path, output_dir: &Path) -> Result<ExtractionOutcome> {
        let text = self.inputs.extract_text(source).await?;
        if text.trim().is_empty() {
            return Ok(ExtractionOutcome {
                source: source.to_path_buf(),
                output: None,
                message: format!("Error: No text found in {}", source.display()),
            });
        }

        let output_path = text_output_path(source, output_dir);
        fs::write(&output_path, text.trim()).await?;
        Ok(ExtractionOutcome {
            source: source.to_path_buf(),
            message: format!("Text extracted and saved to {}", output_path.display()),
            output: Some(output_path),
        })
    }

    /// Stage 2
    pub async fn profile_stage(&self) -> Result<Vec<PathBuf>> {
        let paths = &self.config.paths;
        ProfileBuilder::new(&self.model, self.config.processing.max_input_chars)
            .with_progress(self.config.output.show_progress)
            .build_all(&paths.preprocessed_dir, &paths.processed_dir)
            .await
    }

    /// Stage 3: returns the report, its JSON path and its rendered path
    pub async fn match_stage(&self) -> Result<(MatchReport, PathBuf, Option<PathBuf>)> {
        let paths = &self.config.paths;
        let report = JobMatcher::new(&self.model, &self.knowledge)
            .match_dir(&paths.processed_dir)
            .await?;

        let (json_path, rendered_path) = self.write_report(&report)?;
        Ok((report, json_path, rendered_path))
    }

    fn write_report(&self, report: &MatchReport) -> Result<(PathBuf, Option<PathBuf>)> {
        let output = &self.config.output;
        let results_dir = &self.config.paths.results_dir;
        let generator = ReportGenerator::with_options(false, true, true);

        let json_path = results_dir.join(format!("{}.json", output.report_name));
        save_report_to_file(&generator.generate_report(report, &OutputFormat::Json)?, &json_path)?;
        info!("Match report written to {}", json_path.display());

        let rendered_path = match output.format {
            OutputFormat::Json => None,
            format => {
                let extension = match format {
                    OutputFormat::Markdown => "md",
                    OutputFormat::Html => "html",
                    _ => "txt",
                };
                let path = results_dir.join(format!("{}.{}", output.report_name, extension));
                save_report_to_file(&generator.generate_report(report, &format)?, &path)?;
                Some(path)
            }
        };

        Ok((json_path, rendered_path))
    }
}
