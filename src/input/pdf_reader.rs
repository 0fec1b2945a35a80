//! PDF reader tool: PDF in, plain text out.
//!
//! Two faces over the same extraction. [`PdfReaderTool::extract`] returns a
//! typed result for Rust callers; [`PdfReaderTool::run`] returns the
//! human-readable message an agent reasons about, where failures are text
//! rather than errors.

use crate::input::text_extractor::PdfExtractor;
use crate::error::PipelineError;
use log::{debug, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

pub const TOOL_NAME: &str = "PDF Reader";
pub const TOOL_DESCRIPTION: &str = "Reads and extracts text content from PDF files. \
    Provide the file path to the PDF document and optionally specify an output directory";

/// Failures of a single extraction. `Display` yields the tool message.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Error: File not found at path: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Error: Could not extract text from PDF. The file might be empty or image-based.")]
    NoText,

    #[error("Error reading PDF: {0}")]
    Read(String),
}

/// A successful extraction
#[derive(Debug, Clone)]
pub struct PdfExtraction {
    pub text: String,
    pub page_count: usize,
    pub output_path: Option<PathBuf>,
}

impl PdfExtraction {
    pub fn message(&self) -> String {
        match &self.output_path {
            Some(path) => format!("Text extracted and saved to {}", path.display()),
            None => "Successfully extracted text from PDF.".to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfReaderTool;

impl PdfReaderTool {
    pub fn new() -> Self {
        Self
    }

    pub fn name(&self) -> &'static str {
        TOOL_NAME
    }

    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// Run the tool and describe the outcome in one line of text
    pub async fn run(&self, file_path: &Path, output_dir: Option<&Path>) -> String {
        match self.extract(file_path, output_dir).await {
            Ok(extraction) => extraction.message(),
            Err(e) => e.to_string(),
        }
    }

    /// Extract every page of `file_path`; with `output_dir`, also write
    /// `<output_dir>/<stem>.txt` holding the trimmed text.
    pub async fn extract(
        &self,
        file_path: &Path,
        output_dir: Option<&Path>,
    ) -> Result<PdfExtraction, ExtractionError> {
        let bytes = fs::read(file_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ExtractionError::NotFound(file_path.to_path_buf()),
            _ => ExtractionError::Read(e.to_string()),
        })?;

        let pages = PdfExtractor::extract_pages(&bytes).map_err(|e| match e {
            PipelineError::PdfExtraction(detail) => ExtractionError::Read(detail),
            other => ExtractionError::Read(other.to_string()),
        })?;
        debug!("{}: {} page(s)", file_path.display(), pages.len());

        let text = PdfExtractor::join_pages(&pages);
        if text.trim().is_empty() {
            warn!("No extractable text in {}", file_path.display());
            return Err(ExtractionError::NoText);
        }

        let output_path = match output_dir {
            Some(dir) => Some(write_text(file_path, dir, text.trim()).await?),
            None => None,
        };

        Ok(PdfExtraction {
            text,
            page_count: pages.len(),
            output_path,
        })
    }
}

/// Target path for the text extracted from `source`
pub fn text_output_path(source: &Path, output_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}.txt", stem))
}

async fn write_text(source: &Path, output_dir: &Path, text: &str) -> Result<PathBuf, ExtractionError> {
    fs::create_dir_all(output_dir)
        .await
        .map_err(|e| ExtractionError::Read(e.to_string()))?;

    let output_path = text_output_path(source, output_dir);
    fs::write(&output_path, text)
        .await
        .map_err(|e| ExtractionError::Read(e.to_string()))?;

    info!("Saved extracted text to {}", output_path.display());
    Ok(output_path)
}
