//! Input manager for handling different file types

use crate::error::{PipelineError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::{debug, info};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    pub async fn extract_text(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(PipelineError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await
            }
            FileType::Json | FileType::Unknown => Err(PipelineError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                path.display()
            ))),
        }
    }

    /// Files in `dir` accepted by `filter`, sorted by path.
    ///
    /// Only the directory itself is scanned unless `recursive` is set.
    pub fn list_files<F>(&self, dir: &Path, recursive: bool, filter: F) -> Result<Vec<PathBuf>>
    where
        F: Fn(FileType) -> bool,
    {
        if !dir.is_dir() {
            return Err(PipelineError::MissingDirectory(dir.to_path_buf()));
        }

        let walker = if recursive {
            WalkDir::new(dir).min_depth(1)
        } else {
            WalkDir::new(dir).min_depth(1).max_depth(1)
        };

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                PipelineError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "directory walk failed")
                }))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if filter(FileType::from_path(entry.path())) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        debug!("{} matching file(s) in {}", files.len(), dir.display());
        Ok(files)
    }

    pub fn list_files_of_type(&self, dir: &Path, file_type: FileType) -> Result<Vec<PathBuf>> {
        self.list_files(dir, false, |t| t == file_type)
    }
}
