//! Text extraction from various file formats

use crate::error::{PipelineError, Result};
use log::{debug, warn};
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

/// What lopdf writes in place of strings in fonts it cannot decode,
/// e.g. `?Identity-H Unimplemented?`
const LOPDF_UNDECODED: &str = r"\?[^?\n]*Unimplemented\?";

impl PdfExtractor {
    /// Extract the text of each page, in page order.
    ///
    /// Both lopdf (per page) and pdf-extract (whole document, one page) are
    /// run and the result with more printable text wins. Ties go to lopdf,
    /// which keeps page boundaries.
    pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>> {
        let lopdf_pages = Self::extract_with_lopdf(bytes);
        let pdf_extract_text = Self::extract_with_pdf_extract(bytes);
        Self::choose_extraction(lopdf_pages, pdf_extract_text)
    }

    fn extract_with_lopdf(bytes: &[u8]) -> Result<Vec<String>> {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|e| PipelineError::PdfExtraction(format!("lopdf: {}", e)))?;
        let undecoded = Regex::new(LOPDF_UNDECODED)
            .map_err(|e| PipelineError::TextProcessing(e.to_string()))?;

        let mut pages = Vec::new();
        for page_number in document.get_pages().keys() {
            let text = document.extract_text(&[*page_number]).map_err(|e| {
                PipelineError::PdfExtraction(format!("lopdf page {}: {}", page_number, e))
            })?;
            let placeholders = undecoded.find_iter(&text).count();
            if placeholders > 0 {
                warn!("lopdf could not decode {} string(s) on page {}", placeholders, page_number);
            }
            pages.push(undecoded.replace_all(&text, "").into_owned());
        }
        Ok(pages)
    }

    fn extract_with_pdf_extract(bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed fonts
        match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(PipelineError::PdfExtraction(format!("pdf-extract: {}", e))),
            Err(_) => Err(PipelineError::PdfExtraction("pdf-extract: panicked".to_string())),
        }
    }

    fn choose_extraction(lopdf_pages: Result<Vec<String>>, pdf_extract_text: Result<String>) -> Result<Vec<String>> {
        let lopdf_chars = lopdf_pages
            .as_ref()
            .map(|pages| pages.iter().map(|p| count_printable_chars(p)).sum::<usize>())
            .unwrap_or(0);
        let pdf_extract_chars = pdf_extract_text
            .as_ref()
            .map(|text| count_printable_chars(text))
            .unwrap_or(0);
        debug!("PDF extraction: lopdf={} chars, pdf-extract={} chars", lopdf_chars, pdf_extract_chars);

        match (lopdf_pages, pdf_extract_text) {
            (Ok(pages), _) if lopdf_chars > 0 && lopdf_chars >= pdf_extract_chars => Ok(pages),
            (_, Ok(text)) if pdf_extract_chars > 0 => Ok(vec![text]),
            // Nothing printable from either; keep the page structure
            (Ok(pages), _) => Ok(pages),
            (Err(_), Ok(text)) => Ok(vec![text]),
            (Err(lopdf_err), Err(pdf_extract_err)) => Err(PipelineError::PdfExtraction(format!(
                "{}; {}",
                lopdf_err, pdf_extract_err
            ))),
        }
    }

    /// Concatenate pages, each followed by a newline
    pub fn join_pages(pages: &[String]) -> String {
        let mut text = String::new();
        for page in pages {
            text.push_str(page);
            text.push('\n');
        }
        text
    }
}

fn count_printable_chars(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphanumeric() || c.is_ascii_punctuation()).count()
}

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        let pages = Self::extract_pages(&bytes).map_err(|e| {
            PipelineError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", path.display(), e))
        })?;
        Ok(Self::join_pages(&pages))
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await?;
        Ok(content)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        Self::markdown_to_text(&markdown_content)
    }
}

impl MarkdownExtractor {
    pub fn markdown_to_text(markdown: &str) -> Result<String> {
        let parser = Parser::new(markdown);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Self::html_to_text(&html_output)
    }

    fn html_to_text(html: &str) -> Result<String> {
        let text = html
            .replace("<br>", "\n")
            .replace("<br />", "\n")
            .replace("</p>", "\n\n")
            .replace("</li>", "\n")
            .replace("&nbsp;", " ")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'");

        let re = Regex::new(r"<[^>]*>")
            .map_err(|e| PipelineError::TextProcessing(e.to_string()))?;
        let clean_text = re.replace_all(&text, "");

        let lines: Vec<&str> = clean_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        Ok(lines.join("\n"))
    }
}
