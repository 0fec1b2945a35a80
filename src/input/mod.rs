//! Input processing module
//! Handles file detection, text extraction, and the PDF reader tool

pub mod file_detector;
pub mod text_extractor;
pub mod pdf_reader;
pub mod manager;

pub use manager::InputManager;
pub use pdf_reader::{ExtractionError, PdfExtraction, PdfReaderTool};
