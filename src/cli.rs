//! CLI interface for the CV pipeline

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cv-pipeline")]
#[command(about = "LLM-agent pipeline that turns PDF resumes into candidate profiles and job matches")]
#[command(long_about = "Extract text from resumes in CV/, structure it into candidate profiles, and match the profiles against job descriptions in knowledge/")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run extraction, profiling and matching
    Run {
        /// Directory holding CV/, knowledge/ and the stage outputs
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Report rendering: console, json, markdown, html
        #[arg(short, long)]
        output: Option<String>,

        /// Include justifications and best fits in the console report
        #[arg(short, long)]
        detailed: bool,

        /// Hide progress bars
        #[arg(long)]
        no_progress: bool,
    },

    /// Extract text from a single PDF
    Extract {
        /// Path to the PDF
        file: PathBuf,

        /// Write <name>.txt into this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" | "text" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown, html", format)),
    }
}
