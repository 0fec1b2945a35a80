//! Output formatters for match reports

use crate::config::OutputFormat;
use crate::error::{PipelineError, Result};
use crate::output::report::{CandidateMatch, MatchReport};
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for rendering match reports
pub trait OutputFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for structured data
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for sharing reports
pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// HTML formatter with styling
pub struct HtmlFormatter {
    include_styles: bool,
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Job Match Report</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 960px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container { background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        .header { text-align: center; border-bottom: 3px solid #007acc; padding-bottom: 20px; margin-bottom: 30px; }
        h2 { color: #007acc; border-bottom: 2px solid #e9ecef; padding-bottom: 10px; }
        table { width: 100%; border-collapse: collapse; margin: 15px 0; }
        th, td { text-align: left; padding: 8px; border-bottom: 1px solid #e9ecef; vertical-align: top; }
        .score { font-weight: bold; white-space: nowrap; }
        .score-excellent { color: #28a745; }
        .score-good { color: #17a2b8; }
        .score-fair { color: #b8860b; }
        .score-poor { color: #dc3545; }
        .summary { background: #f8f9fa; padding: 15px; border-left: 4px solid #007acc; border-radius: 6px; }
        .metadata { background: #e9ecef; padding: 15px; border-radius: 6px; margin-top: 30px; font-size: 0.9em; color: #6c757d; }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Job Match Report</h1>
            <p>Generated: {{ generated_at }} | {{ candidates }} candidate(s) | {{ jobs }} job(s)</p>
        </div>

        {% if has_summary %}
        <div class="summary"><p>{{ summary }}</p></div>
        {% endif %}

        {% for group in groups %}
        <h2>{{ group.job_title }} <small>({{ group.job_id }})</small></h2>
        <table>
            <tr><th>#</th><th>Candidate</th><th>Score</th><th>Justification</th></tr>
            {% for row in group.rows %}
            <tr>
                <td>{{ row.position }}</td>
                <td>{{ row.candidate }}</td>
                <td class="score {{ row.score_class }}">{{ row.score }}</td>
                <td>{{ row.justification }}</td>
            </tr>
            {% endfor %}
        </table>
        {% endfor %}

        {% if groups.is_empty() %}
        <p>No matches were produced.</p>
        {% endif %}

        <div class="metadata">
            <p><strong>Generated by cv-pipeline v{{ version }}</strong> using {{ model }}</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    generated_at: String,
    candidates: usize,
    jobs: usize,
    summary: String,
    has_summary: bool,
    groups: Vec<HtmlJobGroup>,
    version: String,
    model: String,
}

struct HtmlJobGroup {
    job_id: String,
    job_title: String,
    rows: Vec<HtmlRow>,
}

struct HtmlRow {
    position: usize,
    candidate: String,
    score: String,
    score_class: &'static str,
    justification: String,
}

fn score_class(m: &CandidateMatch) -> &'static str {
    match m.score.sort_value() {
        s if s >= 85.0 => "score-excellent",
        s if s >= 65.0 => "score-good",
        s if s >= 45.0 => "score-fair",
        _ => "score-poor",
    }
}

fn job_title<'a>(group: &'a [&CandidateMatch], job_id: &'a str) -> &'a str {
    group
        .iter()
        .map(|m| m.job_title.as_str())
        .find(|t| !t.is_empty())
        .unwrap_or(job_id)
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score(&self, m: &CandidateMatch) -> String {
        let score = m.score.to_string();
        let color = match score_class(m) {
            "score-excellent" => Color::Green,
            "score-good" => Color::BrightGreen,
            "score-fair" => Color::Yellow,
            _ => Color::Red,
        };

        if self.use_colors {
            format!("[{}]", score.color(color).bold())
        } else {
            format!("[{}]", score)
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("💼 JOB MATCH REPORT", 1));
        output.push_str(&format!(
            "Generated: {} | Model: {}\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.model
        ));
        output.push_str(&format!(
            "Candidates: {} | Jobs: {} | Matches: {}\n",
            report.candidates_considered,
            report.jobs_considered,
            report.matches.len()
        ));

        if let Some(summary) = &report.summary {
            output.push_str(&self.format_header("Summary", 2));
            output.push_str(&format!("{}\n", self.colorize(summary, Color::Cyan)));
        }

        for (job_id, matches) in report.by_job() {
            output.push_str(&self.format_header(&format!("{} ({})", job_title(&matches, job_id), job_id), 2));
            for (i, m) in matches.iter().enumerate() {
                output.push_str(&format!("  {}. {} {}\n", i + 1, m.candidate, self.format_score(m)));
                if self.detailed && !m.justification.is_empty() {
                    output.push_str(&format!("     {}\n", m.justification));
                }
            }
        }

        if self.detailed && !report.matches.is_empty() {
            output.push_str(&self.format_header("Best Fit per Candidate", 3));
            for m in report.best_per_candidate() {
                output.push_str(&format!(
                    "  • {} → {} {}\n",
                    m.candidate,
                    if m.job_title.is_empty() { &m.job_id } else { &m.job_title },
                    self.format_score(m)
                ));
            }
        }

        if report.matches.is_empty() {
            output.push_str(&format!("\n{}\n", self.colorize("No matches were produced.", Color::Yellow)));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# 💼 Job Match Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Model:** {}\n\n",
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.model
            ));
            output.push_str(&format!(
                "**Candidates:** {} | **Jobs:** {}\n\n",
                report.candidates_considered, report.jobs_considered
            ));
        }

        if let Some(summary) = &report.summary {
            output.push_str("## Summary\n\n");
            output.push_str(&format!("{}\n\n", summary));
        }

        for (job_id, matches) in report.by_job() {
            output.push_str(&format!("## {} (`{}`)\n\n", job_title(&matches, job_id), job_id));
            output.push_str("| # | Candidate | Score | Justification |\n");
            output.push_str("|---|-----------|-------|---------------|\n");
            for (i, m) in matches.iter().enumerate() {
                output.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    i + 1,
                    Self::escape_cell(&m.candidate),
                    m.score,
                    Self::escape_cell(&m.justification)
                ));
            }
            output.push('\n');
        }

        if report.matches.is_empty() {
            output.push_str("_No matches were produced._\n");
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &MatchReport) -> HtmlTemplate {
        let groups = report
            .by_job()
            .into_iter()
            .map(|(job_id, matches)| HtmlJobGroup {
                job_id: job_id.to_string(),
                job_title: job_title(&matches, job_id).to_string(),
                rows: matches
                    .iter()
                    .enumerate()
                    .map(|(i, m)| HtmlRow {
                        position: i + 1,
                        candidate: m.candidate.clone(),
                        score: m.score.to_string(),
                        score_class: score_class(m),
                        justification: m.justification.clone(),
                    })
                    .collect(),
            })
            .collect();

        HtmlTemplate {
            include_styles: self.include_styles,
            generated_at: report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            candidates: report.candidates_considered,
            jobs: report.jobs_considered,
            summary: report.summary.clone().unwrap_or_default(),
            has_summary: report.summary.is_some(),
            groups,
            version: env!("CARGO_PKG_VERSION").to_string(),
            model: report.model.clone(),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| PipelineError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(true),
            html_formatter: HtmlFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &MatchReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
            OutputFormat::Html => self.html_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::{MatchCategory, MatchScore};
    use chrono::Utc;
    use tempfile::tempdir;

    fn sample_report() -> MatchReport {
        MatchReport {
            generated_at: Utc::now(),
            model: "gpt-test".to_string(),
            candidates_considered: 2,
            jobs_considered: 1,
            matches: vec![
                CandidateMatch {
                    candidate: "Bob <script>".to_string(),
                    job_id: "backend".to_string(),
                    job_title: "Backend Engineer".to_string(),
                    score: MatchScore::Category(MatchCategory::Fair),
                    rank: None,
                    justification: "Some | Python".to_string(),
                },
                CandidateMatch {
                    candidate: "Alice Smith".to_string(),
                    job_id: "backend".to_string(),
                    job_title: String::new(),
                    score: MatchScore::Numeric(88.0),
                    rank: None,
                    justification: "5 years Python".to_string(),
                },
            ],
            summary: Some("Alice is the strongest fit.".to_string()),
        }
    }

    #[test]
    fn test_console_plain_output() {
        let output = ConsoleFormatter::new(false, true).format_report(&sample_report()).unwrap();
        assert!(output.contains("JOB MATCH REPORT"));
        assert!(output.contains("Backend Engineer (backend)"));
        assert!(output.contains("1. Alice Smith [88]"));
        assert!(output.contains("2. Bob <script> [Fair]"));
        assert!(output.contains("5 years Python"));
        assert!(output.contains("Best Fit per Candidate"));
    }

    #[test]
    fn test_markdown_escapes_table_cells() {
        let output = MarkdownFormatter::new(true).format_report(&sample_report()).unwrap();
        assert!(output.starts_with("# 💼 Job Match Report"));
        assert!(output.contains("## Backend Engineer (`backend`)"));
        assert!(output.contains("| 1 | Alice Smith | 88 | 5 years Python |"));
        assert!(output.contains("Some \\| Python"));
        assert!(output.contains("**Model:** gpt-test"));
    }

    #[test]
    fn test_html_escapes_content() {
        let output = HtmlFormatter::new(false).format_report(&sample_report()).unwrap();
        assert!(output.contains("<title>Job Match Report</title>"));
        assert!(output.contains("Alice is the strongest fit."));
        assert!(!output.contains("Bob <script>"));
        assert!(!output.contains("<style>"));
    }

    #[test]
    fn test_json_roundtrip() {
        let report = sample_report();
        let output = JsonFormatter::new(true).format_report(&report).unwrap();
        let parsed: MatchReport = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.matches, report.matches);
    }

    #[test]
    fn test_empty_report_renders() {
        let mut report = sample_report();
        report.matches.clear();
        report.summary = None;

        let generator = ReportGenerator::with_options(false, false, false);
        for format in [OutputFormat::Console, OutputFormat::Markdown, OutputFormat::Html] {
            let output = generator.generate_report(&report, &format).unwrap();
            assert!(output.contains("No matches were produced"));
        }
    }

    #[test]
    fn test_formatters_report_their_format() {
        assert_eq!(ConsoleFormatter::new(false, false).supports_format(), OutputFormat::Console);
        assert_eq!(JsonFormatter::new(false).supports_format(), OutputFormat::Json);
        assert_eq!(MarkdownFormatter::new(false).supports_format(), OutputFormat::Markdown);
        assert_eq!(HtmlFormatter::new(false).supports_format(), OutputFormat::Html);
    }

    #[test]
    fn test_save_report_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("job-matches-results").join("match_report.md");
        save_report_to_file("# report", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# report");
    }
}
