//! Match report and run summary structures

use crate::llm::response::null_as_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Consolidated result of one matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub candidates_considered: usize,
    pub jobs_considered: usize,
    pub matches: Vec<CandidateMatch>,
    pub summary: Option<String>,
}

/// One candidate/job pairing as judged by the matching agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub candidate: String,
    pub job_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_title: String,
    pub score: MatchScore,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub justification: String,
}

/// Agents answer with a number, a numeric string (`"85"`, `"85%"`,
/// `"85/100"`) or a label
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MatchScore {
    Numeric(f64),
    Category(MatchCategory),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchCategory {
    Excellent,
    Strong,
    Good,
    Fair,
    Weak,
    Poor,
}

impl MatchCategory {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "excellent" | "very high" | "perfect" => Some(MatchCategory::Excellent),
            "strong" | "high" | "very good" => Some(MatchCategory::Strong),
            "good" => Some(MatchCategory::Good),
            "fair" | "medium" | "moderate" | "partial" => Some(MatchCategory::Fair),
            "weak" | "low" => Some(MatchCategory::Weak),
            "poor" | "none" | "very low" | "no match" => Some(MatchCategory::Poor),
            _ => None,
        }
    }

    /// Position on a 0-100 scale, used only to order mixed reports
    fn sort_value(&self) -> f64 {
        match self {
            MatchCategory::Excellent => 95.0,
            MatchCategory::Strong => 80.0,
            MatchCategory::Good => 65.0,
            MatchCategory::Fair => 50.0,
            MatchCategory::Weak => 30.0,
            MatchCategory::Poor => 10.0,
        }
    }
}

impl<'de> Deserialize<'de> for MatchCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        MatchCategory::parse(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown match category '{}'", label)))
    }
}

impl fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchCategory::Excellent => "Excellent",
            MatchCategory::Strong => "Strong",
            MatchCategory::Good => "Good",
            MatchCategory::Fair => "Fair",
            MatchCategory::Weak => "Weak",
            MatchCategory::Poor => "Poor",
        };
        f.write_str(label)
    }
}

impl MatchScore {
    /// Parse `"85"`, `"85%"`, `"85/100"` or `"4/5"` onto the 0-100 scale
    fn parse_numeric(text: &str) -> Option<f64> {
        let text = text.trim();
        if let Some(percent) = text.strip_suffix('%') {
            return percent.trim().parse().ok();
        }
        if let Some((numerator, denominator)) = text.split_once('/') {
            let numerator: f64 = numerator.trim().parse().ok()?;
            let denominator: f64 = denominator.trim().parse().ok()?;
            return (denominator > 0.0).then(|| numerator / denominator * 100.0);
        }
        text.parse().ok()
    }

    /// Score on a 0-100 scale. Non-integral scores below 1 are read as
    /// fractions, so `0.85` sorts like `85` while `1` stays `1`.
    pub fn sort_value(&self) -> f64 {
        match self {
            MatchScore::Numeric(n) if *n > 0.0 && *n < 1.0 => n * 100.0,
            MatchScore::Numeric(n) => *n,
            MatchScore::Category(c) => c.sort_value(),
        }
    }
}

impl<'de> Deserialize<'de> for MatchScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(MatchScore::Numeric)
                .ok_or_else(|| serde::de::Error::custom(format!("score {} out of range", n))),
            serde_json::Value::String(label) => MatchScore::parse_numeric(&label)
                .filter(|n| n.is_finite())
                .map(MatchScore::Numeric)
                .or_else(|| MatchCategory::parse(&label).map(MatchScore::Category))
                .ok_or_else(|| serde::de::Error::custom(format!("unknown match score '{}'", label))),
            other => Err(serde::de::Error::custom(format!("unexpected match score {}", other))),
        }
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchScore::Numeric(_) => write!(f, "{:.0}", self.sort_value()),
            MatchScore::Category(c) => write!(f, "{}", c),
        }
    }
}

impl MatchReport {
    /// Matches grouped by job (in job order of first appearance), best first
    pub fn by_job(&self) -> Vec<(&str, Vec<&CandidateMatch>)> {
        let mut groups: Vec<(&str, Vec<&CandidateMatch>)> = Vec::new();
        for m in &self.matches {
            match groups.iter_mut().find(|(job, _)| *job == m.job_id) {
                Some((_, list)) => list.push(m),
                None => groups.push((m.job_id.as_str(), vec![m])),
            }
        }
        for (_, list) in &mut groups {
            list.sort_by(|a, b| compare_matches(a, b));
        }
        groups
    }

    /// Best match per candidate
    pub fn best_per_candidate(&self) -> Vec<&CandidateMatch> {
        let mut best: Vec<&CandidateMatch> = Vec::new();
        for m in &self.matches {
            match best.iter_mut().find(|b| b.candidate == m.candidate) {
                Some(current) if compare_matches(m, current).is_lt() => *current = m,
                Some(_) => {}
                None => best.push(m),
            }
        }
        best
    }
}

/// Ranked entries first by rank, then higher score first
fn compare_matches(a: &CandidateMatch, b: &CandidateMatch) -> std::cmp::Ordering {
    a.rank
        .unwrap_or(u32::MAX)
        .cmp(&b.rank.unwrap_or(u32::MAX))
        .then_with(|| b.score.sort_value().total_cmp(&a.score.sort_value()))
}

/// Outcome of the extraction tool on one resume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    /// The tool's message, success or failure
    pub message: String,
}

impl ExtractionOutcome {
    pub fn succeeded(&self) -> bool {
        self.output.is_some()
    }
}

/// What a pipeline run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub extractions: Vec<ExtractionOutcome>,
    pub profiles: Vec<PathBuf>,
    pub report_path: PathBuf,
    pub rendered_report_path: Option<PathBuf>,
    pub report: MatchReport,
    pub processing_time_ms: u64,
}

impl RunSummary {
    pub fn failed_extractions(&self) -> impl Iterator<Item = &ExtractionOutcome> {
        self.extractions.iter().filter(|e| !e.succeeded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(candidate: &str, job: &str, score: MatchScore, rank: Option<u32>) -> CandidateMatch {
        CandidateMatch {
            candidate: candidate.to_string(),
            job_id: job.to_string(),
            job_title: job.to_string(),
            score,
            rank,
            justification: String::new(),
        }
    }

    fn report(matches: Vec<CandidateMatch>) -> MatchReport {
        MatchReport {
            generated_at: Utc::now(),
            model: "test".to_string(),
            candidates_considered: 2,
            jobs_considered: 2,
            matches,
            summary: None,
        }
    }

    #[test]
    fn test_score_accepts_number_or_label() {
        let numeric: MatchScore = serde_json::from_str("87.5").unwrap();
        assert_eq!(numeric, MatchScore::Numeric(87.5));

        let label: MatchScore = serde_json::from_str("\"High\"").unwrap();
        assert_eq!(label, MatchScore::Category(MatchCategory::Strong));

        assert!(serde_json::from_str::<MatchScore>("\"stellar\"").is_err());
    }

    #[test]
    fn test_numeric_strings_are_scores() {
        let parse = |json: &str| serde_json::from_str::<MatchScore>(json).unwrap();
        assert_eq!(parse("\"85\""), MatchScore::Numeric(85.0));
        assert_eq!(parse("\" 85% \""), MatchScore::Numeric(85.0));
        assert_eq!(parse("\"85/100\""), MatchScore::Numeric(85.0));
        assert_eq!(parse("\"4/5\""), MatchScore::Numeric(80.0));
        assert_eq!(parse("\"moderate\""), MatchScore::Category(MatchCategory::Fair));
        assert!(serde_json::from_str::<MatchScore>("\"3/0\"").is_err());
        assert!(serde_json::from_str::<MatchScore>("null").is_err());
    }

    #[test]
    fn test_null_title_and_justification() {
        let json = r#"{"candidate": "Bob", "job_id": "backend", "job_title": null, "score": "70%", "justification": null}"#;
        let m: CandidateMatch = serde_json::from_str(json).unwrap();
        assert_eq!(m.job_title, "");
        assert_eq!(m.justification, "");
        assert_eq!(m.score, MatchScore::Numeric(70.0));
    }

    #[test]
    fn test_fractional_scores_are_scaled() {
        assert_eq!(MatchScore::Numeric(0.5).sort_value(), 50.0);
        assert_eq!(MatchScore::Numeric(72.0).sort_value(), 72.0);
        assert_eq!(MatchScore::Numeric(0.5).to_string(), "50");
    }

    #[test]
    fn test_integer_scores_stay_on_their_scale() {
        assert_eq!(MatchScore::Numeric(1.0).sort_value(), 1.0);
        assert_eq!(MatchScore::Numeric(1.0).to_string(), "1");
        assert_eq!(MatchScore::Numeric(0.0).to_string(), "0");
        assert_eq!(MatchScore::Numeric(100.0).to_string(), "100");
    }

    #[test]
    fn test_by_job_orders_by_rank_then_score() {
        let report = report(vec![
            sample("Alice", "backend", MatchScore::Numeric(60.0), None),
            sample("Bob", "data", MatchScore::Numeric(90.0), None),
            sample("Carol", "backend", MatchScore::Numeric(85.0), None),
            sample("Dan", "backend", MatchScore::Category(MatchCategory::Weak), Some(1)),
            sample("Eve", "backend", MatchScore::Numeric(99.0), Some(2)),
        ]);

        let groups = report.by_job();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "backend");
        let names: Vec<_> = groups[0].1.iter().map(|m| m.candidate.as_str()).collect();
        assert_eq!(names, vec!["Dan", "Eve", "Carol", "Alice"]);
    }

    #[test]
    fn test_best_per_candidate() {
        let report = report(vec![
            sample("Alice", "backend", MatchScore::Numeric(60.0), None),
            sample("Alice", "data", MatchScore::Numeric(80.0), None),
            sample("Bob", "data", MatchScore::Category(MatchCategory::Fair), None),
        ]);

        let best = report.best_per_candidate();
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].job_id, "data");
        assert_eq!(best[1].candidate, "Bob");
    }
}
