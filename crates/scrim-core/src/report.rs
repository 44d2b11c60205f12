//! Report generation for result sets
//!
//! Renders a summary and a filtered view as a terminal table, Markdown or JSON.

use serde::Serialize;

use crate::error::{ScrimError, ScrimResult};
use crate::results::{ResultSet, ResultSummary, Score};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Markdown,
    Json,
}

impl ReportFormat {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(ReportFormat::Table),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// What a report shows
pub struct ReportInput<'a> {
    /// Experiment the set was loaded from, when known
    pub experiment: Option<&'a str>,
    /// Summary of the full result set
    pub summary: &'a ResultSummary,
    /// Filtered records to list
    pub view: &'a ResultSet,
}

/// Generate a report in the specified format
pub fn generate_report(input: &ReportInput<'_>, format: ReportFormat) -> ScrimResult<String> {
    match format {
        ReportFormat::Table => Ok(generate_table(input)),
        ReportFormat::Markdown => Ok(generate_markdown(input)),
        ReportFormat::Json => generate_json(input),
    }
}

fn generate_table(input: &ReportInput<'_>) -> String {
    let summary = input.summary;
    let mut output = String::new();

    output.push_str(&format!("\n{:=<70}\n", "= Evaluation Results "));
    if let Some(experiment) = input.experiment {
        output.push_str(&format!("Experiment: {}\n", experiment));
    }
    output.push_str(&format!("{:=<70}\n\n", ""));

    output.push_str("SUMMARY\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!("Total Scenarios: {}\n", summary.total));
    output.push_str(&format!(
        "Success Rate: {}/{} ({:.1}%)\n",
        summary.success_count, summary.total, summary.success_rate
    ));
    output.push_str(&format!(
        "Failure Rate: {}/{} ({:.1}%)\n",
        summary.failure_count, summary.total, summary.failure_rate
    ));
    output.push_str(&format!(
        "Error Rate: {}/{} ({:.1}%)\n",
        summary.error_count, summary.total, summary.error_rate
    ));
    output.push_str(&format!(
        "Avg Challenge Level: {:.1}\n\n",
        summary.avg_challenge_level
    ));

    output.push_str(&format!("SCENARIOS ({} shown)\n", input.view.len()));
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!("{:<40} {:>10} {:>12}\n", "Scenario", "Result", "Challenge"));
    output.push_str(&format!("{:-<70}\n", ""));

    for record in input.view.records() {
        output.push_str(&format!(
            "{:<40} {:>10} {:>12}\n",
            truncate(record.scenario_id(), 38),
            record.score().label(),
            record.challenge_level()
        ));
    }

    output.push_str(&format!("{:=<70}\n", ""));
    output
}

fn generate_markdown(input: &ReportInput<'_>) -> String {
    let summary = input.summary;
    let mut md = String::new();

    md.push_str("# Evaluation Report\n\n");
    if let Some(experiment) = input.experiment {
        md.push_str(&format!("- **Experiment**: {}\n\n", experiment));
    }

    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Value |\n|--------|-------|\n");
    md.push_str(&format!("| Total Scenarios | {} |\n", summary.total));
    md.push_str(&format!("| Success Rate | {:.1}% |\n", summary.success_rate));
    md.push_str(&format!("| Failure Rate | {:.1}% |\n", summary.failure_rate));
    md.push_str(&format!("| Error Rate | {:.1}% |\n", summary.error_rate));
    md.push_str(&format!(
        "| Avg Challenge Level | {:.1} |\n\n",
        summary.avg_challenge_level
    ));

    md.push_str("## Scenarios\n\n");
    md.push_str("| Scenario | Result | Challenge |\n");
    md.push_str("|----------|--------|-----------|\n");
    for record in input.view.records() {
        let status = match record.score() {
            Score::Success => "✅",
            Score::Failure => "❌",
            Score::Error => "💥",
        };
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            record.scenario_id().replace('|', "\\|"),
            status,
            record.challenge_level()
        ));
    }
    md.push('\n');

    md
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    scenario_id: &'a str,
    score: i8,
    challenge_level: i64,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    experiment: Option<&'a str>,
    summary: &'a ResultSummary,
    records: Vec<JsonRecord<'a>>,
}

fn generate_json(input: &ReportInput<'_>) -> ScrimResult<String> {
    let report = JsonReport {
        experiment: input.experiment,
        summary: input.summary,
        records: input
            .view
            .records()
            .iter()
            .map(|r| JsonRecord {
                scenario_id: r.scenario_id(),
                score: r.score().value(),
                challenge_level: r.challenge_level(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report)
        .map_err(|e| ScrimError::io(format!("Failed to serialize report: {}", e)))
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{ResultRecord, ScoreFilter};

    fn sample() -> ResultSet {
        ResultSet::from_records(vec![
            ResultRecord::new("refund-late-order", Score::Success, 7),
            ResultRecord::new("refund-no-receipt", Score::Failure, 5),
            ResultRecord::new("upgrade-timeout", Score::Error, 9),
        ])
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(ReportFormat::parse("md"), Some(ReportFormat::Markdown));
        assert_eq!(ReportFormat::parse("TABLE"), Some(ReportFormat::Table));
        assert_eq!(ReportFormat::parse("html"), None);
    }

    #[test]
    fn test_table_report() {
        let set = sample();
        let summary = set.summarize();
        let view = set.filter(ScoreFilter::All, 6);
        let input = ReportInput {
            experiment: Some("20250101_120000"),
            summary: &summary,
            view: &view,
        };

        let table = generate_report(&input, ReportFormat::Table).unwrap();
        assert!(table.contains("Experiment: 20250101_120000"));
        assert!(table.contains("Success Rate: 1/3 (33.3%)"));
        assert!(table.contains("SCENARIOS (2 shown)"));
        assert!(table.contains("refund-late-order"));
        assert!(!table.contains("refund-no-receipt"));
    }

    #[test]
    fn test_markdown_report() {
        let set = sample();
        let summary = set.summarize();
        let input = ReportInput {
            experiment: None,
            summary: &summary,
            view: &set,
        };

        let md = generate_report(&input, ReportFormat::Markdown).unwrap();
        assert!(md.starts_with("# Evaluation Report"));
        assert!(md.contains("| Error Rate | 33.3% |"));
        assert!(md.contains("| upgrade-timeout | 💥 | 9 |"));
    }

    #[test]
    fn test_json_report() {
        let set = sample();
        let summary = set.summarize();
        let input = ReportInput {
            experiment: Some("exp"),
            summary: &summary,
            view: &set,
        };

        let json = generate_report(&input, ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["total"], 3);
        assert_eq!(value["records"][2]["score"], -1);
        assert_eq!(value["experiment"], "exp");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }
}
