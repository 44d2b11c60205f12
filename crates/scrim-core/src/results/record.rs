//! Result records and the tabular result set

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ScrimError, ScrimResult};

/// Columns written for record sets built in memory
pub const DEFAULT_HEADERS: [&str; 3] = ["scenario_id", "score", "challenge_level"];

/// Header names tried, in order, for the scenario identifier
const ID_COLUMNS: [&str; 3] = ["scenario_id", "id", "thread_id"];

/// Outcome classification of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    Error,
    Failure,
    Success,
}

impl Score {
    /// Numeric value as written by the engine
    pub fn value(&self) -> i8 {
        match self {
            Score::Error => -1,
            Score::Failure => 0,
            Score::Success => 1,
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Score::Error),
            0 => Some(Score::Failure),
            1 => Some(Score::Success),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Score::Error => "ERROR",
            Score::Failure => "FAIL",
            Score::Success => "PASS",
        }
    }
}

/// Which scores a filtered view keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFilter {
    #[default]
    All,
    Success,
    Failure,
    Error,
}

impl ScoreFilter {
    pub fn matches(&self, score: Score) -> bool {
        match self {
            ScoreFilter::All => true,
            ScoreFilter::Success => score == Score::Success,
            ScoreFilter::Failure => score == Score::Failure,
            ScoreFilter::Error => score == Score::Error,
        }
    }
}

impl FromStr for ScoreFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ScoreFilter::All),
            "success" | "pass" => Ok(ScoreFilter::Success),
            "failure" | "fail" => Ok(ScoreFilter::Failure),
            "error" => Ok(ScoreFilter::Error),
            other => Err(format!("unknown score filter '{}'", other)),
        }
    }
}

impl fmt::Display for ScoreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScoreFilter::All => "all",
            ScoreFilter::Success => "success",
            ScoreFilter::Failure => "failure",
            ScoreFilter::Error => "error",
        };
        f.write_str(name)
    }
}

/// One evaluated scenario.
///
/// Keeps the raw row so an export reproduces the source table column for column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    scenario_id: String,
    score: Score,
    challenge_level: i64,
    fields: Vec<String>,
}

impl ResultRecord {
    /// Record laid out in [`DEFAULT_HEADERS`] order
    pub fn new(scenario_id: impl Into<String>, score: Score, challenge_level: i64) -> Self {
        let scenario_id = scenario_id.into();
        let fields = vec![
            scenario_id.clone(),
            score.value().to_string(),
            challenge_level.to_string(),
        ];
        Self {
            scenario_id,
            score,
            challenge_level,
            fields,
        }
    }

    pub fn scenario_id(&self) -> &str {
        &self.scenario_id
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn challenge_level(&self) -> i64 {
        self.challenge_level
    }

    /// Raw cells in source column order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Column positions resolved from a header row
struct Columns {
    score: usize,
    challenge_level: usize,
    scenario_id: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[String]) -> ScrimResult<Self> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let score = position("score")
            .ok_or_else(|| ScrimError::malformed("missing column 'score'"))?;
        let challenge_level = position("challenge_level")
            .ok_or_else(|| ScrimError::malformed("missing column 'challenge_level'"))?;

        // Dataframe exports put an unnamed index column first
        let scenario_id = ID_COLUMNS.iter().find_map(|name| position(name)).or_else(|| {
            headers
                .first()
                .filter(|h| h.trim().is_empty() || h.starts_with("Unnamed"))
                .map(|_| 0)
        });

        Ok(Self {
            score,
            challenge_level,
            scenario_id,
        })
    }
}

/// A parsed result table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    headers: Vec<String>,
    records: Vec<ResultRecord>,
}

impl ResultSet {
    /// Build from in-memory records using the default column layout
    pub fn from_records(records: Vec<ResultRecord>) -> Self {
        Self {
            headers: DEFAULT_HEADERS.iter().map(|h| h.to_string()).collect(),
            records,
        }
    }

    /// Parse comma-separated text with a header row
    pub fn from_csv(text: &str) -> ScrimResult<Self> {
        Self::from_reader(text.as_bytes())
    }

    pub fn from_reader<R: Read>(reader: R) -> ScrimResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ScrimError::malformed(format!("cannot read header row: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();
        let columns = Columns::resolve(&headers)?;

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row_number = index + 1;
            let row = row.map_err(|e| ScrimError::malformed(format!("row {}: {}", row_number, e)))?;
            let fields: Vec<String> = row.iter().map(str::to_string).collect();

            let score_cell = &fields[columns.score];
            let score = parse_integral(score_cell)
                .and_then(Score::from_value)
                .ok_or_else(|| {
                    ScrimError::malformed(format!(
                        "row {}: invalid score '{}'",
                        row_number, score_cell
                    ))
                })?;

            let level_cell = &fields[columns.challenge_level];
            let challenge_level = parse_integral(level_cell).ok_or_else(|| {
                ScrimError::malformed(format!(
                    "row {}: invalid challenge_level '{}'",
                    row_number, level_cell
                ))
            })?;

            let scenario_id = match columns.scenario_id {
                Some(idx) => fields[idx].clone(),
                None => row_number.to_string(),
            };

            records.push(ResultRecord {
                scenario_id,
                score,
                challenge_level,
                fields,
            });
        }

        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lowest and highest challenge level present
    pub fn challenge_range(&self) -> Option<(i64, i64)> {
        let levels = self.records.iter().map(|r| r.challenge_level);
        Some((levels.clone().min()?, levels.max()?))
    }

    /// Records matching the score filter with challenge level at least `min_challenge`
    pub fn filter(&self, score_filter: ScoreFilter, min_challenge: i64) -> ResultSet {
        let records = self
            .records
            .iter()
            .filter(|r| score_filter.matches(r.score) && r.challenge_level >= min_challenge)
            .cloned()
            .collect();
        Self {
            headers: self.headers.clone(),
            records,
        }
    }

    /// Comma-separated text with a header row, in source column order
    pub fn to_export(&self) -> ScrimResult<String> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(&self.headers)
            .map_err(|e| ScrimError::io(format!("Failed to write CSV header: {}", e)))?;
        for record in &self.records {
            writer
                .write_record(&record.fields)
                .map_err(|e| ScrimError::io(format!("Failed to write CSV row: {}", e)))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ScrimError::io(format!("Failed to flush CSV: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| ScrimError::io(format!("CSV is not UTF-8: {}", e)))
    }
}

/// Integer cell, accepting integral floats such as `1.0`
fn parse_integral(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(value) = cell.parse::<i64>() {
        return Some(value);
    }
    let value = cell.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}
