//! Summary metrics over a result set

use serde::{Deserialize, Serialize};

use super::record::{ResultSet, Score};

/// Aggregate view of a result set.
///
/// Rates are percentages rounded to one decimal place; all zero when the set is empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub error_count: usize,
    pub success_rate: f64,
    pub failure_rate: f64,
    pub error_rate: f64,
    pub avg_challenge_level: f64,
}

impl ResultSummary {
    pub fn from_set(set: &ResultSet) -> Self {
        let total = set.len();
        if total == 0 {
            return Self::default();
        }

        let count = |score: Score| set.records().iter().filter(|r| r.score() == score).count();
        let success_count = count(Score::Success);
        let failure_count = count(Score::Failure);
        let error_count = count(Score::Error);

        let level_sum: i64 = set.records().iter().map(|r| r.challenge_level()).sum();

        Self {
            total,
            success_count,
            failure_count,
            error_count,
            success_rate: percentage(success_count, total),
            failure_rate: percentage(failure_count, total),
            error_rate: percentage(error_count, total),
            avg_challenge_level: level_sum as f64 / total as f64,
        }
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    let rate = count as f64 / total as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

impl ResultSet {
    pub fn summarize(&self) -> ResultSummary {
        ResultSummary::from_set(self)
    }
}
