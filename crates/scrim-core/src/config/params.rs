//! Evaluation parameters
//!
//! The numeric knobs the operator controls, with their declared bounds.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const NUM_SAMPLES_RANGE: RangeInclusive<u32> = 5..=200;
pub const COST_LIMIT_RANGE: RangeInclusive<f64> = 1.0..=50.0;
pub const NUM_WORKERS_RANGE: RangeInclusive<u32> = 1..=10;
pub const DIFFICULTY_RANGE: RangeInclusive<u8> = 1..=10;

/// Numeric evaluation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationParameters {
    /// Number of scenarios to generate and test
    #[serde(default = "default_num_samples")]
    pub num_samples: u32,

    /// Global cost ceiling in USD
    #[serde(default = "default_cost_limit")]
    pub cost_limit: f64,

    /// Parallel dialog workers
    #[serde(default = "default_num_workers")]
    pub num_workers: u32,

    #[serde(default = "default_min_difficulty")]
    pub min_difficulty: u8,

    #[serde(default = "default_max_difficulty")]
    pub max_difficulty: u8,
}

fn default_num_samples() -> u32 {
    20
}

fn default_cost_limit() -> f64 {
    5.0
}

fn default_num_workers() -> u32 {
    3
}

fn default_min_difficulty() -> u8 {
    5
}

fn default_max_difficulty() -> u8 {
    10
}

impl Default for EvaluationParameters {
    fn default() -> Self {
        Self {
            num_samples: default_num_samples(),
            cost_limit: default_cost_limit(),
            num_workers: default_num_workers(),
            min_difficulty: default_min_difficulty(),
            max_difficulty: default_max_difficulty(),
        }
    }
}

impl EvaluationParameters {
    /// Set number of scenarios
    pub fn with_num_samples(mut self, num_samples: u32) -> Self {
        self.num_samples = num_samples;
        self
    }

    /// Set cost limit
    pub fn with_cost_limit(mut self, cost_limit: f64) -> Self {
        self.cost_limit = cost_limit;
        self
    }

    /// Set worker count
    pub fn with_num_workers(mut self, num_workers: u32) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Set difficulty window
    pub fn with_difficulty(mut self, min: u8, max: u8) -> Self {
        self.min_difficulty = min;
        self.max_difficulty = max;
        self
    }

    /// Check every field against its bounds, then the difficulty ordering
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("num_samples", self.num_samples, &NUM_SAMPLES_RANGE)?;

        // NaN fails `contains`, which is what we want
        if !COST_LIMIT_RANGE.contains(&self.cost_limit) {
            return Err(ValidationError::out_of_range(
                "cost_limit",
                self.cost_limit,
                COST_LIMIT_RANGE.start(),
                COST_LIMIT_RANGE.end(),
            ));
        }

        check_range("num_workers", self.num_workers, &NUM_WORKERS_RANGE)?;
        check_range("min_difficulty", self.min_difficulty, &DIFFICULTY_RANGE)?;
        check_range("max_difficulty", self.max_difficulty, &DIFFICULTY_RANGE)?;

        if self.min_difficulty > self.max_difficulty {
            return Err(ValidationError::InvertedDifficulty {
                min: self.min_difficulty,
                max: self.max_difficulty,
            });
        }

        Ok(())
    }
}

fn check_range<T>(
    field: &'static str,
    value: T,
    range: &RangeInclusive<T>,
) -> Result<(), ValidationError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(
            field,
            value,
            range.start(),
            range.end(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = EvaluationParameters::default();
        assert_eq!(params.num_samples, 20);
        assert_eq!(params.cost_limit, 5.0);
        assert_eq!(params.num_workers, 3);
        assert_eq!((params.min_difficulty, params.max_difficulty), (5, 10));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let low = EvaluationParameters::default()
            .with_num_samples(5)
            .with_cost_limit(1.0)
            .with_num_workers(1)
            .with_difficulty(1, 1);
        assert!(low.validate().is_ok());

        let high = EvaluationParameters::default()
            .with_num_samples(200)
            .with_cost_limit(50.0)
            .with_num_workers(10)
            .with_difficulty(10, 10);
        assert!(high.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_fields() {
        let cases = [
            EvaluationParameters::default().with_num_samples(4),
            EvaluationParameters::default().with_num_samples(201),
            EvaluationParameters::default().with_cost_limit(0.5),
            EvaluationParameters::default().with_cost_limit(50.5),
            EvaluationParameters::default().with_cost_limit(f64::NAN),
            EvaluationParameters::default().with_num_workers(0),
            EvaluationParameters::default().with_num_workers(11),
            EvaluationParameters::default().with_difficulty(0, 5),
            EvaluationParameters::default().with_difficulty(5, 11),
        ];
        for params in cases {
            assert!(
                matches!(params.validate(), Err(ValidationError::OutOfRange { .. })),
                "{params:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_out_of_range_reports_bounds() {
        let err = EvaluationParameters::default()
            .with_num_workers(11)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: "num_workers",
                value: "11".to_string(),
                min: "1".to_string(),
                max: "10".to_string(),
            }
        );

        let err = EvaluationParameters::default()
            .with_difficulty(0, 5)
            .validate()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "min_difficulty = 0 is outside the allowed range [1, 10]"
        );
    }

    #[test]
    fn test_inverted_difficulty() {
        let params = EvaluationParameters::default().with_difficulty(8, 3);
        assert_eq!(
            params.validate(),
            Err(ValidationError::InvertedDifficulty { min: 8, max: 3 })
        );
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let params: EvaluationParameters = serde_json::from_str(r#"{"num_samples": 50}"#).unwrap();
        assert_eq!(params.num_samples, 50);
        assert_eq!(params.num_workers, 3);
    }
}
