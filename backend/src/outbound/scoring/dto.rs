//! Wire types for the scoring engine's JSON contract.

use serde::Deserialize;

use crate::domain::ScoringOutcome;

/// Successful scoring response body.
///
/// ```json
/// {"prediction": 450000.0, "interval_lower": 420000.0, "interval_upper": 480000.0}
/// ```
#[derive(Debug, Deserialize)]
pub(crate) struct ScoringResponseDto {
    pub prediction: f64,
    pub interval_lower: f64,
    pub interval_upper: f64,
}

impl From<ScoringResponseDto> for ScoringOutcome {
    fn from(value: ScoringResponseDto) -> Self {
        Self {
            prediction: value.prediction,
            interval_lower: value.interval_lower,
            interval_upper: value.interval_upper,
        }
    }
}
