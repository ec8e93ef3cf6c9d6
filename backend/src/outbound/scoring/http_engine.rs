//! Reqwest-backed scoring engine adapter.
//!
//! Owns transport details only: the feature vector is POSTed as JSON exactly
//! as submitted, and the response is decoded into a domain outcome. One call,
//! one attempt; retry policy, if any, belongs to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use super::dto::ScoringResponseDto;
use crate::domain::ports::{ScoringEngine, ScoringEngineError};
use crate::domain::{FeatureVector, ScoringOutcome};

/// Scoring engine adapter performing HTTP POST requests against one endpoint.
pub struct HttpScoringEngine {
    client: Client,
    endpoint: Url,
}

impl HttpScoringEngine {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ScoringEngine for HttpScoringEngine {
    async fn score(&self, features: &FeatureVector) -> Result<ScoringOutcome, ScoringEngineError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(features)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_outcome(body.as_ref())
    }
}

fn parse_outcome(body: &[u8]) -> Result<ScoringOutcome, ScoringEngineError> {
    let decoded: ScoringResponseDto = serde_json::from_slice(body).map_err(|error| {
        ScoringEngineError::decode(format!("invalid scoring JSON payload: {error}"))
    })?;
    Ok(decoded.into())
}

fn map_transport_error(error: reqwest::Error) -> ScoringEngineError {
    if error.is_timeout() {
        ScoringEngineError::timeout(error.to_string())
    } else {
        ScoringEngineError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ScoringEngineError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ScoringEngineError::timeout(message)
        }
        _ => ScoringEngineError::status(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network scoring mapping helpers.
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_scoring_json_into_domain_outcome() {
        let body =
            br#"{"prediction": 450000.0, "interval_lower": 420000.0, "interval_upper": 480000.0}"#;
        let outcome = parse_outcome(body).expect("JSON should decode");
        assert_eq!(outcome.prediction, 450_000.0);
        assert_eq!(outcome.interval_lower, 420_000.0);
        assert_eq!(outcome.interval_upper, 480_000.0);
    }

    #[rstest]
    #[case::missing_field(br#"{"prediction": 450000.0}"# as &[u8])]
    #[case::wrong_type(br#"{"prediction": "lots", "interval_lower": 1.0, "interval_upper": 2.0}"#)]
    #[case::not_json(b"<html>engine down</html>")]
    fn unusable_bodies_map_to_decode_errors(#[case] body: &[u8]) {
        let error = parse_outcome(body).expect_err("decode should fail");
        assert!(matches!(error, ScoringEngineError::Decode { .. }));
    }

    #[rstest]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, true)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case::bad_request(StatusCode::BAD_REQUEST, false)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn maps_http_statuses_to_expected_errors(#[case] status: StatusCode, #[case] timeout: bool) {
        let error = map_status_error(status, br#"{"error": "bad features"}"#);
        if timeout {
            assert!(matches!(error, ScoringEngineError::Timeout { .. }));
        } else {
            assert!(matches!(error, ScoringEngineError::Status { .. }));
        }
    }

    #[test]
    fn status_message_includes_a_compact_body_preview() {
        let error = map_status_error(
            StatusCode::BAD_REQUEST,
            b"{\n  \"error\": \"sqft
  must be numeric\"\n}",
        );
        let ScoringEngineError::Status { message } = error else {
            panic!("expected status error");
        };
        assert!(message.starts_with("status 400:"));
        assert!(message.contains("must be numeric"));
        assert!(!message.contains('\n'));
    }

    #[test]
    fn long_bodies_are_truncated_in_the_preview() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= 163);
    }
}
