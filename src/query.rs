//! Scenario queries, feasibility verdicts, and their wire shapes.
//!
//! Contract version 1 (see [`CONTRACT_VERSION`](crate::consts::CONTRACT_VERSION)):
//! the request carries the scenario under `user_prompt`, the response carries
//! the required results under `outcomes`. No other field names are accepted.

use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// A validated, trimmed scenario. Only exists for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioQuery {
    text: String,
}

impl ScenarioQuery {
    /// Trim `raw` and build a query. Returns `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The JSON request body for this query.
    pub fn to_request(&self) -> SimulateRequest<'_> {
        SimulateRequest {
            user_prompt: &self.text,
        }
    }
}

/// Request body for `POST /simulate/`.
#[derive(Debug, Serialize)]
pub struct SimulateRequest<'a> {
    pub user_prompt: &'a str,
}

/// One match and the result it needs for the scenario to hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(rename = "match")]
    pub fixture: String,
    pub result: String,
}

/// The service's verdict on a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityResult {
    pub feasible: bool,
    pub probability: f64,
    pub explanation: String,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixed_outcomes: Vec<Outcome>,
}

impl FeasibilityResult {
    /// Decode a 2xx response body.
    ///
    /// The service answers scenarios it cannot parse with `200` and an
    /// `{"error": "..."}` object; that is surfaced as [`RequestError::Malformed`]
    /// carrying the service's message.
    pub fn from_body(body: &str) -> Result<Self, RequestError> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| RequestError::Malformed(format!("invalid JSON: {e}")))?;

        if let Some(message) = value.get("error").and_then(|v| v.as_str())
            && value.get("feasible").is_none()
        {
            return Err(RequestError::Malformed(format!("service error: {message}")));
        }

        let result: FeasibilityResult =
            serde_json::from_value(value).map_err(|e| RequestError::Malformed(e.to_string()))?;
        result.validate()?;
        Ok(result)
    }

    fn validate(&self) -> Result<(), RequestError> {
        if !self.probability.is_finite() || !(0.0..=1.0).contains(&self.probability) {
            return Err(RequestError::Malformed(format!(
                "probability {} outside [0, 1]",
                self.probability
            )));
        }
        Ok(())
    }
}
