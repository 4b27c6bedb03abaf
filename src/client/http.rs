use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::consts::{CONTRACT_HEADER, CONTRACT_VERSION, SIMULATE_PATH};
use crate::error::RequestError;
use crate::query::{FeasibilityResult, ScenarioQuery};

use super::{CallPhase, FeasibilityService};

/// Talks to the feasibility service over HTTP.
pub struct HttpClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("feasibility/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::with_client(http, base_url, timeout))
    }

    /// Use a preconfigured `reqwest::Client` (proxy, TLS, or test settings).
    pub fn with_client(http: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            http,
            endpoint: endpoint_for(base_url),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send the request and read the whole body. Dropping this future
    /// aborts the request and closes its connection.
    async fn exchange(&self, query: &ScenarioQuery) -> Result<FeasibilityResult, RequestError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .header(CONTRACT_HEADER, CONTRACT_VERSION.to_string())
            .json(&query.to_request())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = read_error_body(resp).await;
            return Err(RequestError::HttpStatus {
                code: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        FeasibilityResult::from_body(&body)
    }
}

#[async_trait]
impl FeasibilityService for HttpClient {
    async fn query(
        &self,
        query: &ScenarioQuery,
        cancel: &CancelToken,
    ) -> Result<FeasibilityResult, RequestError> {
        if cancel.is_cancelled() {
            return Err(RequestError::Cancelled);
        }

        debug!(endpoint = %self.endpoint, phase = %CallPhase::Sent, "sending scenario");

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RequestError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.exchange(query)) => {
                result.unwrap_or(Err(RequestError::Timeout(self.timeout)))
            }
        };

        let phase = CallPhase::settle(&outcome);
        match &outcome {
            Ok(result) => debug!(%phase, feasible = result.feasible, "call settled"),
            Err(err) => warn!(%phase, kind = %err.kind(), "call failed: {err}"),
        }
        outcome
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

async fn read_error_body(resp: reqwest::Response) -> String {
    let status = resp.status().as_u16();
    error_body(status, resp.text().await)
}

/// Body of a non-2xx response. An unreadable body is logged and reported as
/// empty so the status still reaches the caller.
fn error_body<E: std::fmt::Display>(status: u16, read: Result<String, E>) -> String {
    match read {
        Ok(body) => body,
        Err(e) => {
            warn!(status, "failed to read error response body: {e}");
            String::new()
        }
    }
}

/// `<base>/simulate/`, tolerating a trailing slash on the base.
fn endpoint_for(base_url: &str) -> String {
    format!("{}{}", base_url.trim().trim_end_matches('/'), SIMULATE_PATH)
}
