use axum::http::StatusCode;
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use utoipa::ToSchema;

use super::models::{BackendErrorBody, DiscoveryRequest, DiscoveryResponse};
use super::validation::{QueryValidationError, SearchQuery};
use crate::error::{ErrorResponse, HttpError};
use crate::telemetry::{DISCOVERY_DURATION, DISCOVERY_REQUESTS};

const DISCOVER_PATH: &str = "/api/discover";

/// Coarse classification of a failed discovery call, ordered from the most
/// local failure to the least understood one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Validation,
    Unavailable,
    Backend,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Backend => "backend",
            ErrorKind::Unknown => "unknown",
        }
    }
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Rejected locally; nothing was sent
    #[error(transparent)]
    Validation(#[from] QueryValidationError),

    /// The backend process could not be reached (refused, DNS, timeout)
    #[error("Cannot connect to backend at {base_url}. Make sure the backend server is running.")]
    Unavailable {
        base_url: String,
        hint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status
    #[error("{message}")]
    Backend {
        status: u16,
        message: String,
        body: BackendErrorBody,
    },

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl DiscoveryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiscoveryError::Validation(_) => ErrorKind::Validation,
            DiscoveryError::Unavailable { .. } => ErrorKind::Unavailable,
            DiscoveryError::Backend { .. } => ErrorKind::Backend,
            DiscoveryError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Text shown inline to the user. Unavailable errors carry their remediation hint.
    pub fn user_message(&self) -> String {
        match self {
            DiscoveryError::Unavailable { hint, .. } => format!("{}\n\n{}", self, hint),
            other => other.to_string(),
        }
    }
}

impl HttpError for DiscoveryError {
    fn status_code(&self) -> StatusCode {
        match self {
            DiscoveryError::Validation(_) => StatusCode::BAD_REQUEST,
            DiscoveryError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            DiscoveryError::Backend { .. } | DiscoveryError::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            DiscoveryError::Validation(QueryValidationError::Missing) => Some("QUERY_MISSING"),
            DiscoveryError::Validation(_) => Some("QUERY_INVALID"),
            DiscoveryError::Unavailable { .. } => Some("BACKEND_UNAVAILABLE"),
            DiscoveryError::Backend { .. } => Some("BACKEND_ERROR"),
            DiscoveryError::Unknown(_) => None,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            DiscoveryError::Validation(e) => ErrorResponse::new(e.to_string()),
            DiscoveryError::Unavailable { hint, .. } => {
                ErrorResponse::new("Backend server not available")
                    .with_detail(self.to_string())
                    .with_hint(hint.clone())
            }
            DiscoveryError::Backend { status, body, .. } => {
                let detail = BackendErrorBody {
                    hint: None,
                    ..body.clone()
                }
                .compose_message(&backend_fallback(*status));
                let response = ErrorResponse::new("Failed to fetch hidden gems").with_detail(detail);
                match &body.hint {
                    Some(hint) => response.with_hint(hint.clone()),
                    None => response,
                }
            }
            DiscoveryError::Unknown(message) => {
                ErrorResponse::new("Failed to fetch hidden gems").with_detail(message.clone())
            }
        }
    }
}

crate::impl_into_response!(DiscoveryError);

fn backend_fallback(status: u16) -> String {
    format!("Backend request failed (HTTP {})", status)
}

/// Client for the backend's discovery endpoint.
///
/// Every call is independent: no retries, no de-duplication of overlapping calls.
pub struct DiscoveryClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    unavailable_hint: String,
}

impl DiscoveryClient {
    pub fn new(
        client: Client,
        base_url: &str,
        timeout: Duration,
        unavailable_hint: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            unavailable_hint: unavailable_hint.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validate `query` and run one discovery call against the backend
    pub async fn discover(&self, query: &str) -> Result<DiscoveryResponse, DiscoveryError> {
        let query = match SearchQuery::parse(query) {
            Ok(query) => query,
            Err(e) => {
                record_outcome("validation");
                return Err(e.into());
            }
        };
        self.discover_validated(&query).await
    }

    /// Run one discovery call for an already validated query
    pub async fn discover_validated(
        &self,
        query: &SearchQuery,
    ) -> Result<DiscoveryResponse, DiscoveryError> {
        let started = Instant::now();
        let result = self.send(query).await;
        metrics::histogram!(DISCOVERY_DURATION).record(started.elapsed().as_secs_f64());

        match &result {
            Ok(response) if response.is_empty() => record_outcome("empty"),
            Ok(_) => record_outcome("ok"),
            Err(e) => record_outcome(e.kind().as_str()),
        }

        result
    }

    async fn send(&self, query: &SearchQuery) -> Result<DiscoveryResponse, DiscoveryError> {
        let url = format!("{}{}", self.base_url, DISCOVER_PATH);
        tracing::debug!(url = %url, query_len = query.as_str().len(), "Sending discovery request");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&DiscoveryRequest::new(query.as_str()))
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        tracing::debug!(status = %status, "Received discovery response");

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify_transport(e))?;

        if !status.is_success() {
            // The body may be empty or not JSON at all
            let body: BackendErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            let message = body.compose_message(&backend_fallback(status.as_u16()));
            tracing::warn!(status = %status, error = %message, "Discovery backend returned an error");
            return Err(DiscoveryError::Backend {
                status: status.as_u16(),
                message,
                body,
            });
        }

        let data: DiscoveryResponse = serde_json::from_slice(&bytes)
            .map_err(|e| DiscoveryError::Unknown(format!("Invalid discovery response: {}", e)))?;

        tracing::info!(
            gems = data.gems.len(),
            processing_time = data.processing_time,
            "Discovery completed"
        );

        Ok(data)
    }

    fn classify_transport(&self, err: reqwest::Error) -> DiscoveryError {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            tracing::error!(base_url = %self.base_url, error = %err, "Discovery backend unreachable");
            DiscoveryError::Unavailable {
                base_url: self.base_url.clone(),
                hint: self.unavailable_hint.clone(),
                source: err,
            }
        } else {
            DiscoveryError::Unknown(err.to_string())
        }
    }
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!(DISCOVERY_REQUESTS, "outcome" => outcome).increment(1);
}
