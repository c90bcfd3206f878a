use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Address of the answering service when none is given on the command line.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

const ANSWER_PATH: &str = "/get_answer";
const STATUS_PATH: &str = "/status";

#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error("response is not valid JSON: {body}")]
    MalformedResponse { body: String },
    #[error("request failed: {} - {}", .status.as_u16(), .error.as_deref().unwrap_or("Unknown error"))]
    Status {
        status: StatusCode,
        error: Option<String>,
    },
    #[error("request timed out")]
    Timeout,
    #[error("request cancelled")]
    Cancelled,
    #[error(transparent)]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for AskError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AskError::Timeout
        } else {
            AskError::Transport(err)
        }
    }
}

/// Readiness report of the answering service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl ServiceStatus {
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

/// HTTP client for the answering service.
#[derive(Debug, Clone)]
pub struct AnswerClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnswerClient {
    /// Builds a client for `base_url`. `timeout` bounds every request.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, AskError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(AskError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts `question` as form data and returns the `answer` field.
    ///
    /// `Ok(None)` means the service answered successfully without a usable
    /// answer (missing, empty or not a string).
    pub async fn ask(&self, question: &str) -> Result<Option<String>, AskError> {
        let url = format!("{}{}", self.base_url, ANSWER_PATH);
        tracing::info!(%url, question, "sending question");
        let response = self
            .http
            .post(&url)
            .form(&[("question", question)])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "response received");
        let body = response.text().await?;
        tracing::debug!(body = %body, "response body");

        let data: Value = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(error = %err, "response is not JSON");
                return Err(AskError::MalformedResponse { body });
            }
        };

        if !status.is_success() {
            let error = non_empty_str(&data, "error");
            tracing::warn!(status = status.as_u16(), error = ?error, "service returned an error");
            return Err(AskError::Status { status, error });
        }

        Ok(non_empty_str(&data, "answer"))
    }

    /// Queries the readiness endpoint. A 503 still carries a status body.
    pub async fn status(&self) -> Result<ServiceStatus, AskError> {
        let url = format!("{}{}", self.base_url, STATUS_PATH);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<ServiceStatus>(&body) {
            Ok(report) => Ok(report),
            Err(_) if !status.is_success() => Err(AskError::Status {
                status,
                error: None,
            }),
            Err(_) => Err(AskError::MalformedResponse { body }),
        }
    }
}

fn non_empty_str(data: &Value, field: &str) -> Option<String> {
    data.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
