use super::prompt::AdvisorPrompt;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Hosted language-model backend answering chat questions.
#[async_trait]
pub trait RemoteAdvisor: Send + Sync + std::fmt::Debug {
    async fn reply(&self, prompt: &AdvisorPrompt, query: &str) -> Result<String, RemoteAdvisorError>;

    fn provider_name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    Network,
    Auth,
    RateLimited,
    Unknown,
}

impl RemoteErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteErrorKind::Auth,
            StatusCode::TOO_MANY_REQUESTS => RemoteErrorKind::RateLimited,
            status if status.is_server_error() => RemoteErrorKind::Network,
            _ => RemoteErrorKind::Unknown,
        }
    }
}

impl std::fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RemoteErrorKind::Network => "network",
            RemoteErrorKind::Auth => "auth",
            RemoteErrorKind::RateLimited => "rate_limited",
            RemoteErrorKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{provider} advisor {kind} error: {message}")]
pub struct RemoteAdvisorError {
    pub provider: &'static str,
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteAdvisorError {
    pub fn new(provider: &'static str, kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn transport(provider: &'static str, err: reqwest::Error) -> Self {
        let kind = match err.status() {
            Some(status) => RemoteErrorKind::from_status(status),
            None if err.is_decode() => RemoteErrorKind::Unknown,
            None => RemoteErrorKind::Network,
        };
        Self::new(provider, kind, err.to_string())
    }
}

/// Sends a prepared request and returns the decoded JSON body of a 2xx reply.
pub(crate) async fn send_json(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, RemoteAdvisorError> {
    let response = request
        .send()
        .await
        .map_err(|err| RemoteAdvisorError::transport(provider, err))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RemoteAdvisorError::new(
            provider,
            RemoteErrorKind::from_status(status),
            format!("HTTP {}: {}", status.as_u16(), error_message(&body)),
        ));
    }

    response
        .json::<serde_json::Value>()
        .await
        .map_err(|err| {
            RemoteAdvisorError::new(
                provider,
                RemoteErrorKind::Unknown,
                format!("failed to parse response: {err}"),
            )
        })
}

// Both providers wrap failures as {"error": {"message": ...}}.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "request failed".to_string()
            } else {
                body.trim().to_string()
            }
        })
}
