use super::prompt::AdvisorPrompt;
use super::remote::{send_json, RemoteAdvisor, RemoteAdvisorError, RemoteErrorKind};
use crate::config::ApiKey;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const PROVIDER: &str = "openai";

/// Chat-completions backend.
#[derive(Debug, Clone)]
pub struct OpenAiAdvisor {
    client: reqwest::Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl OpenAiAdvisor {
    pub fn new(
        api_key: ApiKey,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteAdvisorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RemoteAdvisorError::transport(PROVIDER, err))?;

        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, prompt: &AdvisorPrompt, query: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": query },
            ],
            "temperature": 0.7,
            "max_tokens": 200,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl RemoteAdvisor for OpenAiAdvisor {
    async fn reply(&self, prompt: &AdvisorPrompt, query: &str) -> Result<String, RemoteAdvisorError> {
        let request = self
            .client
            .post(self.chat_completions_url())
            .bearer_auth(self.api_key.expose())
            .json(&self.build_request(prompt, query));
        let body = send_json(PROVIDER, request).await?;

        let response: CompletionResponse = serde_json::from_value(body).map_err(|err| {
            RemoteAdvisorError::new(
                PROVIDER,
                RemoteErrorKind::Unknown,
                format!("unexpected response shape: {err}"),
            )
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                RemoteAdvisorError::new(PROVIDER, RemoteErrorKind::Unknown, "no content in response")
            })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
