use super::prompt::AdvisorPrompt;
use super::remote::{send_json, RemoteAdvisor, RemoteAdvisorError, RemoteErrorKind};
use crate::config::ApiKey;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const PROVIDER: &str = "gemini";

/// `generateContent` backend.
#[derive(Debug, Clone)]
pub struct GeminiAdvisor {
    client: reqwest::Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl GeminiAdvisor {
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

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request(&self, prompt: &AdvisorPrompt, query: &str) -> serde_json::Value {
        serde_json::json!({
            "systemInstruction": { "parts": [{ "text": prompt.system }] },
            "contents": [
                { "role": "user", "parts": [{ "text": query }] },
            ],
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl RemoteAdvisor for GeminiAdvisor {
    async fn reply(&self, prompt: &AdvisorPrompt, query: &str) -> Result<String, RemoteAdvisorError> {
        let request = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&self.build_request(prompt, query));
        let body = send_json(PROVIDER, request).await?;

        let response: GenerateResponse = serde_json::from_value(body).map_err(|err| {
            RemoteAdvisorError::new(
                PROVIDER,
                RemoteErrorKind::Unknown,
                format!("unexpected response shape: {err}"),
            )
        })?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(RemoteAdvisorError::new(
                PROVIDER,
                RemoteErrorKind::Unknown,
                "no candidate text in response",
            ));
        }
        Ok(text.to_string())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_targets_the_configured_model() {
        let advisor = GeminiAdvisor::new(
            ApiKey::new("g-test"),
            "gemini-3-flash-preview",
            "https://generativelanguage.googleapis.com",
            Duration::from_secs(5),
        )
        .expect("client builds");
        assert_eq!(
            advisor.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );

        let body = advisor.build_request(
            &AdvisorPrompt {
                system: "ctx".to_string(),
            },
            "q",
        );
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "ctx");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "q");
    }
}
