//! Chat explanations of the economic signals.
//!
//! [`NarrativeComposer`] is the offline explainer and always works. Remote
//! advisors are optional; any failure they report degrades to the composer.

mod composer;
mod gemini;
mod intent;
mod openai;
mod prompt;
mod remote;
mod service;

pub use composer::{format_currency, AdvisorContext, AdvisorSummary, Narrative, NarrativeComposer};
pub use gemini::GeminiAdvisor;
pub use intent::Intent;
pub use openai::OpenAiAdvisor;
pub use prompt::AdvisorPrompt;
pub use remote::{RemoteAdvisor, RemoteAdvisorError, RemoteErrorKind};
pub use service::{AdvisorError, ChatAdvisor, ChatOutcome, ChatReply, ReplySource};

use crate::config::{AdvisorConfig, AdvisorProvider};
use std::sync::Arc;

/// Builds the configured remote advisor, or `None` in local mode.
pub fn advisor_from_config(
    config: &AdvisorConfig,
) -> Result<Option<Arc<dyn RemoteAdvisor>>, AdvisorError> {
    match config.provider {
        AdvisorProvider::Local => Ok(None),
        AdvisorProvider::OpenAi => {
            let key = config.openai_api_key.clone().ok_or_else(|| {
                RemoteAdvisorError::new("openai", RemoteErrorKind::Auth, "OPENAI_API_KEY is not set")
            })?;
            let advisor = OpenAiAdvisor::new(
                key,
                config.openai_model.clone(),
                config.openai_base_url.clone(),
                config.timeout,
            )?;
            Ok(Some(Arc::new(advisor)))
        }
        AdvisorProvider::Gemini => {
            let key = config.gemini_api_key.clone().ok_or_else(|| {
                RemoteAdvisorError::new("gemini", RemoteErrorKind::Auth, "GEMINI_API_KEY is not set")
            })?;
            let advisor = GeminiAdvisor::new(
                key,
                config.gemini_model.clone(),
                config.gemini_base_url.clone(),
                config.timeout,
            )?;
            Ok(Some(Arc::new(advisor)))
        }
    }
}
