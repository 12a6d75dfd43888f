use super::composer::{AdvisorContext, NarrativeComposer};
use super::intent::Intent;
use super::prompt::AdvisorPrompt;
use super::remote::{RemoteAdvisor, RemoteAdvisorError, RemoteErrorKind};
use crate::limiter::{Admission, Clock, LimitDecision, LimiterStore, RequestLimiter, SystemClock};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("chat query must not be empty")]
    EmptyQuery,
    #[error("chat session id must not be blank")]
    EmptySession,
    #[error(transparent)]
    Remote(#[from] RemoteAdvisorError),
}

/// Who produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplySource {
    RuleBased,
    Remote { provider: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub source: ReplySource,
    pub intent: Intent,
    /// Why the remote advisor was bypassed, when it was configured but failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<RemoteErrorKind>,
    /// Session standing after this request was counted.
    pub limit: LimitDecision,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Answered(ChatReply),
    Throttled(LimitDecision),
}

/// Chat front door: gates each question through the limiter, asks the remote
/// advisor when one is configured and falls back to the rule-based composer.
pub struct ChatAdvisor<S: ?Sized = dyn LimiterStore, C = SystemClock> {
    limiter: Arc<RequestLimiter<S, C>>,
    remote: Option<Arc<dyn RemoteAdvisor>>,
    composer: NarrativeComposer,
}

impl<S, C> ChatAdvisor<S, C>
where
    S: LimiterStore + ?Sized,
    C: Clock,
{
    pub fn new(limiter: Arc<RequestLimiter<S, C>>, remote: Option<Arc<dyn RemoteAdvisor>>) -> Self {
        Self {
            limiter,
            remote,
            composer: NarrativeComposer::new(),
        }
    }

    pub fn limiter(&self) -> &RequestLimiter<S, C> {
        &self.limiter
    }

    pub fn remote_provider(&self) -> Option<&'static str> {
        self.remote.as_ref().map(|remote| remote.provider_name())
    }

    /// Current standing of a session without consuming quota.
    pub fn session_limit(&self, session_id: &str) -> LimitDecision {
        self.limiter.peek(&limiter_key(session_id))
    }

    pub fn reset_session(&self, session_id: &str) {
        self.limiter.reset(&limiter_key(session_id));
    }

    pub async fn ask(
        &self,
        session_id: &str,
        query: &str,
        context: &AdvisorContext<'_>,
    ) -> Result<ChatOutcome, AdvisorError> {
        if session_id.trim().is_empty() {
            return Err(AdvisorError::EmptySession);
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(AdvisorError::EmptyQuery);
        }

        let limit = match self.limiter.check_and_record(&limiter_key(session_id)) {
            Admission::Admitted(decision) => decision,
            Admission::Denied(decision) => {
                info!(session_id, summary = %decision.summary(), "chat request throttled");
                return Ok(ChatOutcome::Throttled(decision));
            }
        };

        let intent = Intent::classify(query);

        let mut fallback = None;
        if let Some(remote) = &self.remote {
            let prompt = AdvisorPrompt::for_context(context);
            match remote.reply(&prompt, query).await {
                Ok(text) => {
                    return Ok(ChatOutcome::Answered(ChatReply {
                        text,
                        source: ReplySource::Remote {
                            provider: remote.provider_name(),
                        },
                        intent,
                        fallback: None,
                        limit,
                    }))
                }
                Err(err) => {
                    warn!(
                        session_id,
                        provider = err.provider,
                        kind = %err.kind,
                        error = %err.message,
                        "remote advisor failed; answering from rules"
                    );
                    fallback = Some(err.kind);
                }
            }
        }

        Ok(ChatOutcome::Answered(ChatReply {
            text: self.composer.explain(intent, context),
            source: ReplySource::RuleBased,
            intent,
            fallback,
            limit,
        }))
    }
}

fn limiter_key(session_id: &str) -> String {
    format!("chat:{session_id}")
}
