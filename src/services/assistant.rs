//! Assistant orchestration: gate, retrieve, compose, complete, log, respond.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::{
    estimate_tokens, AssistantConfig, ChatMessage, ContextChunk, LessonId, NewStudentQuestion,
    RetrievalConfig, UserId,
};
use crate::domain::ports::{
    ChunkStore, CompletionProvider, EmbeddingProvider, ProfileProvider, QuestionLog,
};
use crate::services::prompt::{self, PROFILE_UNAVAILABLE};
use crate::services::retriever::ContextRetriever;
use crate::services::usage_gate::UsageGate;

/// Failures surfaced to whoever asked the question.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("AI assistant is unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    BadInput(String),

    #[error("Daily question limit reached ({limit})")]
    QuotaExceeded { limit: u32 },

    #[error("Failed to generate response. Please try again.")]
    GenerationFailed(#[source] DomainError),

    #[error("Storage error: {0}")]
    Storage(#[from] DomainError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub lesson_id: Option<LessonId>,
}

impl AskRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            lesson_id: None,
        }
    }

    pub fn for_lesson(mut self, lesson_id: LessonId) -> Self {
        self.lesson_id = Some(lesson_id);
        self
    }
}

/// A retrieved chunk as echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// `CODE - Title`
    pub lesson: String,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub reply: String,
    pub sources: Vec<Source>,
    /// Questions asked today, including this one
    pub usage_today: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    pub questions_today: u32,
    pub daily_limit: u32,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// End-to-end handling of one question
///
/// Each call runs a linear pipeline with no retries. Retrieval and profile
/// failures degrade to empty blocks; completion failure ends the request
/// without writing a log row.
pub struct AssistantService {
    store: Arc<dyn ChunkStore>,
    retriever: ContextRetriever,
    completer: Arc<dyn CompletionProvider>,
    profiles: Arc<dyn ProfileProvider>,
    log: Arc<dyn QuestionLog>,
    gate: UsageGate,
    assistant: AssistantConfig,
    retrieval: RetrievalConfig,
}

impl AssistantService {
    pub fn new(
        store: Arc<dyn ChunkStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        completer: Arc<dyn CompletionProvider>,
        profiles: Arc<dyn ProfileProvider>,
        log: Arc<dyn QuestionLog>,
        assistant: AssistantConfig,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            retriever: ContextRetriever::new(embedder, store.clone()),
            gate: UsageGate::new(log.clone()),
            store,
            completer,
            profiles,
            log,
            assistant,
            retrieval,
        }
    }

    pub fn daily_limit(&self) -> u32 {
        self.assistant.daily_question_limit
    }

    /// Why questions cannot be answered right now, if they cannot.
    pub fn unavailable_reason(&self) -> Option<String> {
        self.store.unavailable_reason()
    }

    pub async fn ask(
        &self,
        user_id: UserId,
        request: AskRequest,
    ) -> Result<AskResponse, AssistantError> {
        let span = tracing::info_span!("ask", request_id = %Uuid::new_v4(), user_id);
        self.ask_inner(user_id, request).instrument(span).await
    }

    async fn ask_inner(
        &self,
        user_id: UserId,
        request: AskRequest,
    ) -> Result<AskResponse, AssistantError> {
        if let Some(reason) = self.unavailable_reason() {
            return Err(AssistantError::ServiceUnavailable(reason));
        }

        let message = request.message.trim();
        if message.is_empty() {
            return Err(AssistantError::BadInput("Message is required".to_string()));
        }

        let today = UsageGate::today();
        let limit = self.daily_limit();
        let admission = self.gate.check_and_admit(user_id, limit, today).await?;
        if !admission.allowed {
            info!(used = admission.used, limit, "daily question limit reached");
            return Err(AssistantError::QuotaExceeded { limit });
        }

        let chunks = match self
            .retriever
            .retrieve(message, request.lesson_id, self.retrieval.top_k)
            .await
        {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(error = %e, lesson_id = request.lesson_id, "context retrieval failed");
                Vec::new()
            }
        };

        let profile = match self.profiles.profile_summary(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "profile summary failed");
                PROFILE_UNAVAILABLE.to_string()
            }
        };

        let system = prompt::system_prompt(&profile, &prompt::format_context(&chunks));
        let tokens_in = estimate_tokens(&format!("{system}{message}"));
        let messages = [ChatMessage::system(system), ChatMessage::user(message)];

        let reply = self.completer.complete(&messages).await.map_err(|e| {
            warn!(error = %e, completer = self.completer.name(), "completion failed");
            AssistantError::GenerationFailed(e)
        })?;
        let tokens_out = estimate_tokens(&reply);

        self.log
            .record(
                NewStudentQuestion::new(user_id, message, reply.as_str())
                    .with_tokens(tokens_in, tokens_out),
            )
            .await?;

        info!(
            lesson_id = request.lesson_id,
            chunks = chunks.len(),
            tokens_in,
            tokens_out,
            "question answered"
        );

        Ok(AskResponse {
            reply,
            sources: self.sources(&chunks),
            usage_today: admission.used + 1,
        })
    }

    pub async fn usage(&self, user_id: UserId) -> Result<UsageReport, AssistantError> {
        let daily_limit = self.daily_limit();
        if let Some(reason) = self.unavailable_reason() {
            return Ok(UsageReport {
                questions_today: 0,
                daily_limit,
                available: false,
                message: Some(format!("AI assistant is unavailable: {reason}")),
            });
        }

        let questions_today = self.gate.count_today(user_id).await?;
        Ok(UsageReport {
            questions_today,
            daily_limit,
            available: true,
            message: None,
        })
    }

    fn sources(&self, chunks: &[ContextChunk]) -> Vec<Source> {
        chunks
            .iter()
            .map(|chunk| Source {
                lesson: chunk.lesson_label(),
                excerpt: prompt::excerpt(&chunk.content, self.retrieval.excerpt_chars),
            })
            .collect()
    }
}
