//! Assistant Client
//!
//! Drives one conversation with the remote drafting assistant: create a
//! thread, post the assembled payload, start a run, poll it until it ends and
//! read back the assistant's reply.

pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::AssistantConfig;
use crate::types::AssistantError;

pub use openai::OpenAIAssistants;

/// Status of a run as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    Other(String),
}

impl RunStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "requires_action" => RunStatus::RequiresAction,
            "cancelling" => RunStatus::Cancelling,
            "cancelled" => RunStatus::Cancelled,
            "failed" => RunStatus::Failed,
            "completed" => RunStatus::Completed,
            "incomplete" => RunStatus::Incomplete,
            "expired" => RunStatus::Expired,
            other => RunStatus::Other(other.to_string()),
        }
    }

    /// Still worth polling. Unknown statuses are treated as pending.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling | RunStatus::Other(_)
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Other(s) => s,
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub role: String,
    pub text: String,
}

impl ThreadMessage {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
        }
    }
}

/// The remote conversational-assistant protocol.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn create_thread(&self) -> Result<String, AssistantError>;

    async fn post_message(&self, thread_id: &str, content: &str) -> Result<(), AssistantError>;

    /// Returns the run id.
    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<String, AssistantError>;

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, AssistantError>;

    /// Messages of the thread, newest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, AssistantError>;
}

pub struct AssistantClient {
    backend: Arc<dyn AssistantBackend>,
    assistant_id: String,
    poll_interval: Duration,
    timeout: Duration,
}

impl AssistantClient {
    pub fn new(
        backend: Arc<dyn AssistantBackend>,
        assistant_id: impl Into<String>,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            assistant_id: assistant_id.into(),
            poll_interval,
            timeout,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(
            Arc::new(OpenAIAssistants::new(&config.api_key, &config.base_url)),
            config.assistant_id.clone(),
            config.poll_interval(),
            config.timeout(),
        )
    }

    /// Reply text, or a bracketed placeholder describing what went wrong.
    pub async fn ask(&self, payload: &str) -> String {
        self.ask_with_cancel(payload, &CancellationToken::new()).await
    }

    pub async fn ask_with_cancel(&self, payload: &str, cancel: &CancellationToken) -> String {
        match self.try_ask(payload, cancel).await {
            Ok(reply) => reply,
            Err(AssistantError::NoReply) => "[response not found]".to_string(),
            Err(e) => {
                error!(error = %e, "Assistant request failed");
                format!("[error interacting with assistant: {}]", e)
            }
        }
    }

    /// Bounded by the configured timeout and by `cancel`, whichever fires
    /// first.
    pub async fn try_ask(&self, payload: &str, cancel: &CancellationToken) -> Result<String, AssistantError> {
        info!(payload_len = payload.len(), assistant_id = %self.assistant_id, "Sending payload to assistant");

        tokio::select! {
            _ = cancel.cancelled() => Err(AssistantError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, self.converse(payload)) => match outcome {
                Ok(result) => result,
                Err(_) => Err(AssistantError::Timeout(self.timeout)),
            },
        }
    }

    async fn converse(&self, payload: &str) -> Result<String, AssistantError> {
        let thread_id = self.backend.create_thread().await?;
        self.backend.post_message(&thread_id, payload).await?;
        let run_id = self.backend.start_run(&thread_id, &self.assistant_id).await?;
        debug!(%thread_id, %run_id, "Run started");

        self.wait_for_run(&thread_id, &run_id).await?;

        let messages = self.backend.list_messages(&thread_id).await?;
        let reply = latest_reply(&messages).ok_or(AssistantError::NoReply)?;
        info!(reply_len = reply.len(), "Assistant replied");
        Ok(reply)
    }

    async fn wait_for_run(&self, thread_id: &str, run_id: &str) -> Result<(), AssistantError> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let status = self.backend.run_status(thread_id, run_id).await?;
            match status {
                RunStatus::Completed => return Ok(()),
                ref s if s.is_pending() => debug!(%run_id, status = %s, "Run pending"),
                s => return Err(AssistantError::RunFailed { status: s.to_string() }),
            }
        }
    }
}

/// Text of the newest message authored by the assistant.
fn latest_reply(messages: &[ThreadMessage]) -> Option<String> {
    messages
        .iter()
        .find(|m| m.role == "assistant")
        .map(|m| m.text.clone())
}
