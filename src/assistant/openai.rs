// OpenAI Assistants (v2) backend
// Threads, messages and runs over the REST API:
// https://platform.openai.com/docs/api-reference/assistants

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{AssistantBackend, RunStatus, ThreadMessage};
use crate::types::AssistantError;

const ASSISTANTS_BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

pub struct OpenAIAssistants {
    client: Client,
    api_key: String,
    base_url: String,
}

// Request types
#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

// Response types
#[derive(Deserialize)]
struct ObjectId {
    id: String,
}

#[derive(Deserialize)]
struct RunObject {
    status: String,
    #[serde(default)]
    last_error: Option<RunError>,
}

#[derive(Deserialize)]
struct RunError {
    code: Option<String>,
    message: String,
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Deserialize)]
struct MessageObject {
    role: String,
    #[serde(default)]
    content: Vec<MessageContentPart>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum MessageContentPart {
    #[serde(rename = "text")]
    Text { text: TextContent },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct TextContent {
    value: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAIAssistants {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header(ASSISTANTS_BETA_HEADER.0, ASSISTANTS_BETA_HEADER.1)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AssistantError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| AssistantError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AssistantBackend for OpenAIAssistants {
    async fn create_thread(&self) -> Result<String, AssistantError> {
        let request = self
            .client
            .post(self.url("/threads"))
            .json(&serde_json::json!({}));
        let thread: ObjectId = self.send(request).await?;
        Ok(thread.id)
    }

    async fn post_message(&self, thread_id: &str, content: &str) -> Result<(), AssistantError> {
        let request = self
            .client
            .post(self.url(&format!("/threads/{}/messages", thread_id)))
            .json(&CreateMessageRequest { role: "user", content });
        let _: ObjectId = self.send(request).await?;
        Ok(())
    }

    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<String, AssistantError> {
        let request = self
            .client
            .post(self.url(&format!("/threads/{}/runs", thread_id)))
            .json(&CreateRunRequest { assistant_id });
        let run: ObjectId = self.send(request).await?;
        Ok(run.id)
    }

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, AssistantError> {
        let request = self
            .client
            .get(self.url(&format!("/threads/{}/runs/{}", thread_id, run_id)));
        let run: RunObject = self.send(request).await?;

        if let Some(last_error) = &run.last_error {
            warn!(
                %run_id,
                code = last_error.code.as_deref().unwrap_or("unknown"),
                message = %last_error.message,
                "Run reported an error"
            );
        }

        Ok(RunStatus::parse(&run.status))
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, AssistantError> {
        let request = self
            .client
            .get(self.url(&format!("/threads/{}/messages", thread_id)))
            .query(&[("order", "desc")]);
        let list: MessageList = self.send(request).await?;

        Ok(list
            .data
            .into_iter()
            .map(|message| {
                let text = message
                    .content
                    .into_iter()
                    .filter_map(|part| match part {
                        MessageContentPart::Text { text } => Some(text.value),
                        MessageContentPart::Other => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                ThreadMessage::new(message.role, text)
            })
            .collect())
    }
}
