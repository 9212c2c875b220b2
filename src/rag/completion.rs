use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CompletionConfig;

use super::{Message, MessageType, RagError};

const SERVICE: &str = "completion service";

/// Hosted language-model completion.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Answer `query`, grounding on `documents` when any were retrieved.
    async fn complete(
        &self,
        query: &str,
        history: &[Message],
        documents: &[String],
    ) -> Result<String, RagError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Azure OpenAI chat-completions deployment.
pub struct AzureOpenAiClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    system_prompt: String,
    timeout: Duration,
}

impl AzureOpenAiClient {
    pub fn new(config: &CompletionConfig, http: reqwest::Client) -> Self {
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            config.endpoint.trim_end_matches('/'),
            config.deployment,
            config.api_version
        );

        Self {
            http,
            url,
            api_key: config.api_key.clone(),
            system_prompt: config.system_prompt.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub(crate) fn build_messages(
        &self,
        query: &str,
        history: &[Message],
        documents: &[String],
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 3);
        messages.push(ChatMessage {
            role: "system",
            content: self.system_prompt.clone(),
        });

        if !documents.is_empty() {
            let context = documents
                .iter()
                .enumerate()
                .map(|(i, doc)| format!("[{}] {}", i + 1, doc))
                .collect::<Vec<_>>()
                .join("\n\n");
            messages.push(ChatMessage {
                role: "system",
                content: format!("Answer using the following documents:\n\n{}", context),
            });
        }

        for turn in history {
            let role = match turn.kind {
                MessageType::User => "user",
                MessageType::Assistant => "assistant",
            };
            messages.push(ChatMessage {
                role,
                content: turn.content.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user",
            content: query.to_string(),
        });
        messages
    }
}

#[async_trait]
impl CompletionBackend for AzureOpenAiClient {
    async fn complete(
        &self,
        query: &str,
        history: &[Message],
        documents: &[String],
    ) -> Result<String, RagError> {
        let messages = self.build_messages(query, history, documents);

        let response = self
            .http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&ChatCompletionRequest {
                messages: &messages,
            })
            .send()
            .await
            .map_err(RagError::http(SERVICE))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(RagError::http(SERVICE))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(RagError::EmptyResponse)
    }
}
