//! Completion endpoint adapter (Groq's OpenAI-compatible chat API).

use std::env;

use serde::{Deserialize, Serialize};

use crate::{
    infra::config::GroqConfig,
    portal::http::HttpRunner,
    usecases::chat_turn::{CompletionClient, CompletionError, RequestMessage},
};

const API_KEY_ENV: &str = "GROQ_API_KEY";

pub struct GroqCompletionClient {
    runner: HttpRunner,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GroqCompletionClient {
    pub fn new(config: &GroqConfig) -> Result<Self, CompletionError> {
        let runner = HttpRunner::new().map_err(|_| CompletionError::Network)?;

        Ok(Self {
            runner,
            endpoint: config.endpoint.clone(),
            api_key: resolve_api_key(&config.api_key),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request_body<'a>(&'a self, messages: &'a [RequestMessage]) -> CompletionRequest<'a> {
        CompletionRequest {
            messages: messages
                .iter()
                .map(|message| WireMessage {
                    role: message.role,
                    content: &message.content,
                })
                .collect(),
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl CompletionClient for GroqCompletionClient {
    fn complete(&self, messages: &[RequestMessage]) -> Result<String, CompletionError> {
        let body = self.request_body(messages);

        let response: CompletionResponse = self.runner.block_on(async {
            let response = self
                .runner
                .client()
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|_| CompletionError::Network)?;

            let status = response.status();
            if !status.is_success() {
                return Err(CompletionError::Http {
                    status: status.as_u16(),
                });
            }

            response
                .json::<CompletionResponse>()
                .await
                .map_err(|_| CompletionError::MalformedResponse)
        })?;

        extract_reply(response)
    }
}

fn resolve_api_key(configured: &str) -> String {
    if !configured.is_empty() {
        return configured.to_owned();
    }

    env::var(API_KEY_ENV).unwrap_or_default()
}

/// The reply is the first choice's message content.
fn extract_reply(response: CompletionResponse) -> Result<String, CompletionError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(CompletionError::MalformedResponse)
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    messages: Vec<WireMessage<'a>>,
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}
