use std::{sync::Arc, time::Duration};
use tracing::instrument;

use crate::{
    chat::{ChatCompletionRequest, ChatCompletionResponse, Message},
    client::{Error as ClientError, OpenAIClient},
};

/// Model used when none is set on the builder.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

/// Per-request timeout used when none is set on the builder.
pub const DEFAULT_CHAT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for chat completion requests
#[derive(Clone)]
pub struct ChatBuilder {
    client: Arc<OpenAIClient>,
    model: String,
    pub messages: Vec<Message>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout: Duration,
}

impl ChatBuilder {
    /// Creates a new `ChatBuilder`.
    pub(crate) fn new(client: Arc<OpenAIClient>) -> Self {
        Self {
            client,
            model: DEFAULT_CHAT_MODEL.to_string(),
            messages: Vec::new(),
            max_tokens: None,
            temperature: None,
            timeout: DEFAULT_CHAT_TIMEOUT,
        }
    }

    /// Sets the model identifier, e.g. `gpt-4`.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Adds a system message to the conversation.
    pub fn with_system_message(mut self, text: impl Into<String>) -> Self {
        self.messages.push(Message::system(text));
        self
    }

    /// Adds a user message to the conversation.
    pub fn with_user_message(mut self, text: impl Into<String>) -> Self {
        self.messages.push(Message::user(text));
        self
    }

    /// Caps the number of generated tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets how long to wait for the whole request before giving up.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the `ChatCompletionRequest`.
    pub fn build(self) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model,
            messages: self.messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Executes the chat completion request.
    #[instrument(skip_all, fields(
        model = %self.model,
        messages.count = self.messages.len(),
        timeout.secs = self.timeout.as_secs(),
    ))]
    pub async fn execute(self) -> Result<ChatCompletionResponse, ClientError> {
        let client = self.client.clone();
        let timeout = self.timeout;
        let request = self.build();
        client.create_chat_completion(&request, timeout).await
    }
}
