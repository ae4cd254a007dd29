//! The three fixed endpoint probes.
//!
//! Each [`Probe`] sends exactly one request and pulls one human-readable field
//! out of a `200 OK` reply. Anything else is an [`Error`].

use snafu::{OptionExt, ResultExt, Snafu};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    chat::{builder::DEFAULT_CHAT_TIMEOUT, ChatCompletionRequest, Message},
    client::{Error as ClientError, OpenAI},
    images::{builder::DEFAULT_IMAGE_TIMEOUT, ImageGenerationRequest, ImageSize, ResponseFormat},
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("client invocation error"))]
    Client { source: ClientError },

    #[snafu(display("response did not contain {field}"))]
    MissingField { field: &'static str },
}

/// Which step of the check a probe (or a failure) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Credential,
    Chat,
    Image,
    Gpt4,
}

/// Console wording for one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub title: &'static str,
    pub success: &'static str,
    /// Printed with the status code on a non-200 reply.
    pub failure: &'static str,
    /// Printed with the error chain on any other error.
    pub transport_failure: &'static str,
    /// Label of the field printed on success.
    pub field_label: &'static str,
}

/// The request a probe sends.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeKind {
    Chat(ChatCompletionRequest),
    Image(ImageGenerationRequest),
}

/// A single endpoint check.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    /// One-based position shown in the report.
    pub number: u8,
    pub step: Step,
    pub kind: ProbeKind,
    pub timeout: Duration,
    pub messages: Messages,
}

impl Probe {
    /// Chat completion against `gpt-3.5-turbo`.
    pub fn chat() -> Self {
        Self {
            number: 1,
            step: Step::Chat,
            kind: ProbeKind::Chat(ChatCompletionRequest {
                model: "gpt-3.5-turbo".to_string(),
                messages: vec![Message::user(
                    "Hello! Please respond with 'API is working' if you can see this message.",
                )],
                max_tokens: Some(50),
                temperature: None,
            }),
            timeout: DEFAULT_CHAT_TIMEOUT,
            messages: Messages {
                title: "Testing API Authentication",
                success: "Authentication successful!",
                failure: "Authentication failed!",
                transport_failure: "Connection error",
                field_label: "Response",
            },
        }
    }

    /// A single `dall-e-3` image returned as a URL.
    pub fn image() -> Self {
        Self {
            number: 2,
            step: Step::Image,
            kind: ProbeKind::Image(ImageGenerationRequest {
                model: "dall-e-3".to_string(),
                prompt: "A simple blue circle on a white background".to_string(),
                n: Some(1),
                size: Some(ImageSize::Square1024),
                response_format: Some(ResponseFormat::Url),
            }),
            timeout: DEFAULT_IMAGE_TIMEOUT,
            messages: Messages {
                title: "Testing DALL-E API",
                success: "DALL-E API working!",
                failure: "DALL-E API failed!",
                transport_failure: "DALL-E connection error",
                field_label: "Image URL",
            },
        }
    }

    /// Chat completion against `gpt-4`.
    pub fn gpt4() -> Self {
        Self {
            number: 3,
            step: Step::Gpt4,
            kind: ProbeKind::Chat(ChatCompletionRequest {
                model: "gpt-4".to_string(),
                messages: vec![Message::user("Say 'GPT-4 is working' in one sentence.")],
                max_tokens: Some(50),
                temperature: Some(0.3),
            }),
            timeout: DEFAULT_CHAT_TIMEOUT,
            messages: Messages {
                title: "Testing GPT-4 API",
                success: "GPT-4 API working!",
                failure: "GPT-4 API failed!",
                transport_failure: "GPT-4 connection error",
                field_label: "Response",
            },
        }
    }

    /// All probes, in the order they must run.
    pub fn standard_suite() -> [Self; 3] {
        [Self::chat(), Self::image(), Self::gpt4()]
    }

    /// Sends the probe request once and returns the success field.
    #[instrument(skip_all, fields(probe.number = self.number, probe.step = ?self.step))]
    pub async fn execute(&self, client: &OpenAI) -> Result<String, Error> {
        let value = match &self.kind {
            ProbeKind::Chat(request) => client
                .client
                .create_chat_completion(request, self.timeout)
                .await
                .context(ClientSnafu)?
                .first_content()
                .map(str::to_string)
                .context(MissingFieldSnafu {
                    field: "choices[0].message.content",
                })?,
            ProbeKind::Image(request) => client
                .client
                .create_image(request, self.timeout)
                .await
                .context(ClientSnafu)?
                .first_url()
                .map(str::to_string)
                .context(MissingFieldSnafu { field: "data[0].url" })?,
        };

        debug!("probe succeeded");
        Ok(value)
    }
}
