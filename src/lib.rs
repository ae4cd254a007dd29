//! # openai-probe
//!
//! A connectivity smoke test for the OpenAI API.
//!
//! The check validates the `OPENAI_API_KEY` credential, then sends one request each to
//! the chat completion endpoint, the image generation endpoint and the chat completion
//! endpoint again with `gpt-4`. The first failure short-circuits the run.

mod chat;
mod checker;
mod client;
mod credential;
mod images;
mod probe;
mod report;

pub mod prelude;


pub use chat::{
    ChatBuilder, ChatCompletionRequest, ChatCompletionResponse, Choice, Message,
    ResponseMessage, Role, Usage,
};
pub use checker::{ConnectivityChecker, Stage};
pub use client::{Error as ClientError, OpenAI};
pub use credential::{ApiKey, Error as CredentialError, API_KEY_ENV, API_KEY_PREFIX};
pub use images::{
    ImageBuilder, ImageData, ImageGenerationRequest, ImageGenerationResponse, ImageSize,
    ResponseFormat,
};
pub use probe::{Error as ProbeError, Messages as ProbeMessages, Probe, ProbeKind, Step};
