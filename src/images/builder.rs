use std::{sync::Arc, time::Duration};
use tracing::instrument;

use crate::{
    client::{Error as ClientError, OpenAIClient},
    images::{ImageGenerationRequest, ImageGenerationResponse, ImageSize, ResponseFormat},
};

/// Model used when none is set on the builder.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Image generation is slow, so the default timeout is twice the chat one.
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Builder for image generation requests
#[derive(Clone)]
pub struct ImageBuilder {
    client: Arc<OpenAIClient>,
    model: String,
    prompt: String,
    count: Option<u8>,
    size: Option<ImageSize>,
    response_format: Option<ResponseFormat>,
    timeout: Duration,
}

impl ImageBuilder {
    /// Creates a new `ImageBuilder`.
    pub(crate) fn new(client: Arc<OpenAIClient>) -> Self {
        Self {
            client,
            model: DEFAULT_IMAGE_MODEL.to_string(),
            prompt: String::new(),
            count: None,
            size: None,
            response_format: None,
            timeout: DEFAULT_IMAGE_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Number of images to generate. `dall-e-3` only accepts 1.
    pub fn with_count(mut self, count: u8) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = Some(response_format);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the `ImageGenerationRequest`.
    pub fn build(self) -> ImageGenerationRequest {
        ImageGenerationRequest {
            model: self.model,
            prompt: self.prompt,
            n: self.count,
            size: self.size,
            response_format: self.response_format,
        }
    }

    /// Executes the image generation request.
    #[instrument(skip_all, fields(
        model = %self.model,
        prompt.len = self.prompt.len(),
        timeout.secs = self.timeout.as_secs(),
    ))]
    pub async fn execute(self) -> Result<ImageGenerationResponse, ClientError> {
        let client = self.client.clone();
        let timeout = self.timeout;
        let request = self.build();
        client.create_image(&request, timeout).await
    }
}
