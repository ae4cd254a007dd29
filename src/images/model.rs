//! Request and response shapes for the `images/generations` endpoint.

use serde::{Deserialize, Serialize};

/// Output resolution of a generated image
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Square256,
    #[serde(rename = "512x512")]
    Square512,
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1792x1024")]
    Landscape1792,
    #[serde(rename = "1024x1792")]
    Portrait1792,
}

/// How the generated image is returned
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// A temporary hosted URL
    Url,
    /// Base64 encoded image bytes
    B64Json,
}

/// Request body for an image generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Response from the image generation endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub created: Option<i64>,
    pub data: Vec<ImageData>,
}

impl ImageGenerationResponse {
    /// URL of the first generated image, if it was returned as a URL.
    pub fn first_url(&self) -> Option<&str> {
        self.data.first()?.url.as_deref()
    }
}

/// A single generated image
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
    /// The prompt the model actually used (dall-e-3 only)
    #[serde(default)]
    pub revised_prompt: Option<String>,
}
