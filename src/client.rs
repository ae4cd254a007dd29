use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use snafu::{ResultExt, Snafu};
use std::{sync::Arc, time::Duration};
use tracing::{debug, instrument};
use url::Url;

use crate::{
    chat::{ChatBuilder, ChatCompletionRequest, ChatCompletionResponse},
    credential::ApiKey,
    images::{ImageBuilder, ImageGenerationRequest, ImageGenerationResponse},
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to build HTTP client"))]
    BuildHttpClient { source: reqwest::Error },

    #[snafu(display("failed to construct URL (probably incorrect base URL or endpoint '{suffix}')"))]
    ConstructUrl {
        source: url::ParseError,
        suffix: String,
    },

    #[snafu(display("failed to perform request to '{url}'"))]
    PerformRequest { source: reqwest::Error, url: Url },

    #[snafu(display("bad response from server; code {code}; body: {body}"))]
    BadResponse {
        /// HTTP status code
        code: u16,
        /// Raw response body
        body: String,
    },

    #[snafu(display("failed to obtain response body from '{url}'"))]
    DecodeResponse { source: reqwest::Error, url: Url },

    #[snafu(display("failed to deserialize JSON response"))]
    Deserialize { source: serde_json::Error },
}

/// Internal client for making requests to the OpenAI API
#[derive(Debug)]
pub(crate) struct OpenAIClient {
    http_client: Client,
    api_key: ApiKey,
    base_url: Url,
}

impl OpenAIClient {
    /// Create a new client with custom base URL
    fn with_base_url(api_key: ApiKey, base_url: Url) -> Result<Self, Error> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context(BuildHttpClientSnafu)?;

        Ok(Self {
            http_client,
            api_key,
            base_url,
        })
    }

    /// Create a chat completion
    pub(crate) async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
        timeout: Duration,
    ) -> Result<ChatCompletionResponse, Error> {
        self.post_json("chat/completions", request, timeout).await
    }

    /// Generate images from a prompt
    pub(crate) async fn create_image(
        &self,
        request: &ImageGenerationRequest,
        timeout: Duration,
    ) -> Result<ImageGenerationResponse, Error> {
        self.post_json("images/generations", request, timeout).await
    }

    /// Post JSON to an endpoint and decode the reply.
    ///
    /// Only `200 OK` counts as success; any other status is returned as
    /// [`Error::BadResponse`] carrying the raw body.
    #[instrument(skip_all, fields(endpoint = endpoint, timeout.secs = timeout.as_secs()))]
    async fn post_json<Req, Resp>(
        &self,
        endpoint: &str,
        request: &Req,
        timeout: Duration,
    ) -> Result<Resp, Error>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = self.build_url(endpoint)?;

        let response = self
            .http_client
            .post(url.clone())
            .bearer_auth(self.api_key.expose())
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .context(PerformRequestSnafu { url: url.clone() })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context(DecodeResponseSnafu { url })?;
        debug!(status = status.as_u16(), body.len = body.len(), "response received");

        if status != StatusCode::OK {
            return BadResponseSnafu {
                code: status.as_u16(),
                body,
            }
            .fail();
        }

        serde_json::from_str(&body).context(DeserializeSnafu)
    }

    /// Build a URL for the API
    fn build_url(&self, endpoint: &str) -> Result<Url, Error> {
        self.base_url.join(endpoint).context(ConstructUrlSnafu {
            suffix: endpoint.to_string(),
        })
    }
}

/// Client for the OpenAI API
#[derive(Clone, Debug)]
pub struct OpenAI {
    pub(crate) client: Arc<OpenAIClient>,
}

impl OpenAI {
    /// Create a new client for `https://api.openai.com/v1/`
    pub fn new(api_key: ApiKey) -> Result<Self, Error> {
        let base_url = Url::parse(DEFAULT_BASE_URL).context(ConstructUrlSnafu {
            suffix: DEFAULT_BASE_URL.to_string(),
        })?;
        Self::with_base_url(api_key, base_url)
    }

    /// Create a new client with custom base URL
    ///
    /// Endpoints are joined onto the base URL, so it should end with a `/`.
    pub fn with_base_url(api_key: ApiKey, base_url: Url) -> Result<Self, Error> {
        let client = OpenAIClient::with_base_url(api_key, base_url)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Start building a chat completion request
    pub fn chat_completion(&self) -> ChatBuilder {
        ChatBuilder::new(self.client.clone())
    }

    /// Start building an image generation request
    pub fn generate_image(&self) -> ImageBuilder {
        ImageBuilder::new(self.client.clone())
    }
}
