//! Sequential connectivity check.
//!
//! The check validates the API key, then runs every probe of
//! [`Probe::standard_suite`] in order. The first failure ends the run, and the
//! remaining probes are never sent.
//!
//! ```rust,no_run
//! use openai_probe::ConnectivityChecker;
//!
//! # async fn example() {
//! let mut checker = ConnectivityChecker::new();
//! let passed = checker.run_from_env().await;
//! println!("stage: {:?}, passed: {passed}", checker.stage());
//! # }
//! ```

use display_error_chain::DisplayErrorChain;
use std::{
    env,
    io::{self, Stdout, Write},
};
use time::{macros::format_description, OffsetDateTime};
use tracing::{info, instrument, warn};
use url::Url;

use crate::{
    client::{Error as ClientError, OpenAI},
    credential::{self, ApiKey, API_KEY_ENV},
    probe::{self, Probe, Step},
    report::Console,
};

/// Progress of a check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    CredentialChecked,
    ChatProbed,
    ImageProbed,
    Gpt4Probed,
    Done,
    /// Terminal; `at` is the step that failed.
    Failed { at: Step },
}

impl Stage {
    fn after(step: Step) -> Self {
        match step {
            Step::Credential => Stage::CredentialChecked,
            Step::Chat => Stage::ChatProbed,
            Step::Image => Stage::ImageProbed,
            Step::Gpt4 => Stage::Gpt4Probed,
        }
    }
}

/// Runs the credential check and the endpoint probes, reporting to a writer.
pub struct ConnectivityChecker<W> {
    console: Console<W>,
    base_url: Option<Url>,
    stage: Stage,
}

impl ConnectivityChecker<Stdout> {
    /// Creates a checker that reports to standard output.
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for ConnectivityChecker<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConnectivityChecker<W> {
    /// Creates a checker that reports to `out`.
    pub fn with_writer(out: W) -> Self {
        Self {
            console: Console::new(out),
            base_url: None,
            stage: Stage::Init,
        }
    }

    /// Sends probes to `base_url` instead of the public OpenAI endpoint.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Consumes the checker and returns the report writer.
    pub fn into_writer(self) -> W {
        self.console.into_inner()
    }

    /// Runs the full check with the key from [`API_KEY_ENV`].
    pub async fn run_from_env(&mut self) -> bool {
        self.run(env::var(API_KEY_ENV).ok()).await
    }

    /// Runs the full check. Returns `true` only if every step passed.
    #[instrument(skip_all)]
    pub async fn run(&mut self, raw_key: Option<String>) -> bool {
        self.console.line(format_args!("OpenAI API Test Script"));
        self.console.rule();

        let Some(api_key) = self.check_credential(raw_key) else {
            self.console.blank();
            self.console
                .line(format_args!("Please set your OpenAI API key and try again."));
            return false;
        };

        self.probe_endpoints(&api_key).await
    }

    /// Validates the key and reports the outcome. No request is sent.
    pub fn check_credential(&mut self, raw_key: Option<String>) -> Option<ApiKey> {
        match ApiKey::parse(raw_key) {
            Ok(api_key) => {
                self.console
                    .line(format_args!("✅ API key found: {}", api_key.preview()));
                self.stage = Stage::after(Step::Credential);
                Some(api_key)
            }
            Err(error) => {
                warn!(%error, "credential check failed");
                match error {
                    credential::Error::Missing => {
                        self.console.line(format_args!(
                            "❌ {API_KEY_ENV} environment variable not set!"
                        ));
                        self.console
                            .line(format_args!("Please set your OpenAI API key:"));
                        self.console.line(format_args!(
                            "export {API_KEY_ENV}='your-api-key-here'"
                        ));
                    }
                    credential::Error::InvalidFormat => {
                        self.console.line(format_args!(
                            "❌ Invalid API key format! Should start with '{}'",
                            credential::API_KEY_PREFIX
                        ));
                    }
                }
                self.stage = Stage::Failed {
                    at: Step::Credential,
                };
                None
            }
        }
    }

    /// Runs every probe in order, stopping at the first failure.
    pub async fn probe_endpoints(&mut self, api_key: &ApiKey) -> bool {
        self.console
            .line(format_args!("🔍 Testing OpenAI API Connectivity..."));
        self.console.rule();

        let client = match self.client(api_key) {
            Ok(client) => client,
            Err(error) => {
                self.console.line(format_args!(
                    "❌ Connection error: {}",
                    DisplayErrorChain::new(&error)
                ));
                self.stage = Stage::Failed { at: Step::Chat };
                return false;
            }
        };

        for probe in Probe::standard_suite() {
            if !self.run_probe(&client, &probe).await {
                return false;
            }
        }

        self.console.blank();
        self.console.rule();
        self.console
            .line(format_args!("🎉 All OpenAI API tests passed!"));
        self.console
            .line(format_args!("Test completed at: {}", completion_timestamp()));
        self.stage = Stage::Done;
        info!("all probes passed");
        true
    }

    async fn run_probe(&mut self, client: &OpenAI, probe: &Probe) -> bool {
        let messages = probe.messages;
        self.console.blank();
        self.console
            .line(format_args!("{}. {}...", probe.number, messages.title));

        match probe.execute(client).await {
            Ok(value) => {
                self.console.line(format_args!("✅ {}", messages.success));
                self.console
                    .line(format_args!("{}: {value}", messages.field_label));
                self.stage = Stage::after(probe.step);
                true
            }
            Err(error) => {
                warn!(step = ?probe.step, error = %DisplayErrorChain::new(&error), "probe failed");
                match &error {
                    probe::Error::Client {
                        source: ClientError::BadResponse { code, body },
                    } => {
                        self.console.line(format_args!(
                            "❌ {} Status code: {code}",
                            messages.failure
                        ));
                        self.console.line(format_args!("Error: {body}"));
                    }
                    _ => {
                        self.console.line(format_args!(
                            "❌ {}: {}",
                            messages.transport_failure,
                            DisplayErrorChain::new(&error)
                        ));
                    }
                }
                self.stage = Stage::Failed { at: probe.step };
                false
            }
        }
    }

    fn client(&self, api_key: &ApiKey) -> Result<OpenAI, ClientError> {
        match &self.base_url {
            Some(base_url) => OpenAI::with_base_url(api_key.clone(), base_url.clone()),
            None => OpenAI::new(api_key.clone()),
        }
    }
}

/// Local wall-clock time, falling back to UTC when the offset is unknown.
fn completion_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    now.format(format).unwrap_or_else(|_| now.to_string())
}
