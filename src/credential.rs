//! API key loading and validation.
//!
//! The key is read once from the `OPENAI_API_KEY` environment variable and must
//! carry the `sk-` prefix before any request is attempted. [`ApiKey`] can only
//! be obtained through validation, so holding one is proof the check passed.

use snafu::{ensure, OptionExt, Snafu};
use std::{env, fmt, str::FromStr};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Literal prefix every OpenAI secret key starts with.
pub const API_KEY_PREFIX: &str = "sk-";

const PREVIEW_CHARS: usize = 9;

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum Error {
    #[snafu(display("OPENAI_API_KEY environment variable not set"))]
    Missing,

    #[snafu(display("invalid API key format; should start with 'sk-'"))]
    InvalidFormat,
}

/// A validated OpenAI API key.
///
/// `Debug` only ever shows the [preview](ApiKey::preview).
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Reads and validates the key from [`API_KEY_ENV`].
    ///
    /// A variable that is unset, empty or not valid unicode is reported as missing.
    pub fn from_env() -> Result<Self, Error> {
        Self::parse(env::var(API_KEY_ENV).ok())
    }

    /// Validates a raw key value.
    pub fn parse(raw: Option<String>) -> Result<Self, Error> {
        let raw = raw.filter(|value| !value.is_empty()).context(MissingSnafu)?;
        ensure!(raw.starts_with(API_KEY_PREFIX), InvalidFormatSnafu);
        Ok(Self(raw))
    }

    /// Returns the first few characters of the key followed by `...`.
    pub fn preview(&self) -> String {
        let head: String = self.0.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl FromStr for ApiKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(Some(s.to_string()))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.preview()).finish()
    }
}
