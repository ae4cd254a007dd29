//! # Prelude for the openai-probe crate
//!
//! Re-exports the types most callers need:
//!
//! ```rust,ignore
//! use openai_probe::prelude::*;
//! ```

pub use crate::checker::{ConnectivityChecker, Stage};
pub use crate::client::{Error as ClientError, OpenAI};
pub use crate::credential::{ApiKey, Error as CredentialError};
pub use crate::probe::{Probe, Step};
