mod client;
mod response;
mod signal;

use std::{future::Future, sync::Arc};

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use client::WhoisXmlClient;
pub use signal::RegistrationAgeSignal;

/// Source of domain registration metadata.
pub trait RegistrationProvider: Send + Sync {
    fn creation_date(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<DateTime<Utc>, LookupError>> + Send;
}

impl<P: RegistrationProvider> RegistrationProvider for Arc<P> {
    fn creation_date(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<DateTime<Utc>, LookupError>> + Send {
        self.as_ref().creation_date(domain)
    }
}

/// Why a registration lookup produced no usable creation date.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("registration provider api key is not configured")]
    MissingCredentials,
    #[error("registration lookup timed out")]
    Timeout,
    #[error("registration provider returned HTTP {0}")]
    Status(u16),
    #[error("registration provider request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("registration provider reported an error: {0}")]
    Provider(String),
    #[error("registration response could not be decoded: {0}")]
    Decode(String),
    #[error("registration record has no creation date")]
    MissingCreationDate,
    #[error("unrecognized creation date {0:?}")]
    MalformedDate(String),
}

impl LookupError {
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::Transport(err)
        }
    }

    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            LookupError::Timeout | LookupError::Transport(_) => true,
            LookupError::Status(code) => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}
