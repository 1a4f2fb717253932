//! Registration-time URL checks.
//!
//! A candidate is accepted when it parses as an absolute `http`/`https` URL
//! whose host resolves within the configured timeout. The accepted value is
//! the caller's string exactly as given; nothing is normalized.

mod resolver;

pub use resolver::{DnsResolver, HostResolver, StaticResolver};

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::{Host, Url};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed url")]
    Malformed,
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),
    #[error("unresolvable host: {0}")]
    UnresolvableHost(String),
}

/// A URL that passed validation, holding the original input unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl(String);

impl ValidatedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for ValidatedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub struct Validator {
    resolver: Arc<dyn HostResolver>,
    lookup_timeout: Duration,
}

impl Validator {
    pub fn new(resolver: Arc<dyn HostResolver>, lookup_timeout: Duration) -> Self {
        Self {
            resolver,
            lookup_timeout,
        }
    }

    pub async fn validate(&self, candidate: &str) -> Result<ValidatedUrl, ValidationError> {
        let parsed = Url::parse(candidate).map_err(|_| ValidationError::Malformed)?;

        // The parser lowercases schemes, so this compare is case-insensitive
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
        }

        match parsed.host() {
            Some(Host::Domain(domain)) => self.check_resolvable(domain).await?,
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {}
            None => return Err(ValidationError::Malformed),
        }

        Ok(ValidatedUrl(candidate.to_string()))
    }

    async fn check_resolvable(&self, host: &str) -> Result<(), ValidationError> {
        match tokio::time::timeout(self.lookup_timeout, self.resolver.resolve(host)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                tracing::debug!(host, error = %err, "host lookup failed");
                Err(ValidationError::UnresolvableHost(host.to_string()))
            }
            Err(_) => {
                tracing::debug!(
                    host,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "host lookup timed out"
                );
                Err(ValidationError::UnresolvableHost(host.to_string()))
            }
        }
    }
}
