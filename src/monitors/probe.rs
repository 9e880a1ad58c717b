//! HTTP probing of monitored targets

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;

/// Reasons a probe could not obtain a status code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// No response within the request timeout
    Timeout(Duration),

    /// DNS, TCP or TLS failure
    Connect(String),

    /// Any other transport-level failure
    Request(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Timeout(timeout) => {
                write!(f, "timeout of {}ms exceeded", timeout.as_millis())
            }
            ProbeError::Connect(msg) => write!(f, "connection failed: {}", msg),
            ProbeError::Request(msg) => write!(f, "request failed: {}", msg),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Issues a GET against a url and reports the response status
#[async_trait]
pub trait Probe: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<u16, ProbeError>;
}

/// Whether a status code counts as the target being up
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Probe backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn get(&self, url: &str, timeout: Duration) -> Result<u16, ProbeError> {
        trace!("probing {url}");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        Ok(response.status().as_u16())
    }
}

fn classify(error: reqwest::Error, timeout: Duration) -> ProbeError {
    if error.is_timeout() {
        return ProbeError::Timeout(timeout);
    }

    // The top-level reqwest message is generic; the source chain names the actual cause.
    let mut message = error.to_string();
    let mut source = std::error::Error::source(&error);
    while let Some(cause) = source {
        message = format!("{message}: {cause}");
        source = std::error::Error::source(cause);
    }

    if error.is_connect() {
        ProbeError::Connect(message)
    } else {
        ProbeError::Request(message)
    }
}
