//! HTTP probes against product detail pages.

use async_trait::async_trait;
use reqwest::{redirect, Client, Method};
use thiserror::Error;

use crate::core::config::VerificationConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Request(String),
}

impl ProbeError {
    /// Timeouts and connection failures say the host is unreachable; a second
    /// request would only repeat the wait.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProbeError::Timeout | ProbeError::Connect(_))
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else if err.is_connect() {
            ProbeError::Connect(err.to_string())
        } else {
            ProbeError::Request(err.to_string())
        }
    }
}

/// Issues a single request and reports the final status code.
#[async_trait]
pub trait PageProbe: Send + Sync {
    /// Body-less existence check.
    async fn head(&self, url: &str) -> Result<u16, ProbeError>;

    /// Full fetch, used when the HEAD answer is not trustworthy.
    async fn get(&self, url: &str) -> Result<u16, ProbeError>;
}

#[derive(Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(config: &VerificationConfig) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ProbeError::Request(e.to_string()))?;
        Ok(Self { client })
    }

    async fn send(&self, method: Method, url: &str) -> Result<u16, ProbeError> {
        let response = self.client.request(method, url).send().await?;
        // Status is all we need; the body is dropped unread.
        Ok(response.status().as_u16())
    }
}

#[async_trait]
impl PageProbe for HttpProbe {
    async fn head(&self, url: &str) -> Result<u16, ProbeError> {
        self.send(Method::HEAD, url).await
    }

    async fn get(&self, url: &str) -> Result<u16, ProbeError> {
        self.send(Method::GET, url).await
    }
}
