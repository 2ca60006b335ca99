use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;

use crate::engine::order::Order;
use crate::DynError;

/// Why a delivery attempt did not land. Both variants are recovered locally
/// in the consumer loop; neither is ever fatal.
#[derive(Debug)]
pub enum DeliveryError {
    /// The intake API answered with a non-success status.
    Status { code: u16, body: String },
    /// The request never completed (connect failure, timeout, DNS).
    Transport(reqwest::Error),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Status { code, body } => {
                write!(f, "status {code}: {body}")
            }
            DeliveryError::Transport(err) => write!(f, "transport: {err}"),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Seam for the external delivery call, so tests can inject failing or
/// recording sinks under the same consumer loop.
#[async_trait::async_trait]
pub trait OrderSink: Send + Sync {
    /// Deliver one order. At-most-once per attempt: the caller never retries
    /// the same order on failure.
    async fn deliver(&self, order: &Order) -> Result<(), DeliveryError>;
}

/// Delivers orders to the platform's order intake endpoint.
pub struct HttpOrderSink {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HttpOrderSink {
    pub fn new(endpoint: &str, token: &str, timeout: Duration) -> Result<Self, DynError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl OrderSink for HttpOrderSink {
    async fn deliver(&self, order: &Order) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Internal-Token", &self.token)
            .json(order)
            .send()
            .await
            .map_err(DeliveryError::Transport)?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            return Ok(());
        }

        // Body kept for the failure log line.
        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Status {
            code: status.as_u16(),
            body,
        })
    }
}
