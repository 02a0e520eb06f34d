//! HTTP client for the queue protocol.
//!
//! Every request is a form-encoded POST to a single endpoint; the `task`
//! field selects the operation and the response body is plain text.
//!
//! ```text
//! JobController
//!     │
//!     └─> HttpQueueClient ───(HTTP POST)───> Queue Server
//!             device_id=1&task=req            "42"
//!             device_id=1&task=ack&id=42      (ignored)
//!             device_id=1&task=job_start&id=42 "OK"
//!             device_id=1&task=job_end&id=42   "OK"
//! ```
//!
//! # Design Principles
//!
//! - **No automatic retry**: the controller owns the retry cadence
//! - **No connection state**: each call stands alone
//! - **Failures are values**: transport errors are logged here and reported
//!   as `None`/`false` through [`QueueService`]
//!
//! # Timeout Handling
//!
//! Each request, including reading the body, is bounded by the configured
//! timeout (default: 3000ms).

use std::time::Duration;

use queuepost_core::constants::{
    ACK_TOKEN, FIELD_DEVICE_ID, FIELD_ID, FIELD_TASK, TASK_ACK, TASK_JOB_END, TASK_JOB_START,
    TASK_POLL,
};
use queuepost_core::{DeviceToken, JobId, StationConfig};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::service::QueueService;

/// Configuration for the HTTP queue client
///
/// # Example
///
/// ```
/// use queuepost_network::HttpQueueClientConfig;
/// use std::time::Duration;
///
/// let config = HttpQueueClientConfig {
///     server_url: "http://127.0.0.1:8080/queue".to_string(),
///     timeout: Duration::from_millis(1500),
///     ..HttpQueueClientConfig::default()
/// };
/// assert!(config.ack_receipt);
/// ```
#[derive(Debug, Clone)]
pub struct HttpQueueClientConfig {
    /// Endpoint every request is posted to
    pub server_url: String,

    /// Station identifier sent with every request
    pub device_id: DeviceToken,

    /// Timeout for one complete request
    pub timeout: Duration,

    /// Send a receipt acknowledgement after each successful poll
    pub ack_receipt: bool,
}

impl HttpQueueClientConfig {
    /// Take the network settings out of a station configuration.
    pub fn from_station(config: &StationConfig) -> Self {
        Self {
            server_url: config.server_url.clone(),
            device_id: config.device_id.clone(),
            timeout: config.request_timeout(),
            ack_receipt: config.ack_receipt,
        }
    }
}

impl Default for HttpQueueClientConfig {
    fn default() -> Self {
        Self::from_station(&StationConfig::default())
    }
}

/// Errors that can occur while talking to the queue server
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Request did not complete in time
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Connection, protocol or body read failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned status {0}")]
    Status(u16),

    /// Poll response did not carry a usable job id
    #[error("Invalid poll response: {0}")]
    InvalidResponse(#[from] queuepost_core::Error),
}

impl ClientError {
    /// Whether the server answered but had no job to hand out.
    ///
    /// Every other error means the server could not be reached or refused
    /// the request.
    pub fn is_empty_queue(&self) -> bool {
        matches!(self, Self::InvalidResponse(_))
    }
}

/// HTTP implementation of [`QueueService`]
///
/// # Example
///
/// ```no_run
/// use queuepost_network::{HttpQueueClient, HttpQueueClientConfig, QueueService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpQueueClient::new(HttpQueueClientConfig::default())?;
///
/// match client.poll_for_job().await {
///     Some(id) => println!("next ticket: {id}"),
///     None => println!("no ticket yet"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpQueueClient {
    http: reqwest::Client,
    server_url: String,
    device_id: DeviceToken,
    timeout: Duration,
    ack_receipt: bool,
}

impl HttpQueueClient {
    /// Create a client for the configured endpoint
    ///
    /// No connection is made until the first request.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Build` if the TLS backend cannot be initialized.
    pub fn new(config: HttpQueueClientConfig) -> Result<Self, ClientError> {
        debug!(
            server_url = %config.server_url,
            device_id = %config.device_id,
            "Creating queue client"
        );

        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            server_url: config.server_url,
            device_id: config.device_id,
            timeout: config.timeout,
            ack_receipt: config.ack_receipt,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Post one request and return the response body
    ///
    /// # Errors
    ///
    /// Returns an error if the request times out, the transport fails, or
    /// the server answers with a non-success status.
    pub async fn request(&self, task: &str, id: Option<&JobId>) -> Result<String, ClientError> {
        let mut form = vec![
            (FIELD_DEVICE_ID, self.device_id.as_str()),
            (FIELD_TASK, task),
        ];
        if let Some(id) = id {
            form.push((FIELD_ID, id.as_str()));
        }

        trace!(task, id = ?id.map(JobId::as_str), "Sending queue request");

        let exchange = async {
            let response = self.http.post(&self.server_url).form(&form).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ClientError::Status(status.as_u16()));
            }
            Ok::<_, ClientError>(response.text().await?)
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(body)) => {
                trace!(task, body_len = body.len(), "Received queue response");
                Ok(body)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ClientError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    /// Poll for a job id, keeping the error for callers that want it
    ///
    /// # Errors
    ///
    /// Returns the transport error, or `ClientError::InvalidResponse` when
    /// the body is blank.
    pub async fn try_poll(&self) -> Result<JobId, ClientError> {
        let body = self.request(TASK_POLL, None).await?;
        Ok(JobId::new(&body)?)
    }

    /// Confirm receipt of a polled job id
    ///
    /// The server's answer is not interpreted.
    pub async fn acknowledge_receipt(&self, id: &JobId) {
        match self.request(TASK_ACK, Some(id)).await {
            Ok(_) => trace!(%id, "Receipt acknowledged"),
            Err(e) => warn!(%id, error = %e, "Receipt acknowledgement failed"),
        }
    }

    async fn notify(&self, task: &str, id: &JobId) -> bool {
        match self.request(task, Some(id)).await {
            Ok(body) if body == ACK_TOKEN => {
                debug!(task, %id, "Notification acknowledged");
                true
            }
            Ok(body) => {
                warn!(task, %id, body = %body, "Notification not acknowledged");
                false
            }
            Err(e) => {
                warn!(task, %id, error = %e, "Notification failed");
                false
            }
        }
    }
}

impl QueueService for HttpQueueClient {
    async fn poll_for_job(&self) -> Option<JobId> {
        debug!("Trying to receive job id");
        match self.try_poll().await {
            Ok(id) => {
                info!(%id, "Received job id");
                if self.ack_receipt {
                    self.acknowledge_receipt(&id).await;
                }
                Some(id)
            }
            Err(e) if e.is_empty_queue() => {
                debug!(error = %e, "No job id received");
                None
            }
            Err(e) => {
                warn!(error = %e, "Job poll failed");
                None
            }
        }
    }

    async fn notify_job_start(&self, id: &JobId) -> bool {
        info!(%id, "Sending job start");
        self.notify(TASK_JOB_START, id).await
    }

    async fn notify_job_end(&self, id: &JobId) -> bool {
        info!(%id, "Sending job end");
        self.notify(TASK_JOB_END, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_station() {
        let station = StationConfig {
            server_url: "http://queue.local".to_string(),
            request_timeout_ms: 750,
            ack_receipt: false,
            ..StationConfig::default()
        };

        let config = HttpQueueClientConfig::from_station(&station);
        assert_eq!(config.server_url, "http://queue.local");
        assert_eq!(config.timeout, Duration::from_millis(750));
        assert!(!config.ack_receipt);
        assert_eq!(config.device_id.as_str(), "1");
    }

    #[test]
    fn test_client_creation() {
        let client = HttpQueueClient::new(HttpQueueClientConfig::default()).unwrap();
        assert_eq!(client.server_url(), "http://localhost");
    }

    #[test]
    fn test_only_blank_poll_counts_as_empty_queue() {
        let blank = JobId::new("  ").unwrap_err();
        assert!(ClientError::InvalidResponse(blank).is_empty_queue());

        assert!(!ClientError::Timeout(3000).is_empty_queue());
        assert!(!ClientError::Status(500).is_empty_queue());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ClientError::Timeout(3000).to_string(),
            "Request timeout after 3000ms"
        );
        assert_eq!(
            ClientError::Status(503).to_string(),
            "Server returned status 503"
        );
    }
}
