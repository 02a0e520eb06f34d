//! Queue server communication for the station.
//!
//! This crate provides the [`QueueService`] contract the station controller
//! depends on and [`HttpQueueClient`], its HTTP implementation.
//!
//! # Components
//!
//! - **QueueService**: poll for a job, report job start and job end. Results
//!   are plain values; transport failures never cross this boundary.
//! - **HttpQueueClient**: form-encoded POST requests with plain-text
//!   responses, built on `reqwest`.
//!
//! # Example
//!
//! ```no_run
//! use queuepost_core::StationConfig;
//! use queuepost_network::{HttpQueueClient, HttpQueueClientConfig, QueueService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpQueueClientConfig::from_station(&StationConfig::default());
//! let client = HttpQueueClient::new(config)?;
//!
//! if let Some(id) = client.poll_for_job().await {
//!     let acknowledged = client.notify_job_start(&id).await;
//!     println!("job {id} start acknowledged: {acknowledged}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod service;

pub use client::{ClientError, HttpQueueClient, HttpQueueClientConfig};
pub use service::QueueService;
