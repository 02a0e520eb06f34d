//! Queue protocol contract consumed by the station controller.

#![allow(async_fn_in_trait)]

use queuepost_core::JobId;

/// The three queue-protocol operations, with failures folded into the
/// return value.
///
/// Implementations log transport problems themselves; callers only see
/// whether the operation succeeded. There is no retry queue: a lost
/// notification is reported as `false` and the caller decides how to
/// surface it.
///
/// Like the hardware traits, this uses native `async fn` and is consumed
/// through generic parameters.
pub trait QueueService {
    /// Ask the server for the next ticket.
    ///
    /// Returns `None` when no ticket could be obtained for any reason.
    async fn poll_for_job(&self) -> Option<JobId>;

    /// Report that the operator started serving `id`.
    ///
    /// Returns `true` only if the server acknowledged the notification.
    async fn notify_job_start(&self, id: &JobId) -> bool;

    /// Report that the operator finished serving `id`.
    ///
    /// Returns `true` only if the server acknowledged the notification.
    async fn notify_job_end(&self, id: &JobId) -> bool;
}
