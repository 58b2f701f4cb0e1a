//! Alert store trait.

use async_trait::async_trait;
use courier_core::AlertRecord;

use crate::error::QueueError;

/// Persistent queue of pending alerts, grouped by named channel.
///
/// Implementations handle the specifics of a particular backing store.
/// The dispatch pipeline only ever consumes this trait, so tests (and the
/// worker binary) can substitute in-memory or file-backed stores.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Append one alert to the queue (producer side).
    async fn enqueue(&self, alert: AlertRecord) -> Result<(), QueueError>;

    /// Return and atomically remove all pending alerts whose group is in
    /// `groups`, in insertion order. An empty result is valid and means
    /// there is nothing to dispatch.
    async fn fetch(&self, groups: &[String]) -> Result<Vec<AlertRecord>, QueueError>;

    /// Reinsert previously fetched alerts, preserving identity and
    /// content. All-or-nothing: either every alert is back in the queue
    /// or the call fails without touching it. This is the compensating
    /// action after a failed delivery.
    async fn requeue(&self, alerts: Vec<AlertRecord>) -> Result<(), QueueError>;

    /// Number of pending alerts in `group`.
    async fn pending(&self, group: &str) -> Result<usize, QueueError>;
}
