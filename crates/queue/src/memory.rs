//! In-memory alert store.
//!
//! Insertion-ordered and safe for concurrent callers. Primarily used by
//! tests as a stand-in for a real backing store.

use async_trait::async_trait;
use courier_core::AlertRecord;
use tokio::sync::Mutex;

use crate::error::QueueError;
use crate::store::AlertStore;

/// Alert queue held in a single insertion-ordered vector.
#[derive(Debug, Default)]
pub struct MemoryAlertStore {
    alerts: Mutex<Vec<AlertRecord>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of pending alerts across all groups.
    pub async fn len(&self) -> usize {
        self.alerts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.alerts.lock().await.is_empty()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn enqueue(&self, alert: AlertRecord) -> Result<(), QueueError> {
        self.alerts.lock().await.push(alert);
        Ok(())
    }

    async fn fetch(&self, groups: &[String]) -> Result<Vec<AlertRecord>, QueueError> {
        let mut queue = self.alerts.lock().await;
        let (matched, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut *queue)
            .into_iter()
            .partition(|alert| groups.contains(&alert.group));
        *queue = rest;
        Ok(matched)
    }

    async fn requeue(&self, alerts: Vec<AlertRecord>) -> Result<(), QueueError> {
        self.alerts.lock().await.extend(alerts);
        Ok(())
    }

    async fn pending(&self, group: &str) -> Result<usize, QueueError> {
        Ok(self
            .alerts
            .lock()
            .await
            .iter()
            .filter(|alert| alert.group == group)
            .count())
    }
}
