//! File-backed alert store.
//!
//! One JSON-encoded alert per line. Good enough for a single-host worker;
//! anything shared between hosts belongs in a real backing store behind
//! the same trait. A missing file means an empty queue.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use courier_core::AlertRecord;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::QueueError;
use crate::store::AlertStore;

/// Alert queue persisted as a JSON-lines file.
#[derive(Debug)]
pub struct FileAlertStore {
    path: PathBuf,
    /// Serializes all file access; the file is rewritten whole on fetch.
    lock: Mutex<()>,
}

impl FileAlertStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<AlertRecord>, QueueError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| QueueError::Serialize(e.to_string()))
            })
            .collect()
    }

    /// Rewrite the queue file through a sibling temp file and an atomic
    /// rename, so a failed write never leaves a truncated queue behind.
    fn save(&self, alerts: &[AlertRecord]) -> Result<(), QueueError> {
        let mut out = String::new();
        for alert in alerts {
            out.push_str(
                &serde_json::to_string(alert).map_err(|e| QueueError::Serialize(e.to_string()))?,
            );
            out.push('\n');
        }

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(out.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .map_err(|e| QueueError::Io(e.error))?;
        Ok(())
    }
}

#[async_trait]
impl AlertStore for FileAlertStore {
    async fn enqueue(&self, alert: AlertRecord) -> Result<(), QueueError> {
        let _guard = self.lock.lock().await;
        let mut alerts = self.load()?;
        alerts.push(alert);
        self.save(&alerts)
    }

    async fn fetch(&self, groups: &[String]) -> Result<Vec<AlertRecord>, QueueError> {
        let _guard = self.lock.lock().await;
        let (matched, rest): (Vec<_>, Vec<_>) = self
            .load()?
            .into_iter()
            .partition(|alert| groups.contains(&alert.group));

        if !matched.is_empty() {
            self.save(&rest)?;
            debug!(path = %self.path.display(), fetched = matched.len(), "alerts fetched");
        }
        Ok(matched)
    }

    async fn requeue(&self, alerts: Vec<AlertRecord>) -> Result<(), QueueError> {
        if alerts.is_empty() {
            return Ok(());
        }
        let _guard = self.lock.lock().await;
        // Serialize the whole batch before touching the file so a bad
        // record cannot leave a partial requeue behind.
        let mut existing = self.load()?;
        let count = alerts.len();
        existing.extend(alerts);
        self.save(&existing)?;
        debug!(path = %self.path.display(), requeued = count, "alerts requeued");
        Ok(())
    }

    async fn pending(&self, group: &str) -> Result<usize, QueueError> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load()?
            .iter()
            .filter(|alert| alert.group == group)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn store_in(dir: &tempfile::TempDir) -> FileAlertStore {
        FileAlertStore::new(dir.path().join("alerts.jsonl"))
    }

    #[tokio::test]
    async fn missing_file_is_empty_queue() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.fetch(&groups(&["g1"])).await.unwrap().is_empty());
        assert_eq!(store.pending("g1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn fetch_removes_only_selected_groups_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.enqueue(AlertRecord::new("g1", "a")).await.unwrap();
        store.enqueue(AlertRecord::new("g2", "b")).await.unwrap();
        store.enqueue(AlertRecord::new("g1", "c")).await.unwrap();

        let fetched = store.fetch(&groups(&["g1"])).await.unwrap();
        assert_eq!(fetched.len(), 2);

        // Reopen from disk: only g2 remains.
        let reopened = FileAlertStore::new(store.path());
        assert_eq!(reopened.pending("g1").await.unwrap(), 0);
        assert_eq!(reopened.pending("g2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn requeue_round_trip_preserves_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut data = serde_json::Map::new();
        data.insert("k".to_string(), serde_json::Value::String("v".to_string()));
        store
            .enqueue(AlertRecord::new("g1", "m").with_data(data))
            .await
            .unwrap();

        let fetched = store.fetch(&groups(&["g1"])).await.unwrap();
        store.requeue(fetched.clone()).await.unwrap();

        let again = store.fetch(&groups(&["g1"])).await.unwrap();
        assert_eq!(again, fetched);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_rewrite_leaves_the_queue_file_intact() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.enqueue(AlertRecord::new("g1", "a")).await.unwrap();
        store.enqueue(AlertRecord::new("g2", "b")).await.unwrap();

        // A read-only directory makes the sibling temp file unwritable,
        // so the rewrite fails before the queue file is touched.
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o555)).unwrap();
        if std::fs::File::create(dir.path().join("writable_check")).is_ok() {
            // Permission bits are not enforced for this user (e.g. root);
            // the failure cannot be simulated here.
            std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let err = store.fetch(&groups(&["g1"])).await.unwrap_err();
        assert!(matches!(err, QueueError::Io(_)));

        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        // Nothing was lost, the fetched group included.
        assert_eq!(store.pending("g1").await.unwrap(), 1);
        assert_eq!(store.pending("g2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn corrupt_line_is_a_serialize_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.jsonl");
        std::fs::write(&path, "not json\n").unwrap();

        let store = FileAlertStore::new(&path);
        let err = store.fetch(&groups(&["g1"])).await.unwrap_err();
        assert!(matches!(err, QueueError::Serialize(_)));
    }
}
