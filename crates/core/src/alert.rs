use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique alert identifier within the queue.
pub type AlertId = Uuid;

/// One pending alert, produced upstream and consumed by a dispatch rule.
///
/// Immutable once fetched. Identity is the store-assigned `id`, and a
/// requeued alert must carry the exact same id and content so a retry run
/// neither duplicates nor loses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: AlertId,
    /// Logical channel the alert belongs to; rules select by group.
    pub group: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// Open key-value payload attached by the producer.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl AlertRecord {
    /// Create an alert in `group` with a fresh id and the current time.
    pub fn new(group: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            group: group.into(),
            timestamp: Utc::now(),
            message: message.into(),
            data: Map::new(),
        }
    }

    /// Attach payload data to the alert.
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_alert_has_empty_data() {
        let alert = AlertRecord::new("g1", "disk almost full");
        assert_eq!(alert.group, "g1");
        assert_eq!(alert.message, "disk almost full");
        assert!(alert.data.is_empty());
    }

    #[test]
    fn serde_roundtrip_preserves_identity() {
        let mut data = Map::new();
        data.insert("host".to_string(), Value::String("web-01".to_string()));
        let alert = AlertRecord::new("g1", "cpu spike").with_data(data);

        let json = serde_json::to_string(&alert).unwrap();
        let back: AlertRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(alert, back);
    }

    #[test]
    fn data_field_defaults_when_absent() {
        let json = format!(
            r#"{{"id":"{}","group":"g1","timestamp":"2026-01-01T00:00:00Z","message":"m"}}"#,
            Uuid::new_v4()
        );
        let alert: AlertRecord = serde_json::from_str(&json).unwrap();
        assert!(alert.data.is_empty());
    }
}
