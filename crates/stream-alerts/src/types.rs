//! Core types shared by the store, the channels and the presentation path.
//!
//! - [`RecipientId`]: the actor a pending notification belongs to
//! - [`EventRecord`]: the monitored event handed over by the dispatcher
//! - [`AlertOptions`]: per-rule options passed alongside an event
//! - [`AlertConfig`]: a configured alert and its channel meta

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{AlertError, Result};

/// Options attached to the rule that fired. Channels may ignore them.
pub type AlertOptions = Map<String, Value>;

/// Opaque identifier for a recipient, resolved by the host application.
///
/// Serialized as a plain string. Deserializing applies the same checks as
/// [`RecipientId::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipientId(String);

impl RecipientId {
    /// Maximum allowed length for recipient identifiers.
    pub const MAX_LENGTH: usize = 256;

    /// Creates a recipient identifier.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidRecipient` if the identifier is blank or too long.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AlertError::InvalidRecipient {
                reason: "identifier cannot be empty".to_string(),
            });
        }
        if id.len() > Self::MAX_LENGTH {
            return Err(AlertError::InvalidRecipient {
                reason: format!("identifier exceeds {} characters", Self::MAX_LENGTH),
            });
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecipientId {
    type Error = AlertError;

    fn try_from(id: String) -> Result<Self> {
        Self::new(id)
    }
}

impl From<RecipientId> for String {
    fn from(id: RecipientId) -> Self {
        id.0
    }
}

impl From<u64> for RecipientId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for RecipientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A monitored event as recorded by the activity log.
///
/// Only `summary` is required. Fields the log records but this crate does
/// not model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Record identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Human-readable description of what happened.
    pub summary: String,
    /// When the event was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// The connector that observed the event (e.g. `posts`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
    /// The context within the connector (e.g. `page`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// The action taken (e.g. `deleted`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// The acting user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    /// The object acted on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<u64>,
    /// Source IP address of the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Any other recorded fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventRecord {
    /// Creates a record with the given summary, stamped with the current time.
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            id: None,
            summary: summary.into(),
            created: Some(Utc::now()),
            connector: None,
            context: None,
            action: None,
            user_id: None,
            object_id: None,
            ip: None,
            extra: Map::new(),
        }
    }

    /// Sets the record identifier.
    #[must_use]
    pub const fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets connector, context and action in one go.
    #[must_use]
    pub fn with_origin(
        mut self,
        connector: impl Into<String>,
        context: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        self.connector = Some(connector.into());
        self.context = Some(context.into());
        self.action = Some(action.into());
        self
    }

    /// Sets the acting user.
    #[must_use]
    pub const fn with_user_id(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Parses a record from JSON.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::MissingSummary` if the object has no string
    /// `summary`, or `AlertError::SerializationError` for malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Converts a JSON value into a record.
    ///
    /// # Errors
    ///
    /// Same as [`EventRecord::from_json`].
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.get("summary").is_some_and(Value::is_string) {
            let id = value
                .get("id")
                .map_or_else(|| "unknown".to_string(), ToString::to_string);
            return Err(AlertError::MissingSummary { id });
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// A configured alert: which channel it uses and the channel's stored meta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Unique identifier for the alert.
    pub id: String,
    /// Slug of the channel that delivers this alert.
    pub alert_type: String,
    /// Channel-specific settings.
    #[serde(default)]
    pub alert_meta: Map<String, Value>,
}

impl AlertConfig {
    /// Creates an alert bound to the given channel slug, with empty meta.
    #[must_use]
    pub fn new(alert_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            alert_type: alert_type.into(),
            alert_meta: Map::new(),
        }
    }

    /// Sets a meta value.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.alert_meta.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod recipient_tests {
        use super::*;
        use test_case::test_case;

        #[test]
        fn create_recipient() {
            let id = RecipientId::new("u1").unwrap();
            assert_eq!(id.as_str(), "u1");
            assert_eq!(id.to_string(), "u1");
        }

        #[test_case("" ; "empty string")]
        #[test_case("   " ; "whitespace only")]
        fn blank_recipient_fails(raw: &str) {
            let result = RecipientId::new(raw);
            assert!(matches!(result, Err(AlertError::InvalidRecipient { .. })));
        }

        #[test]
        fn recipient_too_long_fails() {
            let raw = "x".repeat(RecipientId::MAX_LENGTH + 1);
            assert!(RecipientId::new(raw).is_err());
        }

        #[test]
        fn recipient_from_numeric_id() {
            let id = RecipientId::from(7_u64);
            assert_eq!(id.as_str(), "7");
        }

        #[test]
        fn recipient_serializes_as_string() {
            let id = RecipientId::new("admin").unwrap();
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, "\"admin\"");

            let parsed: RecipientId = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, id);
        }

        #[test_case("\"\"" ; "empty string")]
        #[test_case("\"  \"" ; "whitespace only")]
        fn blank_recipient_fails_to_deserialize(json: &str) {
            let result = serde_json::from_str::<RecipientId>(json);
            assert!(result.is_err());
        }

        #[test]
        fn blank_recipient_map_key_fails_to_deserialize() {
            let result =
                serde_json::from_str::<std::collections::BTreeMap<RecipientId, u8>>(r#"{"": 1}"#);
            assert!(result.is_err());
        }
    }

    mod event_record_tests {
        use super::*;

        #[test]
        fn create_record() {
            let record = EventRecord::new("Post X was deleted")
                .with_id(12)
                .with_origin("posts", "post", "deleted")
                .with_user_id(1);

            assert_eq!(record.summary, "Post X was deleted");
            assert_eq!(record.id, Some(12));
            assert_eq!(record.connector.as_deref(), Some("posts"));
            assert_eq!(record.action.as_deref(), Some("deleted"));
            assert!(record.created.is_some());
        }

        #[test]
        fn parse_record_with_extra_fields() {
            let json = r#"{"id": 3, "summary": "User logged in", "site_id": 1}"#;
            let record = EventRecord::from_json(json).unwrap();

            assert_eq!(record.id, Some(3));
            assert_eq!(record.summary, "User logged in");
            assert_eq!(record.extra.get("site_id"), Some(&Value::from(1)));
        }

        #[test]
        fn parse_record_without_summary_fails() {
            let result = EventRecord::from_json(r#"{"id": 9, "action": "updated"}"#);
            match result {
                Err(AlertError::MissingSummary { id }) => assert_eq!(id, "9"),
                other => panic!("expected MissingSummary, got {other:?}"),
            }
        }

        #[test]
        fn parse_record_with_non_string_summary_fails() {
            let result = EventRecord::from_json(r#"{"summary": 5}"#);
            assert!(matches!(result, Err(AlertError::MissingSummary { .. })));
        }

        #[test]
        fn parse_malformed_json_fails() {
            let result = EventRecord::from_json("{not json");
            assert!(matches!(result, Err(AlertError::SerializationError(_))));
        }
    }

    mod alert_config_tests {
        use super::*;

        #[test]
        fn create_alert_config() {
            let alert = AlertConfig::new("menu-alert");
            assert_eq!(alert.alert_type, "menu-alert");
            assert!(alert.alert_meta.is_empty());
            assert!(Uuid::parse_str(&alert.id).is_ok());
        }

        #[test]
        fn alert_config_ids_are_unique() {
            let a = AlertConfig::new("menu-alert");
            let b = AlertConfig::new("menu-alert");
            assert_ne!(a.id, b.id);
        }

        #[test]
        fn alert_config_with_meta() {
            let alert = AlertConfig::new("menu-alert").with_meta("clear_immediate", true);
            assert_eq!(
                alert.alert_meta.get("clear_immediate"),
                Some(&Value::Bool(true))
            );
        }

        #[test]
        fn alert_config_missing_meta_defaults_empty() {
            let json = r#"{"id": "a1", "alert_type": "none"}"#;
            let alert: AlertConfig = serde_json::from_str(json).unwrap();
            assert!(alert.alert_meta.is_empty());
        }
    }
}
