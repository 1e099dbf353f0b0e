//! Error types for the stream-alerts crate.

use thiserror::Error;

/// Errors that can occur while queueing, presenting or configuring alerts.
#[derive(Debug, Error)]
pub enum AlertError {
    /// The recipient identifier is not usable.
    #[error("invalid recipient: {reason}")]
    InvalidRecipient {
        /// The reason the recipient is invalid.
        reason: String,
    },

    /// The event record has no `summary` field.
    #[error("event record {id} has no summary")]
    MissingSummary {
        /// The event record identifier, or `unknown`.
        id: String,
    },

    /// The attribute store rejected an operation.
    #[error("attribute store error: {reason}")]
    Store {
        /// The reason the store operation failed.
        reason: String,
    },

    /// Reading or writing the backing file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The anti-forgery token did not verify.
    #[error("invalid nonce for action '{action}'")]
    InvalidNonce {
        /// The action the token was checked against.
        action: String,
    },

    /// No channel is registered under the slug.
    #[error("channel not found: {slug}")]
    ChannelNotFound {
        /// The slug that was looked up.
        slug: String,
    },

    /// A channel with the same slug is already registered.
    #[error("channel already registered: {slug}")]
    DuplicateChannel {
        /// The conflicting slug.
        slug: String,
    },

    /// Stored channel settings could not be interpreted.
    #[error("invalid settings: {reason}")]
    InvalidSettings {
        /// The reason the settings are invalid.
        reason: String,
    },
}

impl From<serde_json::Error> for AlertError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Result type for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_recipient() {
        let err = AlertError::InvalidRecipient {
            reason: "empty identifier".to_string(),
        };
        assert_eq!(err.to_string(), "invalid recipient: empty identifier");
    }

    #[test]
    fn error_display_missing_summary() {
        let err = AlertError::MissingSummary {
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "event record 42 has no summary");
    }

    #[test]
    fn error_display_store() {
        let err = AlertError::Store {
            reason: "backend offline".to_string(),
        };
        assert_eq!(err.to_string(), "attribute store error: backend offline");
    }

    #[test]
    fn error_display_invalid_nonce() {
        let err = AlertError::InvalidNonce {
            action: "save_post".to_string(),
        };
        assert_eq!(err.to_string(), "invalid nonce for action 'save_post'");
    }

    #[test]
    fn error_display_channel_not_found() {
        let err = AlertError::ChannelNotFound {
            slug: "sms".to_string(),
        };
        assert_eq!(err.to_string(), "channel not found: sms");
    }

    #[test]
    fn error_display_duplicate_channel() {
        let err = AlertError::DuplicateChannel {
            slug: "menu-alert".to_string(),
        };
        assert_eq!(err.to_string(), "channel already registered: menu-alert");
    }

    #[test]
    fn error_from_serde_json() {
        let json_err = serde_json::from_str::<String>("invalid json");
        assert!(json_err.is_err());
        let alert_err: AlertError = json_err.unwrap_err().into();
        assert!(matches!(alert_err, AlertError::SerializationError(_)));
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let alert_err: AlertError = io_err.into();
        assert!(matches!(alert_err, AlertError::Io(_)));
        assert!(alert_err.to_string().contains("gone"));
    }
}
