//! Channel settings: form descriptors, submissions and anti-forgery checks.
//!
//! Settings live in an alert's meta map. A channel describes its form as a
//! list of [`FormField`]s pre-filled from that map, and on submission writes
//! the submitted values back after the [`NonceVerifier`] accepts the token.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AlertError, Result};

/// Action the anti-forgery token is bound to.
pub const NONCE_ACTION: &str = "save_post";

/// Submission field carrying the anti-forgery token.
pub const NONCE_FIELD: &str = "wp_stream_alerts_nonce";

/// Form field name for the menu channel's `clear_immediate` checkbox.
pub const CLEAR_IMMEDIATE_FIELD: &str = "wp_stream_menu_alert_clear_immediate";

/// A field the host should render in the alert settings form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FormField {
    /// A single checkbox.
    Checkbox {
        /// Submission field name.
        name: String,
        /// Label next to the checkbox.
        text: String,
        /// Whether the box is checked.
        value: bool,
        /// Section title.
        title: String,
    },
}

impl FormField {
    /// Returns the submission field name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Checkbox { name, .. } => name,
        }
    }
}

/// Raw form fields posted back by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsSubmission {
    fields: HashMap<String, String>,
}

impl SettingsSubmission {
    /// Creates an empty submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Adds the anti-forgery token.
    #[must_use]
    pub fn with_nonce(self, token: impl Into<String>) -> Self {
        self.with_field(NONCE_FIELD, token)
    }

    /// Returns a field's raw value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Returns true if a checkbox field was submitted checked.
    ///
    /// Absent, empty and `"0"` values count as unchecked.
    #[must_use]
    pub fn is_checked(&self, name: &str) -> bool {
        self.field(name).is_some_and(|v| !v.is_empty() && v != "0")
    }
}

/// Verifies anti-forgery tokens.
pub trait NonceVerifier: Send + Sync + fmt::Debug {
    /// Returns true if `token` is valid for `action`.
    fn verify(&self, action: &str, token: &str) -> bool;
}

/// Accepts exactly one token for one action.
#[derive(Debug, Clone)]
pub struct StaticNonceVerifier {
    action: String,
    token: String,
}

impl StaticNonceVerifier {
    /// Creates a verifier accepting `token` for `action`.
    #[must_use]
    pub fn new(action: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            token: token.into(),
        }
    }
}

impl NonceVerifier for StaticNonceVerifier {
    fn verify(&self, action: &str, token: &str) -> bool {
        !token.is_empty() && action == self.action && token == self.token
    }
}

/// Checks the submission's anti-forgery token for [`NONCE_ACTION`].
///
/// # Errors
///
/// Returns `AlertError::InvalidNonce` if the token is missing or rejected.
pub fn verify_submission(
    verifier: &dyn NonceVerifier,
    submission: &SettingsSubmission,
) -> Result<()> {
    let token = submission.field(NONCE_FIELD).unwrap_or_default();
    if verifier.verify(NONCE_ACTION, token) {
        Ok(())
    } else {
        Err(AlertError::InvalidNonce {
            action: NONCE_ACTION.to_string(),
        })
    }
}

/// Stored settings of the menu channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuAlertSettings {
    /// Clear alerts once they have been seen.
    #[serde(default)]
    pub clear_immediate: bool,
}

impl MenuAlertSettings {
    /// Reads the settings from an alert's meta map, defaulting missing keys.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidSettings` if a known key has the wrong type.
    pub fn from_meta(meta: &Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(meta.clone())).map_err(|e| {
            AlertError::InvalidSettings {
                reason: e.to_string(),
            }
        })
    }

    /// Writes the settings into an alert's meta map, leaving other keys alone.
    pub fn write_to(&self, meta: &mut Map<String, Value>) {
        meta.insert("clear_immediate".to_string(), Value::Bool(self.clear_immediate));
    }

    /// Reads the settings from a submitted form.
    #[must_use]
    pub fn from_submission(submission: &SettingsSubmission) -> Self {
        Self {
            clear_immediate: submission.is_checked(CLEAR_IMMEDIATE_FIELD),
        }
    }

    /// Describes the settings form, pre-filled with these values.
    #[must_use]
    pub fn form(&self) -> Vec<FormField> {
        vec![FormField::Checkbox {
            name: CLEAR_IMMEDIATE_FIELD.to_string(),
            text: "Clear alerts after seen.".to_string(),
            value: self.clear_immediate,
            title: "Menu Bar".to_string(),
        }]
    }
}
