//! Alert delivery channels.
//!
//! This module provides the [`AlertChannel`] trait and its implementations.
//! The event dispatcher hands each matched event to the channel its alert is
//! configured with; channels are looked up by slug in a
//! [`ChannelRegistry`](crate::registry::ChannelRegistry).

use std::fmt;

use tracing::{debug, info};

use crate::error::Result;
use crate::menu::{MenuAlertConfig, Presentation};
use crate::pending::PendingNotifications;
use crate::settings::{
    FormField, MenuAlertSettings, NonceVerifier, SettingsSubmission, verify_submission,
};
use crate::store::AttributeStore;
use crate::types::{AlertConfig, AlertOptions, EventRecord, RecipientId};

/// Trait for alert delivery channels.
///
/// Implement this trait to deliver matched events some other way.
pub trait AlertChannel: Send + Sync + fmt::Debug {
    /// Returns the stable slug the channel is registered under.
    fn slug(&self) -> &str;

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Delivers a matched event.
    ///
    /// `recipient` is the actor the host resolved for the current request,
    /// if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel's backing store fails.
    fn alert(
        &self,
        recipient: Option<&RecipientId>,
        event_id: u64,
        record: &EventRecord,
        options: &AlertOptions,
    ) -> Result<()>;

    /// Describes the settings form for `alert`.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidSettings` if the stored meta is unusable.
    fn render_settings(&self, _alert: &AlertConfig) -> Result<Vec<FormField>> {
        Ok(Vec::new())
    }

    /// Validates a settings submission and stores it on `alert`.
    ///
    /// The anti-forgery token is checked before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidNonce` if the token is rejected.
    fn process_settings(
        &self,
        _alert: &mut AlertConfig,
        submission: &SettingsSubmission,
        verifier: &dyn NonceVerifier,
    ) -> Result<()> {
        verify_submission(verifier, submission)
    }
}

/// Queues event summaries for display in the recipient's notification menu.
#[derive(Debug)]
pub struct MenuAlertChannel<S> {
    queue: PendingNotifications<S>,
    config: MenuAlertConfig,
}

impl<S: AttributeStore> MenuAlertChannel<S> {
    /// Slug of the menu channel.
    pub const SLUG: &'static str = "menu-alert";

    /// Creates a menu channel over `store` with the default menu layout.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_config(store, MenuAlertConfig::default())
    }

    /// Creates a menu channel over `store` with a custom menu layout.
    #[must_use]
    pub fn with_config(store: S, config: MenuAlertConfig) -> Self {
        Self {
            queue: PendingNotifications::new(store),
            config,
        }
    }

    /// Returns the pending notification queue.
    #[must_use]
    pub const fn queue(&self) -> &PendingNotifications<S> {
        &self.queue
    }

    /// Returns the menu layout.
    #[must_use]
    pub const fn config(&self) -> &MenuAlertConfig {
        &self.config
    }

    /// Renders and clears the recipient's pending messages.
    ///
    /// When nothing is pending this returns [`Presentation::NotDisplayed`]
    /// without touching the store. Otherwise the messages are rendered and
    /// the queue is cleared.
    ///
    /// # Errors
    ///
    /// Propagates any error from the attribute store.
    pub fn present_and_clear(&self, recipient: Option<&RecipientId>) -> Result<Presentation> {
        let messages = self.queue.read(recipient)?;
        if messages.is_empty() {
            return Ok(Presentation::NotDisplayed);
        }

        let nodes = self.config.render(&messages);
        self.queue.clear(recipient, false)?;

        debug!(count = messages.len(), "presented pending menu alerts");
        Ok(Presentation::Displayed { nodes })
    }
}

impl<S: AttributeStore> AlertChannel for MenuAlertChannel<S> {
    fn slug(&self) -> &str {
        Self::SLUG
    }

    fn name(&self) -> &str {
        "Create Menu Alert"
    }

    fn alert(
        &self,
        recipient: Option<&RecipientId>,
        _event_id: u64,
        record: &EventRecord,
        _options: &AlertOptions,
    ) -> Result<()> {
        self.queue.append(recipient, &record.summary)
    }

    fn render_settings(&self, alert: &AlertConfig) -> Result<Vec<FormField>> {
        Ok(MenuAlertSettings::from_meta(&alert.alert_meta)?.form())
    }

    fn process_settings(
        &self,
        alert: &mut AlertConfig,
        submission: &SettingsSubmission,
        verifier: &dyn NonceVerifier,
    ) -> Result<()> {
        verify_submission(verifier, submission)?;
        let settings = MenuAlertSettings::from_submission(submission);
        settings.write_to(&mut alert.alert_meta);
        info!(
            alert_id = %alert.id,
            clear_immediate = settings.clear_immediate,
            "saved menu alert settings"
        );
        Ok(())
    }
}

/// A channel that writes matched events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertChannel;

impl LogAlertChannel {
    /// Slug of the log channel.
    pub const SLUG: &'static str = "log";

    /// Creates a log channel.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AlertChannel for LogAlertChannel {
    fn slug(&self) -> &str {
        Self::SLUG
    }

    fn name(&self) -> &str {
        "Log Alert"
    }

    fn alert(
        &self,
        recipient: Option<&RecipientId>,
        event_id: u64,
        record: &EventRecord,
        _options: &AlertOptions,
    ) -> Result<()> {
        info!(
            event_id,
            recipient = recipient.map_or("-", RecipientId::as_str),
            connector = record.connector.as_deref().unwrap_or("-"),
            action = record.action.as_deref().unwrap_or("-"),
            summary = %record.summary,
            "ALERT"
        );
        Ok(())
    }
}

/// A channel that accepts events and does nothing with them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneAlertChannel;

impl NoneAlertChannel {
    /// Slug of the no-op channel.
    pub const SLUG: &'static str = "none";

    /// Creates a no-op channel.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AlertChannel for NoneAlertChannel {
    fn slug(&self) -> &str {
        Self::SLUG
    }

    fn name(&self) -> &str {
        "Do Nothing"
    }

    fn alert(
        &self,
        _recipient: Option<&RecipientId>,
        _event_id: u64,
        _record: &EventRecord,
        _options: &AlertOptions,
    ) -> Result<()> {
        Ok(())
    }
}
