//! Channel registry keyed by slug.
//!
//! The event dispatcher resolves an alert's `alert_type` to a channel here
//! and forwards the event, the settings form, or a settings submission.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::channels::AlertChannel;
use crate::error::{AlertError, Result};
use crate::settings::{FormField, NonceVerifier, SettingsSubmission};
use crate::types::{AlertConfig, AlertOptions, EventRecord, RecipientId};

/// Registered alert channels.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: RwLock<HashMap<String, Arc<dyn AlertChannel>>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a channel under its slug.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::DuplicateChannel` if the slug is taken.
    pub fn register(&self, channel: Arc<dyn AlertChannel>) -> Result<()> {
        let mut channels = self.channels.write();
        let slug = channel.slug().to_string();

        if channels.contains_key(&slug) {
            return Err(AlertError::DuplicateChannel { slug });
        }

        info!(slug = %slug, name = %channel.name(), "registered alert channel");
        channels.insert(slug, channel);
        Ok(())
    }

    /// Removes a channel. Returns `true` if it was registered.
    pub fn unregister(&self, slug: &str) -> bool {
        let removed = self.channels.write().remove(slug).is_some();
        if removed {
            info!(slug = %slug, "unregistered alert channel");
        }
        removed
    }

    /// Looks up a channel by slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<Arc<dyn AlertChannel>> {
        self.channels.read().get(slug).cloned()
    }

    /// Returns all registered slugs, sorted.
    #[must_use]
    pub fn slugs(&self) -> Vec<String> {
        let mut slugs: Vec<String> = self.channels.read().keys().cloned().collect();
        slugs.sort();
        slugs
    }

    /// Returns the number of registered channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    /// Returns true if no channels are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }

    fn resolve(&self, slug: &str) -> Result<Arc<dyn AlertChannel>> {
        self.get(slug).ok_or_else(|| AlertError::ChannelNotFound {
            slug: slug.to_string(),
        })
    }

    /// Forwards a matched event to the channel configured on `alert`.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::ChannelNotFound` for an unknown slug, or whatever
    /// the channel returns.
    pub fn dispatch(
        &self,
        alert: &AlertConfig,
        recipient: Option<&RecipientId>,
        event_id: u64,
        record: &EventRecord,
        options: &AlertOptions,
    ) -> Result<()> {
        let channel = self.resolve(&alert.alert_type)?;
        debug!(slug = %alert.alert_type, alert_id = %alert.id, event_id, "dispatching alert");
        channel.alert(recipient, event_id, record, options)
    }

    /// Describes the settings form of the channel configured on `alert`.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::ChannelNotFound` for an unknown slug.
    pub fn render_settings(&self, alert: &AlertConfig) -> Result<Vec<FormField>> {
        self.resolve(&alert.alert_type)?.render_settings(alert)
    }

    /// Hands a settings submission to the channel configured on `alert`.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::ChannelNotFound` for an unknown slug, or
    /// `AlertError::InvalidNonce` if the channel rejects the token.
    pub fn process_settings(
        &self,
        alert: &mut AlertConfig,
        submission: &SettingsSubmission,
        verifier: &dyn NonceVerifier,
    ) -> Result<()> {
        let channel = self.resolve(&alert.alert_type)?;
        channel.process_settings(alert, submission, verifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{LogAlertChannel, MenuAlertChannel, NoneAlertChannel};
    use crate::settings::{CLEAR_IMMEDIATE_FIELD, NONCE_ACTION, StaticNonceVerifier};
    use crate::store::MemoryAttributeStore;

    fn registry_with_menu() -> (ChannelRegistry, Arc<MenuAlertChannel<MemoryAttributeStore>>) {
        let registry = ChannelRegistry::new();
        let menu = Arc::new(MenuAlertChannel::new(MemoryAttributeStore::new()));
        registry.register(menu.clone()).unwrap();
        registry.register(Arc::new(LogAlertChannel::new())).unwrap();
        registry.register(Arc::new(NoneAlertChannel::new())).unwrap();
        (registry, menu)
    }

    mod registration_tests {
        use super::*;

        #[test]
        fn empty_registry() {
            let registry = ChannelRegistry::new();
            assert!(registry.is_empty());
            assert_eq!(registry.len(), 0);
            assert!(registry.get("menu-alert").is_none());
        }

        #[test]
        fn register_and_lookup() {
            let (registry, _) = registry_with_menu();

            assert_eq!(registry.len(), 3);
            assert_eq!(registry.slugs(), vec!["log", "menu-alert", "none"]);
            assert_eq!(registry.get("menu-alert").unwrap().name(), "Create Menu Alert");
        }

        #[test]
        fn duplicate_slug_fails() {
            let (registry, _) = registry_with_menu();

            let result = registry.register(Arc::new(NoneAlertChannel::new()));

            match result {
                Err(AlertError::DuplicateChannel { slug }) => assert_eq!(slug, "none"),
                other => panic!("expected DuplicateChannel, got {other:?}"),
            }
        }

        #[test]
        fn unregister() {
            let (registry, _) = registry_with_menu();

            assert!(registry.unregister("log"));
            assert!(!registry.unregister("log"));
            assert_eq!(registry.len(), 2);
        }
    }

    mod dispatch_tests {
        use super::*;

        #[test]
        fn dispatch_by_slug() {
            let (registry, menu) = registry_with_menu();
            let alert = AlertConfig::new("menu-alert");
            let u1 = RecipientId::new("u1").unwrap();

            registry
                .dispatch(
                    &alert,
                    Some(&u1),
                    10,
                    &EventRecord::new("Post X was deleted"),
                    &AlertOptions::new(),
                )
                .unwrap();

            assert_eq!(menu.queue().read(Some(&u1)).unwrap(), vec!["Post X was deleted"]);
        }

        #[test]
        fn dispatch_to_other_channel_leaves_menu_alone() {
            let (registry, menu) = registry_with_menu();
            let alert = AlertConfig::new("none");
            let u1 = RecipientId::new("u1").unwrap();

            registry
                .dispatch(&alert, Some(&u1), 10, &EventRecord::new("ignored"), &AlertOptions::new())
                .unwrap();

            assert!(menu.queue().read(Some(&u1)).unwrap().is_empty());
        }

        #[test]
        fn dispatch_unknown_slug_fails() {
            let (registry, _) = registry_with_menu();
            let alert = AlertConfig::new("sms");

            let result =
                registry.dispatch(&alert, None, 1, &EventRecord::new("x"), &AlertOptions::new());

            assert!(matches!(result, Err(AlertError::ChannelNotFound { .. })));
        }
    }

    mod settings_tests {
        use super::*;

        #[test]
        fn settings_round_trip_through_registry() {
            let (registry, _) = registry_with_menu();
            let verifier = StaticNonceVerifier::new(NONCE_ACTION, "n");
            let mut alert = AlertConfig::new("menu-alert");

            let submission = SettingsSubmission::new()
                .with_nonce("n")
                .with_field(CLEAR_IMMEDIATE_FIELD, "on");
            registry.process_settings(&mut alert, &submission, &verifier).unwrap();

            let form = registry.render_settings(&alert).unwrap();
            assert!(matches!(form[0], FormField::Checkbox { value: true, .. }));
        }

        #[test]
        fn settings_for_unknown_slug_fail() {
            let (registry, _) = registry_with_menu();
            let verifier = StaticNonceVerifier::new(NONCE_ACTION, "n");
            let mut alert = AlertConfig::new("pager");

            assert!(registry.render_settings(&alert).is_err());
            assert!(
                registry
                    .process_settings(
                        &mut alert,
                        &SettingsSubmission::new().with_nonce("n"),
                        &verifier,
                    )
                    .is_err()
            );
        }
    }
}
