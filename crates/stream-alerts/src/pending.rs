//! Per-recipient pending notification queue.
//!
//! Messages are appended under a single key per recipient and read back in
//! insertion order. Reading does not consume anything; the presentation path
//! reads, renders, then calls [`PendingNotifications::clear`].
//!
//! `clear` deletes everything stored under the key at the time it runs. A
//! message appended between a read and the following clear is deleted
//! without having been shown.

use tracing::{debug, info};

use crate::error::Result;
use crate::store::AttributeStore;
use crate::types::RecipientId;

/// Key the menu channel stores its pending messages under.
pub const PENDING_KEY: &str = "wp_stream_alerts_menu_pending";

/// A queue of pending text notifications, one per recipient.
#[derive(Debug)]
pub struct PendingNotifications<S> {
    store: S,
    key: String,
}

impl<S: AttributeStore> PendingNotifications<S> {
    /// Creates a queue over `store` using [`PENDING_KEY`].
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_key(store, PENDING_KEY)
    }

    /// Creates a queue over `store` under a custom key.
    #[must_use]
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Returns the key messages are stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Appends a message for `recipient`.
    ///
    /// Does nothing when there is no recipient.
    ///
    /// # Errors
    ///
    /// Propagates any error from the attribute store.
    pub fn append(&self, recipient: Option<&RecipientId>, message: &str) -> Result<()> {
        let Some(recipient) = recipient else {
            debug!(key = %self.key, "no recipient, dropping pending message");
            return Ok(());
        };
        self.store.add(recipient, &self.key, message)?;
        debug!(recipient = %recipient, key = %self.key, "queued pending message");
        Ok(())
    }

    /// Returns every pending message for `recipient`, oldest first.
    ///
    /// Returns an empty list when there is no recipient or nothing is pending.
    ///
    /// # Errors
    ///
    /// Propagates any error from the attribute store.
    pub fn read(&self, recipient: Option<&RecipientId>) -> Result<Vec<String>> {
        match recipient {
            Some(recipient) => self.store.get_all(recipient, &self.key),
            None => Ok(Vec::new()),
        }
    }

    /// Removes every pending message for `recipient`.
    ///
    /// `global` is passed through to the store unchanged. Only this
    /// recipient's messages are removed either way.
    /// Does nothing when there is no recipient.
    ///
    /// # Errors
    ///
    /// Propagates any error from the attribute store.
    pub fn clear(&self, recipient: Option<&RecipientId>, global: bool) -> Result<()> {
        let Some(recipient) = recipient else {
            return Ok(());
        };
        self.store.delete(recipient, &self.key, global)?;
        info!(recipient = %recipient, key = %self.key, global, "cleared pending messages");
        Ok(())
    }
}
