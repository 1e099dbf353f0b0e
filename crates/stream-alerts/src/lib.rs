//! Menu alert channel for the Stream activity monitor.
//!
//! `stream-alerts` delivers matched activity events to a recipient's
//! notification menu. When an event fires, its summary is appended to a
//! per-recipient pending queue; the next time that recipient renders an
//! admin page the queue is turned into menu nodes and cleared.
//!
//! # Features
//!
//! - **Pending queues**: append, read and clear per recipient, over any
//!   [`AttributeStore`]
//! - **Menu rendering**: one group node plus one child node per message
//! - **Channel registry**: channels implement [`AlertChannel`] and are
//!   dispatched by slug
//! - **Settings**: form descriptors and anti-forgery-checked submissions
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use stream_alerts::{
//!     AlertConfig, AlertOptions, ChannelRegistry, EventRecord, MemoryAttributeStore,
//!     MenuAlertChannel, RecipientId,
//! };
//!
//! let menu = Arc::new(MenuAlertChannel::new(MemoryAttributeStore::new()));
//! let registry = ChannelRegistry::new();
//! registry.register(menu.clone()).unwrap();
//!
//! // The event dispatcher forwards a matched event.
//! let alert = AlertConfig::new("menu-alert");
//! let user = RecipientId::new("42").unwrap();
//! let record = EventRecord::new("Post \"Hello\" was deleted");
//! registry
//!     .dispatch(&alert, Some(&user), 1, &record, &AlertOptions::new())
//!     .unwrap();
//!
//! // The presentation hook renders and clears on the next page load.
//! let shown = menu.present_and_clear(Some(&user)).unwrap();
//! assert!(shown.is_displayed());
//! assert_eq!(shown.nodes().len(), 2);
//!
//! let again = menu.present_and_clear(Some(&user)).unwrap();
//! assert!(!again.is_displayed());
//! ```
//!
//! # Concurrency
//!
//! Each store primitive is atomic, but a read followed by a clear is not.
//! A message appended for a recipient while their page is rendering can be
//! cleared without ever being shown.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod channels;
pub mod error;
pub mod menu;
pub mod pending;
pub mod registry;
pub mod settings;
pub mod store;
pub mod types;

// Re-export main types at crate root
pub use channels::{AlertChannel, LogAlertChannel, MenuAlertChannel, NoneAlertChannel};
pub use error::{AlertError, Result};
pub use menu::{MenuAlertConfig, MenuNode, Presentation, escape_html};
pub use pending::{PENDING_KEY, PendingNotifications};
pub use registry::ChannelRegistry;
pub use settings::{
    FormField, MenuAlertSettings, NonceVerifier, SettingsSubmission, StaticNonceVerifier,
    verify_submission,
};
pub use store::{AttributeStore, JsonAttributeStore, MemoryAttributeStore};
pub use types::{AlertConfig, AlertOptions, EventRecord, RecipientId};
