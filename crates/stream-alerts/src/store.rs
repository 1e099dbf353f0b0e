//! Attribute stores backing the pending notification queues.
//!
//! This module provides the [`AttributeStore`] trait, the three-operation
//! surface the queue needs from a generic `(recipient, key) -> values`
//! metadata layer, and two implementations:
//!
//! - [`MemoryAttributeStore`]: process-local, counts mutations
//! - [`JsonAttributeStore`]: snapshots every mutation to a JSON file
//!
//! Each primitive is atomic on its own. Nothing here makes a sequence of
//! calls atomic.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::Result;
use crate::types::RecipientId;

/// Generic per-recipient key/value persistence.
///
/// A key may hold several values. Values are returned in insertion order.
pub trait AttributeStore: Send + Sync + fmt::Debug {
    /// Returns every value stored under `key` for `recipient`, oldest first.
    fn get_all(&self, recipient: &RecipientId, key: &str) -> Result<Vec<String>>;

    /// Appends a value under `key` for `recipient`.
    fn add(&self, recipient: &RecipientId, key: &str, value: &str) -> Result<()>;

    /// Deletes every value under `key` for `recipient`.
    ///
    /// `global` is a replication hint for stores that keep more than one
    /// copy. It never widens the delete beyond `recipient`.
    fn delete(&self, recipient: &RecipientId, key: &str, global: bool) -> Result<()>;
}

impl<S: AttributeStore + ?Sized> AttributeStore for Arc<S> {
    fn get_all(&self, recipient: &RecipientId, key: &str) -> Result<Vec<String>> {
        (**self).get_all(recipient, key)
    }

    fn add(&self, recipient: &RecipientId, key: &str, value: &str) -> Result<()> {
        (**self).add(recipient, key, value)
    }

    fn delete(&self, recipient: &RecipientId, key: &str, global: bool) -> Result<()> {
        (**self).delete(recipient, key, global)
    }
}

type Attributes = HashMap<RecipientId, HashMap<String, Vec<String>>>;

fn remove_key(attributes: &mut Attributes, recipient: &RecipientId, key: &str) -> usize {
    let Some(keys) = attributes.get_mut(recipient) else {
        return 0;
    };
    let removed = keys.remove(key).map_or(0, |values| values.len());
    if keys.is_empty() {
        attributes.remove(recipient);
    }
    removed
}

/// In-memory attribute store.
///
/// Holds a single copy, so `global` deletes behave like plain ones.
///
/// Every `add` and `delete` call is counted, whether or not it changed
/// anything, so callers can assert that a code path did not write.
#[derive(Debug, Default)]
pub struct MemoryAttributeStore {
    attributes: RwLock<Attributes>,
    mutations: AtomicUsize,
}

impl MemoryAttributeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of `add` and `delete` calls made so far.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Returns the number of recipients holding at least one value.
    #[must_use]
    pub fn recipient_count(&self) -> usize {
        self.attributes.read().len()
    }
}

impl AttributeStore for MemoryAttributeStore {
    fn get_all(&self, recipient: &RecipientId, key: &str) -> Result<Vec<String>> {
        let attributes = self.attributes.read();
        Ok(attributes
            .get(recipient)
            .and_then(|keys| keys.get(key))
            .cloned()
            .unwrap_or_default())
    }

    fn add(&self, recipient: &RecipientId, key: &str, value: &str) -> Result<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut attributes = self.attributes.write();
        attributes
            .entry(recipient.clone())
            .or_default()
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        Ok(())
    }

    fn delete(&self, recipient: &RecipientId, key: &str, global: bool) -> Result<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut attributes = self.attributes.write();
        let removed = remove_key(&mut attributes, recipient, key);
        debug!(recipient = %recipient, key, global, removed, "deleted attribute values");
        Ok(())
    }
}

/// Attribute store persisted as a single JSON document.
///
/// The file is read once on open. Each mutation is applied to a copy,
/// written to disk, and only then made visible, so a failed write leaves
/// both the file and the in-memory view unchanged.
#[derive(Debug)]
pub struct JsonAttributeStore {
    path: PathBuf,
    attributes: RwLock<Attributes>,
}

impl JsonAttributeStore {
    /// File name used inside the state directory.
    pub const FILE_NAME: &'static str = "attributes.json";

    /// Opens the store in `state_dir`, loading existing state if present.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::Io` if the file exists but cannot be read, or
    /// `AlertError::SerializationError` if it is not a valid snapshot.
    pub fn open(state_dir: &Path) -> Result<Self> {
        let path = state_dir.join(Self::FILE_NAME);
        let attributes: Attributes = if path.exists() {
            let bytes = fs::read(&path)?;
            let snapshot: BTreeMap<RecipientId, BTreeMap<String, Vec<String>>> =
                serde_json::from_slice(&bytes)?;
            snapshot
                .into_iter()
                .map(|(recipient, keys)| (recipient, keys.into_iter().collect()))
                .collect()
        } else {
            Attributes::new()
        };
        info!(path = %path.display(), recipients = attributes.len(), "opened attribute store");
        Ok(Self {
            path,
            attributes: RwLock::new(attributes),
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, attributes: &Attributes) -> Result<()> {
        let snapshot: BTreeMap<&RecipientId, BTreeMap<&String, &Vec<String>>> = attributes
            .iter()
            .map(|(recipient, keys)| (recipient, keys.iter().collect()))
            .collect();
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn mutate(&self, apply: impl FnOnce(&mut Attributes)) -> Result<()> {
        let mut attributes = self.attributes.write();
        let mut next = attributes.clone();
        apply(&mut next);
        self.persist(&next)?;
        *attributes = next;
        Ok(())
    }
}

impl AttributeStore for JsonAttributeStore {
    fn get_all(&self, recipient: &RecipientId, key: &str) -> Result<Vec<String>> {
        let attributes = self.attributes.read();
        Ok(attributes
            .get(recipient)
            .and_then(|keys| keys.get(key))
            .cloned()
            .unwrap_or_default())
    }

    fn add(&self, recipient: &RecipientId, key: &str, value: &str) -> Result<()> {
        self.mutate(|attributes| {
            attributes
                .entry(recipient.clone())
                .or_default()
                .entry(key.to_string())
                .or_default()
                .push(value.to_string());
        })
    }

    fn delete(&self, recipient: &RecipientId, key: &str, global: bool) -> Result<()> {
        self.mutate(|attributes| {
            let removed = remove_key(attributes, recipient, key);
            debug!(recipient = %recipient, key, global, removed, "deleted attribute values");
        })
    }
}
