//! In-memory directory implementation.
//!
//! A thread-safe [`DirectoryClient`] backed by a vector of entries behind a tokio
//! `RwLock`. It evaluates real filters and subtree scopes, which makes it suitable
//! for development, tests, and pipelines that hold a directory snapshot in memory.
//!
//! # Search Semantics
//!
//! * Subtree scope: an entry is searched when its DN is the base or lies below it
//! * A base with no entry at or below it fails with `NoSuchObject`
//! * Results come back in insertion order
//! * An empty attribute list (or `*`) returns every attribute
//!
//! # Example Usage
//!
//! ```rust
//! use ldap_group_membership::directory::{DirectoryClient, DirectoryEntry, InMemoryDirectory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = InMemoryDirectory::with_entries(vec![
//!     DirectoryEntry::new("cn=staff,ou=groups,dc=example,dc=com")
//!         .with_attribute("objectClass", ["posixGroup"])
//!         .with_attribute("memberUid", ["jdoe"]),
//! ]);
//!
//! let filter = "(&(objectClass=posixGroup)(memberUid=jdoe))";
//! let groups = directory
//!     .search("dc=example,dc=com", filter, &["cn".to_string()])
//!     .await?;
//! assert_eq!(groups.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::directory::{DirectoryClient, DirectoryEntry, Filter, SearchResult};
use crate::dn::{dn_eq, is_descendant_or_self};
use crate::error::DirectoryError;
use log::trace;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory directory.
///
/// Clones share the same underlying entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    entries: Arc<RwLock<Vec<DirectoryEntry>>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory holding `entries`, in order.
    pub fn with_entries(entries: Vec<DirectoryEntry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Insert an entry, replacing any entry with the same DN (ignoring case).
    ///
    /// Returns the replaced entry, if any.
    pub async fn insert(&self, entry: DirectoryEntry) -> Option<DirectoryEntry> {
        let mut guard = self.entries.write().await;
        match guard.iter_mut().find(|existing| dn_eq(existing.dn(), entry.dn())) {
            Some(existing) => Some(std::mem::replace(existing, entry)),
            None => {
                guard.push(entry);
                None
            }
        }
    }

    /// Remove the entry with the given DN. Returns whether it existed.
    pub async fn remove(&self, dn: &str) -> bool {
        let mut guard = self.entries.write().await;
        let before = guard.len();
        guard.retain(|entry| !dn_eq(entry.dn(), dn));
        guard.len() != before
    }

    /// Fetch an entry by DN.
    pub async fn get(&self, dn: &str) -> Option<DirectoryEntry> {
        let guard = self.entries.read().await;
        guard.iter().find(|entry| dn_eq(entry.dn(), dn)).cloned()
    }

    /// Number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the directory holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove all entries.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl DirectoryClient for InMemoryDirectory {
    type Error = DirectoryError;

    async fn search(
        &self,
        base: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<SearchResult, Self::Error> {
        let filter = Filter::parse(filter)?;
        let guard = self.entries.read().await;

        let mut in_scope = guard
            .iter()
            .filter(|entry| is_descendant_or_self(entry.dn(), base))
            .peekable();
        if in_scope.peek().is_none() {
            return Err(DirectoryError::NoSuchObject {
                dn: base.to_string(),
            });
        }

        let result: SearchResult = in_scope
            .filter(|entry| filter.matches(entry))
            .map(|entry| entry.project(attributes))
            .collect();

        trace!(
            "In-memory search base='{}' returned {} entries",
            base,
            result.len()
        );
        Ok(result)
    }
}
