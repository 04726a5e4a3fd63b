//! Directory client abstraction.
//!
//! The transport to a real directory server (connection, bind, TLS, the LDAP
//! protocol exchange) lives outside this crate. Resolution only needs two
//! capabilities from it, captured by the [`DirectoryClient`] trait: a search and a
//! filter-value escape. Results come back as a typed [`SearchResult`] whose size is
//! derived from its entries.
//!
//! # Example Usage
//!
//! ```rust
//! use ldap_group_membership::directory::{DirectoryClient, DirectoryEntry, InMemoryDirectory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = InMemoryDirectory::new();
//! directory
//!     .insert(
//!         DirectoryEntry::new("cn=admins,ou=groups,dc=example,dc=com")
//!             .with_attribute("objectClass", ["groupOfNames"])
//!             .with_attribute("cn", ["admins"]),
//!     )
//!     .await;
//!
//! let result = directory
//!     .search("ou=groups,dc=example,dc=com", "(objectClass=groupOfNames)", &[])
//!     .await?;
//! assert_eq!(result.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod filter;
pub mod in_memory;

pub use filter::{Filter, escape_filter_value};
pub use in_memory::InMemoryDirectory;

use serde::{Deserialize, Serialize};
use std::future::Future;

/// One directory entry: its DN plus ordered, multi-valued attributes.
///
/// Attribute names are stored lower-cased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    dn: String,
    attributes: Vec<(String, Vec<String>)>,
}

impl DirectoryEntry {
    /// Create an entry with no attributes.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: Vec::new(),
        }
    }

    /// Add values for an attribute, appending to any values already present.
    pub fn with_attribute<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key = name.to_lowercase();
        let values = values.into_iter().map(Into::into);
        match self.attributes.iter_mut().find(|(n, _)| *n == key) {
            Some((_, existing)) => existing.extend(values),
            None => self.attributes.push((key, values.collect())),
        }
        self
    }

    /// The entry's distinguished name.
    pub fn dn(&self) -> &str {
        &self.dn
    }

    /// All values of an attribute, if present.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        let key = name.to_lowercase();
        self.attributes
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, values)| values.as_slice())
    }

    /// First value of an attribute.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Whether the attribute is present (possibly with no values).
    pub fn has_attribute(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.attributes
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Copy of this entry restricted to the requested attributes.
    ///
    /// An empty request or one containing `*` keeps everything.
    pub fn project(&self, requested: &[String]) -> Self {
        if requested.is_empty() || requested.iter().any(|a| a == "*") {
            return self.clone();
        }
        let wanted: Vec<String> = requested.iter().map(|a| a.to_lowercase()).collect();
        Self {
            dn: self.dn.clone(),
            attributes: self
                .attributes
                .iter()
                .filter(|(name, _)| wanted.contains(name))
                .cloned()
                .collect(),
        }
    }
}

/// Entries returned by a directory search, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    entries: Vec<DirectoryEntry>,
}

impl SearchResult {
    /// A result with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the search matched nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry, if any.
    pub fn first(&self) -> Option<&DirectoryEntry> {
        self.entries.first()
    }

    /// All entries.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Take ownership of the entries.
    pub fn into_entries(self) -> Vec<DirectoryEntry> {
        self.entries
    }
}

impl From<Vec<DirectoryEntry>> for SearchResult {
    fn from(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<DirectoryEntry> for SearchResult {
    fn from_iter<T: IntoIterator<Item = DirectoryEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SearchResult {
    type Item = DirectoryEntry;
    type IntoIter = std::vec::IntoIter<DirectoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Capabilities resolution needs from a directory server connection.
///
/// Implementations own the transport, including any timeout, retry or pooling
/// policy. Resolution calls [`search`](Self::search) and maps an error or an empty
/// result to "skip this entry".
pub trait DirectoryClient: Send + Sync {
    /// The error type returned by searches.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search below `base` (or read `base` itself) with `filter`, returning the
    /// requested `attributes`. An empty attribute list requests all attributes.
    fn search(
        &self,
        base: &str,
        filter: &str,
        attributes: &[String],
    ) -> impl Future<Output = Result<SearchResult, Self::Error>> + Send;

    /// Escape `value` so it can be interpolated into a filter without changing the
    /// filter's structure.
    fn escape_dn_for_filter(&self, value: &str) -> String {
        escape_filter_value(value)
    }
}
