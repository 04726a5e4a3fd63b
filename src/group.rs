//! Resolved group collections.

use crate::directory::{DirectoryEntry, SearchResult};
use serde::{Deserialize, Serialize};

/// Ordered group records produced by resolution.
///
/// Order follows the input membership order (or search order for reverse
/// lookups). The size is always the number of records held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupCollection {
    groups: Vec<DirectoryEntry>,
}

impl GroupCollection {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, group: DirectoryEntry) {
        self.groups.push(group);
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group at `index`.
    pub fn get(&self, index: usize) -> Option<&DirectoryEntry> {
        self.groups.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DirectoryEntry> {
        self.groups.iter()
    }

    /// DNs of the groups, in order.
    pub fn dns(&self) -> Vec<&str> {
        self.groups.iter().map(DirectoryEntry::dn).collect()
    }

    /// Values of `attribute` across all groups, in order (e.g. every `cn`).
    pub fn attribute_values(&self, attribute: &str) -> Vec<&str> {
        self.groups
            .iter()
            .filter_map(|group| group.get(attribute))
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

impl From<SearchResult> for GroupCollection {
    fn from(result: SearchResult) -> Self {
        Self {
            groups: result.into_entries(),
        }
    }
}

impl<'a> IntoIterator for &'a GroupCollection {
    type Item = &'a DirectoryEntry;
    type IntoIter = std::slice::Iter<'a, DirectoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl IntoIterator for GroupCollection {
    type Item = DirectoryEntry;
    type IntoIter = std::vec::IntoIter<DirectoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}
