//! Membership extraction from fetched user records.
//!
//! The mapping configuration maps logical fields to templates. A template may hold a
//! single attribute reference written as `<attributeName>`; for the `usergroup`
//! field that reference names the user attribute listing group DNs, typically
//! `<memberOf>`.
//!
//! ```rust
//! use ldap_group_membership::directory::DirectoryEntry;
//! use ldap_group_membership::mapping::{MappingConfig, membership};
//!
//! let user = DirectoryEntry::new("uid=jdoe,ou=people,dc=example,dc=com")
//!     .with_attribute("memberOf", ["cn=admins,ou=groups,dc=example,dc=com"]);
//! let mapping = MappingConfig::new().with_field("usergroup", "<memberOf>");
//!
//! let groups = membership(&user, &mapping).unwrap();
//! assert_eq!(groups, ["cn=admins,ou=groups,dc=example,dc=com"]);
//! ```

use crate::directory::DirectoryEntry;
use crate::error::{MappingError, MappingResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Logical field holding the group membership reference.
pub const USERGROUP_FIELD: &str = "usergroup";

/// Logical field name → template string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingConfig {
    fields: HashMap<String, String>,
}

impl MappingConfig {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_field(mut self, field: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(field, template);
        self
    }

    /// Set the template for a field, returning the previous one.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        template: impl Into<String>,
    ) -> Option<String> {
        self.fields.insert(field.into(), template.into())
    }

    /// Template for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Lower-cased attribute referenced by the `usergroup` template.
    pub fn usergroup_attribute(&self) -> MappingResult<String> {
        let template = self
            .get(USERGROUP_FIELD)
            .ok_or_else(|| MappingError::MissingField {
                field: USERGROUP_FIELD.to_string(),
            })?;
        attribute_reference(template)
            .map(str::to_lowercase)
            .ok_or_else(|| MappingError::NoAttributeReference {
                template: template.to_string(),
            })
    }
}

impl From<HashMap<String, String>> for MappingConfig {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}

/// Text between the first `<` and the first `>` after it.
///
/// Only the first reference counts; anything after its `>` is ignored.
///
/// ```rust
/// use ldap_group_membership::mapping::attribute_reference;
///
/// assert_eq!(attribute_reference("<memberOf>"), Some("memberOf"));
/// assert_eq!(attribute_reference("prefix <a> and <b>"), Some("a"));
/// assert_eq!(attribute_reference("memberOf"), None);
/// ```
pub fn attribute_reference(template: &str) -> Option<&str> {
    let start = template.find('<')? + 1;
    let len = template[start..].find('>')?;
    Some(&template[start..start + len])
}

/// Read the user's membership list from `record` as directed by `mapping`.
///
/// Fails when the mapping has no usable `usergroup` reference or the record lacks
/// the referenced attribute. A present attribute with no values yields `Ok(&[])`.
pub fn membership<'a>(
    record: &'a DirectoryEntry,
    mapping: &MappingConfig,
) -> MappingResult<&'a [String]> {
    let attribute = mapping.usergroup_attribute()?;
    record
        .get(&attribute)
        .ok_or(MappingError::AttributeNotFound { attribute })
}
