//! Resolver configuration.
//!
//! Configuration is plain data and deserializes from JSON:
//!
//! ```rust
//! use ldap_group_membership::config::ResolverConfig;
//!
//! let config = ResolverConfig::from_json(r#"{
//!     "groups": {
//!         "base_dn": "ou=groups,dc=example,dc=com",
//!         "filter": "(objectClass=groupOfNames)",
//!         "attributes": ["cn", "description"],
//!         "extended_check": false
//!     },
//!     "mapping": { "usergroup": "<memberOf>" }
//! }"#).unwrap();
//!
//! assert!(!config.groups.extended_check);
//! assert!(!config.groups.is_reverse_lookup());
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::mapping::MappingConfig;
use serde::{Deserialize, Serialize};

/// Filter token replaced by the escaped user DN in reverse lookups.
pub const USER_DN_TOKEN: &str = "{USERDN}";

/// Filter token replaced by the escaped user UID in reverse lookups.
pub const USER_UID_TOKEN: &str = "{USERUID}";

fn default_extended_check() -> bool {
    true
}

/// Settings for locating and verifying group entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSearchConfig {
    /// Subtree that group DNs must fall under. Empty accepts every DN.
    #[serde(default)]
    pub base_dn: String,

    /// Group filter. May contain `{USERDN}` / `{USERUID}` for reverse lookups.
    #[serde(default)]
    pub filter: String,

    /// Attributes to fetch for each group. Empty fetches all.
    #[serde(default)]
    pub attributes: Vec<String>,

    /// Verify each group against the directory instead of trusting the DN.
    #[serde(default = "default_extended_check")]
    pub extended_check: bool,
}

impl GroupSearchConfig {
    /// Create settings with no attribute restriction and extended checks enabled.
    pub fn new(base_dn: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            base_dn: base_dn.into(),
            filter: filter.into(),
            attributes: Vec::new(),
            extended_check: default_extended_check(),
        }
    }

    /// Set the attributes to fetch.
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable authoritative verification.
    pub fn with_extended_check(mut self, extended_check: bool) -> Self {
        self.extended_check = extended_check;
        self
    }

    /// Whether the filter is a user-to-groups reverse lookup template.
    pub fn is_reverse_lookup(&self) -> bool {
        self.filter.contains(USER_DN_TOKEN) || self.filter.contains(USER_UID_TOKEN)
    }
}

/// Complete configuration for resolving a user's groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Group search settings.
    pub groups: GroupSearchConfig,

    /// Field mapping; only `usergroup` is consulted.
    #[serde(default)]
    pub mapping: MappingConfig,
}

impl ResolverConfig {
    /// Create a configuration with an empty mapping.
    pub fn new(groups: GroupSearchConfig) -> Self {
        Self {
            groups,
            mapping: MappingConfig::default(),
        }
    }

    /// Replace the mapping.
    pub fn with_mapping(mut self, mapping: MappingConfig) -> Self {
        self.mapping = mapping;
        self
    }

    /// Parse configuration from JSON.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from an already decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> ConfigResult<Self> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject attribute lists holding blank names.
    ///
    /// An empty filter is accepted: resolution treats it as "nothing resolvable".
    pub fn validate(&self) -> ConfigResult<()> {
        if self
            .groups
            .attributes
            .iter()
            .any(|attribute| attribute.trim().is_empty())
        {
            return Err(ConfigError::invalid("group attribute names must not be blank"));
        }
        Ok(())
    }
}
