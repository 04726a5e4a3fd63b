//! Directory group membership resolution for LDAP single-sign-on pipelines.
//!
//! Given the group DNs attached to an authenticated user, decides which fall under a
//! configured scope and produces normalized group records, either verified against
//! the directory or synthesized from the DN alone. Also extracts the membership list
//! from a fetched user record through a `<attribute>` mapping template.
//!
//! # Core Components
//!
//! - [`resolver`] - membership resolution, reverse lookup, and the combined pipeline
//! - [`DirectoryClient`] - the seam to a directory server connection
//! - [`InMemoryDirectory`] - in-process directory for development and tests
//! - [`mapping`] - `usergroup` template parsing and membership extraction
//! - [`dn`] - scope matching and leading-RDN parsing
//!
//! # Quick Start
//!
//! ```rust
//! use ldap_group_membership::{GroupSearchConfig, InMemoryDirectory, DirectoryEntry};
//! use ldap_group_membership::resolver::select_from_membership;
//!
//! # async fn example() {
//! let directory = InMemoryDirectory::with_entries(vec![
//!     DirectoryEntry::new("cn=admins,ou=groups,dc=example,dc=com")
//!         .with_attribute("objectClass", ["groupOfNames"])
//!         .with_attribute("cn", ["admins"]),
//! ]);
//!
//! let search = GroupSearchConfig::new("dc=example,dc=com", "(objectClass=groupOfNames)")
//!     .with_attributes(["cn"]);
//! let membership = vec![
//!     "cn=admins,ou=groups,dc=example,dc=com".to_string(),
//!     "cn=admins,ou=groups,dc=other,dc=org".to_string(),
//! ];
//!
//! let groups = select_from_membership(&search, &membership, Some(&directory)).await;
//! assert_eq!(groups.len(), 1);
//! # }
//! ```

pub mod config;
pub mod directory;
pub mod dn;
pub mod error;
pub mod group;
pub mod mapping;
pub mod resolver;

// Re-export commonly used types for convenience
pub use config::{GroupSearchConfig, ResolverConfig};
pub use directory::{DirectoryClient, DirectoryEntry, InMemoryDirectory, SearchResult};
pub use error::{ConfigError, DirectoryError, DnError, MappingError, ResolveError};
pub use group::GroupCollection;
pub use mapping::MappingConfig;
pub use resolver::{resolve_user_groups, select_from_membership, select_from_user};
