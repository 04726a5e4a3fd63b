//! Error types for group membership resolution.
//!
//! Per-entry failures during resolution are never surfaced as errors; they skip the
//! offending entry. The types here cover the cases a caller must be able to tell
//! apart: a mapping that yields no membership data, a malformed DN, a failing
//! directory, or unreadable configuration.

/// Errors raised when reading a DN component in trusted mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DnError {
    /// The DN has no components at all
    #[error("DN is empty")]
    Empty,

    /// The leading component has no `=` between attribute and value
    #[error("RDN '{rdn}' has no '=' separator")]
    MissingSeparator { rdn: String },

    /// The leading component has an empty attribute name
    #[error("RDN '{rdn}' has an empty attribute name")]
    EmptyAttribute { rdn: String },

    /// A `\` escape is truncated or not a valid hex pair
    #[error("Invalid escape sequence in '{value}'")]
    InvalidEscape { value: String },
}

/// Failure to extract a membership list from a fetched user record.
///
/// This is deliberately distinct from a successful extraction that yields an
/// empty list: callers must check for it before treating the value as
/// membership data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    /// The mapping has no entry for the requested logical field
    #[error("Mapping has no '{field}' entry")]
    MissingField { field: String },

    /// The template holds no `<attribute>` reference
    #[error("Mapping template '{template}' has no <attribute> reference")]
    NoAttributeReference { template: String },

    /// The referenced attribute is not present on the record
    #[error("Attribute '{attribute}' is not present on the record")]
    AttributeNotFound { attribute: String },
}

/// Errors a directory client reports for a search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// No entry exists at or below the search base
    #[error("No such object: {dn}")]
    NoSuchObject { dn: String },

    /// The search filter could not be parsed
    #[error("Invalid filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    /// The directory could not serve the request
    #[error("Directory unavailable: {message}")]
    Unavailable { message: String },
}

impl DirectoryError {
    /// Create an invalid filter error.
    pub fn invalid_filter(filter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            filter: filter.into(),
            message: message.into(),
        }
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Errors loading resolver configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration is not valid JSON or does not match the expected shape
    #[error("Configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parsed but holds an unusable value
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    /// Create an invalid configuration error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Errors from the end-to-end resolution pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError<E>
where
    E: std::error::Error + 'static,
{
    /// The user's membership could not be read from the record
    #[error("Membership mapping failed: {0}")]
    Mapping(#[from] MappingError),

    /// The directory client failed a reverse lookup
    #[error("Directory search failed: {0}")]
    Directory(#[source] E),
}

/// Result type for mapping extraction.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
