//! Distinguished name helpers.
//!
//! Scope checks here are string tests, not hierarchical DN parsing: a group is in
//! scope when its DN ends with the configured base DN, compared case-insensitively.
//! The only structural parsing done is reading the leading RDN of a group DN in
//! trusted mode.

use crate::error::DnError;

/// Test whether `candidate` falls under the `base` scope.
///
/// An empty base matches every DN. Otherwise the trailing part of `candidate`
/// with the length of `base` must equal `base`, ignoring case. A base longer
/// than the candidate never matches.
///
/// ```rust
/// use ldap_group_membership::dn::in_scope;
///
/// assert!(in_scope("OU=Groups,DC=Example,DC=Com", "dc=example,dc=com"));
/// assert!(in_scope("cn=anything", ""));
/// assert!(!in_scope("dc=com", "dc=example,dc=com"));
/// ```
pub fn in_scope(candidate: &str, base: &str) -> bool {
    if base.is_empty() {
        return true;
    }
    ends_with_ignore_ascii_case(candidate, base)
}

/// Byte-wise suffix test with ASCII case folding.
fn ends_with_ignore_ascii_case(value: &str, suffix: &str) -> bool {
    value.len() >= suffix.len()
        && value.as_bytes()[value.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}

/// Whole-DN equality with ASCII case folding.
pub fn dn_eq(left: &str, right: &str) -> bool {
    left.eq_ignore_ascii_case(right)
}

/// Subtree test on component boundaries: `dn` is `base` itself or lies below it.
pub fn is_descendant_or_self(dn: &str, base: &str) -> bool {
    if base.is_empty() {
        return true;
    }
    if dn_eq(dn, base) {
        return true;
    }
    ends_with_ignore_ascii_case(dn, base) && dn.as_bytes()[dn.len() - base.len() - 1] == b','
}

/// The leading attribute/value pair of a DN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rdn {
    /// Lower-cased attribute type, e.g. `cn`
    pub attribute: String,
    /// Unescaped attribute value
    pub value: String,
}

/// Read the first RDN of `dn`.
///
/// The component ends at the first unescaped `,`; in a multi-valued RDN only the
/// first assertion (up to an unescaped `+`) is kept. The attribute name is trimmed
/// and lower-cased, the value is unescaped.
///
/// ```rust
/// use ldap_group_membership::dn::leading_rdn;
///
/// let rdn = leading_rdn(r"CN=Doe\, Jane,OU=People,DC=example,DC=com").unwrap();
/// assert_eq!(rdn.attribute, "cn");
/// assert_eq!(rdn.value, "Doe, Jane");
/// ```
pub fn leading_rdn(dn: &str) -> Result<Rdn, DnError> {
    if dn.trim().is_empty() {
        return Err(DnError::Empty);
    }

    let component = take_until_unescaped(dn, &[',', ';']);
    let assertion = take_until_unescaped(component, &['+']);

    let (attribute, raw_value) =
        assertion
            .split_once('=')
            .ok_or_else(|| DnError::MissingSeparator {
                rdn: component.to_string(),
            })?;

    let attribute = attribute.trim();
    if attribute.is_empty() {
        return Err(DnError::EmptyAttribute {
            rdn: component.to_string(),
        });
    }

    Ok(Rdn {
        attribute: attribute.to_lowercase(),
        value: unescape_value(raw_value.trim_start())?,
    })
}

/// Slice `input` up to the first separator not preceded by a `\` escape.
fn take_until_unescaped<'a>(input: &'a str, separators: &[char]) -> &'a str {
    let mut escaped = false;
    for (index, ch) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if separators.contains(&ch) {
            return &input[..index];
        }
    }
    input
}

/// Undo RFC 4514 escaping in an attribute value.
///
/// Handles `\` followed by a special character and `\XX` hex pairs. Unescaped
/// trailing spaces are insignificant and dropped.
pub fn unescape_value(raw: &str) -> Result<String, DnError> {
    let invalid = || DnError::InvalidEscape {
        value: raw.to_string(),
    };

    let mut bytes = Vec::with_capacity(raw.len());
    let mut significant_len = 0;
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            if ch != ' ' {
                significant_len = bytes.len();
            }
            continue;
        }

        let next = chars.next().ok_or_else(invalid)?;
        if next.is_ascii_hexdigit() {
            let low = chars
                .next()
                .filter(char::is_ascii_hexdigit)
                .ok_or_else(invalid)?;
            let pair = [next as u8, low as u8];
            let text = std::str::from_utf8(&pair).map_err(|_| invalid())?;
            bytes.push(u8::from_str_radix(text, 16).map_err(|_| invalid())?);
        } else {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(next.encode_utf8(&mut buf).as_bytes());
        }
        significant_len = bytes.len();
    }

    bytes.truncate(significant_len);
    String::from_utf8(bytes).map_err(|_| invalid())
}
