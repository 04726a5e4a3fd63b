//! LDAP search filters (RFC 4515).
//!
//! Used by [`InMemoryDirectory`](super::InMemoryDirectory) to evaluate searches and
//! by the default [`DirectoryClient::escape_dn_for_filter`](super::DirectoryClient)
//! to make user-supplied values safe for interpolation.
//!
//! Matching is case-insensitive for both attribute names and values, which is what
//! the usual group attributes (`cn`, `member`, `memberUid`, `objectClass`) use.

use super::DirectoryEntry;
use crate::error::DirectoryError;

/// Escape a value for interpolation into a filter.
///
/// Escapes `\`, `*`, `(`, `)` and NUL as `\XX` hex pairs.
///
/// ```rust
/// use ldap_group_membership::directory::escape_filter_value;
///
/// assert_eq!(escape_filter_value("cn=a*(b)"), r"cn=a\2a\28b\29");
/// ```
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\5c"),
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// A parsed search filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Equality {
        attribute: String,
        value: String,
    },
    Present {
        attribute: String,
    },
    Substring {
        attribute: String,
        initial: Option<String>,
        any: Vec<String>,
        last: Option<String>,
    },
    GreaterOrEqual {
        attribute: String,
        value: String,
    },
    LessOrEqual {
        attribute: String,
        value: String,
    },
    Approx {
        attribute: String,
        value: String,
    },
}

impl Filter {
    /// Parse a filter string. A filter without surrounding parentheses, such as
    /// `objectClass=group`, is accepted as a single item.
    pub fn parse(input: &str) -> Result<Self, DirectoryError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DirectoryError::invalid_filter(input, "empty filter"));
        }

        let wrapped;
        let source = if trimmed.starts_with('(') {
            trimmed
        } else {
            wrapped = format!("({trimmed})");
            wrapped.as_str()
        };

        let mut parser = Parser {
            input: source,
            pos: 0,
        };
        let filter = parser
            .filter()
            .map_err(|message| DirectoryError::invalid_filter(input, message))?;
        if parser.pos != source.len() {
            return Err(DirectoryError::invalid_filter(
                input,
                format!("unexpected trailing input at offset {}", parser.pos),
            ));
        }
        Ok(filter)
    }

    /// Evaluate the filter against an entry.
    pub fn matches(&self, entry: &DirectoryEntry) -> bool {
        match self {
            Filter::And(filters) => filters.iter().all(|f| f.matches(entry)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(entry)),
            Filter::Not(filter) => !filter.matches(entry),
            Filter::Present { attribute } => !values_of(entry, attribute).is_empty(),
            Filter::Equality { attribute, value } | Filter::Approx { attribute, value } => {
                let value = value.to_lowercase();
                values_of(entry, attribute)
                    .iter()
                    .any(|v| v.to_lowercase() == value)
            }
            Filter::GreaterOrEqual { attribute, value } => {
                let value = value.to_lowercase();
                values_of(entry, attribute)
                    .iter()
                    .any(|v| v.to_lowercase() >= value)
            }
            Filter::LessOrEqual { attribute, value } => {
                let value = value.to_lowercase();
                values_of(entry, attribute)
                    .iter()
                    .any(|v| v.to_lowercase() <= value)
            }
            Filter::Substring {
                attribute,
                initial,
                any,
                last,
            } => values_of(entry, attribute)
                .iter()
                .any(|v| substring_match(&v.to_lowercase(), initial, any, last)),
        }
    }
}

/// Attribute values, with `dn`/`distinguishedName`/`entryDN` resolving to the DN.
fn values_of(entry: &DirectoryEntry, attribute: &str) -> Vec<String> {
    match attribute.to_lowercase().as_str() {
        "dn" | "distinguishedname" | "entrydn" => vec![entry.dn().to_string()],
        name => entry.get(name).map(<[String]>::to_vec).unwrap_or_default(),
    }
}

fn substring_match(
    value: &str,
    initial: &Option<String>,
    any: &[String],
    last: &Option<String>,
) -> bool {
    let mut rest = value;
    if let Some(initial) = initial {
        let initial = initial.to_lowercase();
        match rest.strip_prefix(initial.as_str()) {
            Some(tail) => rest = tail,
            None => return false,
        }
    }
    for part in any {
        let part = part.to_lowercase();
        match rest.find(part.as_str()) {
            Some(index) => rest = &rest[index + part.len()..],
            None => return false,
        }
    }
    match last {
        Some(last) => rest.ends_with(last.to_lowercase().as_str()),
        None => true,
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.pos += ch.len_utf8();
                Ok(())
            }
            Some(ch) => Err(format!(
                "expected '{expected}' at offset {}, found '{ch}'",
                self.pos
            )),
            None => Err(format!("expected '{expected}' at end of input")),
        }
    }

    fn filter(&mut self) -> Result<Filter, String> {
        self.expect('(')?;
        let filter = match self.peek() {
            Some('&') => {
                self.pos += 1;
                Filter::And(self.filter_list()?)
            }
            Some('|') => {
                self.pos += 1;
                Filter::Or(self.filter_list()?)
            }
            Some('!') => {
                self.pos += 1;
                Filter::Not(Box::new(self.filter()?))
            }
            Some(_) => self.item()?,
            None => return Err("unterminated filter".to_string()),
        };
        self.expect(')')?;
        Ok(filter)
    }

    fn filter_list(&mut self) -> Result<Vec<Filter>, String> {
        let mut filters = Vec::new();
        while self.peek() == Some('(') {
            filters.push(self.filter()?);
        }
        if filters.is_empty() {
            return Err(format!("empty filter list at offset {}", self.pos));
        }
        Ok(filters)
    }

    fn item(&mut self) -> Result<Filter, String> {
        let rest = &self.input[self.pos..];
        let op_index = rest
            .find(['=', '~', '>', '<', ')', '('])
            .ok_or_else(|| "missing comparison operator".to_string())?;
        let attribute = rest[..op_index].trim().to_string();
        if attribute.is_empty() {
            return Err(format!("missing attribute at offset {}", self.pos));
        }
        self.pos += op_index;

        let op = match self.peek() {
            Some('=') => {
                self.pos += 1;
                '='
            }
            Some(ch @ ('~' | '>' | '<')) => {
                self.pos += 1;
                self.expect('=')?;
                ch
            }
            _ => return Err(format!("missing comparison operator at offset {}", self.pos)),
        };

        let rest = &self.input[self.pos..];
        let value_len = rest.find(')').ok_or_else(|| "unterminated value".to_string())?;
        let raw = &rest[..value_len];
        if raw.contains('(') {
            return Err(format!("unescaped '(' in value at offset {}", self.pos));
        }
        self.pos += value_len;

        match op {
            '~' => Ok(Filter::Approx {
                attribute,
                value: unescape(raw)?,
            }),
            '>' => Ok(Filter::GreaterOrEqual {
                attribute,
                value: unescape(raw)?,
            }),
            '<' => Ok(Filter::LessOrEqual {
                attribute,
                value: unescape(raw)?,
            }),
            _ if raw == "*" => Ok(Filter::Present { attribute }),
            _ if raw.contains('*') => substring(attribute, raw),
            _ => Ok(Filter::Equality {
                attribute,
                value: unescape(raw)?,
            }),
        }
    }
}

fn substring(attribute: String, raw: &str) -> Result<Filter, String> {
    let parts: Vec<&str> = raw.split('*').collect();
    let (first, tail) = parts.split_first().ok_or("empty substring")?;
    let (last, middle) = tail.split_last().ok_or("empty substring")?;

    let non_empty = |part: &str| -> Result<Option<String>, String> {
        if part.is_empty() {
            Ok(None)
        } else {
            unescape(part).map(Some)
        }
    };

    Ok(Filter::Substring {
        attribute,
        initial: non_empty(first)?,
        any: middle
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| unescape(part))
            .collect::<Result<_, _>>()?,
        last: non_empty(last)?,
    })
}

/// Decode `\XX` hex escapes in an assertion value.
fn unescape(raw: &str) -> Result<String, String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let hex = bytes
                .get(i + 1..i + 3)
                .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit))
                .and_then(|pair| std::str::from_utf8(pair).ok())
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid escape in value '{raw}'"))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| format!("value '{raw}' is not valid UTF-8"))
}
