//! Structured element attributes and their text encodings.
//!
//! Parses the `{#id .class key="value"}` syntax, either as written after an
//! element or as recovered from a legacy percent-encoded image path suffix.

use fignos_ast::Attr;
use percent_encoding::percent_decode_str;

use crate::error::AttributeError;

/// Percent-encoded ` {` that older pandoc leaves in image reference paths.
const LEGACY_SUFFIX_START: &str = "%20%7B";

/// Identifier, classes and ordered key/value pairs of one element.
///
/// # Example
///
/// ```
/// use fignos::Attributes;
///
/// let attrs = Attributes::parse(r#"{#fig:plot .wide tag="B.1"}"#).unwrap();
/// assert_eq!(attrs.id, "fig:plot");
/// assert_eq!(attrs.classes, vec!["wide"]);
/// assert_eq!(attrs.get("tag"), Some("B.1"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    /// Element identifier (empty when absent).
    pub id: String,
    /// Class names in document order.
    pub classes: Vec<String>,
    pairs: Vec<(String, String)>,
}

impl Attributes {
    /// Parse a braced attribute block.
    ///
    /// `-` is shorthand for the `unnumbered` class. Values may be bare or
    /// wrapped in single or double quotes.
    ///
    /// # Errors
    ///
    /// Returns an [`AttributeError`] when the text is not a well-formed
    /// attribute block.
    pub fn parse(text: &str) -> Result<Self, AttributeError> {
        let trimmed = text.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| AttributeError::Unbraced(trimmed.to_owned()))?;

        let mut attrs = Self::default();
        let mut remaining = inner.trim_start();

        while !remaining.is_empty() {
            if let Some(rest) = remaining.strip_prefix('#') {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                attrs.id = rest[..end].to_owned();
                remaining = &rest[end..];
            } else if let Some(rest) = remaining.strip_prefix('.') {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                attrs.classes.push(rest[..end].to_owned());
                remaining = &rest[end..];
            } else if remaining == "-" || remaining.starts_with("- ") {
                attrs.classes.push("unnumbered".to_owned());
                remaining = &remaining[1..];
            } else {
                let (key, value, rest) = parse_key_value(remaining)?;
                attrs.set(key, value);
                remaining = rest;
            }
            remaining = remaining.trim_start();
        }

        Ok(attrs)
    }

    /// Get a key/value attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a key, replacing an existing value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(pair) = self.pairs.iter_mut().find(|(k, _)| *k == key) {
            pair.1 = value;
        } else {
            self.pairs.push((key, value));
        }
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(index).1)
    }

    /// Key/value pairs in document order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

impl From<&Attr> for Attributes {
    fn from(attr: &Attr) -> Self {
        Self {
            id: attr.id.clone(),
            classes: attr.classes.clone(),
            pairs: attr.attributes.clone(),
        }
    }
}

impl From<Attributes> for Attr {
    fn from(attrs: Attributes) -> Self {
        Self {
            id: attrs.id,
            classes: attrs.classes,
            attributes: attrs.pairs,
        }
    }
}

/// Where an element's attribute text comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeSource<'a> {
    /// A `{...}` block written after the element.
    Canonical(&'a str),
    /// An image path with a percent-encoded ` {...}` suffix, as produced by
    /// pandoc before 1.16 for image references.
    LegacySuffix(&'a str),
}

/// Attributes recovered from an [`AttributeSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recovered {
    pub attributes: Attributes,
    /// Image path with the attribute suffix removed (legacy source only).
    pub path: Option<String>,
}

impl AttributeSource<'_> {
    /// Parse the source.
    ///
    /// # Errors
    ///
    /// Returns an [`AttributeError`] when the text is malformed or a legacy
    /// path carries no attribute suffix.
    pub fn parse(self) -> Result<Recovered, AttributeError> {
        match self {
            Self::Canonical(text) => Ok(Recovered {
                attributes: Attributes::parse(text)?,
                path: None,
            }),
            Self::LegacySuffix(url) => {
                let start = url
                    .find(LEGACY_SUFFIX_START)
                    .ok_or_else(|| AttributeError::Unbraced(url.to_owned()))?;
                let encoded = &url[start + "%20".len()..];
                let decoded = percent_decode_str(encoded).decode_utf8_lossy();
                Ok(Recovered {
                    attributes: Attributes::parse(&decoded)?,
                    path: Some(url[..start].to_owned()),
                })
            }
        }
    }
}

/// Try each source in turn, returning the first success.
///
/// When every source fails the error of the first one is returned, since it
/// describes what the author actually wrote.
///
/// # Errors
///
/// Returns an [`AttributeError`] when no source parses.
pub fn recover(sources: &[AttributeSource<'_>]) -> Result<Recovered, AttributeError> {
    let mut first_error = None;
    for source in sources {
        match source.parse() {
            Ok(recovered) => return Ok(recovered),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| AttributeError::Unbraced(String::new())))
}

/// Whether an image path carries a legacy attribute suffix.
pub(crate) fn has_legacy_suffix(url: &str) -> bool {
    url.contains(LEGACY_SUFFIX_START)
}

/// Parse `key=value`, `key="value"` or `key='value'`.
fn parse_key_value(s: &str) -> Result<(&str, &str, &str), AttributeError> {
    let token_end = s.find(char::is_whitespace).unwrap_or(s.len());
    let Some(eq_pos) = s[..token_end].find('=') else {
        return Err(AttributeError::UnexpectedToken(s[..token_end].to_owned()));
    };
    let key = &s[..eq_pos];
    if key.is_empty() {
        return Err(AttributeError::UnexpectedToken(s[..token_end].to_owned()));
    }

    let after_eq = &s[eq_pos + 1..];
    for quote in ['"', '\''] {
        if let Some(stripped) = after_eq.strip_prefix(quote) {
            let end_quote = stripped
                .find(quote)
                .ok_or_else(|| AttributeError::UnterminatedQuote {
                    key: key.to_owned(),
                })?;
            return Ok((key, &stripped[..end_quote], &stripped[end_quote + 1..]));
        }
    }

    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
    Ok((key, &after_eq[..end], &after_eq[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_empty_block() {
        assert_eq!(Attributes::parse("{}").unwrap(), Attributes::default());
    }

    #[test]
    fn test_parse_full_block() {
        let attrs = Attributes::parse(r#"{#fig:a .one .two width=50% tag='S 1' alt="x y"}"#).unwrap();
        assert_eq!(attrs.id, "fig:a");
        assert_eq!(attrs.classes, vec!["one", "two"]);
        assert_eq!(
            attrs.pairs(),
            &[
                ("width".to_owned(), "50%".to_owned()),
                ("tag".to_owned(), "S 1".to_owned()),
                ("alt".to_owned(), "x y".to_owned()),
            ]
        );
    }

    #[test]
    fn test_parse_unnumbered_shorthand() {
        let attrs = Attributes::parse("{- #fig:x}").unwrap();
        assert_eq!(attrs.classes, vec!["unnumbered"]);
        assert_eq!(attrs.id, "fig:x");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Attributes::parse("#fig:a"),
            Err(AttributeError::Unbraced("#fig:a".to_owned()))
        );
        assert_eq!(
            Attributes::parse(r#"{tag="open}"#),
            Err(AttributeError::UnterminatedQuote {
                key: "tag".to_owned()
            })
        );
        assert_eq!(
            Attributes::parse("{#fig:a stray}"),
            Err(AttributeError::UnexpectedToken("stray".to_owned()))
        );
        assert_eq!(
            Attributes::parse("{=x}"),
            Err(AttributeError::UnexpectedToken("=x".to_owned()))
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut attrs = Attributes::parse("{a=1 b=2}").unwrap();
        attrs.set("a", "3");
        attrs.set("c", "4");
        assert_eq!(attrs.get("a"), Some("3"));
        assert_eq!(attrs.pairs()[0].0, "a");
        assert_eq!(attrs.remove("b"), Some("2".to_owned()));
        assert!(!attrs.contains("b"));
        assert_eq!(attrs.remove("b"), None);
    }

    #[test]
    fn test_attr_conversion() {
        let attrs = Attributes::parse("{#fig:a .c k=v}").unwrap();
        let attr = Attr::from(attrs.clone());
        assert_eq!(attr.id, "fig:a");
        assert_eq!(attr.attributes, vec![("k".to_owned(), "v".to_owned())]);
        assert_eq!(Attributes::from(&attr), attrs);
    }

    #[test]
    fn test_legacy_suffix() {
        let recovered = AttributeSource::LegacySuffix("plot.png%20%7B#fig:plot%20tag=A%7D")
            .parse()
            .unwrap();
        assert_eq!(recovered.path.as_deref(), Some("plot.png"));
        assert_eq!(recovered.attributes.id, "fig:plot");
        assert_eq!(recovered.attributes.get("tag"), Some("A"));
    }

    #[test]
    fn test_legacy_suffix_missing() {
        assert!(AttributeSource::LegacySuffix("plot.png").parse().is_err());
        assert!(!has_legacy_suffix("plot.png"));
    }

    #[test]
    fn test_recover_falls_back() {
        let recovered = recover(&[
            AttributeSource::Canonical("{#fig:a"),
            AttributeSource::LegacySuffix("a.png%20%7B#fig:b%7D"),
        ])
        .unwrap();
        assert_eq!(recovered.attributes.id, "fig:b");
    }

    #[test]
    fn test_recover_reports_first_error() {
        let err = recover(&[
            AttributeSource::Canonical("{#fig:a stray}"),
            AttributeSource::LegacySuffix("a.png"),
        ])
        .unwrap_err();
        assert_eq!(err, AttributeError::UnexpectedToken("stray".to_owned()));
    }
}
