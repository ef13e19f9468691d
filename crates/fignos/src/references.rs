//! Figure labels and what they display as.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use fignos_ast::Inline;

/// What a figure is called in captions and references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayValue {
    /// Sequential number within the current section.
    Number(u32),
    /// Author-supplied (or section-synthesized) tag.
    Tag(String),
}

impl DisplayValue {
    /// Render as inline content.
    ///
    /// A tag wrapped in a single pair of `$` becomes inline math with its
    /// spaces escaped; everything else is a plain `Str`.
    #[must_use]
    pub fn to_inlines(&self) -> Vec<Inline> {
        match self {
            Self::Number(n) => vec![Inline::str(n.to_string())],
            Self::Tag(tag) => match math_tag(tag) {
                Some(math) => vec![Inline::inline_math(math.replace(' ', r"\ "))],
                None => vec![Inline::str(tag.clone())],
            },
        }
    }

    /// Whether this is a tag rather than a number.
    #[must_use]
    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

/// Body of a `$...$` tag.
fn math_tag(tag: &str) -> Option<&str> {
    let inner = tag.strip_prefix('$')?.strip_suffix('$')?;
    (!inner.is_empty() && !inner.contains('$')).then_some(inner)
}

/// A recorded figure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub display: DisplayValue,
    /// Section the figure belongs to, when known.
    pub section: Option<String>,
}

/// Labels recorded while numbering, read while resolving.
///
/// Entries are write-once: a second figure with the same label does not
/// replace the first.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    entries: HashMap<String, Reference>,
}

impl ReferenceTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a figure. Returns `false` (keeping the existing entry) when the
    /// label is already taken.
    pub fn insert(&mut self, label: impl Into<String>, reference: Reference) -> bool {
        match self.entries.entry(label.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(reference);
                true
            }
        }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Reference> {
        self.entries.get(label)
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
