//! Document root and metadata values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::{Block, Inline};
use crate::text::stringify;

/// Document metadata map.
pub type Meta = BTreeMap<String, MetaValue>;

/// A complete pandoc document as exchanged with filters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pandoc {
    /// Pandoc API version triple, e.g. `[1, 22, 2]`.
    #[serde(rename = "pandoc-api-version")]
    pub api_version: Vec<u32>,
    /// Document metadata.
    pub meta: Meta,
    /// Document body.
    pub blocks: Vec<Block>,
}

impl Pandoc {
    /// Create an empty document for the given API version.
    #[must_use]
    pub fn new(api_version: Vec<u32>) -> Self {
        Self {
            api_version,
            meta: Meta::new(),
            blocks: Vec::new(),
        }
    }
}

/// Metadata value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum MetaValue {
    MetaMap(BTreeMap<String, MetaValue>),
    MetaList(Vec<MetaValue>),
    MetaBool(bool),
    MetaString(String),
    MetaInlines(Vec<Inline>),
    MetaBlocks(Vec<Block>),
}

impl MetaValue {
    /// Plain-text view of a scalar value.
    ///
    /// `MetaString` is returned as-is and `MetaInlines` is stringified.
    /// Returns `None` for maps, lists, bools and blocks.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::MetaString(s) => Some(s.clone()),
            Self::MetaInlines(inlines) => Some(stringify(inlines)),
            _ => None,
        }
    }
}
