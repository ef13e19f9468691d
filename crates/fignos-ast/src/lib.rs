//! Pandoc JSON document model for fignos.
//!
//! This crate provides serde types mirroring the pandoc JSON AST (API
//! versions 1.22 and 1.23) together with a generic mutable tree walker.
//!
//! # Architecture
//!
//! - [`Pandoc`], [`Block`], [`Inline`] and [`MetaValue`] round-trip the
//!   `{"t": ..., "c": ...}` encoding pandoc uses for filters.
//! - [`MutVisitor`] and [`walk_blocks`] visit every block and every inline
//!   list in document order, allowing blocks to be replaced and inline lists
//!   to be edited in place.
//!
//! # Example
//!
//! ```
//! use fignos_ast::{Inline, Pandoc, stringify};
//!
//! let json = r#"{"pandoc-api-version":[1,22,2],"meta":{},
//!     "blocks":[{"t":"Para","c":[{"t":"Str","c":"Hello"},{"t":"Space"},{"t":"Str","c":"world"}]}]}"#;
//! let doc: Pandoc = serde_json::from_str(json).unwrap();
//! let fignos_ast::Block::Para(inlines) = &doc.blocks[0] else { unreachable!() };
//! assert_eq!(stringify(inlines), "Hello world");
//! ```

mod document;
mod meta;
mod text;
mod walk;

pub use document::{
    Alignment, Attr, Block, Caption, Cell, Citation, CitationMode, ColSpec, ColWidth, Inline,
    ListAttributes, ListNumberDelim, ListNumberStyle, MathType, QuoteType, Row, TableBody,
    TableFoot, TableHead, Target,
};
pub use meta::{Meta, MetaValue, Pandoc};
pub use text::stringify;
pub use walk::{ListPosition, MutVisitor, walk_blocks, walk_inlines};
