//! Figure numbering and cross-references for pandoc documents.
//!
//! This crate numbers the figures of a pandoc document and replaces
//! `@fig:label` citations with references to them, rendered for the output
//! format being produced.
//!
//! # Architecture
//!
//! A run makes two passes over the document, each a list of stages applied
//! in order by the tree walker from `fignos-ast`:
//!
//! 1. Build: attach `{...}` attributes to images, stamp section numbers,
//!    number figures (writing their captions and format markup), strip the
//!    section numbers again.
//! 2. Resolve: repair references swallowed by email autolinks, resolve
//!    references against the table built in the first pass, attach
//!    attributes to spans.
//!
//! For LaTeX the declarations the output needs are then added to the
//! `header-includes` metadata.
//!
//! # Example
//!
//! ```
//! use fignos::{Filter, OutputFormat};
//! use fignos_ast::Pandoc;
//!
//! let json = r#"{"pandoc-api-version":[1,22,2],"meta":{},"blocks":[
//!     {"t":"Para","c":[{"t":"Image","c":[["fig:plot",[],[]],[{"t":"Str","c":"Results"}],["plot.png","fig:"]]}]}
//! ]}"#;
//! let doc: Pandoc = serde_json::from_str(json).unwrap();
//!
//! let output = Filter::new(OutputFormat::Html).run(doc).unwrap();
//! assert!(output.diagnostics.is_empty());
//! ```

mod attach;
mod attrs;
mod caption;
mod context;
mod diagnostics;
mod error;
mod figure;
mod filter;
mod format;
mod header_includes;
mod markup;
mod references;
mod repair;
mod resolve;
mod sections;
mod stage;

pub use attrs::{AttributeSource, Attributes, Recovered, recover};
pub use context::{RaisedFlags, RunContext, SectionState};
pub use diagnostics::Diagnostic;
pub use error::{AttributeError, FilterError};
pub use filter::{Filter, FilterOptions, FilterOutput};
pub use format::{OutputFormat, PandocVersion};
pub use references::{DisplayValue, Reference, ReferenceTable};
pub use resolve::UNRESOLVED_CLASS;
