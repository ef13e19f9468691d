//! Error types for filter runs.

use fignos_config::ConfigError;

/// Fatal error that aborts a filter run.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// Metadata option with the wrong shape.
    #[error("{0}")]
    Config(#[from] ConfigError),
    /// Unparsable `--pandocversion` value.
    #[error("Invalid pandoc version: {0:?}")]
    InvalidVersion(String),
}

/// Attribute text that could not be parsed.
///
/// Never fatal on its own: the element keeps its previous attributes and
/// a [`Diagnostic::MalformedAttributes`](crate::Diagnostic::MalformedAttributes)
/// is recorded instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    /// Text does not start with `{` and end with `}`.
    #[error("attributes must be enclosed in braces: {0:?}")]
    Unbraced(String),
    /// `{` without a matching `}` in the same inline list.
    #[error("attribute block {0:?} is never closed")]
    Unterminated(String),
    /// Quoted value without its closing quote.
    #[error("quoted value for {key:?} is never closed")]
    UnterminatedQuote {
        /// Attribute key.
        key: String,
    },
    /// Token that is neither `#id`, `.class` nor `key=value`.
    #[error("unexpected token {0:?} in attributes")]
    UnexpectedToken(String),
}
