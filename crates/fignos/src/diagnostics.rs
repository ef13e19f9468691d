//! Non-fatal conditions reported on the side channel.

use crate::error::AttributeError;

/// A recoverable condition met during a run.
///
/// Diagnostics are collected on the run and handed back with the
/// transformed document; they never appear inside the document itself.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    /// A reference names a label no figure defines.
    #[error("Undefined figure reference: {label}")]
    UnresolvedReference { label: String },
    /// Metadata key with a reserved prefix that is not recognized.
    #[error("Unknown meta variable \"{key}\"")]
    UnknownMetadataKey { key: String },
    /// Attributes written after an element could not be parsed.
    #[error("Attributes after {element} could not be parsed: {source}")]
    MalformedAttributes {
        element: &'static str,
        source: AttributeError,
    },
    /// Two figures share one label; references resolve to the first.
    #[error("Duplicate figure label: {label}")]
    DuplicateLabel { label: String },
    /// Declarations were appended to `header-includes`.
    #[error(
        "Wrote the following blocks to header-includes. If you use pandoc's \
         --include-in-header option then you will need to manually include \
         these yourself.\n{}",
        .blocks.join("\n")
    )]
    HeaderIncludesWritten { blocks: Vec<String> },
}

impl Diagnostic {
    /// Warning level at which the diagnostic is reported.
    #[must_use]
    pub fn level(&self) -> fignos_config::WarningLevel {
        match self {
            Self::HeaderIncludesWritten { .. } => fignos_config::WarningLevel::All,
            _ => fignos_config::WarningLevel::Some,
        }
    }
}
