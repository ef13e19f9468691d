//! The two-pass filter run.

use fignos_ast::Pandoc;
use fignos_config::{Config, unknown_keys};

use crate::attach::AttachAttributes;
use crate::context::RunContext;
use crate::diagnostics::Diagnostic;
use crate::error::FilterError;
use crate::figure::ProcessFigures;
use crate::format::{OutputFormat, PandocVersion};
use crate::header_includes;
use crate::repair::RepairReferences;
use crate::resolve::ResolveReferences;
use crate::sections::{SectionNumbers, StripSectionNumbers};
use crate::stage::{Stage, run_stages};

/// Options fixed by the caller, as opposed to those read from metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterOptions {
    pub format: OutputFormat,
    pub version: PandocVersion,
}

/// Result of a successful run.
#[derive(Debug)]
pub struct FilterOutput {
    /// The transformed document.
    pub document: Pandoc,
    /// Warnings admitted by the document's warning level.
    pub diagnostics: Vec<Diagnostic>,
}

/// Numbers figures and resolves references to them.
///
/// # Example
///
/// ```
/// use fignos::{Filter, OutputFormat};
/// use fignos_ast::Pandoc;
///
/// let doc = Pandoc::new(vec![1, 22, 2]);
/// let output = Filter::new(OutputFormat::Html).run(doc.clone()).unwrap();
/// assert_eq!(output.document, doc);
/// assert!(output.diagnostics.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct Filter {
    options: FilterOptions,
}

impl Filter {
    /// Create a filter for an output format, assuming a modern pandoc.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            options: FilterOptions {
                format,
                version: PandocVersion::default(),
            },
        }
    }

    /// Set the version of the pandoc executable running the filter.
    #[must_use]
    pub fn with_pandoc_version(mut self, version: PandocVersion) -> Self {
        self.options.version = version;
        self
    }

    #[must_use]
    pub fn options(&self) -> FilterOptions {
        self.options
    }

    /// Run the filter over one document.
    ///
    /// Figures are numbered in a first full pass and references resolved in
    /// a second, so a reference may come before or after its figure.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Config`] when a metadata option is malformed.
    /// Problems confined to one figure or reference are reported as
    /// diagnostics instead.
    pub fn run(&self, mut document: Pandoc) -> Result<FilterOutput, FilterError> {
        let config = Config::from_meta(&document.meta)?;
        let mut ctx = RunContext::new(config, self.options.format, self.options.version);

        for key in unknown_keys(&document.meta) {
            ctx.warn(Diagnostic::UnknownMetadataKey {
                key: key.to_owned(),
            });
        }

        let mut build: Vec<Box<dyn Stage>> = vec![
            Box::new(AttachAttributes::images()),
            Box::new(SectionNumbers::default()),
            Box::new(ProcessFigures),
            Box::new(StripSectionNumbers),
        ];
        run_stages(&mut build, &mut document.blocks, &mut ctx)?;

        let mut resolve: Vec<Box<dyn Stage>> = vec![
            Box::new(RepairReferences),
            Box::new(ResolveReferences),
            Box::new(AttachAttributes::spans()),
        ];
        run_stages(&mut resolve, &mut document.blocks, &mut ctx)?;

        if ctx.format.is_tex() {
            header_includes::write(&mut document.meta, &mut ctx);
        }

        let diagnostics = ctx.take_diagnostics();
        tracing::info!(
            format = ?ctx.format,
            figures = ctx.references.len(),
            diagnostics = diagnostics.len(),
            "Filter run complete"
        );
        Ok(FilterOutput {
            document,
            diagnostics,
        })
    }
}
