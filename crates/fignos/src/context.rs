//! State threaded through one filter run.

use fignos_config::Config;

use crate::diagnostics::Diagnostic;
use crate::format::{OutputFormat, PandocVersion};
use crate::references::ReferenceTable;

/// Section tracking for sequential numbering.
///
/// The counter holds the number the next plain figure receives. It resets
/// to 1 whenever a figure's section differs from the last one seen; there
/// is no memory of sections left earlier.
#[derive(Debug)]
pub struct SectionState {
    current: Option<String>,
    counter: u32,
}

impl SectionState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: None,
            counter: 1,
        }
    }

    /// Observe a figure's section, resetting the counter on change.
    pub fn enter(&mut self, section: Option<&str>) {
        if self.current.as_deref() != section {
            self.current = section.map(str::to_owned);
            self.counter = 1;
        }
    }

    /// Section of the most recent figure.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Number the next plain figure receives.
    #[must_use]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Take the current number and move to the next.
    pub fn advance(&mut self) -> u32 {
        let n = self.counter;
        self.counter += 1;
        n
    }
}

impl Default for SectionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Conditions noticed during traversal that call for header declarations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RaisedFlags {
    pub has_unnumbered_figures: bool,
    pub has_tagged_figures: bool,
    pub cleveref_required: bool,
}

/// Everything a stage may read or update during a run.
#[derive(Debug)]
pub struct RunContext {
    pub config: Config,
    pub format: OutputFormat,
    pub version: PandocVersion,
    pub sections: SectionState,
    pub references: ReferenceTable,
    pub flags: RaisedFlags,
    diagnostics: Vec<Diagnostic>,
    next_bookmark: u32,
}

impl RunContext {
    #[must_use]
    pub fn new(config: Config, format: OutputFormat, version: PandocVersion) -> Self {
        Self {
            config,
            format,
            version,
            sections: SectionState::new(),
            references: ReferenceTable::new(),
            flags: RaisedFlags::default(),
            diagnostics: Vec::new(),
            next_bookmark: 0,
        }
    }

    /// Record a diagnostic if the configured warning level admits it.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        if self.config.warning_level >= diagnostic.level() {
            tracing::debug!(%diagnostic, "Recorded diagnostic");
            self.diagnostics.push(diagnostic);
        }
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Hand over the recorded diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Next docx bookmark id, unique within the run.
    pub fn next_bookmark_id(&mut self) -> u32 {
        let id = self.next_bookmark;
        self.next_bookmark += 1;
        id
    }
}
