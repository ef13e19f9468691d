//! Target output formats and host pandoc capabilities.

use std::fmt;

use crate::error::FilterError;

/// Output format family the document is being converted to.
///
/// The family decides which concrete markup the filter emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// `latex` and `beamer`.
    Latex,
    /// `html`, `html4`, `html5`, `epub`, `epub2` and `epub3`.
    Html,
    /// `docx`.
    Docx,
    /// Any other writer (markdown, plain text, ...).
    Other,
}

impl OutputFormat {
    /// Classify a pandoc writer name.
    ///
    /// Extensions (`html5+smart`) are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use fignos::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::from_name("beamer"), OutputFormat::Latex);
    /// assert_eq!(OutputFormat::from_name("epub3"), OutputFormat::Html);
    /// assert_eq!(OutputFormat::from_name("markdown"), OutputFormat::Other);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let base = name.split(['+', '-']).next().unwrap_or(name);
        match base {
            "latex" | "beamer" => Self::Latex,
            "html" | "html4" | "html5" | "epub" | "epub2" | "epub3" => Self::Html,
            "docx" => Self::Docx,
            _ => Self::Other,
        }
    }

    /// True for TeX-like writers.
    #[must_use]
    pub fn is_tex(self) -> bool {
        self == Self::Latex
    }

    /// Whether section-scoped figure numbers must be written as tags.
    ///
    /// LaTeX numbers figures within sections natively; HTML and docx
    /// receive explicit `section.number` tags instead.
    #[must_use]
    pub fn hard_codes_section_numbers(self) -> bool {
        matches!(self, Self::Html | Self::Docx)
    }
}

/// Version of the pandoc executable driving the filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PandocVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PandocVersion {
    /// Assumed when the caller does not say otherwise.
    pub const MODERN: Self = Self::new(3, 0, 0);

    const IMAGE_ATTRIBUTES: Self = Self::new(1, 16, 0);
    const FIGURE_LABELS: Self = Self::new(1, 17, 0);

    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted version such as `2.19.2` or `1.15`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidVersion`] for empty or non-numeric input.
    pub fn parse(s: &str) -> Result<Self, FilterError> {
        let invalid = || FilterError::InvalidVersion(s.to_owned());
        let mut parts = [0u32; 3];
        let mut count = 0;
        for (slot, piece) in parts.iter_mut().zip(s.trim().split('.')) {
            *slot = piece.parse().map_err(|_| invalid())?;
            count += 1;
        }
        if count == 0 {
            return Err(invalid());
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    /// Images carry native attributes (pandoc 1.16 and later).
    #[must_use]
    pub fn supports_image_attributes(self) -> bool {
        self >= Self::IMAGE_ATTRIBUTES
    }

    /// The LaTeX writer emits `\label` for figures itself (1.17 and later).
    #[must_use]
    pub fn labels_figures(self) -> bool {
        self >= Self::FIGURE_LABELS
    }
}

impl Default for PandocVersion {
    fn default() -> Self {
        Self::MODERN
    }
}

impl fmt::Display for PandocVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
