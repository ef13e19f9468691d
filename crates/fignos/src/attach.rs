//! Attaches `{...}` attribute text written after images and spans.
//!
//! Pandoc leaves attributes it does not understand as plain text following
//! the element. This stage gathers that text, parses it and moves it onto
//! the element.

use fignos_ast::{Attr, Inline, ListPosition, QuoteType, stringify};

use crate::attrs::{AttributeSource, Recovered, has_legacy_suffix, recover};
use crate::context::RunContext;
use crate::diagnostics::Diagnostic;
use crate::error::{AttributeError, FilterError};
use crate::stage::Stage;

/// Element kind whose trailing attributes are attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AttachTarget {
    Image,
    Span,
}

impl AttachTarget {
    fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Span => "span",
        }
    }
}

#[derive(Debug)]
pub(crate) struct AttachAttributes {
    target: AttachTarget,
}

impl AttachAttributes {
    pub(crate) fn images() -> Self {
        Self {
            target: AttachTarget::Image,
        }
    }

    pub(crate) fn spans() -> Self {
        Self {
            target: AttachTarget::Span,
        }
    }

    fn matches(&self, inline: &Inline) -> bool {
        match self.target {
            AttachTarget::Image => matches!(inline, Inline::Image(..)),
            AttachTarget::Span => matches!(inline, Inline::Span(..)),
        }
    }
}

impl Stage for AttachAttributes {
    fn name(&self) -> &'static str {
        match self.target {
            AttachTarget::Image => "attach-image-attributes",
            AttachTarget::Span => "attach-span-attributes",
        }
    }

    fn inlines(
        &mut self,
        inlines: &mut Vec<Inline>,
        _position: ListPosition,
        ctx: &mut RunContext,
    ) -> Result<(), FilterError> {
        let mut index = 0;
        while index < inlines.len() {
            if self.matches(&inlines[index]) {
                attach_at(inlines, index, self.target, ctx);
            }
            index += 1;
        }
        Ok(())
    }
}

/// Attribute text found after an element.
struct Trailing {
    text: String,
    /// Index of the first inline consumed.
    start: usize,
    /// Index of the last inline consumed.
    end: usize,
    /// Text after the closing brace in the last inline.
    rest: String,
}

/// Handle the element at `index`, rewriting the list on success.
fn attach_at(inlines: &mut Vec<Inline>, index: usize, target: AttachTarget, ctx: &mut RunContext) {
    let legacy_url = match &inlines[index] {
        Inline::Image(_, _, image_target)
            if !ctx.version.supports_image_attributes() && has_legacy_suffix(&image_target.url) =>
        {
            Some(image_target.url.clone())
        }
        _ => None,
    };

    let trailing = match find_trailing(inlines, index) {
        Some(Ok(trailing)) => Some(trailing),
        Some(Err(err)) => {
            // Unclosed text can still be rescued from a legacy path.
            if let Some(url) = &legacy_url
                && let Ok(recovered) = AttributeSource::LegacySuffix(url).parse()
            {
                apply(&mut inlines[index], recovered);
                return;
            }
            ctx.warn(Diagnostic::MalformedAttributes {
                element: target.label(),
                source: err,
            });
            return;
        }
        None => None,
    };

    let mut sources = Vec::with_capacity(2);
    if let Some(trailing) = &trailing {
        sources.push(AttributeSource::Canonical(&trailing.text));
    }
    if let Some(url) = &legacy_url {
        sources.push(AttributeSource::LegacySuffix(url));
    }
    if sources.is_empty() {
        return;
    }

    match recover(&sources) {
        Ok(recovered) => {
            let consumed = recovered.path.is_none();
            apply(&mut inlines[index], recovered);
            if consumed && let Some(trailing) = trailing {
                let rest = (!trailing.rest.is_empty()).then(|| Inline::Str(trailing.rest));
                inlines.splice(index + 1..=trailing.end, rest);
                tracing::debug!(
                    element = target.label(),
                    consumed = trailing.end + 1 - trailing.start,
                    "Attached trailing attributes"
                );
            }
        }
        Err(err) => ctx.warn(Diagnostic::MalformedAttributes {
            element: target.label(),
            source: err,
        }),
    }
}

/// Replace the element's attributes, and its path for legacy recoveries.
fn apply(inline: &mut Inline, recovered: Recovered) {
    let attr = Attr::from(recovered.attributes);
    match inline {
        Inline::Image(current, _, target) => {
            *current = attr;
            if let Some(path) = recovered.path {
                target.url = path;
            }
        }
        Inline::Span(current, _) => *current = attr,
        _ => {}
    }
}

/// Locate `{...}` text directly after the element at `index`.
///
/// Returns `None` when no attribute text follows at all.
fn find_trailing(inlines: &[Inline], index: usize) -> Option<Result<Trailing, AttributeError>> {
    let mut start = index + 1;
    if matches!(inlines.get(start), Some(Inline::Space)) {
        start += 1;
    }
    match inlines.get(start) {
        Some(Inline::Str(s)) if s.starts_with('{') => {}
        _ => return None,
    }

    let mut text = String::new();
    for (offset, inline) in inlines[start..].iter().enumerate() {
        match inline {
            Inline::Str(s) => {
                if let Some(close) = s.find('}') {
                    text.push_str(&s[..=close]);
                    return Some(Ok(Trailing {
                        text,
                        start,
                        end: start + offset,
                        rest: s[close + 1..].to_owned(),
                    }));
                }
                text.push_str(s);
            }
            Inline::Space | Inline::SoftBreak => text.push(' '),
            Inline::Quoted(kind, content) => {
                let quote = match kind {
                    QuoteType::SingleQuote => '\'',
                    QuoteType::DoubleQuote => '"',
                };
                text.push(quote);
                text.push_str(&stringify(content));
                text.push(quote);
            }
            _ => break,
        }
    }
    Some(Err(AttributeError::Unterminated(text)))
}
