//! Plain-text flattening of inline content.

use crate::document::{Inline, QuoteType};

/// Flatten inlines into plain text.
///
/// Spaces and breaks become a single space, quoted text regains its quote
/// marks, raw inlines and notes are dropped.
///
/// # Examples
///
/// ```
/// use fignos_ast::{Inline, QuoteType, stringify};
///
/// let inlines = vec![
///     Inline::str("tag="),
///     Inline::Quoted(QuoteType::DoubleQuote, vec![Inline::str("B.1")]),
/// ];
/// assert_eq!(stringify(&inlines), r#"tag="B.1""#);
/// ```
#[must_use]
pub fn stringify(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_inlines(inlines, &mut out);
    out
}

fn push_inlines(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Str(s) | Inline::Code(_, s) | Inline::Math(_, s) => out.push_str(s),
            Inline::Space | Inline::SoftBreak | Inline::LineBreak => out.push(' '),
            Inline::Quoted(kind, content) => {
                let quote = match kind {
                    QuoteType::SingleQuote => '\'',
                    QuoteType::DoubleQuote => '"',
                };
                out.push(quote);
                push_inlines(content, out);
                out.push(quote);
            }
            Inline::Emph(content)
            | Inline::Underline(content)
            | Inline::Strong(content)
            | Inline::Strikeout(content)
            | Inline::Superscript(content)
            | Inline::Subscript(content)
            | Inline::SmallCaps(content)
            | Inline::Cite(_, content)
            | Inline::Link(_, content, _)
            | Inline::Image(_, content, _)
            | Inline::Span(_, content) => push_inlines(content, out),
            Inline::RawInline(..) | Inline::Note(_) => {}
        }
    }
}
