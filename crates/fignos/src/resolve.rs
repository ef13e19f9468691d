//! Resolves `@fig:label` references against the reference table.

use fignos_ast::{Attr, Citation, Inline, ListPosition, Target};

use crate::context::RunContext;
use crate::diagnostics::Diagnostic;
use crate::error::FilterError;
use crate::figure::is_label;
use crate::stage::Stage;

/// Class of the span that marks a reference to an unknown label.
pub const UNRESOLVED_CLASS: &str = "fignos-unresolved";

/// Reference style chosen by a `+`, `*` or `!` before the `@`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Modifier {
    /// Mid-sentence name (`\cref`).
    Plus,
    /// Sentence-initial name (`\Cref`).
    Star,
    /// Number only (`\ref`).
    Bang,
}

impl Modifier {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Plus),
            '*' => Some(Self::Star),
            '!' => Some(Self::Bang),
            _ => None,
        }
    }
}

/// Which name precedes the references.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NameForm {
    Plus,
    Star,
}

/// A placeholder ready to render.
#[derive(Debug)]
struct Request {
    labels: Vec<String>,
    /// `None` renders numbers only.
    name: Option<NameForm>,
    /// Clever references asked for explicitly by a modifier.
    explicit_clever: bool,
    suffix: Vec<Inline>,
}

/// Replaces reference placeholders with rendered references.
#[derive(Debug, Default)]
pub(crate) struct ResolveReferences;

impl Stage for ResolveReferences {
    fn name(&self) -> &'static str {
        "resolve-references"
    }

    fn inlines(
        &mut self,
        inlines: &mut Vec<Inline>,
        position: ListPosition,
        ctx: &mut RunContext,
    ) -> Result<(), FilterError> {
        let mut index = 0;
        while index < inlines.len() {
            if matches!(&inlines[index], Inline::Cite(citations, _) if is_placeholder(citations)) {
                index = resolve_at(inlines, index, position, ctx);
            } else {
                index += 1;
            }
        }
        Ok(())
    }
}

/// Whether a citation group refers to figures only.
fn is_placeholder(citations: &[Citation]) -> bool {
    !citations.is_empty() && citations.iter().all(|c| is_label(&c.citation_id))
}

/// Resolve the placeholder at `index`, returning the index after its output.
fn resolve_at(
    inlines: &mut Vec<Inline>,
    mut index: usize,
    position: ListPosition,
    ctx: &mut RunContext,
) -> usize {
    let modifier = take_modifier(inlines, &mut index);
    strip_braces(inlines, &mut index);

    let name = match modifier {
        Some(Modifier::Bang) => None,
        Some(Modifier::Star) => Some(NameForm::Star),
        Some(Modifier::Plus) => Some(NameForm::Plus),
        None if starts_sentence(inlines, index, position) => Some(NameForm::Star),
        None => Some(NameForm::Plus),
    };

    let Inline::Cite(citations, _) = &mut inlines[index] else {
        return index + 1;
    };
    let request = Request {
        labels: citations.iter().map(|c| c.citation_id.clone()).collect(),
        name,
        explicit_clever: matches!(modifier, Some(Modifier::Plus | Modifier::Star)),
        suffix: citations
            .iter_mut()
            .flat_map(|c| std::mem::take(&mut c.citation_suffix))
            .collect(),
    };

    let rendered = render(&request, ctx);
    tracing::debug!(labels = ?request.labels, ?modifier, "Resolved reference");
    let count = rendered.len();
    inlines.splice(index..=index, rendered);
    index + count
}

/// Remove a modifier written just before the `@`, adjusting `index` when an
/// emptied `Str` disappears.
fn take_modifier(inlines: &mut Vec<Inline>, index: &mut usize) -> Option<Modifier> {
    if *index > 0
        && let Inline::Str(text) = &mut inlines[*index - 1]
        && let Some(modifier) = text.chars().last().and_then(Modifier::from_char)
    {
        text.pop();
        if text.is_empty() {
            inlines.remove(*index - 1);
            *index -= 1;
        }
        return Some(modifier);
    }

    let Inline::Cite(citations, _) = &mut inlines[*index] else {
        return None;
    };
    let prefix = &mut citations.first_mut()?.citation_prefix;
    let Some(Inline::Str(text)) = prefix.last_mut() else {
        return None;
    };
    let modifier = text.chars().last().and_then(Modifier::from_char)?;
    text.pop();
    if text.is_empty() {
        prefix.pop();
    }
    Some(modifier)
}

/// Remove protective braces in `{@fig:a}`.
fn strip_braces(inlines: &mut Vec<Inline>, index: &mut usize) {
    let opens = *index > 0 && matches!(&inlines[*index - 1], Inline::Str(s) if s.ends_with('{'));
    let closes = matches!(inlines.get(*index + 1), Some(Inline::Str(s)) if s.starts_with('}'));
    if !(opens && closes) {
        return;
    }

    if let Some(Inline::Str(text)) = inlines.get_mut(*index + 1) {
        text.remove(0);
        if text.is_empty() {
            inlines.remove(*index + 1);
        }
    }
    if let Inline::Str(text) = &mut inlines[*index - 1] {
        text.pop();
        if text.is_empty() {
            inlines.remove(*index - 1);
            *index -= 1;
        }
    }
}

/// Whether the inline at `index` begins a sentence.
fn starts_sentence(inlines: &[Inline], index: usize, position: ListPosition) -> bool {
    let previous = inlines[..index]
        .iter()
        .rev()
        .find(|inline| !matches!(inline, Inline::Space | Inline::SoftBreak | Inline::LineBreak));
    match previous {
        None => position == ListPosition::Block,
        Some(Inline::Str(text)) => text.ends_with(['.', '?', '!']),
        Some(_) => false,
    }
}

fn render(request: &Request, ctx: &mut RunContext) -> Vec<Inline> {
    let known = request
        .labels
        .iter()
        .all(|label| ctx.references.contains(label));

    let mut out = Vec::new();
    if ctx.format.is_tex()
        && known
        && (ctx.config.cleveref || request.explicit_clever)
        && let Some(form) = request.name
    {
        ctx.flags.cleveref_required = true;
        let command = match form {
            NameForm::Plus => "cref",
            NameForm::Star => "Cref",
        };
        out.push(Inline::raw(
            "tex",
            format!(r"\{command}{{{}}}", request.labels.join(",")),
        ));
    } else {
        if let Some(form) = request.name {
            let plural = request.labels.len() > 1;
            let name = match form {
                NameForm::Plus => ctx.config.reference_plus_name().form(plural).to_owned(),
                NameForm::Star => ctx.config.star_name.form(plural).to_owned(),
            };
            out.push(Inline::str(name));
            out.push(Inline::Space);
        }
        let items = request
            .labels
            .iter()
            .map(|label| reference_inlines(label, ctx))
            .collect();
        out.extend(join(items));
    }
    out.extend(request.suffix.iter().cloned());
    out
}

/// One resolved label, or the unresolved marker.
fn reference_inlines(label: &str, ctx: &mut RunContext) -> Vec<Inline> {
    let Some(reference) = ctx.references.get(label) else {
        ctx.warn(Diagnostic::UnresolvedReference {
            label: label.to_owned(),
        });
        return vec![unresolved(label)];
    };

    if ctx.format.is_tex() {
        vec![Inline::raw("tex", format!(r"\ref{{{label}}}"))]
    } else {
        vec![Inline::Link(
            Attr::default(),
            reference.display.to_inlines(),
            Target::new(format!("#{label}"), ""),
        )]
    }
}

/// Visible marker for a reference to an unknown label.
fn unresolved(label: &str) -> Inline {
    Inline::Span(
        Attr {
            id: String::new(),
            classes: vec![UNRESOLVED_CLASS.to_owned()],
            attributes: vec![("reference".to_owned(), label.to_owned())],
        },
        vec![Inline::Strong(vec![Inline::str("??")])],
    )
}

/// `A`, `A and B`, `A, B and C`.
fn join(items: Vec<Vec<Inline>>) -> Vec<Inline> {
    let count = items.len();
    let mut out = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 && i + 1 == count {
            out.extend([Inline::Space, Inline::str("and"), Inline::Space]);
        } else if i > 0 {
            out.extend([Inline::str(","), Inline::Space]);
        }
        out.extend(item);
    }
    out
}
