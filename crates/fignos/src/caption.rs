//! Caption prefixes (`Figure 1:`).

use fignos_ast::Inline;

use crate::context::RunContext;
use crate::figure::FigureRecord;
use crate::format::OutputFormat;

/// Rewrite a figure caption for the target format.
///
/// LaTeX numbers captions itself, so it only needs a `\label` on pandoc
/// versions that do not write one. Every other format gets the name and
/// number written into the caption text.
pub(crate) fn render(record: &FigureRecord, caption: &mut Vec<Inline>, ctx: &RunContext) {
    let Some(display) = record.display() else {
        return;
    };

    if ctx.format.is_tex() {
        if record.referenceable && !ctx.version.labels_figures() {
            caption.push(Inline::raw("tex", format!(r"\protect\label{{{}}}", record.id)));
        }
        return;
    }

    let mut prefix = vec![Inline::str(ctx.config.caption_name.clone()), Inline::Space];
    prefix.extend(display.to_inlines());
    match prefix.last_mut() {
        Some(Inline::Str(text)) => text.push(':'),
        _ => prefix.push(Inline::str(":")),
    }
    if ctx.format == OutputFormat::Html {
        prefix.insert(0, Inline::raw("html", "<span>"));
        prefix.push(Inline::raw("html", "</span>"));
    }

    let original = std::mem::take(caption);
    *caption = prefix;
    caption.push(Inline::Space);
    caption.extend(original);
}
