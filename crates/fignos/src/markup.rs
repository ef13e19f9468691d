//! Format-specific markup placed around figure paragraphs.

use fignos_ast::Block;

use crate::context::RunContext;
use crate::figure::FigureRecord;
use crate::format::OutputFormat;

pub(crate) const NO_PREFIX_ENV: &str = "fignos:no-prefix-figure-caption";
pub(crate) const TAGGED_ENV: &str = "fignos:tagged-figure";

/// Blocks placed before and after a figure.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Envelope {
    before: Vec<Block>,
    after: Vec<Block>,
}

impl Envelope {
    fn new(before: Block, after: Option<Block>) -> Self {
        Self {
            before: vec![before],
            after: after.into_iter().collect(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }

    /// The figure with its envelope, in document order.
    pub(crate) fn wrap(self, figure: Block) -> Vec<Block> {
        let mut blocks = self.before;
        blocks.push(figure);
        blocks.extend(self.after);
        blocks
    }
}

/// Decide the envelope for a figure.
///
/// Raises `has_tagged_figures` when a LaTeX tagged-figure environment is
/// used.
pub(crate) fn envelope(record: &FigureRecord, ctx: &mut RunContext) -> Envelope {
    let Some(display) = record.display() else {
        return if ctx.format.is_tex() {
            Envelope::new(
                Block::raw("tex", format!(r"\begin{{{NO_PREFIX_ENV}}}")),
                Some(Block::raw("tex", format!(r"\end{{{NO_PREFIX_ENV}}}"))),
            )
        } else {
            Envelope::default()
        };
    };

    match ctx.format {
        OutputFormat::Latex if record.is_tagged() => {
            ctx.flags.has_tagged_figures = true;
            Envelope::new(
                Block::raw("tex", format!(r"\begin{{{TAGGED_ENV}}}[{display}]")),
                Some(Block::raw("tex", format!(r"\end{{{TAGGED_ENV}}}"))),
            )
        }
        OutputFormat::Html if !ctx.version.supports_image_attributes() => Envelope::new(
            Block::raw("html", format!(r#"<a name="{}"></a>"#, record.id)),
            None,
        ),
        OutputFormat::Docx => {
            let bookmark = ctx.next_bookmark_id();
            Envelope::new(
                Block::raw(
                    "openxml",
                    format!(r#"<w:bookmarkStart w:id="{bookmark}" w:name="{}"/>"#, record.id),
                ),
                Some(Block::raw(
                    "openxml",
                    format!(r#"<w:bookmarkEnd w:id="{bookmark}"/>"#),
                )),
            )
        }
        _ => Envelope::default(),
    }
}
