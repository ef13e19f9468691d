//! Figure classification and numbering.

use std::sync::LazyLock;

use fignos_ast::{Attr, Block, Inline};
use regex::Regex;

use crate::caption;
use crate::context::RunContext;
use crate::diagnostics::Diagnostic;
use crate::error::FilterError;
use crate::markup;
use crate::references::{DisplayValue, Reference};
use crate::sections::SECNO_KEY;
use crate::stage::Stage;

/// Prefix of every figure label.
pub(crate) const LABEL_PREFIX: &str = "fig:";

static LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^fig:[\w/-]*").expect("invalid label regex"));

/// Whether `id` looks like a figure label.
pub(crate) fn is_label(id: &str) -> bool {
    LABEL_PATTERN.is_match(id)
}

/// How a figure is numbered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FigureKind {
    /// No number; the caption keeps its native form.
    Unnumbered,
    /// Sequential number or tag.
    Numbered(DisplayValue),
}

/// Classification of one figure, alive while it is rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FigureRecord {
    pub id: String,
    pub kind: FigureKind,
    pub referenceable: bool,
}

impl FigureRecord {
    fn unnumbered(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            kind: FigureKind::Unnumbered,
            referenceable: false,
        }
    }

    pub(crate) fn display(&self) -> Option<&DisplayValue> {
        match &self.kind {
            FigureKind::Unnumbered => None,
            FigureKind::Numbered(display) => Some(display),
        }
    }

    pub(crate) fn is_tagged(&self) -> bool {
        self.display().is_some_and(DisplayValue::is_tag)
    }
}

/// Classify a figure image and record it in the reference table.
///
/// An anonymous label (`fig:` alone) is replaced in `attr` by a generated
/// one that no reference can name.
pub(crate) fn classify(attr: &mut Attr, ctx: &mut RunContext) -> FigureRecord {
    if !is_label(&attr.id) {
        ctx.flags.has_unnumbered_figures = true;
        return FigureRecord::unnumbered(&attr.id);
    }

    let mut referenceable = true;
    if attr.id == LABEL_PREFIX {
        attr.id = format!("{LABEL_PREFIX}{}", uuid::Uuid::new_v4());
        referenceable = false;
    }

    let section = attr.get(SECNO_KEY).map(str::to_owned);
    ctx.sections.enter(section.as_deref());

    let display = match attr.get("tag") {
        Some(tag) => DisplayValue::Tag(unquote(tag).to_owned()),
        None if ctx.config.number_by_section && ctx.format.hard_codes_section_numbers() => {
            let n = ctx.sections.advance();
            DisplayValue::Tag(format!("{}.{n}", section.as_deref().unwrap_or("0")))
        }
        None => DisplayValue::Number(ctx.sections.advance()),
    };

    let reference = Reference {
        display: display.clone(),
        section,
    };
    if !ctx.references.insert(attr.id.clone(), reference) {
        ctx.warn(Diagnostic::DuplicateLabel {
            label: attr.id.clone(),
        });
    }

    FigureRecord {
        id: attr.id.clone(),
        kind: FigureKind::Numbered(display),
        referenceable,
    }
}

/// Strip one layer of straight or curly quotes.
fn unquote(tag: &str) -> &str {
    const PAIRS: [(char, char); 4] = [('"', '"'), ('\'', '\''), ('“', '”'), ('‘', '’')];
    for (open, close) in PAIRS {
        if let Some(inner) = tag.strip_prefix(open).and_then(|s| s.strip_suffix(close)) {
            return inner;
        }
    }
    tag
}

/// The image attributes and caption of a figure paragraph.
///
/// A figure is a paragraph holding a single image whose title starts with
/// `fig:`, which is how pandoc marks implicit figures.
fn figure_image(block: &mut Block) -> Option<(&mut Attr, &mut Vec<Inline>)> {
    let Block::Para(inlines) = block else {
        return None;
    };
    let [Inline::Image(attr, caption, target)] = inlines.as_mut_slice() else {
        return None;
    };
    target
        .title
        .starts_with(LABEL_PREFIX)
        .then_some((attr, caption))
}

/// Numbers figures and renders their captions and markup.
#[derive(Debug, Default)]
pub(crate) struct ProcessFigures;

impl Stage for ProcessFigures {
    fn name(&self) -> &'static str {
        "process-figures"
    }

    fn block(
        &mut self,
        block: &mut Block,
        ctx: &mut RunContext,
    ) -> Result<Option<Vec<Block>>, FilterError> {
        let Some((attr, caption_inlines)) = figure_image(block) else {
            return Ok(None);
        };

        let record = classify(attr, ctx);
        caption::render(&record, caption_inlines, ctx);
        tracing::debug!(
            id = %record.id,
            display = ?record.display().map(ToString::to_string),
            referenceable = record.referenceable,
            "Processed figure"
        );

        let envelope = markup::envelope(&record, ctx);
        if envelope.is_empty() {
            return Ok(None);
        }
        let para = std::mem::replace(block, Block::Null);
        Ok(Some(envelope.wrap(para)))
    }
}
