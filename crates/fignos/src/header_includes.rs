//! LaTeX declarations written to `header-includes`.
//!
//! Each declaration is added at most once. A declaration already present,
//! whether written by an earlier run or by another filter, is not repeated.

use std::sync::LazyLock;

use fignos_ast::{Block, Inline, Meta, MetaValue};
use regex::Regex;

use crate::context::RunContext;
use crate::diagnostics::Diagnostic;
use crate::markup::{NO_PREFIX_ENV, TAGGED_ENV};

const HEADER_INCLUDES: &str = "header-includes";

static CLEVEREF_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\usepackage(\[[\w\s,]*\])?\{cleveref\}").expect("invalid cleveref regex")
});

static CAPTION_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\usepackage(\[[\w\s,]*\])?\{caption\}").expect("invalid caption regex")
});

/// A declaration and how to tell it is already present.
struct Declaration {
    text: String,
    present: Option<&'static Regex>,
}

impl Declaration {
    fn exact(text: String) -> Self {
        Self {
            text,
            present: None,
        }
    }

    fn matching(text: String, pattern: &'static Regex) -> Self {
        Self {
            text,
            present: Some(pattern),
        }
    }

    fn is_present(&self, existing: &str) -> bool {
        match self.present {
            Some(pattern) => pattern.is_match(existing),
            None => existing.contains(self.text.trim()),
        }
    }
}

/// Declarations the run needs, in emission order.
fn declarations(ctx: &RunContext) -> Vec<Declaration> {
    let config = &ctx.config;
    let flags = ctx.flags;
    let mut out = Vec::new();

    if flags.cleveref_required {
        let options = if config.capitalise { "[capitalise]" } else { "" };
        out.push(Declaration::matching(
            format!("% fignos: clever references\n\\usepackage{options}{{cleveref}}"),
            &CLEVEREF_PACKAGE,
        ));
    }
    if flags.has_unnumbered_figures {
        out.push(Declaration::matching(
            "% fignos: caption control\n\\usepackage{caption}".to_owned(),
            &CAPTION_PACKAGE,
        ));
    }
    if flags.cleveref_required && config.plus_name_changed {
        out.push(Declaration::exact(format!(
            "% fignos: mid-sentence reference names\n\\crefname{{figure}}{{{}}}{{{}}}",
            config.plus_name.singular, config.plus_name.plural
        )));
    }
    if flags.cleveref_required && config.star_name_changed {
        out.push(Declaration::exact(format!(
            "% fignos: sentence-initial reference names\n\\Crefname{{figure}}{{{}}}{{{}}}",
            config.star_name.singular, config.star_name.plural
        )));
    }
    if flags.has_unnumbered_figures {
        out.push(Declaration::exact(no_prefix_environment()));
    }
    if flags.has_tagged_figures {
        out.push(Declaration::exact(tagged_environment()));
    }
    if config.caption_name_changed {
        out.push(Declaration::exact(format!(
            "% fignos: caption name\n\\renewcommand{{\\figurename}}{{{}}}",
            config.caption_name
        )));
    }
    if config.number_by_section {
        out.push(Declaration::exact(
            "% fignos: figures numbered within sections\n\\numberwithin{figure}{section}"
                .to_owned(),
        ));
    }
    out
}

/// Captions without a label inside this environment. The figure counter
/// is restored afterwards so numbering elsewhere is unaffected.
fn no_prefix_environment() -> String {
    format!(
        r"% fignos: figures captioned without a prefix
\makeatletter
\newcounter{{figno}}
\newenvironment{{{NO_PREFIX_ENV}}}{{
  \caption@ifcompatibility{{}}{{
    \let\oldthefigure\thefigure
    \let\oldtheHfigure\theHfigure
    \renewcommand{{\thefigure}}{{figno:\thefigno}}
    \renewcommand{{\theHfigure}}{{figno:\thefigno}}
    \stepcounter{{figno}}
    \captionsetup{{labelformat=empty}}
  }}
}}{{
  \caption@ifcompatibility{{}}{{
    \captionsetup{{labelformat=default}}
    \let\thefigure\oldthefigure
    \let\theHfigure\oldtheHfigure
    \addtocounter{{figure}}{{-1}}
  }}
}}
\makeatother"
    )
}

/// Displays its optional argument in place of the figure number.
fn tagged_environment() -> String {
    format!(
        r"% fignos: tagged figures
\newenvironment{{{TAGGED_ENV}}}[1][]{{
  \let\oldthefigure\thefigure
  \let\oldtheHfigure\theHfigure
  \renewcommand{{\thefigure}}{{#1}}
  \renewcommand{{\theHfigure}}{{#1}}
}}{{
  \let\thefigure\oldthefigure
  \let\theHfigure\oldtheHfigure
  \addtocounter{{figure}}{{-1}}
}}"
    )
}

/// Append the declarations the run needs to the document metadata.
pub(crate) fn write(meta: &mut Meta, ctx: &mut RunContext) {
    let mut existing = meta.get(HEADER_INCLUDES).map(existing_text).unwrap_or_default();
    let mut written = Vec::new();

    for declaration in declarations(ctx) {
        if declaration.is_present(&existing) {
            continue;
        }
        existing.push('\n');
        existing.push_str(&declaration.text);
        written.push(declaration.text);
    }

    if written.is_empty() {
        return;
    }

    let mut list = match meta.remove(HEADER_INCLUDES) {
        None => Vec::new(),
        Some(MetaValue::MetaList(items)) => items,
        Some(scalar) => vec![scalar],
    };
    list.extend(
        written
            .iter()
            .map(|text| MetaValue::MetaBlocks(vec![Block::raw("tex", text.clone())])),
    );
    meta.insert(HEADER_INCLUDES.to_owned(), MetaValue::MetaList(list));

    tracing::info!(count = written.len(), "Wrote header-includes");
    ctx.warn(Diagnostic::HeaderIncludesWritten { blocks: written });
}

/// Raw text already present in a `header-includes` value.
fn existing_text(value: &MetaValue) -> String {
    let mut out = String::new();
    collect_text(value, &mut out);
    out
}

fn collect_text(value: &MetaValue, out: &mut String) {
    match value {
        MetaValue::MetaList(items) => {
            for item in items {
                collect_text(item, out);
            }
        }
        MetaValue::MetaString(text) => push_line(out, text),
        MetaValue::MetaInlines(inlines) => {
            for inline in inlines {
                if let Inline::RawInline(_, text) = inline {
                    push_line(out, text);
                }
            }
        }
        MetaValue::MetaBlocks(blocks) => {
            for block in blocks {
                match block {
                    Block::RawBlock(_, text) => push_line(out, text),
                    Block::Plain(inlines) | Block::Para(inlines) => {
                        for inline in inlines {
                            if let Inline::RawInline(_, text) = inline {
                                push_line(out, text);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        MetaValue::MetaMap(_) | MetaValue::MetaBool(_) => {}
    }
}

fn push_line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{OutputFormat, PandocVersion};
    use fignos_config::{Config, WarningLevel};
    use pretty_assertions::assert_eq;

    fn ctx(config: Config) -> RunContext {
        RunContext::new(config, OutputFormat::Latex, PandocVersion::default())
    }

    fn texts(meta: &Meta) -> Vec<String> {
        let Some(MetaValue::MetaList(items)) = meta.get(HEADER_INCLUDES) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match item {
                MetaValue::MetaBlocks(blocks) => match blocks.as_slice() {
                    [Block::RawBlock(_, text)] => Some(text.clone()),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_nothing_needed_leaves_meta_untouched() {
        let mut meta = Meta::new();
        write(&mut meta, &mut ctx(Config::default()));
        assert!(meta.is_empty());
    }

    #[test]
    fn test_emission_order() {
        let config = Config {
            caption_name: "Fig.".to_owned(),
            caption_name_changed: true,
            number_by_section: true,
            ..Config::default()
        };
        let mut ctx = ctx(config);
        ctx.flags.cleveref_required = true;
        ctx.flags.has_unnumbered_figures = true;
        ctx.flags.has_tagged_figures = true;

        let mut meta = Meta::new();
        write(&mut meta, &mut ctx);
        let texts = texts(&meta);

        assert_eq!(texts.len(), 6);
        assert!(texts[0].ends_with(r"\usepackage{cleveref}"));
        assert!(texts[1].ends_with(r"\usepackage{caption}"));
        assert!(texts[2].contains(NO_PREFIX_ENV));
        assert!(texts[3].contains(TAGGED_ENV));
        assert!(texts[4].ends_with(r"\renewcommand{\figurename}{Fig.}"));
        assert!(texts[5].ends_with(r"\numberwithin{figure}{section}"));
    }

    #[test]
    fn test_cref_names_need_cleveref() {
        let config = Config {
            plus_name_changed: true,
            star_name_changed: true,
            capitalise: true,
            ..Config::default()
        };
        let mut without = ctx(config.clone());
        let mut meta = Meta::new();
        write(&mut meta, &mut without);
        assert!(meta.is_empty());

        let mut with = ctx(config);
        with.flags.cleveref_required = true;
        write(&mut meta, &mut with);
        let texts = texts(&meta);
        assert!(texts[0].ends_with(r"\usepackage[capitalise]{cleveref}"));
        assert!(texts[1].ends_with(r"\crefname{figure}{fig.}{figs.}"));
        assert!(texts[2].ends_with(r"\Crefname{figure}{Figure}{Figures}"));
    }

    #[test]
    fn test_existing_package_detected_by_pattern() {
        let mut meta = Meta::new();
        meta.insert(
            HEADER_INCLUDES.to_owned(),
            MetaValue::MetaBlocks(vec![Block::raw("tex", r"\usepackage[noabbrev]{cleveref}")]),
        );
        let mut ctx = ctx(Config::default());
        ctx.flags.cleveref_required = true;
        write(&mut meta, &mut ctx);

        // Nothing new, and the scalar is left as it was.
        assert!(matches!(meta.get(HEADER_INCLUDES), Some(MetaValue::MetaBlocks(_))));
    }

    #[test]
    fn test_scalar_wrapped_into_list() {
        let mut meta = Meta::new();
        meta.insert(
            HEADER_INCLUDES.to_owned(),
            MetaValue::MetaString(r"\usepackage{amsmath}".to_owned()),
        );
        let config = Config {
            number_by_section: true,
            ..Config::default()
        };
        write(&mut meta, &mut ctx(config));

        let Some(MetaValue::MetaList(items)) = meta.get(HEADER_INCLUDES) else {
            panic!("expected a list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], MetaValue::MetaString(r"\usepackage{amsmath}".to_owned()));
    }

    #[test]
    fn test_second_run_adds_nothing() {
        let config = Config {
            number_by_section: true,
            ..Config::default()
        };
        let mut meta = Meta::new();
        let mut first = ctx(config.clone());
        first.flags.has_unnumbered_figures = true;
        first.flags.has_tagged_figures = true;
        write(&mut meta, &mut first);
        let after_first = meta.clone();

        let mut second = ctx(config);
        second.flags = first.flags;
        write(&mut meta, &mut second);
        assert_eq!(meta, after_first);
    }

    #[test]
    fn test_notice_only_at_warning_level_all() {
        let config = Config {
            number_by_section: true,
            ..Config::default()
        };

        let mut some = ctx(config.clone());
        write(&mut Meta::new(), &mut some);
        assert!(some.diagnostics().is_empty());

        let mut all = ctx(Config {
            warning_level: WarningLevel::All,
            ..config
        });
        write(&mut Meta::new(), &mut all);
        assert!(matches!(
            all.diagnostics(),
            [Diagnostic::HeaderIncludesWritten { blocks }] if blocks.len() == 1
        ));
    }
}
