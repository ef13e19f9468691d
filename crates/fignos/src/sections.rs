//! Section numbers carried on images as `secno` attributes.

use fignos_ast::{Attr, Block, Inline, ListPosition};

use crate::context::RunContext;
use crate::error::FilterError;
use crate::stage::Stage;

/// Attribute key holding an image's section number.
pub(crate) const SECNO_KEY: &str = "secno";

/// Stamps each image with the number of the level-1 section it sits in.
///
/// Only active when numbering by section for a format that needs section
/// numbers written into tags. Images that already carry a `secno` keep it.
#[derive(Debug, Default)]
pub(crate) struct SectionNumbers {
    section: u32,
}

impl Stage for SectionNumbers {
    fn name(&self) -> &'static str {
        "section-numbers"
    }

    fn block(
        &mut self,
        block: &mut Block,
        ctx: &mut RunContext,
    ) -> Result<Option<Vec<Block>>, FilterError> {
        if active(ctx)
            && let Block::Header(1, attr, _) = block
            && !attr.classes.iter().any(|c| c == "unnumbered")
        {
            self.section += 1;
        }
        Ok(None)
    }

    fn inlines(
        &mut self,
        inlines: &mut Vec<Inline>,
        _position: ListPosition,
        ctx: &mut RunContext,
    ) -> Result<(), FilterError> {
        if !active(ctx) {
            return Ok(());
        }
        for inline in inlines {
            if let Inline::Image(attr, _, _) = inline
                && attr.get(SECNO_KEY).is_none()
            {
                attr.attributes
                    .push((SECNO_KEY.to_owned(), self.section.to_string()));
            }
        }
        Ok(())
    }
}

fn active(ctx: &RunContext) -> bool {
    ctx.config.number_by_section && ctx.format.hard_codes_section_numbers()
}

/// Removes `secno` from every image once figures are numbered.
#[derive(Debug, Default)]
pub(crate) struct StripSectionNumbers;

impl Stage for StripSectionNumbers {
    fn name(&self) -> &'static str {
        "strip-section-numbers"
    }

    fn inlines(
        &mut self,
        inlines: &mut Vec<Inline>,
        _position: ListPosition,
        _ctx: &mut RunContext,
    ) -> Result<(), FilterError> {
        for inline in inlines {
            if let Inline::Image(attr, _, _) = inline {
                strip(attr);
            }
        }
        Ok(())
    }
}

fn strip(attr: &mut Attr) {
    attr.attributes.retain(|(key, _)| key != SECNO_KEY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{OutputFormat, PandocVersion};
    use crate::stage::run_stages;
    use fignos_ast::Target;
    use fignos_config::Config;
    use pretty_assertions::assert_eq;

    fn image(attributes: &[(&str, &str)]) -> Inline {
        let attr = Attr {
            id: "fig:x".to_owned(),
            classes: Vec::new(),
            attributes: attributes
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        };
        Inline::Image(attr, Vec::new(), Target::new("x.png", "fig:"))
    }

    fn header(classes: &[&str]) -> Block {
        let attr = Attr {
            classes: classes.iter().map(|c| (*c).to_owned()).collect(),
            ..Attr::default()
        };
        Block::Header(1, attr, vec![Inline::str("Title")])
    }

    fn secnos(blocks: &[Block]) -> Vec<Option<String>> {
        blocks
            .iter()
            .filter_map(|block| match block {
                Block::Para(inlines) => match inlines.first() {
                    Some(Inline::Image(attr, _, _)) => Some(attr.get(SECNO_KEY).map(str::to_owned)),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    fn run(format: OutputFormat, number_by_section: bool, blocks: &mut Vec<Block>) {
        let config = Config {
            number_by_section,
            ..Config::default()
        };
        let mut ctx = RunContext::new(config, format, PandocVersion::default());
        let mut stages: Vec<Box<dyn Stage>> = vec![Box::new(SectionNumbers::default())];
        run_stages(&mut stages, blocks, &mut ctx).unwrap();
    }

    #[test]
    fn test_stamps_sections() {
        let mut blocks = vec![
            Block::Para(vec![image(&[])]),
            header(&[]),
            Block::Para(vec![image(&[])]),
            header(&["unnumbered"]),
            Block::Para(vec![image(&[])]),
            header(&[]),
            Block::Para(vec![image(&[("secno", "9")])]),
        ];
        run(OutputFormat::Html, true, &mut blocks);
        assert_eq!(
            secnos(&blocks),
            vec![
                Some("0".to_owned()),
                Some("1".to_owned()),
                Some("1".to_owned()),
                Some("9".to_owned()),
            ]
        );
    }

    #[test]
    fn test_inactive_for_latex() {
        let mut blocks = vec![header(&[]), Block::Para(vec![image(&[])])];
        run(OutputFormat::Latex, true, &mut blocks);
        assert_eq!(secnos(&blocks), vec![None]);
    }

    #[test]
    fn test_inactive_without_option() {
        let mut blocks = vec![header(&[]), Block::Para(vec![image(&[])])];
        run(OutputFormat::Docx, false, &mut blocks);
        assert_eq!(secnos(&blocks), vec![None]);
    }

    #[test]
    fn test_strip_removes_only_secno() {
        let mut attr = Attr::with_id("fig:x");
        attr.attributes = vec![
            ("secno".to_owned(), "1".to_owned()),
            ("width".to_owned(), "50%".to_owned()),
        ];
        strip(&mut attr);
        assert_eq!(attr.attributes, vec![("width".to_owned(), "50%".to_owned())]);
    }
}
