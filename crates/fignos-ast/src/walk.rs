//! Mutable pre-order tree traversal.
//!
//! The walker visits nodes in document order (the order a reader sees them
//! top to bottom), which callers rely on for sequential numbering.

use crate::document::{Block, Caption, Inline, Row, TableBody, TableFoot, TableHead};

/// Where an inline list sits in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListPosition {
    /// Inline content owned directly by a block (paragraph, header, caption).
    Block,
    /// Inline content inside another inline (emphasis, link text, span).
    Nested,
}

/// Callbacks invoked by [`walk_blocks`].
///
/// Both hooks run before the node's children are visited. The first error
/// returned aborts the walk.
pub trait MutVisitor {
    type Error;

    /// Inspect a block, optionally returning its replacement.
    ///
    /// Returning `Some(vec![])` removes the block. Replacement blocks are
    /// descended into but not offered to `visit_block` again.
    fn visit_block(&mut self, _block: &mut Block) -> Result<Option<Vec<Block>>, Self::Error> {
        Ok(None)
    }

    /// Inspect and edit an inline list in place.
    fn visit_inlines(
        &mut self,
        _inlines: &mut Vec<Inline>,
        _position: ListPosition,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Walk a block list in document order.
///
/// # Errors
///
/// Returns the first error produced by the visitor.
pub fn walk_blocks<V>(visitor: &mut V, blocks: &mut Vec<Block>) -> Result<(), V::Error>
where
    V: MutVisitor + ?Sized,
{
    let mut index = 0;
    while index < blocks.len() {
        if let Some(replacement) = visitor.visit_block(&mut blocks[index])? {
            let count = replacement.len();
            blocks.splice(index..=index, replacement);
            for block in &mut blocks[index..index + count] {
                walk_block_children(visitor, block)?;
            }
            index += count;
        } else {
            walk_block_children(visitor, &mut blocks[index])?;
            index += 1;
        }
    }
    Ok(())
}

/// Walk an inline list and everything nested inside it.
///
/// # Errors
///
/// Returns the first error produced by the visitor.
pub fn walk_inlines<V>(
    visitor: &mut V,
    inlines: &mut Vec<Inline>,
    position: ListPosition,
) -> Result<(), V::Error>
where
    V: MutVisitor + ?Sized,
{
    visitor.visit_inlines(inlines, position)?;
    for inline in inlines.iter_mut() {
        walk_inline_children(visitor, inline)?;
    }
    Ok(())
}

fn walk_block_children<V>(visitor: &mut V, block: &mut Block) -> Result<(), V::Error>
where
    V: MutVisitor + ?Sized,
{
    match block {
        Block::Plain(inlines) | Block::Para(inlines) | Block::Header(_, _, inlines) => {
            walk_inlines(visitor, inlines, ListPosition::Block)
        }
        Block::LineBlock(lines) => {
            for line in lines {
                walk_inlines(visitor, line, ListPosition::Block)?;
            }
            Ok(())
        }
        Block::BlockQuote(blocks) | Block::Div(_, blocks) => walk_blocks(visitor, blocks),
        Block::OrderedList(_, items) | Block::BulletList(items) => {
            for item in items {
                walk_blocks(visitor, item)?;
            }
            Ok(())
        }
        Block::DefinitionList(items) => {
            for (term, definitions) in items {
                walk_inlines(visitor, term, ListPosition::Block)?;
                for definition in definitions {
                    walk_blocks(visitor, definition)?;
                }
            }
            Ok(())
        }
        Block::Table(_, caption, _, head, bodies, foot) => {
            walk_caption(visitor, caption)?;
            walk_table(visitor, head, bodies, foot)
        }
        Block::Figure(_, caption, body) => {
            walk_caption(visitor, caption)?;
            walk_blocks(visitor, body)
        }
        Block::CodeBlock(..) | Block::RawBlock(..) | Block::HorizontalRule | Block::Null => Ok(()),
    }
}

fn walk_caption<V>(visitor: &mut V, caption: &mut Caption) -> Result<(), V::Error>
where
    V: MutVisitor + ?Sized,
{
    if let Some(short) = &mut caption.0 {
        walk_inlines(visitor, short, ListPosition::Block)?;
    }
    walk_blocks(visitor, &mut caption.1)
}

fn walk_table<V>(
    visitor: &mut V,
    head: &mut TableHead,
    bodies: &mut [TableBody],
    foot: &mut TableFoot,
) -> Result<(), V::Error>
where
    V: MutVisitor + ?Sized,
{
    walk_rows(visitor, &mut head.1)?;
    for body in bodies {
        walk_rows(visitor, &mut body.2)?;
        walk_rows(visitor, &mut body.3)?;
    }
    walk_rows(visitor, &mut foot.1)
}

fn walk_rows<V>(visitor: &mut V, rows: &mut [Row]) -> Result<(), V::Error>
where
    V: MutVisitor + ?Sized,
{
    for row in rows {
        for cell in &mut row.1 {
            walk_blocks(visitor, &mut cell.4)?;
        }
    }
    Ok(())
}

fn walk_inline_children<V>(visitor: &mut V, inline: &mut Inline) -> Result<(), V::Error>
where
    V: MutVisitor + ?Sized,
{
    match inline {
        Inline::Emph(content)
        | Inline::Underline(content)
        | Inline::Strong(content)
        | Inline::Strikeout(content)
        | Inline::Superscript(content)
        | Inline::Subscript(content)
        | Inline::SmallCaps(content)
        | Inline::Quoted(_, content)
        | Inline::Link(_, content, _)
        | Inline::Image(_, content, _)
        | Inline::Span(_, content) => walk_inlines(visitor, content, ListPosition::Nested),
        Inline::Cite(citations, content) => {
            for citation in citations {
                walk_inlines(visitor, &mut citation.citation_prefix, ListPosition::Nested)?;
                walk_inlines(visitor, &mut citation.citation_suffix, ListPosition::Nested)?;
            }
            walk_inlines(visitor, content, ListPosition::Nested)
        }
        Inline::Note(blocks) => walk_blocks(visitor, blocks),
        Inline::Str(_)
        | Inline::Code(..)
        | Inline::Space
        | Inline::SoftBreak
        | Inline::LineBreak
        | Inline::Math(..)
        | Inline::RawInline(..) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::document::Attr;
    use pretty_assertions::assert_eq;

    /// Records the first `Str` of every inline list it sees.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(String, ListPosition)>,
    }

    impl MutVisitor for Recorder {
        type Error = Infallible;

        fn visit_inlines(
            &mut self,
            inlines: &mut Vec<Inline>,
            position: ListPosition,
        ) -> Result<(), Infallible> {
            if let Some(Inline::Str(s)) = inlines.first() {
                self.seen.push((s.clone(), position));
            }
            Ok(())
        }
    }

    #[test]
    fn test_document_order() {
        let mut blocks = vec![
            Block::Header(1, Attr::default(), vec![Inline::str("one")]),
            Block::BlockQuote(vec![Block::Para(vec![
                Inline::str("two"),
                Inline::Emph(vec![Inline::str("three")]),
            ])]),
            Block::Para(vec![Inline::str("four")]),
        ];
        let mut recorder = Recorder::default();
        walk_blocks(&mut recorder, &mut blocks).unwrap();
        assert_eq!(
            recorder.seen,
            vec![
                ("one".to_owned(), ListPosition::Block),
                ("two".to_owned(), ListPosition::Block),
                ("three".to_owned(), ListPosition::Nested),
                ("four".to_owned(), ListPosition::Block),
            ]
        );
    }

    /// Wraps every paragraph in a pair of raw blocks.
    struct Wrapper {
        visits: usize,
    }

    impl MutVisitor for Wrapper {
        type Error = Infallible;

        fn visit_block(&mut self, block: &mut Block) -> Result<Option<Vec<Block>>, Infallible> {
            self.visits += 1;
            if let Block::Para(_) = block {
                return Ok(Some(vec![
                    Block::raw("tex", "begin"),
                    block.clone(),
                    Block::raw("tex", "end"),
                ]));
            }
            Ok(None)
        }
    }

    #[test]
    fn test_replacement_is_not_revisited() {
        let mut blocks = vec![
            Block::Para(vec![Inline::str("a")]),
            Block::Para(vec![Inline::str("b")]),
        ];
        let mut wrapper = Wrapper { visits: 0 };
        walk_blocks(&mut wrapper, &mut blocks).unwrap();
        assert_eq!(wrapper.visits, 2);
        assert_eq!(blocks.len(), 6);
        assert_eq!(blocks[3], Block::raw("tex", "begin"));
        assert_eq!(blocks[4], Block::Para(vec![Inline::str("b")]));
    }

    struct Failing;

    impl MutVisitor for Failing {
        type Error = String;

        fn visit_block(&mut self, _block: &mut Block) -> Result<Option<Vec<Block>>, String> {
            Err("stop".to_owned())
        }
    }

    #[test]
    fn test_error_aborts_walk() {
        let mut blocks = vec![Block::Null];
        assert_eq!(walk_blocks(&mut Failing, &mut blocks), Err("stop".to_owned()));
    }
}
