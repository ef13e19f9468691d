//! Ordered tree-rewriting stages.
//!
//! A pass is a list of stages. Each stage gets its own full walk over the
//! document, in document order, so a stage sees the tree exactly as the
//! previous stage left it.

use fignos_ast::{Block, Inline, ListPosition, MutVisitor, walk_blocks};

use crate::context::RunContext;
use crate::error::FilterError;

/// One rewrite applied to every node of the document.
pub(crate) trait Stage {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Inspect a block, optionally returning its replacement.
    fn block(
        &mut self,
        _block: &mut Block,
        _ctx: &mut RunContext,
    ) -> Result<Option<Vec<Block>>, FilterError> {
        Ok(None)
    }

    /// Inspect and edit an inline list in place.
    fn inlines(
        &mut self,
        _inlines: &mut Vec<Inline>,
        _position: ListPosition,
        _ctx: &mut RunContext,
    ) -> Result<(), FilterError> {
        Ok(())
    }
}

/// Adapts a [`Stage`] to the tree walker.
struct StageVisitor<'a> {
    stage: &'a mut dyn Stage,
    ctx: &'a mut RunContext,
}

impl MutVisitor for StageVisitor<'_> {
    type Error = FilterError;

    fn visit_block(&mut self, block: &mut Block) -> Result<Option<Vec<Block>>, FilterError> {
        self.stage.block(block, self.ctx)
    }

    fn visit_inlines(
        &mut self,
        inlines: &mut Vec<Inline>,
        position: ListPosition,
    ) -> Result<(), FilterError> {
        self.stage.inlines(inlines, position, self.ctx)
    }
}

/// Run each stage over the blocks, in order.
pub(crate) fn run_stages(
    stages: &mut [Box<dyn Stage>],
    blocks: &mut Vec<Block>,
    ctx: &mut RunContext,
) -> Result<(), FilterError> {
    for stage in stages {
        tracing::debug!(stage = stage.name(), "Running stage");
        let mut visitor = StageVisitor {
            stage: stage.as_mut(),
            ctx,
        };
        walk_blocks(&mut visitor, blocks)?;
    }
    Ok(())
}
