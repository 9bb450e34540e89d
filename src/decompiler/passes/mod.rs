//! The decompiler's pass pipeline.
//!
//! Passes execute strictly in a fixed order because each depends on invariants established
//! by its predecessor: offsets before jump resolution, jump resolution before reference
//! indexing, reference indexing before block segmentation, blocks before if/while folding.
//!
//! 1. [`CreateBasicNodes`] - flat instruction stream to one node per instruction
//! 2. [`ResolveJumpTargets`] - raw target offsets to node references
//! 3. [`ResolveReferences`] - inverse index of inbound control transfers
//! 4. [`CreateBasicBlocks`] - partition the top level into basic blocks
//! 5. [`CreateIfBlocks`] - fold the jump-if-not idiom into `if` containers
//! 6. [`CreateWhileBlocks`] - fold the push-execution-flow idiom into loop containers
//! 7. [`RemoveGotoReturns`] - simplify jumps to a bare-return epilogue
//!
//! Each pass is a total function over the previous stage's tree. Passes whose idiom does
//! not occur leave the tree flatten-identical, so they compose safely on any input.

mod create_blocks;
mod create_ifs;
mod create_nodes;
mod create_whiles;
mod remove_goto_returns;
mod resolve_jumps;
mod resolve_references;

pub use create_blocks::CreateBasicBlocks;
pub use create_ifs::CreateIfBlocks;
pub use create_nodes::CreateBasicNodes;
pub use create_whiles::CreateWhileBlocks;
pub use remove_goto_returns::RemoveGotoReturns;
pub use resolve_jumps::ResolveJumpTargets;
pub use resolve_references::ResolveReferences;

use crate::{decompiler::NodeTree, Result};

/// One transformation over the decompilation tree.
///
/// Passes are stateless values; all run state lives in the tree. A pass either succeeds,
/// leaving the tree in a state the next pass accepts, or fails fatally for the whole
/// function — no pass leaves a partially rewritten tree behind on the success path.
pub trait DecompilerPass<'a> {
    /// Unique name for diagnostics.
    fn name(&self) -> &'static str;

    /// Run the pass, mutating the tree in place.
    ///
    /// # Errors
    ///
    /// Pass-specific; see each pass. Errors abort the whole function's decompilation.
    fn run(&self, tree: &mut NodeTree<'a>) -> Result<()>;
}
