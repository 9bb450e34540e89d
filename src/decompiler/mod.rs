//! Control-flow structuring for decoded instruction streams.
//!
//! The decompiler rebuilds source-level shape from a function's flat instruction list: it
//! wraps every instruction occurrence in a [`Node`], resolves jump offsets to node
//! references, partitions the statements into basic blocks, and folds the two branching
//! idioms (jump-if-not and push-execution-flow) into `if` and loop containers. The result
//! is a [`NodeTree`] an emitter can walk, with the guarantee that [`NodeTree::flatten`]
//! reproduces the input statements in their original order.
//!
//! # Examples
//!
//! ```rust,no_run
//! use vscope::{decompile, FormatVersion, Instruction};
//!
//! let script = vec![
//!     Instruction::Jump { target: 6 },
//!     Instruction::Nothing,
//!     Instruction::EndOfScript,
//! ];
//! let tree = decompile(&script, FormatVersion::empty())?;
//! assert_eq!(tree.flatten().len(), script.len());
//! # Ok::<(), vscope::Error>(())
//! ```

mod tree;

pub mod passes;

pub use tree::{Node, NodeId, NodeKind, NodeTree};

use rayon::prelude::*;

use crate::{
    decompiler::passes::{
        CreateBasicBlocks, CreateBasicNodes, CreateIfBlocks, CreateWhileBlocks, DecompilerPass,
        RemoveGotoReturns, ResolveJumpTargets, ResolveReferences,
    },
    instruction::{FormatVersion, Instruction},
    Error, Result,
};

/// A named function body awaiting decompilation.
///
/// The instruction slice is borrowed so one decoded script can feed many runs without
/// cloning; [`decompile_all`] borrows each function for exactly one run.
#[derive(Debug, Clone)]
pub struct ScriptFunction<'a> {
    /// The function's diagnostic name.
    pub name: String,
    /// The function's top-level instruction stream.
    pub instructions: &'a [Instruction],
}

/// Structure one function's instruction stream into a [`NodeTree`].
///
/// Runs the full pass pipeline in its fixed order. The returned tree borrows
/// `instructions` and is ready for an emitter to walk.
///
/// # Errors
///
/// Returns [`Error::UnresolvedJump`] when a statically addressed jump targets an offset
/// that is not an instruction start, and [`Error::RecursionLimit`] when an expression
/// nests beyond [`crate::MAX_EXPRESSION_DEPTH`].
///
/// # Examples
///
/// ```rust,no_run
/// use vscope::{decompile, FormatVersion, Instruction};
///
/// let script = vec![Instruction::EndOfScript];
/// let tree = decompile(&script, FormatVersion::WIDE_VECTORS)?;
/// assert!(!tree.is_empty());
/// # Ok::<(), vscope::Error>(())
/// ```
pub fn decompile(instructions: &[Instruction], version: FormatVersion) -> Result<NodeTree<'_>> {
    let mut tree = NodeTree::new(version);
    let entry = CreateBasicNodes::new(instructions);
    let pipeline: [&dyn DecompilerPass<'_>; 7] = [
        &entry,
        &ResolveJumpTargets,
        &ResolveReferences,
        &CreateBasicBlocks,
        &CreateIfBlocks,
        &CreateWhileBlocks,
        &RemoveGotoReturns,
    ];
    for pass in pipeline {
        pass.run(&mut tree)?;
    }
    Ok(tree)
}

/// Structure every function in parallel, one result per function.
///
/// Functions are independent, so the pipeline runs per function on the rayon thread pool
/// and one corrupt function does not discard its siblings. The output holds one entry per
/// input, in input order; each failure is wrapped in [`Error::FunctionFailed`] to attach
/// the function's name to the underlying cause.
pub fn decompile_all<'a>(
    functions: &[ScriptFunction<'a>],
    version: FormatVersion,
) -> Vec<Result<NodeTree<'a>>> {
    functions
        .par_iter()
        .map(|function| {
            decompile(function.instructions, version).map_err(|source| Error::FunctionFailed {
                name: function.name.clone(),
                source: Box::new(source),
            })
        })
        .collect()
}
