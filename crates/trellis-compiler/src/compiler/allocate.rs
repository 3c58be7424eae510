//! Symbol allocation.
//!
//! Walks the op stream once, in emission order, recursing into a fresh
//! [`LocalSymbols`] scope at every `StartBlock`. Symbol and upvar numbering
//! therefore follows the order names are first seen in the stream.

use tracing::debug;

use super::ops::{AllocatedOp, InputOp};
use crate::error::{CompileError, Result};
use crate::symbols::{LocalSymbols, ProgramSymbols, Symbols};

/// The allocator's output.
#[derive(Debug)]
pub struct Allocation {
    /// Ops with names resolved
    pub ops: Vec<AllocatedOp>,
    /// The template's symbol table
    pub symbols: ProgramSymbols,
    /// Whether a partial or debugger was seen
    pub has_eval: bool,
}

/// Resolves names in an [`InputOp`] stream.
pub struct SymbolAllocator {
    ops: std::vec::IntoIter<InputOp>,
    out: Vec<AllocatedOp>,
    has_eval: bool,
}

impl SymbolAllocator {
    /// Prepares to allocate `ops`.
    pub fn new(ops: Vec<InputOp>) -> Self {
        let capacity = ops.len();
        Self {
            ops: ops.into_iter(),
            out: Vec::with_capacity(capacity),
            has_eval: false,
        }
    }

    /// Runs allocation over a whole program.
    pub fn process(mut self) -> Result<Allocation> {
        match self.ops.next() {
            Some(InputOp::StartProgram) => self.out.push(AllocatedOp::Op(InputOp::StartProgram)),
            other => {
                return Err(CompileError::Internal(format!(
                    "expected StartProgram, found {other:?}"
                )));
            }
        }

        let mut symbols = ProgramSymbols::new();
        self.scope(&mut symbols)?;

        debug!(
            symbols = symbols.len() - 1,
            upvars = symbols.to_upvars().len(),
            has_eval = self.has_eval,
            "allocated symbols"
        );
        Ok(Allocation {
            ops: self.out,
            symbols,
            has_eval: self.has_eval,
        })
    }

    /// Allocates ops until the end of the current block or program.
    fn scope(&mut self, symbols: &mut dyn Symbols) -> Result<()> {
        while let Some(op) = self.ops.next() {
            let allocated = match op {
                InputOp::StartBlock { params } => {
                    let mut local = LocalSymbols::new(symbols, params.as_slice());
                    self.out.push(AllocatedOp::StartBlock {
                        parameters: local.param_symbols(),
                    });
                    self.scope(&mut local)?;
                    continue;
                }
                InputOp::EndBlock | InputOp::EndProgram => {
                    self.out.push(AllocatedOp::Op(op));
                    return Ok(());
                }
                InputOp::GetThis => AllocatedOp::GetSymbol(0),
                InputOp::GetArg(name) => AllocatedOp::GetSymbol(symbols.arg(&format!("@{name}"))),
                InputOp::GetVar { name, context } => {
                    if symbols.has_local(&name) {
                        AllocatedOp::GetSymbol(symbols.local(&name)?)
                    } else {
                        AllocatedOp::GetFree {
                            upvar: symbols.free_var(&name),
                            context,
                        }
                    }
                }
                InputOp::AttrSplat => AllocatedOp::AttrSplat(symbols.block("&attrs")),
                InputOp::Yield { to } => AllocatedOp::Yield {
                    to: symbols.block(&format!("&{to}")),
                },
                InputOp::HasBlock(name) => AllocatedOp::HasBlock(symbols.block(&format!("&{name}"))),
                InputOp::HasBlockParams(name) => {
                    AllocatedOp::HasBlockParams(symbols.block(&format!("&{name}")))
                }
                InputOp::Partial => {
                    self.has_eval = true;
                    AllocatedOp::Partial {
                        eval_info: symbols.eval_info(),
                    }
                }
                InputOp::Debugger => {
                    self.has_eval = true;
                    AllocatedOp::Debugger {
                        eval_info: symbols.eval_info(),
                    }
                }
                other => AllocatedOp::Op(other),
            };
            self.out.push(allocated);
        }
        Err(CompileError::Internal(
            "op stream ended inside an open block".into(),
        ))
    }
}
