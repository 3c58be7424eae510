//! Lowering from the wire format to VM instructions.
//!
//! Expressions push exactly one value. Statements leave the stack as they
//! found it. Inline blocks are lowered into the program's block table the
//! first time they are reached and are referred to by index afterwards.

mod expressions;
mod statements;

#[cfg(test)]
mod tests;

use tracing::{debug, instrument, trace};
use trellis_wire::{Expression, Hash, SerializedInlineBlock, SerializedTemplateBlock};

use crate::bytecode::{CompiledBlock, Constant, Instruction, OpCode, Operand, Program};
use crate::error::{LowerError, Result};
use crate::resolver::Resolver;

/// Lowers a compiled template block.
#[instrument(skip_all, fields(statements = block.statements.len()))]
pub fn lower(block: &SerializedTemplateBlock, resolver: &dyn Resolver) -> Result<Program> {
    let mut lowering = Lowering::new(block, resolver);
    for statement in &block.statements {
        lowering.statement(statement)?;
    }
    let program = lowering.finish();
    debug!(
        instructions = program.instructions.len(),
        constants = program.constants.len(),
        blocks = program.blocks.len(),
        "lowered template"
    );
    Ok(program)
}

/// Lowering state for one template.
pub struct Lowering<'a> {
    template: &'a SerializedTemplateBlock,
    resolver: &'a dyn Resolver,
    program: Program,
}

impl<'a> Lowering<'a> {
    /// Creates a lowering for `template`.
    pub fn new(template: &'a SerializedTemplateBlock, resolver: &'a dyn Resolver) -> Self {
        Self {
            template,
            resolver,
            program: Program::new(),
        }
    }

    /// Returns the program built so far.
    pub fn finish(self) -> Program {
        self.program
    }

    fn emit(&mut self, instruction: Instruction) -> usize {
        trace!(%instruction, "emit");
        let index = self.program.instructions.len();
        self.program.instructions.push(instruction);
        index
    }

    fn op(&mut self, opcode: OpCode) {
        self.emit(Instruction::simple(opcode));
    }

    fn op1(&mut self, opcode: OpCode, operand: Operand) {
        self.emit(Instruction::with_operand(opcode, operand));
    }

    fn constant(&mut self, constant: impl Into<Constant>) -> Operand {
        Operand::Constant(self.program.add_constant(constant.into()))
    }

    /// Lowers an inline block into the block table and returns its index.
    fn block(&mut self, block: &SerializedInlineBlock) -> Result<u32> {
        let outer = std::mem::take(&mut self.program.instructions);
        let mut result = Ok(());
        for statement in &block.statements {
            result = self.statement(statement);
            if result.is_err() {
                break;
            }
        }
        let instructions = std::mem::replace(&mut self.program.instructions, outer);
        result?;
        self.program.blocks.push(CompiledBlock {
            parameters: block.parameters.clone(),
            instructions,
        });
        Ok((self.program.blocks.len() - 1) as u32)
    }

    /// Lowers a block of attribute statements, folding arguments into
    /// `args`. Returns the block index, or `None` when nothing but
    /// arguments was present.
    fn attrs_block(
        &mut self,
        attrs: &[trellis_wire::Statement],
        args: &mut Hash,
    ) -> Result<Option<u32>> {
        let outer = std::mem::take(&mut self.program.instructions);
        let mut result = Ok(());
        for attr in attrs {
            result = match attr {
                trellis_wire::Statement::StaticArg { name, value }
                | trellis_wire::Statement::DynamicArg { name, value } => {
                    args.push(name.as_str(), value.clone());
                    Ok(())
                }
                other => self.statement(other),
            };
            if result.is_err() {
                break;
            }
        }
        let instructions = std::mem::replace(&mut self.program.instructions, outer);
        result?;
        if instructions.is_empty() {
            return Ok(None);
        }
        self.program.blocks.push(CompiledBlock {
            parameters: Vec::new(),
            instructions,
        });
        Ok(Some((self.program.blocks.len() - 1) as u32))
    }

    /// Pushes positional values, then named values, then the argument
    /// frame.
    fn args(&mut self, params: &[Expression], hash: Option<&Hash>) -> Result<()> {
        for param in params {
            self.expression(param)?;
        }
        let mut names = Vec::new();
        if let Some(hash) = hash {
            for (name, value) in hash.iter() {
                self.expression(value)?;
                names.push(name.to_string());
            }
        }
        let names = self.constant(Constant::Names(names));
        self.emit(Instruction::with_operands(
            OpCode::PushArgs,
            vec![Operand::Count(params.len() as u32), names],
        ));
        Ok(())
    }

    fn symbol(&self, slot: u32) -> Result<Operand> {
        if slot as usize > self.template.symbols.len() {
            return Err(LowerError::InvalidSymbol {
                kind: "symbol",
                index: slot,
            });
        }
        Ok(Operand::Symbol(slot))
    }

    fn upvar_name(&self, upvar: u32) -> Result<&'a str> {
        self.template
            .upvar_name(upvar)
            .ok_or(LowerError::InvalidSymbol {
                kind: "upvar",
                index: upvar,
            })
    }

    /// The name of a bare free-variable head such as a call's callee.
    fn free_name(&self, expr: &Expression) -> Option<Result<&'a str>> {
        expr.free_variable()
            .map(|(upvar, _)| self.upvar_name(upvar))
    }
}
