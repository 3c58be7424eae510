//! Expression lowering.

use trellis_wire::{Expression, Hash, Primitive};

use super::Lowering;
use crate::bytecode::{Instruction, OpCode, Operand};
use crate::error::{LowerError, Result};

/// The keyword that curries a component instead of calling a helper.
const COMPONENT: &str = "component";

impl Lowering<'_> {
    /// Lowers an expression, leaving its value on the stack.
    pub fn expression(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Value(value) => self.primitive(value),
            Expression::Undefined => self.op(OpCode::PushUndefined),
            Expression::GetSymbol(slot) => {
                let symbol = self.symbol(*slot)?;
                self.op1(OpCode::GetVariable, symbol);
            }
            Expression::GetFree(upvar) => {
                return Err(LowerError::Unimplemented(format!(
                    "GetFree({upvar}); free variables must carry a context"
                )));
            }
            Expression::GetContextualFree { upvar, context } => {
                self.upvar_name(*upvar)?;
                self.emit(Instruction::with_operands(
                    OpCode::ResolveContextualFree,
                    vec![Operand::Upvar(*upvar), Operand::Context(*context)],
                ));
            }
            Expression::GetPath { head, tail } => {
                self.expression(head)?;
                for key in tail {
                    let key = self.constant(key.as_str());
                    self.op1(OpCode::GetProperty, key);
                }
            }
            Expression::Concat(parts) => {
                for part in parts {
                    self.expression(part)?;
                }
                self.op1(OpCode::Concat, Operand::Count(parts.len() as u32));
            }
            Expression::Call {
                callee,
                params,
                hash,
            } => self.call(callee, params, hash.as_ref())?,
            Expression::HasBlock(block) => {
                self.expression(block)?;
                self.op(OpCode::HasBlock);
            }
            Expression::HasBlockParams(block) => {
                self.expression(block)?;
                self.op(OpCode::SpreadBlock);
                self.op(OpCode::CompileBlock);
                self.op(OpCode::HasBlockParams);
            }
        }
        Ok(())
    }

    fn primitive(&mut self, value: &Primitive) {
        match value {
            Primitive::Boolean(true) => self.op(OpCode::PushTrue),
            Primitive::Boolean(false) => self.op(OpCode::PushFalse),
            Primitive::Null => self.op(OpCode::PushNull),
            other => {
                let constant = self.constant(crate::bytecode::Constant::Value(other.clone()));
                self.op1(OpCode::PushConstant, constant);
            }
        }
    }

    fn call(&mut self, callee: &Expression, params: &[Expression], hash: Option<&Hash>) -> Result<()> {
        if self.is_component(callee)? {
            let Some((definition, rest)) = params.split_first() else {
                return Err(LowerError::Syntax(
                    "component helper requires at least one argument".into(),
                ));
            };
            self.expression(definition)?;
            self.args(rest, hash)?;
            self.op(OpCode::CurryComponent);
            return Ok(());
        }

        let name = match self.free_name(callee) {
            Some(name) => name?,
            None => {
                return Err(LowerError::Syntax(
                    "Expected call head to be a string".into(),
                ));
            }
        };
        let handle = self
            .resolver
            .lookup_helper(name)
            .ok_or_else(|| LowerError::UnresolvedHelper(name.to_string()))?;
        self.args(params, hash)?;
        self.op1(OpCode::Helper, Operand::Handle(handle));
        Ok(())
    }

    /// A `GetPath` whose head is the contextual free variable `component`.
    fn is_component(&self, callee: &Expression) -> Result<bool> {
        match callee {
            Expression::GetPath { head, .. } => match head.as_ref() {
                Expression::GetContextualFree { upvar, .. } => {
                    Ok(self.upvar_name(*upvar)? == COMPONENT)
                }
                _ => Ok(false),
            },
            _ => Ok(false),
        }
    }
}
