//! Statement lowering.

use trellis_wire::{Blocks, Expression, Hash, Statement};

use super::Lowering;
use crate::bytecode::{Instruction, OpCode, Operand};
use crate::error::{LowerError, Result};

/// What a component-like statement invokes.
#[derive(Clone, Copy)]
enum Invocation<'s> {
    Resolved(u32),
    Dynamic(&'s Expression),
}

impl<'a> Lowering<'a> {
    /// Lowers a statement.
    pub fn statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Text(chars) => {
                let chars = self.constant(chars.as_str());
                self.op1(OpCode::Text, chars);
            }
            Statement::Comment(value) => {
                let value = self.constant(value.as_str());
                self.op1(OpCode::Comment, value);
            }
            Statement::Append { value, trusting } => {
                self.expression(value)?;
                self.op(if *trusting {
                    OpCode::AppendHtml
                } else {
                    OpCode::AppendText
                });
            }
            Statement::Modifier { head, params, hash } => {
                let name = self.head_name(head, "modifier")?;
                let handle = self
                    .resolver
                    .lookup_modifier(name)
                    .ok_or_else(|| LowerError::UnresolvedModifier(name.to_string()))?;
                self.args(params, hash.as_ref())?;
                self.op1(OpCode::Modifier, Operand::Handle(handle));
            }
            Statement::Block {
                head,
                params,
                hash,
                blocks,
            } => {
                let invocation = match self.free_name(head) {
                    Some(name) => Invocation::Resolved(self.component_handle(name?)?),
                    None => Invocation::Dynamic(head),
                };
                self.invoke(invocation, None, params, hash.clone(), blocks.as_ref())?;
            }
            Statement::Component {
                tag,
                attrs,
                args,
                blocks,
            } => {
                let handle = self.component_handle(tag)?;
                self.invoke(
                    Invocation::Resolved(handle),
                    Some(attrs.as_slice()),
                    &[],
                    args.clone(),
                    blocks.as_ref(),
                )?;
            }
            Statement::DynamicComponent {
                head,
                attrs,
                args,
                blocks,
            } => {
                self.invoke(
                    Invocation::Dynamic(head),
                    Some(attrs.as_slice()),
                    &[],
                    args.clone(),
                    blocks.as_ref(),
                )?;
            }
            Statement::OpenElement { tag, simple } => {
                let tag = self.constant(tag.as_str());
                self.emit(Instruction::with_operands(
                    OpCode::OpenElement,
                    vec![tag, Operand::Flag(*simple)],
                ));
            }
            Statement::FlushElement => self.op(OpCode::FlushElement),
            Statement::CloseElement => self.op(OpCode::CloseElement),
            Statement::StaticAttr {
                name,
                value,
                namespace,
            } => {
                let mut operands = vec![self.constant(name.as_str()), self.constant(value.as_str())];
                if let Some(namespace) = namespace {
                    operands.push(self.constant(namespace.as_str()));
                }
                self.emit(Instruction::with_operands(OpCode::StaticAttr, operands));
            }
            Statement::DynamicAttr {
                name,
                value,
                namespace,
            } => self.dynamic_attr(OpCode::DynamicAttr, name, value, namespace.as_deref(), false)?,
            Statement::TrustingDynamicAttr {
                name,
                value,
                namespace,
            } => self.dynamic_attr(OpCode::DynamicAttr, name, value, namespace.as_deref(), true)?,
            Statement::ComponentAttr {
                name,
                value,
                namespace,
            } => self.dynamic_attr(OpCode::ComponentAttr, name, value, namespace.as_deref(), false)?,
            Statement::TrustingComponentAttr {
                name,
                value,
                namespace,
            } => self.dynamic_attr(OpCode::ComponentAttr, name, value, namespace.as_deref(), true)?,
            Statement::AttrSplat(slot) => {
                let symbol = self.symbol(*slot)?;
                self.op1(OpCode::AttrSplat, symbol);
            }
            Statement::Yield { to, params } => {
                let symbol = self.symbol(*to)?;
                self.args(params, None)?;
                self.op1(OpCode::Yield, symbol);
            }
            Statement::Partial { target, eval_info } => {
                self.expression(target)?;
                let slots = self.eval_info(eval_info)?;
                self.op1(OpCode::InvokePartial, slots);
            }
            Statement::Debugger { eval_info } => {
                let slots = self.eval_info(eval_info)?;
                self.op1(OpCode::Debugger, slots);
            }
            Statement::StaticArg { name, .. } | Statement::DynamicArg { name, .. } => {
                return Err(LowerError::Syntax(format!(
                    "argument `{name}` is only valid in component attributes"
                )));
            }
        }
        Ok(())
    }

    fn dynamic_attr(
        &mut self,
        opcode: OpCode,
        name: &str,
        value: &Expression,
        namespace: Option<&str>,
        trusting: bool,
    ) -> Result<()> {
        self.expression(value)?;
        let mut operands = vec![self.constant(name), Operand::Flag(trusting)];
        if let Some(namespace) = namespace {
            operands.push(self.constant(namespace));
        }
        self.emit(Instruction::with_operands(opcode, operands));
        Ok(())
    }

    fn eval_info(&self, slots: &[u32]) -> Result<Operand> {
        for slot in slots {
            self.symbol(*slot)?;
        }
        Ok(Operand::Symbols(slots.to_vec()))
    }

    fn head_name(&self, head: &Expression, kind: &str) -> Result<&'a str> {
        match self.free_name(head) {
            Some(name) => name,
            None => Err(LowerError::Syntax(format!(
                "Expected {kind} head to be a free name"
            ))),
        }
    }

    fn component_handle(&self, name: &str) -> Result<u32> {
        self.resolver
            .lookup_component(name)
            .ok_or_else(|| LowerError::UnresolvedComponent(name.to_string()))
    }

    /// Pushes the definition (if dynamic), arguments, attribute block and
    /// named blocks, then invokes.
    fn invoke(
        &mut self,
        invocation: Invocation<'_>,
        attrs: Option<&[Statement]>,
        params: &[Expression],
        args: Option<Hash>,
        blocks: Option<&Blocks>,
    ) -> Result<()> {
        if let Invocation::Dynamic(head) = invocation {
            self.expression(head)?;
        }

        let mut args = args.unwrap_or_default();
        let attrs_block = match attrs {
            Some(attrs) => self.attrs_block(attrs, &mut args)?,
            None => None,
        };
        self.args(params, args.into_option().as_ref())?;

        if let Some(index) = attrs_block {
            self.op1(OpCode::PushAttrs, Operand::Block(index));
        }
        let mut count = 0;
        for (name, block) in blocks.into_iter().flat_map(|b| b.iter()) {
            let index = self.block(block)?;
            let name = self.constant(name);
            self.emit(Instruction::with_operands(
                OpCode::PushBlock,
                vec![name, Operand::Block(index)],
            ));
            count += 1;
        }

        let instruction = match invocation {
            Invocation::Resolved(handle) => Instruction::with_operands(
                OpCode::InvokeComponent,
                vec![Operand::Handle(handle), Operand::Count(count)],
            ),
            Invocation::Dynamic(_) => {
                Instruction::with_operand(OpCode::InvokeDynamicComponent, Operand::Count(count))
            }
        };
        self.emit(instruction);
        Ok(())
    }
}
