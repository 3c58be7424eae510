//! Assembles wire-format statements from allocated ops.

use tracing::debug;
use trellis_wire::{
    Blocks, Expression, Hash, SerializedInlineBlock, SerializedTemplateBlock, Statement,
};

use super::allocate::Allocation;
use super::ops::{AllocatedOp, InputOp};
use crate::error::{CompileError, Result};

/// Renames statically named components as they are encoded.
pub type ComponentNameFn = dyn Fn(&str) -> String + Send + Sync;

#[derive(Debug)]
enum StackValue {
    Expr(Expression),
    Params(Vec<Expression>),
    Hash(Hash),
}

#[derive(Debug, Default)]
struct BlockFrame {
    statements: Vec<Statement>,
    parameters: Vec<u32>,
}

#[derive(Debug)]
enum ComponentHead {
    Static(String),
    Dynamic(Expression),
}

#[derive(Debug)]
struct ComponentFrame {
    head: ComponentHead,
    attrs: Vec<Statement>,
    args: Hash,
    named: Blocks,
}

#[derive(Debug)]
enum Frame {
    Block(BlockFrame),
    Component(ComponentFrame),
}

/// Runs allocated ops on a value stack and collects statements.
pub struct WireEncoder<'o> {
    stack: Vec<StackValue>,
    frames: Vec<Frame>,
    finished: Vec<SerializedInlineBlock>,
    named_blocks: Vec<String>,
    program: Option<BlockFrame>,
    customize_component_name: Option<&'o ComponentNameFn>,
}

impl<'o> WireEncoder<'o> {
    /// Creates an encoder, optionally renaming static components.
    pub fn new(customize_component_name: Option<&'o ComponentNameFn>) -> Self {
        Self {
            stack: Vec::new(),
            frames: Vec::new(),
            finished: Vec::new(),
            named_blocks: Vec::new(),
            program: None,
            customize_component_name,
        }
    }

    /// Encodes a whole program.
    pub fn process(mut self, allocation: Allocation) -> Result<SerializedTemplateBlock> {
        for op in allocation.ops {
            self.op(op)?;
        }
        let program = self
            .program
            .take()
            .ok_or_else(|| CompileError::Internal("program was never closed".into()))?;
        if !self.stack.is_empty() {
            return Err(CompileError::Internal(format!(
                "{} values left on the stack",
                self.stack.len()
            )));
        }
        debug!(statements = program.statements.len(), "encoded template");
        Ok(SerializedTemplateBlock {
            statements: program.statements,
            symbols: allocation.symbols.to_symbols(),
            has_eval: allocation.has_eval,
            upvars: allocation.symbols.to_upvars(),
        })
    }

    fn op(&mut self, op: AllocatedOp) -> Result<()> {
        match op {
            AllocatedOp::StartBlock { parameters } => self.frames.push(Frame::Block(BlockFrame {
                statements: Vec::new(),
                parameters,
            })),
            AllocatedOp::GetSymbol(slot) => self.push(Expression::GetSymbol(slot)),
            AllocatedOp::GetFree { upvar, context } => {
                self.push(Expression::GetContextualFree { upvar, context })
            }
            AllocatedOp::AttrSplat(slot) => self.attribute(Statement::AttrSplat(slot))?,
            AllocatedOp::Yield { to } => {
                let params = self.pop_params()?;
                self.statement(Statement::Yield { to, params })?;
            }
            AllocatedOp::HasBlock(slot) => {
                self.push(Expression::HasBlock(Box::new(Expression::GetSymbol(slot))))
            }
            AllocatedOp::HasBlockParams(slot) => {
                self.push(Expression::HasBlockParams(Box::new(Expression::GetSymbol(slot))))
            }
            AllocatedOp::Partial { eval_info } => {
                let mut params = self.pop_params()?;
                if params.len() != 1 {
                    return Err(CompileError::Internal(format!(
                        "partial expects one param, got {}",
                        params.len()
                    )));
                }
                let target = params.remove(0);
                self.statement(Statement::Partial { target, eval_info })?;
            }
            AllocatedOp::Debugger { eval_info } => {
                self.statement(Statement::Debugger { eval_info })?
            }
            AllocatedOp::Op(op) => self.input_op(op)?,
        }
        Ok(())
    }

    fn input_op(&mut self, op: InputOp) -> Result<()> {
        match op {
            InputOp::StartProgram => self.frames.push(Frame::Block(BlockFrame::default())),
            InputOp::EndProgram => {
                let frame = self.pop_block_frame()?;
                self.program = Some(frame);
            }
            InputOp::EndBlock => {
                let frame = self.pop_block_frame()?;
                self.finished.push(SerializedInlineBlock {
                    statements: frame.statements,
                    parameters: frame.parameters,
                });
            }

            InputOp::Text(chars) => self.statement(Statement::Text(chars))?,
            InputOp::Comment(value) => self.statement(Statement::Comment(value))?,
            InputOp::OpenElement { tag, simple } => {
                self.statement(Statement::OpenElement { tag, simple })?
            }
            InputOp::OpenComponent { tag } => {
                let tag = match self.customize_component_name {
                    Some(customize) => customize(&tag),
                    None => tag,
                };
                self.open_component(ComponentHead::Static(tag));
            }
            InputOp::OpenDynamicComponent => {
                let head = self.pop_expr()?;
                self.open_component(ComponentHead::Dynamic(head));
            }
            InputOp::OpenNamedBlock { name } => self.named_blocks.push(name),
            InputOp::FlushElement => {
                if !matches!(self.frames.last(), Some(Frame::Component(_))) {
                    self.statement(Statement::FlushElement)?;
                }
            }
            InputOp::CloseElement => self.statement(Statement::CloseElement)?,
            InputOp::CloseComponent | InputOp::CloseDynamicComponent => self.close_component()?,
            InputOp::CloseNamedBlock => self.close_named_block()?,

            InputOp::StaticAttr { name, namespace } => {
                let value = match self.pop_expr()? {
                    Expression::Value(trellis_wire::Primitive::String(value)) => value,
                    other => {
                        return Err(CompileError::Internal(format!(
                            "static attribute `{name}` has non-string value {other:?}"
                        )));
                    }
                };
                self.attribute(Statement::StaticAttr {
                    name,
                    value,
                    namespace,
                })?;
            }
            InputOp::DynamicAttr { name, namespace } => {
                let value = self.pop_expr()?;
                self.attribute(Statement::DynamicAttr {
                    name,
                    value,
                    namespace,
                })?;
            }
            InputOp::TrustingAttr { name, namespace } => {
                let value = self.pop_expr()?;
                self.attribute(Statement::TrustingDynamicAttr {
                    name,
                    value,
                    namespace,
                })?;
            }
            InputOp::ComponentAttr { name, namespace } => {
                let value = self.pop_expr()?;
                self.attribute(Statement::ComponentAttr {
                    name,
                    value,
                    namespace,
                })?;
            }
            InputOp::TrustingComponentAttr { name, namespace } => {
                let value = self.pop_expr()?;
                self.attribute(Statement::TrustingComponentAttr {
                    name,
                    value,
                    namespace,
                })?;
            }
            InputOp::StaticArg(name) | InputOp::DynamicArg(name) => {
                let value = self.pop_expr()?;
                self.argument(name, value)?;
            }
            InputOp::Modifier => {
                let head = self.pop_expr()?;
                let params = self.pop_params()?;
                let hash = self.pop_hash()?;
                self.attribute(Statement::Modifier { head, params, hash })?;
            }
            InputOp::Append { trusting } => {
                let value = self.pop_expr()?;
                self.statement(Statement::Append { value, trusting })?;
            }
            InputOp::Block { has_inverse } => {
                let head = self.pop_expr()?;
                let params = self.pop_params()?;
                let hash = self.pop_hash()?;
                let inverse = if has_inverse {
                    Some(self.pop_finished()?)
                } else {
                    None
                };
                let mut blocks = Blocks::new();
                blocks.push("default", self.pop_finished()?);
                if let Some(inverse) = inverse {
                    blocks.push("else", inverse);
                }
                self.statement(Statement::Block {
                    head,
                    params,
                    hash,
                    blocks: Some(blocks),
                })?;
            }

            InputOp::Helper => {
                let callee = self.pop_expr()?;
                let params = self.pop_params()?;
                let hash = self.pop_hash()?;
                self.push(Expression::Call {
                    callee: Box::new(callee),
                    params,
                    hash,
                });
            }
            InputOp::Concat => {
                let parts = self.pop_params()?;
                self.push(Expression::Concat(parts));
            }
            InputOp::Literal(literal) => self.push(literal.to_wire()),
            InputOp::PrepareArray(count) => {
                let mut params = Vec::with_capacity(count);
                for _ in 0..count {
                    params.push(self.pop_expr()?);
                }
                self.stack.push(StackValue::Params(params));
            }
            InputOp::PrepareObject(count) => {
                let mut hash = Hash::new();
                for _ in 0..count {
                    let key = match self.pop_expr()? {
                        Expression::Value(trellis_wire::Primitive::String(key)) => key,
                        other => {
                            return Err(CompileError::Internal(format!(
                                "hash key must be a string, got {other:?}"
                            )));
                        }
                    };
                    let value = self.pop_expr()?;
                    hash.push(key, value);
                }
                self.stack.push(StackValue::Hash(hash));
            }
            InputOp::GetPath(tail) => {
                let head = self.pop_expr()?;
                self.push(head.path(tail));
            }

            op @ (InputOp::StartBlock { .. }
            | InputOp::AttrSplat
            | InputOp::Yield { .. }
            | InputOp::Partial
            | InputOp::Debugger
            | InputOp::HasBlock(_)
            | InputOp::HasBlockParams(_)
            | InputOp::GetThis
            | InputOp::GetArg(_)
            | InputOp::GetVar { .. }) => {
                return Err(CompileError::Internal(format!(
                    "unallocated op reached the encoder: {op:?}"
                )));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Frames
    // ========================================================================

    fn open_component(&mut self, head: ComponentHead) {
        self.frames.push(Frame::Component(ComponentFrame {
            head,
            attrs: Vec::new(),
            args: Hash::new(),
            named: Blocks::new(),
        }));
    }

    fn close_component(&mut self) -> Result<()> {
        let default = self.pop_finished()?;
        let frame = match self.frames.pop() {
            Some(Frame::Component(frame)) => frame,
            other => {
                return Err(CompileError::Internal(format!(
                    "expected a component frame, found {other:?}"
                )));
            }
        };
        let blocks = if !frame.named.is_empty() {
            Some(frame.named)
        } else if !default.statements.is_empty() || !default.parameters.is_empty() {
            let mut blocks = Blocks::new();
            blocks.push("default", default);
            Some(blocks)
        } else {
            None
        };
        let args = frame.args.into_option();
        let statement = match frame.head {
            ComponentHead::Static(tag) => Statement::Component {
                tag,
                attrs: frame.attrs,
                args,
                blocks,
            },
            ComponentHead::Dynamic(head) => Statement::DynamicComponent {
                head,
                attrs: frame.attrs,
                args,
                blocks,
            },
        };
        self.statement(statement)
    }

    fn close_named_block(&mut self) -> Result<()> {
        let block = self.pop_finished()?;
        let name = self
            .named_blocks
            .pop()
            .ok_or_else(|| CompileError::Internal("named block was never opened".into()))?;
        let frame = self
            .frames
            .iter_mut()
            .rev()
            .find_map(|frame| match frame {
                Frame::Component(component) => Some(component),
                Frame::Block(_) => None,
            })
            .ok_or_else(|| CompileError::Internal(format!("named block `{name}` outside a component")))?;
        if frame.named.get(&name).is_some() {
            return Err(CompileError::DuplicateBlock(name));
        }
        frame.named.push(name, block);
        Ok(())
    }

    fn pop_block_frame(&mut self) -> Result<BlockFrame> {
        match self.frames.pop() {
            Some(Frame::Block(frame)) => Ok(frame),
            other => Err(CompileError::Internal(format!(
                "expected a block frame, found {other:?}"
            ))),
        }
    }

    fn pop_finished(&mut self) -> Result<SerializedInlineBlock> {
        self.finished
            .pop()
            .ok_or_else(|| CompileError::Internal("no finished block to take".into()))
    }

    fn statement(&mut self, statement: Statement) -> Result<()> {
        match self.frames.last_mut() {
            Some(Frame::Block(frame)) => {
                frame.statements.push(statement);
                Ok(())
            }
            other => Err(CompileError::Internal(format!(
                "statement {:?} outside a block: {other:?}",
                statement.opcode()
            ))),
        }
    }

    fn attribute(&mut self, attribute: Statement) -> Result<()> {
        match self.frames.last_mut() {
            Some(Frame::Component(frame)) => {
                frame.attrs.push(attribute);
                Ok(())
            }
            _ => self.statement(attribute),
        }
    }

    fn argument(&mut self, name: String, value: Expression) -> Result<()> {
        match self.frames.last_mut() {
            Some(Frame::Component(frame)) => {
                frame.args.push(name, value);
                Ok(())
            }
            _ => Err(CompileError::Internal(format!(
                "argument `{name}` outside a component"
            ))),
        }
    }

    // ========================================================================
    // Value stack
    // ========================================================================

    fn push(&mut self, expr: Expression) {
        self.stack.push(StackValue::Expr(expr));
    }

    fn pop(&mut self) -> Result<StackValue> {
        self.stack
            .pop()
            .ok_or_else(|| CompileError::Internal("value stack underflow".into()))
    }

    fn pop_expr(&mut self) -> Result<Expression> {
        match self.pop()? {
            StackValue::Expr(expr) => Ok(expr),
            other => Err(CompileError::Internal(format!(
                "expected an expression, found {other:?}"
            ))),
        }
    }

    fn pop_params(&mut self) -> Result<Vec<Expression>> {
        match self.pop()? {
            StackValue::Params(params) => Ok(params),
            StackValue::Expr(expr) if expr == Expression::null() => Ok(Vec::new()),
            other => Err(CompileError::Internal(format!(
                "expected params, found {other:?}"
            ))),
        }
    }

    fn pop_hash(&mut self) -> Result<Option<Hash>> {
        match self.pop()? {
            StackValue::Hash(hash) => Ok(Some(hash)),
            StackValue::Expr(expr) if expr == Expression::null() => Ok(None),
            other => Err(CompileError::Internal(format!(
                "expected a hash, found {other:?}"
            ))),
        }
    }
}
