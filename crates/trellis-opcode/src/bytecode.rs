//! Instruction definitions.

use std::fmt;

use serde::Serialize;
use trellis_wire::{FreeVarContext, Primitive};

/// A lowered template.
///
/// Inline blocks are compiled into [`Program::blocks`] and referenced by
/// index; the constant pool is shared by the template and all its blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    /// Top-level instructions
    pub instructions: Vec<Instruction>,
    /// The constant pool
    pub constants: Vec<Constant>,
    /// The block table
    pub blocks: Vec<CompiledBlock>,
}

impl Program {
    /// Creates a new empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constant and returns its index. Equal constants share a slot.
    pub fn add_constant(&mut self, constant: Constant) -> u32 {
        if let Some(index) = self.constants.iter().position(|c| *c == constant) {
            return index as u32;
        }
        self.constants.push(constant);
        (self.constants.len() - 1) as u32
    }

    /// Looks up a constant.
    pub fn constant(&self, index: u32) -> Option<&Constant> {
        self.constants.get(index as usize)
    }
}

/// An inline block in the block table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledBlock {
    /// Symbol slots bound to the block's parameters
    pub parameters: Vec<u32>,
    /// Body instructions
    pub instructions: Vec<Instruction>,
}

/// A constant pool entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Constant {
    /// A literal value
    Value(Primitive),
    /// The names of a named-argument list
    Names(Vec<String>),
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::Value(Primitive::String(value.to_string()))
    }
}

impl From<String> for Constant {
    fn from(value: String) -> Self {
        Constant::Value(Primitive::String(value))
    }
}

/// A single VM instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instruction {
    /// The operation code
    pub opcode: OpCode,
    /// Operands, in a fixed order per opcode
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// Creates a new instruction with no operands.
    pub fn simple(opcode: OpCode) -> Self {
        Self {
            opcode,
            operands: Vec::new(),
        }
    }

    /// Creates a new instruction with one operand.
    pub fn with_operand(opcode: OpCode, operand: Operand) -> Self {
        Self {
            opcode,
            operands: vec![operand],
        }
    }

    /// Creates a new instruction with several operands.
    pub fn with_operands(opcode: OpCode, operands: Vec<Operand>) -> Self {
        Self { opcode, operands }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.opcode)?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

/// Instruction operands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Operand {
    /// Constant pool index
    Constant(u32),
    /// Symbol slot
    Symbol(u32),
    /// Symbol slots observable by `partial` and `debugger`
    Symbols(Vec<u32>),
    /// Upvar index
    Upvar(u32),
    /// Free variable context
    Context(FreeVarContext),
    /// Resolved helper, modifier or component handle
    Handle(u32),
    /// Block table index
    Block(u32),
    /// Number of stack values
    Count(u32),
    /// Boolean flag
    Flag(bool),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(i) => write!(f, "#{i}"),
            Operand::Symbol(s) => write!(f, "${s}"),
            Operand::Symbols(slots) => write!(f, "{slots:?}"),
            Operand::Upvar(u) => write!(f, "^{u}"),
            Operand::Context(c) => write!(f, "<{}>", c.name()),
            Operand::Handle(h) => write!(f, "@{h}"),
            Operand::Block(b) => write!(f, "block{b}"),
            Operand::Count(n) => write!(f, "{n}"),
            Operand::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// Operation codes for the rendering VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum OpCode {
    // Stack operations
    /// Push a constant
    PushConstant,
    /// Push undefined
    PushUndefined,
    /// Push null
    PushNull,
    /// Push true
    PushTrue,
    /// Push false
    PushFalse,
    /// Collect positional values and the named values listed by a
    /// `Names` constant into an argument frame
    PushArgs,
    /// Push a block from the block table under a name
    PushBlock,
    /// Push the attribute block of a component invocation
    PushAttrs,

    // Variable operations
    /// Read a symbol slot
    GetVariable,
    /// Read a key of the value on the stack
    GetProperty,
    /// Resolve an upvar in a syntactic context
    ResolveContextualFree,

    // Expressions
    /// Concatenate `n` values
    Concat,
    /// Invoke a resolved helper with the pushed arguments
    Helper,
    /// Curry the component definition on the stack with the pushed arguments
    CurryComponent,
    /// Test whether the block on the stack is present
    HasBlock,
    /// Test whether the block on the stack declares parameters
    HasBlockParams,
    /// Unpack a block value into its parts
    SpreadBlock,
    /// Compile the spread block
    CompileBlock,

    // Content
    /// Static text
    Text,
    /// HTML comment
    Comment,
    /// Append the value on the stack as text
    AppendText,
    /// Append the value on the stack as HTML
    AppendHtml,

    // Elements
    /// Open an element
    OpenElement,
    /// End the attributes of the open element
    FlushElement,
    /// Close the open element
    CloseElement,
    /// Literal attribute
    StaticAttr,
    /// Attribute from the value on the stack
    DynamicAttr,
    /// Attribute from the value on the stack, merged by the component
    ComponentAttr,
    /// Apply `...attributes`
    AttrSplat,
    /// Install a resolved modifier with the pushed arguments
    Modifier,

    // Invocation
    /// Invoke a resolved component with the pushed arguments and blocks
    InvokeComponent,
    /// Invoke the component definition on the stack
    InvokeDynamicComponent,
    /// Yield the pushed arguments to a block symbol
    Yield,
    /// Render the partial named by the value on the stack
    InvokePartial,
    /// Breakpoint
    Debugger,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_shared() {
        let mut program = Program::new();
        assert_eq!(program.add_constant("div".into()), 0);
        assert_eq!(program.add_constant(Constant::Names(vec!["@a".into()])), 1);
        assert_eq!(program.add_constant("div".into()), 0);
        assert_eq!(program.constants.len(), 2);
        assert_eq!(program.constant(1), Some(&Constant::Names(vec!["@a".into()])));
    }

    #[test]
    fn test_instruction_display() {
        let instruction = Instruction::with_operands(
            OpCode::ResolveContextualFree,
            vec![Operand::Upvar(2), Operand::Context(FreeVarContext::Helper)],
        );
        assert_eq!(instruction.to_string(), "ResolveContextualFree ^2 <helper>");
        assert_eq!(Instruction::simple(OpCode::FlushElement).to_string(), "FlushElement");
    }
}
