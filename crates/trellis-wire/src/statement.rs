//! Wire-format statements.

use crate::expression::{Expression, Hash, Params};
use crate::opcodes::SexpOpcode;
use crate::template::SerializedInlineBlock;

/// Named inline blocks passed to an invocation, serialized as
/// `[names, blocks]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Blocks {
    /// Block names, e.g. `default` and `else`
    pub names: Vec<String>,
    /// The blocks, parallel to `names`
    pub blocks: Vec<SerializedInlineBlock>,
}

impl Blocks {
    /// Creates an empty block list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named block.
    pub fn push(&mut self, name: impl Into<String>, block: SerializedInlineBlock) {
        self.names.push(name.into());
        self.blocks.push(block);
    }

    /// Looks up a block by name.
    pub fn get(&self, name: &str) -> Option<&SerializedInlineBlock> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.blocks[i])
    }

    /// Iterates the blocks in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SerializedInlineBlock)> {
        self.names.iter().map(String::as_str).zip(self.blocks.iter())
    }

    /// Returns true if there are no blocks.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Converts an empty list to `None`.
    pub fn into_option(self) -> Option<Blocks> {
        if self.is_empty() { None } else { Some(self) }
    }
}

/// A wire-format statement.
///
/// Component invocations carry their attributes as a nested statement list;
/// only attribute-like variants (see [`SexpOpcode::is_attribute`]) appear
/// there.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Static text
    Text(String),
    /// Append an expression's value
    Append {
        /// The value
        value: Expression,
        /// Insert as raw HTML instead of escaped text
        trusting: bool,
    },
    /// HTML comment
    Comment(String),
    /// Element modifier
    Modifier {
        /// The modifier reference
        head: Expression,
        /// Positional arguments
        params: Params,
        /// Named arguments
        hash: Option<Hash>,
    },
    /// Curly block invocation
    Block {
        /// The invoked name
        head: Expression,
        /// Positional arguments
        params: Params,
        /// Named arguments
        hash: Option<Hash>,
        /// `default` and `else` blocks
        blocks: Option<Blocks>,
    },
    /// Component with a static tag
    Component {
        /// Tag name
        tag: String,
        /// Attributes and modifiers
        attrs: Vec<Statement>,
        /// `@` arguments
        args: Option<Hash>,
        /// Default or named blocks
        blocks: Option<Blocks>,
    },
    /// Component whose definition is the value of an expression
    DynamicComponent {
        /// The definition
        head: Expression,
        /// Attributes and modifiers
        attrs: Vec<Statement>,
        /// `@` arguments
        args: Option<Hash>,
        /// Default or named blocks
        blocks: Option<Blocks>,
    },
    /// Element start
    OpenElement {
        /// Tag name
        tag: String,
        /// False when the element has splattributes or modifiers
        simple: bool,
    },
    /// End of attributes
    FlushElement,
    /// Element end
    CloseElement,
    /// Literal attribute
    StaticAttr {
        /// Attribute name
        name: String,
        /// Attribute value
        value: String,
        /// Namespace URI
        namespace: Option<String>,
    },
    /// Escaped dynamic attribute
    DynamicAttr {
        /// Attribute name
        name: String,
        /// Attribute value
        value: Expression,
        /// Namespace URI
        namespace: Option<String>,
    },
    /// Attribute in component context
    ComponentAttr {
        /// Attribute name
        name: String,
        /// Attribute value
        value: Expression,
        /// Namespace URI
        namespace: Option<String>,
    },
    /// `...attributes`, pointing at the `&attrs` block symbol
    AttrSplat(u32),
    /// Yield to a block symbol
    Yield {
        /// The block symbol
        to: u32,
        /// Block arguments
        params: Params,
    },
    /// Dynamic partial
    Partial {
        /// Partial name expression
        target: Expression,
        /// Symbols visible to the partial
        eval_info: Vec<u32>,
    },
    /// Named argument with an expression value
    DynamicArg {
        /// Argument name, including `@`
        name: String,
        /// Value
        value: Expression,
    },
    /// Named argument with a literal value
    StaticArg {
        /// Argument name, including `@`
        name: String,
        /// Value
        value: Expression,
    },
    /// Unescaped dynamic attribute
    TrustingDynamicAttr {
        /// Attribute name
        name: String,
        /// Attribute value
        value: Expression,
        /// Namespace URI
        namespace: Option<String>,
    },
    /// Unescaped attribute in component context
    TrustingComponentAttr {
        /// Attribute name
        name: String,
        /// Attribute value
        value: Expression,
        /// Namespace URI
        namespace: Option<String>,
    },
    /// Debugger breakpoint
    Debugger {
        /// Symbols visible at the breakpoint
        eval_info: Vec<u32>,
    },
}

impl Statement {
    /// The opcode this statement serializes with.
    pub fn opcode(&self) -> SexpOpcode {
        match self {
            Statement::Text(_) => SexpOpcode::Text,
            Statement::Append { .. } => SexpOpcode::Append,
            Statement::Comment(_) => SexpOpcode::Comment,
            Statement::Modifier { .. } => SexpOpcode::Modifier,
            Statement::Block { .. } => SexpOpcode::Block,
            Statement::Component { .. } => SexpOpcode::Component,
            Statement::DynamicComponent { .. } => SexpOpcode::DynamicComponent,
            Statement::OpenElement { .. } => SexpOpcode::OpenElement,
            Statement::FlushElement => SexpOpcode::FlushElement,
            Statement::CloseElement => SexpOpcode::CloseElement,
            Statement::StaticAttr { .. } => SexpOpcode::StaticAttr,
            Statement::DynamicAttr { .. } => SexpOpcode::DynamicAttr,
            Statement::ComponentAttr { .. } => SexpOpcode::ComponentAttr,
            Statement::AttrSplat(_) => SexpOpcode::AttrSplat,
            Statement::Yield { .. } => SexpOpcode::Yield,
            Statement::Partial { .. } => SexpOpcode::Partial,
            Statement::DynamicArg { .. } => SexpOpcode::DynamicArg,
            Statement::StaticArg { .. } => SexpOpcode::StaticArg,
            Statement::TrustingDynamicAttr { .. } => SexpOpcode::TrustingDynamicAttr,
            Statement::TrustingComponentAttr { .. } => SexpOpcode::TrustingComponentAttr,
            Statement::Debugger { .. } => SexpOpcode::Debugger,
        }
    }

    /// Returns true for static text made only of whitespace.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Statement::Text(chars) if chars.trim().is_empty())
    }
}
