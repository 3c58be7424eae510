//! Intermediate ops passed between compiler stages.

use trellis_wire::FreeVarContext;

use crate::ast::Literal;

/// Ops emitted by the template compiler.
///
/// Operand-producing ops push onto a value stack that consuming ops pop;
/// positional params and hash pairs are pushed in reverse and closed by a
/// `PrepareArray`/`PrepareObject` count.
#[derive(Debug, Clone, PartialEq)]
pub enum InputOp {
    /// Template start
    StartProgram,
    /// Template end
    EndProgram,
    /// Open an inline block binding `params`
    StartBlock {
        /// Block parameter names
        params: Vec<String>,
    },
    /// Close the innermost inline block
    EndBlock,

    /// Static text
    Text(String),
    /// HTML comment
    Comment(String),
    /// Start a plain element
    OpenElement {
        /// Tag name
        tag: String,
        /// No splattributes or modifiers
        simple: bool,
    },
    /// Start a statically named component
    OpenComponent {
        /// Tag name
        tag: String,
    },
    /// Start a component whose definition was just pushed
    OpenDynamicComponent,
    /// Start a named block inside a component
    OpenNamedBlock {
        /// Block name, without the leading `:`
        name: String,
    },
    /// End of attributes
    FlushElement,
    /// End a plain element
    CloseElement,
    /// End a static component
    CloseComponent,
    /// End a dynamic component
    CloseDynamicComponent,
    /// End a named block
    CloseNamedBlock,

    /// Literal attribute; pops the value
    StaticAttr {
        /// Attribute name
        name: String,
        /// Namespace URI
        namespace: Option<String>,
    },
    /// Escaped attribute; pops the value
    DynamicAttr {
        /// Attribute name
        name: String,
        /// Namespace URI
        namespace: Option<String>,
    },
    /// Unescaped attribute; pops the value
    TrustingAttr {
        /// Attribute name
        name: String,
        /// Namespace URI
        namespace: Option<String>,
    },
    /// Attribute in component context; pops the value
    ComponentAttr {
        /// Attribute name
        name: String,
        /// Namespace URI
        namespace: Option<String>,
    },
    /// Unescaped attribute in component context; pops the value
    TrustingComponentAttr {
        /// Attribute name
        name: String,
        /// Namespace URI
        namespace: Option<String>,
    },
    /// Literal argument; pops the value
    StaticArg(String),
    /// Dynamic argument; pops the value
    DynamicArg(String),
    /// `...attributes`
    AttrSplat,
    /// Pops head, params and hash
    Modifier,
    /// Pops a value
    Append {
        /// Unescaped
        trusting: bool,
    },
    /// Pops head, params and hash; takes the finished blocks
    Block {
        /// An inverse block was finished after the program
        has_inverse: bool,
    },
    /// Pops params
    Yield {
        /// Block name
        to: String,
    },
    /// Pops params
    Partial,
    /// Breakpoint
    Debugger,

    /// Pushes `has-block`
    HasBlock(String),
    /// Pushes `has-block-params`
    HasBlockParams(String),
    /// Pops head, params and hash; pushes a call
    Helper,
    /// Pops params; pushes a concat
    Concat,
    /// Pushes a literal
    Literal(Literal),
    /// Pops `n` values; pushes params
    PrepareArray(usize),
    /// Pops `n` key/value pairs; pushes a hash
    PrepareObject(usize),
    /// Pushes `this`
    GetThis,
    /// Pushes a named argument
    GetArg(String),
    /// Pushes a local or free variable
    GetVar {
        /// Variable name
        name: String,
        /// Context used if the name is free
        context: FreeVarContext,
    },
    /// Pops a head; pushes a path lookup
    GetPath(Vec<String>),
}

/// Ops with every name resolved to a symbol slot or upvar.
#[derive(Debug, Clone, PartialEq)]
pub enum AllocatedOp {
    /// Open an inline block whose parameters are bound to these slots
    StartBlock {
        /// Parameter slots
        parameters: Vec<u32>,
    },
    /// Pushes a symbol read
    GetSymbol(u32),
    /// Pushes a free variable read
    GetFree {
        /// Upvar index
        upvar: u32,
        /// Reference context
        context: FreeVarContext,
    },
    /// `...attributes`, reading the `&attrs` block
    AttrSplat(u32),
    /// Pops params; yields to a block symbol
    Yield {
        /// Block slot
        to: u32,
    },
    /// Pushes `has-block` for a block slot
    HasBlock(u32),
    /// Pushes `has-block-params` for a block slot
    HasBlockParams(u32),
    /// Pops params
    Partial {
        /// Observable slots
        eval_info: Vec<u32>,
    },
    /// Breakpoint
    Debugger {
        /// Observable slots
        eval_info: Vec<u32>,
    },
    /// An op with no names to resolve
    Op(InputOp),
}
