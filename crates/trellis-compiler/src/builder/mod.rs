//! Programmatic construction of wire-format templates.
//!
//! [`TemplateBuilder`] produces the same statements the compiler would for an
//! equivalent template, without an AST:
//!
//! ```
//! use trellis_compiler::builder::{BlockDefinition, TemplateBuilder};
//!
//! let mut b = TemplateBuilder::new();
//! b.element("div", |b| {
//!     b.block(
//!         "each",
//!         BlockDefinition::new(|b| {
//!             let name = b.get_local("p", "name");
//!             b.append(name, false);
//!         })
//!         .params(vec![b.get_free("people", "")])
//!         .locals(&["p"]),
//!     );
//! });
//! let block = b.to_block().unwrap();
//! assert_eq!(block.symbols, vec!["p"]);
//! ```
//!
//! Name resolution errors do not interrupt building. The first one is kept
//! and returned from [`TemplateBuilder::to_block`] or
//! [`InlineBlockBuilder::to_block`].
//!
//! The tuple-like surface used by tests lives in [`literal`].

pub mod literal;
mod macros;

use trellis_wire::{
    Blocks, Expression, FreeVarContext, Hash, SerializedInlineBlock, SerializedTemplate,
    SerializedTemplateBlock, Statement,
};

use crate::compiler::attr_namespace;
use crate::error::{CompileError, Result};
use crate::symbols::{LocalSymbols, ProgramSymbols, Symbols};

/// An expression whose names are resolved when it is used.
#[derive(Debug, Clone, PartialEq)]
pub enum ToExpression {
    /// An already-built wire expression
    Expr(Expression),
    /// A free variable with a property tail
    Free {
        /// Variable name
        head: String,
        /// Property keys
        tail: Vec<String>,
    },
    /// A named argument, without `@`
    Arg {
        /// Argument name
        name: String,
        /// Property keys
        tail: Vec<String>,
    },
    /// A block parameter
    Local {
        /// Parameter name
        name: String,
        /// Property keys
        tail: Vec<String>,
    },
    /// `this` with a property tail
    This(Vec<String>),
    /// A call of a free helper
    Helper {
        /// Helper name
        name: String,
        /// Positional arguments
        params: Vec<ToExpression>,
        /// Named arguments
        hash: Vec<(String, ToExpression)>,
    },
    /// String concatenation
    Concat(Vec<ToExpression>),
    /// `has-block` on a named block
    HasBlock(String),
    /// `has-block-params` on a named block
    HasBlockParams(String),
}

impl From<Expression> for ToExpression {
    fn from(expr: Expression) -> Self {
        ToExpression::Expr(expr)
    }
}

impl From<&str> for ToExpression {
    fn from(value: &str) -> Self {
        ToExpression::Expr(Expression::string(value))
    }
}

impl From<f64> for ToExpression {
    fn from(value: f64) -> Self {
        ToExpression::Expr(Expression::Value(trellis_wire::Primitive::Number(value)))
    }
}

impl From<bool> for ToExpression {
    fn from(value: bool) -> Self {
        ToExpression::Expr(Expression::Value(trellis_wire::Primitive::Boolean(value)))
    }
}

fn tail(path: &str) -> Vec<String> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').map(str::to_string).collect()
    }
}

impl ToExpression {
    /// Resolves names against `symbols`. Free variables take `context`,
    /// narrowed the same way the compiler narrows them.
    pub fn resolve(self, symbols: &mut dyn Symbols, context: FreeVarContext) -> Result<Expression> {
        Ok(match self {
            ToExpression::Expr(expr) => expr,
            ToExpression::Free { head, tail } => {
                let context = match context {
                    FreeVarContext::Ambiguous => FreeVarContext::for_value(!tail.is_empty()),
                    other => other,
                };
                Expression::GetContextualFree {
                    upvar: symbols.free_var(&head),
                    context,
                }
                .path(tail)
            }
            ToExpression::Arg { name, tail } => {
                Expression::GetSymbol(symbols.arg(&format!("@{name}"))).path(tail)
            }
            ToExpression::Local { name, tail } => {
                Expression::GetSymbol(symbols.local(&name)?).path(tail)
            }
            ToExpression::This(tail) => Expression::GetSymbol(0).path(tail),
            ToExpression::Helper { name, params, hash } => {
                let callee = Expression::GetContextualFree {
                    upvar: symbols.free_var(&name),
                    context: FreeVarContext::Helper,
                }
                .path(Vec::new());
                Expression::Call {
                    callee: Box::new(callee),
                    params: resolve_params(params, symbols)?,
                    hash: resolve_hash(hash, symbols)?,
                }
            }
            ToExpression::Concat(parts) => Expression::Concat(
                parts
                    .into_iter()
                    .map(|p| p.resolve(symbols, FreeVarContext::Ambiguous))
                    .collect::<Result<_>>()?,
            ),
            ToExpression::HasBlock(name) => Expression::HasBlock(Box::new(Expression::GetSymbol(
                symbols.block(&format!("&{name}")),
            ))),
            ToExpression::HasBlockParams(name) => Expression::HasBlockParams(Box::new(
                Expression::GetSymbol(symbols.block(&format!("&{name}"))),
            )),
        })
    }
}

fn resolve_params(params: Vec<ToExpression>, symbols: &mut dyn Symbols) -> Result<Vec<Expression>> {
    params
        .into_iter()
        .map(|p| p.resolve(symbols, FreeVarContext::Expression))
        .collect()
}

fn resolve_hash(hash: Vec<(String, ToExpression)>, symbols: &mut dyn Symbols) -> Result<Option<Hash>> {
    let mut out = Hash::new();
    for (key, value) in hash {
        out.push(key, value.resolve(symbols, FreeVarContext::Expression)?);
    }
    Ok(out.into_option())
}

fn free_head(symbols: &mut dyn Symbols, name: &str, context: FreeVarContext) -> Expression {
    Expression::GetContextualFree {
        upvar: symbols.free_var(name),
        context,
    }
    .path(Vec::new())
}

/// The body of an inline block, built on demand.
pub type InlineBlockFn<'f> = Box<dyn for<'p> FnOnce(&mut InlineBlockBuilder<'p>) + 'f>;

/// The parts of a block invocation.
pub struct BlockDefinition<'f> {
    params: Vec<ToExpression>,
    hash: Vec<(String, ToExpression)>,
    locals: Vec<String>,
    blocks: Vec<(String, InlineBlockFn<'f>)>,
}

impl<'f> BlockDefinition<'f> {
    /// An invocation whose only block is `default`.
    pub fn new(block: impl for<'p> FnOnce(&mut InlineBlockBuilder<'p>) + 'f) -> Self {
        Self::named(Vec::new()).block("default", block)
    }

    /// An invocation with the given named blocks.
    pub fn named(blocks: Vec<(String, InlineBlockFn<'f>)>) -> Self {
        Self {
            params: Vec::new(),
            hash: Vec::new(),
            locals: Vec::new(),
            blocks,
        }
    }

    /// Adds a named block.
    pub fn block(
        mut self,
        name: &str,
        block: impl for<'p> FnOnce(&mut InlineBlockBuilder<'p>) + 'f,
    ) -> Self {
        self.blocks.push((name.to_string(), Box::new(block)));
        self
    }

    /// Sets the positional arguments.
    pub fn params(mut self, params: Vec<ToExpression>) -> Self {
        self.params = params;
        self
    }

    /// Sets the named arguments.
    pub fn hash(mut self, hash: Vec<(&str, ToExpression)>) -> Self {
        self.hash = hash.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        self
    }

    /// Sets the block parameters every block binds.
    pub fn locals(mut self, locals: &[&str]) -> Self {
        self.locals = locals.iter().map(|l| l.to_string()).collect();
        self
    }
}

/// Statements under construction, over some symbol scope.
pub struct BlockBuilder<S> {
    symbols: S,
    statements: Vec<Statement>,
    error: Option<CompileError>,
}

/// Builds a whole template.
pub type TemplateBuilder = BlockBuilder<ProgramSymbols>;

/// Builds the body of a block invocation.
pub type InlineBlockBuilder<'p> = BlockBuilder<LocalSymbols<'p>>;

impl<S: Symbols> BlockBuilder<S> {
    fn with_symbols(symbols: S) -> Self {
        Self {
            symbols,
            statements: Vec::new(),
            error: None,
        }
    }

    fn fail(&mut self, error: CompileError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn resolve(&mut self, expr: ToExpression, context: FreeVarContext) -> Option<Expression> {
        match expr.resolve(&mut self.symbols, context) {
            Ok(expr) => Some(expr),
            Err(error) => {
                self.fail(error);
                None
            }
        }
    }

    /// A free variable, with a dotted property tail (may be empty).
    pub fn get_free(&self, name: &str, path: &str) -> ToExpression {
        ToExpression::Free {
            head: name.to_string(),
            tail: tail(path),
        }
    }

    /// A named argument, without `@`.
    pub fn get_arg(&self, name: &str, path: &str) -> ToExpression {
        ToExpression::Arg {
            name: name.to_string(),
            tail: tail(path),
        }
    }

    /// A block parameter in scope.
    pub fn get_local(&self, name: &str, path: &str) -> ToExpression {
        ToExpression::Local {
            name: name.to_string(),
            tail: tail(path),
        }
    }

    /// `this`, with a dotted property tail.
    pub fn get_this(&self, path: &str) -> ToExpression {
        ToExpression::This(tail(path))
    }

    /// A helper call.
    pub fn helper(
        &self,
        name: &str,
        params: Vec<ToExpression>,
        hash: Vec<(&str, ToExpression)>,
    ) -> ToExpression {
        ToExpression::Helper {
            name: name.to_string(),
            params,
            hash: hash.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    /// Concatenation of parts.
    pub fn concat(&self, parts: Vec<ToExpression>) -> ToExpression {
        ToExpression::Concat(parts)
    }

    /// `(has-block "name")`
    pub fn has_block(&self, name: &str) -> ToExpression {
        ToExpression::HasBlock(name.to_string())
    }

    /// `(has-block-params "name")`
    pub fn has_block_params(&self, name: &str) -> ToExpression {
        ToExpression::HasBlockParams(name.to_string())
    }

    /// Static text.
    pub fn text(&mut self, text: &str) -> &mut Self {
        self.statements.push(Statement::Text(text.to_string()));
        self
    }

    /// Appends a value, unescaped when `trusted`.
    pub fn append(&mut self, expr: impl Into<ToExpression>, trusted: bool) -> &mut Self {
        if let Some(value) = self.resolve(expr.into(), FreeVarContext::Ambiguous) {
            self.statements.push(Statement::Append {
                value,
                trusting: trusted,
            });
        }
        self
    }

    /// An HTML comment.
    pub fn comment(&mut self, value: &str) -> &mut Self {
        self.statements.push(Statement::Comment(value.to_string()));
        self
    }

    /// An element modifier invoking a free name.
    pub fn modifier(
        &mut self,
        name: &str,
        params: Vec<ToExpression>,
        hash: Vec<(&str, ToExpression)>,
    ) -> &mut Self {
        match build_modifier(&mut self.symbols, name, params, hash) {
            Ok(statement) => self.statements.push(statement),
            Err(error) => self.fail(error),
        }
        self
    }

    /// A block invocation of a free name.
    pub fn block(&mut self, name: &str, definition: BlockDefinition<'_>) -> &mut Self {
        let BlockDefinition {
            params,
            hash,
            locals,
            blocks: bodies,
        } = definition;

        let mut blocks = Blocks::new();
        for (block_name, body) in bodies {
            if blocks.get(&block_name).is_some() {
                self.fail(CompileError::DuplicateBlock(block_name));
                return self;
            }
            let mut builder = BlockBuilder::with_symbols(LocalSymbols::new(
                &mut self.symbols,
                locals.as_slice(),
            ));
            body(&mut builder);
            match builder.to_block() {
                Ok(block) => blocks.push(block_name, block),
                Err(error) => {
                    self.fail(error);
                    return self;
                }
            }
        }

        let params = resolve_params(params, &mut self.symbols);
        let hash = resolve_hash(hash, &mut self.symbols);
        let head = free_head(&mut self.symbols, name, FreeVarContext::Block);
        match (params, hash) {
            (Ok(params), Ok(hash)) => self.statements.push(Statement::Block {
                head,
                params,
                hash,
                blocks: blocks.into_option(),
            }),
            (Err(error), _) | (_, Err(error)) => self.fail(error),
        }
        self
    }

    /// An element with no attributes.
    pub fn element(&mut self, tag: &str, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.element_with(tag, |_| {}, body)
    }

    /// An element whose attributes are built by `attrs`.
    pub fn element_with(
        &mut self,
        tag: &str,
        attrs: impl FnOnce(&mut ElementTagBuilder<'_>),
        body: impl FnOnce(&mut Self),
    ) -> &mut Self {
        let mut tag_builder = ElementTagBuilder::new(&mut self.symbols);
        attrs(&mut tag_builder);
        match tag_builder.finish() {
            Ok((simple, attributes)) => {
                self.statements.push(Statement::OpenElement {
                    tag: tag.to_string(),
                    simple,
                });
                self.statements.extend(attributes);
            }
            Err(error) => {
                self.fail(error);
                return self;
            }
        }
        self.statements.push(Statement::FlushElement);
        body(self);
        self.statements.push(Statement::CloseElement);
        self
    }

    /// A component whose definition is the value of `head`.
    ///
    /// `body`, when given, becomes the `default` block and binds `locals`.
    pub fn dynamic_component(
        &mut self,
        head: impl Into<ToExpression>,
        call: impl FnOnce(&mut ComponentCallBuilder<'_>),
        locals: &[&str],
        body: Option<InlineBlockFn<'_>>,
    ) -> &mut Self {
        let Some(head) = self.resolve(head.into(), FreeVarContext::Expression) else {
            return self;
        };

        let mut call_builder = ComponentCallBuilder::new(&mut self.symbols);
        call(&mut call_builder);
        let (attrs, args) = match call_builder.finish() {
            Ok(parts) => parts,
            Err(error) => {
                self.fail(error);
                return self;
            }
        };

        let mut blocks = Blocks::new();
        if let Some(body) = body {
            let mut builder = BlockBuilder::with_symbols(LocalSymbols::new(&mut self.symbols, locals));
            body(&mut builder);
            match builder.to_block() {
                Ok(block) => blocks.push("default", block),
                Err(error) => {
                    self.fail(error);
                    return self;
                }
            }
        }

        self.statements.push(Statement::DynamicComponent {
            head,
            attrs,
            args,
            blocks: blocks.into_option(),
        });
        self
    }
}

fn build_modifier(
    symbols: &mut dyn Symbols,
    name: &str,
    params: Vec<ToExpression>,
    hash: Vec<(&str, ToExpression)>,
) -> Result<Statement> {
    let head = free_head(symbols, name, FreeVarContext::Modifier);
    let params = resolve_params(params, symbols)?;
    let hash = resolve_hash(
        hash.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        symbols,
    )?;
    Ok(Statement::Modifier { head, params, hash })
}

impl TemplateBuilder {
    /// An empty template.
    pub fn new() -> Self {
        Self::with_symbols(ProgramSymbols::new())
    }

    /// Finishes the template block.
    pub fn to_block(self) -> Result<SerializedTemplateBlock> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(SerializedTemplateBlock {
            statements: self.statements,
            symbols: self.symbols.to_symbols(),
            has_eval: false,
            upvars: self.symbols.to_upvars(),
        })
    }

    /// Finishes the template with its id and metadata.
    pub fn to_template<M>(self, id: Option<String>, meta: M) -> Result<SerializedTemplate<M>> {
        Ok(SerializedTemplate {
            id,
            meta,
            block: self.to_block()?,
        })
    }
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InlineBlockBuilder<'_> {
    /// Finishes the block.
    pub fn to_block(self) -> Result<SerializedInlineBlock> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(SerializedInlineBlock {
            parameters: self.symbols.param_symbols(),
            statements: self.statements,
        })
    }
}

enum TagEntry {
    Attr {
        name: String,
        value: Expression,
        namespace: Option<String>,
    },
    Splat(u32),
}

/// Collects the attributes and modifiers of a plain element.
pub struct ElementTagBuilder<'s> {
    symbols: &'s mut dyn Symbols,
    entries: Vec<TagEntry>,
    modifiers: Vec<Statement>,
    error: Option<CompileError>,
}

impl<'s> ElementTagBuilder<'s> {
    fn new(symbols: &'s mut dyn Symbols) -> Self {
        Self {
            symbols,
            entries: Vec::new(),
            modifiers: Vec::new(),
            error: None,
        }
    }

    fn fail(&mut self, error: CompileError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// An attribute; a string literal value is static.
    pub fn attr(&mut self, name: &str, value: impl Into<ToExpression>) -> &mut Self {
        let namespace = attr_namespace(name).map(str::to_string);
        self.push_attr(name, value.into(), namespace)
    }

    /// An attribute with an explicit namespace.
    pub fn attr_ns(
        &mut self,
        name: &str,
        value: impl Into<ToExpression>,
        namespace: &str,
    ) -> &mut Self {
        self.push_attr(name, value.into(), Some(namespace.to_string()))
    }

    fn push_attr(&mut self, name: &str, value: ToExpression, namespace: Option<String>) -> &mut Self {
        if name.starts_with('@') {
            self.fail(CompileError::syntax_unlocated(format!(
                "`{name}` is not a valid attribute name. @arguments are only allowed on components"
            )));
            return self;
        }
        match value.resolve(self.symbols, FreeVarContext::Ambiguous) {
            Ok(value) => self.entries.push(TagEntry::Attr {
                name: name.to_string(),
                value,
                namespace,
            }),
            Err(error) => self.fail(error),
        }
        self
    }

    /// `...attributes`
    pub fn splat(&mut self) -> &mut Self {
        let slot = self.symbols.block("&attrs");
        self.entries.push(TagEntry::Splat(slot));
        self
    }

    /// A modifier invoking a free name.
    pub fn modifier(
        &mut self,
        name: &str,
        params: Vec<ToExpression>,
        hash: Vec<(&str, ToExpression)>,
    ) -> &mut Self {
        match build_modifier(self.symbols, name, params, hash) {
            Ok(statement) => self.modifiers.push(statement),
            Err(error) => self.fail(error),
        }
        self
    }

    /// Whether the element is simple, and its attribute statements with
    /// `type` moved last and modifiers after the attributes.
    fn finish(self) -> Result<(bool, Vec<Statement>)> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let has_splat = self.entries.iter().any(|e| matches!(e, TagEntry::Splat(_)));
        let simple = !has_splat && self.modifiers.is_empty();

        let mut out = Vec::with_capacity(self.entries.len() + self.modifiers.len());
        let mut type_attr = None;
        for entry in self.entries {
            match entry {
                TagEntry::Splat(slot) => out.push(Statement::AttrSplat(slot)),
                TagEntry::Attr { name, value, namespace } if name == "type" => {
                    type_attr = Some(attribute_statement(name, value, namespace, simple));
                }
                TagEntry::Attr { name, value, namespace } => {
                    out.push(attribute_statement(name, value, namespace, simple))
                }
            }
        }
        out.extend(type_attr);
        out.extend(self.modifiers);
        Ok((simple, out))
    }
}

/// The attribute statement for a resolved value on a plain element.
fn attribute_statement(
    name: String,
    value: Expression,
    namespace: Option<String>,
    simple: bool,
) -> Statement {
    match value {
        Expression::Value(trellis_wire::Primitive::String(value)) if simple => {
            Statement::StaticAttr {
                name,
                value,
                namespace,
            }
        }
        value if simple => Statement::DynamicAttr {
            name,
            value,
            namespace,
        },
        value => Statement::ComponentAttr {
            name,
            value,
            namespace,
        },
    }
}

/// Collects the attributes and arguments of a component invocation.
pub struct ComponentCallBuilder<'s> {
    symbols: &'s mut dyn Symbols,
    attrs: Vec<Statement>,
    args: Hash,
    error: Option<CompileError>,
}

impl<'s> ComponentCallBuilder<'s> {
    fn new(symbols: &'s mut dyn Symbols) -> Self {
        Self {
            symbols,
            attrs: Vec::new(),
            args: Hash::new(),
            error: None,
        }
    }

    fn resolve(&mut self, value: ToExpression) -> Option<Expression> {
        match value.resolve(self.symbols, FreeVarContext::Ambiguous) {
            Ok(expr) => Some(expr),
            Err(error) => {
                if self.error.is_none() {
                    self.error = Some(error);
                }
                None
            }
        }
    }

    /// An attribute, in component encoding.
    pub fn attr(&mut self, name: &str, value: impl Into<ToExpression>) -> &mut Self {
        if let Some(value) = self.resolve(value.into()) {
            self.attrs.push(Statement::ComponentAttr {
                name: name.to_string(),
                value,
                namespace: attr_namespace(name).map(str::to_string),
            });
        }
        self
    }

    /// A named argument; `@` is added when missing.
    pub fn arg(&mut self, name: &str, value: impl Into<ToExpression>) -> &mut Self {
        if let Some(value) = self.resolve(value.into()) {
            let name = if name.starts_with('@') {
                name.to_string()
            } else {
                format!("@{name}")
            };
            self.args.push(name, value);
        }
        self
    }

    /// `...attributes`
    pub fn splat(&mut self) -> &mut Self {
        let slot = self.symbols.block("&attrs");
        self.attrs.push(Statement::AttrSplat(slot));
        self
    }

    /// A modifier invoking a free name.
    pub fn modifier(
        &mut self,
        name: &str,
        params: Vec<ToExpression>,
        hash: Vec<(&str, ToExpression)>,
    ) -> &mut Self {
        match build_modifier(self.symbols, name, params, hash) {
            Ok(statement) => self.attrs.push(statement),
            Err(error) => {
                if self.error.is_none() {
                    self.error = Some(error);
                }
            }
        }
        self
    }

    fn finish(self) -> Result<(Vec<Statement>, Option<Hash>)> {
        match self.error {
            Some(error) => Err(error),
            None => Ok((self.attrs, self.args.into_option())),
        }
    }
}
