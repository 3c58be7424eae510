//! Compilation from template AST to the wire format.
//!
//! Three passes, each a plain function of the previous one's output:
//!
//! 1. [`TemplateCompiler`] turns the visitor's [`Action`]s into [`InputOp`]s,
//!    classifying elements and validating built-in syntax.
//! 2. [`SymbolAllocator`] resolves every name to a symbol slot or upvar.
//! 3. [`WireEncoder`] runs the ops on a value stack and assembles
//!    statements.

mod allocate;
mod encoder;
mod ops;


pub use allocate::SymbolAllocator;
pub use encoder::{ComponentNameFn, WireEncoder};
pub use ops::{AllocatedOp, InputOp};

use tracing::{debug, trace};
use trellis_wire::FreeVarContext;

use crate::ast::*;
use crate::error::{CompileError, Result};
use crate::visitor::{Action, Locals, TemplateVisitor};

/// Namespace of `xlink:` attributes.
pub const XLINK: &str = "http://www.w3.org/1999/xlink";
/// Namespace of `xml:` attributes.
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
/// Namespace of `xmlns` and `xmlns:` attributes.
pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";

/// The namespace URI implied by an attribute name's prefix.
pub fn attr_namespace(name: &str) -> Option<&'static str> {
    if name == "xmlns" {
        return Some(XMLNS);
    }
    match name.split_once(':')?.0 {
        "xlink" => Some(XLINK),
        "xml" => Some(XML),
        "xmlns" => Some(XMLNS),
        _ => None,
    }
}

const SPLAT: &str = "...attributes";

/// What an open element turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Element,
    Component { dynamic: bool },
    NamedBlock,
    Block,
}

/// How an element's attributes are encoded.
#[derive(Debug, Clone, Copy)]
struct AttrContext<'a> {
    tag: &'a str,
    component_encoding: bool,
    accepts_args: bool,
}

/// Turns template actions into [`InputOp`]s.
#[derive(Debug, Default)]
pub struct TemplateCompiler {
    /// The ops emitted so far
    pub ops: Vec<InputOp>,
    frames: Vec<Frame>,
}

impl TemplateCompiler {
    /// Creates a compiler with no output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens and compiles a template.
    pub fn compile(template: &Template) -> Result<Vec<InputOp>> {
        let actions = TemplateVisitor::new().visit(template);
        debug!(actions = actions.len(), "flattened template");
        let mut compiler = TemplateCompiler::new();
        compiler.process(&actions)?;
        debug!(ops = compiler.ops.len(), "compiled template actions");
        Ok(compiler.ops)
    }

    /// Compiles an action stream.
    pub fn process(&mut self, actions: &[Action<'_>]) -> Result<()> {
        for action in actions {
            trace!(?action, "template action");
            match action {
                Action::StartProgram(_) => self.opcode(InputOp::StartProgram),
                Action::EndProgram => self.opcode(InputOp::EndProgram),
                Action::StartBlock(block) => {
                    self.frames.push(Frame::Block);
                    self.opcode(InputOp::StartBlock {
                        params: block.block_params.clone(),
                    });
                }
                Action::EndBlock => {
                    self.frames.pop();
                    self.opcode(InputOp::EndBlock);
                }
                Action::Text(text) => self.opcode(InputOp::Text(text.chars.clone())),
                Action::Comment(comment) => self.opcode(InputOp::Comment(comment.value.clone())),
                Action::OpenElement(element, locals) => self.open_element(element, locals)?,
                Action::CloseElement(element) => self.close_element(element)?,
                Action::Mustache(mustache) => self.mustache(mustache)?,
                Action::Block(block) => self.block(block)?,
            }
        }
        Ok(())
    }

    fn opcode(&mut self, op: InputOp) {
        self.ops.push(op);
    }

    // ========================================================================
    // Elements
    // ========================================================================

    fn open_element(&mut self, element: &ElementNode, locals: &Locals) -> Result<()> {
        if let Some(name) = element.tag.strip_prefix(':') {
            return self.open_named_block(element, name);
        }

        let dynamic = is_dynamic_component(&element.tag, locals);
        let component = dynamic || is_component_tag(&element.tag);
        let simple = !element.attributes.iter().any(|a| a.name == SPLAT)
            && element.modifiers.is_empty();

        if component {
            check_named_block_content(element)?;
        } else if !element.block_params.is_empty() {
            return Err(CompileError::syntax(
                format!(
                    "Unexpected block params in <{}>: simple elements cannot have block params",
                    element.tag
                ),
                &element.loc,
            ));
        }

        if dynamic {
            let mut head = PathExpression::parse(&element.tag);
            head.loc = element.loc.clone();
            self.path(&head, FreeVarContext::Expression)?;
            self.opcode(InputOp::OpenDynamicComponent);
        } else if component {
            self.opcode(InputOp::OpenComponent {
                tag: element.tag.clone(),
            });
        } else {
            self.opcode(InputOp::OpenElement {
                tag: element.tag.clone(),
                simple,
            });
        }

        let context = AttrContext {
            tag: &element.tag,
            component_encoding: component || !simple,
            accepts_args: component,
        };
        let mut type_attr = None;
        for attr in &element.attributes {
            if attr.name == "type" {
                type_attr = Some(attr);
                continue;
            }
            self.attribute(attr, context)?;
        }
        if let Some(attr) = type_attr {
            self.attribute(attr, context)?;
        }

        for modifier in &element.modifiers {
            self.modifier(modifier)?;
        }

        self.opcode(InputOp::FlushElement);

        if component {
            self.frames.push(Frame::Component { dynamic });
            self.opcode(InputOp::StartBlock {
                params: element.block_params.clone(),
            });
        } else {
            self.frames.push(Frame::Element);
        }
        Ok(())
    }

    fn open_named_block(&mut self, element: &ElementNode, name: &str) -> Result<()> {
        if !matches!(self.frames.last(), Some(Frame::Component { .. })) {
            return Err(CompileError::syntax(
                format!(
                    "Named blocks can only be used directly inside a component invocation: <{}>",
                    element.tag
                ),
                &element.loc,
            ));
        }
        if !element.attributes.is_empty() || !element.modifiers.is_empty() {
            return Err(CompileError::syntax(
                format!(
                    "Named blocks cannot have attributes or modifiers: <{}>",
                    element.tag
                ),
                &element.loc,
            ));
        }
        self.opcode(InputOp::OpenNamedBlock {
            name: name.to_string(),
        });
        self.opcode(InputOp::StartBlock {
            params: element.block_params.clone(),
        });
        self.frames.push(Frame::NamedBlock);
        Ok(())
    }

    fn close_element(&mut self, element: &ElementNode) -> Result<()> {
        match self.frames.pop() {
            Some(Frame::Element) => self.opcode(InputOp::CloseElement),
            Some(Frame::Component { dynamic }) => {
                self.opcode(InputOp::EndBlock);
                self.opcode(if dynamic {
                    InputOp::CloseDynamicComponent
                } else {
                    InputOp::CloseComponent
                });
            }
            Some(Frame::NamedBlock) => {
                self.opcode(InputOp::EndBlock);
                self.opcode(InputOp::CloseNamedBlock);
            }
            Some(Frame::Block) | None => {
                return Err(CompileError::Internal(format!(
                    "unbalanced close of <{}>",
                    element.tag
                )));
            }
        }
        Ok(())
    }

    fn attribute(&mut self, attr: &AttrNode, context: AttrContext<'_>) -> Result<()> {
        let name = attr.name.as_str();
        if name == SPLAT {
            self.opcode(InputOp::AttrSplat);
            return Ok(());
        }

        let is_arg = name.starts_with('@');
        if is_arg && !context.accepts_args {
            return Err(CompileError::syntax(
                format!(
                    "`{}` is not a valid attribute name. @arguments are only allowed on components, but the tag was <{}>",
                    name, context.tag
                ),
                &attr.loc,
            ));
        }

        let is_static = self.attribute_value(&attr.value)?;
        let namespace = attr_namespace(name).map(str::to_string);
        let trusting = matches!(&attr.value, AttrValue::Mustache(m) if !m.escaped);
        let name = name.to_string();

        let op = if is_arg {
            if is_static {
                InputOp::StaticArg(name)
            } else {
                InputOp::DynamicArg(name)
            }
        } else if is_static && !context.component_encoding {
            InputOp::StaticAttr { name, namespace }
        } else if trusting {
            if context.component_encoding {
                InputOp::TrustingComponentAttr { name, namespace }
            } else {
                InputOp::TrustingAttr { name, namespace }
            }
        } else if context.component_encoding {
            InputOp::ComponentAttr { name, namespace }
        } else {
            InputOp::DynamicAttr { name, namespace }
        };
        self.opcode(op);
        Ok(())
    }

    /// Pushes an attribute's value and reports whether it is static text.
    fn attribute_value(&mut self, value: &AttrValue) -> Result<bool> {
        match value {
            AttrValue::Text(text) => {
                self.opcode(InputOp::Literal(Literal::String(text.chars.clone())));
                Ok(true)
            }
            AttrValue::Mustache(mustache) => {
                self.mustache_attr_value(mustache)?;
                Ok(false)
            }
            AttrValue::Concat(concat) => {
                for part in concat.parts.iter().rev() {
                    match part {
                        ConcatPart::Text(text) => {
                            self.opcode(InputOp::Literal(Literal::String(text.chars.clone())))
                        }
                        ConcatPart::Mustache(mustache) => self.mustache_attr_value(mustache)?,
                    }
                }
                self.opcode(InputOp::PrepareArray(concat.parts.len()));
                self.opcode(InputOp::Concat);
                Ok(false)
            }
        }
    }

    fn mustache_attr_value(&mut self, mustache: &MustacheStatement) -> Result<()> {
        if let Some(name) = builtin_helper(&mustache.path) {
            return self.builtin_helper(name, &mustache.params, &mustache.hash, &mustache.loc);
        }
        if mustache.is_invocation() {
            self.helper_call(&mustache.path, &mustache.params, &mustache.hash, &mustache.loc)
        } else {
            self.path_expression(&mustache.path, FreeVarContext::Ambiguous)
        }
    }

    fn modifier(&mut self, modifier: &ElementModifierStatement) -> Result<()> {
        self.prepare_helper(
            &modifier.path,
            &modifier.params,
            &modifier.hash,
            "modifier",
            &modifier.loc,
        )?;
        self.path_expression(&modifier.path, FreeVarContext::Modifier)?;
        self.opcode(InputOp::Modifier);
        Ok(())
    }

    // ========================================================================
    // Mustaches and blocks
    // ========================================================================

    fn mustache(&mut self, mustache: &MustacheStatement) -> Result<()> {
        if let Some(literal) = mustache.path.literal() {
            self.opcode(InputOp::Literal(literal));
            self.opcode(InputOp::Append {
                trusting: !mustache.escaped,
            });
            return Ok(());
        }

        let path = match &mustache.path {
            Expression::Path(path) => path,
            other => {
                return Err(CompileError::syntax(
                    format!("Expected PathExpression, got {}", other.type_name()),
                    &mustache.loc,
                ));
            }
        };

        if path.is_simple() {
            match path.parts[0].as_str() {
                "yield" => return self.yield_(mustache),
                "partial" => return self.partial(mustache),
                "debugger" => return self.debugger(mustache),
                name @ ("has-block" | "has-block-params") => {
                    self.builtin_helper(name, &mustache.params, &mustache.hash, &mustache.loc)?;
                    self.opcode(InputOp::Append {
                        trusting: !mustache.escaped,
                    });
                    return Ok(());
                }
                _ => {}
            }
        }

        if mustache.is_invocation() {
            self.helper_call(&mustache.path, &mustache.params, &mustache.hash, &mustache.loc)?;
        } else {
            self.path(path, FreeVarContext::Ambiguous)?;
        }
        self.opcode(InputOp::Append {
            trusting: !mustache.escaped,
        });
        Ok(())
    }

    fn block(&mut self, block: &BlockStatement) -> Result<()> {
        self.prepare_helper(&block.path, &block.params, &block.hash, "block", &block.loc)?;
        self.path_expression(&block.path, FreeVarContext::Block)?;
        self.opcode(InputOp::Block {
            has_inverse: block.inverse.is_some(),
        });
        Ok(())
    }

    fn yield_(&mut self, mustache: &MustacheStatement) -> Result<()> {
        let pairs = &mustache.hash.pairs;
        let mut to = "default".to_string();
        if pairs.len() > 1 || pairs.first().is_some_and(|p| p.key != "to") {
            return Err(CompileError::syntax(
                "yield only takes a single named argument: 'to'",
                &mustache.loc,
            ));
        }
        if let Some(pair) = pairs.first() {
            match &pair.value {
                Expression::StringLiteral { value, .. } => to = value.clone(),
                _ => {
                    return Err(CompileError::syntax(
                        "you can only yield to a literal value",
                        &mustache.loc,
                    ));
                }
            }
        }
        self.prepare_params(&mustache.params)?;
        self.opcode(InputOp::Yield { to });
        Ok(())
    }

    fn partial(&mut self, mustache: &MustacheStatement) -> Result<()> {
        if mustache.params.is_empty() {
            return Err(CompileError::syntax(
                "Partial found with no arguments. You must specify a template name.",
                &mustache.loc,
            ));
        }
        if !mustache.hash.pairs.is_empty() {
            return Err(CompileError::syntax(
                "partial does not take any named arguments",
                &mustache.loc,
            ));
        }
        if !mustache.escaped {
            return Err(CompileError::syntax(
                "{{{partial ...}}} is not supported, please use {{partial ...}} instead",
                &mustache.loc,
            ));
        }
        if mustache.params.len() > 1 {
            return Err(CompileError::syntax(
                "partial only takes a single positional argument",
                &mustache.loc,
            ));
        }
        self.prepare_params(&mustache.params)?;
        self.opcode(InputOp::Partial);
        Ok(())
    }

    fn debugger(&mut self, mustache: &MustacheStatement) -> Result<()> {
        if !mustache.hash.pairs.is_empty() {
            return Err(CompileError::syntax(
                "debugger does not take any named arguments",
                &mustache.loc,
            ));
        }
        if !mustache.params.is_empty() {
            return Err(CompileError::syntax(
                "debugger does not take any positional arguments",
                &mustache.loc,
            ));
        }
        self.opcode(InputOp::Debugger);
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn builtin_helper(
        &mut self,
        name: &str,
        params: &[Expression],
        hash: &Hash,
        loc: &SourceLocation,
    ) -> Result<()> {
        if !hash.pairs.is_empty() {
            return Err(CompileError::syntax(
                format!("{name} does not take any named arguments"),
                loc,
            ));
        }
        let block = match params {
            [] => "default".to_string(),
            [Expression::StringLiteral { value, .. }] => value.clone(),
            [_] => {
                return Err(CompileError::syntax(
                    "you can only yield to a literal value",
                    loc,
                ));
            }
            _ => {
                return Err(CompileError::syntax(
                    format!("{name} only takes a single positional argument"),
                    loc,
                ));
            }
        };
        self.opcode(if name == "has-block" {
            InputOp::HasBlock(block)
        } else {
            InputOp::HasBlockParams(block)
        });
        Ok(())
    }

    fn helper_call(
        &mut self,
        path: &Expression,
        params: &[Expression],
        hash: &Hash,
        loc: &SourceLocation,
    ) -> Result<()> {
        self.prepare_helper(path, params, hash, "helper", loc)?;
        self.path_expression(path, FreeVarContext::Helper)?;
        self.opcode(InputOp::Helper);
        Ok(())
    }

    fn expression(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Path(path) => self.path(path, FreeVarContext::Expression),
            Expression::SubExpression(sexpr) => {
                if let Some(name) = builtin_helper(&sexpr.path) {
                    self.builtin_helper(name, &sexpr.params, &sexpr.hash, &sexpr.loc)
                } else {
                    self.helper_call(&sexpr.path, &sexpr.params, &sexpr.hash, &sexpr.loc)
                }
            }
            other => {
                if let Some(literal) = other.literal() {
                    self.opcode(InputOp::Literal(literal));
                }
                Ok(())
            }
        }
    }

    fn path_expression(&mut self, expr: &Expression, context: FreeVarContext) -> Result<()> {
        match expr {
            Expression::Path(path) => self.path(path, context),
            Expression::SubExpression(sexpr) => Err(CompileError::syntax(
                format!("Expected PathExpression, got {}", expr.type_name()),
                &sexpr.loc,
            )),
            other => {
                if let Some(literal) = other.literal() {
                    self.opcode(InputOp::Literal(literal));
                }
                Ok(())
            }
        }
    }

    fn path(&mut self, path: &PathExpression, context: FreeVarContext) -> Result<()> {
        let tail = if path.this {
            self.opcode(InputOp::GetThis);
            path.parts.clone()
        } else {
            let (head, rest) = path.parts.split_first().ok_or_else(|| {
                CompileError::syntax(format!("Empty path `{}`", path.original), &path.loc)
            })?;
            if path.data {
                self.opcode(InputOp::GetArg(head.clone()));
            } else {
                let context = match context {
                    FreeVarContext::Ambiguous => FreeVarContext::for_value(!rest.is_empty()),
                    other => other,
                };
                self.opcode(InputOp::GetVar {
                    name: head.clone(),
                    context,
                });
            }
            rest.to_vec()
        };
        self.opcode(InputOp::GetPath(tail));
        Ok(())
    }

    fn prepare_helper(
        &mut self,
        path: &Expression,
        params: &[Expression],
        hash: &Hash,
        context: &str,
        loc: &SourceLocation,
    ) -> Result<()> {
        match path {
            Expression::Path(p) if p.is_simple() => {}
            Expression::Path(p) => {
                return Err(CompileError::syntax(
                    format!("`{}` is not a valid name for a {}", p.original, context),
                    loc,
                ));
            }
            other => {
                return Err(CompileError::syntax(
                    format!("`{}` is not a valid {}", other.type_name(), context),
                    loc,
                ));
            }
        }
        self.prepare_hash(hash)?;
        self.prepare_params(params)
    }

    fn prepare_params(&mut self, params: &[Expression]) -> Result<()> {
        if params.is_empty() {
            self.opcode(InputOp::Literal(Literal::Null));
            return Ok(());
        }
        for param in params.iter().rev() {
            self.expression(param)?;
        }
        self.opcode(InputOp::PrepareArray(params.len()));
        Ok(())
    }

    fn prepare_hash(&mut self, hash: &Hash) -> Result<()> {
        if hash.pairs.is_empty() {
            self.opcode(InputOp::Literal(Literal::Null));
            return Ok(());
        }
        for pair in hash.pairs.iter().rev() {
            self.expression(&pair.value)?;
            self.opcode(InputOp::Literal(Literal::String(pair.key.clone())));
        }
        self.opcode(InputOp::PrepareObject(hash.pairs.len()));
        Ok(())
    }
}

/// A tag whose head segment is a local, an argument or `this`.
fn is_dynamic_component(tag: &str, locals: &Locals) -> bool {
    let head = tag.split('.').next().unwrap_or(tag);
    locals.contains(head) || tag.starts_with('@') || tag.starts_with("this.")
}

/// A capitalized tag without a path.
fn is_component_tag(tag: &str) -> bool {
    tag.chars().next().is_some_and(char::is_uppercase) && !tag.contains('.')
}

fn builtin_helper(path: &Expression) -> Option<&'static str> {
    match path {
        Expression::Path(p) if p.is_simple() => match p.parts[0].as_str() {
            "has-block" => Some("has-block"),
            "has-block-params" => Some("has-block-params"),
            _ => None,
        },
        _ => None,
    }
}

fn check_named_block_content(element: &ElementNode) -> Result<()> {
    let is_named = |s: &Statement| matches!(s, Statement::Element(e) if e.tag.starts_with(':'));
    let has_named = element.children.iter().any(is_named);
    let has_other = element
        .children
        .iter()
        .any(|s| !is_named(s) && !s.is_whitespace());
    if has_named && has_other {
        return Err(CompileError::syntax(
            format!(
                "Unexpected content inside <{}> component invocation: when using named blocks, the tag cannot contain other content",
                element.tag
            ),
            &element.loc,
        ));
    }
    Ok(())
}
