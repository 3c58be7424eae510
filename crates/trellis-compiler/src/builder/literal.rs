//! A compact, tuple-like way to spell expected output.
//!
//! Each literal statement names its construct the way template source does:
//!
//! | Literal                     | Meaning                                   |
//! |-----------------------------|-------------------------------------------|
//! | `s!("text")`                | static text                               |
//! | `c!("text")`                | HTML comment                              |
//! | `"^name"`                   | append a free variable                    |
//! | `"@name"`, `"&name"`        | append an argument or block symbol        |
//! | `"this"`, `"name"`          | append `this` or a block parameter        |
//! | `element("<div>", ..)`      | plain element                             |
//! | `element("<Foo>", ..)`      | component with a static tag               |
//! | `element("<@foo>", ..)`     | component named by an argument or local   |
//! | `element("<:name>", ..)`    | named block inside a component            |
//! | `block("#^if", ..)`         | block invocation                          |
//!
//! [`build_statements`] turns literals into wire statements, resolving free
//! variables in the same contexts the compiler uses.

use std::sync::LazyLock;

use regex::Regex;
use trellis_wire::{Blocks, Expression, FreeVarContext, Hash, Primitive, SerializedInlineBlock, Statement};

use crate::compiler::attr_namespace;
use crate::error::{CompileError, Result};
use crate::symbols::{LocalSymbols, Symbols};

/// A newline, for use in `s!` literals.
pub const NEWLINE: &str = "\n";

/// The character at a hexadecimal code point, e.g. `unicode("00a0")`.
///
/// Invalid code points map to U+FFFD.
pub fn unicode(code: &str) -> String {
    u32::from_str_radix(code, 16)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
        .to_string()
}

/// A literal statement.
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderStatement {
    /// Static text
    Literal(String),
    /// HTML comment
    Comment(String),
    /// Appended value
    Append {
        /// The value
        value: BuilderExpression,
        /// Unescaped
        trusted: bool,
    },
    /// Element, component or named block
    Element {
        /// `<tag>` head
        head: String,
        /// Attributes, arguments, splats and modifiers, in order
        attrs: Vec<(String, BuilderAttr)>,
        /// `as |...|` names
        params: Vec<String>,
        /// Children
        body: Vec<BuilderStatement>,
    },
    /// Block invocation
    Block {
        /// `#path` head
        head: String,
        /// Positional arguments
        params: Vec<BuilderExpression>,
        /// Named arguments
        hash: Vec<(String, BuilderExpression)>,
        /// Named blocks, usually `default` and `else`
        blocks: Vec<(String, BuilderBlock)>,
    },
    /// `{{yield}}`
    Yield {
        /// Block name
        to: String,
        /// Block arguments
        params: Vec<BuilderExpression>,
    },
}

impl From<&str> for BuilderStatement {
    fn from(path: &str) -> Self {
        BuilderStatement::Append {
            value: BuilderExpression::Path(path.to_string()),
            trusted: false,
        }
    }
}

/// The body of a literal block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuilderBlock {
    /// Block parameter names
    pub params: Vec<String>,
    /// Statements
    pub statements: Vec<BuilderStatement>,
}

/// A literal expression.
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderExpression {
    /// A JSON value
    Literal(Primitive),
    /// `undefined`
    Undefined,
    /// A path such as `^name.x`, `@arg`, `this.x` or `local.x`
    Path(String),
    /// A call
    Call {
        /// Callee path
        callee: Box<BuilderExpression>,
        /// Positional arguments
        params: Vec<BuilderExpression>,
        /// Named arguments
        hash: Vec<(String, BuilderExpression)>,
    },
    /// Concatenation
    Concat(Vec<BuilderExpression>),
    /// `has-block` on a named block
    HasBlock(String),
    /// `has-block-params` on a named block
    HasBlockParams(String),
}

impl From<&str> for BuilderExpression {
    fn from(path: &str) -> Self {
        BuilderExpression::Path(path.to_string())
    }
}

impl From<f64> for BuilderExpression {
    fn from(value: f64) -> Self {
        BuilderExpression::Literal(Primitive::Number(value))
    }
}

impl From<bool> for BuilderExpression {
    fn from(value: bool) -> Self {
        BuilderExpression::Literal(Primitive::Boolean(value))
    }
}

/// A literal attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderAttr {
    /// `...attributes`; the key is ignored
    Splat,
    /// An escaped value
    Value(BuilderExpression),
    /// An unescaped value
    Trusted(BuilderExpression),
    /// `true` renders an empty static attribute; `false` renders nothing
    Boolean(bool),
    /// A modifier; the key is its path
    Modifier {
        /// Positional arguments
        params: Vec<BuilderExpression>,
        /// Named arguments
        hash: Vec<(String, BuilderExpression)>,
    },
}

/// A string literal expression.
pub fn lit(value: &str) -> BuilderExpression {
    BuilderExpression::Literal(Primitive::String(value.to_string()))
}

/// A static string attribute.
pub fn text_attr(value: &str) -> BuilderAttr {
    BuilderAttr::Value(lit(value))
}

/// A path attribute value.
pub fn attr(path: impl Into<BuilderExpression>) -> BuilderAttr {
    BuilderAttr::Value(path.into())
}

/// `(callee params... hash...)`
pub fn call(
    callee: &str,
    params: Vec<BuilderExpression>,
    hash: Vec<(&str, BuilderExpression)>,
) -> BuilderExpression {
    BuilderExpression::Call {
        callee: Box::new(BuilderExpression::Path(callee.to_string())),
        params,
        hash: pairs(hash),
    }
}

/// Concatenated parts.
pub fn concat(parts: Vec<BuilderExpression>) -> BuilderExpression {
    BuilderExpression::Concat(parts)
}

/// Appends an escaped value.
pub fn append(value: impl Into<BuilderExpression>) -> BuilderStatement {
    BuilderStatement::Append {
        value: value.into(),
        trusted: false,
    }
}

/// Appends an unescaped value.
pub fn trusted(value: impl Into<BuilderExpression>) -> BuilderStatement {
    BuilderStatement::Append {
        value: value.into(),
        trusted: true,
    }
}

/// An element-like statement.
pub fn element(
    head: &str,
    attrs: Vec<(&str, BuilderAttr)>,
    body: Vec<BuilderStatement>,
) -> BuilderStatement {
    BuilderStatement::Element {
        head: head.to_string(),
        attrs: pairs(attrs),
        params: Vec::new(),
        body,
    }
}

/// An element-like statement binding block parameters.
pub fn element_as(
    head: &str,
    attrs: Vec<(&str, BuilderAttr)>,
    params: &[&str],
    body: Vec<BuilderStatement>,
) -> BuilderStatement {
    BuilderStatement::Element {
        head: head.to_string(),
        attrs: pairs(attrs),
        params: params.iter().map(|p| p.to_string()).collect(),
        body,
    }
}

/// A block invocation.
pub fn block(
    head: &str,
    params: Vec<BuilderExpression>,
    hash: Vec<(&str, BuilderExpression)>,
    blocks: Vec<(&str, BuilderBlock)>,
) -> BuilderStatement {
    BuilderStatement::Block {
        head: head.to_string(),
        params,
        hash: pairs(hash),
        blocks: pairs(blocks),
    }
}

/// A block body without parameters.
pub fn body(statements: Vec<BuilderStatement>) -> BuilderBlock {
    BuilderBlock {
        params: Vec::new(),
        statements,
    }
}

/// A block body binding `params`.
pub fn body_as(params: &[&str], statements: Vec<BuilderStatement>) -> BuilderBlock {
    BuilderBlock {
        params: params.iter().map(|p| p.to_string()).collect(),
        statements,
    }
}

fn pairs<T>(list: Vec<(&str, T)>) -> Vec<(String, T)> {
    list.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

// ============================================================================
// Head classification
// ============================================================================

static ELEMENT: LazyLock<Regex> = LazyLock::new(|| re(r"^<([a-z][a-zA-Z0-9\-]*)>$"));
static COMPONENT: LazyLock<Regex> = LazyLock::new(|| re(r"^<([A-Z][a-zA-Z0-9\-]*)>$"));
static DYNAMIC: LazyLock<Regex> =
    LazyLock::new(|| re(r"^<(@[a-zA-Z0-9\-_]+(?:\.[a-zA-Z0-9\-_]+)*|[a-zA-Z][a-zA-Z0-9\-_]*(?:\.[a-zA-Z0-9\-_]+)+)>$"));
static NAMED_BLOCK: LazyLock<Regex> = LazyLock::new(|| re(r"^<:([a-zA-Z0-9\-_]+)>$"));
static BLOCK: LazyLock<Regex> = LazyLock::new(|| re(r"^#([\^@&]?[a-zA-Z0-9\-_.]+)$"));

fn re(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(error) => unreachable!("invalid literal head pattern {pattern}: {error}"),
    }
}

#[derive(Debug)]
enum Head<'a> {
    Element(&'a str),
    Component(&'a str),
    Dynamic(&'a str),
    NamedBlock(&'a str),
}

fn capture<'h>(regex: &Regex, head: &'h str) -> Option<&'h str> {
    regex
        .captures(head)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn classify<'h>(head: &'h str, symbols: &dyn Symbols) -> Result<Head<'h>> {
    if let Some(name) = capture(&NAMED_BLOCK, head) {
        return Ok(Head::NamedBlock(name));
    }
    if let Some(tag) = capture(&ELEMENT, head) {
        return Ok(if symbols.has_local(tag) {
            Head::Dynamic(tag)
        } else {
            Head::Element(tag)
        });
    }
    if let Some(tag) = capture(&COMPONENT, head) {
        return Ok(if symbols.has_local(tag) {
            Head::Dynamic(tag)
        } else {
            Head::Component(tag)
        });
    }
    if let Some(path) = capture(&DYNAMIC, head) {
        return Ok(Head::Dynamic(path));
    }
    Err(CompileError::Unimplemented(format!("literal head `{head}`")))
}

// ============================================================================
// Building
// ============================================================================

/// Builds a list of literal statements.
pub fn build_statements(
    statements: &[BuilderStatement],
    symbols: &mut dyn Symbols,
) -> Result<Vec<Statement>> {
    let mut out = Vec::with_capacity(statements.len());
    for statement in statements {
        out.extend(build_statement(statement, symbols)?);
    }
    Ok(out)
}

/// Builds one literal statement; elements expand to several statements.
pub fn build_statement(
    statement: &BuilderStatement,
    symbols: &mut dyn Symbols,
) -> Result<Vec<Statement>> {
    Ok(match statement {
        BuilderStatement::Literal(text) => vec![Statement::Text(text.clone())],
        BuilderStatement::Comment(text) => vec![Statement::Comment(text.clone())],
        BuilderStatement::Append { value, trusted } => vec![Statement::Append {
            value: build_expression(value, symbols, FreeVarContext::Ambiguous)?,
            trusting: *trusted,
        }],
        BuilderStatement::Element {
            head,
            attrs,
            params,
            body,
        } => match classify(head, symbols)? {
            Head::Element(tag) => build_element(tag, attrs, params, body, symbols)?,
            Head::Component(tag) => vec![build_component(
                ComponentHead::Static(tag),
                attrs,
                params,
                body,
                symbols,
            )?],
            Head::Dynamic(path) => vec![build_component(
                ComponentHead::Dynamic(path),
                attrs,
                params,
                body,
                symbols,
            )?],
            Head::NamedBlock(name) => {
                return Err(CompileError::syntax_unlocated(format!(
                    "Named blocks can only be used directly inside a component invocation: <:{name}>"
                )));
            }
        },
        BuilderStatement::Block {
            head,
            params,
            hash,
            blocks,
        } => {
            let path = capture(&BLOCK, head)
                .ok_or_else(|| CompileError::Unimplemented(format!("literal head `{head}`")))?;
            let mut built = Blocks::new();
            for (name, block) in blocks {
                if built.get(name).is_some() {
                    return Err(CompileError::DuplicateBlock(name.clone()));
                }
                built.push(name.as_str(), build_block(block, symbols)?);
            }
            let params = build_params(params, symbols)?;
            let hash = build_hash(hash, symbols)?;
            vec![Statement::Block {
                head: build_path(path, symbols, FreeVarContext::Block)?,
                params,
                hash,
                blocks: built.into_option(),
            }]
        }
        BuilderStatement::Yield { to, params } => vec![Statement::Yield {
            to: symbols.block(&format!("&{to}")),
            params: build_params(params, symbols)?,
        }],
    })
}

fn build_block(block: &BuilderBlock, symbols: &mut dyn Symbols) -> Result<SerializedInlineBlock> {
    let mut local = LocalSymbols::new(symbols, block.params.as_slice());
    let statements = build_statements(&block.statements, &mut local)?;
    Ok(SerializedInlineBlock {
        statements,
        parameters: local.param_symbols(),
    })
}

fn build_element(
    tag: &str,
    attrs: &[(String, BuilderAttr)],
    params: &[String],
    body: &[BuilderStatement],
    symbols: &mut dyn Symbols,
) -> Result<Vec<Statement>> {
    if !params.is_empty() {
        return Err(CompileError::syntax_unlocated(format!(
            "Unexpected block params in <{tag}>: simple elements cannot have block params"
        )));
    }
    let simple = !attrs
        .iter()
        .any(|(_, a)| matches!(a, BuilderAttr::Splat | BuilderAttr::Modifier { .. }));

    let mut out = vec![Statement::OpenElement {
        tag: tag.to_string(),
        simple,
    }];
    let parts = build_attrs(tag, attrs, !simple, false, symbols)?;
    out.extend(parts.attrs);
    out.push(Statement::FlushElement);
    out.extend(build_statements(body, symbols)?);
    out.push(Statement::CloseElement);
    Ok(out)
}

enum ComponentHead<'a> {
    Static(&'a str),
    Dynamic(&'a str),
}

fn build_component(
    head: ComponentHead<'_>,
    attrs: &[(String, BuilderAttr)],
    params: &[String],
    body: &[BuilderStatement],
    symbols: &mut dyn Symbols,
) -> Result<Statement> {
    let head = match head {
        ComponentHead::Static(tag) => Ok(tag.to_string()),
        ComponentHead::Dynamic(path) => Err(build_path(path, symbols, FreeVarContext::Expression)?),
    };
    let tag = match &head {
        Ok(tag) => tag.as_str(),
        Err(_) => "dynamic component",
    };
    let parts = build_attrs(tag, attrs, true, true, symbols)?;

    let is_named = |s: &BuilderStatement| {
        matches!(s, BuilderStatement::Element { head, .. } if NAMED_BLOCK.is_match(head))
    };
    let mut blocks = Blocks::new();
    let mut local = LocalSymbols::new(symbols, params);
    if body.iter().any(is_named) {
        for statement in body {
            match statement {
                BuilderStatement::Element {
                    head,
                    attrs,
                    params,
                    body,
                } if NAMED_BLOCK.is_match(head) => {
                    if !attrs.is_empty() {
                        return Err(CompileError::syntax_unlocated(format!(
                            "Named blocks cannot have attributes or modifiers: {head}"
                        )));
                    }
                    let name = head.trim_start_matches("<:").trim_end_matches('>');
                    if blocks.get(name).is_some() {
                        return Err(CompileError::DuplicateBlock(name.to_string()));
                    }
                    let block = BuilderBlock {
                        params: params.clone(),
                        statements: body.clone(),
                    };
                    blocks.push(name, build_block(&block, &mut local)?);
                }
                BuilderStatement::Literal(text) if text.trim().is_empty() => {}
                _ => {
                    return Err(CompileError::syntax_unlocated(format!(
                        "Unexpected content inside <{tag}> component invocation: when using named blocks, the tag cannot contain other content"
                    )));
                }
            }
        }
    } else {
        let statements = build_statements(body, &mut local)?;
        let parameters = local.param_symbols();
        if !statements.is_empty() || !parameters.is_empty() {
            blocks.push(
                "default",
                SerializedInlineBlock {
                    statements,
                    parameters,
                },
            );
        }
    }

    let blocks = blocks.into_option();
    let args = parts.args.into_option();
    Ok(match head {
        Ok(tag) => Statement::Component {
            tag,
            attrs: parts.attrs,
            args,
            blocks,
        },
        Err(head) => Statement::DynamicComponent {
            head,
            attrs: parts.attrs,
            args,
            blocks,
        },
    })
}

struct AttrParts {
    attrs: Vec<Statement>,
    args: Hash,
}

fn build_attrs(
    tag: &str,
    attrs: &[(String, BuilderAttr)],
    component_encoding: bool,
    accepts_args: bool,
    symbols: &mut dyn Symbols,
) -> Result<AttrParts> {
    let mut out = Vec::with_capacity(attrs.len());
    let mut args = Hash::new();
    let mut type_attr = None;
    let mut modifiers = Vec::new();

    for (name, value) in attrs {
        let namespace = attr_namespace(name).map(str::to_string);
        let statement = match value {
            BuilderAttr::Splat => Statement::AttrSplat(symbols.block("&attrs")),
            BuilderAttr::Modifier { params, hash } => {
                modifiers.push(Statement::Modifier {
                    head: build_path(name, symbols, FreeVarContext::Modifier)?,
                    params: build_params(params, symbols)?,
                    hash: build_hash(hash, symbols)?,
                });
                continue;
            }
            _ if name.starts_with('@') => {
                if !accepts_args {
                    return Err(CompileError::syntax_unlocated(format!(
                        "`{name}` is not a valid attribute name. @arguments are only allowed on components, but the tag was <{tag}>"
                    )));
                }
                let value = match value {
                    BuilderAttr::Value(v) | BuilderAttr::Trusted(v) => {
                        build_expression(v, symbols, FreeVarContext::Ambiguous)?
                    }
                    BuilderAttr::Boolean(_) => Expression::string(""),
                    BuilderAttr::Splat | BuilderAttr::Modifier { .. } => continue,
                };
                args.push(name.as_str(), value);
                continue;
            }
            BuilderAttr::Boolean(false) => continue,
            BuilderAttr::Boolean(true) => attribute(
                name,
                Expression::string(""),
                namespace,
                false,
                component_encoding,
            ),
            BuilderAttr::Value(v) => attribute(
                name,
                build_expression(v, symbols, FreeVarContext::Ambiguous)?,
                namespace,
                false,
                component_encoding,
            ),
            BuilderAttr::Trusted(v) => attribute(
                name,
                build_expression(v, symbols, FreeVarContext::Ambiguous)?,
                namespace,
                true,
                component_encoding,
            ),
        };
        if name == "type" {
            type_attr = Some(statement);
        } else {
            out.push(statement);
        }
    }
    out.extend(type_attr);
    out.extend(modifiers);
    Ok(AttrParts { attrs: out, args })
}

fn attribute(
    name: &str,
    value: Expression,
    namespace: Option<String>,
    trusting: bool,
    component_encoding: bool,
) -> Statement {
    let name = name.to_string();
    match value {
        Expression::Value(Primitive::String(value)) if !component_encoding && !trusting => {
            Statement::StaticAttr {
                name,
                value,
                namespace,
            }
        }
        value => match (trusting, component_encoding) {
            (true, true) => Statement::TrustingComponentAttr {
                name,
                value,
                namespace,
            },
            (true, false) => Statement::TrustingDynamicAttr {
                name,
                value,
                namespace,
            },
            (false, true) => Statement::ComponentAttr {
                name,
                value,
                namespace,
            },
            (false, false) => Statement::DynamicAttr {
                name,
                value,
                namespace,
            },
        },
    }
}

fn build_params(params: &[BuilderExpression], symbols: &mut dyn Symbols) -> Result<Vec<Expression>> {
    params
        .iter()
        .map(|p| build_expression(p, symbols, FreeVarContext::Expression))
        .collect()
}

fn build_hash(
    hash: &[(String, BuilderExpression)],
    symbols: &mut dyn Symbols,
) -> Result<Option<Hash>> {
    let mut out = Hash::new();
    for (key, value) in hash {
        out.push(key.as_str(), build_expression(value, symbols, FreeVarContext::Expression)?);
    }
    Ok(out.into_option())
}

/// Builds an expression; free variables take `context`.
pub fn build_expression(
    expr: &BuilderExpression,
    symbols: &mut dyn Symbols,
    context: FreeVarContext,
) -> Result<Expression> {
    Ok(match expr {
        BuilderExpression::Literal(value) => Expression::Value(value.clone()),
        BuilderExpression::Undefined => Expression::Undefined,
        BuilderExpression::Path(path) => build_path(path, symbols, context)?,
        BuilderExpression::Call {
            callee,
            params,
            hash,
        } => Expression::Call {
            callee: Box::new(build_expression(callee, symbols, FreeVarContext::Helper)?),
            params: build_params(params, symbols)?,
            hash: build_hash(hash, symbols)?,
        },
        BuilderExpression::Concat(parts) => Expression::Concat(
            parts
                .iter()
                .map(|p| build_expression(p, symbols, FreeVarContext::Ambiguous))
                .collect::<Result<_>>()?,
        ),
        BuilderExpression::HasBlock(name) => Expression::HasBlock(Box::new(Expression::GetSymbol(
            symbols.block(&format!("&{name}")),
        ))),
        BuilderExpression::HasBlockParams(name) => Expression::HasBlockParams(Box::new(
            Expression::GetSymbol(symbols.block(&format!("&{name}"))),
        )),
    })
}

/// Builds a path: `^free`, `@arg`, `&block`, `this` or a block parameter,
/// followed by `.`-separated keys.
pub fn build_path(
    path: &str,
    symbols: &mut dyn Symbols,
    context: FreeVarContext,
) -> Result<Expression> {
    let mut parts = path.split('.');
    let head = parts.next().unwrap_or_default();
    let tail: Vec<String> = parts.map(str::to_string).collect();

    let head = if let Some(name) = head.strip_prefix('^') {
        let context = match context {
            FreeVarContext::Ambiguous => FreeVarContext::for_value(!tail.is_empty()),
            other => other,
        };
        Expression::GetContextualFree {
            upvar: symbols.free_var(name),
            context,
        }
    } else if head.starts_with('@') {
        Expression::GetSymbol(symbols.arg(head))
    } else if head.starts_with('&') {
        Expression::GetSymbol(symbols.block(head))
    } else if head == "this" {
        Expression::GetSymbol(0)
    } else {
        Expression::GetSymbol(symbols.local(head)?)
    };
    Ok(head.path(tail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::ProgramSymbols;

    #[test]
    fn test_unicode() {
        assert_eq!(unicode("00a0"), "\u{a0}");
        assert_eq!(unicode("zz"), "\u{fffd}");
    }

    #[test]
    fn test_paths_resolve_by_sigil() {
        let mut symbols = ProgramSymbols::new();
        let free = build_path("^model.foo", &mut symbols, FreeVarContext::Ambiguous).unwrap();
        assert_eq!(
            free,
            Expression::GetContextualFree {
                upvar: 0,
                context: FreeVarContext::Expression
            }
            .path(vec!["foo".into()])
        );
        let arg = build_path("@title", &mut symbols, FreeVarContext::Ambiguous).unwrap();
        assert_eq!(arg, Expression::GetSymbol(1).path(vec![]));
        assert!(build_path("item", &mut symbols, FreeVarContext::Ambiguous).is_err());
    }

    #[test]
    fn test_heads_classify() {
        let symbols = ProgramSymbols::new();
        assert!(matches!(classify("<div>", &symbols), Ok(Head::Element("div"))));
        assert!(matches!(
            classify("<linearGradient>", &symbols),
            Ok(Head::Element("linearGradient"))
        ));
        assert!(matches!(classify("<Foo>", &symbols), Ok(Head::Component("Foo"))));
        assert!(matches!(classify("<@foo>", &symbols), Ok(Head::Dynamic("@foo"))));
        assert!(matches!(
            classify("<this.view>", &symbols),
            Ok(Head::Dynamic("this.view"))
        ));
        assert!(matches!(classify("<:header>", &symbols), Ok(Head::NamedBlock("header"))));
        assert!(matches!(
            classify("div", &symbols),
            Err(CompileError::Unimplemented(_))
        ));
    }

    #[test]
    fn test_element_with_splat_is_not_simple() {
        let mut symbols = ProgramSymbols::new();
        let out = build_statement(
            &element(
                "<div>",
                vec![("class", text_attr("x")), ("...attributes", BuilderAttr::Splat)],
                vec![],
            ),
            &mut symbols,
        )
        .unwrap();
        assert_eq!(
            out,
            vec![
                Statement::OpenElement {
                    tag: "div".into(),
                    simple: false
                },
                Statement::ComponentAttr {
                    name: "class".into(),
                    value: Expression::string("x"),
                    namespace: None
                },
                Statement::AttrSplat(1),
                Statement::FlushElement,
                Statement::CloseElement,
            ]
        );
    }

    #[test]
    fn test_duplicate_named_blocks() {
        let mut symbols = ProgramSymbols::new();
        let statement = element(
            "<Foo>",
            vec![],
            vec![element("<:a>", vec![], vec![]), element("<:a>", vec![], vec![])],
        );
        assert!(matches!(
            build_statement(&statement, &mut symbols),
            Err(CompileError::DuplicateBlock(name)) if name == "a"
        ));
    }
}
