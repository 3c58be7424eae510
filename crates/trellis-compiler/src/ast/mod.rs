//! Template AST definitions.
//!
//! These structures mirror the JSON emitted by the external template parser:
//! every node is an object tagged with a `type` field, field names are
//! camelCase, and every node may carry a `loc`.

pub mod build;

use serde::{Deserialize, Serialize};
use trellis_wire::{Expression as WireExpression, Primitive};

/// A line/column pair. Lines start at 1, columns at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line number
    pub line: u32,
    /// Column number
    pub column: u32,
}

/// The source span of a node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// First character
    pub start: Position,
    /// One past the last character
    pub end: Position,
}

impl SourceLocation {
    /// A zero-width location at a line and column.
    pub fn at(line: u32, column: u32) -> Self {
        let start = Position { line, column };
        Self { start, end: start }
    }
}

/// The root of a parsed template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Top-level statements
    pub body: Vec<Statement>,
    /// Always empty for a template; kept for parity with [`Block`]
    #[serde(default)]
    pub block_params: Vec<String>,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// The body of a block statement: `{{#each xs as |x|}}...{{/each}}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Statements
    pub body: Vec<Statement>,
    /// Names bound by `as |...|`
    #[serde(default)]
    pub block_params: Vec<String>,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// A template statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    /// Static text
    #[serde(rename = "TextNode")]
    Text(TextNode),
    /// `{{...}}` or `{{{...}}}`
    #[serde(rename = "MustacheStatement")]
    Mustache(MustacheStatement),
    /// `{{#...}}...{{/...}}`
    #[serde(rename = "BlockStatement")]
    Block(BlockStatement),
    /// `<tag ...>...</tag>`
    #[serde(rename = "ElementNode")]
    Element(ElementNode),
    /// `<!-- ... -->`
    #[serde(rename = "CommentStatement")]
    Comment(CommentStatement),
    /// `{{! ... }}`, dropped during compilation
    #[serde(rename = "MustacheCommentStatement")]
    MustacheComment(MustacheCommentStatement),
}

impl Statement {
    /// Returns true for text made only of whitespace.
    pub fn is_whitespace(&self) -> bool {
        match self {
            Statement::Text(text) => text.chars.trim().is_empty(),
            Statement::MustacheComment(_) => true,
            _ => false,
        }
    }

    /// Moves the node to a source position.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        let loc = SourceLocation::at(line, column);
        match &mut self {
            Statement::Text(n) => n.loc = loc,
            Statement::Mustache(n) => n.loc = loc,
            Statement::Block(n) => n.loc = loc,
            Statement::Element(n) => n.loc = loc,
            Statement::Comment(n) => n.loc = loc,
            Statement::MustacheComment(n) => n.loc = loc,
        }
        self
    }
}

/// Static text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextNode {
    /// The text
    pub chars: String,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// A mustache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MustacheStatement {
    /// The head: a path or a literal
    pub path: Expression,
    /// Positional arguments
    #[serde(default)]
    pub params: Vec<Expression>,
    /// Named arguments
    #[serde(default)]
    pub hash: Hash,
    /// False for `{{{triple-curlies}}}`
    #[serde(default = "default_escaped")]
    pub escaped: bool,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

fn default_escaped() -> bool {
    true
}

impl MustacheStatement {
    /// True when the mustache passes arguments, making it a helper call.
    pub fn is_invocation(&self) -> bool {
        !self.params.is_empty() || !self.hash.pairs.is_empty()
    }
}

/// A block statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStatement {
    /// The invoked name
    pub path: Expression,
    /// Positional arguments
    #[serde(default)]
    pub params: Vec<Expression>,
    /// Named arguments
    #[serde(default)]
    pub hash: Hash,
    /// The main block
    pub program: Block,
    /// The `{{else}}` block
    #[serde(default)]
    pub inverse: Option<Block>,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// An element or component invocation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    /// Tag name as written
    pub tag: String,
    /// Attributes and arguments, in source order
    #[serde(default)]
    pub attributes: Vec<AttrNode>,
    /// Element modifiers
    #[serde(default)]
    pub modifiers: Vec<ElementModifierStatement>,
    /// Child statements
    #[serde(default)]
    pub children: Vec<Statement>,
    /// Names bound by `as |...|`
    #[serde(default)]
    pub block_params: Vec<String>,
    /// Written as `<tag />`
    #[serde(default)]
    pub self_closing: bool,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// One attribute of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrNode {
    /// Attribute name, e.g. `class`, `@title` or `...attributes`
    pub name: String,
    /// Attribute value
    pub value: AttrValue,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// The value of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AttrValue {
    /// `name="text"`
    #[serde(rename = "TextNode")]
    Text(TextNode),
    /// `name={{expr}}`
    #[serde(rename = "MustacheStatement")]
    Mustache(MustacheStatement),
    /// `name="text {{expr}} text"`
    #[serde(rename = "ConcatStatement")]
    Concat(ConcatStatement),
}

/// An interpolated attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcatStatement {
    /// The pieces
    pub parts: Vec<ConcatPart>,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// A piece of an interpolated attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConcatPart {
    /// Static text
    #[serde(rename = "TextNode")]
    Text(TextNode),
    /// A mustache
    #[serde(rename = "MustacheStatement")]
    Mustache(MustacheStatement),
}

/// `<div {{on "click" this.go}}>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementModifierStatement {
    /// The modifier name
    pub path: Expression,
    /// Positional arguments
    #[serde(default)]
    pub params: Vec<Expression>,
    /// Named arguments
    #[serde(default)]
    pub hash: Hash,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// An HTML comment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommentStatement {
    /// Comment text
    pub value: String,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// A mustache comment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MustacheCommentStatement {
    /// Comment text
    pub value: String,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// An expression in argument or head position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    /// `foo.bar`, `this.foo`, `@foo`
    #[serde(rename = "PathExpression")]
    Path(PathExpression),
    /// `(helper arg)`
    SubExpression(SubExpression),
    /// `"text"`
    StringLiteral {
        /// Value
        value: String,
        /// Source span
        #[serde(default)]
        loc: SourceLocation,
    },
    /// `true` / `false`
    BooleanLiteral {
        /// Value
        value: bool,
        /// Source span
        #[serde(default)]
        loc: SourceLocation,
    },
    /// `123`
    NumberLiteral {
        /// Value
        value: f64,
        /// Source span
        #[serde(default)]
        loc: SourceLocation,
    },
    /// `null`
    NullLiteral {
        /// Source span
        #[serde(default)]
        loc: SourceLocation,
    },
    /// `undefined`
    UndefinedLiteral {
        /// Source span
        #[serde(default)]
        loc: SourceLocation,
    },
}

impl Expression {
    /// The node type name, as used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Expression::Path(_) => "PathExpression",
            Expression::SubExpression(_) => "SubExpression",
            Expression::StringLiteral { .. } => "StringLiteral",
            Expression::BooleanLiteral { .. } => "BooleanLiteral",
            Expression::NumberLiteral { .. } => "NumberLiteral",
            Expression::NullLiteral { .. } => "NullLiteral",
            Expression::UndefinedLiteral { .. } => "UndefinedLiteral",
        }
    }

    /// The literal value, if this is a literal.
    pub fn literal(&self) -> Option<Literal> {
        match self {
            Expression::StringLiteral { value, .. } => Some(Literal::String(value.clone())),
            Expression::BooleanLiteral { value, .. } => Some(Literal::Boolean(*value)),
            Expression::NumberLiteral { value, .. } => Some(Literal::Number(*value)),
            Expression::NullLiteral { .. } => Some(Literal::Null),
            Expression::UndefinedLiteral { .. } => Some(Literal::Undefined),
            _ => None,
        }
    }

    /// The node's source span.
    pub fn loc(&self) -> &SourceLocation {
        match self {
            Expression::Path(p) => &p.loc,
            Expression::SubExpression(s) => &s.loc,
            Expression::StringLiteral { loc, .. }
            | Expression::BooleanLiteral { loc, .. }
            | Expression::NumberLiteral { loc, .. }
            | Expression::NullLiteral { loc }
            | Expression::UndefinedLiteral { loc } => loc,
        }
    }
}

/// A path.
///
/// `this.foo.bar` has `this: true` and parts `["foo", "bar"]`; `@foo.bar` has
/// `data: true` and parts `["foo", "bar"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathExpression {
    /// The path as written
    pub original: String,
    /// Rooted at `this`
    #[serde(default)]
    pub this: bool,
    /// Rooted at a named argument
    #[serde(default)]
    pub data: bool,
    /// Segments, excluding `this`
    pub parts: Vec<String>,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

impl PathExpression {
    /// Parses a dotted path such as `this.foo`, `@bar.baz` or `qux`.
    pub fn parse(original: &str) -> Self {
        let mut this = false;
        let mut data = false;
        let mut parts: Vec<String> = original.split('.').map(str::to_string).collect();
        if parts.first().map(String::as_str) == Some("this") {
            this = true;
            parts.remove(0);
        } else if let Some(head) = parts[0].strip_prefix('@').map(str::to_string) {
            data = true;
            parts[0] = head;
        }
        Self {
            original: original.to_string(),
            this,
            data,
            parts,
            loc: SourceLocation::default(),
        }
    }

    /// True for a single unrooted segment such as `foo`.
    pub fn is_simple(&self) -> bool {
        !self.this && !self.data && self.parts.len() == 1
    }
}

/// `(helper ...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubExpression {
    /// The helper name
    pub path: Box<Expression>,
    /// Positional arguments
    #[serde(default)]
    pub params: Vec<Expression>,
    /// Named arguments
    #[serde(default)]
    pub hash: Hash,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// Named arguments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hash {
    /// The pairs, in source order
    #[serde(default)]
    pub pairs: Vec<HashPair>,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// `key=value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashPair {
    /// Key
    pub key: String,
    /// Value
    pub value: Expression,
    /// Source span
    #[serde(default)]
    pub loc: SourceLocation,
}

/// A literal value carried through compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// String
    String(String),
    /// Number
    Number(f64),
    /// Boolean
    Boolean(bool),
    /// `null`
    Null,
    /// `undefined`
    Undefined,
}

impl Literal {
    /// The wire expression for this value.
    pub fn to_wire(&self) -> WireExpression {
        match self {
            Literal::String(s) => WireExpression::Value(Primitive::String(s.clone())),
            Literal::Number(n) => WireExpression::Value(Primitive::Number(*n)),
            Literal::Boolean(b) => WireExpression::Value(Primitive::Boolean(*b)),
            Literal::Null => WireExpression::Value(Primitive::Null),
            Literal::Undefined => WireExpression::Undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths() {
        let p = PathExpression::parse("this.foo.bar");
        assert!(p.this && !p.data);
        assert_eq!(p.parts, vec!["foo", "bar"]);

        let p = PathExpression::parse("@model.name");
        assert!(p.data && !p.this);
        assert_eq!(p.parts, vec!["model", "name"]);

        let p = PathExpression::parse("this");
        assert!(p.this);
        assert!(p.parts.is_empty());

        assert!(PathExpression::parse("foo").is_simple());
        assert!(!PathExpression::parse("foo.bar").is_simple());
    }

    #[test]
    fn test_deserialize_parser_json() {
        let json = r#"{
            "type": "Template",
            "body": [
                { "type": "TextNode", "chars": "hi " },
                {
                    "type": "MustacheStatement",
                    "path": { "type": "PathExpression", "original": "name", "parts": ["name"] },
                    "params": [],
                    "hash": { "pairs": [] },
                    "escaped": true,
                    "loc": { "start": { "line": 1, "column": 3 }, "end": { "line": 1, "column": 11 } }
                }
            ]
        }"#;
        let template: Template = serde_json::from_str(json).unwrap();
        assert_eq!(template.body.len(), 2);
        match &template.body[1] {
            Statement::Mustache(m) => {
                assert!(m.escaped);
                assert_eq!(m.loc.start.column, 3);
                assert_eq!(m.path.type_name(), "PathExpression");
            }
            other => panic!("expected a mustache, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_nested_sub_expressions() {
        let json = r#"{
            "type": "MustacheStatement",
            "path": { "type": "PathExpression", "original": "concat", "parts": ["concat"] },
            "params": [{
                "type": "SubExpression",
                "path": { "type": "PathExpression", "original": "upper", "parts": ["upper"] },
                "params": [{
                    "type": "SubExpression",
                    "path": { "type": "PathExpression", "original": "trim", "parts": ["trim"] },
                    "params": [{ "type": "PathExpression", "original": "name", "parts": ["name"] }]
                }]
            }],
            "escaped": true
        }"#;
        let statement: Statement = serde_json::from_str(json).unwrap();
        let Statement::Mustache(m) = statement else {
            panic!("expected a mustache");
        };
        let Expression::SubExpression(outer) = &m.params[0] else {
            panic!("expected a sub-expression");
        };
        assert_eq!(outer.path.type_name(), "PathExpression");
        let Expression::SubExpression(inner) = &outer.params[0] else {
            panic!("expected a nested sub-expression");
        };
        assert_eq!(inner.params[0].type_name(), "PathExpression");
        assert_eq!(
            m.params[0],
            build::sexpr(
                build::path("upper"),
                vec![build::sexpr(
                    build::path("trim"),
                    vec![build::path("name")],
                    Hash::default()
                )],
                Hash::default(),
            )
        );
    }
}
