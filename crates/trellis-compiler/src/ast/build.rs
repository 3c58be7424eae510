//! Programmatic AST construction.
//!
//! Used by tests and tools that produce templates without going through the
//! parser.
//!
//! ```
//! use trellis_compiler::ast::build as b;
//!
//! let template = b::template(vec![
//!     b::element("div")
//!         .attr("class", b::text_value("greeting"))
//!         .children(vec![b::text("Hello "), b::mustache("name")])
//!         .into(),
//! ]);
//! assert_eq!(template.body.len(), 1);
//! ```

use super::*;

/// A template.
pub fn template(body: Vec<Statement>) -> Template {
    Template {
        body,
        ..Template::default()
    }
}

/// A block body without parameters.
pub fn program(body: Vec<Statement>) -> Block {
    Block {
        body,
        ..Block::default()
    }
}

/// A block body binding `params`.
pub fn program_with_params(params: &[&str], body: Vec<Statement>) -> Block {
    Block {
        body,
        block_params: params.iter().map(|p| p.to_string()).collect(),
        loc: SourceLocation::default(),
    }
}

/// Static text.
pub fn text(chars: &str) -> Statement {
    Statement::Text(TextNode {
        chars: chars.to_string(),
        loc: SourceLocation::default(),
    })
}

/// An HTML comment.
pub fn comment(value: &str) -> Statement {
    Statement::Comment(CommentStatement {
        value: value.to_string(),
        loc: SourceLocation::default(),
    })
}

/// A mustache comment.
pub fn mustache_comment(value: &str) -> Statement {
    Statement::MustacheComment(MustacheCommentStatement {
        value: value.to_string(),
        loc: SourceLocation::default(),
    })
}

/// A path expression.
pub fn path(original: &str) -> Expression {
    Expression::Path(PathExpression::parse(original))
}

/// A string literal.
pub fn string(value: &str) -> Expression {
    Expression::StringLiteral {
        value: value.to_string(),
        loc: SourceLocation::default(),
    }
}

/// A number literal.
pub fn number(value: f64) -> Expression {
    Expression::NumberLiteral {
        value,
        loc: SourceLocation::default(),
    }
}

/// A boolean literal.
pub fn boolean(value: bool) -> Expression {
    Expression::BooleanLiteral {
        value,
        loc: SourceLocation::default(),
    }
}

/// `null`
pub fn null() -> Expression {
    Expression::NullLiteral {
        loc: SourceLocation::default(),
    }
}

/// `undefined`
pub fn undefined() -> Expression {
    Expression::UndefinedLiteral {
        loc: SourceLocation::default(),
    }
}

/// Named arguments from `(key, value)` pairs.
pub fn hash(pairs: Vec<(&str, Expression)>) -> Hash {
    Hash {
        pairs: pairs
            .into_iter()
            .map(|(key, value)| HashPair {
                key: key.to_string(),
                value,
                loc: SourceLocation::default(),
            })
            .collect(),
        loc: SourceLocation::default(),
    }
}

/// `(path params... hash...)`
pub fn sexpr(path: Expression, params: Vec<Expression>, hash: Hash) -> Expression {
    Expression::SubExpression(SubExpression {
        path: Box::new(path),
        params,
        hash,
        loc: SourceLocation::default(),
    })
}

/// A mustache node with arguments.
pub fn mustache_node(path: Expression, params: Vec<Expression>, hash: Hash) -> MustacheStatement {
    MustacheStatement {
        path,
        params,
        hash,
        escaped: true,
        loc: SourceLocation::default(),
    }
}

/// `{{path}}`
pub fn mustache(original: &str) -> Statement {
    Statement::Mustache(mustache_node(path(original), vec![], Hash::default()))
}

/// `{{path params... hash...}}`
pub fn mustache_with(path: Expression, params: Vec<Expression>, hash: Hash) -> Statement {
    Statement::Mustache(mustache_node(path, params, hash))
}

/// `{{{path params... hash...}}}`
pub fn triple(path: Expression, params: Vec<Expression>, hash: Hash) -> Statement {
    Statement::Mustache(MustacheStatement {
        escaped: false,
        ..mustache_node(path, params, hash)
    })
}

/// `{{#path params... hash...}}program{{else}}inverse{{/path}}`
pub fn block(
    path: Expression,
    params: Vec<Expression>,
    hash: Hash,
    program: Block,
    inverse: Option<Block>,
) -> Statement {
    Statement::Block(BlockStatement {
        path,
        params,
        hash,
        program,
        inverse,
        loc: SourceLocation::default(),
    })
}

/// A static attribute value.
pub fn text_value(chars: &str) -> AttrValue {
    AttrValue::Text(TextNode {
        chars: chars.to_string(),
        loc: SourceLocation::default(),
    })
}

/// `name={{path}}`
pub fn mustache_value(original: &str) -> AttrValue {
    AttrValue::Mustache(mustache_node(path(original), vec![], Hash::default()))
}

/// An interpolated attribute value.
pub fn concat(parts: Vec<ConcatPart>) -> AttrValue {
    AttrValue::Concat(ConcatStatement {
        parts,
        loc: SourceLocation::default(),
    })
}

/// Static text inside an interpolated value.
pub fn concat_text(chars: &str) -> ConcatPart {
    ConcatPart::Text(TextNode {
        chars: chars.to_string(),
        loc: SourceLocation::default(),
    })
}

/// A mustache inside an interpolated value.
pub fn concat_mustache(node: MustacheStatement) -> ConcatPart {
    ConcatPart::Mustache(node)
}

/// Starts an element.
pub fn element(tag: &str) -> ElementBuilder {
    ElementBuilder {
        node: ElementNode {
            tag: tag.to_string(),
            ..ElementNode::default()
        },
    }
}

/// Incrementally builds an [`ElementNode`].
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    node: ElementNode,
}

impl ElementBuilder {
    /// Adds an attribute.
    pub fn attr(mut self, name: &str, value: AttrValue) -> Self {
        self.node.attributes.push(AttrNode {
            name: name.to_string(),
            value,
            loc: SourceLocation::default(),
        });
        self
    }

    /// Adds `...attributes`.
    pub fn splat(self) -> Self {
        self.attr("...attributes", text_value(""))
    }

    /// Adds a modifier.
    pub fn modifier(mut self, path: Expression, params: Vec<Expression>, hash: Hash) -> Self {
        self.node.modifiers.push(ElementModifierStatement {
            path,
            params,
            hash,
            loc: SourceLocation::default(),
        });
        self
    }

    /// Sets `as |...|`.
    pub fn block_params(mut self, params: &[&str]) -> Self {
        self.node.block_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Sets the children.
    pub fn children(mut self, children: Vec<Statement>) -> Self {
        self.node.children = children;
        self
    }

    /// Moves the element to a source position.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.node.loc = SourceLocation::at(line, column);
        self
    }

    /// Finishes the node.
    pub fn build(self) -> ElementNode {
        self.node
    }
}

impl From<ElementBuilder> for Statement {
    fn from(builder: ElementBuilder) -> Self {
        Statement::Element(builder.node)
    }
}
