//! Wire-format expressions.

use crate::WireError;

/// A JSON-representable literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// String literal
    String(String),
    /// Number literal
    Number(f64),
    /// Boolean literal
    Boolean(bool),
    /// `null`
    Null,
}

impl Primitive {
    /// Returns the string content of a string primitive.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::String(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::String(value)
    }
}

/// The syntactic position a free variable was referenced from.
///
/// Lowering uses the context to decide whether a name is looked up as a
/// helper, a modifier, a block invocation or a plain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FreeVarContext {
    /// A value lookup: positional or named params, or any path with a tail
    Expression = 0,
    /// A lone identifier in append or attribute-value position
    Ambiguous = 1,
    /// The callee of a call
    Helper = 2,
    /// The head of an element modifier
    Modifier = 3,
    /// The head of a block invocation
    Block = 4,
}

impl FreeVarContext {
    /// The context to use for a value position, which narrows to
    /// [`FreeVarContext::Expression`] once the path has a tail.
    pub fn for_value(has_tail: bool) -> Self {
        if has_tail {
            FreeVarContext::Expression
        } else {
            FreeVarContext::Ambiguous
        }
    }

    /// A short lowercase name for diagnostics and debug output.
    pub fn name(self) -> &'static str {
        match self {
            FreeVarContext::Expression => "expression",
            FreeVarContext::Ambiguous => "ambiguous",
            FreeVarContext::Helper => "helper",
            FreeVarContext::Modifier => "modifier",
            FreeVarContext::Block => "block",
        }
    }
}

impl TryFrom<u8> for FreeVarContext {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => FreeVarContext::Expression,
            1 => FreeVarContext::Ambiguous,
            2 => FreeVarContext::Helper,
            3 => FreeVarContext::Modifier,
            4 => FreeVarContext::Block,
            other => return Err(WireError::UnknownContext(other)),
        })
    }
}

/// Positional parameters.
pub type Params = Vec<Expression>;

/// Named parameters, serialized as `[keys, values]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hash {
    /// Parameter names, in source order
    pub keys: Vec<String>,
    /// Parameter values, parallel to `keys`
    pub values: Vec<Expression>,
}

impl Hash {
    /// Creates an empty hash.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair.
    pub fn push(&mut self, key: impl Into<String>, value: Expression) {
        self.keys.push(key.into());
        self.values.push(value);
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the hash has no pairs.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates the pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expression)> {
        self.keys.iter().map(String::as_str).zip(self.values.iter())
    }

    /// Converts an empty hash to `None`.
    pub fn into_option(self) -> Option<Hash> {
        if self.is_empty() { None } else { Some(self) }
    }
}

impl<K: Into<String>> FromIterator<(K, Expression)> for Hash {
    fn from_iter<T: IntoIterator<Item = (K, Expression)>>(iter: T) -> Self {
        let mut hash = Hash::new();
        for (key, value) in iter {
            hash.push(key, value);
        }
        hash
    }
}

/// A wire-format expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal value
    Value(Primitive),
    /// The undefined value
    Undefined,
    /// Read the symbol at a slot of the template's symbol table
    GetSymbol(u32),
    /// Read an upvar with no context (decoded but never produced)
    GetFree(u32),
    /// Read an upvar referenced from a known syntactic position
    GetContextualFree {
        /// Index into the template's upvars
        upvar: u32,
        /// Where the reference appeared
        context: FreeVarContext,
    },
    /// A head expression followed by static property keys
    GetPath {
        /// The head
        head: Box<Expression>,
        /// Property keys, possibly empty
        tail: Vec<String>,
    },
    /// Concatenate the string values of the parts
    Concat(Vec<Expression>),
    /// Invoke a callee with arguments
    Call {
        /// The callee
        callee: Box<Expression>,
        /// Positional arguments
        params: Params,
        /// Named arguments
        hash: Option<Hash>,
    },
    /// Whether a block was passed
    HasBlock(Box<Expression>),
    /// Whether a block was passed and declares parameters
    HasBlockParams(Box<Expression>),
}

impl Expression {
    /// Shorthand for a string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Expression::Value(Primitive::String(value.into()))
    }

    /// Shorthand for `null`.
    pub fn null() -> Self {
        Expression::Value(Primitive::Null)
    }

    /// Wraps `self` in a path lookup.
    pub fn path(self, tail: Vec<String>) -> Self {
        Expression::GetPath {
            head: Box::new(self),
            tail,
        }
    }

    /// The upvar index of a bare free-variable reference, looking through
    /// an empty path.
    pub fn free_variable(&self) -> Option<(u32, Option<FreeVarContext>)> {
        match self {
            Expression::GetFree(upvar) => Some((*upvar, None)),
            Expression::GetContextualFree { upvar, context } => Some((*upvar, Some(*context))),
            Expression::GetPath { head, tail } if tail.is_empty() => head.free_variable(),
            _ => None,
        }
    }

    /// The string content of a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expression::Value(p) => p.as_str(),
            _ => None,
        }
    }
}

impl From<Primitive> for Expression {
    fn from(value: Primitive) -> Self {
        Expression::Value(value)
    }
}
