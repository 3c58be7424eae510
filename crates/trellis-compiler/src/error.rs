//! Error types for template compilation.

use std::fmt;

use thiserror::Error;

use crate::ast::SourceLocation;

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors raised while compiling a template.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The template uses a construct in an invalid way.
    #[error("{message}{}", At(.location))]
    Syntax {
        /// What went wrong
        message: String,
        /// Where it went wrong
        location: Option<SourceLocation>,
    },

    /// A construct the compiler has no handler for.
    #[error("Unimplemented {0} on TemplateCompiler")]
    Unimplemented(String),

    /// A local variable was requested outside any scope that binds it.
    #[error("No local {0} was found. Lookup reached the top-level, which has no locals")]
    UnresolvedLocal(String),

    /// The same block name was given twice to one invocation.
    #[error("duplicate block `{0}`")]
    DuplicateBlock(String),

    /// The op stream was malformed. Indicates a bug in an earlier pass.
    #[error("internal compiler error: {0}")]
    Internal(String),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompileError {
    /// A syntax error at a source location.
    pub fn syntax(message: impl Into<String>, location: &SourceLocation) -> Self {
        CompileError::Syntax {
            message: message.into(),
            location: Some(location.clone()),
        }
    }

    /// A syntax error with no location.
    pub fn syntax_unlocated(message: impl Into<String>) -> Self {
        CompileError::Syntax {
            message: message.into(),
            location: None,
        }
    }
}

struct At<'a>(&'a Option<SourceLocation>);

impl fmt::Display for At<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(loc) => write!(f, " (line {}, column {})", loc.start.line, loc.start.column),
            None => Ok(()),
        }
    }
}
