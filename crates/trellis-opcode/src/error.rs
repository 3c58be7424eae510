//! Error types for lowering.

use thiserror::Error;

/// Result type for lowering.
pub type Result<T> = std::result::Result<T, LowerError>;

/// Errors raised while lowering a wire-format template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LowerError {
    /// A call named a helper the resolver does not know.
    #[error("Unresolved helper `{0}`")]
    UnresolvedHelper(String),

    /// A modifier name the resolver does not know.
    #[error("Unresolved modifier `{0}`")]
    UnresolvedModifier(String),

    /// A component or block name the resolver does not know.
    #[error("Unresolved component `{0}`")]
    UnresolvedComponent(String),

    /// The wire format is well-formed but not valid in this position.
    #[error("SYNTAX ERROR: {0}")]
    Syntax(String),

    /// A wire form with no lowering.
    #[error("Unimplemented {0} on the opcode compiler")]
    Unimplemented(String),

    /// A symbol slot or upvar index outside the template's tables.
    #[error("{kind} {index} is out of range")]
    InvalidSymbol {
        /// `symbol` or `upvar`
        kind: &'static str,
        /// The offending index
        index: u32,
    },
}
