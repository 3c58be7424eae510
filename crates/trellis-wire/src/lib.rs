// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # trellis-wire
//!
//! The wire format produced by the Trellis template compiler.
//!
//! A compiled template is a tree of tagged tuples. Every statement and
//! expression serializes as a JSON array whose first element is a
//! [`SexpOpcode`], followed by the opcode's operands in a fixed order:
//!
//! ```text
//! [7, "div", true]                 open-element
//! [1, [27, [26, 0, 1], []], false] append {{title}}
//! [9]                              close-element
//! ```
//!
//! In Rust the same data is held as ordinary enums with named fields
//! ([`Statement`], [`Expression`]); the flat tuple layout only exists at the
//! serde boundary.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod expression;
mod opcodes;
mod ser;
mod statement;
mod template;

pub use expression::{Expression, FreeVarContext, Hash, Params, Primitive};
pub use opcodes::SexpOpcode;
pub use statement::{Blocks, Statement};
pub use template::{
    SerializedInlineBlock, SerializedTemplate, SerializedTemplateBlock,
    SerializedTemplateWithLazyBlock,
};

use thiserror::Error;

/// Errors raised while interpreting raw wire data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A tuple started with a number that is not a known opcode.
    #[error("unknown wire opcode {0}")]
    UnknownOpcode(u8),

    /// A free-variable context outside the known range.
    #[error("unknown free variable context {0}")]
    UnknownContext(u8),

    /// An opcode valid in general but not in the position it was found.
    #[error("opcode {opcode:?} is not valid as {position}")]
    Misplaced {
        /// The offending opcode
        opcode: SexpOpcode,
        /// What was expected at that position
        position: &'static str,
    },
}

/// Result type for wire operations.
pub type Result<T> = std::result::Result<T, WireError>;
