// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # trellis-opcode
//!
//! Lowers compiled Trellis templates into instructions for the rendering VM.
//!
//! Free names are resolved at lowering time through a [`Resolver`]: helper
//! calls, modifiers, block invocations and components all need a handle,
//! and an unknown name is an error rather than a runtime lookup.
//!
//! ```
//! use trellis_opcode::{OpCode, StaticResolver, lower};
//! use trellis_wire::{SerializedTemplateBlock, Statement};
//!
//! let block = SerializedTemplateBlock {
//!     statements: vec![Statement::Text("hi".into())],
//!     ..Default::default()
//! };
//! let program = lower(&block, &StaticResolver::new()).unwrap();
//! assert_eq!(program.instructions[0].opcode, OpCode::Text);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bytecode;
pub mod error;
pub mod lower;
pub mod resolver;

pub use bytecode::{CompiledBlock, Constant, Instruction, OpCode, Operand, Program};
pub use error::{LowerError, Result};
pub use lower::{Lowering, lower};
pub use resolver::{Resolver, StaticResolver};
