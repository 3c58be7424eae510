// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # trellis-compiler
//!
//! Compiles a parsed template AST into the Trellis wire format.
//!
//! ## Overview
//!
//! The pipeline is:
//! - [`visitor`] flattens the AST into a linear action stream
//! - [`compiler::TemplateCompiler`] turns actions into stack ops
//! - [`compiler::SymbolAllocator`] assigns symbol slots and upvars
//! - [`compiler::WireEncoder`] assembles wire-format statements
//!
//! [`builder`] constructs the same output by hand, and [`debug`] renders any
//! compiled block in a slot-independent form for comparison.
//!
//! ## Quick Start
//!
//! ```
//! use trellis_compiler::ast::build as b;
//! use trellis_compiler::{CompileOptions, compile};
//!
//! let template = b::template(vec![b::element("h1")
//!     .children(vec![b::mustache("title")])
//!     .into()]);
//! let block = compile(&template, &CompileOptions::default()).unwrap();
//! assert_eq!(block.upvars, vec!["title"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod builder;
pub mod compiler;
pub mod debug;
pub mod error;
pub mod precompile;
pub mod symbols;
pub mod visitor;

pub use compiler::{SymbolAllocator, TemplateCompiler, WireEncoder};
pub use debug::WireFormatDebugger;
pub use error::{CompileError, Result};
pub use precompile::{
    CompileOptions, PrecompileOptions, compile, compile_template, default_id, precompile,
};
pub use symbols::{LocalSymbols, ProgramSymbols, Symbols};
