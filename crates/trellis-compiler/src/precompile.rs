//! Whole-template entry points.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use sha1::{Digest, Sha1};
use tracing::{debug, instrument};
use trellis_wire::{SerializedTemplate, SerializedTemplateBlock};

use crate::ast::Template;
use crate::compiler::{ComponentNameFn, SymbolAllocator, TemplateCompiler, WireEncoder};
use crate::error::Result;

/// Options shared by every compilation entry point.
#[derive(Default)]
pub struct CompileOptions {
    /// Applied to every statically named component tag
    pub customize_component_name: Option<Box<ComponentNameFn>>,
}

impl CompileOptions {
    /// Renames static component tags with `f`.
    pub fn with_component_names(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            customize_component_name: Some(Box::new(f)),
        }
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field(
                "customize_component_name",
                &self.customize_component_name.as_ref().map(|_| "Fn"),
            )
            .finish()
    }
}

/// Options for [`precompile`] and [`compile_template`].
#[derive(Debug, Default)]
pub struct PrecompileOptions<M> {
    /// Template id; derived from the output when absent
    pub id: Option<String>,
    /// Host metadata copied into the output
    pub meta: M,
    /// Compilation options
    pub compile: CompileOptions,
}

impl<M> PrecompileOptions<M> {
    /// Options carrying only `meta`.
    pub fn new(meta: M) -> Self {
        Self {
            id: None,
            meta,
            compile: CompileOptions::default(),
        }
    }
}

/// Compiles a template to its wire-format block.
#[instrument(level = "debug", skip_all)]
pub fn compile(template: &Template, options: &CompileOptions) -> Result<SerializedTemplateBlock> {
    let ops = TemplateCompiler::compile(template)?;
    let allocation = SymbolAllocator::new(ops).process()?;
    WireEncoder::new(options.customize_component_name.as_deref()).process(allocation)
}

/// Compiles a template and attaches its id and metadata.
pub fn compile_template<M: Serialize>(
    template: &Template,
    options: PrecompileOptions<M>,
) -> Result<SerializedTemplate<M>> {
    let block = compile(template, &options.compile)?;
    let id = match options.id {
        Some(id) => id,
        None => {
            let meta = serde_json::to_string(&options.meta)?;
            let encoded = serde_json::to_string(&block)?;
            default_id(&format!("{meta}{encoded}"))
        }
    };
    debug!(%id, "compiled template");
    Ok(SerializedTemplate {
        id: Some(id),
        meta: options.meta,
        block,
    })
}

/// Compiles a template into the JSON text of a serialized template whose
/// block is itself a JSON string.
pub fn precompile<M: Serialize>(template: &Template, options: PrecompileOptions<M>) -> Result<String> {
    let lazy = compile_template(template, options)?.into_lazy()?;
    Ok(serde_json::to_string(&lazy)?)
}

/// The first eight characters of the base64 SHA-1 of `content`.
pub fn default_id(content: &str) -> String {
    let digest = Sha1::digest(content.as_bytes());
    let mut id = STANDARD.encode(digest);
    id.truncate(8);
    id
}
