//! Serialized blocks and templates.

use serde::{Deserialize, Serialize};

use crate::statement::Statement;

/// A nested block: the body of `{{#if}}`, `{{else}}` or a component.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SerializedInlineBlock {
    /// Body statements
    pub statements: Vec<Statement>,
    /// Symbol slots bound to the block's parameters
    pub parameters: Vec<u32>,
}

/// The top-level block of a compiled template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedTemplateBlock {
    /// Body statements
    pub statements: Vec<Statement>,
    /// Symbol table, excluding the reserved `this` slot; slot `n` is
    /// `symbols[n - 1]`
    pub symbols: Vec<String>,
    /// True when a partial or debugger needs every symbol kept alive
    pub has_eval: bool,
    /// Free variable names, indexed by upvar number
    pub upvars: Vec<String>,
}

impl SerializedTemplateBlock {
    /// The name bound to a symbol slot, with slot 0 being `this`.
    pub fn symbol_name(&self, slot: u32) -> Option<&str> {
        match slot {
            0 => Some("this"),
            n => self.symbols.get(n as usize - 1).map(String::as_str),
        }
    }

    /// The name of an upvar.
    pub fn upvar_name(&self, upvar: u32) -> Option<&str> {
        self.upvars.get(upvar as usize).map(String::as_str)
    }
}

/// A compiled template with its identifier and host metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedTemplate<M> {
    /// Template identifier
    pub id: Option<String>,
    /// Opaque host metadata
    pub meta: M,
    /// The compiled block
    pub block: SerializedTemplateBlock,
}

/// A compiled template whose block is kept as an encoded JSON string, so
/// consumers can defer parsing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedTemplateWithLazyBlock<M> {
    /// Template identifier
    pub id: Option<String>,
    /// Opaque host metadata
    pub meta: M,
    /// The JSON encoding of a [`SerializedTemplateBlock`]
    pub block: String,
}

impl<M> SerializedTemplate<M> {
    /// Encodes the block as a JSON string.
    pub fn into_lazy(self) -> serde_json::Result<SerializedTemplateWithLazyBlock<M>> {
        Ok(SerializedTemplateWithLazyBlock {
            id: self.id,
            meta: self.meta,
            block: serde_json::to_string(&self.block)?,
        })
    }
}

impl<M> SerializedTemplateWithLazyBlock<M> {
    /// Decodes the block.
    pub fn parse(self) -> serde_json::Result<SerializedTemplate<M>> {
        Ok(SerializedTemplate {
            id: self.id,
            meta: self.meta,
            block: serde_json::from_str(&self.block)?,
        })
    }
}
