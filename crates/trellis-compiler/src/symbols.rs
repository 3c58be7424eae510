//! Symbol tables.
//!
//! A template owns one [`ProgramSymbols`]. Every block that binds parameters
//! opens a [`LocalSymbols`] scope that borrows its parent for the duration
//! of the block, so scopes nest exactly like the blocks they describe.

use crate::error::{CompileError, Result};

/// The name reserved for slot 0.
pub const THIS: &str = "this";

/// Operations shared by the top-level table and nested scopes.
pub trait Symbols {
    /// Registers a free variable and returns its upvar index.
    fn free_var(&mut self, name: &str) -> u32;

    /// Registers a named argument (`@name`) and returns its slot.
    fn arg(&mut self, name: &str) -> u32;

    /// Registers a block symbol (`&name`) and returns its slot.
    fn block(&mut self, name: &str) -> u32;

    /// Registers any name in the top-level table and returns its slot.
    fn symbol(&mut self, name: &str) -> u32;

    /// Looks up a block parameter visible from this scope.
    fn local(&self, name: &str) -> Result<u32>;

    /// Whether `name` is a block parameter visible from this scope.
    fn has_local(&self, name: &str) -> bool;

    /// Slots a partial or debugger can observe from this scope.
    fn eval_info(&self) -> Vec<u32>;
}

/// The top-level symbol table of a template.
#[derive(Debug, Clone)]
pub struct ProgramSymbols {
    symbols: Vec<String>,
    free_variables: Vec<String>,
    named: Vec<u32>,
}

impl Default for ProgramSymbols {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramSymbols {
    /// Creates a table holding only `this`.
    pub fn new() -> Self {
        Self {
            symbols: vec![THIS.to_string()],
            free_variables: Vec::new(),
            named: Vec::new(),
        }
    }

    /// Symbol names for the wire format, without `this`.
    pub fn to_symbols(&self) -> Vec<String> {
        self.symbols[1..].to_vec()
    }

    /// Free variable names, indexed by upvar.
    pub fn to_upvars(&self) -> Vec<String> {
        self.free_variables.clone()
    }

    /// Number of slots, including `this`.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false: slot 0 is reserved.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn add_named(&mut self, name: &str) -> u32 {
        let slot = add_string(&mut self.symbols, name);
        if !self.named.contains(&slot) {
            self.named.push(slot);
        }
        slot
    }
}

/// Returns the index of `name`, appending it if absent.
fn add_string(list: &mut Vec<String>, name: &str) -> u32 {
    if let Some(index) = list.iter().position(|s| s == name) {
        return index as u32;
    }
    list.push(name.to_string());
    (list.len() - 1) as u32
}

impl Symbols for ProgramSymbols {
    fn free_var(&mut self, name: &str) -> u32 {
        add_string(&mut self.free_variables, name)
    }

    fn arg(&mut self, name: &str) -> u32 {
        self.add_named(name)
    }

    fn block(&mut self, name: &str) -> u32 {
        self.add_named(name)
    }

    fn symbol(&mut self, name: &str) -> u32 {
        add_string(&mut self.symbols, name)
    }

    fn local(&self, name: &str) -> Result<u32> {
        Err(CompileError::UnresolvedLocal(name.to_string()))
    }

    fn has_local(&self, _name: &str) -> bool {
        false
    }

    fn eval_info(&self) -> Vec<u32> {
        let mut slots = self.named.clone();
        slots.sort_unstable();
        slots
    }
}

/// A scope binding block parameters on top of a parent scope.
pub struct LocalSymbols<'p> {
    parent: &'p mut dyn Symbols,
    locals: Vec<(String, u32)>,
}

impl<'p> LocalSymbols<'p> {
    /// Opens a scope binding `locals`, each to a slot in the top-level table.
    pub fn new<S: AsRef<str>>(parent: &'p mut dyn Symbols, locals: &[S]) -> Self {
        let mut bound: Vec<(String, u32)> = Vec::with_capacity(locals.len());
        for local in locals {
            let name = local.as_ref();
            let slot = parent.symbol(name);
            match bound.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = slot,
                None => bound.push((name.to_string(), slot)),
            }
        }
        Self {
            parent,
            locals: bound,
        }
    }

    /// The slots of the bound parameters, in declaration order.
    pub fn param_symbols(&self) -> Vec<u32> {
        self.locals.iter().map(|(_, slot)| *slot).collect()
    }
}

impl Symbols for LocalSymbols<'_> {
    fn free_var(&mut self, name: &str) -> u32 {
        self.parent.free_var(name)
    }

    fn arg(&mut self, name: &str) -> u32 {
        self.parent.arg(name)
    }

    fn block(&mut self, name: &str) -> u32 {
        self.parent.block(name)
    }

    fn symbol(&mut self, name: &str) -> u32 {
        self.parent.symbol(name)
    }

    fn local(&self, name: &str) -> Result<u32> {
        match self.locals.iter().find(|(n, _)| n == name) {
            Some((_, slot)) => Ok(*slot),
            None => self.parent.local(name),
        }
    }

    fn has_local(&self, name: &str) -> bool {
        self.locals.iter().any(|(n, _)| n == name) || self.parent.has_local(name)
    }

    fn eval_info(&self) -> Vec<u32> {
        let mut slots = self.parent.eval_info();
        for (_, slot) in &self.locals {
            if !slots.contains(slot) {
                slots.push(*slot);
            }
        }
        slots.sort_unstable();
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_starts_with_this() {
        let symbols = ProgramSymbols::new();
        assert_eq!(symbols.len(), 1);
        assert!(symbols.to_symbols().is_empty());
    }

    #[test]
    fn test_registration_is_deduplicated() {
        let mut symbols = ProgramSymbols::new();
        assert_eq!(symbols.arg("@title"), 1);
        assert_eq!(symbols.block("&default"), 2);
        assert_eq!(symbols.arg("@title"), 1);
        assert_eq!(symbols.free_var("helper"), 0);
        assert_eq!(symbols.free_var("other"), 1);
        assert_eq!(symbols.free_var("helper"), 0);
        assert_eq!(symbols.to_symbols(), vec!["@title", "&default"]);
        assert_eq!(symbols.to_upvars(), vec!["helper", "other"]);
    }

    #[test]
    fn test_top_level_has_no_locals() {
        let symbols = ProgramSymbols::new();
        assert!(!symbols.has_local("x"));
        let err = symbols.local("x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "No local x was found. Lookup reached the top-level, which has no locals"
        );
    }

    #[test]
    fn test_locals_bind_top_level_slots() {
        let mut program = ProgramSymbols::new();
        program.arg("@items");
        let mut scope = LocalSymbols::new(&mut program, &["item", "index"]);
        assert_eq!(scope.param_symbols(), vec![2, 3]);
        assert_eq!(scope.local("item").unwrap(), 2);
        assert!(scope.has_local("index"));
        assert!(!scope.has_local("items"));
        assert_eq!(scope.free_var("each"), 0);
        drop(scope);
        assert_eq!(program.to_symbols(), vec!["@items", "item", "index"]);
        assert_eq!(program.to_upvars(), vec!["each"]);
    }

    #[test]
    fn test_nested_scopes_shadow_and_delegate() {
        let mut program = ProgramSymbols::new();
        let mut outer = LocalSymbols::new(&mut program, &["a", "b"]);
        let inner = LocalSymbols::new(&mut outer, &["c"]);
        assert_eq!(inner.local("a").unwrap(), 1);
        assert_eq!(inner.local("c").unwrap(), 3);
        assert!(inner.local("d").is_err());
        assert_eq!(inner.eval_info(), vec![1, 2, 3]);
    }

    #[test]
    fn test_eval_info_lists_named_symbols() {
        let mut program = ProgramSymbols::new();
        program.arg("@a");
        program.symbol("unrelated");
        program.block("&default");
        assert_eq!(program.eval_info(), vec![1, 3]);
    }
}
