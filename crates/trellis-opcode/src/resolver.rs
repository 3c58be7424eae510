//! Name resolution for helpers, modifiers and components.

use rustc_hash::FxHashMap;

/// Maps free names to runtime handles.
pub trait Resolver {
    /// The handle of a helper.
    fn lookup_helper(&self, name: &str) -> Option<u32>;

    /// The handle of a modifier.
    fn lookup_modifier(&self, name: &str) -> Option<u32>;

    /// The handle of a component, also used for block invocations.
    fn lookup_component(&self, name: &str) -> Option<u32>;
}

/// A resolver over fixed name lists. A name's handle is its list index.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    helpers: FxHashMap<String, u32>,
    modifiers: FxHashMap<String, u32>,
    components: FxHashMap<String, u32>,
}

fn index<I, S>(names: I) -> FxHashMap<String, u32>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut map = FxHashMap::default();
    for (i, name) in names.into_iter().enumerate() {
        map.entry(name.into()).or_insert(i as u32);
    }
    map
}

impl StaticResolver {
    /// Creates a resolver that knows no names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the helper names.
    pub fn helpers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.helpers = index(names);
        self
    }

    /// Sets the modifier names.
    pub fn modifiers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = index(names);
        self
    }

    /// Sets the component names.
    pub fn components<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components = index(names);
        self
    }
}

impl Resolver for StaticResolver {
    fn lookup_helper(&self, name: &str) -> Option<u32> {
        self.helpers.get(name).copied()
    }

    fn lookup_modifier(&self, name: &str) -> Option<u32> {
        self.modifiers.get(name).copied()
    }

    fn lookup_component(&self, name: &str) -> Option<u32> {
        self.components.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_list_indices() {
        let resolver = StaticResolver::new()
            .helpers(["concat", "if", "concat"])
            .components(vec!["Foo".to_string()]);
        assert_eq!(resolver.lookup_helper("concat"), Some(0));
        assert_eq!(resolver.lookup_helper("if"), Some(1));
        assert_eq!(resolver.lookup_component("Foo"), Some(0));
        assert_eq!(resolver.lookup_modifier("on"), None);
    }
}
