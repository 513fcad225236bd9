//! Scope-stack symbol table used while converting identifiers.
//!
//! Bindings survive only for the duration of one conversion pass.

use std::collections::HashSet;

/// A stack of scopes, each binding a set of identifiers.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<HashSet<String>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a fresh innermost scope.
    pub fn open(&mut self) {
        self.scopes.push(HashSet::new());
    }

    /// Pops the innermost scope. Unbalanced closes are programmer
    /// error.
    pub fn close(&mut self) {
        self.scopes
            .pop()
            .unwrap_or_else(|| panic!("scope stack underflow"));
    }

    /// Binds `ident` in the innermost scope.
    pub fn register(&mut self, ident: &str) {
        if let Some(top) = self.scopes.last_mut() {
            top.insert(ident.to_string());
        }
    }

    /// Looks up `ident` in the innermost scope only.
    pub fn fetch_current(&self, ident: &str) -> bool {
        self.scopes.last().is_some_and(|s| s.contains(ident))
    }

    /// Looks up `ident` in all scopes, innermost outwards.
    pub fn fetch(&self, ident: &str) -> bool {
        self.scopes.iter().rev().any(|s| s.contains(ident))
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_vs_outer_lookup() {
        let mut scopes = ScopeStack::new();
        scopes.open();
        scopes.register("outer");
        scopes.open();
        scopes.register("inner");

        assert!(scopes.fetch_current("inner"));
        assert!(!scopes.fetch_current("outer"));
        assert!(scopes.fetch("outer"));
        assert!(scopes.fetch("inner"));

        scopes.close();
        assert!(!scopes.fetch("inner"));
        assert!(scopes.fetch_current("outer"));
        scopes.close();
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    #[should_panic(expected = "underflow")]
    fn close_without_open_panics() {
        ScopeStack::new().close();
    }
}
