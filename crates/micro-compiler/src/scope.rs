//! Lexical scopes and symbols.
//!
//! Scopes live in a [`ScopeTree`] arena and refer to their parent by
//! [`ScopeId`]. There is one global scope per compilation unit and one
//! local scope per routine, parented at the global scope.
//!
//! Lookup walks from a scope to the root and takes the first match, so a
//! local name shadows a global one.

use log::trace;
use rustc_hash::FxHashMap;

use crate::types::Type;

// ============================================================================
// Types
// ============================================================================

/// Index of a scope in its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Global,
    Local,
}

/// A named entity defined in a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    /// `None` for the program-name marker, which names no value.
    pub ty: Option<Type>,
    /// Scope that owns this symbol.
    pub scope: ScopeId,
}

impl Symbol {
    pub fn is_marker(&self) -> bool {
        self.ty.is_none()
    }
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    symbols: FxHashMap<String, Symbol>,
}

// ============================================================================
// ScopeTree
// ============================================================================

/// Arena of every scope in a compilation unit.
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope. Only a global scope may lack a parent.
    pub fn create(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent,
            symbols: FxHashMap::default(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.scopes[scope.0 as usize].kind
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0 as usize].parent
    }

    /// Define `name` in `scope`.
    ///
    /// Returns `false` and leaves the scope untouched if `scope` itself
    /// already defines `name`. Ancestors are not consulted.
    pub fn define(&mut self, scope: ScopeId, name: &str, ty: Type) -> bool {
        self.insert(scope, name, Some(ty))
    }

    /// Define a name that marks a declaration but carries no value.
    pub fn define_marker(&mut self, scope: ScopeId, name: &str) -> bool {
        self.insert(scope, name, None)
    }

    fn insert(&mut self, scope: ScopeId, name: &str, ty: Option<Type>) -> bool {
        let symbols = &mut self.scopes[scope.0 as usize].symbols;
        if symbols.contains_key(name) {
            return false;
        }
        trace!("define {name} in {scope:?}");
        symbols.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                ty,
                scope,
            },
        );
        true
    }

    /// Find `name` in `scope` or the nearest ancestor that defines it.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.0 as usize];
            if let Some(symbol) = scope.symbols.get(name) {
                return Some(symbol);
            }
            current = scope.parent;
        }
        None
    }

    /// Find `name` in `scope` only.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes[scope.0 as usize].symbols.get(name)
    }
}
