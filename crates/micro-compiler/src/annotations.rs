//! Per-node annotation maps.
//!
//! Each pass records its results against the [`NodeId`] of the node it
//! visited. A map is written by exactly one pass and only read afterwards.
//! Entries are never overwritten.

use micro_parser::ast::NodeId;
use rustc_hash::FxHashMap;

use crate::scope::ScopeId;
use crate::types::Type;

/// Append-only map from syntax-tree node to a value.
#[derive(Debug, Clone)]
pub struct NodeMap<V> {
    entries: FxHashMap<NodeId, V>,
}

impl<V> Default for NodeMap<V> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<V> NodeMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `node`. Returns `false` without replacing anything
    /// if `node` already has an entry.
    pub fn insert(&mut self, node: NodeId, value: V) -> bool {
        match self.entries.entry(node) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    pub fn get(&self, node: NodeId) -> Option<&V> {
        self.entries.get(&node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scope introduced by the program root and each routine declaration.
pub type ScopeMap = NodeMap<ScopeId>;

/// Type of every expression, lvalue and statement.
pub type TypeMap = NodeMap<Type>;

impl TypeMap {
    /// Annotated type, or `Void` if the node was never typed.
    pub fn type_of(&self, node: NodeId) -> Type {
        self.get(node).cloned().unwrap_or(Type::VOID)
    }
}
