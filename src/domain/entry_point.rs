//! Entry Point Discovery Module
//!
//! Finds the functions a code flow diagram starts from.

use crate::domain::callgraph::CallGraph;
use crate::domain::symbol::SymbolTable;
use std::collections::HashSet;

/// Represents a discovered entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPoint {
    /// Qualified name of the function
    pub id: String,
    /// How the entry point was found
    pub kind: EntryPointKind,
}

/// Classification of entry point origins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPointKind {
    /// Call-graph key never called by another function
    Root,
    /// Symbol flagged `is_entry_point` by the upstream scanner
    Declared,
}

/// Entry point detector
pub struct EntryPointDetector {
    max_entry_points: usize,
}

impl EntryPointDetector {
    pub fn new(max_entry_points: usize) -> Self {
        Self { max_entry_points }
    }

    /// Call-graph keys that never appear in another function's callee list,
    /// in key order. A function calling itself is still a root.
    pub fn roots(graph: &CallGraph) -> Vec<String> {
        let mut called: HashSet<&str> = HashSet::new();
        for (caller, callees) in graph.iter() {
            for callee in callees {
                if callee != caller {
                    called.insert(callee.as_str());
                }
            }
        }

        graph
            .callers()
            .filter(|caller| !called.contains(caller.as_str()))
            .cloned()
            .collect()
    }

    /// Roots first, then declared entry points not already found,
    /// capped to `max_entry_points` in discovery order.
    pub fn detect(&self, graph: &CallGraph, symbols: &SymbolTable) -> Vec<EntryPoint> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entries = Vec::new();

        for root in Self::roots(graph) {
            seen.insert(root.clone());
            entries.push(EntryPoint {
                id: root,
                kind: EntryPointKind::Root,
            });
        }

        for symbol in symbols.iter().filter(|s| s.is_entry_point) {
            if seen.insert(symbol.qualified_name.clone()) {
                entries.push(EntryPoint {
                    id: symbol.qualified_name.clone(),
                    kind: EntryPointKind::Declared,
                });
            }
        }

        entries.truncate(self.max_entry_points);
        entries
    }
}
