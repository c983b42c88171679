// Call graph structures for codeflow.
// Represents caller -> ordered callee relationships between qualified names.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Caller qualified name -> ordered callee list.
/// Duplicates and self-references are kept as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallGraph {
    calls: IndexMap<String, Vec<String>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a caller with no callees if it is unknown.
    pub fn add_function(&mut self, caller_id: &str) {
        self.calls.entry(caller_id.to_string()).or_default();
    }

    pub fn add_edge(&mut self, caller_id: &str, callee_id: &str) {
        self.calls
            .entry(caller_id.to_string())
            .or_default()
            .push(callee_id.to_string());
    }

    /// Callees of `caller_id` in call order; empty if unknown.
    pub fn callees(&self, caller_id: &str) -> &[String] {
        self.calls.get(caller_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Callers in insertion order.
    pub fn callers(&self) -> impl Iterator<Item = &String> {
        self.calls.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.calls.iter()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, Vec<V>)> for CallGraph {
    fn from_iter<I: IntoIterator<Item = (K, Vec<V>)>>(iter: I) -> Self {
        let mut graph = CallGraph::new();
        for (caller, callees) in iter {
            let caller: String = caller.into();
            graph.add_function(&caller);
            for callee in callees {
                let callee: String = callee.into();
                graph.add_edge(&caller, &callee);
            }
        }
        graph
    }
}
