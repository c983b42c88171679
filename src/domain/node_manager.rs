//! Node identity and bounded call-graph collection
//!
//! Walks the call graph depth-first from an entry point and decides which
//! functions become diagram nodes. Three independent caps keep the result
//! bounded: path depth, total node count, and callees followed per function.

use crate::domain::callgraph::CallGraph;
use crate::domain::label::{LabelFormatter, LabelLevel};
use crate::domain::metadata::MetadataStore;
use crate::domain::symbol::{Symbol, SymbolTable};
use indexmap::{IndexMap, IndexSet};
use serde_json::json;
use std::collections::HashSet;
use tracing::debug;

/// Caps applied while collecting nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionLimits {
    /// Maximum path length from the entry point
    pub max_depth: usize,
    /// Maximum nodes created across the whole run
    pub max_nodes: usize,
    /// Callees followed per function, in call order
    pub max_calls_per_function: usize,
}

impl Default for CollectionLimits {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_nodes: 100,
            max_calls_per_function: 5,
        }
    }
}

/// A collected function and its allocated id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub node_id: String,
    pub qualified_name: String,
}

pub struct NodeManager {
    counter: usize,
    /// qualified name -> record, in visitation order
    nodes: IndexMap<String, NodeRecord>,
    labels: IndexMap<String, String>,
    processed: HashSet<String>,
    entry_points: IndexSet<String>,
    label_level: LabelLevel,
    metadata: MetadataStore,
}

impl NodeManager {
    pub fn new(label_level: LabelLevel) -> Self {
        Self {
            counter: 0,
            nodes: IndexMap::new(),
            labels: IndexMap::new(),
            processed: HashSet::new(),
            entry_points: IndexSet::new(),
            label_level,
            metadata: MetadataStore::new(),
        }
    }

    /// Allocate a node for `name`. A repeat call returns the existing id and
    /// an empty label without touching any state.
    pub fn create_node(
        &mut self,
        name: &str,
        symbol: Option<&Symbol>,
        is_entry_point: bool,
    ) -> (String, String) {
        if let Some(record) = self.nodes.get(name) {
            return (record.node_id.clone(), String::new());
        }

        self.counter += 1;
        let node_id = format!("N{}", self.counter);
        self.processed.insert(name.to_string());
        if is_entry_point {
            self.entry_points.insert(name.to_string());
        }

        let label = LabelFormatter::format(name, symbol, self.label_level);
        self.nodes.insert(
            name.to_string(),
            NodeRecord {
                node_id: node_id.clone(),
                qualified_name: name.to_string(),
            },
        );
        self.labels.insert(node_id.clone(), label.clone());

        self.metadata.add_node_metadata(
            &node_id,
            json!({
                "qualified_name": name,
                "label": label,
                "is_entry_point": is_entry_point,
                "class": symbol.and_then(|s| s.class.clone()),
                "file": symbol.map(|s| s.path.clone()),
                "line_start": symbol.map(|s| s.line),
                "line_end": symbol.map(|s| s.end),
            }),
        );

        (node_id, label)
    }

    /// Node id for `name`, or an empty string if it was never created.
    pub fn get_node_id(&self, name: &str) -> String {
        self.nodes
            .get(name)
            .map(|r| r.node_id.clone())
            .unwrap_or_default()
    }

    /// Label assigned to `node_id` on creation.
    pub fn get_label(&self, node_id: &str) -> Option<&str> {
        self.labels.get(node_id).map(String::as_str)
    }

    /// Depth-first bounded collection from `entry`. Returns the names newly
    /// collected on this path; unknown symbols and revisits yield nothing.
    pub fn collect_functions_recursive(
        &mut self,
        entry: &str,
        call_graph: &CallGraph,
        symbol_table: &SymbolTable,
        limits: &CollectionLimits,
        depth: usize,
    ) -> IndexSet<String> {
        let mut collected = IndexSet::new();

        if depth >= limits.max_depth {
            return collected;
        }
        if self.processed.len() >= limits.max_nodes {
            debug!("Node cap {} reached before {}", limits.max_nodes, entry);
            return collected;
        }
        if self.processed.contains(entry) {
            return collected;
        }
        let Some(symbol) = symbol_table.get(entry) else {
            return collected;
        };

        self.processed.insert(entry.to_string());
        let (node_id, _) = self.create_node(entry, Some(symbol), depth == 0);
        self.metadata
            .add_node_metadata(&node_id, json!({ "depth": depth }));
        collected.insert(entry.to_string());

        for callee in call_graph
            .callees(entry)
            .iter()
            .take(limits.max_calls_per_function)
        {
            if self.processed.len() >= limits.max_nodes {
                debug!("Node cap {} reached while expanding {}", limits.max_nodes, entry);
                break;
            }
            let found =
                self.collect_functions_recursive(callee, call_graph, symbol_table, limits, depth + 1);
            collected.extend(found);
        }

        collected
    }

    pub fn is_processed(&self, name: &str) -> bool {
        self.processed.contains(name)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Created nodes in visitation order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.values()
    }

    pub fn is_entry_point(&self, name: &str) -> bool {
        self.entry_points.contains(name)
    }

    pub fn label_level(&self) -> LabelLevel {
        self.label_level
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.metadata
    }
}
