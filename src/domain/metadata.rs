//! Metadata side-table
//!
//! Keeps the verbose facts about nodes, edges and subgraphs out of the
//! diagram text. Records are keyed by node id, `from->to` edge key, or
//! subgraph id; fields merged into an existing record overwrite same-named
//! fields.

use serde::Serialize;
use serde_json::{json, Map, Value};
use indexmap::IndexMap;

type Record = Map<String, Value>;

/// Counts derived from the stored records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetadataStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub total_subgraphs: usize,
    pub entry_points: usize,
}

#[derive(Debug, Default, Clone)]
pub struct MetadataStore {
    nodes: IndexMap<String, Record>,
    edges: IndexMap<String, Record>,
    subgraphs: IndexMap<String, Record>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge_key(from: &str, to: &str) -> String {
        format!("{}->{}", from, to)
    }

    pub fn add_node_metadata(&mut self, node_id: &str, fields: Value) {
        merge(&mut self.nodes, node_id, fields);
    }

    pub fn add_edge_metadata(&mut self, from: &str, to: &str, fields: Value) {
        merge(&mut self.edges, &Self::edge_key(from, to), fields);
    }

    pub fn add_subgraph_metadata(&mut self, subgraph_id: &str, fields: Value) {
        merge(&mut self.subgraphs, subgraph_id, fields);
    }

    pub fn get_node_metadata(&self, node_id: &str) -> Option<&Record> {
        self.nodes.get(node_id)
    }

    pub fn get_edge_metadata(&self, from: &str, to: &str) -> Option<&Record> {
        self.edges.get(&Self::edge_key(from, to))
    }

    pub fn get_subgraph_metadata(&self, subgraph_id: &str) -> Option<&Record> {
        self.subgraphs.get(subgraph_id)
    }

    /// Keep only node records whose id passes `keep`; returns how many were
    /// dropped.
    pub fn retain_nodes<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.nodes.len();
        self.nodes.retain(|node_id, _| keep(node_id.as_str()));
        before - self.nodes.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &String> {
        self.nodes.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.subgraphs.is_empty()
    }

    pub fn get_stats_summary(&self) -> MetadataStats {
        let entry_points = self
            .nodes
            .values()
            .filter(|record| {
                record
                    .get("is_entry_point")
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
            })
            .count();

        MetadataStats {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            total_subgraphs: self.subgraphs.len(),
            entry_points,
        }
    }

    /// Snapshot of `{nodes, edges, subgraphs, stats}`.
    pub fn export_dict(&self) -> Value {
        json!({
            "nodes": self.nodes,
            "edges": self.edges,
            "subgraphs": self.subgraphs,
            "stats": self.get_stats_summary(),
        })
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.export_dict())
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.subgraphs.clear();
    }
}

/// Merge object fields into the record under `key`. Non-object values carry
/// no named fields and are ignored.
fn merge(table: &mut IndexMap<String, Record>, key: &str, fields: Value) {
    let record = table.entry(key.to_string()).or_default();
    if let Value::Object(fields) = fields {
        for (name, value) in fields {
            record.insert(name, value);
        }
    }
}
