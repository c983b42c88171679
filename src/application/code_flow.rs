//! Code flow generator
//!
//! Collects a bounded set of functions reachable from the call graph's entry
//! points and renders them grouped by directory, file and class, followed by
//! call edges and style lines.

use crate::config::GenerationConfig;
use crate::domain::callgraph::CallGraph;
use crate::domain::entry_point::EntryPointDetector;
use crate::domain::label::{LabelFormatter, LabelLevel};
use crate::domain::metadata::MetadataStore;
use crate::domain::node_manager::NodeManager;
use crate::domain::subgraph::SubgraphBuilder;
use crate::domain::symbol::SymbolTable;
use crate::domain::theme::ThemeManager;
use crate::domain::tree::DirectoryTree;
use crate::error::{CodeflowError, Result};
use crate::ports::DiagramGenerator;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use tracing::{debug, info, warn};

const INDENT: &str = "    ";

/// The input document: symbol table plus call graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeFlowInputs {
    pub symbol_table: SymbolTable,
    pub call_graph: CallGraph,
}

impl CodeFlowInputs {
    pub fn new(symbol_table: SymbolTable, call_graph: CallGraph) -> Self {
        Self {
            symbol_table,
            call_graph,
        }
    }

    /// Names of the collections that are present and non-empty.
    pub fn present_fields(&self) -> Vec<String> {
        let mut present = Vec::new();
        if !self.symbol_table.is_empty() {
            present.push("symbol_table".to_string());
        }
        if !self.call_graph.is_empty() {
            present.push("call_graph".to_string());
        }
        present
    }
}

pub struct CodeFlowGenerator {
    inputs: CodeFlowInputs,
    config: GenerationConfig,
    nodes: NodeManager,
    theme: ThemeManager,
}

impl CodeFlowGenerator {
    pub const NAME: &'static str = "CodeFlowGenerator";

    pub fn new(inputs: CodeFlowInputs, config: GenerationConfig) -> Self {
        let theme = ThemeManager::new(config.color_scheme());
        Self {
            inputs,
            nodes: NodeManager::new(LabelLevel::Minimal),
            theme,
            config,
        }
    }

    pub fn nodes(&self) -> &NodeManager {
        &self.nodes
    }

    /// Level used for node labels: fixed by config, or picked from how many
    /// nodes the run can produce relative to the cap.
    fn label_level(&self) -> LabelLevel {
        self.config.label_level().unwrap_or_else(|| {
            let expected = self.inputs.symbol_table.len().min(self.config.max_nodes);
            LabelFormatter::get_recommended_format(expected, self.config.max_nodes)
        })
    }

    /// Run bounded collection from each entry point until the global node
    /// cap is reached.
    fn collect(&mut self) {
        let detector = EntryPointDetector::new(self.config.max_entry_points);
        let entries = detector.detect(&self.inputs.call_graph, &self.inputs.symbol_table);
        if entries.is_empty() {
            warn!("{}: no entry points found in call graph", Self::NAME);
        }

        let limits = self.config.collection_limits();
        for entry in &entries {
            if self.nodes.processed_count() >= limits.max_nodes {
                debug!("Global node cap {} reached; skipping remaining entry points", limits.max_nodes);
                break;
            }
            let collected = self.nodes.collect_functions_recursive(
                &entry.id,
                &self.inputs.call_graph,
                &self.inputs.symbol_table,
                &limits,
                0,
            );
            debug!("Entry point {} collected {} functions", entry.id, collected.len());
        }

        info!(
            "{}: {} entry points, {} nodes collected",
            Self::NAME,
            entries.len(),
            self.nodes.node_count()
        );
    }

    /// Edge lines between emitted nodes, at most `max_calls_per_function`
    /// callees per function and one line per distinct pair.
    fn edge_lines(&mut self, emitted: &HashSet<String>) -> Vec<String> {
        let mut lines = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut edges = Vec::new();

        for record in self.nodes.nodes() {
            if !emitted.contains(&record.node_id) {
                continue;
            }
            let callees = self
                .inputs
                .call_graph
                .callees(&record.qualified_name)
                .iter()
                .take(self.config.max_calls_per_function);
            for (call_index, callee) in callees.enumerate() {
                let target = self.nodes.get_node_id(callee);
                if target.is_empty() || !emitted.contains(&target) {
                    continue;
                }
                if !seen.insert((record.node_id.clone(), target.clone())) {
                    continue;
                }
                lines.push(format!("{}{} --> {}", INDENT, record.node_id, target));
                edges.push((
                    record.node_id.clone(),
                    target,
                    record.qualified_name.clone(),
                    callee.clone(),
                    call_index,
                ));
            }
        }

        let metadata = self.nodes.metadata_mut();
        for (from, to, caller, callee, call_index) in edges {
            metadata.add_edge_metadata(
                &from,
                &to,
                json!({
                    "from_function": caller,
                    "to_function": callee,
                    "call_index": call_index,
                }),
            );
        }
        lines
    }
}

impl DiagramGenerator for CodeFlowGenerator {
    fn validate_inputs(&self) -> Result<()> {
        let present = self.inputs.present_fields();
        let missing = if self.inputs.symbol_table.is_empty() {
            Some("symbol_table")
        } else if self.inputs.call_graph.is_empty() {
            Some("call_graph")
        } else {
            None
        };
        match missing {
            Some(field) => Err(CodeflowError::MissingInput {
                field: field.to_string(),
                generator: Self::NAME.to_string(),
                present,
            }),
            None => Ok(()),
        }
    }

    fn generate_body(&mut self) -> Result<Vec<String>> {
        // Fresh per-run state.
        self.nodes = NodeManager::new(self.label_level());
        self.theme = ThemeManager::new(self.config.color_scheme());
        debug!("Label level: {}", self.nodes.label_level());

        self.collect();

        let collected: Vec<_> = self
            .nodes
            .nodes()
            .filter_map(|record| self.inputs.symbol_table.get(&record.qualified_name))
            .collect();
        let tree = DirectoryTree::from_symbols(collected, self.config.source_root.as_deref());

        debug!("Grouping {} functions", tree.function_count());

        let grouped = SubgraphBuilder::new(self.config.max_functions_per_class).build(&tree, &self.nodes);
        let emitted: HashSet<String> = grouped.node_ids.iter().cloned().collect();

        // Nodes cut by the per-class cap never reach the text.
        let dropped = self
            .nodes
            .metadata_mut()
            .retain_nodes(|node_id| emitted.contains(node_id));
        if dropped > 0 {
            debug!(
                "{} collected functions exceed max_functions_per_class ({}) and were not drawn",
                dropped, self.config.max_functions_per_class
            );
        }

        for subgraph in &grouped.subgraphs {
            self.nodes
                .metadata_mut()
                .add_subgraph_metadata(&subgraph.id, subgraph.metadata());
        }

        let mut lines = grouped.lines;
        lines.extend(self.edge_lines(&emitted));

        for node_id in &grouped.node_ids {
            let Some(record) = self.nodes.nodes().find(|r| &r.node_id == node_id) else {
                continue;
            };
            let group = self
                .inputs
                .symbol_table
                .get(&record.qualified_name)
                .map(|s| s.path.as_str())
                .unwrap_or_default();
            let is_entry = self.nodes.is_entry_point(&record.qualified_name);
            lines.push(format!("{}{}", INDENT, self.theme.node_style(node_id, group, is_entry)));
        }
        for subgraph in &grouped.subgraphs {
            lines.push(format!(
                "{}{}",
                INDENT,
                self.theme.subgraph_style(&subgraph.id, subgraph.kind, subgraph.level)
            ));
        }

        Ok(lines)
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn metadata(&self) -> Option<&MetadataStore> {
        Some(self.nodes.metadata())
    }
}
