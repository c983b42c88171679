//! Nested subgraph emission
//!
//! Renders a [`DirectoryTree`] as nested Mermaid `subgraph ... end` blocks
//! (directory, file, class) holding the node lines of collected functions.
//! Node ids are looked up from the [`NodeManager`], never allocated here.

use crate::domain::label::escape_mermaid_text;
use crate::domain::node_manager::NodeManager;
use crate::domain::symbol::is_synthetic_class;
use crate::domain::tree::{ClassMap, DirectoryTree};
use serde_json::{json, Value};

const INDENT: &str = "    ";
/// Indentation depth of root-level blocks, one level inside `flowchart`.
const BASE_DEPTH: usize = 1;

/// Independent per-run counters for directory and file subgraphs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubgraphCounters {
    directories: usize,
    files: usize,
}

impl SubgraphCounters {
    pub fn next_directory_id(&mut self) -> String {
        self.directories += 1;
        format!("dir_{}", self.directories)
    }

    pub fn next_file_id(&mut self) -> String {
        self.files += 1;
        format!("file_{}", self.files)
    }

    pub fn class_id(file_id: &str, local_index: usize) -> String {
        format!("{}_{}", file_id, local_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubgraphKind {
    Directory,
    File,
    Class,
}

impl SubgraphKind {
    pub fn title(&self) -> &'static str {
        match self {
            SubgraphKind::Directory => "DIR",
            SubgraphKind::File => "FILE",
            SubgraphKind::Class => "CLASS",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SubgraphKind::Directory => "directory",
            SubgraphKind::File => "file",
            SubgraphKind::Class => "class",
        }
    }
}

/// A subgraph emitted by the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct SubgraphInfo {
    pub id: String,
    pub kind: SubgraphKind,
    pub name: String,
    /// Nesting level; root-level blocks are 0
    pub level: usize,
    pub parent: Option<String>,
    pub node_ids: Vec<String>,
}

impl SubgraphInfo {
    pub fn metadata(&self) -> Value {
        json!({
            "kind": self.kind.name(),
            "name": self.name,
            "level": self.level,
            "parent": self.parent,
            "nodes": self.node_ids,
        })
    }
}

/// Lines and subgraphs produced by one build.
#[derive(Debug, Default, Clone)]
pub struct SubgraphOutput {
    pub lines: Vec<String>,
    pub subgraphs: Vec<SubgraphInfo>,
    /// Node ids emitted, in emission order
    pub node_ids: Vec<String>,
}

pub struct SubgraphBuilder {
    counters: SubgraphCounters,
    max_functions_per_class: usize,
}

impl SubgraphBuilder {
    pub fn new(max_functions_per_class: usize) -> Self {
        Self {
            counters: SubgraphCounters::default(),
            max_functions_per_class,
        }
    }

    /// Emit `tree`. Root-level files and directories are not wrapped.
    pub fn build(&mut self, tree: &DirectoryTree, nodes: &NodeManager) -> SubgraphOutput {
        let mut out = SubgraphOutput::default();
        if !tree.has_functions() {
            return out;
        }
        self.emit_level(tree, nodes, BASE_DEPTH, None, &mut out);
        out
    }

    fn emit_level(
        &mut self,
        tree: &DirectoryTree,
        nodes: &NodeManager,
        depth: usize,
        parent: Option<&str>,
        out: &mut SubgraphOutput,
    ) {
        for (stem, classes) in &tree.files {
            if classes.values().any(|fns| !fns.is_empty()) {
                self.emit_file(stem, classes, nodes, depth, parent, out);
            }
        }
        for (name, subdir) in &tree.subdirs {
            if subdir.has_functions() {
                self.emit_directory(name, subdir, nodes, depth, parent, out);
            }
        }
    }

    fn emit_directory(
        &mut self,
        name: &str,
        tree: &DirectoryTree,
        nodes: &NodeManager,
        depth: usize,
        parent: Option<&str>,
        out: &mut SubgraphOutput,
    ) {
        let id = self.counters.next_directory_id();
        self.open(&id, SubgraphKind::Directory, name, depth, parent, out);
        self.emit_level(tree, nodes, depth + 1, Some(&id), out);
        close(depth, out);
    }

    fn emit_file(
        &mut self,
        stem: &str,
        classes: &ClassMap,
        nodes: &NodeManager,
        depth: usize,
        parent: Option<&str>,
        out: &mut SubgraphOutput,
    ) {
        let file_id = self.counters.next_file_id();
        let file_index = self.open(&file_id, SubgraphKind::File, stem, depth, parent, out);

        let real_classes = classes.keys().filter(|c| !is_synthetic_class(c)).count();
        let wrap_classes = real_classes > 1;

        for (local_index, (class, functions)) in classes.iter().enumerate() {
            if wrap_classes && !is_synthetic_class(class) {
                let class_id = SubgraphCounters::class_id(&file_id, local_index);
                let class_index =
                    self.open(&class_id, SubgraphKind::Class, class, depth + 1, Some(&file_id), out);
                let ids = self.emit_functions(functions, nodes, depth + 2, out);
                out.subgraphs[class_index].node_ids.extend(ids);
                close(depth + 1, out);
            } else {
                let ids = self.emit_functions(functions, nodes, depth + 1, out);
                out.subgraphs[file_index].node_ids.extend(ids);
            }
        }

        close(depth, out);
    }

    /// Node lines for at most `max_functions_per_class` functions with ids.
    fn emit_functions(
        &self,
        functions: &[String],
        nodes: &NodeManager,
        depth: usize,
        out: &mut SubgraphOutput,
    ) -> Vec<String> {
        let mut emitted = Vec::new();
        for function in functions.iter().take(self.max_functions_per_class) {
            let node_id = nodes.get_node_id(function);
            if node_id.is_empty() {
                continue;
            }
            let label = nodes.get_label(&node_id).unwrap_or_default();
            out.lines
                .push(format!("{}{}[\"{}\"]", indent(depth), node_id, label));
            out.node_ids.push(node_id.clone());
            emitted.push(node_id);
        }
        emitted
    }

    /// Push the opening line and record the subgraph; returns its index.
    fn open(
        &self,
        id: &str,
        kind: SubgraphKind,
        name: &str,
        depth: usize,
        parent: Option<&str>,
        out: &mut SubgraphOutput,
    ) -> usize {
        out.lines.push(format!(
            "{}subgraph {}[\"{}: {}\"]",
            indent(depth),
            id,
            kind.title(),
            escape_mermaid_text(name)
        ));
        out.subgraphs.push(SubgraphInfo {
            id: id.to_string(),
            kind,
            name: name.to_string(),
            level: depth.saturating_sub(BASE_DEPTH),
            parent: parent.map(str::to_string),
            node_ids: Vec::new(),
        });
        out.subgraphs.len() - 1
    }
}

fn close(depth: usize, out: &mut SubgraphOutput) {
    out.lines.push(format!("{}end", indent(depth)));
}

fn indent(depth: usize) -> String {
    INDENT.repeat(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::label::LabelLevel;
    use crate::domain::symbol::Symbol;

    fn count(lines: &[String], prefix: &str) -> usize {
        lines
            .iter()
            .filter(|l| l.trim_start().starts_with(prefix))
            .count()
    }

    fn manager_for(symbols: &[Symbol]) -> NodeManager {
        let mut nodes = NodeManager::new(LabelLevel::Minimal);
        for s in symbols {
            nodes.create_node(&s.qualified_name, Some(s), false);
        }
        nodes
    }

    #[test]
    fn test_nested_directories_balanced() {
        let symbols = vec![
            Symbol::new("main", "main.py", 1, 2),
            Symbol::new("pkg.a.run", "pkg/a.py", 1, 2),
            Symbol::new("pkg.sub.b.go", "pkg/sub/b.py", 1, 2),
        ];
        let nodes = manager_for(&symbols);
        let tree = DirectoryTree::from_symbols(&symbols, None);
        let out = SubgraphBuilder::new(50).build(&tree, &nodes);

        assert_eq!(count(&out.lines, "subgraph "), count(&out.lines, "end"));
        assert_eq!(
            out.lines,
            vec![
                "    subgraph file_1[\"FILE: main\"]",
                "        N1[\"main\"]",
                "    end",
                "    subgraph dir_1[\"DIR: pkg\"]",
                "        subgraph file_2[\"FILE: a\"]",
                "            N2[\"run\"]",
                "        end",
                "        subgraph dir_2[\"DIR: sub\"]",
                "            subgraph file_3[\"FILE: b\"]",
                "                N3[\"go\"]",
                "            end",
                "        end",
                "    end",
            ]
        );
        let sub = out.subgraphs.iter().find(|s| s.id == "dir_2").unwrap();
        assert_eq!(sub.parent.as_deref(), Some("dir_1"));
        assert_eq!(sub.level, 1);
    }

    #[test]
    fn test_multiple_classes_get_wrappers() {
        let symbols = vec![
            Symbol::new("m.helper", "m.py", 1, 2),
            Symbol::new("m.A.one", "m.py", 3, 4).with_class("A"),
            Symbol::new("m.B.two", "m.py", 5, 6).with_class("B"),
        ];
        let nodes = manager_for(&symbols);
        let tree = DirectoryTree::from_symbols(&symbols, None);
        let out = SubgraphBuilder::new(50).build(&tree, &nodes);

        assert!(out.lines.contains(&"        subgraph file_1_1[\"CLASS: A\"]".to_string()));
        assert!(out.lines.contains(&"        subgraph file_1_2[\"CLASS: B\"]".to_string()));
        assert!(out.lines.contains(&"        N1[\"helper\"]".to_string()));
        assert_eq!(count(&out.lines, "subgraph "), 3);
        assert_eq!(count(&out.lines, "end"), 3);
    }

    #[test]
    fn test_single_class_sits_under_file() {
        let symbols = vec![
            Symbol::new("m.A.one", "m.py", 3, 4).with_class("A"),
            Symbol::new("m.free", "m.py", 5, 6),
        ];
        let nodes = manager_for(&symbols);
        let tree = DirectoryTree::from_symbols(&symbols, None);
        let out = SubgraphBuilder::new(50).build(&tree, &nodes);
        assert_eq!(count(&out.lines, "subgraph "), 1);
        assert!(!out.lines.iter().any(|l| l.contains("CLASS:")));
        assert_eq!(out.subgraphs[0].node_ids, vec!["N1", "N2"]);
    }

    #[test]
    fn test_empty_branch_emits_nothing() {
        let symbols = vec![Symbol::new("a.f", "a.py", 1, 2)];
        let nodes = manager_for(&symbols);
        let mut tree = DirectoryTree::from_symbols(&symbols, None);
        let ghost = tree.subdirs.entry("ghost".to_string()).or_default();
        ghost
            .subdirs
            .entry("deeper".to_string())
            .or_default()
            .files
            .entry("stub".to_string())
            .or_default()
            .insert("module_stub".to_string(), vec![]);

        let out = SubgraphBuilder::new(50).build(&tree, &nodes);
        assert!(!out.lines.iter().any(|l| l.contains("ghost") || l.contains("deeper")));
        assert_eq!(count(&out.lines, "subgraph "), 1);
        assert_eq!(count(&out.lines, "end"), 1);

        let empty = DirectoryTree::new();
        assert!(SubgraphBuilder::new(50).build(&empty, &nodes).lines.is_empty());
    }

    #[test]
    fn test_class_cap_and_missing_ids() {
        let symbols: Vec<Symbol> = (0..60)
            .map(|i| Symbol::new(&format!("big.f{}", i), "big.py", i, i))
            .collect();
        // Only the first 55 get ids; the rest are skipped silently.
        let nodes = manager_for(&symbols[..55]);
        let tree = DirectoryTree::from_symbols(&symbols, None);
        let out = SubgraphBuilder::new(50).build(&tree, &nodes);
        assert_eq!(out.node_ids.len(), 50);

        let small = SubgraphBuilder::new(100).build(&tree, &nodes);
        assert_eq!(small.node_ids.len(), 55);
    }

    #[test]
    fn test_names_are_escaped() {
        let symbols = vec![Symbol::new("x.f", "dir[1]/x.py", 1, 1)];
        let nodes = manager_for(&symbols);
        let tree = DirectoryTree::from_symbols(&symbols, None);
        let out = SubgraphBuilder::new(50).build(&tree, &nodes);
        assert_eq!(out.lines[0], "    subgraph dir_1[\"DIR: dir#91;1#93;\"]");
    }
}
