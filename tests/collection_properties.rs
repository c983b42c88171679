//! Property tests for bounded collection and subgraph emission over
//! arbitrary call graphs.

use codeflow::domain::callgraph::CallGraph;
use codeflow::domain::entry_point::EntryPointDetector;
use codeflow::domain::label::{LabelFormatter, LabelLevel};
use codeflow::domain::node_manager::{CollectionLimits, NodeManager};
use codeflow::domain::subgraph::SubgraphBuilder;
use codeflow::domain::symbol::{Symbol, SymbolTable};
use codeflow::domain::tree::DirectoryTree;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};

const DIRS: &[&str] = &["", "core", "core/io", "api", "api/v1/handlers"];
const CLASSES: &[Option<&str>] = &[None, Some("Engine"), Some("Parser"), Some("Cache")];

fn build(n: usize, edges: &[(usize, usize)], placement: &[(usize, usize, usize)]) -> (SymbolTable, CallGraph) {
    let mut symbols = SymbolTable::new();
    for i in 0..n {
        let (dir, file, class) = placement[i % placement.len()];
        let dir = DIRS[dir % DIRS.len()];
        let path = if dir.is_empty() {
            format!("f{}.py", file)
        } else {
            format!("{}/f{}.py", dir, file)
        };
        let mut symbol = Symbol::new(&format!("m.fn{}", i), &path, i as u32 + 1, i as u32 + 3);
        if let Some(class) = CLASSES[class % CLASSES.len()] {
            symbol = symbol.with_class(class);
        }
        symbols.insert(symbol);
    }

    let mut graph = CallGraph::new();
    for i in 0..n {
        graph.add_function(&format!("m.fn{}", i));
    }
    for &(from, to) in edges {
        graph.add_edge(&format!("m.fn{}", from % n), &format!("m.fn{}", to % n));
    }
    (symbols, graph)
}

/// Shortest call distance from `entry` following only the first five
/// callees of each function.
fn call_distances(graph: &CallGraph, entry: &str) -> HashMap<String, usize> {
    let mut dist = HashMap::new();
    let mut queue = VecDeque::new();
    dist.insert(entry.to_string(), 0);
    queue.push_back(entry.to_string());
    while let Some(name) = queue.pop_front() {
        let next = dist[&name] + 1;
        for callee in graph.callees(&name).iter().take(5) {
            if !dist.contains_key(callee) {
                dist.insert(callee.clone(), next);
                queue.push_back(callee.clone());
            }
        }
    }
    dist
}

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, Vec<(usize, usize, usize)>)> {
    (1usize..40).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n), 0..120),
            prop::collection::vec((0usize..5, 0usize..3, 0usize..4), 1..8),
        )
    })
}

proptest! {
    #[test]
    fn collection_respects_caps_and_visits_once(
        (n, edges, placement) in graph_strategy(),
        max_depth in 1usize..6,
        max_nodes in 1usize..30,
    ) {
        let (symbols, graph) = build(n, &edges, &placement);
        let limits = CollectionLimits { max_depth, max_nodes, max_calls_per_function: 5 };
        let mut nodes = NodeManager::new(LabelLevel::Minimal);

        let entries = EntryPointDetector::new(10).detect(&graph, &symbols);
        let mut seen = HashSet::new();
        let mut collected_from = Vec::new();
        for entry in &entries {
            if nodes.processed_count() >= max_nodes {
                break;
            }
            let collected = nodes.collect_functions_recursive(&entry.id, &graph, &symbols, &limits, 0);
            for name in &collected {
                // Never collected twice across the whole run.
                prop_assert!(seen.insert(name.clone()));
            }
            collected_from.push((entry.id.clone(), collected));
        }

        prop_assert!(nodes.node_count() <= max_nodes);
        prop_assert_eq!(nodes.node_count(), seen.len());

        let ids: HashSet<String> = nodes.nodes().map(|r| r.node_id.clone()).collect();
        prop_assert_eq!(ids.len(), nodes.node_count());

        // Each node's recorded depth is the length of a real call path from
        // its entry point, so it can never beat the shortest path.
        for (entry, collected) in &collected_from {
            let distances = call_distances(&graph, entry);
            for name in collected {
                let node_id = nodes.get_node_id(name);
                let meta = nodes.metadata().get_node_metadata(&node_id).unwrap();
                let depth = meta["depth"].as_u64().unwrap() as usize;
                let shortest = distances.get(name).copied();
                prop_assert!(shortest.is_some(), "{} unreachable from {}", name, entry);
                prop_assert!(shortest.unwrap() <= depth);
                prop_assert!(depth < max_depth);
            }
        }
    }

    #[test]
    fn subgraph_lines_are_balanced(
        (n, edges, placement) in graph_strategy(),
        max_per_class in 1usize..10,
    ) {
        let (symbols, graph) = build(n, &edges, &placement);
        let mut nodes = NodeManager::new(LabelLevel::Verbose);
        let limits = CollectionLimits { max_depth: 6, max_nodes: 100, max_calls_per_function: 5 };
        for name in graph.callers() {
            nodes.collect_functions_recursive(name, &graph, &symbols, &limits, 0);
        }

        let collected: Vec<&Symbol> = nodes
            .nodes()
            .filter_map(|r| symbols.get(&r.qualified_name))
            .collect();
        let tree = DirectoryTree::from_symbols(collected, None);
        let out = SubgraphBuilder::new(max_per_class).build(&tree, &nodes);

        let opened = out.lines.iter().filter(|l| l.trim_start().starts_with("subgraph ")).count();
        let closed = out.lines.iter().filter(|l| l.trim() == "end").count();
        prop_assert_eq!(opened, closed);
        prop_assert_eq!(opened, out.subgraphs.len());

        for line in &out.lines {
            let leading = line.len() - line.trim_start().len();
            prop_assert_eq!(leading % 4, 0);
        }
    }

    #[test]
    fn verbose_label_line_range(start in 1u32..5000, span in 0u32..200) {
        let symbol = Symbol::new("m.Cls.go", "pkg/m.py", start, start + span).with_class("Cls");
        let label = LabelFormatter::format("m.Cls.go", Some(&symbol), LabelLevel::Verbose);
        if span > 0 {
            let expected = format!("L{}-{}", start, start + span);
            prop_assert!(label.contains(&expected));
        } else {
            let expected = format!("L{}", start);
            prop_assert!(label.ends_with(&expected));
            let dashed = format!("L{}-", start);
            prop_assert!(!label.contains(&dashed));
        }
    }
}

#[test]
fn scenario_helper_created_once() {
    let symbols: SymbolTable = vec![
        Symbol::new("A.main", "a.py", 1, 4).entry(),
        Symbol::new("A.helper", "a.py", 6, 8),
    ]
    .into_iter()
    .collect();
    let graph: CallGraph = vec![("A.main", vec!["A.helper", "A.helper"]), ("A.helper", vec![])]
        .into_iter()
        .collect();

    let mut nodes = NodeManager::new(LabelLevel::Minimal);
    let limits = CollectionLimits {
        max_depth: 5,
        max_nodes: 10,
        max_calls_per_function: 5,
    };
    let collected = nodes.collect_functions_recursive("A.main", &graph, &symbols, &limits, 0);
    assert_eq!(collected.len(), 2);
    assert_eq!(nodes.node_count(), 2);
    assert_eq!(nodes.metadata().get_stats_summary().total_nodes, 2);
}

#[test]
fn scenario_single_entry_point_in_chain() {
    let graph: CallGraph = vec![("x", vec!["y"]), ("y", vec!["z"]), ("z", vec![])]
        .into_iter()
        .collect();
    let entries = EntryPointDetector::new(10).detect(&graph, &SymbolTable::new());
    let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["x"]);
}
