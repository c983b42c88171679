//! Benchmarks for bounded collection and diagram generation.
//!
//! Run with: `cargo bench`

use codeflow::application::{CodeFlowGenerator, CodeFlowInputs, GenerationDriver};
use codeflow::config::GenerationConfig;
use codeflow::domain::callgraph::CallGraph;
use codeflow::domain::label::LabelLevel;
use codeflow::domain::node_manager::{CollectionLimits, NodeManager};
use codeflow::domain::symbol::{Symbol, SymbolTable};
use codeflow::domain::validator::{DiagramLimits, DiagramValidator};
use codeflow::ports::DiagramGenerator;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ═══════════════════════════════════════════════════════════════════════════
// Synthetic Data Generators
// ═══════════════════════════════════════════════════════════════════════════

/// Create a synthetic project: `modules` files with `fns_per_module`
/// functions each, every function calling `fanout` functions in the next
/// module.
fn create_synthetic_project(modules: usize, fns_per_module: usize, fanout: usize) -> CodeFlowInputs {
    let mut symbols = SymbolTable::new();
    let mut graph = CallGraph::new();

    for m in 0..modules {
        let path = format!("pkg/sub_{}/mod_{}.py", m % 4, m);
        for f in 0..fns_per_module {
            let name = format!("pkg.mod_{}.Worker{}.fn_{}", m, f % 3, f);
            let line = (f * 10 + 1) as u32;
            symbols.insert(
                Symbol::new(&name, &path, line, line + 8).with_class(&format!("Worker{}", f % 3)),
            );
            graph.add_function(&name);

            if m + 1 < modules {
                for k in 0..fanout {
                    let target = (f + k) % fns_per_module;
                    let callee = format!("pkg.mod_{}.Worker{}.fn_{}", m + 1, target % 3, target);
                    graph.add_edge(&name, &callee);
                }
            }
        }
    }

    CodeFlowInputs::new(symbols, graph)
}

fn roomy_config() -> GenerationConfig {
    GenerationConfig {
        max_nodes: 400,
        max_collection_depth: 8,
        limits: DiagramLimits {
            max_nodes: 1000,
            max_edges: 5000,
            max_subgraphs: 500,
            max_size: 500_000,
        },
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Collection Benchmarks
// ═══════════════════════════════════════════════════════════════════════════

fn bench_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection/fanout");

    for fanout in [1, 3, 5, 8].iter() {
        let inputs = create_synthetic_project(20, 30, *fanout);
        let limits = CollectionLimits {
            max_depth: 8,
            max_nodes: 400,
            max_calls_per_function: 5,
        };
        group.throughput(Throughput::Elements(inputs.symbol_table.len() as u64));

        group.bench_with_input(BenchmarkId::new("fanout", fanout), &inputs, |b, inputs| {
            b.iter(|| {
                let mut nodes = NodeManager::new(LabelLevel::Medium);
                for entry in inputs.call_graph.callers().take(10) {
                    nodes.collect_functions_recursive(
                        black_box(entry),
                        &inputs.call_graph,
                        &inputs.symbol_table,
                        &limits,
                        0,
                    );
                }
                nodes.node_count()
            })
        });
    }

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Generation Benchmarks
// ═══════════════════════════════════════════════════════════════════════════

fn bench_generate_body(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate/body");
    group.sample_size(30);

    for modules in [5, 20, 50].iter() {
        let inputs = create_synthetic_project(*modules, 20, 3);

        group.bench_with_input(BenchmarkId::new("modules", modules), &inputs, |b, inputs| {
            b.iter(|| {
                let mut generator = CodeFlowGenerator::new(inputs.clone(), roomy_config());
                generator.generate_body().unwrap().len()
            })
        });
    }

    group.finish();
}

fn bench_render_and_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate/render");
    group.sample_size(30);

    let inputs = create_synthetic_project(20, 20, 3);
    let config = roomy_config();

    group.bench_function("render_validated", |b| {
        b.iter(|| {
            let mut generator = CodeFlowGenerator::new(inputs.clone(), config.clone());
            let writer = NullWriter;
            GenerationDriver::new(DiagramValidator::new(config.limits), &writer)
                .render(black_box(&mut generator))
                .unwrap()
                .counts
        })
    });

    group.finish();
}

struct NullWriter;

impl codeflow::ports::ArtifactWriter for NullWriter {
    fn write(&self, _path: &std::path::Path, _contents: &str) -> std::io::Result<()> {
        Ok(())
    }
}

criterion_group!(
    benches,
    bench_collection,
    bench_generate_body,
    bench_render_and_validate
);
criterion_main!(benches);
