// Command-line entry point for codeflow.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use codeflow::config::GenerationConfig;
use codeflow::domain::validator::DiagramValidator;
use codeflow::infrastructure::concurrency::{build_thread_pool, generate_batch, generate_one, BatchJob};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a code flow diagram from symbol table / call graph JSON
    Generate(GenerateArgs),
    /// Validate an existing diagram document
    Check {
        /// Diagram markdown file
        diagram: PathBuf,

        /// Config file (TOML) providing validator limits
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Input JSON document(s) with `symbol_table` and `call_graph`
    #[arg(short, long, required = true)]
    input: Vec<PathBuf>,

    /// Output file (one input) or directory (several inputs)
    #[arg(short, long)]
    output: PathBuf,

    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    max_nodes: Option<usize>,

    #[arg(long)]
    max_depth: Option<usize>,

    #[arg(long)]
    max_entry_points: Option<usize>,

    /// auto, minimal, simple, medium, detailed or verbose
    #[arg(long)]
    label_format: Option<String>,

    /// default, dark, pastel or mono
    #[arg(long)]
    theme: Option<String>,

    /// TD, TB, BT, LR or RL
    #[arg(long)]
    direction: Option<String>,

    #[arg(long)]
    title: Option<String>,

    /// Worker threads for several inputs
    #[arg(long)]
    threads: Option<usize>,

    /// Print the metadata stats summary as JSON
    #[arg(long)]
    stats: bool,
}

impl GenerateArgs {
    fn apply(&self, config: &mut GenerationConfig) {
        if let Some(n) = self.max_nodes {
            config.max_nodes = n;
        }
        if let Some(n) = self.max_depth {
            config.max_collection_depth = n;
        }
        if let Some(n) = self.max_entry_points {
            config.max_entry_points = n;
        }
        if let Some(format) = &self.label_format {
            config.label_format = format.clone();
        }
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
        if let Some(direction) = &self.direction {
            config.direction = direction.clone();
        }
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "codeflow=debug" } else { "codeflow=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<GenerationConfig> {
    GenerationConfig::load(path).context("Failed to load configuration")
}

/// One job per input. Several inputs write `<output>/<stem>.md` each; two
/// inputs sharing a stem would race on one file, so that is rejected.
fn plan_jobs(inputs: &[PathBuf], output: &Path) -> Result<Vec<BatchJob>> {
    if let [input] = inputs {
        return Ok(vec![BatchJob {
            input: input.clone(),
            output: output.to_path_buf(),
        }]);
    }

    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut jobs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "diagram".to_string());
        let target = output.join(format!("{}.md", stem));
        if let Some(previous) = claimed.insert(target.clone(), input) {
            bail!(
                "{} and {} would both write {}",
                previous.display(),
                input.display(),
                target.display()
            );
        }
        jobs.push(BatchJob {
            input: input.clone(),
            output: target,
        });
    }
    Ok(jobs)
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate().context("Invalid option")?;

    let jobs = plan_jobs(&args.input, &args.output)?;
    let results = if jobs.len() == 1 {
        vec![(jobs[0].clone(), generate_one(&jobs[0], &config))]
    } else {
        let pool = build_thread_pool(args.threads)?;
        generate_batch(&pool, &jobs, &config)
    };

    let mut failures = 0;
    for (job, result) in &results {
        match result {
            Ok(report) => {
                println!(
                    "Diagram written to {} ({} nodes, {} edges, {} subgraphs)",
                    report.output_path.display(),
                    report.counts.nodes,
                    report.counts.edges,
                    report.counts.subgraphs_opened
                );
                if let Some(path) = &report.metadata_path {
                    println!("Metadata written to {}", path.display());
                }
                if args.stats {
                    if let Some(stats) = &report.stats {
                        println!("{}", serde_json::to_string_pretty(stats)?);
                    }
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("Error: {}: {}", job.input.display(), e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} diagram(s) failed", failures, results.len());
    }
    Ok(())
}

fn check(diagram: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let text = fs::read_to_string(diagram)
        .with_context(|| format!("Cannot read diagram {}", diagram.display()))?;
    let counts = DiagramValidator::new(config.limits)
        .validate(&text)
        .with_context(|| format!("{} failed validation", diagram.display()))?;
    println!(
        "{} is valid ({} nodes, {} edges, {} subgraphs, {} chars)",
        diagram.display(),
        counts.nodes,
        counts.edges,
        counts.subgraphs_opened,
        counts.size
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Generate(args) => generate(args),
        Command::Check { diagram, config } => check(diagram, config.as_deref()),
    }
}
