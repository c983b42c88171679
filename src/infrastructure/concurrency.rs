//! Concurrency management for codeflow.
//! Batch generation runs one fully independent generator per input on a
//! rayon pool; generators share no state.

use crate::application::{CodeFlowGenerator, GenerationDriver, GenerationReport};
use crate::config::GenerationConfig;
use crate::domain::validator::DiagramValidator;
use crate::error::Result;
use crate::infrastructure::{load_inputs, FsArtifactWriter};
use anyhow::Context;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{info, warn};

/// One input document and where its diagram goes.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Build a rayon pool with controlled worker count.
/// Reserves ~50% of CPU capacity unless `threads` is given.
pub fn build_thread_pool(threads: Option<usize>) -> anyhow::Result<rayon::ThreadPool> {
    let cores = num_cpus::get();
    // Reserve 50% capacity, minimum 1 worker
    let workers = threads.unwrap_or_else(|| std::cmp::max(1, cores / 2)).max(1);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("codeflow-worker-{}", i))
        .build()
        .context("Failed to build generation thread pool")?;

    info!(
        "Initialized thread pool: {} workers (system has {} cores)",
        workers, cores
    );

    Ok(pool)
}

/// Generate one diagram. Each call builds its own generator and driver.
pub fn generate_one(job: &BatchJob, config: &GenerationConfig) -> Result<GenerationReport> {
    let inputs = load_inputs(&job.input)?;
    let mut generator = CodeFlowGenerator::new(inputs, config.clone());
    let writer = FsArtifactWriter;
    let driver = GenerationDriver::new(DiagramValidator::new(config.limits), &writer)
        .with_title(&config.title)
        .with_direction(&config.direction);
    driver.run(&mut generator, &job.output)
}

/// Generate every job on `pool`; results keep the order of `jobs`.
pub fn generate_batch(
    pool: &rayon::ThreadPool,
    jobs: &[BatchJob],
    config: &GenerationConfig,
) -> Vec<(BatchJob, Result<GenerationReport>)> {
    pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                let result = generate_one(job, config);
                if let Err(e) = &result {
                    warn!("{}: {}", job.input.display(), e);
                }
                (job.clone(), result)
            })
            .collect()
    })
}
