// bench.rs: `brstate bench`, parallel lifecycle runs over one shared allocator
//
// Each iteration builds a fresh state, decodes a synthetic header, allocates
// every per-stream and per-metablock structure, runs the context-map
// transform and selectors, then tears everything down. All states share one
// tracking allocator, so a single balance check at the end covers every run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use rayon::prelude::*;

use crate::cli::args::BenchArgs;
use crate::config::{default_nb_workers, LITERAL_CONTEXT_BITS, DISTANCE_CONTEXT_BITS, NB_WORKERS_MAX};
use crate::error::DecoderError;
use crate::memory::{AllocStats, MemoryManager, TrackingAllocator};
use crate::state::{encode_window_bits, ContextMapKind, DecoderState, StepResult};

// Shape of the synthetic metablock.
const LITERAL_BLOCK_TYPES: u32 = 2;
const LITERAL_HTREES: u32 = 4;
const DIST_HTREES: u32 = 2;
const COMMAND_BLOCK_TYPES: u32 = 2;

#[derive(Debug, Clone, Copy)]
pub struct BenchReport {
    pub iterations: usize,
    pub threads: usize,
    pub elapsed: Duration,
    pub stats: AllocStats,
}

impl BenchReport {
    pub fn lifecycles_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.iterations as f64 / secs
        } else {
            f64::INFINITY
        }
    }
}

/// One complete stream lifecycle: header, one metablock, teardown.
pub fn run_lifecycle(mm: &MemoryManager, header: u8, seed: usize) -> Result<(), DecoderError> {
    let mut s = DecoderState::with_memory_manager(mm.clone());
    let mut input: &[u8] = &[header];
    if s.decode_stream_header(&mut input)? != StepResult::Success {
        return Err(DecoderError::InvalidArguments);
    }

    s.metablock_begin();
    s.is_last_metablock = true;
    s.meta_block_remaining_len = 1 << 12;
    s.allocate_ring_buffer()?;
    s.allocate_block_type_trees()?;

    s.num_block_types = [LITERAL_BLOCK_TYPES, COMMAND_BLOCK_TYPES, 1];
    s.num_literal_htrees = LITERAL_HTREES;
    s.num_dist_htrees = DIST_HTREES;
    s.init_tree_groups()?;

    s.allocate_context_modes(LITERAL_BLOCK_TYPES as usize)?;
    if let Some(modes) = s.context_modes_mut() {
        for (i, m) in modes.iter_mut().enumerate() {
            *m = ((seed + i) & 3) as u8;
        }
    }
    s.allocate_context_map((LITERAL_BLOCK_TYPES as usize) << LITERAL_CONTEXT_BITS)?;
    if let Some(map) = s.context_map_mut() {
        for (i, v) in map.iter_mut().enumerate() {
            *v = ((i + seed) % LITERAL_HTREES as usize) as u8;
        }
    }
    s.allocate_dist_context_map(1 << DISTANCE_CONTEXT_BITS)?;
    s.inverse_move_to_front_transform(ContextMapKind::Literal)?;
    s.inverse_move_to_front_transform(ContextMapKind::Distance)?;

    s.select_literal_context_map(1)?;
    s.select_dist_context_map(0)?;
    s.push_distance(seed as i32 + 1);

    s.cleanup_after_metablock();
    s.cleanup();
    Ok(())
}

/// Runs `iterations` lifecycles on `threads` workers.
pub fn bench(iterations: usize, threads: usize, window_bits: u32) -> Result<BenchReport> {
    let header = encode_window_bits(window_bits)
        .ok_or_else(|| anyhow!("window bits must be in 10..=24, got {window_bits}"))?;
    let threads = threads.clamp(1, NB_WORKERS_MAX);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("cannot start worker pool")?;

    let tracker = Arc::new(TrackingAllocator::new());
    let mm = MemoryManager::new(tracker.clone());

    let start = Instant::now();
    pool.install(|| (0..iterations).into_par_iter().try_for_each(|i| run_lifecycle(&mm, header, i)))
        .context("lifecycle failed")?;
    let elapsed = start.elapsed();

    let stats = tracker.stats();
    if !stats.is_balanced() {
        bail!("leak detected after {iterations} lifecycles: {stats:?}");
    }
    Ok(BenchReport { iterations, threads, elapsed, stats })
}

pub fn run(args: &BenchArgs) -> Result<()> {
    let threads = args.threads.unwrap_or_else(default_nb_workers);
    crate::displaylevel!(3, "running {} lifecycles on {} threads\n", args.iterations, threads);
    let r = bench(args.iterations, threads, args.window_bits)?;
    crate::displayout!(
        "{} lifecycles, {} threads, {:.3} ms, {:.0} lifecycles/s\n",
        r.iterations,
        r.threads,
        r.elapsed.as_secs_f64() * 1000.0,
        r.lifecycles_per_sec()
    );
    crate::displayout!(
        "allocations {}, frees {}, peak {} bytes, balanced\n",
        r.stats.allocations,
        r.stats.frees,
        r.stats.peak_bytes
    );
    Ok(())
}
