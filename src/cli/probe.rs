// probe.rs: `brstate probe`, header decode and stream-level allocation

use std::fs;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::cli::args::ProbeArgs;
use crate::config::{window_size, DecoderOptions};
use crate::memory::{AllocStats, MemoryManager, TrackingAllocator};
use crate::state::{DecoderState, StepResult};

/// What `probe` learned about one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub window_bits: u32,
    pub window_size: usize,
    pub ringbuffer_size: usize,
    /// Bytes handed to the decoder before the header completed.
    pub bytes_fed: usize,
    /// Number of decode steps (chunks) used.
    pub steps: usize,
    pub dict_len: usize,
    /// Bytes held by the state once the stream-level buffers exist.
    pub allocated_bytes: usize,
    /// Allocator counters after the state was dropped.
    pub stats: AllocStats,
}

/// Feeds `data` in `chunk_size` pieces until the stream header is decoded,
/// then allocates the ring buffer and block-type trees and tears everything
/// down again.
pub fn probe(data: &[u8], chunk_size: usize, dict: Option<&[u8]>, mem_limit: Option<usize>) -> Result<ProbeReport> {
    if chunk_size == 0 {
        bail!("chunk size must be at least 1");
    }
    let tracker = Arc::new(match mem_limit {
        Some(limit) => TrackingAllocator::with_limit(limit),
        None => TrackingAllocator::new(),
    });
    let mut options = DecoderOptions::new().with_memory(MemoryManager::new(tracker.clone()));
    if let Some(dict) = dict {
        options = options.with_custom_dict(dict);
    }

    let mut report = {
        let mut s = DecoderState::with_options(options);
        let mut result = StepResult::NeedsMoreInput;
        let mut bytes_fed = 0;
        let mut steps = 0;
        for chunk in data.chunks(chunk_size) {
            let mut input = chunk;
            steps += 1;
            result = s.decode_stream_header(&mut input).context("invalid stream header")?;
            bytes_fed += chunk.len() - input.len();
            crate::displaylevel!(4, "step {}: {:?}, {} bytes consumed\n", steps, result, bytes_fed);
            if result == StepResult::Success {
                break;
            }
        }
        if result != StepResult::Success {
            bail!("truncated stream header ({} bytes of input)", data.len());
        }

        s.metablock_begin();
        s.allocate_ring_buffer().context("cannot allocate the ring buffer")?;
        s.allocate_block_type_trees().context("cannot allocate block-type trees")?;

        let report = ProbeReport {
            window_bits: s.window_bits,
            window_size: window_size(s.window_bits),
            ringbuffer_size: s.ringbuffer_size,
            bytes_fed,
            steps,
            dict_len: s.custom_dict().map_or(0, <[u8]>::len),
            allocated_bytes: s.allocated_bytes(),
            stats: AllocStats::default(),
        };
        s.cleanup();
        report
    };

    report.stats = tracker.stats();
    if !report.stats.is_balanced() {
        bail!("leak detected: {:?}", report.stats);
    }
    Ok(report)
}

pub fn run(args: &ProbeArgs) -> Result<()> {
    let data = fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let dict = match &args.dict {
        Some(path) => Some(fs::read(path).with_context(|| format!("cannot read dictionary {}", path.display()))?),
        None => None,
    };
    crate::displaylevel!(3, "probing {} ({} bytes) in {}-byte steps\n", args.file.display(), data.len(), args.chunk_size);

    let r = probe(&data, args.chunk_size, dict.as_deref(), args.mem_limit)?;
    crate::displayout!("window_bits      {}\n", r.window_bits);
    crate::displayout!("window_size      {}\n", r.window_size);
    crate::displayout!("ringbuffer_size  {}\n", r.ringbuffer_size);
    crate::displayout!("dict_len         {}\n", r.dict_len);
    crate::displayout!("allocated_bytes  {}\n", r.allocated_bytes);
    crate::displayout!("allocations      {}\n", r.stats.allocations);
    crate::displayout!("frees            {}\n", r.stats.frees);
    crate::displayout!("peak_bytes       {}\n", r.stats.peak_bytes);
    crate::displaylevel!(3, "header decoded after {} bytes in {} steps\n", r.bytes_fed, r.steps);
    Ok(())
}
