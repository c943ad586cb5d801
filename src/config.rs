// config.rs: Compile-time constants and runtime options.
//
// Stream-format constants that the lifecycle code depends on live here so the
// state, the CLI and the tests agree on them. Runtime configuration of a
// decoder is limited to the allocator and an optional custom dictionary,
// carried by `DecoderOptions`.

use crate::memory::MemoryManager;

// Smallest and largest window sizes a stream header may declare (log2 bytes).
pub const WINDOW_BITS_MIN: u32 = 10;
pub const WINDOW_BITS_MAX: u32 = 24;

// Extra bytes allocated past the end of the ring buffer so copies may run
// ahead of the wrap check.
pub const RING_BUFFER_WRITE_AHEAD_SLACK: usize = 542;

// Smallest ring buffer kept when shrinking for a short final metablock.
pub const RING_BUFFER_MIN_SHRINK: usize = 32;

// Block-length counter value meaning "no block switch pending".
pub const BLOCK_LENGTH_SENTINEL: u32 = 1 << 28;

// Initial distance history, most recent last-written first.
pub const DISTANCE_RING_BUFFER_INIT: [i32; 4] = [16, 15, 11, 4];

// Literal contexts per block type (log2) and distance contexts per block type (log2).
pub const LITERAL_CONTEXT_BITS: u32 = 6;
pub const DISTANCE_CONTEXT_BITS: u32 = 2;

// Alphabet sizes of the three tree groups.
pub const NUM_LITERAL_SYMBOLS: u32 = 256;
pub const NUM_INSERT_COPY_SYMBOLS: u32 = 704;
pub const NUM_DISTANCE_SHORT_CODES: u32 = 16;

// Default number of worker threads for `brstate bench`, overridable with the
// BRSTATE_NBWORKERS environment variable or `--threads`.
pub const NB_WORKERS_ENV: &str = "BRSTATE_NBWORKERS";
pub const NB_WORKERS_MAX: usize = 200;

// Default chunk size used by `brstate probe` to split its input.
pub const PROBE_CHUNK_SIZE_DEFAULT: usize = 1;

/// Worker count for parallel runs: `BRSTATE_NBWORKERS` when set to a valid
/// number, otherwise the logical core count, clamped to `1..=NB_WORKERS_MAX`.
pub fn default_nb_workers() -> usize {
    let from_env = std::env::var(NB_WORKERS_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0);
    from_env.unwrap_or_else(num_cpus::get).clamp(1, NB_WORKERS_MAX)
}

/// Ring-buffer size (without slack) for a window of `window_bits`.
#[inline]
pub fn window_size(window_bits: u32) -> usize {
    1usize << window_bits
}

/// Per-decoder runtime options.
///
/// `memory: None` selects the default heap allocator. `custom_dict` seeds the
/// back-reference history before the first byte of the stream; it is borrowed
/// and never freed by the decoder.
#[derive(Debug, Clone, Default)]
pub struct DecoderOptions<'d> {
    pub memory: Option<MemoryManager>,
    pub custom_dict: Option<&'d [u8]>,
}

impl<'d> DecoderOptions<'d> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory(mut self, mm: MemoryManager) -> Self {
        self.memory = Some(mm);
        self
    }

    pub fn with_custom_dict(mut self, dict: &'d [u8]) -> Self {
        self.custom_dict = Some(dict);
        self
    }
}
