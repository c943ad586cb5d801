// brotli-state: resumable Brotli decoder state and its memory management

pub mod cli;
pub mod config;
pub mod error;
pub mod memory;
pub mod arena;
pub mod huffman;
pub mod bit_reader;
pub mod margin;
pub mod transform;
pub mod state;

// ── Version ──────────────────────────────────────────────────────────────────
pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

// ── Public re-exports ────────────────────────────────────────────────────────
pub use config::DecoderOptions;
pub use error::DecoderError;
pub use huffman::{HuffmanCode, HuffmanTreeGroup};
pub use memory::{
    AllocFunc, AllocStats, Allocator, DefaultAllocator, FnAllocator, FreeFunc, ManagedBlock,
    MemoryManager, Opaque, TrackingAllocator,
};
pub use state::{DecoderState, RunningState, StepResult};
