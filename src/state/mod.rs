//! Resumable decoder state.
//!
//! [`DecoderState`] is the record a Brotli bitstream parser reads and writes
//! on every decode step. Between steps it captures all progress, so a caller
//! may feed input in chunks of any size.
//!
//! Lifecycle:
//!
//! ```text
//! new / with_options ─► decode_stream_header ─► ┌ metablock_begin
//!                                               │   … parser fills maps, tree groups, ring buffer …
//!                                               └ cleanup_after_metablock  (repeat per metablock)
//!                                             ─► cleanup (also run on drop)
//! ```
//!
//! Heap memory is obtained through the state's [`MemoryManager`] only.
//! `cleanup_after_metablock` and `cleanup` are idempotent.

mod header;
mod maps;
pub mod types;

pub use header::encode_window_bits;
pub use types::{
    ContextMapKind, ContextMode, ContextMapState, DecodeUint8State, HuffmanState,
    MetablockHeaderState, ReadBlockLengthState, RunningState, StepResult, TreeGroupKind,
    TreeGroupState, UncompressedState,
};

use crate::arena::SplitArena;
use crate::bit_reader::BitReader;
use crate::config::{DecoderOptions, BLOCK_LENGTH_SENTINEL, DISTANCE_RING_BUFFER_INIT};
use crate::error::DecoderError;
use crate::huffman::{HuffmanTreeGroup, HUFFMAN_MAX_CODE_LENGTH, NUM_COMMAND_SYMBOLS};
use crate::margin::MarginArray;
use crate::memory::{AllocFunc, FreeFunc, ManagedBlock, MemoryManager, Opaque};
use crate::transform::{MtfTable, MTF_UPPER_BOUND_INIT};

/// Left margin of the symbol lists: one list head per code length `0..=15`
/// lives at logical indices `-16..=-1`.
pub const SYMBOL_LISTS_MARGIN: usize = HUFFMAN_MAX_CODE_LENGTH + 1;

/// Per-code-length symbol chains used while building a Huffman table.
pub type SymbolLists = MarginArray<u16, SYMBOL_LISTS_MARGIN, NUM_COMMAND_SYMBOLS>;

/// Mutable state of one Brotli stream.
///
/// Fields are public: the bitstream parser works on them directly. Owned heap
/// blocks are private and reachable through accessors so that every one of
/// them is released through the memory manager.
pub struct DecoderState<'d> {
    mm: MemoryManager,

    pub br: BitReader,

    pub state: RunningState,
    pub substate_metablock_header: MetablockHeaderState,
    pub substate_tree_group: TreeGroupState,
    pub substate_context_map: ContextMapState,
    pub substate_uncompressed: UncompressedState,
    pub substate_huffman: HuffmanState,
    pub substate_decode_uint8: DecodeUint8State,
    pub substate_read_block_length: ReadBlockLengthState,

    /// First failure seen; further steps report it again.
    pub error_code: Option<DecoderError>,

    pub buffer_length: u32,
    pub loop_counter: i32,
    pub sub_loop_counter: u32,
    /// Ring-buffer write position.
    pub pos: usize,
    pub rb_roundtrips: usize,
    pub partial_pos_out: usize,
    pub meta_block_remaining_len: i32,

    ringbuffer: Option<ManagedBlock>,
    pub ringbuffer_size: usize,
    pub ringbuffer_mask: usize,

    /// Block-type trees (head) and block-length trees (tail), shared by all
    /// metablocks of the stream.
    block_trees: Option<SplitArena>,

    context_modes: Option<ManagedBlock>,
    context_map: Option<ManagedBlock>,
    dist_context_map: Option<ManagedBlock>,
    /// Offset of the current literal block type's row in `context_map`.
    pub context_map_slice: Option<usize>,
    /// Offset of the current distance block type's row in `dist_context_map`.
    pub dist_context_map_slice: Option<usize>,

    pub literal_hgroup: HuffmanTreeGroup,
    pub insert_copy_hgroup: HuffmanTreeGroup,
    pub distance_hgroup: HuffmanTreeGroup,

    pub literal_htree_index: u8,
    /// Start offset (in entries) of the active literal table.
    pub literal_htree: Option<u32>,
    pub dist_htree_index: u8,
    /// Offsets into the shared context lookup table for the active literal block type.
    pub context_lookup1: Option<usize>,
    pub context_lookup2: Option<usize>,

    pub num_literal_htrees: u32,
    pub num_dist_htrees: u32,
    pub distance_postfix_bits: u32,
    pub num_direct_distance_codes: u32,

    custom_dict: Option<&'d [u8]>,

    pub is_last_metablock: bool,
    pub is_uncompressed: bool,
    pub is_metadata: bool,
    pub window_bits: u32,
    pub max_distance: i32,
    pub max_backward_distance: i32,
    pub max_backward_distance_minus_custom_dict_size: i32,

    pub dist_rb: [i32; 4],
    pub dist_rb_idx: usize,

    pub block_length: [u32; 3],
    pub num_block_types: [u32; 3],
    /// Two slots (previous, current) per block category.
    pub block_type_rb: [u32; 6],

    pub symbol_lists: SymbolLists,
    pub mtf: MtfTable,
    pub mtf_upper_bound: u32,
}

impl<'d> DecoderState<'d> {
    /// State backed by the default heap allocator.
    pub fn new() -> Self {
        Self::with_memory_manager(MemoryManager::default())
    }

    /// State backed by a caller-supplied hook pair. Without `alloc_fn` the
    /// default heap pair is installed.
    pub fn with_custom_allocators(alloc_fn: Option<AllocFunc>, free_fn: Option<FreeFunc>, opaque: Opaque) -> Self {
        Self::with_memory_manager(MemoryManager::from_fns(alloc_fn, free_fn, opaque))
    }

    pub fn with_options(options: DecoderOptions<'d>) -> Self {
        let mut s = Self::with_memory_manager(options.memory.unwrap_or_default());
        s.custom_dict = options.custom_dict;
        s
    }

    /// Primes every field. Performs no allocation.
    pub fn with_memory_manager(mm: MemoryManager) -> Self {
        DecoderState {
            mm,
            br: BitReader::new(),
            state: RunningState::Uninited,
            substate_metablock_header: MetablockHeaderState::None,
            substate_tree_group: TreeGroupState::None,
            substate_context_map: ContextMapState::None,
            substate_uncompressed: UncompressedState::None,
            substate_huffman: HuffmanState::None,
            substate_decode_uint8: DecodeUint8State::None,
            substate_read_block_length: ReadBlockLengthState::None,
            error_code: None,
            buffer_length: 0,
            loop_counter: 0,
            sub_loop_counter: 0,
            pos: 0,
            rb_roundtrips: 0,
            partial_pos_out: 0,
            meta_block_remaining_len: 0,
            ringbuffer: None,
            ringbuffer_size: 0,
            ringbuffer_mask: 0,
            block_trees: None,
            context_modes: None,
            context_map: None,
            dist_context_map: None,
            context_map_slice: None,
            dist_context_map_slice: None,
            literal_hgroup: HuffmanTreeGroup::new(),
            insert_copy_hgroup: HuffmanTreeGroup::new(),
            distance_hgroup: HuffmanTreeGroup::new(),
            literal_htree_index: 0,
            literal_htree: None,
            dist_htree_index: 0,
            context_lookup1: None,
            context_lookup2: None,
            num_literal_htrees: 0,
            num_dist_htrees: 0,
            distance_postfix_bits: 0,
            num_direct_distance_codes: 0,
            custom_dict: None,
            is_last_metablock: false,
            is_uncompressed: false,
            is_metadata: false,
            window_bits: 0,
            max_distance: 0,
            max_backward_distance: 0,
            max_backward_distance_minus_custom_dict_size: 0,
            dist_rb: DISTANCE_RING_BUFFER_INIT,
            dist_rb_idx: 0,
            block_length: [BLOCK_LENGTH_SENTINEL; 3],
            num_block_types: [1; 3],
            block_type_rb: [1, 0, 1, 0, 1, 0],
            symbol_lists: SymbolLists::new(),
            mtf: MtfTable::new(),
            mtf_upper_bound: MTF_UPPER_BOUND_INIT,
        }
    }

    /// The memory manager every owned block goes through.
    #[inline]
    pub fn memory(&self) -> &MemoryManager {
        &self.mm
    }

    #[inline]
    pub fn custom_dict(&self) -> Option<&'d [u8]> {
        self.custom_dict
    }

    /// Installs a dictionary used as history before the first stream byte.
    /// Only valid before any input has been consumed.
    pub fn set_custom_dictionary(&mut self, dict: &'d [u8]) -> Result<(), DecoderError> {
        if !self.is_stream_start() {
            return Err(DecoderError::InvalidArguments);
        }
        self.custom_dict = Some(dict);
        Ok(())
    }

    // ── Metablock lifecycle ─────────────────────────────────────────────────

    /// Resets per-metablock fields before a new metablock header is parsed.
    ///
    /// The bit reader, ring buffer and block-type trees persist. Per-metablock
    /// blocks should already have been released by
    /// [`cleanup_after_metablock`](Self::cleanup_after_metablock); any left
    /// over are released here rather than leaked.
    pub fn metablock_begin(&mut self) {
        if self.has_metablock_allocations() {
            crate::displaylevel!(4, "brotli-state: metablock_begin released leftover metablock data\n");
            self.cleanup_after_metablock();
        }
        self.meta_block_remaining_len = 0;
        self.block_length = [BLOCK_LENGTH_SENTINEL; 3];
        self.num_block_types = [1; 3];
        self.block_type_rb = [1, 0, 1, 0, 1, 0];
        self.context_map_slice = None;
        self.dist_context_map_slice = None;
        self.literal_htree_index = 0;
        self.literal_htree = None;
        self.dist_htree_index = 0;
        self.context_lookup1 = None;
        self.context_lookup2 = None;
        self.literal_hgroup = HuffmanTreeGroup::new();
        self.insert_copy_hgroup = HuffmanTreeGroup::new();
        self.distance_hgroup = HuffmanTreeGroup::new();
    }

    /// Releases context maps and the three tree groups. Idempotent.
    pub fn cleanup_after_metablock(&mut self) {
        self.mm.free_slot(&mut self.context_modes);
        self.mm.free_slot(&mut self.context_map);
        self.mm.free_slot(&mut self.dist_context_map);
        self.literal_hgroup.release(&self.mm);
        self.insert_copy_hgroup.release(&self.mm);
        self.distance_hgroup.release(&self.mm);
    }

    /// Releases everything the state owns. Idempotent; also run on drop.
    pub fn cleanup(&mut self) {
        self.cleanup_after_metablock();
        self.mm.free_slot(&mut self.ringbuffer);
        if let Some(trees) = self.block_trees.take() {
            trees.release(&self.mm);
        }
    }

    /// No input consumed yet.
    #[inline]
    pub fn is_stream_start(&self) -> bool {
        self.state == RunningState::Uninited && self.br.available_bits() == 0
    }

    #[inline]
    pub fn is_stream_end(&self) -> bool {
        self.state == RunningState::Done
    }

    fn has_metablock_allocations(&self) -> bool {
        self.context_modes.is_some()
            || self.context_map.is_some()
            || self.dist_context_map.is_some()
            || self.literal_hgroup.is_allocated()
            || self.insert_copy_hgroup.is_allocated()
            || self.distance_hgroup.is_allocated()
    }

    /// Bytes currently held through the memory manager.
    pub fn allocated_bytes(&self) -> usize {
        let block = |b: &Option<ManagedBlock>| b.as_ref().map_or(0, |b| b.len());
        block(&self.ringbuffer)
            + block(&self.context_modes)
            + block(&self.context_map)
            + block(&self.dist_context_map)
            + self.block_trees.as_ref().map_or(0, |a| a.len())
            + self.literal_hgroup.allocated_bytes()
            + self.insert_copy_hgroup.allocated_bytes()
            + self.distance_hgroup.allocated_bytes()
    }

    // ── Distance history ────────────────────────────────────────────────────

    /// Records `distance` as the most recent back-reference distance.
    #[inline]
    pub fn push_distance(&mut self, distance: i32) {
        self.dist_rb[self.dist_rb_idx & 3] = distance;
        self.dist_rb_idx = self.dist_rb_idx.wrapping_add(1);
    }

    /// Distance used `n` back-references ago (`n = 0` is the latest), `n < 4`.
    #[inline]
    pub fn last_distance(&self, n: usize) -> i32 {
        debug_assert!(n < 4);
        self.dist_rb[self.dist_rb_idx.wrapping_sub(1 + n) & 3]
    }

    // ── Symbol lists ────────────────────────────────────────────────────────

    #[inline]
    pub fn symbol_list(&self, i: isize) -> Option<u16> {
        self.symbol_lists.get(i)
    }

    #[inline]
    pub fn set_symbol_list(&mut self, i: isize, v: u16) -> bool {
        self.symbol_lists.set(i, v)
    }
}

impl Default for DecoderState<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DecoderState<'_> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl std::fmt::Debug for DecoderState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderState")
            .field("state", &self.state)
            .field("window_bits", &self.window_bits)
            .field("available_bits", &self.br.available_bits())
            .field("ringbuffer_size", &self.ringbuffer_size)
            .field("dist_rb", &self.dist_rb)
            .field("dist_rb_idx", &self.dist_rb_idx)
            .field("allocated_bytes", &self.allocated_bytes())
            .field("error_code", &self.error_code)
            .finish()
    }
}
