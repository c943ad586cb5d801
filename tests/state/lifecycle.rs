// Integration tests for the DecoderState lifecycle:
//   new → metablock_begin → cleanup_after_metablock → metablock_begin → cleanup

use std::sync::Arc;

use brotli_state::config::{BLOCK_LENGTH_SENTINEL, DISTANCE_RING_BUFFER_INIT};
use brotli_state::state::{
    ContextMapState, DecodeUint8State, HuffmanState, MetablockHeaderState, ReadBlockLengthState,
    TreeGroupKind, TreeGroupState, UncompressedState,
};
use brotli_state::transform::MTF_UPPER_BOUND_INIT;
use brotli_state::{DecoderState, MemoryManager, RunningState, TrackingAllocator};

use super::counting::counting_state;

// ─────────────────────────────────────────────────────────────────────────────
// Construction
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn fresh_state_is_stream_start_not_end() {
    let (_c, s) = counting_state();
    assert!(s.is_stream_start());
    assert!(!s.is_stream_end());

    let s = DecoderState::new();
    assert!(s.is_stream_start());
    assert!(!s.is_stream_end());
}

#[test]
fn fresh_state_primes_every_field() {
    let s = DecoderState::new();
    assert_eq!(s.state, RunningState::Uninited);
    assert_eq!(s.substate_metablock_header, MetablockHeaderState::None);
    assert_eq!(s.substate_tree_group, TreeGroupState::None);
    assert_eq!(s.substate_context_map, ContextMapState::None);
    assert_eq!(s.substate_uncompressed, UncompressedState::None);
    assert_eq!(s.substate_huffman, HuffmanState::None);
    assert_eq!(s.substate_decode_uint8, DecodeUint8State::None);
    assert_eq!(s.substate_read_block_length, ReadBlockLengthState::None);
    assert_eq!((s.buffer_length, s.loop_counter, s.pos, s.rb_roundtrips), (0, 0, 0, 0));
    assert!(s.ring_buffer().is_none());
    assert!(s.context_map().is_none());
    assert!(s.dist_context_map().is_none());
    assert!(s.custom_dict().is_none());
    assert!(s.error_code.is_none());
    assert_eq!(s.mtf_upper_bound, MTF_UPPER_BOUND_INIT);
    assert_eq!(s.allocated_bytes(), 0);
}

#[test]
fn distance_ring_buffer_defaults() {
    let s = DecoderState::new();
    assert_eq!(s.dist_rb, [16, 15, 11, 4]);
    assert_eq!(s.dist_rb, DISTANCE_RING_BUFFER_INIT);
    assert_eq!(s.dist_rb_idx, 0);
}

#[test]
fn construction_allocates_nothing() {
    let (c, s) = counting_state();
    drop(s);
    assert_eq!(c.allocs(), 0);
    assert_eq!(c.frees(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// metablock_begin
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn metablock_begin_resets_block_state() {
    let mut s = DecoderState::new();
    s.block_type_rb = [9; 6];
    s.block_length = [7; 3];
    s.num_block_types = [3; 3];
    s.meta_block_remaining_len = 12;
    s.literal_htree_index = 5;
    s.metablock_begin();
    assert_eq!(s.block_type_rb, [1, 0, 1, 0, 1, 0]);
    assert_eq!(s.block_length, [1 << 28; 3]);
    assert_eq!(s.block_length, [BLOCK_LENGTH_SENTINEL; 3]);
    assert_eq!(s.num_block_types, [1; 3]);
    assert_eq!(s.meta_block_remaining_len, 0);
    assert_eq!(s.literal_htree_index, 0);
    assert!(s.literal_htree.is_none());
    assert!(s.context_map_slice.is_none());
    assert!(s.dist_context_map_slice.is_none());
    assert!(s.context_lookup1.is_none());
}

#[test]
fn metablock_begin_keeps_stream_level_buffers() {
    let mut s = DecoderState::new();
    s.window_bits = 16;
    s.allocate_ring_buffer().unwrap();
    s.allocate_block_type_trees().unwrap();
    s.push_distance(77);
    let rb = s.ring_buffer_ptr();
    s.metablock_begin();
    assert_eq!(s.ring_buffer_ptr(), rb);
    assert!(s.block_type_trees().is_some());
    assert_eq!(s.last_distance(0), 77);
}

// ─────────────────────────────────────────────────────────────────────────────
// Round trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn round_trip_leaves_groups_empty_between_metablocks() {
    let (c, mut s) = counting_state();
    s.metablock_begin();
    s.num_literal_htrees = 2;
    s.num_dist_htrees = 1;
    s.init_tree_groups().unwrap();
    s.allocate_context_map(128).unwrap();
    assert!(s.literal_hgroup.codes_ptr().is_some());

    s.cleanup_after_metablock();
    for kind in [TreeGroupKind::Literal, TreeGroupKind::InsertCopy, TreeGroupKind::Distance] {
        let g = s.tree_group(kind);
        assert!(!g.is_allocated());
        assert!(g.codes_ptr().is_none());
        assert!(g.htrees_ptr().is_none());
    }
    assert!(s.context_map().is_none());

    s.metablock_begin();
    s.init_tree_groups().unwrap();
    assert!(s.literal_hgroup.is_allocated());
    s.cleanup();
    assert_eq!(c.allocs(), c.frees());
    assert!(c.matched());
}

#[test]
fn cleanup_functions_are_idempotent() {
    let (c, mut s) = counting_state();
    s.window_bits = 10;
    s.allocate_ring_buffer().unwrap();
    s.metablock_begin();
    s.num_literal_htrees = 1;
    s.num_dist_htrees = 1;
    s.init_tree_groups().unwrap();
    s.cleanup_after_metablock();
    s.cleanup_after_metablock();
    s.cleanup();
    s.cleanup();
    drop(s);
    assert_eq!(c.allocs(), 4);
    assert_eq!(c.frees(), 4);
    assert!(c.matched());
}

#[test]
fn drop_releases_through_manager() {
    let t = Arc::new(TrackingAllocator::new());
    {
        let mut s = DecoderState::with_memory_manager(MemoryManager::new(t.clone()));
        s.window_bits = 12;
        s.allocate_ring_buffer().unwrap();
        s.allocate_block_type_trees().unwrap();
        s.metablock_begin();
        s.num_literal_htrees = 1;
        s.num_dist_htrees = 1;
        s.init_tree_groups().unwrap();
        s.allocate_context_modes(1).unwrap();
        s.allocate_dist_context_map(4).unwrap();
        assert_eq!(t.stats().live_blocks, 7);
    }
    let stats = t.stats();
    assert!(stats.is_balanced());
    assert_eq!(stats.allocations, stats.frees);
}

#[test]
fn stream_end_after_done() {
    let mut s = DecoderState::new();
    s.state = RunningState::Done;
    assert!(s.is_stream_end());
    assert!(!s.is_stream_start());
}

#[test]
fn custom_dictionary_only_at_stream_start() {
    let dict = b"history";
    let mut s = DecoderState::new();
    s.set_custom_dictionary(dict).unwrap();
    assert_eq!(s.custom_dict(), Some(&dict[..]));

    let mut input: &[u8] = &[0x00];
    s.decode_stream_header(&mut input).unwrap();
    assert_eq!(
        s.set_custom_dictionary(dict).unwrap_err().error_name(),
        "_ERROR_INVALID_ARGUMENTS"
    );
}
