// Integration tests for context maps, block-type trees and the
// move-to-front pass over decoded maps.

use std::sync::Arc;

use brotli_state::config::{DISTANCE_CONTEXT_BITS, LITERAL_CONTEXT_BITS};
use brotli_state::huffman::{HUFFMAN_CODE_SIZE, HUFFMAN_MAX_SIZE_258, HUFFMAN_MAX_SIZE_26};
use brotli_state::state::{ContextMapKind, ContextMode, TreeGroupKind};
use brotli_state::{DecoderError, DecoderState, MemoryManager, TrackingAllocator};

fn tracked() -> (Arc<TrackingAllocator>, DecoderState<'static>) {
    let t = Arc::new(TrackingAllocator::new());
    (t.clone(), DecoderState::with_memory_manager(MemoryManager::new(t)))
}

#[test]
fn block_type_trees_are_one_block_with_two_views() {
    let (t, mut s) = tracked();
    s.allocate_block_type_trees().unwrap();
    let types = s.block_type_trees().unwrap();
    let lens = s.block_len_trees().unwrap();
    assert_eq!(types.len(), 3 * HUFFMAN_MAX_SIZE_258 * HUFFMAN_CODE_SIZE);
    assert_eq!(lens.len(), 3 * HUFFMAN_MAX_SIZE_26 * HUFFMAN_CODE_SIZE);
    assert_eq!(types.as_ptr() as usize + types.len(), lens.as_ptr() as usize);
    assert!(t.is_live(types.as_ptr()));
    assert_eq!(t.stats().allocations, 1);
}

#[test]
fn block_type_trees_oom() {
    let t = Arc::new(TrackingAllocator::with_limit(1024));
    let mut s = DecoderState::with_memory_manager(MemoryManager::new(t));
    assert_eq!(s.allocate_block_type_trees(), Err(DecoderError::AllocBlockTypeTrees));
    assert!(s.block_type_trees().is_none());
}

#[test]
fn context_allocations_report_their_own_errors() {
    let t = Arc::new(TrackingAllocator::with_limit(16));
    let mut s = DecoderState::with_memory_manager(MemoryManager::new(t.clone()));
    assert_eq!(s.allocate_context_modes(32), Err(DecoderError::AllocContextModes));
    assert_eq!(s.allocate_context_map(64), Err(DecoderError::AllocContextMap));
    assert_eq!(s.allocate_dist_context_map(64), Err(DecoderError::AllocContextMap));
    assert!(s.context_modes().is_none());
    assert!(s.context_map().is_none());
    assert!(s.dist_context_map().is_none());
    assert_eq!(t.stats().failures, 3);
}

#[test]
fn selecting_block_types_walks_the_map() {
    let (_t, mut s) = tracked();
    s.metablock_begin();
    s.num_block_types = [3, 1, 2];
    s.num_literal_htrees = 3;
    s.num_dist_htrees = 2;
    s.init_tree_groups().unwrap();
    for tree in 0..3u32 {
        assert!(s.literal_hgroup.set_htree(tree as usize, tree * 630));
    }

    s.allocate_context_modes(3).unwrap();
    s.context_modes_mut().unwrap().copy_from_slice(&[
        ContextMode::Lsb6 as u8,
        ContextMode::Msb6 as u8,
        ContextMode::Signed as u8,
    ]);
    s.allocate_context_map(3 << LITERAL_CONTEXT_BITS).unwrap();
    {
        let map = s.context_map_mut().unwrap();
        map[0] = 0;
        map[64] = 1;
        map[128] = 2;
    }
    s.allocate_dist_context_map(2 << DISTANCE_CONTEXT_BITS).unwrap();
    s.dist_context_map_mut().unwrap()[4] = 1;

    s.select_literal_context_map(2).unwrap();
    assert_eq!(s.context_map_slice, Some(128));
    assert_eq!(s.literal_htree_index, 2);
    assert_eq!(s.literal_htree, Some(2 * 630));
    assert_eq!((s.context_lookup1, s.context_lookup2), (Some(768), Some(512)));

    s.select_literal_context_map(1).unwrap();
    assert_eq!((s.context_lookup1, s.context_lookup2), (Some(1280), Some(1536)));

    s.select_dist_context_map(1).unwrap();
    assert_eq!(s.dist_context_map_slice, Some(4));
    assert_eq!(s.dist_htree_index, 1);
}

#[test]
fn selection_without_maps_is_invalid() {
    let (_t, mut s) = tracked();
    assert_eq!(s.select_literal_context_map(0), Err(DecoderError::InvalidArguments));
    assert_eq!(s.select_dist_context_map(0), Err(DecoderError::InvalidArguments));
}

#[test]
fn distance_alphabet_follows_parameters() {
    let (_t, mut s) = tracked();
    s.metablock_begin();
    s.distance_postfix_bits = 2;
    s.num_direct_distance_codes = 24;
    s.num_literal_htrees = 1;
    s.num_dist_htrees = 1;
    assert_eq!(s.distance_alphabet_size(), 16 + 24 + (48 << 2));
    s.init_tree_groups().unwrap();
    assert_eq!(s.tree_group(TreeGroupKind::Distance).alphabet_size, 232);
    assert_eq!(s.tree_group(TreeGroupKind::InsertCopy).alphabet_size, 704);
    assert_eq!(s.tree_group(TreeGroupKind::Literal).alphabet_size, 256);
}

#[test]
fn move_to_front_bound_shrinks_reinitialisation() {
    let (_t, mut s) = tracked();
    s.allocate_context_map(6).unwrap();
    s.context_map_mut().unwrap().copy_from_slice(&[3, 3, 0, 1, 0, 2]);
    s.inverse_move_to_front_transform(ContextMapKind::Literal).unwrap();
    // 0123 -> 3012 -> 2301 -> 2301 -> 3201 -> 3201 -> 0321
    assert_eq!(s.context_map().unwrap(), &[3, 2, 2, 3, 3, 0]);
    assert_eq!(s.mtf_upper_bound, 3);

    s.allocate_dist_context_map(3).unwrap();
    s.dist_context_map_mut().unwrap().copy_from_slice(&[1, 1, 1]);
    s.inverse_move_to_front_transform(ContextMapKind::Distance).unwrap();
    assert_eq!(s.dist_context_map().unwrap(), &[1, 0, 1]);
    assert_eq!(s.mtf_upper_bound, 1);
}
