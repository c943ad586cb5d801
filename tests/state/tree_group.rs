// Integration tests for HuffmanTreeGroup init/release.
//
// A tree group is a single allocation holding every decode table of the
// group (`codes`) followed by one offset slot per tree (`htrees`).

use brotli_state::huffman::{max_table_size, HTREE_SLOT_SIZE, HUFFMAN_CODE_SIZE, MAX_HUFFMAN_TABLE_SIZE};
use brotli_state::state::TreeGroupKind;
use brotli_state::{DecoderError, DecoderState, HuffmanCode, HuffmanTreeGroup, MemoryManager};

use super::counting::{counting_manager, counting_state};

#[test]
fn init_release_is_one_alloc_one_free() {
    let (c, mm) = counting_manager();
    let mut group = HuffmanTreeGroup::new();
    group.init(&mm, 256, 3).unwrap();
    assert_eq!(c.allocs(), 1);
    assert_eq!(c.frees(), 0);

    group.release(&mm);
    assert_eq!(c.allocs(), 1);
    assert_eq!(c.frees(), 1);
    assert!(c.matched());

    // Second release must not free again.
    group.release(&mm);
    assert_eq!(c.frees(), 1);
}

#[test]
fn htrees_sit_right_after_codes() {
    let (c, mut s) = counting_state();
    s.tree_group_init(TreeGroupKind::Literal, 4, 2).unwrap();

    let g = s.tree_group(TreeGroupKind::Literal);
    let max = g.max_table_size();
    assert_eq!(max, MAX_HUFFMAN_TABLE_SIZE[1] as usize);
    let codes = g.codes_ptr().expect("codes view");
    let htrees = g.htrees_ptr().expect("htrees view");
    let expected = 2 * max * HUFFMAN_CODE_SIZE;
    assert_eq!(htrees as usize - codes as usize, expected);
    assert_eq!(g.htrees_offset(), Some(expected));
    assert_eq!(g.allocated_bytes(), expected + 2 * HTREE_SLOT_SIZE);

    s.tree_group_release(TreeGroupKind::Literal);
    assert_eq!(c.allocs(), 1);
    assert_eq!(c.frees(), 1);
    assert!(c.matched());
}

#[test]
fn null_allocator_pair_installs_default() {
    let mut s = DecoderState::with_custom_allocators(None, None, None);
    assert!(s.memory().is_default());
    s.tree_group_init(TreeGroupKind::Distance, 64, 4).unwrap();
    assert!(s.tree_group(TreeGroupKind::Distance).is_allocated());
    s.tree_group_release(TreeGroupKind::Distance);
    assert!(!s.tree_group(TreeGroupKind::Distance).is_allocated());
}

#[test]
fn table_size_index_by_alphabet() {
    assert_eq!(max_table_size(1), Some(402));
    assert_eq!(max_table_size(32), Some(402));
    assert_eq!(max_table_size(33), Some(436));
    assert_eq!(max_table_size(256), Some(630));
    assert_eq!(max_table_size(704), Some(1080));
    assert_eq!(max_table_size(705), None);
}

#[test]
fn oversized_alphabet_is_invalid() {
    let mm = MemoryManager::default();
    let mut g = HuffmanTreeGroup::new();
    assert_eq!(g.init(&mm, 1000, 1), Err(DecoderError::InvalidArguments));
    assert!(!g.is_allocated());
}

#[test]
fn codes_and_slots_are_writable() {
    let mm = MemoryManager::default();
    let mut g = HuffmanTreeGroup::new();
    g.init(&mm, 256, 2).unwrap();
    let second = g.max_table_size() as u32;
    assert!(g.set_htree(0, 0));
    assert!(g.set_htree(1, second));
    assert!(!g.set_htree(2, 0));
    assert!(g.set_code(second as usize, HuffmanCode::new(7, 200)));

    assert_eq!(g.htree(1), Some(second));
    let first = g.table(1).unwrap().next();
    assert_eq!(first, Some(HuffmanCode::new(7, 200)));
    g.release(&mm);
}
