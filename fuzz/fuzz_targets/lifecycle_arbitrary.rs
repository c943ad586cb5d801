#![no_main]
use libfuzzer_sys::fuzz_target;

use std::sync::Arc;

use brotli_state::state::ContextMapKind;
use brotli_state::{DecoderState, MemoryManager, TrackingAllocator};

fuzz_target!(|data: &[u8]| {
    // Interpret each byte as one lifecycle operation. Any sequence must leave
    // the allocator balanced once the state is dropped.
    let tracker = Arc::new(TrackingAllocator::with_limit(8 << 20));
    {
        let mut s = DecoderState::with_memory_manager(MemoryManager::new(tracker.clone()));
        for &op in data {
            let arg = u32::from(op >> 3);
            let _ = match op & 7 {
                0 => {
                    let mut input: &[u8] = &[op];
                    s.decode_stream_header(&mut input).map(|_| ())
                }
                1 => {
                    s.metablock_begin();
                    Ok(())
                }
                2 => s.allocate_ring_buffer(),
                3 => s.allocate_block_type_trees(),
                4 => {
                    s.num_literal_htrees = arg + 1;
                    s.num_dist_htrees = (arg & 7) + 1;
                    s.distance_postfix_bits = arg & 3;
                    s.init_tree_groups()
                }
                5 => s
                    .allocate_context_map((arg as usize + 1) << 6)
                    .and_then(|_| s.inverse_move_to_front_transform(ContextMapKind::Literal)),
                6 => {
                    s.cleanup_after_metablock();
                    Ok(())
                }
                _ => {
                    s.cleanup();
                    Ok(())
                }
            };
        }
    }
    assert!(tracker.stats().is_balanced());
});
