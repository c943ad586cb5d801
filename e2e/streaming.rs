// e2e/streaming.rs: resumable header decode across arbitrary chunk splits
//
// A decoder fed the same bytes in any chunking must reach the same state as
// one fed everything at once, and must never lose bytes at a split.

use std::sync::Arc;

use brotli_state::state::encode_window_bits;
use brotli_state::{DecoderState, MemoryManager, RunningState, StepResult, TrackingAllocator};

/// Feeds `data` split at `splits` and returns the state plus the unread tail.
fn feed(data: &[u8], splits: &[usize]) -> (DecoderState<'static>, Vec<u8>) {
    let mut s = DecoderState::new();
    let mut bounds = vec![0];
    bounds.extend(splits.iter().copied().filter(|&p| p <= data.len()));
    bounds.push(data.len());

    let mut rest = Vec::new();
    let mut done = false;
    for w in bounds.windows(2) {
        let chunk = &data[w[0]..w[1]];
        if done {
            rest.extend_from_slice(chunk);
            continue;
        }
        let mut input = chunk;
        match s.decode_stream_header(&mut input).unwrap() {
            StepResult::Success => {
                done = true;
                rest.extend_from_slice(input);
            }
            StepResult::NeedsMoreInput => assert!(input.is_empty()),
        }
    }
    (s, rest)
}

#[test]
fn every_split_yields_same_state() {
    for bits in 10..=24 {
        let data = [encode_window_bits(bits).unwrap(), 0xDE, 0xAD, 0xBE, 0xEF];
        let (whole, whole_rest) = feed(&data, &[]);
        assert_eq!(whole.window_bits, bits);

        for a in 0..=data.len() {
            for b in a..=data.len() {
                let (s, rest) = feed(&data, &[a, b]);
                assert_eq!(s.window_bits, whole.window_bits, "bits {bits} split {a},{b}");
                assert_eq!(s.state, RunningState::MetablockBegin);
                assert_eq!(s.max_backward_distance, whole.max_backward_distance);
                assert_eq!(s.br.available_bits(), whole.br.available_bits());
                assert_eq!(rest, whole_rest);
            }
        }
    }
}

#[test]
fn empty_leading_chunks_are_harmless() {
    let data = [0x00];
    let (s, rest) = feed(&data, &[0, 0, 0]);
    assert_eq!(s.window_bits, 16);
    assert!(rest.is_empty());
}

#[test]
fn full_stream_lifecycle_over_chunks() {
    let t = Arc::new(TrackingAllocator::new());
    let dict = b"previously seen text";
    {
        let mut s = DecoderState::with_memory_manager(MemoryManager::new(t.clone()));
        s.set_custom_dictionary(dict).unwrap();

        let data = [encode_window_bits(12).unwrap(), 0x00];
        let mut steps = 0;
        for chunk in data.chunks(1) {
            let mut input = chunk;
            steps += 1;
            if s.decode_stream_header(&mut input).unwrap() == StepResult::Success {
                break;
            }
        }
        assert_eq!(steps, 1);

        for metablock in 0..3 {
            s.metablock_begin();
            s.is_last_metablock = metablock == 2;
            s.meta_block_remaining_len = 100;
            s.allocate_ring_buffer().unwrap();
            s.allocate_block_type_trees().unwrap();
            s.num_literal_htrees = 1 + metablock;
            s.num_dist_htrees = 1;
            s.init_tree_groups().unwrap();
            s.allocate_context_map(64).unwrap();
            s.allocate_dist_context_map(4).unwrap();
            s.cleanup_after_metablock();
        }
        // Ring buffer was sized by the first metablock, which was not last.
        assert_eq!(s.ringbuffer_size, 1 << 12);
        let rb = s.ring_buffer().unwrap();
        assert_eq!(&rb[(1 << 12) - dict.len()..1 << 12], &dict[..]);
        s.state = RunningState::Done;
        assert!(s.is_stream_end());
    }
    let stats = t.stats();
    assert!(stats.is_balanced());
    // ring buffer + block trees once, then three groups and two maps per metablock
    assert_eq!(stats.allocations, 2 + 3 * 5);
}
