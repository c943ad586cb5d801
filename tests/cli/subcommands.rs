// Integration tests for the layout, probe and bench subcommands, called as
// library functions.

use brotli_state::cli::bench::{bench, run_lifecycle};
use brotli_state::cli::layout::measure;
use brotli_state::cli::probe::probe;
use brotli_state::state::encode_window_bits;
use brotli_state::{MemoryManager, TrackingAllocator};
use std::sync::Arc;

#[test]
fn layout_of_command_group() {
    let l = measure(704, 2).unwrap();
    assert_eq!(l.max_table_size, 1080);
    assert_eq!(l.codes_bytes, 2 * 1080 * 4);
    assert_eq!(l.htrees_offset, l.codes_bytes);
    assert_eq!(l.total_bytes, l.codes_bytes + 8);
    assert_eq!(l.allocations, 1);
}

#[test]
fn probe_is_chunk_size_independent() {
    let data = [encode_window_bits(18).unwrap(), 0x12, 0x34, 0x56];
    let one = probe(&data, 1, None, None).unwrap();
    let all = probe(&data, data.len(), None, None).unwrap();
    assert_eq!(one.window_bits, 18);
    assert_eq!(one.window_bits, all.window_bits);
    assert_eq!(one.ringbuffer_size, all.ringbuffer_size);
    assert_eq!(one.allocated_bytes, all.allocated_bytes);
    assert!(one.stats.is_balanced());
}

#[test]
fn probe_clamps_large_dictionary() {
    let dict = vec![1u8; 4096];
    let data = [encode_window_bits(10).unwrap()];
    let r = probe(&data, 1, Some(&dict), None).unwrap();
    assert_eq!(r.dict_len, 1024 - 16);
    assert_eq!(r.ringbuffer_size, 1024);
}

#[test]
fn lifecycle_runs_with_every_window() {
    let t = Arc::new(TrackingAllocator::new());
    let mm = MemoryManager::new(t.clone());
    for bits in 10..=24 {
        run_lifecycle(&mm, encode_window_bits(bits).unwrap(), bits as usize).unwrap();
    }
    assert!(t.stats().is_balanced());
}

#[test]
fn bench_reports_counts() {
    let r = bench(10, 2, 12).unwrap();
    assert_eq!(r.iterations, 10);
    assert!(r.stats.is_balanced());
    assert!(r.lifecycles_per_sec() > 0.0);
}
