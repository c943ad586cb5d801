// Integration tests for the stream header step and ring-buffer allocation.

use std::sync::Arc;

use brotli_state::config::{DecoderOptions, RING_BUFFER_WRITE_AHEAD_SLACK};
use brotli_state::state::encode_window_bits;
use brotli_state::{DecoderError, DecoderState, MemoryManager, RunningState, StepResult, TrackingAllocator};

#[test]
fn header_waits_for_input() {
    let mut s = DecoderState::new();
    for _ in 0..3 {
        let mut empty: &[u8] = &[];
        assert_eq!(s.decode_stream_header(&mut empty), Ok(StepResult::NeedsMoreInput));
        assert!(s.is_stream_start());
    }
    let byte = [encode_window_bits(20).unwrap()];
    let mut input: &[u8] = &byte;
    assert_eq!(s.decode_stream_header(&mut input), Ok(StepResult::Success));
    assert!(input.is_empty());
    assert_eq!(s.window_bits, 20);
    assert_eq!(s.state, RunningState::MetablockBegin);
}

#[test]
fn header_leaves_following_bytes_unread() {
    let mut s = DecoderState::new();
    let mut input: &[u8] = &[0x00, 0xAA, 0xBB];
    s.decode_stream_header(&mut input).unwrap();
    assert_eq!(input, &[0xAA, 0xBB]);
    // 16-bit window uses one bit; the rest of the first byte stays buffered.
    assert_eq!(s.br.available_bits(), 7);
}

#[test]
fn header_step_is_noop_once_decoded() {
    let mut s = DecoderState::new();
    let mut input: &[u8] = &[0x00];
    s.decode_stream_header(&mut input).unwrap();
    let mut more: &[u8] = &[0xFF];
    assert_eq!(s.decode_stream_header(&mut more), Ok(StepResult::Success));
    assert_eq!(more, &[0xFF]);
    assert_eq!(s.window_bits, 16);
}

#[test]
fn reserved_window_value_is_sticky() {
    let mut s = DecoderState::new();
    let mut input: &[u8] = &[0x11];
    let err = s.decode_stream_header(&mut input).unwrap_err();
    assert_eq!(err, DecoderError::FormatWindowBits);
    assert_eq!(err.code(), -13);
    assert_eq!(s.error_code, Some(DecoderError::FormatWindowBits));
    let mut next: &[u8] = &[0x00];
    assert_eq!(s.decode_stream_header(&mut next), Err(DecoderError::FormatWindowBits));
}

#[test]
fn ring_buffer_matches_declared_window() {
    for bits in [10, 16, 22] {
        let t = Arc::new(TrackingAllocator::new());
        let mut s = DecoderState::with_memory_manager(MemoryManager::new(t.clone()));
        let byte = [encode_window_bits(bits).unwrap()];
        let mut input: &[u8] = &byte;
        s.decode_stream_header(&mut input).unwrap();
        s.metablock_begin();
        s.allocate_ring_buffer().unwrap();
        assert_eq!(s.ringbuffer_size, 1 << bits);
        assert_eq!(s.max_backward_distance, (1 << bits) - 16);
        assert_eq!(t.stats().live_bytes, (1 << bits) + RING_BUFFER_WRITE_AHEAD_SLACK);
    }
}

#[test]
fn short_final_metablock_shrinks_ring() {
    let mut s = DecoderState::new();
    let mut input: &[u8] = &[encode_window_bits(24).unwrap()];
    s.decode_stream_header(&mut input).unwrap();
    s.metablock_begin();
    s.is_last_metablock = true;
    s.meta_block_remaining_len = 1000;
    s.allocate_ring_buffer().unwrap();
    assert_eq!(s.ringbuffer_size, 1024);
    assert_eq!(s.ringbuffer_mask, 1023);
}

#[test]
fn dictionary_precedes_first_output_byte() {
    let dict: Vec<u8> = b"0123456789".repeat(30);
    let mut s = DecoderState::with_options(DecoderOptions::new().with_custom_dict(&dict));
    let mut input: &[u8] = &[encode_window_bits(10).unwrap()];
    s.decode_stream_header(&mut input).unwrap();
    s.allocate_ring_buffer().unwrap();
    let size = s.ringbuffer_size;
    assert_eq!(size, 1024);
    let rb = s.ring_buffer().unwrap();
    assert_eq!(&rb[size - dict.len()..size], &dict[..]);
    assert_eq!(s.max_backward_distance_minus_custom_dict_size, 1024 - 16 - 300);
}

#[test]
fn ring_buffer_oom_reports_error() {
    let t = Arc::new(TrackingAllocator::with_limit(1 << 16));
    let mut s = DecoderState::with_memory_manager(MemoryManager::new(t.clone()));
    let mut input: &[u8] = &[encode_window_bits(16).unwrap()];
    s.decode_stream_header(&mut input).unwrap();
    let err = s.allocate_ring_buffer().unwrap_err();
    assert_eq!(err, DecoderError::AllocRingBuffer);
    assert!(err.is_allocation_failure());
    assert!(s.ring_buffer().is_none());
    assert_eq!(t.stats().failures, 1);
}
