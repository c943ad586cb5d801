#![no_main]
use libfuzzer_sys::fuzz_target;

use brotli_state::{DecoderState, StepResult};

fuzz_target!(|data: &[u8]| {
    // First byte picks the chunk size; the rest is the stream. Errors are
    // expected; what we verify is that chunking never changes the outcome.
    let Some((&split, stream)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(split).max(1);

    let mut whole = DecoderState::new();
    let mut input = stream;
    let expected = whole.decode_stream_header(&mut input);

    let mut chunked = DecoderState::new();
    let mut got = Ok(StepResult::NeedsMoreInput);
    for piece in stream.chunks(chunk) {
        let mut input = piece;
        got = chunked.decode_stream_header(&mut input);
        if got != Ok(StepResult::NeedsMoreInput) {
            break;
        }
    }
    assert_eq!(got, expected);
    assert_eq!(chunked.window_bits, whole.window_bits);

    if got == Ok(StepResult::Success) {
        chunked.metablock_begin();
        chunked.allocate_ring_buffer().unwrap();
        assert_eq!(chunked.ringbuffer_size, 1 << chunked.window_bits);
    }
});
