//! Stream header and output ring buffer.

use super::{DecoderState, RunningState, StepResult};
use crate::config::{
    window_size, RING_BUFFER_MIN_SHRINK, RING_BUFFER_WRITE_AHEAD_SLACK, WINDOW_BITS_MAX, WINDOW_BITS_MIN,
};
use crate::error::DecoderError;

/// WBITS escape value reserved by the format.
const RESERVED_WINDOW_BITS: u32 = 9;

/// Stream header byte announcing a window of `window_bits`, with the unused
/// high bits zero. `None` outside `10..=24`.
pub fn encode_window_bits(window_bits: u32) -> Option<u8> {
    match window_bits {
        16 => Some(0),
        17 => Some(0b000_0001),
        18..=24 => Some((((window_bits - 17) << 1) | 1) as u8),
        10..=15 => Some((((window_bits - 8) << 4) | 1) as u8),
        _ => None,
    }
}

impl<'d> DecoderState<'d> {
    /// Decodes the stream header (window size) from `input`.
    ///
    /// At [`RunningState::Uninited`] this needs one input byte; with none
    /// available it returns `NeedsMoreInput` and can be retried with the next
    /// chunk. On success the window parameters are set and the state moves to
    /// [`RunningState::MetablockBegin`]. Past the header it is a no-op.
    pub fn decode_stream_header(&mut self, input: &mut &[u8]) -> Result<StepResult, DecoderError> {
        if let Some(e) = self.error_code {
            return Err(e);
        }
        match self.state {
            RunningState::Done => return Err(DecoderError::StreamFinished),
            RunningState::Uninited => {}
            _ => return Ok(StepResult::Success),
        }
        // The longest WBITS encoding is 7 bits; any first byte holds it.
        if !self.br.fill(7, input) {
            return Ok(StepResult::NeedsMoreInput);
        }
        let window_bits = match self.read_window_bits() {
            Ok(bits) => bits,
            Err(e) => {
                self.error_code = Some(e);
                return Err(e);
            }
        };

        self.window_bits = window_bits;
        self.max_backward_distance = (1i32 << window_bits) - 16;
        self.max_distance = self.max_backward_distance;
        self.fit_custom_dict_to_window()?;
        self.state = RunningState::MetablockBegin;
        crate::displaylevel!(4, "brotli-state: window bits {}\n", window_bits);
        Ok(StepResult::Success)
    }

    /// Consumes the 1, 4 or 7 bit WBITS code. At least 7 bits must be buffered.
    fn read_window_bits(&mut self) -> Result<u32, DecoderError> {
        if self.br.peek_bits(1) == 0 {
            self.br.drop_bits(1);
            return Ok(16);
        }
        let n = (self.br.peek_bits(4) >> 1) & 7;
        if n != 0 {
            self.br.drop_bits(4);
            return Ok(17 + n);
        }
        let n = (self.br.peek_bits(7) >> 4) & 7;
        self.br.drop_bits(7);
        match n {
            0 => Ok(17),
            _ if 8 + n == RESERVED_WINDOW_BITS => Err(DecoderError::FormatWindowBits),
            _ => Ok(8 + n),
        }
    }

    /// Allocates the output ring buffer once the window size is known.
    ///
    /// The buffer is `1 << window_bits` bytes, shrunk for a short final
    /// metablock and grown to hold the custom dictionary, plus write-ahead
    /// slack. The dictionary (clamped to the window) is copied to the end of
    /// the ring so it reads as history just before position zero. Does nothing
    /// if the buffer already exists.
    pub fn allocate_ring_buffer(&mut self) -> Result<(), DecoderError> {
        if self.ringbuffer.is_some() {
            return Ok(());
        }
        if !(WINDOW_BITS_MIN..=WINDOW_BITS_MAX).contains(&self.window_bits) {
            return Err(DecoderError::InvalidArguments);
        }
        let dict = self.fit_custom_dict_to_window()?;

        let mut size = window_size(self.window_bits);
        if self.is_last_metablock {
            let remaining = self.meta_block_remaining_len.max(0) as usize;
            while size >= remaining * 2 && size > RING_BUFFER_MIN_SHRINK {
                size >>= 1;
            }
        }
        while size < dict.len() {
            size <<= 1;
        }

        let Some(mut rb) = self.mm.allocate(size + RING_BUFFER_WRITE_AHEAD_SLACK) else {
            return Err(DecoderError::AllocRingBuffer);
        };
        rb[size - 2] = 0;
        rb[size - 1] = 0;
        if !dict.is_empty() {
            rb[size - dict.len()..size].copy_from_slice(dict);
        }
        self.ringbuffer_size = size;
        self.ringbuffer_mask = size - 1;
        self.ringbuffer = Some(rb);
        Ok(())
    }

    /// Keeps at most `window - 16` trailing bytes of the custom dictionary and
    /// derives `max_backward_distance_minus_custom_dict_size` from what is kept.
    /// `window_bits` must already be within `WINDOW_BITS_MIN..=WINDOW_BITS_MAX`.
    fn fit_custom_dict_to_window(&mut self) -> Result<&'d [u8], DecoderError> {
        let max_len = window_size(self.window_bits) - 16;
        let mut dict = self.custom_dict.unwrap_or(&[]);
        if dict.len() > max_len {
            dict = &dict[dict.len() - max_len..];
            self.custom_dict = Some(dict);
        }
        let dict_len = i32::try_from(dict.len()).map_err(|_| DecoderError::InvalidArguments)?;
        self.max_backward_distance_minus_custom_dict_size = self.max_backward_distance - dict_len;
        Ok(dict)
    }

    /// Whole ring buffer including the write-ahead slack.
    pub fn ring_buffer(&self) -> Option<&[u8]> {
        self.ringbuffer.as_deref()
    }

    pub fn ring_buffer_mut(&mut self) -> Option<&mut [u8]> {
        self.ringbuffer.as_deref_mut()
    }

    /// Address of the ring buffer block, for identity checks.
    pub fn ring_buffer_ptr(&self) -> Option<*const u8> {
        self.ringbuffer.as_ref().map(|b| b.as_ptr())
    }
}
