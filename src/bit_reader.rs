//! Bit-granular input cursor.
//!
//! Bits are consumed least-significant first out of a 64-bit accumulator.
//! Input arrives as caller-owned chunks (`&mut &[u8]`) that are advanced in
//! place; whatever has been pulled into the accumulator survives between
//! calls, so decoding resumes correctly across arbitrary chunk boundaries.
//!
//! The "safe" operations never consume anything unless the full request can
//! be satisfied: they pull bytes until enough bits are buffered or input runs
//! dry, and report `None` in the latter case with the buffered bits intact.

/// Accumulator width, in bits.
const BIT_READER_WIDTH: u32 = 64;

/// Largest single read supported by [`BitReader::safe_get_bits`].
pub const MAX_READ_BITS: u32 = 24;

#[inline]
fn bit_mask(n: u32) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitReader {
    /// Pre-fetched bits; the next bit to consume sits at position `bit_pos`.
    val: u64,
    /// Bits of `val` already consumed. `64` means the accumulator is empty.
    bit_pos: u32,
    /// Total bytes pulled from input since construction.
    bytes_pulled: u64,
}

impl BitReader {
    /// An empty reader with nothing buffered.
    pub fn new() -> Self {
        BitReader { val: 0, bit_pos: BIT_READER_WIDTH, bytes_pulled: 0 }
    }

    /// Buffered, not yet consumed bits.
    #[inline]
    pub fn available_bits(&self) -> u32 {
        BIT_READER_WIDTH - self.bit_pos
    }

    /// Bytes pulled from input so far, including any still buffered.
    #[inline]
    pub fn bytes_pulled(&self) -> u64 {
        self.bytes_pulled
    }

    /// Bytes whose bits have been fully or partially consumed.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_pulled - u64::from(self.available_bits() / 8)
    }

    /// Moves one byte from `input` into the accumulator.
    ///
    /// Returns `false` when `input` is empty or the accumulator has no room.
    pub fn pull_byte(&mut self, input: &mut &[u8]) -> bool {
        let Some((&byte, rest)) = input.split_first() else {
            return false;
        };
        if self.available_bits() > BIT_READER_WIDTH - 8 {
            return false;
        }
        // Shift the unconsumed bits down to bit 0, then append above them.
        let avail = self.available_bits();
        let kept = if avail == 0 { 0 } else { self.val >> self.bit_pos };
        self.val = kept | (u64::from(byte) << avail);
        self.bit_pos = BIT_READER_WIDTH - avail - 8;
        self.val <<= self.bit_pos;
        *input = rest;
        self.bytes_pulled += 1;
        true
    }

    /// Pulls bytes until at least `n_bits` are buffered.
    pub fn fill(&mut self, n_bits: u32, input: &mut &[u8]) -> bool {
        while self.available_bits() < n_bits {
            if !self.pull_byte(input) {
                return false;
            }
        }
        true
    }

    /// Low `n_bits` of the buffered bits, without consuming them.
    ///
    /// Caller guarantees `n_bits <= available_bits()`.
    #[inline]
    pub fn peek_bits(&self, n_bits: u32) -> u32 {
        debug_assert!(n_bits <= self.available_bits());
        debug_assert!(n_bits <= 32);
        if n_bits == 0 {
            return 0;
        }
        ((self.val >> self.bit_pos) & bit_mask(n_bits)) as u32
    }

    /// Consumes `n_bits` buffered bits.
    #[inline]
    pub fn drop_bits(&mut self, n_bits: u32) {
        debug_assert!(n_bits <= self.available_bits());
        self.bit_pos += n_bits;
    }

    /// Peeks `n_bits`, pulling input as needed. `None` if input runs out.
    pub fn safe_get_bits(&mut self, n_bits: u32, input: &mut &[u8]) -> Option<u32> {
        debug_assert!(n_bits <= MAX_READ_BITS);
        if !self.fill(n_bits, input) {
            return None;
        }
        Some(self.peek_bits(n_bits))
    }

    /// Reads and consumes `n_bits`, pulling input as needed. Consumes nothing
    /// if input runs out.
    pub fn safe_read_bits(&mut self, n_bits: u32, input: &mut &[u8]) -> Option<u32> {
        let v = self.safe_get_bits(n_bits, input)?;
        self.drop_bits(n_bits);
        Some(v)
    }

    /// Skips to the next byte boundary. Returns `true` when the skipped
    /// padding bits were all zero.
    pub fn jump_to_byte_boundary(&mut self) -> bool {
        let pad = self.available_bits() & 7;
        if pad == 0 {
            return true;
        }
        let bits = self.peek_bits(pad);
        self.drop_bits(pad);
        bits == 0
    }
}
