//! Running-state enums and step results.
//!
//! A metablock header interleaves several nested grammars, so progress is
//! tracked as one top-level [`RunningState`] plus one independent sub-state
//! per region. Every sub-state has a `None` variant meaning "not inside this
//! region"; all of them start there.

/// Top-level position of the decoder in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum RunningState {
    /// Nothing decoded yet; the stream header (window bits) comes next.
    #[default]
    Uninited = 0,
    MetablockBegin = 1,
    MetablockHeader = 2,
    MetablockHeader2 = 3,
    ContextModes = 4,
    CommandBegin = 5,
    CommandInner = 6,
    CommandPostDecodeLiterals = 7,
    CommandPostWrapCopy = 8,
    Uncompressed = 9,
    Metadata = 10,
    CommandInnerWrite = 11,
    MetablockDone = 12,
    CommandPostWrite1 = 13,
    CommandPostWrite2 = 14,
    HuffmanCode0 = 15,
    HuffmanCode1 = 16,
    HuffmanCode2 = 17,
    HuffmanCode3 = 18,
    ContextMap1 = 19,
    ContextMap2 = 20,
    TreeGroup = 21,
    /// Terminal: the last metablock has been fully decoded.
    Done = 22,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MetablockHeaderState {
    #[default]
    None = 0,
    Empty = 1,
    Nibbles = 2,
    Size = 3,
    Uncompressed = 4,
    Reserved = 5,
    Bytes = 6,
    Metadata = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum UncompressedState {
    #[default]
    None = 0,
    Write = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TreeGroupState {
    #[default]
    None = 0,
    Loop = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ContextMapState {
    #[default]
    None = 0,
    ReadPrefix = 1,
    Huffman = 2,
    Decode = 3,
    Transform = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum HuffmanState {
    #[default]
    None = 0,
    SimpleSize = 1,
    SimpleRead = 2,
    SimpleBuild = 3,
    Complex = 4,
    LengthSymbols = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DecodeUint8State {
    #[default]
    None = 0,
    Short = 1,
    Long = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ReadBlockLengthState {
    #[default]
    None = 0,
    Suffix = 1,
}

/// Outcome of a resumable step that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Success,
    /// Input ran out; call again with more bytes. Nothing was lost.
    NeedsMoreInput,
}

/// Literal context modes, as signalled per literal block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ContextMode {
    #[default]
    Lsb6 = 0,
    Msb6 = 1,
    Utf8 = 2,
    Signed = 3,
}

/// Offsets of the two context lookup tables for each mode, flattened as
/// `[mode * 2]` (previous byte) and `[mode * 2 + 1]` (byte before that).
const CONTEXT_LOOKUP_OFFSETS: [u16; 8] = [1024, 1536, 1280, 1536, 0, 256, 768, 512];

impl ContextMode {
    /// Mode from its two-bit wire value.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(ContextMode::Lsb6),
            1 => Some(ContextMode::Msb6),
            2 => Some(ContextMode::Utf8),
            3 => Some(ContextMode::Signed),
            _ => None,
        }
    }

    /// Offsets into the shared context lookup table for (p1, p2).
    #[inline]
    pub fn lookup_offsets(self) -> (usize, usize) {
        let m = self as usize * 2;
        (CONTEXT_LOOKUP_OFFSETS[m] as usize, CONTEXT_LOOKUP_OFFSETS[m + 1] as usize)
    }
}

/// Selects one of the three per-metablock Huffman tree groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeGroupKind {
    Literal,
    InsertCopy,
    Distance,
}

/// Selects one of the two context maps a decoder holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMapKind {
    Literal,
    Distance,
}
