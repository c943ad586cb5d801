//! Decoder error codes.
//!
//! Covers the failures that can surface from the state/lifecycle layer:
//! - allocation failures, one variant per owned structure so callers can tell
//!   which allocation ran out of memory;
//! - the one format check performed here (reserved window-bits value);
//! - misuse of the lifecycle API (`InvalidArguments`, `StreamFinished`).
//!
//! Malformed Huffman tables, bad distances and the rest of the bitstream
//! grammar are reported by the parser layer, not from this module.

use core::fmt;

/// Errors reported by [`DecoderState`](crate::state::DecoderState) and its helpers.
///
/// Numeric codes are negative and stable. All but `StreamFinished` follow the
/// Brotli decoder error numbering (`-13` window bits, `-20` invalid arguments,
/// `-21..=-30` allocation failures). `StreamFinished` has no counterpart there
/// and takes `-32`, the first code below that range's `-31` (unreachable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderError {
    /// Reserved WBITS value in the stream header.
    FormatWindowBits,
    /// API misuse: wrong lifecycle phase or missing prerequisite.
    InvalidArguments,
    /// `context_modes` allocation failed.
    AllocContextModes,
    /// One of the three Huffman tree groups could not be allocated.
    AllocTreeGroups,
    /// `context_map` or `dist_context_map` allocation failed.
    AllocContextMap,
    /// Output ring buffer allocation failed.
    AllocRingBuffer,
    /// Combined block-type / block-length tree allocation failed.
    AllocBlockTypeTrees,
    /// A decode step was attempted after the stream reached its end.
    StreamFinished,
}

impl DecoderError {
    /// Stable identifier string, suitable for logs and test assertions.
    pub fn error_name(&self) -> &'static str {
        match self {
            DecoderError::FormatWindowBits => "_ERROR_FORMAT_WINDOW_BITS",
            DecoderError::InvalidArguments => "_ERROR_INVALID_ARGUMENTS",
            DecoderError::AllocContextModes => "_ERROR_ALLOC_CONTEXT_MODES",
            DecoderError::AllocTreeGroups => "_ERROR_ALLOC_TREE_GROUPS",
            DecoderError::AllocContextMap => "_ERROR_ALLOC_CONTEXT_MAP",
            DecoderError::AllocRingBuffer => "_ERROR_ALLOC_RING_BUFFER",
            DecoderError::AllocBlockTypeTrees => "_ERROR_ALLOC_BLOCK_TYPE_TREES",
            DecoderError::StreamFinished => "_ERROR_STREAM_FINISHED",
        }
    }

    /// Negative numeric code.
    pub fn code(&self) -> i32 {
        match self {
            DecoderError::FormatWindowBits => -13,
            DecoderError::InvalidArguments => -20,
            DecoderError::AllocContextModes => -21,
            DecoderError::AllocTreeGroups => -22,
            DecoderError::AllocContextMap => -25,
            DecoderError::AllocRingBuffer => -26,
            DecoderError::AllocBlockTypeTrees => -30,
            DecoderError::StreamFinished => -32,
        }
    }

    /// Inverse of [`code`](Self::code). Returns `None` for unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -13 => Some(DecoderError::FormatWindowBits),
            -20 => Some(DecoderError::InvalidArguments),
            -21 => Some(DecoderError::AllocContextModes),
            -22 => Some(DecoderError::AllocTreeGroups),
            -25 => Some(DecoderError::AllocContextMap),
            -26 => Some(DecoderError::AllocRingBuffer),
            -30 => Some(DecoderError::AllocBlockTypeTrees),
            -32 => Some(DecoderError::StreamFinished),
            _ => None,
        }
    }

    /// `true` for the out-of-memory family.
    #[inline]
    pub fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            DecoderError::AllocContextModes
                | DecoderError::AllocTreeGroups
                | DecoderError::AllocContextMap
                | DecoderError::AllocRingBuffer
                | DecoderError::AllocBlockTypeTrees
        )
    }
}

impl fmt::Display for DecoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_name())
    }
}

impl std::error::Error for DecoderError {}
