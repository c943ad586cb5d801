//! Huffman decode-table storage.
//!
//! The table-building and symbol-decoding loops belong to the bitstream
//! parser. This module only owns the memory layout they work in:
//! [`HuffmanCode`] entries and [`HuffmanTreeGroup`], a set of decode tables
//! that share one alphabet and live in a single allocation.

use crate::arena::SplitArena;
use crate::error::DecoderError;
use crate::memory::MemoryManager;

/// Longest code length allowed for any alphabet.
pub const HUFFMAN_MAX_CODE_LENGTH: usize = 15;

/// Largest alphabet the decoder builds tables for (insert-and-copy codes).
pub const NUM_COMMAND_SYMBOLS: usize = 704;

/// Maximum table sizes for the fixed alphabets (root 8 bits).
pub const HUFFMAN_MAX_SIZE_26: usize = 396;
pub const HUFFMAN_MAX_SIZE_258: usize = 632;

/// Maximum decode-table size (root + second level) for an alphabet of up to
/// `32 * (i + 1)` symbols, indexed by `(alphabet_size + 31) >> 5`.
pub const MAX_HUFFMAN_TABLE_SIZE: [u16; 23] = [
    256, 402, 436, 468, 500, 534, 566, 598, 630, 662, 694, 726, 758, 790, 822, 854, 886, 920,
    952, 984, 1016, 1048, 1080,
];

/// Encoded size of one [`HuffmanCode`] inside a table region.
pub const HUFFMAN_CODE_SIZE: usize = 4;

/// Encoded size of one per-tree offset slot.
pub const HTREE_SLOT_SIZE: usize = 4;

/// One decode-table entry: number of bits to consume and the symbol (or, for
/// root entries pointing at a second-level table, the offset to it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HuffmanCode {
    pub bits: u8,
    pub value: u16,
}

impl HuffmanCode {
    #[inline]
    pub const fn new(bits: u8, value: u16) -> Self {
        HuffmanCode { bits, value }
    }

    #[inline]
    fn encode(self) -> [u8; HUFFMAN_CODE_SIZE] {
        let v = self.value.to_le_bytes();
        [self.bits, 0, v[0], v[1]]
    }

    #[inline]
    fn decode(b: &[u8]) -> Self {
        HuffmanCode { bits: b[0], value: u16::from_le_bytes([b[2], b[3]]) }
    }

    /// Reads entry `index` of a table region.
    pub fn read(table: &[u8], index: usize) -> Option<Self> {
        let at = index.checked_mul(HUFFMAN_CODE_SIZE)?;
        table.get(at..at.checked_add(HUFFMAN_CODE_SIZE)?).map(Self::decode)
    }

    /// Writes `self` as entry `index` of a table region. `false` when out of range.
    pub fn write(self, table: &mut [u8], index: usize) -> bool {
        let Some(at) = index.checked_mul(HUFFMAN_CODE_SIZE) else {
            return false;
        };
        let Some(end) = at.checked_add(HUFFMAN_CODE_SIZE) else {
            return false;
        };
        match table.get_mut(at..end) {
            Some(slot) => {
                slot.copy_from_slice(&self.encode());
                true
            }
            None => false,
        }
    }
}

/// Per-tree table size bound for `alphabet_size`, or `None` past the largest alphabet.
#[inline]
pub fn max_table_size(alphabet_size: u32) -> Option<usize> {
    let idx = ((alphabet_size as usize) + 31) >> 5;
    MAX_HUFFMAN_TABLE_SIZE.get(idx).map(|&s| s as usize)
}

/// A group of Huffman decode tables sharing one alphabet.
///
/// `codes` (all tables, back to back) and `htrees` (one start offset per tree,
/// in entries from the beginning of `codes`) are two views of one
/// [`SplitArena`]: `codes` at byte 0, `htrees` immediately after. `init`
/// reserves the slots; the table builder fills them in.
#[derive(Debug, Default)]
pub struct HuffmanTreeGroup {
    pub alphabet_size: u16,
    pub num_htrees: u16,
    max_table_size: usize,
    arena: Option<SplitArena>,
}

impl HuffmanTreeGroup {
    pub const fn new() -> Self {
        HuffmanTreeGroup { alphabet_size: 0, num_htrees: 0, max_table_size: 0, arena: None }
    }

    /// Reserves storage for `ntrees` tables over `alphabet_size` symbols with
    /// one allocation. Storage from an earlier `init` is released first. On
    /// failure the group stays unallocated.
    pub fn init(&mut self, mm: &MemoryManager, alphabet_size: u32, ntrees: u32) -> Result<(), DecoderError> {
        self.release(mm);
        let max_table_size = max_table_size(alphabet_size).ok_or(DecoderError::InvalidArguments)?;
        let ntrees_u16 = u16::try_from(ntrees).map_err(|_| DecoderError::InvalidArguments)?;
        let code_size = HUFFMAN_CODE_SIZE
            .checked_mul(ntrees as usize)
            .and_then(|n| n.checked_mul(max_table_size))
            .ok_or(DecoderError::AllocTreeGroups)?;
        let htree_size = HTREE_SLOT_SIZE * ntrees as usize;

        self.alphabet_size = alphabet_size as u16;
        self.num_htrees = ntrees_u16;
        self.max_table_size = max_table_size;
        self.arena = SplitArena::allocate(mm, code_size, htree_size);
        if self.arena.is_none() {
            return Err(DecoderError::AllocTreeGroups);
        }
        Ok(())
    }

    /// Frees the combined block. Safe to call on an unallocated group.
    pub fn release(&mut self, mm: &MemoryManager) {
        if let Some(arena) = self.arena.take() {
            arena.release(mm);
        }
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.arena.is_some()
    }

    /// Table size bound used for each tree in this group.
    #[inline]
    pub fn max_table_size(&self) -> usize {
        self.max_table_size
    }

    /// Capacity of the `codes` view, in entries.
    #[inline]
    pub fn codes_len(&self) -> usize {
        self.arena.as_ref().map_or(0, |a| a.split() / HUFFMAN_CODE_SIZE)
    }

    /// Address of the `codes` view.
    pub fn codes_ptr(&self) -> Option<*const u8> {
        self.arena.as_ref().map(|a| a.head().as_ptr())
    }

    /// Address of the `htrees` view.
    pub fn htrees_ptr(&self) -> Option<*const u8> {
        self.arena.as_ref().map(|a| a.tail().as_ptr())
    }

    /// Byte distance from `codes` to `htrees`.
    pub fn htrees_offset(&self) -> Option<usize> {
        self.arena.as_ref().map(|a| a.split())
    }

    /// Total bytes held by the combined allocation.
    pub fn allocated_bytes(&self) -> usize {
        self.arena.as_ref().map_or(0, |a| a.len())
    }

    /// Reads entry `index` of the `codes` view.
    pub fn code(&self, index: usize) -> Option<HuffmanCode> {
        HuffmanCode::read(self.arena.as_ref()?.head(), index)
    }

    /// Writes entry `index` of the `codes` view. Returns `false` when out of range.
    pub fn set_code(&mut self, index: usize, code: HuffmanCode) -> bool {
        match self.arena.as_mut() {
            Some(arena) => code.write(arena.head_mut(), index),
            None => false,
        }
    }

    /// Start offset (in entries) of tree `tree`, as recorded by the table builder.
    pub fn htree(&self, tree: usize) -> Option<u32> {
        let slots = self.arena.as_ref()?.tail();
        let at = tree.checked_mul(HTREE_SLOT_SIZE)?;
        let b = slots.get(at..at + HTREE_SLOT_SIZE)?;
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Points tree `tree` at entry `offset` of `codes`. Returns `false` when
    /// the tree index or offset is out of range.
    pub fn set_htree(&mut self, tree: usize, offset: u32) -> bool {
        if offset as usize >= self.codes_len() {
            return false;
        }
        let Some(arena) = self.arena.as_mut() else {
            return false;
        };
        let Some(at) = tree.checked_mul(HTREE_SLOT_SIZE) else {
            return false;
        };
        match arena.tail_mut().get_mut(at..at + HTREE_SLOT_SIZE) {
            Some(slot) => {
                slot.copy_from_slice(&offset.to_le_bytes());
                true
            }
            None => false,
        }
    }

    /// Entries of tree `tree`, from its recorded start to the end of `codes`.
    pub fn table(&self, tree: usize) -> Option<impl Iterator<Item = HuffmanCode> + '_> {
        let start = self.htree(tree)? as usize * HUFFMAN_CODE_SIZE;
        let codes = self.arena.as_ref()?.head();
        Some(codes.get(start..)?.chunks_exact(HUFFMAN_CODE_SIZE).map(HuffmanCode::decode))
    }
}
