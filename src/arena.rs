//! One allocation, two views.
//!
//! Some decoder structures are always created and destroyed together (a tree
//! group's decode tables and its per-tree offset slots; the block-type and
//! block-length tables). [`SplitArena`] packs both into a single
//! [`ManagedBlock`] and exposes them as a head view `[0, split)` and a tail
//! view `[split, len)`. There is exactly one block to free.

use crate::memory::{ManagedBlock, MemoryManager};

#[derive(Debug)]
pub struct SplitArena {
    block: ManagedBlock,
    split: usize,
}

impl SplitArena {
    /// Allocates `head_len + tail_len` bytes through `mm` in a single request.
    ///
    /// Returns `None` when the allocator is out of memory or the size overflows.
    pub fn allocate(mm: &MemoryManager, head_len: usize, tail_len: usize) -> Option<Self> {
        let total = head_len.checked_add(tail_len)?;
        let block = mm.allocate(total)?;
        Some(SplitArena { block, split: head_len })
    }

    /// Byte offset of the tail view from the start of the block.
    #[inline]
    pub fn split(&self) -> usize {
        self.split
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.block.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// Start address of the whole block (and of the head view).
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.block.as_ptr()
    }

    #[inline]
    pub fn head(&self) -> &[u8] {
        &self.block[..self.split]
    }

    #[inline]
    pub fn head_mut(&mut self) -> &mut [u8] {
        &mut self.block[..self.split]
    }

    #[inline]
    pub fn tail(&self) -> &[u8] {
        &self.block[self.split..]
    }

    #[inline]
    pub fn tail_mut(&mut self) -> &mut [u8] {
        &mut self.block[self.split..]
    }

    /// Returns the underlying block to `mm`. Both views go with it.
    pub fn release(self, mm: &MemoryManager) {
        mm.free(self.block);
    }
}
