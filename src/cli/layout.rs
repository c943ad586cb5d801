// layout.rs: `brstate layout`, tree-group memory layout

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::args::LayoutArgs;
use crate::huffman::{HuffmanTreeGroup, HTREE_SLOT_SIZE, HUFFMAN_CODE_SIZE};
use crate::memory::{MemoryManager, TrackingAllocator};

/// Layout of one tree group as reported by `brstate layout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLayout {
    pub alphabet_size: u32,
    pub num_htrees: u32,
    pub max_table_size: usize,
    pub codes_bytes: usize,
    pub htrees_offset: usize,
    pub htrees_bytes: usize,
    pub total_bytes: usize,
    pub allocations: usize,
}

/// Builds a group for real and reads its layout back.
pub fn measure(alphabet_size: u32, ntrees: u32) -> Result<GroupLayout> {
    let tracker = Arc::new(TrackingAllocator::new());
    let mm = MemoryManager::new(tracker.clone());
    let mut group = HuffmanTreeGroup::new();
    group
        .init(&mm, alphabet_size, ntrees)
        .with_context(|| format!("cannot build a group of {ntrees} trees over {alphabet_size} symbols"))?;

    let layout = GroupLayout {
        alphabet_size,
        num_htrees: ntrees,
        max_table_size: group.max_table_size(),
        codes_bytes: group.codes_len() * HUFFMAN_CODE_SIZE,
        htrees_offset: group.htrees_offset().unwrap_or(0),
        htrees_bytes: ntrees as usize * HTREE_SLOT_SIZE,
        total_bytes: group.allocated_bytes(),
        allocations: tracker.stats().allocations,
    };
    group.release(&mm);
    Ok(layout)
}

pub fn run(args: &LayoutArgs) -> Result<()> {
    let l = measure(args.alphabet, args.trees)?;
    crate::displayout!("alphabet_size   {}\n", l.alphabet_size);
    crate::displayout!("num_htrees      {}\n", l.num_htrees);
    crate::displayout!("max_table_size  {}\n", l.max_table_size);
    crate::displayout!("codes_bytes     {}\n", l.codes_bytes);
    crate::displayout!("htrees_offset   {}\n", l.htrees_offset);
    crate::displayout!("htrees_bytes    {}\n", l.htrees_bytes);
    crate::displayout!("total_bytes     {}\n", l.total_bytes);
    crate::displaylevel!(3, "allocations     {}\n", l.allocations);
    Ok(())
}
