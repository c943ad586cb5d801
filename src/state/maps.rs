//! Per-metablock tables: context maps, tree groups, block-type trees.

use super::{ContextMapKind, ContextMode, DecoderState, TreeGroupKind};
use crate::arena::SplitArena;
use crate::config::{
    DISTANCE_CONTEXT_BITS, LITERAL_CONTEXT_BITS, NUM_DISTANCE_SHORT_CODES,
    NUM_INSERT_COPY_SYMBOLS, NUM_LITERAL_SYMBOLS,
};
use crate::error::DecoderError;
use crate::huffman::{HuffmanTreeGroup, HUFFMAN_CODE_SIZE, HUFFMAN_MAX_SIZE_26, HUFFMAN_MAX_SIZE_258};
use crate::memory::ManagedBlock;
use crate::transform::inverse_move_to_front_transform;

/// Entries per block category in the block-type trees.
pub const BLOCK_TYPE_TREE_SIZE: usize = HUFFMAN_MAX_SIZE_258;
/// Entries per block category in the block-length trees.
pub const BLOCK_LEN_TREE_SIZE: usize = HUFFMAN_MAX_SIZE_26;

impl<'d> DecoderState<'d> {
    // ── Tree groups ─────────────────────────────────────────────────────────

    pub fn tree_group(&self, kind: TreeGroupKind) -> &HuffmanTreeGroup {
        match kind {
            TreeGroupKind::Literal => &self.literal_hgroup,
            TreeGroupKind::InsertCopy => &self.insert_copy_hgroup,
            TreeGroupKind::Distance => &self.distance_hgroup,
        }
    }

    pub fn tree_group_mut(&mut self, kind: TreeGroupKind) -> &mut HuffmanTreeGroup {
        match kind {
            TreeGroupKind::Literal => &mut self.literal_hgroup,
            TreeGroupKind::InsertCopy => &mut self.insert_copy_hgroup,
            TreeGroupKind::Distance => &mut self.distance_hgroup,
        }
    }

    /// Reserves one group's tables through this state's memory manager.
    pub fn tree_group_init(&mut self, kind: TreeGroupKind, alphabet_size: u32, ntrees: u32) -> Result<(), DecoderError> {
        let mm = self.mm.clone();
        self.tree_group_mut(kind).init(&mm, alphabet_size, ntrees)
    }

    /// Releases one group's combined allocation. Idempotent.
    pub fn tree_group_release(&mut self, kind: TreeGroupKind) {
        let mm = self.mm.clone();
        self.tree_group_mut(kind).release(&mm);
    }

    /// Size of the distance alphabet implied by the current distance parameters.
    pub fn distance_alphabet_size(&self) -> u32 {
        NUM_DISTANCE_SHORT_CODES + self.num_direct_distance_codes + (48 << self.distance_postfix_bits)
    }

    /// Reserves all three tree groups for the current metablock:
    /// `num_literal_htrees` literal tables, one insert-and-copy table per
    /// command block type and `num_dist_htrees` distance tables. On failure
    /// nothing stays allocated.
    pub fn init_tree_groups(&mut self) -> Result<(), DecoderError> {
        if let Err(e) = self.init_each_tree_group() {
            crate::displaylevel!(4, "brotli-state: tree group setup failed: {}\n", e);
            self.tree_group_release(TreeGroupKind::Literal);
            self.tree_group_release(TreeGroupKind::InsertCopy);
            self.tree_group_release(TreeGroupKind::Distance);
            return Err(e);
        }
        Ok(())
    }

    fn init_each_tree_group(&mut self) -> Result<(), DecoderError> {
        let (literal_trees, command_trees, dist_trees) =
            (self.num_literal_htrees, self.num_block_types[1], self.num_dist_htrees);
        let dist_alphabet = self.distance_alphabet_size();
        self.tree_group_init(TreeGroupKind::Literal, NUM_LITERAL_SYMBOLS, literal_trees)?;
        self.tree_group_init(TreeGroupKind::InsertCopy, NUM_INSERT_COPY_SYMBOLS, command_trees)?;
        self.tree_group_init(TreeGroupKind::Distance, dist_alphabet, dist_trees)
    }

    // ── Context maps ────────────────────────────────────────────────────────

    /// Allocates one context-mode byte per literal block type.
    pub fn allocate_context_modes(&mut self, num_block_types: usize) -> Result<(), DecoderError> {
        self.mm.free_slot(&mut self.context_modes);
        self.context_modes = self.mm.allocate(num_block_types);
        self.context_modes.as_ref().map(|_| ()).ok_or(DecoderError::AllocContextModes)
    }

    /// Allocates a context map of `len` entries for `kind`, replacing any
    /// previous one.
    pub fn allocate_map(&mut self, kind: ContextMapKind, len: usize) -> Result<(), DecoderError> {
        let slot = match kind {
            ContextMapKind::Literal => &mut self.context_map,
            ContextMapKind::Distance => &mut self.dist_context_map,
        };
        self.mm.free_slot(slot);
        *slot = self.mm.allocate(len);
        slot.as_ref().map(|_| ()).ok_or(DecoderError::AllocContextMap)
    }

    pub fn allocate_context_map(&mut self, len: usize) -> Result<(), DecoderError> {
        self.allocate_map(ContextMapKind::Literal, len)
    }

    pub fn allocate_dist_context_map(&mut self, len: usize) -> Result<(), DecoderError> {
        self.allocate_map(ContextMapKind::Distance, len)
    }

    pub fn context_modes(&self) -> Option<&[u8]> {
        self.context_modes.as_deref()
    }

    pub fn context_modes_mut(&mut self) -> Option<&mut [u8]> {
        self.context_modes.as_deref_mut()
    }

    pub fn context_map(&self) -> Option<&[u8]> {
        self.context_map.as_deref()
    }

    pub fn context_map_mut(&mut self) -> Option<&mut [u8]> {
        self.context_map.as_deref_mut()
    }

    pub fn dist_context_map(&self) -> Option<&[u8]> {
        self.dist_context_map.as_deref()
    }

    pub fn dist_context_map_mut(&mut self) -> Option<&mut [u8]> {
        self.dist_context_map.as_deref_mut()
    }

    /// Undoes the move-to-front coding of a freshly decoded context map.
    pub fn inverse_move_to_front_transform(&mut self, kind: ContextMapKind) -> Result<(), DecoderError> {
        let map: Option<&mut ManagedBlock> = match kind {
            ContextMapKind::Literal => self.context_map.as_mut(),
            ContextMapKind::Distance => self.dist_context_map.as_mut(),
        };
        let map = map.ok_or(DecoderError::InvalidArguments)?;
        inverse_move_to_front_transform(map, &mut self.mtf, &mut self.mtf_upper_bound);
        Ok(())
    }

    /// Switches literal decoding to `block_type`: selects its context-map row,
    /// its first literal table and its context lookup tables.
    pub fn select_literal_context_map(&mut self, block_type: u32) -> Result<(), DecoderError> {
        let slice = (block_type as usize) << LITERAL_CONTEXT_BITS;
        let map = self.context_map.as_deref().ok_or(DecoderError::InvalidArguments)?;
        let index = *map.get(slice).ok_or(DecoderError::InvalidArguments)?;
        let mode = self
            .context_modes
            .as_deref()
            .and_then(|m| m.get(block_type as usize))
            .and_then(|&bits| ContextMode::from_bits(bits))
            .ok_or(DecoderError::InvalidArguments)?;
        let (lookup1, lookup2) = mode.lookup_offsets();

        self.context_map_slice = Some(slice);
        self.literal_htree_index = index;
        self.literal_htree = self.literal_hgroup.htree(index as usize);
        self.context_lookup1 = Some(lookup1);
        self.context_lookup2 = Some(lookup2);
        Ok(())
    }

    /// Switches distance decoding to `block_type`.
    pub fn select_dist_context_map(&mut self, block_type: u32) -> Result<(), DecoderError> {
        let slice = (block_type as usize) << DISTANCE_CONTEXT_BITS;
        let map = self.dist_context_map.as_deref().ok_or(DecoderError::InvalidArguments)?;
        let index = *map.get(slice).ok_or(DecoderError::InvalidArguments)?;
        self.dist_context_map_slice = Some(slice);
        self.dist_htree_index = index;
        Ok(())
    }

    // ── Block-type / block-length trees ─────────────────────────────────────

    /// Allocates the block-type and block-length tables for all three
    /// categories as one block. Does nothing if already allocated.
    pub fn allocate_block_type_trees(&mut self) -> Result<(), DecoderError> {
        if self.block_trees.is_some() {
            return Ok(());
        }
        self.block_trees = SplitArena::allocate(
            &self.mm,
            3 * BLOCK_TYPE_TREE_SIZE * HUFFMAN_CODE_SIZE,
            3 * BLOCK_LEN_TREE_SIZE * HUFFMAN_CODE_SIZE,
        );
        self.block_trees.as_ref().map(|_| ()).ok_or(DecoderError::AllocBlockTypeTrees)
    }

    /// Block-type tables: category `c` starts at entry `c * BLOCK_TYPE_TREE_SIZE`.
    pub fn block_type_trees(&self) -> Option<&[u8]> {
        self.block_trees.as_ref().map(|a| a.head())
    }

    pub fn block_type_trees_mut(&mut self) -> Option<&mut [u8]> {
        self.block_trees.as_mut().map(|a| a.head_mut())
    }

    /// Block-length tables: category `c` starts at entry `c * BLOCK_LEN_TREE_SIZE`.
    pub fn block_len_trees(&self) -> Option<&[u8]> {
        self.block_trees.as_ref().map(|a| a.tail())
    }

    pub fn block_len_trees_mut(&mut self) -> Option<&mut [u8]> {
        self.block_trees.as_mut().map(|a| a.tail_mut())
    }
}
