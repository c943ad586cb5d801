//! Inverse move-to-front transform applied to decoded context maps.
//!
//! The move-to-front table is kept in the decoder state between calls. Only
//! the prefix that earlier calls could have disturbed is re-initialised: the
//! bound is the bitwise OR of every index seen, which is never smaller than
//! the largest one.

use crate::margin::MarginArray;

/// Move-to-front table with one scratch slot at logical index `-1`.
pub type MtfTable = MarginArray<u8, 1, 256>;

/// Bound covering the whole table, used before the first transform.
pub const MTF_UPPER_BOUND_INIT: u32 = 255;

/// Replaces each byte of `v` by the table entry it indexes, moving that entry
/// to the front. `upper_bound` is read to limit re-initialisation and updated
/// for the next call.
pub fn inverse_move_to_front_transform(v: &mut [u8], mtf: &mut MtfTable, upper_bound: &mut u32) {
    let reinit = (*upper_bound).min(MTF_UPPER_BOUND_INIT) as usize;
    for (i, slot) in mtf.as_mut_slice()[..=reinit].iter_mut().enumerate() {
        *slot = i as u8;
    }

    let mut bound = 0u32;
    for b in v.iter_mut() {
        let index = *b as usize;
        let value = mtf.as_slice()[index];
        bound |= u32::from(*b);
        *b = value;
        mtf.set(-1, value);
        // Logical [-1, index) slides up to [0, index].
        mtf.with_margin_mut().copy_within(0..=index, 1);
    }
    *upper_bound = bound;
}
