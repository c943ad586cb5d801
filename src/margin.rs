//! Fixed-capacity arrays addressable slightly below index zero.
//!
//! Some decoder loops keep list heads or a scratch slot immediately before the
//! logical start of an array (`list[-1]`, `list[-16]`). [`MarginArray`]
//! reserves `MARGIN` storage slots in front of the logical range and maps a
//! logical index `i` to storage index `i + MARGIN`, so indices in
//! `-MARGIN..LEN` are valid and everything else is rejected.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarginArray<T: Copy + Default, const MARGIN: usize, const LEN: usize> {
    storage: Vec<T>,
}

impl<T: Copy + Default, const MARGIN: usize, const LEN: usize> MarginArray<T, MARGIN, LEN> {
    pub fn new() -> Self {
        MarginArray { storage: vec![T::default(); MARGIN + LEN] }
    }

    /// Logical length, not counting the margin.
    #[inline]
    pub const fn len(&self) -> usize {
        LEN
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        LEN == 0
    }

    #[inline]
    fn slot(i: isize) -> Option<usize> {
        let s = i.checked_add(MARGIN as isize)?;
        if s < 0 || s as usize >= MARGIN + LEN {
            return None;
        }
        Some(s as usize)
    }

    #[inline]
    pub fn get(&self, i: isize) -> Option<T> {
        Self::slot(i).map(|s| self.storage[s])
    }

    /// Stores `v` at logical index `i`. Returns `false` outside `-MARGIN..LEN`.
    #[inline]
    pub fn set(&mut self, i: isize, v: T) -> bool {
        match Self::slot(i) {
            Some(s) => {
                self.storage[s] = v;
                true
            }
            None => false,
        }
    }

    /// Logical range `0..LEN`.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.storage[MARGIN..]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.storage[MARGIN..]
    }

    /// Storage including the margin; logical index `-MARGIN` is element 0.
    #[inline]
    pub fn with_margin_mut(&mut self) -> &mut [T] {
        &mut self.storage
    }
}

impl<T: Copy + Default, const MARGIN: usize, const LEN: usize> Default for MarginArray<T, MARGIN, LEN> {
    fn default() -> Self {
        Self::new()
    }
}
