//! Pluggable memory management for decoder state.
//!
//! Every heap block owned by a [`DecoderState`](crate::state::DecoderState)
//! is obtained from, and returned to, a [`MemoryManager`]. The manager wraps
//! an [`Allocator`]:
//!
//! - [`DefaultAllocator`]: stateless heap allocator, installed when the caller
//!   supplies nothing;
//! - [`FnAllocator`]: an allocate/free function pair plus an opaque context,
//!   the shape of the classic `alloc_func` / `free_func` / `opaque` hooks;
//! - [`TrackingAllocator`]: accounting wrapper (call counts, live addresses,
//!   live/peak bytes, optional byte limit to simulate out-of-memory).
//!
//! Blocks are plain `Box<[u8]>` buffers: an allocator that returns `None`
//! signals out-of-memory, and a block handed to `free` is gone for good.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Opaque context threaded through every [`AllocFunc`] / [`FreeFunc`] call.
pub type Opaque = Option<Arc<dyn Any + Send + Sync>>;

/// Allocation hook: returns a zero-initialised block of `size` bytes, or
/// `None` when memory is exhausted.
pub type AllocFunc = fn(opaque: Option<&(dyn Any + Send + Sync)>, size: usize) -> Option<Box<[u8]>>;

/// Release hook: takes back a block previously returned by the paired [`AllocFunc`].
pub type FreeFunc = fn(opaque: Option<&(dyn Any + Send + Sync)>, block: Box<[u8]>);

/// Allocate/free capability shared by every allocator flavour.
///
/// Implementations must be shareable between threads: one allocator may back
/// many independent decoder states at once.
pub trait Allocator: Send + Sync {
    /// Returns a zero-filled block of exactly `size` bytes, or `None` on OOM.
    fn allocate(&self, size: usize) -> Option<Box<[u8]>>;

    /// Takes ownership of a block returned by [`allocate`](Self::allocate).
    fn free(&self, block: Box<[u8]>);
}

// ─────────────────────────────────────────────────────────────────────────────
// Default heap allocator
// ─────────────────────────────────────────────────────────────────────────────

/// Heap allocate hook used when no custom pair is installed.
pub fn default_alloc_func(_opaque: Option<&(dyn Any + Send + Sync)>, size: usize) -> Option<Box<[u8]>> {
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(size).ok()?;
    buf.resize(size, 0);
    Some(buf.into_boxed_slice())
}

/// Heap free hook paired with [`default_alloc_func`].
pub fn default_free_func(_opaque: Option<&(dyn Any + Send + Sync)>, block: Box<[u8]>) {
    drop(block);
}

/// Stateless heap allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAllocator;

impl Allocator for DefaultAllocator {
    fn allocate(&self, size: usize) -> Option<Box<[u8]>> {
        default_alloc_func(None, size)
    }

    fn free(&self, block: Box<[u8]>) {
        default_free_func(None, block);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Function-pair allocator
// ─────────────────────────────────────────────────────────────────────────────

/// Caller-supplied allocate/free pair with an opaque context.
#[derive(Clone)]
pub struct FnAllocator {
    pub alloc_fn: AllocFunc,
    pub free_fn: FreeFunc,
    pub opaque: Opaque,
}

impl FnAllocator {
    pub fn new(alloc_fn: AllocFunc, free_fn: FreeFunc, opaque: Opaque) -> Self {
        FnAllocator { alloc_fn, free_fn, opaque }
    }
}

impl Allocator for FnAllocator {
    fn allocate(&self, size: usize) -> Option<Box<[u8]>> {
        (self.alloc_fn)(self.opaque.as_deref(), size)
    }

    fn free(&self, block: Box<[u8]>) {
        (self.free_fn)(self.opaque.as_deref(), block)
    }
}

impl fmt::Debug for FnAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAllocator")
            .field("alloc_fn", &"<fn>")
            .field("free_fn", &"<fn>")
            .field("opaque", &self.opaque.as_ref().map(|_| "<opaque>"))
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracking allocator
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of [`TrackingAllocator`] counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Successful allocate calls.
    pub allocations: usize,
    /// Free calls, including foreign ones.
    pub frees: usize,
    /// Allocate calls that returned `None`.
    pub failures: usize,
    /// Frees of blocks this allocator never handed out (or already freed).
    pub foreign_frees: usize,
    pub live_blocks: usize,
    pub live_bytes: usize,
    pub peak_bytes: usize,
}

impl AllocStats {
    /// `true` when everything handed out came back exactly once.
    pub fn is_balanced(&self) -> bool {
        self.live_blocks == 0 && self.live_bytes == 0 && self.foreign_frees == 0
    }
}

/// Accounting allocator. Records the address of every live block so frees can
/// be matched against allocations; optionally refuses requests that would push
/// live bytes past a limit.
pub struct TrackingAllocator {
    inner: Arc<dyn Allocator>,
    limit: Option<usize>,
    /// Live block address -> (count, size). Zero-sized blocks may share an address.
    live: Mutex<HashMap<usize, (usize, usize)>>,
    allocations: AtomicUsize,
    frees: AtomicUsize,
    failures: AtomicUsize,
    foreign_frees: AtomicUsize,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
}

impl TrackingAllocator {
    /// Tracks the default heap allocator with no limit.
    pub fn new() -> Self {
        Self::wrapping(Arc::new(DefaultAllocator))
    }

    /// Tracks an arbitrary allocator.
    pub fn wrapping(inner: Arc<dyn Allocator>) -> Self {
        TrackingAllocator {
            inner,
            limit: None,
            live: Mutex::new(HashMap::new()),
            allocations: AtomicUsize::new(0),
            frees: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            foreign_frees: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
        }
    }

    /// Fails any allocation that would raise live bytes above `limit`.
    pub fn with_limit(limit: usize) -> Self {
        let mut t = Self::new();
        t.limit = Some(limit);
        t
    }

    pub fn stats(&self) -> AllocStats {
        AllocStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            frees: self.frees.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            foreign_frees: self.foreign_frees.load(Ordering::Relaxed),
            live_blocks: self.live_table().values().map(|&(n, _)| n).sum(),
            live_bytes: self.live_bytes.load(Ordering::Relaxed),
            peak_bytes: self.peak_bytes.load(Ordering::Relaxed),
        }
    }

    /// `true` when a block starting at `addr` is currently outstanding.
    pub fn is_live(&self, addr: *const u8) -> bool {
        self.live_table().contains_key(&(addr as usize))
    }

    fn live_table(&self) -> std::sync::MutexGuard<'_, HashMap<usize, (usize, usize)>> {
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TrackingAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for TrackingAllocator {
    fn allocate(&self, size: usize) -> Option<Box<[u8]>> {
        // Reserve before allocating so concurrent callers cannot overshoot the limit.
        let reserved = self.live_bytes.fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
            live.checked_add(size).filter(|&n| self.limit.map_or(true, |limit| n <= limit))
        });
        let Ok(before) = reserved else {
            self.failures.fetch_add(1, Ordering::Relaxed);
            return None;
        };
        let Some(block) = self.inner.allocate(size) else {
            self.live_bytes.fetch_sub(size, Ordering::AcqRel);
            self.failures.fetch_add(1, Ordering::Relaxed);
            return None;
        };
        let entry = {
            let mut live = self.live_table();
            let e = live.entry(block.as_ptr() as usize).or_insert((0, size));
            e.0 += 1;
            *e
        };
        debug_assert_eq!(entry.1, size);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.peak_bytes.fetch_max(before + size, Ordering::Relaxed);
        Some(block)
    }

    fn free(&self, block: Box<[u8]>) {
        self.frees.fetch_add(1, Ordering::Relaxed);
        let addr = block.as_ptr() as usize;
        let known = {
            let mut live = self.live_table();
            match live.get_mut(&addr) {
                Some(e) if e.1 == block.len() => {
                    e.0 -= 1;
                    if e.0 == 0 {
                        live.remove(&addr);
                    }
                    true
                }
                _ => false,
            }
        };
        if known {
            self.live_bytes.fetch_sub(block.len(), Ordering::AcqRel);
        } else {
            self.foreign_frees.fetch_add(1, Ordering::Relaxed);
        }
        self.inner.free(block);
    }
}

impl fmt::Debug for TrackingAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingAllocator")
            .field("limit", &self.limit)
            .field("stats", &self.stats())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryManager / ManagedBlock
// ─────────────────────────────────────────────────────────────────────────────

/// A heap block obtained through a [`MemoryManager`].
///
/// Must be handed back with [`MemoryManager::free`]; dropping it directly
/// releases the bytes but bypasses the allocator's free hook.
#[derive(PartialEq, Eq)]
pub struct ManagedBlock {
    bytes: Box<[u8]>,
}

impl ManagedBlock {
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Start address, for identity checks only.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }
}

impl std::ops::Deref for ManagedBlock {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::ops::DerefMut for ManagedBlock {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl fmt::Debug for ManagedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedBlock")
            .field("addr", &self.bytes.as_ptr())
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Read-only handle to the allocator backing one or more decoder states.
///
/// Fixed at construction; cloning shares the same allocator.
#[derive(Clone)]
pub struct MemoryManager {
    allocator: Arc<dyn Allocator>,
    is_default: bool,
}

impl MemoryManager {
    /// Manager backed by `allocator`.
    pub fn new(allocator: Arc<dyn Allocator>) -> Self {
        MemoryManager { allocator, is_default: false }
    }

    /// Selects the allocator from an optional hook pair.
    ///
    /// With no `alloc_fn` the default heap pair is installed and `free_fn` /
    /// `opaque` are ignored. With an `alloc_fn` but no `free_fn`, blocks are
    /// released with [`default_free_func`].
    pub fn from_fns(alloc_fn: Option<AllocFunc>, free_fn: Option<FreeFunc>, opaque: Opaque) -> Self {
        match alloc_fn {
            None => Self::default(),
            Some(alloc_fn) => Self::new(Arc::new(FnAllocator::new(
                alloc_fn,
                free_fn.unwrap_or(default_free_func),
                opaque,
            ))),
        }
    }

    /// `true` when the stateless default allocator is installed.
    #[inline]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn allocator(&self) -> &Arc<dyn Allocator> {
        &self.allocator
    }

    /// Allocates `size` zeroed bytes, `None` on out-of-memory.
    pub fn allocate(&self, size: usize) -> Option<ManagedBlock> {
        match self.allocator.allocate(size) {
            Some(bytes) => {
                debug_assert_eq!(bytes.len(), size, "allocator returned a block of the wrong size");
                crate::displaylevel!(4, "brotli-state: alloc {} bytes @ {:p}\n", size, bytes.as_ptr());
                Some(ManagedBlock { bytes })
            }
            None => {
                crate::displaylevel!(4, "brotli-state: alloc {} bytes failed\n", size);
                None
            }
        }
    }

    /// Returns `block` to the allocator.
    pub fn free(&self, block: ManagedBlock) {
        crate::displaylevel!(4, "brotli-state: free {} bytes @ {:p}\n", block.len(), block.as_ptr());
        self.allocator.free(block.bytes);
    }

    /// Frees the block held in `slot`, if any, leaving `None`.
    #[inline]
    pub fn free_slot(&self, slot: &mut Option<ManagedBlock>) {
        if let Some(block) = slot.take() {
            self.free(block);
        }
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        MemoryManager { allocator: Arc::new(DefaultAllocator), is_default: true }
    }
}

impl fmt::Debug for MemoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryManager")
            .field("is_default", &self.is_default)
            .finish()
    }
}
