//! Const-generic, stack-allocated ring of newline offsets.
//!
//! `NewlineRing<N>` stores up to `N` [`Offset`] values without heap
//! allocation. It is the sliding window of the line index: entries are pushed
//! at the back while scanning forward and at the front while scanning
//! backward, and a push into a full ring evicts from the opposite end.
//!
//! # Constraints
//!
//! - `N` must be non-zero (checked at compile time when the ring is built).
//! - `no_std`, no `heapless` here: the backing array lives inside the owning
//!   wrapper so its size is visible in the task stack budget.
//! - Entries are not kept sorted by the ring itself; the wrapper only ever
//!   pushes offsets in increasing order.

use platform::Offset;

/// A fixed-capacity double-ended ring of byte offsets.
#[derive(Debug, Clone)]
pub struct NewlineRing<const N: usize> {
    buf: [Offset; N],
    /// Physical index of the logical front entry.
    head: usize,
    /// Number of valid entries.
    len: usize,
}

impl<const N: usize> NewlineRing<N> {
    const NON_EMPTY: () = assert!(N > 0, "NewlineRing capacity must be non-zero");

    /// Create a new, empty ring.
    ///
    /// `const` so that a wrapper can be placed in a `static`.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)] // forces the compile-time capacity check
        let () = Self::NON_EMPTY;
        Self {
            buf: [0; N],
            head: 0,
            len: 0,
        }
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when no entries are present.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` when the ring holds `N` entries.
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Maximum number of entries.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Entry at logical position `index` (0 = front).
    #[allow(clippy::indexing_slicing)] // Safety: physical() < N
    pub fn get(&self, index: usize) -> Option<Offset> {
        (index < self.len).then(|| self.buf[self.physical(index)])
    }

    /// First entry.
    pub fn front(&self) -> Option<Offset> {
        self.get(0)
    }

    /// Last entry.
    pub fn back(&self) -> Option<Offset> {
        self.len.checked_sub(1).and_then(|last| self.get(last))
    }

    /// Append `value`, evicting and returning the front entry if full.
    #[allow(clippy::indexing_slicing)] // Safety: physical() < N
    #[allow(clippy::arithmetic_side_effects)] // Safety: len < N after eviction
    pub fn push_back(&mut self, value: Offset) -> Option<Offset> {
        let evicted = if self.is_full() { self.pop_front() } else { None };
        let slot = self.physical(self.len);
        self.buf[slot] = value;
        self.len += 1;
        evicted
    }

    /// Append `value` only if there is room. Returns `false` when full.
    pub fn try_push_back(&mut self, value: Offset) -> bool {
        if self.is_full() {
            return false;
        }
        self.push_back(value);
        true
    }

    /// Prepend `value`, evicting and returning the back entry if full.
    #[allow(clippy::indexing_slicing)] // Safety: head < N invariant
    #[allow(clippy::arithmetic_side_effects)] // Safety: head + N - 1 cannot overflow for head < N; len < N after eviction
    pub fn push_front(&mut self, value: Offset) -> Option<Offset> {
        let evicted = if self.is_full() { self.pop_back() } else { None };
        self.head = (self.head + N - 1) % N;
        self.buf[self.head] = value;
        self.len += 1;
        evicted
    }

    /// Remove and return the front entry.
    #[allow(clippy::arithmetic_side_effects)] // Safety: ring wrap via % N; len > 0 checked
    pub fn pop_front(&mut self) -> Option<Offset> {
        let value = self.front()?;
        self.head = (self.head + 1) % N;
        self.len -= 1;
        Some(value)
    }

    /// Remove and return the back entry.
    #[allow(clippy::arithmetic_side_effects)] // Safety: len > 0 checked by back()
    pub fn pop_back(&mut self) -> Option<Offset> {
        let value = self.back()?;
        self.len -= 1;
        Some(value)
    }

    /// Entries from front to back.
    pub fn iter(&self) -> impl Iterator<Item = Offset> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    #[allow(clippy::arithmetic_side_effects)] // Safety: head < N and index < N, sum < 2N
    fn physical(&self, index: usize) -> usize {
        (self.head + index) % N
    }
}

impl<const N: usize> Default for NewlineRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
