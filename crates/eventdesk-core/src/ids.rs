//! Per-table monotonic id counters.
//!
//! Ids start at 1. Every restored record is passed through
//! [`IdAllocator::observe`] so a freshly allocated id never collides with a
//! loaded one.

/// Issues increasing ids for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// The id the next [`allocate`](Self::allocate) call will return.
    #[must_use]
    pub const fn peek(&self) -> u32 {
        self.next
    }

    /// Return the current id and advance the counter. The counter stops at
    /// `u32::MAX`; the codec never restores a record with that id.
    pub const fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }

    /// Bump the counter past `id` if it is not already beyond it.
    pub const fn observe(&mut self, id: u32) {
        if id >= self.next {
            self.next = id.saturating_add(1);
        }
    }

    /// Re-seed from a set of restored ids: the counter lands on
    /// `max(ids) + 1`, or stays put if that would move it backwards.
    pub fn observe_all(&mut self, ids: impl IntoIterator<Item = u32>) {
        if let Some(max) = ids.into_iter().max() {
            self.observe(max);
        }
    }
}

/// One allocator per table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdRegistry {
    pub users: IdAllocator,
    pub events: IdAllocator,
    pub attendees: IdAllocator,
    pub inventory: IdAllocator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_from_one() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn observe_only_moves_forward() {
        let mut ids = IdAllocator::new();
        ids.observe(10);
        assert_eq!(ids.peek(), 11);
        ids.observe(4);
        assert_eq!(ids.peek(), 11);
        ids.observe(11);
        assert_eq!(ids.allocate(), 12);
    }

    #[test]
    fn observe_all_seeds_from_max() {
        let mut ids = IdAllocator::new();
        ids.observe_all([3, 9, 5]);
        assert_eq!(ids.allocate(), 10);

        let mut empty = IdAllocator::new();
        empty.observe_all(std::iter::empty());
        assert_eq!(empty.allocate(), 1);
    }

    #[test]
    fn observing_the_largest_id_does_not_overflow() {
        let mut ids = IdAllocator::new();
        ids.observe(u32::MAX - 1);
        assert_eq!(ids.peek(), u32::MAX);
        ids.observe(u32::MAX);
        assert_eq!(ids.peek(), u32::MAX);
        assert_eq!(ids.allocate(), u32::MAX);
        assert_eq!(ids.peek(), u32::MAX);
    }
}
