//! Bounded circular log of recently-seen keys.
//!
//! Remembers the last `capacity` keys passed to [`RecencyBuffer::add`] and
//! answers membership with a linear scan. The buffer is intentionally small
//! (a fraction of the frequent tier) so the scan stays within a handful of
//! cache lines and beats a hashed lookup.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      RecencyBuffer<K> (capacity 4)                      │
//! │                                                                         │
//! │   After add: a, b, c, d, e                                              │
//! │                                                                         │
//! │   Index:     0        1        2        3                               │
//! │            ┌────────┬────────┬────────┬────────┐                        │
//! │   slots:   │Some(e) │Some(b) │Some(c) │Some(d) │                        │
//! │            └────────┴────────┴────────┴────────┘                        │
//! │                        ▲                                                │
//! │                        │                                                │
//! │                 cursor = 1 (next write goes here, oldest entry)         │
//! │                                                                         │
//! │   add(f):                                                               │
//! │     1. slots[cursor] = Some(f)     → b is forgotten                     │
//! │     2. cursor = (cursor + 1) % 4   → cursor = 2                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation | Description                            | Complexity |
//! |-----------|----------------------------------------|------------|
//! | `add`     | Overwrite the oldest slot              | O(1)       |
//! | `test`    | Membership by linear scan              | O(R)       |
//! | `clear`   | Forget every key                       | O(R)       |
//!
//! ## Example Usage
//!
//! ```
//! use tiny2q::ds::RecencyBuffer;
//!
//! let mut recents = RecencyBuffer::new(2);
//! recents.add(1u32);
//! recents.add(2);
//! assert!(recents.test(&1));
//!
//! // Third add overwrites the oldest slot
//! recents.add(3);
//! assert!(!recents.test(&1));
//! assert!(recents.test(&2));
//! assert!(recents.test(&3));
//! ```
//!
//! ## Implementation Notes
//!
//! - Empty slots are `None`, so every key value is usable (no sentinel).
//! - Duplicates are not detected: adding a key already present spends a slot.
//! - Zero capacity is a no-op buffer.
//! - Storage is a boxed slice allocated once in [`RecencyBuffer::new`].

/// Fixed-size ring of recently added keys.
#[derive(Debug, Clone)]
pub struct RecencyBuffer<K> {
    slots: Box<[Option<K>]>,
    cursor: usize,
}

impl<K> RecencyBuffer<K>
where
    K: Copy + Eq,
{
    /// Creates a buffer remembering the last `capacity` added keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            cursor: 0,
        }
    }

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of occupied slots (duplicates counted).
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns `true` if nothing has been added since construction or `clear`.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Returns `true` if `key` occupies any slot.
    ///
    /// ```
    /// use tiny2q::ds::RecencyBuffer;
    ///
    /// let mut recents = RecencyBuffer::new(32);
    /// assert!(!recents.test(&42u32));
    /// recents.add(42);
    /// assert!(recents.test(&42));
    /// ```
    #[inline]
    pub fn test(&self, key: &K) -> bool {
        self.slots.iter().any(|slot| slot.as_ref() == Some(key))
    }

    /// Records `key`, overwriting the oldest slot.
    #[inline]
    pub fn add(&mut self, key: K) {
        let capacity = self.slots.len();
        if capacity == 0 {
            return;
        }
        self.slots[self.cursor] = Some(key);
        self.cursor = (self.cursor + 1) % capacity;
    }

    /// Forgets every key. Storage is kept.
    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.cursor = 0;
    }

    /// Iterates over recorded keys, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        let capacity = self.slots.len();
        (1..=capacity).filter_map(move |k| {
            let idx = (self.cursor + capacity - k) % capacity;
            self.slots[idx].as_ref()
        })
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.slots.is_empty() {
            assert_eq!(self.cursor, 0);
            return;
        }
        assert!(self.cursor < self.slots.len());
        // Slots fill in cursor order, so any empty slot must be at or past the cursor
        // until the first wrap.
        if let Some(first_empty) = self.slots.iter().position(Option::is_none) {
            assert_eq!(first_empty, self.cursor);
            assert!(self.slots[first_empty..].iter().all(Option::is_none));
        }
    }
}
