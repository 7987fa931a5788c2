//! Fixed-capacity LRU store for the frequent tier.
//!
//! Pairs a [`SlotList`] of key slots (the recency order) with an index from
//! key to `{ value, slot }`. The list is pre-filled with `capacity` empty
//! slots, so promotion and eviction are one operation: overwrite the tail
//! slot and splice it to the head.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │                          FrequentStore<K, V>                              │
//! │                                                                           │
//! │   index: FxHashMap<K, Entry<V>>          list: SlotList<Option<K>>        │
//! │   ┌──────┬───────────────────┐                                            │
//! │   │ key  │ { value, slot }   │           head                     tail    │
//! │   ├──────┼───────────────────┤            ▼                        ▼      │
//! │   │  42  │ { v42, id_2 }     │──────►  [id_2:42] ◄─► [id_0:7] ◄─► [id_1:_]│
//! │   │   7  │ { v7,  id_0 }     │──────►     MRU                      victim │
//! │   └──────┴───────────────────┘                                            │
//! │                                                                           │
//! │   promote(k, v):                                                          │
//! │     1. victim = list.back_id()                                            │
//! │     2. if victim holds a key → index.remove(old)   (eviction)             │
//! │     3. list[victim] = Some(k); list.move_to_front(victim)                 │
//! │     4. index.insert(k, { v, victim })                                     │
//! └───────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//!
//! - `list.len() == capacity` for the lifetime of the store.
//! - `index.len()` equals the number of occupied list slots.
//! - For every `(k, entry)` in the index, `list[entry.slot] == Some(k)`.
//!
//! ## Performance
//!
//! | Operation         | Time | Allocates |
//! |-------------------|------|-----------|
//! | `get_and_touch`   | O(1) | no        |
//! | `promote`         | O(1) | no        |
//! | `peek`/`contains` | O(1) | no        |
//! | `clear`           | O(n) | no        |
//!
//! The index table is reserved at construction for at least `2 * capacity`
//! entries. With at most `capacity` live keys the table stays under half
//! full, so `hashbrown` can always purge deleted buckets by rehashing in
//! place instead of growing.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_list::{SlotId, SlotList};
use crate::error::InvariantError;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    slot: SlotId,
}

/// Result of a [`FrequentStore::promote`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion<K> {
    /// The key took an empty slot; nothing was evicted.
    Filled,
    /// The key replaced the least-recently-used key, which is returned.
    Evicted(K),
    /// The key was already resident; its value was refreshed.
    Refreshed,
    /// The store has no slots; nothing was stored.
    Rejected,
}

/// Fixed-capacity, recency-ordered key/value store.
#[derive(Debug, Clone)]
pub struct FrequentStore<K, V> {
    list: SlotList<Option<K>>,
    index: FxHashMap<K, Entry<V>>,
}

impl<K, V> FrequentStore<K, V>
where
    K: Copy + Eq + Hash,
{
    /// Creates a store with `capacity` empty slots and an index reserved for
    /// `index_reserve` entries (at least `2 * capacity`).
    ///
    /// A zero-capacity store holds nothing; every promotion is
    /// [`Promotion::Rejected`].
    pub fn new(capacity: usize, index_reserve: usize) -> Self {
        Self {
            list: SlotList::filled(capacity, None),
            index: FxHashMap::with_capacity_and_hasher(
                index_reserve.max(capacity.saturating_mul(2)),
                Default::default(),
            ),
        }
    }

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.list.len()
    }

    /// Returns the number of resident keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no key is resident.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns `true` if `key` is resident. Does not reorder.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the value for `key` without reordering.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|entry| &entry.value)
    }

    /// Returns the value for `key` and makes it the most recently used.
    ///
    /// ```
    /// use tiny2q::store::frequent::FrequentStore;
    ///
    /// let mut store = FrequentStore::new(2, 2);
    /// store.promote(1u32, "one");
    /// store.promote(2, "two");
    ///
    /// // 1 is now LRU; touching it protects it from the next promotion
    /// assert_eq!(store.get_and_touch(&1), Some(&"one"));
    /// store.promote(3, "three");
    /// assert!(store.contains(&1));
    /// assert!(!store.contains(&2));
    /// ```
    #[inline]
    pub fn get_and_touch(&mut self, key: &K) -> Option<&V> {
        let entry = self.index.get(key)?;
        self.list.move_to_front(entry.slot);
        Some(&entry.value)
    }

    /// Installs `key` in the least-recently-used slot and makes it the most
    /// recently used, evicting the slot's previous key if there was one.
    ///
    /// A key that is already resident is refreshed in place instead, so the
    /// index never points two slots at one key.
    pub fn promote(&mut self, key: K, value: V) -> Promotion<K> {
        if let Some(entry) = self.index.get_mut(&key) {
            entry.value = value;
            self.list.move_to_front(entry.slot);
            return Promotion::Refreshed;
        }

        let Some(victim) = self.list.back_id() else {
            return Promotion::Rejected;
        };
        let previous = self.list.get_mut(victim).and_then(|slot| slot.replace(key));
        if let Some(old_key) = previous {
            self.index.remove(&old_key);
        }
        self.list.move_to_front(victim);
        self.index.insert(key, Entry { value, slot: victim });

        match previous {
            Some(old_key) => Promotion::Evicted(old_key),
            None => Promotion::Filled,
        }
    }

    /// Returns the key that the next promotion would evict, if any.
    pub fn victim(&self) -> Option<&K> {
        self.list
            .back_id()
            .and_then(|id| self.list.get(id))
            .and_then(Option::as_ref)
    }

    /// Iterates over resident keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter().filter_map(Option::as_ref)
    }

    /// Empties every slot and the index. No storage is released.
    pub fn clear(&mut self) {
        self.list.fill(None);
        self.index.clear();
    }

    /// Returns the capacity the index was reserved with.
    pub fn index_capacity(&self) -> usize {
        self.index.capacity()
    }

    /// Verifies that the index and the list describe the same keys.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut occupied = 0usize;
        let mut walked = 0usize;
        for id in self.list.iter_ids() {
            walked += 1;
            if walked > self.list.len() {
                return Err(InvariantError::new("frequent list contains a cycle"));
            }
            let Some(Some(key)) = self.list.get(id) else {
                continue;
            };
            occupied += 1;
            match self.index.get(key) {
                Some(entry) if entry.slot == id => {},
                Some(entry) => {
                    return Err(InvariantError::new(format!(
                        "slot {} holds a key indexed at slot {}",
                        id.index(),
                        entry.slot.index()
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "slot {} holds a key missing from the index",
                        id.index()
                    )));
                },
            }
        }
        if walked != self.list.len() {
            return Err(InvariantError::new(format!(
                "walked {} slots but list has {}",
                walked,
                self.list.len()
            )));
        }
        if occupied != self.index.len() {
            return Err(InvariantError::new(format!(
                "index has {} entries but list has {} occupied slots",
                self.index.len(),
                occupied
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.list.debug_validate_invariants();
        if let Err(err) = self.check_invariants() {
            panic!("{}", err);
        }
    }
}
