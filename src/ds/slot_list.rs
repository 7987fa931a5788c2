//! Fixed-length doubly linked list stored in a single arena.
//!
//! Nodes live in one `Vec` allocated at construction and are linked by
//! [`SlotId`] index rather than pointer. The list never grows or shrinks:
//! callers overwrite node values in place and reorder nodes with
//! [`SlotList::move_to_front`], which is O(1) and never allocates.
//!
//! ## Architecture
//!
//! ```text
//!   nodes (Box<[Node<T>]>), allocated once
//!   ┌────────┬──────────────────────────────────────────────────┐
//!   │ SlotId │ Node { value, prev, next }                       │
//!   ├────────┼──────────────────────────────────────────────────┤
//!   │ id_0   │ { value: A, prev: Some(id_2), next: None }       │
//!   │ id_1   │ { value: B, prev: None, next: Some(id_2) }       │
//!   │ id_2   │ { value: C, prev: Some(id_1), next: Some(id_0) } │
//!   └────────┴──────────────────────────────────────────────────┘
//!
//!   head ─► [id_1] ◄──► [id_2] ◄──► [id_0] ◄── tail
//!             MRU                     LRU
//! ```
//!
//! ## Operations
//! - `move_to_front(id)`: detach + attach to head
//! - `back_id()`: the LRU node, next to be overwritten
//! - `get_mut(id)`: overwrite a node value in place
//!
//! ## Performance
//! - `move_to_front` / `front_id` / `back_id` / `get`: O(1)
//! - `iter`: O(n)
//!
//! `debug_validate_invariants()` is available in debug/test builds.

/// Stable handle to a node in a [`SlotList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Arena-backed list with a length fixed at construction.
#[derive(Debug, Clone)]
pub struct SlotList<T> {
    nodes: Box<[Node<T>]>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> SlotList<T> {
    /// Creates a list of `len` nodes, each holding a clone of `value`.
    ///
    /// Nodes are linked in index order: `id_0` is the head, `id_{len-1}` the tail.
    ///
    /// ```
    /// use tiny2q::ds::SlotList;
    ///
    /// let list = SlotList::filled(3, 0u8);
    /// assert_eq!(list.len(), 3);
    /// assert_eq!(list.front_id().map(|id| id.index()), Some(0));
    /// assert_eq!(list.back_id().map(|id| id.index()), Some(2));
    /// ```
    pub fn filled(len: usize, value: T) -> Self
    where
        T: Clone,
    {
        let nodes: Box<[Node<T>]> = (0..len)
            .map(|idx| Node {
                value: value.clone(),
                prev: idx.checked_sub(1).map(SlotId),
                next: (idx + 1 < len).then_some(SlotId(idx + 1)),
            })
            .collect();
        let (head, tail) = if len == 0 {
            (None, None)
        } else {
            (Some(SlotId(0)), Some(SlotId(len - 1)))
        };
        Self { nodes, head, tail }
    }

    /// Returns the number of nodes. Constant for the lifetime of the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the list was built with zero nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the SlotId at the front (MRU) of the list.
    #[inline]
    pub fn front_id(&self) -> Option<SlotId> {
        self.head
    }

    /// Returns the SlotId at the back (LRU) of the list.
    #[inline]
    pub fn back_id(&self) -> Option<SlotId> {
        self.tail
    }

    /// Returns the value for a node id, if in range.
    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.nodes.get(id.0).map(|node| &node.value)
    }

    /// Returns a mutable reference to a node value, if in range.
    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.nodes.get_mut(id.0).map(|node| &mut node.value)
    }

    /// Moves a node to the front; returns `false` if `id` is out of range.
    #[inline]
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if id.0 >= self.nodes.len() {
            return false;
        }
        if Some(id) == self.head {
            return true;
        }
        self.detach(id);
        self.attach_front(id);
        true
    }

    /// Returns an iterator from front to back.
    pub fn iter(&self) -> SlotListIter<'_, T> {
        SlotListIter {
            list: self,
            current: self.head,
        }
    }

    /// Returns an iterator of SlotIds from front to back.
    pub fn iter_ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        std::iter::successors(self.head, |id| self.nodes[id.0].next)
    }

    /// Overwrites every node value with a clone of `value`, keeping the order.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        for node in self.nodes.iter_mut() {
            node.value = value.clone();
        }
    }

    fn detach(&mut self, id: SlotId) {
        let (prev, next) = {
            let node = &self.nodes[id.0];
            (node.prev, node.next)
        };

        match prev {
            Some(prev_id) => self.nodes[prev_id.0].next = next,
            None => self.head = next,
        }
        match next {
            Some(next_id) => self.nodes[next_id.0].prev = prev,
            None => self.tail = prev,
        }

        let node = &mut self.nodes[id.0];
        node.prev = None;
        node.next = None;
    }

    fn attach_front(&mut self, id: SlotId) {
        let old_head = self.head;
        {
            let node = &mut self.nodes[id.0];
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(old_head) => self.nodes[old_head.0].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    #[cfg(any(test, debug_assertions))]
    /// Returns the list order as SlotIds from head to tail.
    pub fn debug_snapshot_ids(&self) -> Vec<SlotId> {
        self.iter_ids().collect()
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.nodes.is_empty() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            return;
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut count = 0usize;
        let mut current = self.head;
        let mut prev = None;

        while let Some(id) = current {
            assert!(!seen[id.0], "cycle at {:?}", id);
            seen[id.0] = true;
            let node = &self.nodes[id.0];
            assert_eq!(node.prev, prev);
            if node.next.is_none() {
                assert_eq!(self.tail, Some(id));
            }
            prev = Some(id);
            current = node.next;
            count += 1;
        }

        assert_eq!(count, self.nodes.len());
    }
}

pub struct SlotListIter<'a, T> {
    list: &'a SlotList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for SlotListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.nodes.get(id.0)?;
        self.current = node.next;
        Some(&node.value)
    }
}
