//! Arena-backed doubly-linked lists, one per wheel slot.
//!
//! All nodes live in a single growable arena shared by every slot, with an
//! intrusive free list for reuse. Insertion hands back a [`NodeRef`] holding
//! the arena index and the entry's generation; the generation is bumped every
//! time an entry is freed, so a reference that outlived its node is rejected
//! instead of unlinking whatever now occupies that index.

/// Opaque reference to a node in a [`SlotRing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    idx: usize,
    generation: u32,
}

struct Node<T> {
    value: T,
    slot: usize,
    prev: Option<usize>,
    next: Option<usize>,
}

enum Entry<T> {
    Occupied { node: Node<T>, generation: u32 },
    Vacant { next_free: Option<usize>, generation: u32 },
}

#[derive(Debug, Default, Clone, Copy)]
struct List {
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

/// A fixed number of FIFO lists sharing one node arena.
pub struct SlotRing<T> {
    entries: Vec<Entry<T>>,
    free_head: Option<usize>,
    lists: Vec<List>,
    len: usize,
}

impl<T> SlotRing<T> {
    pub fn new(slot_count: usize) -> Self {
        Self {
            entries: Vec::new(),
            free_head: None,
            lists: vec![List::default(); slot_count],
            len: 0,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.lists.len()
    }

    /// Total number of values across all slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn slot_len(&self, slot: usize) -> usize {
        self.lists[slot].len
    }

    /// Append `value` to the tail of `slot`.
    pub fn push_back(&mut self, slot: usize, value: T) -> NodeRef {
        let tail = self.lists[slot].tail;
        let (idx, generation) = self.alloc(Node {
            value,
            slot,
            prev: tail,
            next: None,
        });

        match tail {
            Some(t) => {
                if let Some(node) = self.node_mut(t) {
                    node.next = Some(idx);
                }
            }
            None => self.lists[slot].head = Some(idx),
        }

        let list = &mut self.lists[slot];
        list.tail = Some(idx);
        list.len += 1;
        self.len += 1;

        NodeRef { idx, generation }
    }

    /// Unlink and return the value behind `node`.
    ///
    /// Returns `None` if the reference is stale or `node` does not belong to `slot`.
    pub fn remove(&mut self, slot: usize, node: NodeRef) -> Option<T> {
        match self.entries.get(node.idx) {
            Some(Entry::Occupied { node: n, generation })
                if *generation == node.generation && n.slot == slot => {}
            _ => return None,
        }
        self.unlink(node.idx);
        self.release(node.idx)
    }

    pub fn get(&self, node: NodeRef) -> Option<&T> {
        match self.entries.get(node.idx) {
            Some(Entry::Occupied { node: n, generation }) if *generation == node.generation => {
                Some(&n.value)
            }
            _ => None,
        }
    }

    /// Walk `slot` from head to tail, removing every value for which `take`
    /// returns true and passing it to `sink`. Survivors keep their order.
    pub fn drain_where(
        &mut self,
        slot: usize,
        mut take: impl FnMut(&mut T) -> bool,
        mut sink: impl FnMut(T),
    ) {
        let mut cursor = self.lists[slot].head;
        while let Some(idx) = cursor {
            let Some(node) = self.node_mut(idx) else {
                break;
            };
            cursor = node.next;
            if take(&mut node.value) {
                self.unlink(idx);
                if let Some(value) = self.release(idx) {
                    sink(value);
                }
            }
        }
    }

    /// Iterate `slot` from head to tail.
    #[cfg(test)]
    pub fn iter(&self, slot: usize) -> impl Iterator<Item = (NodeRef, &T)> + '_ {
        let mut cursor = self.lists[slot].head;
        std::iter::from_fn(move || {
            let idx = cursor?;
            match &self.entries[idx] {
                Entry::Occupied { node, generation } => {
                    cursor = node.next;
                    Some((
                        NodeRef {
                            idx,
                            generation: *generation,
                        },
                        &node.value,
                    ))
                }
                Entry::Vacant { .. } => None,
            }
        })
    }

    fn alloc(&mut self, node: Node<T>) -> (usize, u32) {
        if let Some(idx) = self.free_head {
            if let Entry::Vacant {
                next_free,
                generation,
            } = self.entries[idx]
            {
                self.free_head = next_free;
                self.entries[idx] = Entry::Occupied { node, generation };
                return (idx, generation);
            }
        }
        let idx = self.entries.len();
        self.entries.push(Entry::Occupied {
            node,
            generation: 0,
        });
        (idx, 0)
    }

    /// Detach an occupied entry from its slot list; the entry stays allocated.
    fn unlink(&mut self, idx: usize) {
        let Some(node) = self.node_mut(idx) else {
            return;
        };
        let (slot, prev, next) = (node.slot, node.prev.take(), node.next.take());

        match prev {
            Some(p) => {
                if let Some(pnode) = self.node_mut(p) {
                    pnode.next = next;
                }
            }
            None => self.lists[slot].head = next,
        }
        match next {
            Some(n) => {
                if let Some(nnode) = self.node_mut(n) {
                    nnode.prev = prev;
                }
            }
            None => self.lists[slot].tail = prev,
        }

        self.lists[slot].len -= 1;
        self.len -= 1;
    }

    /// Return an entry to the free list, bumping its generation.
    fn release(&mut self, idx: usize) -> Option<T> {
        let generation = match &self.entries[idx] {
            Entry::Occupied { generation, .. } => *generation,
            Entry::Vacant { .. } => return None,
        };
        let entry = std::mem::replace(
            &mut self.entries[idx],
            Entry::Vacant {
                next_free: self.free_head,
                generation: generation.wrapping_add(1),
            },
        );
        self.free_head = Some(idx);
        match entry {
            Entry::Occupied { node, .. } => Some(node.value),
            Entry::Vacant { .. } => None,
        }
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<T>> {
        match self.entries.get_mut(idx) {
            Some(Entry::Occupied { node, .. }) => Some(node),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(ring: &SlotRing<u32>, slot: usize) -> Vec<u32> {
        ring.iter(slot).map(|(_, v)| *v).collect()
    }

    #[test]
    fn test_push_back_keeps_insertion_order() {
        let mut ring = SlotRing::new(4);
        ring.push_back(1, 10);
        ring.push_back(1, 11);
        ring.push_back(3, 30);
        ring.push_back(1, 12);

        assert_eq!(values(&ring, 1), vec![10, 11, 12]);
        assert_eq!(values(&ring, 3), vec![30]);
        assert_eq!(ring.slot_len(1), 3);
        assert_eq!(ring.slot_len(0), 0);
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn test_remove_head_middle_tail() {
        let mut ring = SlotRing::new(1);
        let a = ring.push_back(0, 1);
        let b = ring.push_back(0, 2);
        let c = ring.push_back(0, 3);
        let d = ring.push_back(0, 4);

        assert_eq!(ring.remove(0, b), Some(2));
        assert_eq!(values(&ring, 0), vec![1, 3, 4]);
        assert_eq!(ring.remove(0, a), Some(1));
        assert_eq!(values(&ring, 0), vec![3, 4]);
        assert_eq!(ring.remove(0, d), Some(4));
        assert_eq!(values(&ring, 0), vec![3]);
        assert_eq!(ring.remove(0, c), Some(3));
        assert!(ring.is_empty());
        assert_eq!(values(&ring, 0), Vec::<u32>::new());

        // The list must still be usable after being emptied.
        ring.push_back(0, 5);
        assert_eq!(values(&ring, 0), vec![5]);
    }

    #[test]
    fn test_stale_reference_is_rejected() {
        let mut ring = SlotRing::new(2);
        let old = ring.push_back(0, 7);
        assert_eq!(ring.remove(0, old), Some(7));

        // The freed entry is reused with a new generation.
        let new = ring.push_back(0, 8);
        assert_ne!(old, new);
        assert_eq!(ring.remove(0, old), None);
        assert_eq!(ring.get(old), None);
        assert_eq!(ring.get(new), Some(&8));
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_remove_from_wrong_slot_is_rejected() {
        let mut ring = SlotRing::new(2);
        let node = ring.push_back(1, 9);
        assert_eq!(ring.remove(0, node), None);
        assert_eq!(ring.slot_len(1), 1);
        assert_eq!(ring.remove(1, node), Some(9));
    }

    #[test]
    fn test_drain_where_removes_selected() {
        let mut ring = SlotRing::new(2);
        for v in 0..6 {
            ring.push_back(0, v);
        }
        ring.push_back(1, 100);

        let mut drained = Vec::new();
        ring.drain_where(0, |v| *v % 2 == 0, |v| drained.push(v));

        assert_eq!(drained, vec![0, 2, 4]);
        assert_eq!(values(&ring, 0), vec![1, 3, 5]);
        assert_eq!(values(&ring, 1), vec![100]);
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn test_drain_where_can_mutate_survivors() {
        let mut ring = SlotRing::new(1);
        ring.push_back(0, 0);
        ring.push_back(0, 2);

        let mut drained = Vec::new();
        ring.drain_where(
            0,
            |v| {
                if *v == 0 {
                    true
                } else {
                    *v -= 1;
                    false
                }
            },
            |v| drained.push(v),
        );

        assert_eq!(drained, vec![0]);
        assert_eq!(values(&ring, 0), vec![1]);
    }
}
