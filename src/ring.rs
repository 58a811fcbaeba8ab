//! Circular sequence of values with O(1) rotation
//!
//! Nodes live in a slot vector and link to each other by index. Freed slots
//! go onto a free list and are reused by later inserts, so the vector only
//! grows to the peak number of live nodes.

use std::fmt;

#[derive(Debug, Clone)]
struct Slot<T> {
    value: Option<T>,
    next: usize,
}

/// Circular singly-linked sequence
///
/// The ring tracks its tail; the head is the tail's successor. Rotating
/// advances the tail by one node, which moves the head to the back.
///
/// # Examples
///
/// ```
/// use esox_balancer::Ring;
///
/// let mut ring = Ring::new();
/// ring.add_last(1);
/// ring.add_last(2);
/// ring.add_last(3);
///
/// ring.rotate();
/// assert_eq!(ring.vals(), vec![2, 3, 1]);
/// assert_eq!(ring.first(), Some(&2));
/// assert_eq!(ring.last(), Some(&1));
/// ```
#[derive(Debug, Clone)]
pub struct Ring<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for Ring<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Ring<T> {
    /// Create an empty ring
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            tail: None,
            len: 0,
        }
    }

    /// Create an empty ring with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            tail: None,
            len: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes in the ring
    pub fn len(&self) -> usize {
        self.len
    }

    /// Current head
    pub fn first(&self) -> Option<&T> {
        let tail = self.tail?;
        self.slots[self.slots[tail].next].value.as_ref()
    }

    /// Current tail
    pub fn last(&self) -> Option<&T> {
        let tail = self.tail?;
        self.slots[tail].value.as_ref()
    }

    /// Move the head to the back. No-op on an empty ring.
    pub fn rotate(&mut self) {
        if let Some(tail) = self.tail {
            self.tail = Some(self.slots[tail].next);
        }
    }

    /// Insert a new head
    pub fn add_first(&mut self, value: T) {
        match self.tail {
            None => {
                let idx = self.alloc(value, 0);
                self.slots[idx].next = idx;
                self.tail = Some(idx);
            }
            Some(tail) => {
                let head = self.slots[tail].next;
                let idx = self.alloc(value, head);
                self.slots[tail].next = idx;
            }
        }
        self.len += 1;
    }

    /// Insert a new tail; the head is unaffected
    pub fn add_last(&mut self, value: T) {
        self.add_first(value);
        self.rotate();
    }

    /// Remove and return the head
    pub fn remove_first(&mut self) -> Option<T> {
        let tail = self.tail?;
        let head = self.slots[tail].next;

        if head == tail {
            self.tail = None;
        } else {
            self.slots[tail].next = self.slots[head].next;
        }

        self.len -= 1;
        self.release(head)
    }

    /// Remove and return the tail.
    ///
    /// Walks from the head to find the tail's predecessor, so this is O(n).
    pub fn remove_last(&mut self) -> Option<T> {
        let tail = self.tail?;

        if self.slots[tail].next == tail {
            self.tail = None;
        } else {
            let mut prev = self.slots[tail].next;
            while self.slots[prev].next != tail {
                prev = self.slots[prev].next;
            }
            self.slots[prev].next = self.slots[tail].next;
            self.tail = Some(prev);
        }

        self.len -= 1;
        self.release(tail)
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.tail = None;
        self.len = 0;
    }

    /// Iterate from head to tail
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            ring: self,
            cursor: self.tail.map(|tail| self.slots[tail].next),
            remaining: self.len,
        }
    }

    fn alloc(&mut self, value: T, next: usize) -> usize {
        let slot = Slot {
            value: Some(value),
            next,
        };
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = slot;
                idx
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> Option<T> {
        self.free.push(idx);
        self.slots[idx].value.take()
    }
}

impl<T: PartialEq> Ring<T> {
    /// Remove the first node, scanning from the head, that holds `value`.
    ///
    /// Returns `false` if no node matched. Only one node is removed per call.
    pub fn remove(&mut self, value: &T) -> bool {
        let Some(tail) = self.tail else {
            return false;
        };

        let mut prev = tail;
        let mut current = self.slots[tail].next;
        for _ in 0..self.len {
            if self.slots[current].value.as_ref() == Some(value) {
                if current == prev {
                    self.tail = None;
                } else {
                    self.slots[prev].next = self.slots[current].next;
                    if current == tail {
                        self.tail = Some(prev);
                    }
                }
                self.len -= 1;
                self.release(current);
                return true;
            }
            prev = current;
            current = self.slots[current].next;
        }

        false
    }

    /// Whether any node holds `value`
    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|v| v == value)
    }
}

impl<T: Clone> Ring<T> {
    /// Head-to-tail snapshot
    pub fn vals(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Display> fmt::Display for Ring<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "[ ]");
        }
        write!(f, "[ ")?;
        for value in self.iter() {
            write!(f, "{} ", value)?;
        }
        write!(f, "]")
    }
}

/// Head-to-tail iterator over a [`Ring`]
pub struct Iter<'a, T> {
    ring: &'a Ring<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.cursor?;
        let ring = self.ring;
        let slot = &ring.slots[idx];
        self.cursor = Some(slot.next);
        self.remaining -= 1;
        slot.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> IntoIterator for &'a Ring<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_of(values: &[i32]) -> Ring<i32> {
        let mut ring = Ring::new();
        for v in values {
            ring.add_last(*v);
        }
        ring
    }

    #[test]
    fn test_empty_ring() {
        let mut ring: Ring<i32> = Ring::new();
        assert!(ring.is_empty());
        assert_eq!(ring.first(), None);
        assert_eq!(ring.last(), None);
        assert_eq!(ring.remove_first(), None);
        assert_eq!(ring.remove_last(), None);
        assert!(!ring.remove(&1));
        ring.rotate();
        assert!(ring.vals().is_empty());
        assert_eq!(ring.to_string(), "[ ]");
    }

    #[test]
    fn test_add_first_single_node_loops() {
        let mut ring = Ring::new();
        ring.add_first(7);
        assert_eq!(ring.first(), Some(&7));
        assert_eq!(ring.last(), Some(&7));
        ring.rotate();
        assert_eq!(ring.first(), Some(&7));
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_add_first_and_last_order() {
        let mut ring = Ring::new();
        ring.add_first(2);
        ring.add_first(1);
        ring.add_last(3);
        assert_eq!(ring.vals(), vec![1, 2, 3]);
        assert_eq!(ring.first(), Some(&1));
        assert_eq!(ring.last(), Some(&3));
        assert_eq!(ring.to_string(), "[ 1 2 3 ]");
    }

    #[test]
    fn test_rotate_cycles_back() {
        let mut ring = ring_of(&[1, 2, 3]);
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(*ring.first().unwrap());
            ring.rotate();
        }
        assert_eq!(seen, vec![1, 2, 3, 1]);
    }

    #[test]
    fn test_remove_first_and_last() {
        let mut ring = ring_of(&[1, 2, 3]);
        assert_eq!(ring.remove_first(), Some(1));
        assert_eq!(ring.remove_last(), Some(3));
        assert_eq!(ring.vals(), vec![2]);
        assert_eq!(ring.remove_last(), Some(2));
        assert!(ring.is_empty());
        assert_eq!(ring.first(), None);
    }

    #[test]
    fn test_remove_middle_head_and_tail() {
        let mut ring = ring_of(&[1, 2, 3, 4]);
        assert!(ring.remove(&2));
        assert_eq!(ring.vals(), vec![1, 3, 4]);
        assert!(ring.remove(&4));
        assert_eq!(ring.vals(), vec![1, 3]);
        assert_eq!(ring.last(), Some(&3));
        assert!(ring.remove(&1));
        assert_eq!(ring.vals(), vec![3]);
        assert!(!ring.remove(&9));
        assert!(ring.remove(&3));
        assert!(ring.is_empty());
    }

    #[test]
    fn test_remove_only_first_duplicate() {
        let mut ring = ring_of(&[5, 1, 5]);
        assert!(ring.remove(&5));
        assert_eq!(ring.vals(), vec![1, 5]);
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_slots_reused_after_removal() {
        let mut ring = ring_of(&[1, 2, 3]);
        ring.remove(&2);
        ring.remove_first();
        ring.add_last(4);
        ring.add_last(5);
        assert_eq!(ring.vals(), vec![3, 4, 5]);
        assert_eq!(ring.slots.len(), 3);
    }

    #[test]
    fn test_after_rotation_removal_keeps_order() {
        let mut ring = ring_of(&[1, 2, 3]);
        ring.rotate();
        assert!(ring.remove(&1));
        assert_eq!(ring.vals(), vec![2, 3]);
        assert_eq!(ring.last(), Some(&3));
        assert!(ring.contains(&2));
        assert!(!ring.contains(&1));
    }

    #[test]
    fn test_clear() {
        let mut ring = ring_of(&[1, 2]);
        ring.clear();
        assert!(ring.is_empty());
        ring.add_first(3);
        assert_eq!(ring.vals(), vec![3]);
    }
}
