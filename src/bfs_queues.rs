// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Queue + set for breadth-first exploration of states
//!

use std::hash::Hash;

use indexmap::IndexSet;

///
/// A BfsQueue is a queue that doesn't contain duplicate elements.
/// - the push operation adds an element at the end of the queue
///   if this element hasn't been seen before. Otherwise, it's a no-op.
/// - the pop operations takes the element at the front of the queue
///   if the queue is not empty.
///
/// Popped elements are not forgotten: after the exploration, [into_visited](Self::into_visited)
/// lists every element ever pushed, in first-visit order.
///
// Invariant: elements[0 .. next-1] have been popped,
// elements[next ..] are still in the queue.
#[derive(Debug)]
pub struct BfsQueue<T: Hash + Eq> {
    elements: IndexSet<T>,
    next: usize,
}

impl<T: Eq + Hash + Clone> BfsQueue<T> {
    ///
    /// Create a new queue with default capacity
    ///
    pub fn new() -> Self {
        BfsQueue {
            elements: IndexSet::new(),
            next: 0,
        }
    }

    ///
    /// Add an element at the end of the queue if it's not been seen before
    /// - return true if this is a new element
    /// - return false otherwise
    ///
    pub fn push(&mut self, element: T) -> bool {
        self.elements.insert(element)
    }

    ///
    /// Push an element if it's new and return its index in visit order
    ///
    pub fn intern(&mut self, element: T) -> usize {
        self.elements.insert_full(element).0
    }

    ///
    /// Push all elements from an iterator
    ///
    pub fn push_all(&mut self, iter: impl IntoIterator<Item = T>) {
        for x in iter {
            self.push(x);
        }
    }

    ///
    /// Number of elements still in the queue
    ///
    pub fn len(&self) -> usize {
        self.elements.len() - self.next
    }

    ///
    /// Get the first element in the queue
    /// - return None if the queue is empty
    ///
    pub fn pop(&mut self) -> Option<T> {
        let x = self.elements.get_index(self.next)?.clone();
        self.next += 1;
        Some(x)
    }

    ///
    /// Consume the queue and return the visited elements
    ///
    pub fn into_visited(self) -> IndexSet<T> {
        self.elements
    }
}

impl<T: Eq + Hash + Clone> Default for BfsQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_queue() {
        let mut queue = BfsQueue::new();
        assert_eq!(queue.len(), 0);
        assert!(queue.push(3));
        assert!(queue.push(1));
        assert!(!queue.push(3));
        assert_eq!(queue.pop(), Some(3));
        queue.push_all([1, 2, 3]);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.intern(1), 1);
        assert_eq!(queue.intern(7), 3);
        assert_eq!(queue.pop(), Some(7));
        assert_eq!(queue.pop(), None);
        let order: Vec<u32> = queue.into_visited().into_iter().collect();
        assert_eq!(order, vec![3, 1, 2, 7]);
    }
}
