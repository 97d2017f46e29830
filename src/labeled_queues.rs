// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Queues for breadth-first exploration of labeled graphs
//!

use std::hash::Hash;

use indexmap::IndexMap;

///
/// Labeled queue to explore a graph from a root
/// - T: type of nodes
/// - L: type of labels
///
/// For every node N that's been visited (except the root), we keep
/// a pair (label, predecessor), where the predecessor is a node
/// on a shortest path from the root to N.
///
// map[0 .. next-1] have been popped. map[next ..] are in the queue.
// The root is mapped to None.
#[derive(Debug)]
pub struct LabeledQueue<T: Hash + Eq, L> {
    map: IndexMap<T, Option<(L, T)>>,
    next: usize,
}

impl<T: Eq + Hash + Clone, L: Clone> LabeledQueue<T, L> {
    ///
    /// Initialize to explore from a root
    ///
    pub fn new(root: T) -> Self {
        let mut map = IndexMap::new();
        map.insert(root, None);
        LabeledQueue { map, next: 0 }
    }

    ///
    /// Push a successor of a node into the queue
    /// - no effect if the node has been visited before
    /// - otherwise, record that node is reachable from pre via label.
    /// - return true if this node is new, false otherwise
    ///
    pub fn push(&mut self, pre: T, label: L, suc: T) -> bool {
        if self.map.contains_key(&suc) {
            false
        } else {
            self.map.insert(suc, Some((label, pre)));
            true
        }
    }

    ///
    /// Get the node first in the queue
    ///
    pub fn pop(&mut self) -> Option<T> {
        let (node, _) = self.map.get_index(self.next)?;
        self.next += 1;
        Some(node.clone())
    }

    ///
    /// Path from the root to a node
    /// - return None if the node has not been visited
    /// - return the list of labels on the path from root to node
    ///   otherwise (empty if node is the root)
    ///
    pub fn path(&self, node: &T) -> Option<Vec<L>> {
        let mut edge = self.map.get(node)?;
        let mut result = Vec::new();
        while let Some((label, pre)) = edge {
            result.push(label.clone());
            edge = &self.map[pre];
        }
        result.reverse();
        Some(result)
    }
}
