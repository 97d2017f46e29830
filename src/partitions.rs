// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Partitions of an integer set
//!
//! We consider a set of N integers [0 ... n-1].
//! A partition is a division of set into K disjoint, non-empty blocks.
//!
//! Refinement is stable: splitting a block never changes the relative order
//! of its elements, and the sub-block that contains the block's first element
//! keeps the block's id. New blocks get ids in order of creation.
//!

use std::{collections::HashMap, fmt::Display, hash::Hash};

// Implementation:
// - each block is identified by an integer between 0 and K-1 (the block id)
// - each block is also a slice in a segments array
// - segments[0 ... n-1]: is a permutation of the n integers
// - block[j] is a pair (start, end) such that 0 <= start < end <= n:
// This means that block[j] is the set of integers in segment[start .. end].
// - block_id[x] = id of the block that contains x

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockHeader {
    start: usize,
    end: usize,
}

///
/// A partition divides a set of integers [0 ... N-1]
/// into disjoint, non-empty blocks.
///
#[derive(Debug, Clone)]
pub struct Partition {
    // block descriptors
    block: Vec<BlockHeader>,
    // segment = concatenation of the blocks
    segment: Box<[u32]>,
    // mapping from element to block id
    block_id: Box<[u32]>,
}

impl Partition {
    ///
    /// Create a new partition for n elements
    /// - if n == 0, the partition has no blocks
    /// - if n > 0, the partition is initialized with a single block
    ///   (id = 0) that contains all elements [0 .. n-1] in increasing order
    ///
    pub fn new(n: u32) -> Self {
        let size = n as usize;
        let segment: Box<[u32]> = (0..n).collect();
        let block = if n == 0 {
            Vec::new()
        } else {
            vec![BlockHeader {
                start: 0,
                end: size,
            }]
        };
        Partition {
            block,
            segment,
            block_id: vec![0; size].into_boxed_slice(),
        }
    }

    ///
    /// Number of blocks
    ///
    pub fn num_blocks(&self) -> u32 {
        self.block.len() as u32
    }

    ///
    /// Size of block i
    ///
    pub fn block_size(&self, i: u32) -> u32 {
        let BlockHeader { start, end } = self.block[i as usize];
        (end - start) as u32
    }

    ///
    /// Iterator to get all elements of block i
    ///
    pub fn block_elements(&self, i: u32) -> impl Iterator<Item = u32> + '_ {
        self.slice(i).iter().copied()
    }

    ///
    /// Pick the first element of block i
    ///
    pub fn pick_element(&self, i: u32) -> u32 {
        self.segment[self.block[i as usize].start]
    }

    ///
    /// Block id for element x
    ///
    pub fn block_id(&self, x: u32) -> u32 {
        self.block_id[x as usize]
    }

    ///
    /// Snapshot of the element-to-block map
    ///
    pub fn block_ids(&self) -> Box<[u32]> {
        self.block_id.clone()
    }

    ///
    /// Slice of self.segment corresponding to block i
    ///
    fn slice(&self, i: u32) -> &[u32] {
        let BlockHeader { start, end } = self.block[i as usize];
        &self.segment[start..end]
    }

    ///
    /// Refine a block according to a predicate p
    /// - split block i into to sub-blocks B1 and B2
    ///   B1 = { x in block i | p(x) }
    ///   B2 = { x in block i | not p(x) }
    /// - if B1 or B2 is empty, block i is unchanged and the result is None
    /// - otherwise, the sub-block that contains the first element of block i
    ///   keeps id i, a new block is created for the other one, and the result
    ///   is the id of the new block.
    ///
    pub fn refine_block<P>(&mut self, i: u32, p: P) -> Option<u32>
    where
        P: Fn(u32) -> bool,
    {
        let new_blocks = self.split_block_by_key(i, |x| !p(x));
        debug_assert!(new_blocks <= 1);
        if new_blocks == 0 {
            None
        } else {
            Some(self.num_blocks() - 1)
        }
    }

    ///
    /// Split block i into classes of elements that have the same key
    /// - the classes are ordered by the first occurrence of their key in the block
    /// - the first class keeps id i, the others get fresh ids in that order
    /// - elements keep their relative order within each class
    /// - return the number of new blocks created (0 if all elements of block i have
    ///   the same key)
    ///
    pub fn split_block_by_key<K, F>(&mut self, i: u32, key: F) -> usize
    where
        K: Eq + Hash,
        F: Fn(u32) -> K,
    {
        let BlockHeader { start, end } = self.block[i as usize];
        let mut class_of_key: HashMap<K, usize> = HashMap::new();
        let mut classes: Vec<Vec<u32>> = Vec::new();
        for &x in &self.segment[start..end] {
            let next = classes.len();
            let c = *class_of_key.entry(key(x)).or_insert(next);
            if c == next {
                classes.push(Vec::new());
            }
            classes[c].push(x);
        }
        if classes.len() <= 1 {
            return 0;
        }

        let mut k = start;
        for (c, elements) in classes.iter().enumerate() {
            let id = if c == 0 {
                self.block[i as usize].end = start + elements.len();
                i
            } else {
                let id = self.num_blocks();
                self.block.push(BlockHeader {
                    start: k,
                    end: k + elements.len(),
                });
                id
            };
            for &x in elements {
                self.segment[k] = x;
                self.block_id[x as usize] = id;
                k += 1;
            }
        }
        debug_assert_eq!(k, end);
        classes.len() - 1
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.num_blocks() {
            write!(f, "block[{i}]: ")?;
            for x in self.block_elements(i) {
                write!(f, " {x}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_refine() {
        let mut p = Partition::new(20);
        println!("Initial partition:\n{p}");

        assert_eq!(p.num_blocks(), 1);
        for i in 0..20 {
            assert_eq!(p.block_id(i), 0);
        }

        assert_eq!(p.refine_block(0, |x| x < 100), None);
        assert_eq!(p.refine_block(0, |x| (x & 1) == 0), Some(1));
        println!("Even/odd numbers:\n{p}");

        for i in 0..p.num_blocks() {
            p.refine_block(i, |x| x % 3 == 0);
        }
        assert_eq!(p.num_blocks(), 4);
        println!("Even/odd/multiples of three:\n{p}");

        // block 0: multiples of 6
        // block 1: odd numbers that are not multiples of 3
        // block 2: even numbers that are not multiples of 3
        // block 3: odd multiples of 3
        for i in 0..20 {
            let expected = match i % 6 {
                0 => 0,
                1 | 5 => 1,
                2 | 4 => 2,
                3 => 3,
                _ => panic!(),
            };
            assert_eq!(p.block_id(i), expected);
        }

        // elements keep their relative order
        let evens: Vec<u32> = p.block_elements(2).collect();
        assert_eq!(evens, vec![2, 4, 8, 10, 14, 16]);
    }

    #[test]
    fn test_split_by_key() {
        let mut p = Partition::new(10);
        let created = p.split_block_by_key(0, |x| (x + 1) % 3);
        println!("Classes mod 3:\n{p}");
        assert_eq!(created, 2);
        // first element 0 has key 1: its class keeps id 0
        assert_eq!(p.block_elements(0).collect::<Vec<_>>(), vec![0, 3, 6, 9]);
        assert_eq!(p.block_elements(1).collect::<Vec<_>>(), vec![1, 4, 7]);
        assert_eq!(p.block_elements(2).collect::<Vec<_>>(), vec![2, 5, 8]);
        assert_eq!(p.pick_element(2), 2);
        assert_eq!(p.split_block_by_key(1, |_| 0), 0);
        assert_eq!((0..p.num_blocks()).map(|b| p.block_size(b)).sum::<u32>(), 10);
        assert_eq!(p.block_size(0), 4);
    }
}
