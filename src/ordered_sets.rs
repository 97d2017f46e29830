// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Ordered sets and fixpoint iteration
//!
//! An [OrderedSet] is a set that remembers insertion order. Equality is set equality
//! (order is ignored) but iteration always follows insertion order, so every
//! construction that enumerates a set produces the same result on the same input.
//!
//! Function [fixpoint] computes the smallest superset of a seed that is closed
//! under a monotone expansion. All the closures in this crate (reachability,
//! ε-closure, nullable and generating nonterminals) are computed this way.
//!

use std::{fmt::Display, hash::Hash, ops::Index};

use indexmap::IndexSet;

///
/// Insertion-ordered set
///
#[derive(Debug, Clone)]
pub struct OrderedSet<T: Hash + Eq> {
    values: IndexSet<T>,
}

impl<T: Hash + Eq> Default for OrderedSet<T> {
    fn default() -> Self {
        OrderedSet {
            values: IndexSet::new(),
        }
    }
}

/// Set equality: two ordered sets are equal if they contain the same elements,
/// in any order.
impl<T: Hash + Eq> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<T: Hash + Eq> Eq for OrderedSet<T> {}

impl<T: Hash + Eq> OrderedSet<T> {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set with a single element
    pub fn singleton(x: T) -> Self {
        let mut s = Self::new();
        s.insert(x);
        s
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check whether x is in the set
    pub fn contains(&self, x: &T) -> bool {
        self.values.contains(x)
    }

    ///
    /// Add x at the end of the set
    /// - return true if x is new
    /// - return false if x was already present (its position doesn't change)
    ///
    pub fn insert(&mut self, x: T) -> bool {
        self.values.insert(x)
    }

    ///
    /// Add x at the end of the set if it's not present
    /// - return the position of x and whether it's new
    ///
    pub fn insert_full(&mut self, x: T) -> (usize, bool) {
        self.values.insert_full(x)
    }

    /// Position of x in insertion order
    pub fn index_of(&self, x: &T) -> Option<usize> {
        self.values.get_index_of(x)
    }

    /// Element at position i in insertion order
    pub fn get_index(&self, i: usize) -> Option<&T> {
        self.values.get_index(i)
    }

    /// First element in insertion order
    pub fn first(&self) -> Option<&T> {
        self.values.first()
    }

    /// Iterator in insertion order
    pub fn iter(&self) -> indexmap::set::Iter<'_, T> {
        self.values.iter()
    }

    /// Check whether all elements of self are in other
    pub fn is_subset(&self, other: &Self) -> bool {
        self.values.is_subset(&other.values)
    }

    /// Check whether self and other have no element in common
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.values.is_disjoint(&other.values)
    }

    /// Remove all elements that don't satisfy p, preserving the order of the others
    pub fn retain(&mut self, p: impl FnMut(&T) -> bool) {
        self.values.retain(p)
    }
}

impl<T: Hash + Eq + Clone> OrderedSet<T> {
    /// Elements of self followed by the elements of other that are not in self
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.extend(other.iter().cloned());
        result
    }

    /// Elements of self that are also in other, in the order of self
    pub fn intersection(&self, other: &Self) -> Self {
        self.iter().filter(|x| other.contains(x)).cloned().collect()
    }

    /// Elements of self that are not in other, in the order of self
    pub fn difference(&self, other: &Self) -> Self {
        self.iter().filter(|x| !other.contains(x)).cloned().collect()
    }

    ///
    /// Cartesian product
    /// - the pairs are enumerated in lexicographic order: all pairs with the
    ///   first element of self come first, and so forth.
    ///
    pub fn product<U: Hash + Eq + Clone>(&self, other: &OrderedSet<U>) -> OrderedSet<(T, U)> {
        let mut result = OrderedSet::new();
        for x in self.iter() {
            for y in other.iter() {
                result.insert((x.clone(), y.clone()));
            }
        }
        result
    }

    /// Union of a family of sets
    pub fn union_all<'a>(sets: impl IntoIterator<Item = &'a Self>) -> Self
    where
        T: 'a,
    {
        let mut result = Self::new();
        for s in sets {
            result.extend(s.iter().cloned());
        }
        result
    }
}

impl<T: Hash + Eq + Ord + Clone> OrderedSet<T> {
    /// Elements in increasing order
    pub fn sorted(&self) -> Vec<T> {
        let mut v: Vec<T> = self.iter().cloned().collect();
        v.sort();
        v
    }
}

impl<T: Hash + Eq> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        OrderedSet {
            values: iter.into_iter().collect(),
        }
    }
}

impl<T: Hash + Eq> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.values.extend(iter)
    }
}

/// Element at position i in insertion order (panics if i is out of bounds)
impl<T: Hash + Eq> Index<usize> for OrderedSet<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.values[i]
    }
}

impl<T: Hash + Eq> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = indexmap::set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a, T: Hash + Eq> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = indexmap::set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<T: Hash + Eq + Display> Display for OrderedSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "\u{2205}");
        }
        write!(f, "{{")?;
        for (i, x) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, "}}")
    }
}

///
/// Smallest superset of seed closed under expand
///
/// At each round, the elements produced by `expand(acc)` are added to the accumulator.
/// Iteration stops as soon as a round adds nothing. Since each round can only grow
/// the accumulator, this terminates as long as `expand` produces elements from a
/// finite universe.
///
pub fn fixpoint<T, F>(seed: OrderedSet<T>, expand: F) -> OrderedSet<T>
where
    T: Hash + Eq + Clone,
    F: Fn(&OrderedSet<T>) -> OrderedSet<T>,
{
    let mut acc = seed;
    loop {
        let size = acc.len();
        let new = expand(&acc);
        acc.extend(new);
        if acc.len() == size {
            return acc;
        }
    }
}
