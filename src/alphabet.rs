// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Symbols and alphabets
//!
//! An [Alphabet] is a finite set of characters without duplicates. The empty-string
//! marker [EPSILON] is never part of an alphabet: ε-transitions are labeled with
//! [Symbol::Epsilon] instead.
//!

use std::fmt::Display;

use crate::{errors::Error, ordered_sets::OrderedSet};

/// The character used for the empty string in rule text and regular expressions
pub const EPSILON: char = '\u{03B5}';

///
/// Transition label: either a character or the empty string
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// Empty string
    Epsilon,
    /// A character of the alphabet
    Char(char),
}

impl Symbol {
    /// Check whether this is ε
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        if c == EPSILON {
            Symbol::Epsilon
        } else {
            Symbol::Char(c)
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Epsilon => EPSILON.fmt(f),
            Symbol::Char(c) => c.fmt(f),
        }
    }
}

///
/// Alphabet
///
/// Characters are indexed from 0 to N-1 in declaration order.
/// Equality ignores the order.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alphabet {
    chars: OrderedSet<char>,
}

impl Alphabet {
    ///
    /// Build an alphabet from a list of characters
    ///
    /// # Errors
    ///
    /// - [Error::DuplicateSymbol] if a character occurs twice
    /// - [Error::MalformedAlphabet] if the list contains [EPSILON]
    ///
    pub fn new(chars: impl IntoIterator<Item = char>) -> Result<Self, Error> {
        let mut set = OrderedSet::new();
        for c in chars {
            if c == EPSILON {
                return Err(Error::MalformedAlphabet(c));
            }
            if !set.insert(c) {
                return Err(Error::DuplicateSymbol(c));
            }
        }
        Ok(Alphabet { chars: set })
    }

    /// Same as new, for internally constructed alphabets that are known to be valid
    pub(crate) fn from_set(chars: OrderedSet<char>) -> Self {
        debug_assert!(!chars.contains(&EPSILON));
        Alphabet { chars }
    }

    /// Number of characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Check whether the alphabet is empty
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Check whether c is in the alphabet
    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// Index of character c
    pub fn index_of(&self, c: char) -> Option<usize> {
        self.chars.index_of(&c)
    }

    /// Character of index i
    ///
    /// # Panics
    ///
    /// If i is out of bounds
    pub fn char_at(&self, i: usize) -> char {
        self.chars.get_index(i).copied().unwrap_or_else(|| {
            panic!("alphabet index {i} out of bounds");
        })
    }

    /// Characters in declaration order
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    /// Same alphabet, sorted
    pub fn sorted(&self) -> Self {
        Alphabet {
            chars: self.chars.sorted().into_iter().collect(),
        }
    }

    /// Characters of self followed by the characters of other not in self
    pub fn union(&self, other: &Self) -> Self {
        Alphabet {
            chars: self.chars.union(&other.chars),
        }
    }
}

impl Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.chars.fmt(f)
    }
}
