// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Non-deterministic finite-state automata, possibly with ε-transitions
//!
//! States are indexed by an integer from 0 to N-1 and have a label.
//! The transition relation maps a pair (state, symbol) to a non-empty set of
//! states. The symbol is either a character of the alphabet or ε.
//!
//! Non-deterministic automata are constructed with an
//! [AutomatonBuilder](crate::automata::AutomatonBuilder).
//!

use std::fmt::Display;

use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    alphabet::{Alphabet, Symbol},
    automata::{Dfa, State},
    bfs_queues::BfsQueue,
    ordered_sets::{fixpoint, OrderedSet},
};

///
/// Non-deterministic automaton with ε-transitions
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    alphabet: Alphabet,
    // state labels: state i has label labels[i]
    labels: OrderedSet<String>,
    // transition relation: no entry maps to an empty set
    delta: IndexMap<(usize, Symbol), OrderedSet<usize>>,
    initial: OrderedSet<usize>,
    accepting: OrderedSet<usize>,
}

impl Nfa {
    pub(crate) fn from_parts(
        alphabet: Alphabet,
        labels: OrderedSet<String>,
        delta: IndexMap<(usize, Symbol), OrderedSet<usize>>,
        initial: OrderedSet<usize>,
        accepting: OrderedSet<usize>,
    ) -> Self {
        debug_assert!(delta.values().all(|t| !t.is_empty()));
        Nfa {
            alphabet,
            labels,
            delta,
            initial,
            accepting,
        }
    }

    /// The alphabet
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Number of states
    pub fn num_states(&self) -> usize {
        self.labels.len()
    }

    /// Label of state i
    pub fn label(&self, i: usize) -> &str {
        &self.labels[i]
    }

    /// Search for a state by label
    pub fn state_with_label(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Initial states
    pub fn initial_states(&self) -> &OrderedSet<usize> {
        &self.initial
    }

    /// Accepting states
    pub fn accepting_states(&self) -> &OrderedSet<usize> {
        &self.accepting
    }

    /// Check whether state i is accepting
    pub fn is_accepting(&self, i: usize) -> bool {
        self.accepting.contains(&i)
    }

    ///
    /// Targets of the transitions from state i on symbol
    /// - return None if there's no such transition
    ///
    pub fn targets(&self, i: usize, symbol: Symbol) -> Option<&OrderedSet<usize>> {
        self.delta.get(&(i, symbol))
    }

    ///
    /// Iterator over all transitions
    /// - each transition is a triple (source, symbol, target)
    ///
    pub fn transitions(&self) -> impl Iterator<Item = (usize, Symbol, usize)> + '_ {
        self.delta
            .iter()
            .flat_map(|(&(i, symbol), targets)| targets.iter().map(move |&j| (i, symbol, j)))
    }

    /// Check whether there are ε-transitions
    pub fn has_epsilon_moves(&self) -> bool {
        self.delta.keys().any(|(_, symbol)| symbol.is_epsilon())
    }

    /// States reachable from a set of states by a single transition on symbol
    fn step(&self, states: &OrderedSet<usize>, symbol: Symbol) -> OrderedSet<usize> {
        OrderedSet::union_all(states.iter().filter_map(|&i| self.targets(i, symbol)))
    }

    ///
    /// ε-closure of a set of states
    /// - smallest superset closed under ε-transitions
    ///
    pub fn epsilon_closure_of(&self, states: &OrderedSet<usize>) -> OrderedSet<usize> {
        fixpoint(states.clone(), |s| self.step(s, Symbol::Epsilon))
    }

    /// ε-closure of state i
    pub fn epsilon_closure(&self, i: usize) -> OrderedSet<usize> {
        self.epsilon_closure_of(&OrderedSet::singleton(i))
    }

    // Successors of a closed set on character c, closed under ε
    fn closed_step(&self, states: &OrderedSet<usize>, c: char) -> OrderedSet<usize> {
        self.epsilon_closure_of(&self.step(states, Symbol::Char(c)))
    }

    ///
    /// Check whether the automaton accepts a word
    /// - simulate all runs in parallel
    ///
    pub fn accepts(&self, word: &str) -> bool {
        let mut current = self.epsilon_closure_of(&self.initial);
        for c in word.chars() {
            if !self.alphabet.contains(c) {
                return false;
            }
            current = self.closed_step(&current, c);
            if current.is_empty() {
                return false;
            }
        }
        !current.is_disjoint(&self.accepting)
    }

    ///
    /// Equivalent automaton without ε-transitions
    /// - same states and alphabet
    /// - for every state q and character a, the targets of q on a are
    ///   the ε-closure of the a-successors of the ε-closure of q
    /// - an initial state becomes accepting if its ε-closure contains an
    ///   accepting state
    ///
    pub fn remove_epsilon(&self) -> Nfa {
        let mut delta = IndexMap::new();
        for i in 0..self.num_states() {
            let closure = self.epsilon_closure(i);
            for c in self.alphabet.chars() {
                let targets = self.closed_step(&closure, c);
                if !targets.is_empty() {
                    delta.insert((i, Symbol::Char(c)), targets);
                }
            }
        }
        let mut accepting = self.accepting.clone();
        for &i in &self.initial {
            if !self.epsilon_closure(i).is_disjoint(&self.accepting) {
                accepting.insert(i);
            }
        }
        Nfa::from_parts(
            self.alphabet.clone(),
            self.labels.clone(),
            delta,
            self.initial.clone(),
            accepting,
        )
    }

    // Label for a subset of states
    fn subset_label(&self, subset: &[usize]) -> String {
        let labels: Vec<&str> = subset.iter().map(|&i| self.label(i)).collect();
        format!("{{{}}}", labels.join(","))
    }

    ///
    /// Subset construction
    /// - every state of the result is a non-empty set of states of self, closed under ε
    /// - the initial state is the ε-closure of the initial states
    /// - a subset is final if it contains an accepting state
    /// - transitions to the empty set are omitted
    ///
    /// States are numbered in the order they're discovered and labeled `{p,q,...}`
    /// where p, q, ... are in increasing index order.
    ///
    pub fn to_dfa(&self) -> Dfa {
        // sorted vectors of state indices
        let sorted = |s: OrderedSet<usize>| {
            let mut v: Vec<usize> = s.into_iter().collect();
            v.sort_unstable();
            v
        };

        let mut queue = BfsQueue::new();
        queue.push(sorted(self.epsilon_closure_of(&self.initial)));
        let mut states = Vec::new();
        while let Some(subset) = queue.pop() {
            let members: OrderedSet<usize> = subset.iter().copied().collect();
            let successor = self
                .alphabet
                .chars()
                .map(|c| {
                    let next = self.closed_step(&members, c);
                    if next.is_empty() {
                        None
                    } else {
                        Some(queue.intern(sorted(next)))
                    }
                })
                .collect();
            let is_final = !members.is_disjoint(&self.accepting);
            trace!("subset {}: {}", states.len(), self.subset_label(&subset));
            states.push(State::new(
                states.len(),
                self.subset_label(&subset),
                is_final,
                successor,
            ));
        }
        debug!(
            "subset construction: {} states -> {} states",
            self.num_states(),
            states.len()
        );
        Dfa::from_parts(self.alphabet.clone(), states, 0)
    }
}

impl Display for Nfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |s: &OrderedSet<usize>| s.iter().map(|&i| self.label(i)).collect::<OrderedSet<_>>();
        writeln!(f, "{} states", self.num_states())?;
        writeln!(f, "alphabet: {}", self.alphabet)?;
        writeln!(f, "initial states: {}", set(&self.initial))?;
        writeln!(f, "final states: {}", set(&self.accepting))?;
        writeln!(f, "transitions:")?;
        for ((i, symbol), targets) in &self.delta {
            writeln!(f, "  \u{03B4}({}, {symbol}) = {}", self.label(*i), set(targets))?;
        }
        Ok(())
    }
}
