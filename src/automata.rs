// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Deterministic finite-state automata
//!
//! States are indexed by an integer from 0 to N-1 where N is the number of states.
//! Each state also has a label, which is what users see (e.g., in [Display] output).
//!
//! The transition function is partial: `delta(s, c)` is either a state or undefined.
//! An undefined transition is an implicit transition to a dead state. Function
//! [next](Dfa::next) returns `None` in this case, which is distinct from every state.
//! Function [complete](Dfa::complete) makes the transition function total by adding
//! an explicit sink state.
//!
//! All operations that transform an automaton return a new automaton.
//!
//! Automata (both deterministic and non-deterministic) are constructed with an
//! [AutomatonBuilder].
//!

use std::fmt::Display;

use indexmap::IndexMap;
use log::debug;

use crate::{
    alphabet::{Alphabet, Symbol, EPSILON},
    bfs_queues::BfsQueue,
    errors::Error,
    labeled_queues::LabeledQueue,
    minimizer::Minimizer,
    nfa::Nfa,
    ordered_sets::OrderedSet,
};

/// Label of the sink state added by [complete](Dfa::complete)
pub const SINK_LABEL: &str = "\u{2297}";

///
/// Deterministic finite state automaton
///
/// Equality is structural: same alphabet, same states in the same order,
/// same labels and transitions. Two automata produced by [minimize](Dfa::minimize)
/// are equal if and only if they accept the same language over the same alphabet.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    // alphabet: characters are indexed from 0 to M-1
    alphabet: Alphabet,
    // array of states
    states: Box<[State]>,
    // index of the initial state
    initial_state: usize,
}

///
/// State of a deterministic automaton
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    // id of a state (an index between 0 and num_states)
    id: usize,
    // state label
    label: String,
    // whether this state is final
    is_final: bool,
    // successor[i] = successor on the i-th character of the alphabet, if any
    successor: Box<[Option<usize>]>,
}

impl State {
    pub(crate) fn new(id: usize, label: String, is_final: bool, successor: Box<[Option<usize>]>) -> Self {
        State {
            id,
            label,
            is_final,
            successor,
        }
    }

    /// State id
    pub fn id(&self) -> usize {
        self.id
    }

    /// State label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Check whether this state is final
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Check whether this state has a successor for every character
    pub fn is_complete(&self) -> bool {
        self.successor.iter().all(|s| s.is_some())
    }
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.label.fmt(f)
    }
}

// Fresh label derived from base: add primes until no state uses it
fn fresh_label<'a>(base: &str, labels: impl Iterator<Item = &'a str> + Clone) -> String {
    let mut label = base.to_string();
    while labels.clone().any(|l| l == label) {
        label.push('\'');
    }
    label
}

// Label of the i-th state in canonical order
fn canonical_label(i: usize, num_states: usize) -> String {
    if num_states <= 26 {
        char::from(b'A' + i as u8).to_string()
    } else {
        i.to_string()
    }
}

impl Dfa {
    pub(crate) fn from_parts(alphabet: Alphabet, states: Vec<State>, initial_state: usize) -> Self {
        debug_assert!(initial_state < states.len());
        debug_assert!(states.iter().enumerate().all(|(i, s)| s.id == i));
        Dfa {
            alphabet,
            states: states.into(),
            initial_state,
        }
    }

    /// The alphabet
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Number of states
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Get the initial state
    pub fn initial_state(&self) -> &State {
        &self.states[self.initial_state]
    }

    /// Get a state from its id
    pub fn state(&self, id: usize) -> &State {
        &self.states[id]
    }

    /// Search for a state by label
    pub fn state_with_label(&self, label: &str) -> Option<&State> {
        self.states.iter().find(|s| s.label == label)
    }

    /// Iterator to go through all states
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    /// Iterator to go through the final states
    pub fn final_states(&self) -> impl Iterator<Item = &State> {
        self.states.iter().filter(|s| s.is_final)
    }

    ///
    /// Successor of s on character c
    /// - return None if there's no transition from s on c, including when c
    ///   is not in the alphabet
    ///
    pub fn next(&self, s: &State, c: char) -> Option<&State> {
        let i = self.alphabet.index_of(c)?;
        s.successor[i].map(|j| &self.states[j])
    }

    ///
    /// State reached from s after reading a word
    /// - return None if the run gets stuck on an undefined transition
    ///
    pub fn run<'a>(&'a self, s: &'a State, word: &str) -> Option<&'a State> {
        word.chars().try_fold(s, |s, c| self.next(s, c))
    }

    /// Check whether the automaton accepts a word
    pub fn accepts(&self, word: &str) -> bool {
        self.run(self.initial_state(), word).is_some_and(|s| s.is_final)
    }

    ///
    /// Iterator over all defined transitions
    /// - each transition is returned as a triple (source, character, target)
    ///
    pub fn transitions(&self) -> impl Iterator<Item = (&State, char, &State)> {
        self.states.iter().flat_map(move |s| {
            s.successor
                .iter()
                .enumerate()
                .filter_map(move |(i, t)| t.map(|j| (s, self.alphabet.char_at(i), &self.states[j])))
        })
    }

    /// Check whether the transition function is total
    pub fn is_complete(&self) -> bool {
        self.states.iter().all(|s| s.is_complete())
    }

    ///
    /// Same automaton over a larger alphabet
    /// - characters not in self.alphabet have no transitions
    ///
    pub(crate) fn with_alphabet(&self, alphabet: &Alphabet) -> Dfa {
        debug_assert!(self.alphabet.chars().all(|c| alphabet.contains(c)));
        let states = self
            .states
            .iter()
            .map(|s| {
                let successor = alphabet
                    .chars()
                    .map(|c| self.alphabet.index_of(c).and_then(|i| s.successor[i]))
                    .collect();
                State::new(s.id, s.label.clone(), s.is_final, successor)
            })
            .collect();
        Dfa::from_parts(alphabet.clone(), states, self.initial_state)
    }

    ///
    /// Keep the states listed in keep, in that order
    /// - keep must not contain duplicates
    /// - the initial state must be in keep
    /// - transitions to states not in keep are removed
    /// - label(k, s) gives the label for the k-th kept state s
    ///
    fn remap<L>(&self, keep: &[usize], label: L) -> Dfa
    where
        L: Fn(usize, &State) -> String,
    {
        let mut new_id = vec![None; self.num_states()];
        for (k, &i) in keep.iter().enumerate() {
            new_id[i] = Some(k);
        }
        let states = keep
            .iter()
            .enumerate()
            .map(|(k, &i)| {
                let s = &self.states[i];
                let successor = s.successor.iter().map(|t| t.and_then(|j| new_id[j])).collect();
                State::new(k, label(k, s), s.is_final, successor)
            })
            .collect();
        let initial_state = new_id[self.initial_state].unwrap_or_default();
        Dfa::from_parts(self.alphabet.clone(), states, initial_state)
    }

    //
    // Reachable states in breadth-first order
    //
    fn reachable_states(&self) -> Vec<usize> {
        let mut queue = BfsQueue::new();
        queue.push(self.initial_state);
        while let Some(i) = queue.pop() {
            queue.push_all(self.states[i].successor.iter().flatten().copied());
        }
        queue.into_visited().into_iter().collect()
    }

    ///
    /// Make the transition function total
    /// - if some transitions are undefined, add a sink state that's not final,
    ///   and redirect all undefined transitions to the sink
    /// - the sink is labeled ⊗ (or ⊗' etc. if ⊗ is already used)
    /// - return a copy of self if self is already complete
    ///
    pub fn complete(&self) -> Dfa {
        if self.is_complete() {
            return self.clone();
        }
        let sink = self.num_states();
        let label = fresh_label(SINK_LABEL, self.states.iter().map(|s| s.label()));
        let mut states: Vec<State> = self
            .states
            .iter()
            .map(|s| {
                let successor = s.successor.iter().map(|t| Some(t.unwrap_or(sink))).collect();
                State::new(s.id, s.label.clone(), s.is_final, successor)
            })
            .collect();
        states.push(State::new(
            sink,
            label,
            false,
            vec![Some(sink); self.alphabet.len()].into(),
        ));
        Dfa::from_parts(self.alphabet.clone(), states, self.initial_state)
    }

    ///
    /// Remove the states that are not reachable from the initial state
    /// - the remaining states keep their relative order and their labels
    ///
    pub fn remove_unreachable_states(&self) -> Dfa {
        let mut reachable = self.reachable_states();
        reachable.sort_unstable();
        self.remap(&reachable, |_, s| s.label.clone())
    }

    ///
    /// Canonical renaming
    /// - sort the alphabet
    /// - number the reachable states in breadth-first order from the initial
    ///   state, exploring successors in alphabetical order
    /// - label them A, B, C, ... (or 0, 1, 2, ... if there are more than 26 states)
    ///
    /// Unreachable states are removed.
    ///
    pub fn canonize(&self) -> Dfa {
        let sorted = self.with_alphabet(&self.alphabet.sorted());
        let order = sorted.reachable_states();
        let n = order.len();
        sorted.remap(&order, |k, _| canonical_label(k, n))
    }

    ///
    /// Minimize the automaton
    ///
    /// The result is the canonical minimal complete automaton for the same language:
    /// 1) add a sink state if the transition function is partial
    /// 2) remove unreachable states
    /// 3) merge equivalent states (Moore's partition refinement)
    /// 4) rename states canonically (see [canonize](Self::canonize))
    ///
    /// Minimization is idempotent.
    ///
    pub fn minimize(&self) -> Dfa {
        let alphabet = self.alphabet.sorted();
        let dfa = self.with_alphabet(&alphabet).complete().remove_unreachable_states();
        let num_states = dfa.num_states();
        let alphabet_size = alphabet.len();

        // flattened transition table
        let table: Vec<u32> = dfa
            .states
            .iter()
            .flat_map(|s| s.successor.iter().map(move |t| t.unwrap_or(s.id) as u32))
            .collect();
        let delta = |s: u32, c: u32| table[s as usize * alphabet_size + c as usize];
        let is_final = |s: u32| dfa.states[s as usize].is_final;
        let mut minimizer = Minimizer::new(num_states as u32, alphabet_size as u32, delta, is_final);
        let p = minimizer.refine();

        // quotient: block b becomes state b, with the transitions of its first element
        let states = (0..p.num_blocks())
            .map(|b| {
                let rep = &dfa.states[p.pick_element(b) as usize];
                let successor = rep
                    .successor
                    .iter()
                    .map(|t| t.map(|j| p.block_id(j as u32) as usize))
                    .collect();
                State::new(b as usize, rep.label.clone(), rep.is_final, successor)
            })
            .collect();
        let initial_state = p.block_id(dfa.initial_state as u32) as usize;
        let quotient = Dfa::from_parts(alphabet, states, initial_state);

        debug!(
            "minimization: {} states -> {} complete reachable states -> {} states",
            self.num_states(),
            num_states,
            quotient.num_states()
        );
        quotient.canonize()
    }

    //
    // Synchronized product over the union of both alphabets
    // - both automata are completed first
    // - pair (s1, s2) is final if accept(s1.is_final, s2.is_final)
    //
    fn product<F>(&self, other: &Dfa, accept: F) -> Dfa
    where
        F: Fn(bool, bool) -> bool,
    {
        let alphabet = self.alphabet.union(&other.alphabet);
        let d1 = self.with_alphabet(&alphabet).complete();
        let d2 = other.with_alphabet(&alphabet).complete();
        let n2 = d2.num_states();
        let pair = |i: usize, j: usize| i * n2 + j;

        let mut states = Vec::with_capacity(d1.num_states() * n2);
        for s1 in d1.states.iter() {
            for s2 in d2.states.iter() {
                let successor = s1
                    .successor
                    .iter()
                    .zip(s2.successor.iter())
                    .map(|(t1, t2)| Some(pair((*t1)?, (*t2)?)))
                    .collect();
                states.push(State::new(
                    pair(s1.id, s2.id),
                    format!("({},{})", s1.label, s2.label),
                    accept(s1.is_final, s2.is_final),
                    successor,
                ));
            }
        }
        let initial_state = pair(d1.initial_state, d2.initial_state);
        debug!(
            "product: {} x {} states -> {} states",
            d1.num_states(),
            n2,
            states.len()
        );
        Dfa::from_parts(alphabet, states, initial_state)
    }

    ///
    /// Automaton for the intersection of the languages of self and other
    /// - states are all pairs (p, q), labeled `(p,q)`
    /// - (p, q) is final if both p and q are final
    ///
    pub fn intersection(&self, other: &Dfa) -> Dfa {
        self.product(other, |f1, f2| f1 && f2)
    }

    ///
    /// Automaton for the union of the languages of self and other
    /// - same states and transitions as the intersection
    /// - (p, q) is final if p or q is final
    ///
    pub fn union(&self, other: &Dfa) -> Dfa {
        self.product(other, |f1, f2| f1 || f2)
    }

    /// Check whether the language is empty
    pub fn is_empty(&self) -> bool {
        self.reachable_states().into_iter().all(|i| !self.states[i].is_final)
    }

    ///
    /// Shortest accepted word
    /// - return None if the language is empty
    /// - if there are several shortest words, the result is the first one in the
    ///   alphabet order
    ///
    pub fn shortest_word(&self) -> Option<String> {
        let mut queue = LabeledQueue::new(self.initial_state);
        while let Some(i) = queue.pop() {
            let s = &self.states[i];
            if s.is_final {
                return queue.path(&i).map(|p| p.into_iter().collect());
            }
            for (k, t) in s.successor.iter().enumerate() {
                if let Some(j) = t {
                    queue.push(i, self.alphabet.char_at(k), *j);
                }
            }
        }
        None
    }

    ///
    /// Check whether self and other accept the same language
    /// - both are considered as automata over the union of their alphabets
    ///
    pub fn equivalent(&self, other: &Dfa) -> bool {
        let alphabet = self.alphabet.union(&other.alphabet);
        self.with_alphabet(&alphabet).minimize() == other.with_alphabet(&alphabet).minimize()
    }

    /// Same automaton seen as a non-deterministic automaton
    pub fn to_nfa(&self) -> Nfa {
        let labels = self.states.iter().map(|s| s.label.clone()).collect();
        let mut delta = IndexMap::new();
        for (s, c, t) in self.transitions() {
            delta.insert((s.id, Symbol::Char(c)), OrderedSet::singleton(t.id));
        }
        let accepting = self.final_states().map(|s| s.id).collect();
        Nfa::from_parts(
            self.alphabet.clone(),
            labels,
            delta,
            OrderedSet::singleton(self.initial_state),
            accepting,
        )
    }
}

impl Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn plural(n: usize) -> &'static str {
            if n == 1 {
                ""
            } else {
                "s"
            }
        }

        let num_final_states = self.final_states().count();
        writeln!(f, "{} state{}", self.num_states(), plural(self.num_states()))?;
        writeln!(f, "alphabet: {}", self.alphabet)?;
        writeln!(f, "initial state: {}", self.initial_state())?;
        write!(f, "final state{}:", plural(num_final_states))?;
        for s in self.final_states() {
            write!(f, " {s}")?;
        }
        writeln!(f)?;
        writeln!(f, "transitions:")?;
        for (s, c, d) in self.transitions() {
            writeln!(f, "  \u{03B4}({s}, {c}) = {d}")?;
        }
        Ok(())
    }
}

// Transitions, indexed and validated
#[derive(Debug)]
struct CheckedAutomaton {
    alphabet: Alphabet,
    labels: OrderedSet<String>,
    delta: IndexMap<(usize, Symbol), OrderedSet<usize>>,
    initial: OrderedSet<usize>,
    accepting: OrderedSet<usize>,
}

///
/// Automaton builder
///
/// States are identified by their labels. Any type that implements [ToString] can
/// be used to name states (e.g., integers or strings). All states must be declared
/// with [state](Self::state) or [states](Self::states) before the automaton is built.
///
/// The builder doesn't check anything until one of the `build` functions is called.
///
#[derive(Debug, Clone, Default)]
pub struct AutomatonBuilder {
    alphabet: Vec<char>,
    states: Vec<String>,
    initial: Vec<String>,
    accepting: Vec<String>,
    transitions: Vec<(String, Symbol, String)>,
}

impl AutomatonBuilder {
    ///
    /// Create a new builder
    ///
    /// - alphabet = the characters of the alphabet, in order
    ///
    pub fn new(alphabet: impl IntoIterator<Item = char>) -> Self {
        AutomatonBuilder {
            alphabet: alphabet.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Declare a state
    pub fn state(&mut self, state: impl ToString) -> &mut Self {
        self.states.push(state.to_string());
        self
    }

    /// Declare several states
    pub fn states<T: ToString>(&mut self, states: impl IntoIterator<Item = T>) -> &mut Self {
        self.states.extend(states.into_iter().map(|s| s.to_string()));
        self
    }

    /// Mark an initial state
    pub fn initial_state(&mut self, state: impl ToString) -> &mut Self {
        self.initial.push(state.to_string());
        self
    }

    /// Mark a final state
    pub fn mark_final(&mut self, state: impl ToString) -> &mut Self {
        self.accepting.push(state.to_string());
        self
    }

    ///
    /// Add a transition
    /// - if c is [EPSILON], this is the same as [add_epsilon_transition](Self::add_epsilon_transition)
    ///
    pub fn add_transition(&mut self, source: impl ToString, c: char, target: impl ToString) -> &mut Self {
        self.transitions
            .push((source.to_string(), Symbol::from(c), target.to_string()));
        self
    }

    /// Add an ε-transition
    pub fn add_epsilon_transition(&mut self, source: impl ToString, target: impl ToString) -> &mut Self {
        self.transitions
            .push((source.to_string(), Symbol::Epsilon, target.to_string()));
        self
    }

    fn check(&self) -> Result<CheckedAutomaton, Error> {
        let alphabet = Alphabet::new(self.alphabet.iter().copied())?;
        let labels: OrderedSet<String> = self.states.iter().cloned().collect();
        let state_id = |s: &String| labels.index_of(s).ok_or_else(|| Error::UnknownState(s.clone()));

        let initial: OrderedSet<usize> = self.initial.iter().map(state_id).collect::<Result<_, Error>>()?;
        let accepting: OrderedSet<usize> =
            self.accepting.iter().map(state_id).collect::<Result<_, Error>>()?;
        let mut delta: IndexMap<(usize, Symbol), OrderedSet<usize>> = IndexMap::new();
        for (source, symbol, target) in &self.transitions {
            let i = state_id(source)?;
            let j = state_id(target)?;
            if let Symbol::Char(c) = symbol {
                if !alphabet.contains(*c) {
                    return Err(Error::UnknownSymbol(*c));
                }
            }
            delta.entry((i, *symbol)).or_default().insert(j);
        }
        Ok(CheckedAutomaton {
            alphabet,
            labels,
            delta,
            initial,
            accepting,
        })
    }

    ///
    /// Construct a deterministic automaton
    ///
    /// # Errors
    ///
    /// - the alphabet is malformed (duplicate characters or ε)
    /// - a state is used but not declared
    /// - a transition uses a character that's not in the alphabet, or ε
    /// - there's no initial state, or more than one
    /// - there are two transitions from the same state on the same character
    ///   to distinct states
    ///
    pub fn build_dfa(&self) -> Result<Dfa, Error> {
        let checked = self.check()?;
        let initial_state = match checked.initial.len() {
            0 => return Err(Error::MissingInitialState),
            1 => checked.initial.first().copied().unwrap_or_default(),
            _ => return Err(Error::MultipleInitialStates),
        };

        let m = checked.alphabet.len();
        let mut states: Vec<State> = checked
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let is_final = checked.accepting.contains(&i);
                State::new(i, label.clone(), is_final, vec![None; m].into())
            })
            .collect();
        for ((i, symbol), targets) in &checked.delta {
            let c = match symbol {
                Symbol::Epsilon => return Err(Error::UnknownSymbol(EPSILON)),
                Symbol::Char(c) => *c,
            };
            if targets.len() > 1 {
                return Err(Error::NondeterministicTransition {
                    state: checked.labels[*i].clone(),
                    symbol: c,
                });
            }
            let k = checked.alphabet.index_of(c).unwrap_or_default();
            states[*i].successor[k] = targets.first().copied();
        }
        Ok(Dfa::from_parts(checked.alphabet, states, initial_state))
    }

    ///
    /// Construct a non-deterministic automaton, possibly with ε-transitions
    ///
    /// # Errors
    ///
    /// - the alphabet is malformed (duplicate characters or ε)
    /// - a state is used but not declared
    /// - a transition uses a character that's not in the alphabet
    /// - there's no initial state
    ///
    pub fn build_nfa(&self) -> Result<Nfa, Error> {
        let checked = self.check()?;
        if checked.initial.is_empty() {
            return Err(Error::MissingInitialState);
        }
        Ok(Nfa::from_parts(
            checked.alphabet,
            checked.labels,
            checked.delta,
            checked.initial,
            checked.accepting,
        ))
    }
}
