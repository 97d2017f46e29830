// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Pushdown automata
//!
//! A transition `(p, a, X1...Xk) -> (q, Y1...Ym)` reads input `a` (or nothing),
//! pops the string X1...Xk from the stack (X1 is the top), moves to state q,
//! and pushes Y1...Ym so that Y1 becomes the new top. Popping the empty string
//! leaves the stack untouched; pushing the empty string just pops.
//!
//! Recognition explores all configurations reachable from the initial one,
//! breadth-first. The search is bounded by a maximal stack height so it always
//! terminates, even when the automaton has ε-cycles that grow the stack.
//!

use std::fmt::Display;

use log::{debug, trace};

use crate::{
    alphabet::Alphabet, bfs_queues::BfsQueue, errors::Error, grammars::write_name,
    ordered_sets::OrderedSet,
};

///
/// Stack symbols
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StackSymbol {
    /// Bottom-of-stack marker
    Bottom,
    /// A terminal
    Term(char),
    /// A nonterminal
    NonTerm(String),
}

impl StackSymbol {
    /// Nonterminal stack symbol
    pub fn nonterm(name: &str) -> Self {
        StackSymbol::NonTerm(name.to_string())
    }
}

impl Display for StackSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackSymbol::Bottom => write!(f, "\u{22A5}"),
            StackSymbol::Term(c) => c.fmt(f),
            StackSymbol::NonTerm(name) => write_name(f, name),
        }
    }
}

/// Acceptance condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Accept when all input is read in a final state
    FinalState,
    /// Accept when all input is read and the stack is empty
    EmptyStack,
}

///
/// Transition of a pushdown automaton
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    source: usize,
    input: Option<char>,
    pop: Vec<StackSymbol>,
    target: usize,
    push: Vec<StackSymbol>,
}

impl Transition {
    pub(crate) fn new(
        source: usize,
        input: Option<char>,
        pop: Vec<StackSymbol>,
        target: usize,
        push: Vec<StackSymbol>,
    ) -> Self {
        Transition {
            source,
            input,
            pop,
            target,
            push,
        }
    }

    /// Source state
    pub fn source(&self) -> usize {
        self.source
    }

    /// Input character, or None for an ε-move
    pub fn input(&self) -> Option<char> {
        self.input
    }

    /// Symbols popped from the stack, top first
    pub fn pop(&self) -> &[StackSymbol] {
        &self.pop
    }

    /// Target state
    pub fn target(&self) -> usize {
        self.target
    }

    /// Symbols pushed on the stack, the first one becomes the new top
    pub fn push(&self) -> &[StackSymbol] {
        &self.push
    }

    // stack is stored with its top at the end
    fn applies(&self, stack: &[StackSymbol]) -> bool {
        stack.len() >= self.pop.len() && stack.iter().rev().zip(&self.pop).all(|(x, y)| x == y)
    }

    fn apply(&self, stack: &[StackSymbol]) -> Vec<StackSymbol> {
        let mut result = stack[..stack.len() - self.pop.len()].to_vec();
        result.extend(self.push.iter().rev().cloned());
        result
    }
}

fn write_string(f: &mut std::fmt::Formatter<'_>, s: &[StackSymbol]) -> std::fmt::Result {
    if s.is_empty() {
        return write!(f, "\u{03B5}");
    }
    for x in s {
        write!(f, "{x}")?;
    }
    Ok(())
}

///
/// Pushdown automaton
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pda {
    labels: OrderedSet<String>,
    input_alphabet: Alphabet,
    stack_alphabet: OrderedSet<StackSymbol>,
    transitions: Vec<Transition>,
    initial_state: usize,
    initial_stack: StackSymbol,
    accepting: OrderedSet<usize>,
    acceptance: Acceptance,
}

// configuration: state, number of characters read, stack (top at the end)
type Configuration = (usize, usize, Vec<StackSymbol>);

impl Pda {
    pub(crate) fn from_parts(
        labels: OrderedSet<String>,
        input_alphabet: Alphabet,
        transitions: Vec<Transition>,
        initial_stack: StackSymbol,
        accepting: OrderedSet<usize>,
        acceptance: Acceptance,
    ) -> Self {
        let mut stack_alphabet = OrderedSet::singleton(initial_stack.clone());
        for t in &transitions {
            stack_alphabet.extend(t.pop.iter().chain(&t.push).cloned());
        }
        Pda {
            labels,
            input_alphabet,
            stack_alphabet,
            transitions,
            initial_state: 0,
            initial_stack,
            accepting,
            acceptance,
        }
    }

    /// Number of states
    pub fn num_states(&self) -> usize {
        self.labels.len()
    }

    /// Label of state i
    pub fn label(&self, i: usize) -> &str {
        &self.labels[i]
    }

    /// Input alphabet
    pub fn input_alphabet(&self) -> &Alphabet {
        &self.input_alphabet
    }

    /// All the symbols that occur in the initial stack or in transitions
    pub fn stack_alphabet(&self) -> &OrderedSet<StackSymbol> {
        &self.stack_alphabet
    }

    /// All transitions
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Initial state
    pub fn initial_state(&self) -> usize {
        self.initial_state
    }

    /// Initial stack symbol
    pub fn initial_stack(&self) -> &StackSymbol {
        &self.initial_stack
    }

    /// Final states
    pub fn accepting_states(&self) -> &OrderedSet<usize> {
        &self.accepting
    }

    /// Acceptance condition
    pub fn acceptance(&self) -> Acceptance {
        self.acceptance
    }

    fn is_accepting(&self, state: usize, stack: &[StackSymbol]) -> bool {
        match self.acceptance {
            Acceptance::FinalState => self.accepting.contains(&state),
            Acceptance::EmptyStack => stack.is_empty(),
        }
    }

    ///
    /// Check whether the automaton accepts a word
    ///
    /// This explores configurations with stack height at most `max_height`.
    /// Configurations with a higher stack are discarded, so the result is
    /// a correct rejection only if every accepting run stays within the bound.
    ///
    pub fn accepts_within(&self, word: &str, max_height: usize) -> bool {
        let w: Vec<char> = word.chars().collect();
        let n = w.len();
        let start: Configuration = (self.initial_state, 0, vec![self.initial_stack.clone()]);
        let mut queue = BfsQueue::new();
        queue.push(start);
        let mut explored = 0;
        while let Some((state, pos, stack)) = queue.pop() {
            explored += 1;
            if pos == n && self.is_accepting(state, &stack) {
                debug!("accepted {word:?} after exploring {explored} configurations");
                return true;
            }
            for t in &self.transitions {
                if t.source != state || !t.applies(&stack) {
                    continue;
                }
                let next_pos = match t.input {
                    None => pos,
                    Some(c) if pos < n && w[pos] == c => pos + 1,
                    Some(_) => continue,
                };
                let next_stack = t.apply(&stack);
                if next_stack.len() <= max_height {
                    queue.push((t.target, next_pos, next_stack));
                }
            }
            trace!("frontier: {} configurations", queue.len());
        }
        debug!("rejected {word:?} after exploring {explored} configurations");
        false
    }

    ///
    /// Check whether the automaton accepts a word
    ///
    /// Same as [accepts_within](Self::accepts_within) with a bound equal to the length
    /// of the word plus two. This is enough for the recognizers built from grammars in
    /// [conversions](crate::conversions): every symbol above the bottom marker in their
    /// stacks derives or stands for at least one input character.
    ///
    pub fn accepts(&self, word: &str) -> bool {
        self.accepts_within(word, word.chars().count() + 2)
    }
}

impl Display for Pda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} states", self.num_states())?;
        writeln!(f, "input alphabet: {}", self.input_alphabet)?;
        writeln!(f, "stack alphabet: {}", self.stack_alphabet)?;
        writeln!(f, "initial state: {}", self.label(self.initial_state))?;
        writeln!(f, "initial stack: {}", self.initial_stack)?;
        match self.acceptance {
            Acceptance::FinalState => {
                let finals: OrderedSet<&str> = self.accepting.iter().map(|&i| self.label(i)).collect();
                writeln!(f, "final states: {finals}")?;
            }
            Acceptance::EmptyStack => writeln!(f, "accept by empty stack")?,
        }
        writeln!(f, "transitions:")?;
        for t in &self.transitions {
            write!(f, "  \u{03B4}({}, ", self.label(t.source))?;
            match t.input {
                Some(c) => write!(f, "{c}")?,
                None => write!(f, "\u{03B5}")?,
            }
            write!(f, ", ")?;
            write_string(f, &t.pop)?;
            write!(f, ") \u{220B} ({}, ", self.label(t.target))?;
            write_string(f, &t.push)?;
            writeln!(f, ")")?;
        }
        Ok(())
    }
}

///
/// Pushdown automaton builder
///
/// Same conventions as [AutomatonBuilder](crate::automata::AutomatonBuilder):
/// states are declared by name and nothing is checked before [build](Self::build).
///
#[derive(Debug, Clone)]
pub struct PdaBuilder {
    input_alphabet: Vec<char>,
    initial_stack: StackSymbol,
    acceptance: Acceptance,
    states: Vec<String>,
    initial: Vec<String>,
    accepting: Vec<String>,
    transitions: Vec<(String, Option<char>, Vec<StackSymbol>, String, Vec<StackSymbol>)>,
}

impl PdaBuilder {
    ///
    /// Create a builder
    /// - input_alphabet = characters of the input alphabet
    /// - initial_stack = the symbol on the stack at the start
    /// - acceptance = acceptance condition
    ///
    pub fn new(
        input_alphabet: impl IntoIterator<Item = char>,
        initial_stack: StackSymbol,
        acceptance: Acceptance,
    ) -> Self {
        PdaBuilder {
            input_alphabet: input_alphabet.into_iter().collect(),
            initial_stack,
            acceptance,
            states: Vec::new(),
            initial: Vec::new(),
            accepting: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Declare a state
    pub fn state(&mut self, state: impl ToString) -> &mut Self {
        self.states.push(state.to_string());
        self
    }

    /// Mark the initial state
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
    /// - input = None for an ε-move
    /// - pop = symbols to pop, top first
    /// - push = symbols to push, the first one becomes the top
    ///
    pub fn add_transition(
        &mut self,
        source: impl ToString,
        input: Option<char>,
        pop: Vec<StackSymbol>,
        target: impl ToString,
        push: Vec<StackSymbol>,
    ) -> &mut Self {
        self.transitions
            .push((source.to_string(), input, pop, target.to_string(), push));
        self
    }

    ///
    /// Construct the automaton
    ///
    /// # Errors
    ///
    /// - the input alphabet is malformed
    /// - a state is used but not declared
    /// - a transition reads a character that's not in the input alphabet
    /// - there's no initial state or more than one
    ///
    pub fn build(&self) -> Result<Pda, Error> {
        let input_alphabet = Alphabet::new(self.input_alphabet.iter().copied())?;
        let labels: OrderedSet<String> = self.states.iter().cloned().collect();
        let state_id = |s: &String| labels.index_of(s).ok_or_else(|| Error::UnknownState(s.clone()));

        let initial: OrderedSet<usize> = self.initial.iter().map(state_id).collect::<Result<_, Error>>()?;
        let initial_state = match initial.len() {
            0 => return Err(Error::MissingInitialState),
            1 => initial[0],
            _ => return Err(Error::MultipleInitialStates),
        };
        let accepting: OrderedSet<usize> =
            self.accepting.iter().map(state_id).collect::<Result<_, Error>>()?;

        let mut stack_alphabet = OrderedSet::singleton(self.initial_stack.clone());
        let mut transitions = Vec::with_capacity(self.transitions.len());
        for (source, input, pop, target, push) in &self.transitions {
            if let Some(c) = input {
                if !input_alphabet.contains(*c) {
                    return Err(Error::UnknownSymbol(*c));
                }
            }
            stack_alphabet.extend(pop.iter().chain(push).cloned());
            transitions.push(Transition {
                source: state_id(source)?,
                input: *input,
                pop: pop.clone(),
                target: state_id(target)?,
                push: push.clone(),
            });
        }
        Ok(Pda {
            labels,
            input_alphabet,
            stack_alphabet,
            transitions,
            initial_state,
            initial_stack: self.initial_stack.clone(),
            accepting,
            acceptance: self.acceptance,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{StackSymbol::*, *};

    //
    // { a^n b^n | n >= 0 }, accepting by final state
    //   p: push X for every a
    //   p -> q on ε
    //   q: pop X for every b
    //   q -> f when the bottom marker is on top
    //
    fn anbn() -> Pda {
        let x = || NonTerm("X".to_string());
        let mut builder = PdaBuilder::new("ab".chars(), Bottom, Acceptance::FinalState);
        builder
            .state("p")
            .state("q")
            .state("f")
            .initial_state("p")
            .mark_final("f");
        builder
            .add_transition("p", Some('a'), vec![], "p", vec![x()])
            .add_transition("p", None, vec![], "q", vec![])
            .add_transition("q", Some('b'), vec![x()], "q", vec![])
            .add_transition("q", None, vec![Bottom], "f", vec![Bottom]);
        builder.build().unwrap()
    }

    #[test]
    fn test_final_state() {
        let pda = anbn();
        println!("{pda}");
        assert_eq!(pda.num_states(), 3);
        assert_eq!(pda.stack_alphabet().len(), 2);
        for w in ["", "ab", "aabb", "aaabbb"] {
            assert!(pda.accepts(w), "{w}");
        }
        for w in ["a", "b", "ba", "abab", "aab", "abb", "abc"] {
            assert!(!pda.accepts(w), "{w}");
        }
    }

    #[test]
    fn test_empty_stack() {
        // palindromes of even length over {a, b}
        let mut builder = PdaBuilder::new("ab".chars(), Bottom, Acceptance::EmptyStack);
        builder.state("push").state("pop").initial_state("push");
        for c in ['a', 'b'] {
            builder
                .add_transition("push", Some(c), vec![], "push", vec![Term(c)])
                .add_transition("pop", Some(c), vec![Term(c)], "pop", vec![]);
        }
        builder
            .add_transition("push", None, vec![], "pop", vec![])
            .add_transition("pop", None, vec![Bottom], "pop", vec![]);
        let pda = builder.build().unwrap();
        println!("{pda}");
        for w in ["", "aa", "abba", "baab"] {
            assert!(pda.accepts(w), "{w}");
        }
        for w in ["a", "ab", "aba", "abab"] {
            assert!(!pda.accepts(w), "{w}");
        }
    }

    #[test]
    fn test_height_bound() {
        // an ε-loop that pushes forever
        let mut builder = PdaBuilder::new("a".chars(), Bottom, Acceptance::FinalState);
        builder.state(0).state(1).initial_state(0).mark_final(1);
        builder
            .add_transition(0, None, vec![], 0, vec![Term('a')])
            .add_transition(0, Some('a'), vec![Term('a'), Term('a'), Term('a')], 1, vec![]);
        let pda = builder.build().unwrap();
        assert!(!pda.accepts_within("a", 2));
        assert!(pda.accepts_within("a", 4));
        assert!(!pda.accepts("aa"));
    }

    #[test]
    fn test_builder_errors() {
        let mut builder = PdaBuilder::new("ab".chars(), Bottom, Acceptance::EmptyStack);
        builder.state("p");
        assert_eq!(builder.build(), Err(Error::MissingInitialState));
        builder.initial_state("p");
        assert!(builder.build().is_ok());
        builder.add_transition("p", Some('c'), vec![], "p", vec![]);
        assert_eq!(builder.build(), Err(Error::UnknownSymbol('c')));

        let mut builder = PdaBuilder::new("ab".chars(), Bottom, Acceptance::EmptyStack);
        builder.state("p").initial_state("p").initial_state("q");
        assert_eq!(builder.build(), Err(Error::UnknownState("q".to_string())));
        builder.state("q");
        assert_eq!(builder.build(), Err(Error::MultipleInitialStates));

        let builder = PdaBuilder::new("aa".chars(), Bottom, Acceptance::EmptyStack);
        assert_eq!(builder.build(), Err(Error::DuplicateSymbol('a')));
    }
}
