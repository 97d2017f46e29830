// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Regular expressions
//!
//! This module defines the abstract syntax of regular expressions [Regex] and
//! the compilation of regular expressions to automata with ε-transitions
//! (Thompson's construction).
//!
//! A [RegexAutomaton] is a generalized automaton whose edges are labeled with
//! regular expressions. It's converted to an ordinary automaton with ε-transitions
//! by compiling every edge in place.
//!

use std::fmt::Display;

use indexmap::IndexMap;
use log::debug;

use crate::{
    alphabet::{Alphabet, Symbol, EPSILON},
    automata::Dfa,
    errors::Error,
    nfa::Nfa,
    ordered_sets::OrderedSet,
    regex_parser::{to_postfix, PostfixToken},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
///
/// Abstract syntax for regular expressions
///
pub enum Regex {
    /// The language that contains only the empty string
    Epsilon,

    /// A single character
    Literal(char),

    /// Union of two languages (written `r + s`)
    Alternation(Box<Regex>, Box<Regex>),

    /// Concatenation (written `r . s`)
    Concatenation(Box<Regex>, Box<Regex>),

    /// Kleene star (written `r*`)
    Star(Box<Regex>),
}

impl Regex {
    ///
    /// Parse a regular expression
    ///
    /// See [regex_parser](crate::regex_parser) for the syntax.
    ///
    /// # Example
    ///
    /// ```
    /// use formal_langs::regular_expressions::Regex;
    ///
    /// let r = Regex::parse("a.(b+c)*").unwrap();
    /// assert_eq!(
    ///     r,
    ///     Regex::concat(Regex::Literal('a'), Regex::star(Regex::alt(Regex::Literal('b'), Regex::Literal('c'))))
    /// );
    /// assert_eq!(r.to_string(), "a.(b+c)*");
    /// ```
    pub fn parse(text: &str) -> Result<Regex, Error> {
        Self::from_postfix(&to_postfix(text)?)
    }

    ///
    /// Build a regular expression from its postfix form
    /// - binary operators pop two operands, star pops one
    ///
    /// # Errors
    ///
    /// [Error::UnexpectedToken] if the postfix form is malformed (an operator
    /// without enough operands, or more than one expression left at the end).
    ///
    pub fn from_postfix(tokens: &[PostfixToken]) -> Result<Regex, Error> {
        let mut stack: Vec<Regex> = Vec::new();
        for (position, token) in tokens.iter().enumerate() {
            let missing_operand = || Error::UnexpectedToken {
                position,
                found: token.to_string(),
            };
            let e = match token {
                PostfixToken::Epsilon => Regex::Epsilon,
                PostfixToken::Literal(c) => Regex::Literal(*c),
                PostfixToken::Star => Regex::star(stack.pop().ok_or_else(missing_operand)?),
                PostfixToken::Alternation | PostfixToken::Concatenation => {
                    let right = stack.pop().ok_or_else(missing_operand)?;
                    let left = stack.pop().ok_or_else(missing_operand)?;
                    if *token == PostfixToken::Alternation {
                        Regex::alt(left, right)
                    } else {
                        Regex::concat(left, right)
                    }
                }
            };
            stack.push(e);
        }
        match (stack.pop(), stack.is_empty()) {
            (Some(e), true) => Ok(e),
            _ => Err(Error::UnexpectedToken {
                position: tokens.len(),
                found: "end of input".to_string(),
            }),
        }
    }

    /// Alternation r + s
    pub fn alt(r: Regex, s: Regex) -> Regex {
        Regex::Alternation(Box::new(r), Box::new(s))
    }

    /// Concatenation r . s
    pub fn concat(r: Regex, s: Regex) -> Regex {
        Regex::Concatenation(Box::new(r), Box::new(s))
    }

    /// Star r*
    pub fn star(r: Regex) -> Regex {
        Regex::Star(Box::new(r))
    }

    // binding strength of the top-level operator
    fn precedence(&self) -> u8 {
        match self {
            Regex::Alternation(..) => 0,
            Regex::Concatenation(..) => 1,
            Regex::Star(_) => 2,
            Regex::Epsilon | Regex::Literal(_) => 3,
        }
    }

    fn collect_literals(&self, acc: &mut OrderedSet<char>) {
        match self {
            Regex::Epsilon => {}
            Regex::Literal(c) => {
                acc.insert(*c);
            }
            Regex::Alternation(r, s) | Regex::Concatenation(r, s) => {
                r.collect_literals(acc);
                s.collect_literals(acc);
            }
            Regex::Star(r) => r.collect_literals(acc),
        }
    }

    /// Characters that occur in this expression, in order of first occurrence
    pub fn alphabet(&self) -> Alphabet {
        let mut chars = OrderedSet::new();
        self.collect_literals(&mut chars);
        Alphabet::from_set(chars)
    }

    ///
    /// Compile to an automaton with ε-transitions
    /// - the alphabet is [alphabet](Self::alphabet)
    /// - state 0 is the only initial state, state 1 is the only accepting state
    ///
    pub fn compile(&self) -> Nfa {
        let mut builder = ThompsonBuilder::default();
        let entry = builder.fresh();
        let exit = builder.fresh();
        builder.eval(self, entry, exit);
        let nfa = builder.build(
            self.alphabet(),
            OrderedSet::singleton(entry),
            OrderedSet::singleton(exit),
        );
        debug!("compiled {self}: {} states", nfa.num_states());
        nfa
    }

    /// Minimal deterministic automaton for this expression
    pub fn to_dfa(&self) -> Dfa {
        self.compile().to_dfa().minimize()
    }

    /// Check whether a word matches this expression
    pub fn matches(&self, word: &str) -> bool {
        self.compile().accepts(word)
    }
}

impl Display for Regex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // write e, or (e) if e binds weaker than min
        fn write_operand(f: &mut std::fmt::Formatter<'_>, e: &Regex, min: u8) -> std::fmt::Result {
            if e.precedence() >= min {
                write!(f, "{e}")
            } else {
                write!(f, "({e})")
            }
        }

        // both operators are right-associative
        match self {
            Regex::Epsilon => EPSILON.fmt(f),
            Regex::Literal(c) => c.fmt(f),
            Regex::Alternation(r, s) => {
                write_operand(f, r, 1)?;
                write!(f, "+")?;
                write_operand(f, s, 0)
            }
            Regex::Concatenation(r, s) => {
                write_operand(f, r, 2)?;
                write!(f, ".")?;
                write_operand(f, s, 1)
            }
            Regex::Star(r) => {
                write_operand(f, r, 2)?;
                write!(f, "*")
            }
        }
    }
}

//
// Thompson construction: eval(e, from, to) adds states and transitions such
// that the words that lead from state `from` to state `to` are the words of e.
// - ε or a: one edge from -> to
// - r + s: both operands between from and to
// - r . s: from -r-> mid -s-> to for a fresh state mid
// - r*: from -ε-> loop, loop -r-> loop, loop -ε-> to for a fresh state loop
//
#[derive(Debug, Default)]
struct ThompsonBuilder {
    labels: OrderedSet<String>,
    delta: IndexMap<(usize, Symbol), OrderedSet<usize>>,
}

impl ThompsonBuilder {
    fn state(&mut self, label: String) -> usize {
        self.labels.insert_full(label).0
    }

    // new state with a numeric label
    fn fresh(&mut self) -> usize {
        let mut k = self.labels.len();
        while self.labels.contains(&k.to_string()) {
            k += 1;
        }
        self.state(k.to_string())
    }

    fn edge(&mut self, from: usize, symbol: Symbol, to: usize) {
        self.delta.entry((from, symbol)).or_default().insert(to);
    }

    fn eval(&mut self, e: &Regex, from: usize, to: usize) {
        match e {
            Regex::Epsilon => self.edge(from, Symbol::Epsilon, to),
            Regex::Literal(c) => self.edge(from, Symbol::Char(*c), to),
            Regex::Alternation(r, s) => {
                self.eval(r, from, to);
                self.eval(s, from, to);
            }
            Regex::Concatenation(r, s) => {
                let mid = self.fresh();
                self.eval(r, from, mid);
                self.eval(s, mid, to);
            }
            Regex::Star(r) => {
                let s = self.fresh();
                self.edge(from, Symbol::Epsilon, s);
                self.eval(r, s, s);
                self.edge(s, Symbol::Epsilon, to);
            }
        }
    }

    fn build(self, alphabet: Alphabet, initial: OrderedSet<usize>, accepting: OrderedSet<usize>) -> Nfa {
        Nfa::from_parts(alphabet, self.labels, self.delta, initial, accepting)
    }
}

///
/// Automaton whose edges are labeled by regular expressions
///
/// States are named by labels and declared implicitly when they're used.
///
#[derive(Debug, Clone, Default)]
pub struct RegexAutomaton {
    labels: OrderedSet<String>,
    edges: Vec<(usize, Regex, usize)>,
    initial: OrderedSet<usize>,
    accepting: OrderedSet<usize>,
}

/// Label of the state added before the initial states by [RegexAutomaton::to_epsilon_nfa]
pub const START_LABEL: &str = "START";
/// Label of the state added after the final states by [RegexAutomaton::to_epsilon_nfa]
pub const END_LABEL: &str = "END";

impl RegexAutomaton {
    /// Empty automaton
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&mut self, label: impl ToString) -> usize {
        self.labels.insert_full(label.to_string()).0
    }

    /// Add an edge labeled by a regular expression
    pub fn add_edge(&mut self, from: impl ToString, regex: Regex, to: impl ToString) -> &mut Self {
        let i = self.state(from);
        let j = self.state(to);
        self.edges.push((i, regex, j));
        self
    }

    /// Mark an initial state
    pub fn mark_initial(&mut self, state: impl ToString) -> &mut Self {
        let i = self.state(state);
        self.initial.insert(i);
        self
    }

    /// Mark a final state
    pub fn mark_final(&mut self, state: impl ToString) -> &mut Self {
        let i = self.state(state);
        self.accepting.insert(i);
        self
    }

    /// Number of states
    pub fn num_states(&self) -> usize {
        self.labels.len()
    }

    /// Iterator over the edges as triples (source label, regex, target label)
    pub fn edges(&self) -> impl Iterator<Item = (&str, &Regex, &str)> {
        self.edges
            .iter()
            .map(|(i, e, j)| (self.labels[*i].as_str(), e, self.labels[*j].as_str()))
    }

    ///
    /// Equivalent automaton with ε-transitions
    /// - a fresh state START is the only initial state, with ε-transitions
    ///   to all the initial states of self
    /// - a fresh state END is the only final state, with ε-transitions
    ///   from all the final states of self
    /// - every edge is replaced by the Thompson construction of its expression
    ///
    /// START and END get extra primes if these labels are already used.
    ///
    /// # Errors
    ///
    /// [Error::MissingInitialState] if no state is marked initial.
    ///
    pub fn to_epsilon_nfa(&self) -> Result<Nfa, Error> {
        if self.initial.is_empty() {
            return Err(Error::MissingInitialState);
        }
        let fresh = |base: &str| {
            let mut label = base.to_string();
            while self.labels.contains(&label) {
                label.push('\'');
            }
            label
        };

        let mut builder = ThompsonBuilder {
            labels: self.labels.clone(),
            delta: IndexMap::new(),
        };
        let start = builder.state(fresh(START_LABEL));
        let end = builder.state(fresh(END_LABEL));
        for &i in &self.initial {
            builder.edge(start, Symbol::Epsilon, i);
        }
        for &i in &self.accepting {
            builder.edge(i, Symbol::Epsilon, end);
        }
        let mut chars = OrderedSet::new();
        for (i, e, j) in &self.edges {
            e.collect_literals(&mut chars);
            builder.eval(e, *i, *j);
        }
        Ok(builder.build(
            Alphabet::from_set(chars),
            OrderedSet::singleton(start),
            OrderedSet::singleton(end),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // all words over the given characters of length at most n
    fn words(chars: &str, n: usize) -> Vec<String> {
        let mut result = vec![String::new()];
        let mut last = vec![String::new()];
        for _ in 0..n {
            last = last
                .iter()
                .flat_map(|w| chars.chars().map(move |c| format!("{w}{c}")))
                .collect();
            result.extend(last.iter().cloned());
        }
        result
    }

    #[test]
    fn test_parse_and_print() {
        let examples = [
            "a",
            "\u{03B5}",
            "a+b",
            "a+b.c",
            "(a+b).c",
            "a.(b.c)*",
            "(a.b).c",
            "(a+b)+c",
            "a**",
            "a.((a+b)*+c).d",
        ];
        for text in examples {
            let r = Regex::parse(text).unwrap();
            println!("{text} --> {r}");
            assert_eq!(r.to_string(), text);
            assert_eq!(Regex::parse(&r.to_string()).unwrap(), r);
        }

        let r = Regex::parse("(a)+((b))").unwrap();
        assert_eq!(r.to_string(), "a+b");
    }

    #[test]
    fn test_from_postfix() {
        use PostfixToken::*;
        assert_eq!(
            Regex::from_postfix(&[Literal('a'), Star]),
            Ok(Regex::star(Regex::Literal('a')))
        );
        assert!(Regex::from_postfix(&[Literal('a'), Alternation]).is_err());
        assert!(Regex::from_postfix(&[Literal('a'), Literal('b')]).is_err());
        assert!(Regex::from_postfix(&[]).is_err());
    }

    #[test]
    fn test_compile() {
        let r = Regex::parse("a.((a+b)*+c).d").unwrap();
        let nfa = r.compile();
        println!("{r}:\n{nfa}");
        assert_eq!(nfa.alphabet().chars().collect::<String>(), "abcd");
        assert_eq!(nfa.label(0), "0");
        assert_eq!(nfa.label(1), "1");
        assert!(nfa.has_epsilon_moves());

        assert!(nfa.accepts("aad"));
        assert!(nfa.accepts("acd"));
        assert!(nfa.accepts("ad"));
        assert!(nfa.accepts("ababbd"));
        assert!(!nfa.accepts("abcd"));
        assert!(!nfa.accepts("accd"));
        assert!(!nfa.accepts("a"));

        let dfa = r.to_dfa();
        println!("Minimal DFA:\n{dfa}");
        for w in words("abcd", 5) {
            let expected = w.len() >= 2
                && w.starts_with('a')
                && w.ends_with('d')
                && (w[1..w.len() - 1] == *"c" || w[1..w.len() - 1].chars().all(|c| c == 'a' || c == 'b'));
            assert_eq!(dfa.accepts(&w), expected, "word {w}");
            assert_eq!(nfa.accepts(&w), expected, "word {w}");
        }
    }

    #[test]
    fn test_epsilon_and_star() {
        let r = Regex::parse("\u{03B5}+a.b").unwrap();
        assert!(r.matches(""));
        assert!(r.matches("ab"));
        assert!(!r.matches("a"));

        let r = Regex::parse("(a*.b*)*").unwrap();
        for w in words("ab", 5) {
            assert!(r.matches(&w), "word {w}");
        }
        assert!(!r.matches("c"));
    }

    #[test]
    fn test_regex_automaton() {
        let mut g = RegexAutomaton::new();
        g.add_edge("p", Regex::parse("a.b").unwrap(), "q")
            .add_edge("q", Regex::parse("c*").unwrap(), "q")
            .add_edge("q", Regex::parse("a").unwrap(), "p")
            .mark_initial("p")
            .mark_final("q");
        for (source, e, target) in g.edges() {
            println!("{source} --{e}--> {target}");
        }
        let nfa = g.to_epsilon_nfa().unwrap();
        println!("{nfa}");
        assert_eq!(nfa.label(*nfa.initial_states().first().unwrap()), START_LABEL);
        assert!(nfa.accepts("ab"));
        assert!(nfa.accepts("abcc"));
        assert!(nfa.accepts("abaab"));
        assert!(!nfa.accepts("a"));
        assert!(!nfa.accepts(""));

        let mut empty = RegexAutomaton::new();
        empty.add_edge(0, Regex::Literal('a'), 1);
        assert_eq!(empty.to_epsilon_nfa(), Err(Error::MissingInitialState));
    }
}
