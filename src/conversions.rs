// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Conversions between grammars and automata
//!
//! - regular grammar to non-deterministic automaton and back
//! - context-free grammar to a top-down (predictive) pushdown recognizer
//! - context-free grammar to a bottom-up (shift-reduce) pushdown recognizer
//!

use indexmap::IndexMap;
use log::debug;

use crate::{
    alphabet::Symbol,
    grammars::{fresh_name, is_valid_name, Body, Grammar, Token},
    nfa::Nfa,
    ordered_sets::OrderedSet,
    pushdown::{Acceptance, Pda, StackSymbol, Transition},
    regular_grammars::RegularGrammar,
};

impl RegularGrammar {
    ///
    /// Convert to a non-deterministic automaton
    /// - one state per nonterminal, labeled by the nonterminal's name, plus a final state `qf`
    /// - the initial state is the start symbol
    /// - `A -> aB` gives a transition from A to B on a
    /// - `A -> a` gives a transition from A to the final state on a
    /// - A is accepting if `A -> ε`
    ///
    /// The final state gets extra primes if `qf` is a nonterminal.
    ///
    pub fn to_nfa(&self) -> Nfa {
        let g = self.grammar();
        let mut labels: OrderedSet<String> = g.nonterminals().map(|n| n.to_string()).collect();
        let (qf, _) = labels.insert_full(fresh_name("qf", |n| g.is_nonterminal(n)));
        let state = |n: &str| labels.index_of(&n.to_string()).unwrap_or(qf);

        let mut delta: IndexMap<(usize, Symbol), OrderedSet<usize>> = IndexMap::new();
        let mut accepting = OrderedSet::new();
        for (head, body) in g.rules() {
            let source = state(head);
            match body.as_slice() {
                [] => {
                    accepting.insert(source);
                }
                [Token::Term(c)] => {
                    delta.entry((source, Symbol::Char(*c))).or_default().insert(qf);
                }
                [Token::Term(c), Token::NonTerm(b)] => {
                    delta.entry((source, Symbol::Char(*c))).or_default().insert(state(b));
                }
                _ => (),
            }
        }
        accepting.insert(qf);
        let initial = OrderedSet::singleton(state(g.start()));
        debug!(
            "regular grammar to NFA: {} rules -> {} states",
            g.num_rules(),
            labels.len()
        );
        Nfa::from_parts(g.alphabet(), labels, delta, initial, accepting)
    }

    ///
    /// Convert a non-deterministic automaton to a regular grammar
    ///
    /// ε-transitions are removed first. Then every state Q gives a nonterminal with
    /// - `Q -> aP` for every transition from Q to P on a
    /// - `Q -> a` for every such transition if P is accepting
    /// - `Q -> ε` if Q is accepting
    ///
    /// Nonterminals are named after the state labels if they're all usable as
    /// nonterminal names, and `q0`, `q1`, ... otherwise. If there are several initial
    /// states, a fresh start symbol `S` gets the alternatives of all of them.
    ///
    pub fn from_nfa(nfa: &Nfa) -> RegularGrammar {
        let nfa = if nfa.has_epsilon_moves() {
            nfa.remove_epsilon()
        } else {
            nfa.clone()
        };
        let alphabet = nfa.alphabet();
        let n = nfa.num_states();
        let usable = |label: &str| {
            let mut chars = label.chars();
            let single_terminal = matches!((chars.next(), chars.next()), (Some(c), None) if alphabet.contains(c));
            is_valid_name(label) && !single_terminal
        };
        let names: Vec<String> = if (0..n).all(|i| usable(nfa.label(i))) {
            (0..n).map(|i| nfa.label(i).to_string()).collect()
        } else {
            (0..n).map(|i| format!("q{i}")).collect()
        };

        let mut productions: IndexMap<String, OrderedSet<Body>> =
            names.iter().map(|name| (name.clone(), OrderedSet::new())).collect();
        for (i, symbol, j) in nfa.transitions() {
            if let Symbol::Char(c) = symbol {
                let bodies = productions.entry(names[i].clone()).or_default();
                bodies.insert(vec![Token::Term(c), Token::NonTerm(names[j].clone())]);
                if nfa.is_accepting(j) {
                    bodies.insert(vec![Token::Term(c)]);
                }
            }
        }
        for &i in nfa.accepting_states() {
            productions.entry(names[i].clone()).or_default().insert(vec![]);
        }

        let initial = nfa.initial_states();
        let start = match initial.len() {
            1 => names[initial[0]].clone(),
            _ => {
                let start = fresh_name("S", |n| productions.contains_key(n));
                let bodies: OrderedSet<Body> = initial
                    .iter()
                    .filter_map(|&i| productions.get(&names[i]))
                    .flatten()
                    .cloned()
                    .collect();
                let mut with_start = IndexMap::new();
                with_start.insert(start.clone(), bodies);
                with_start.extend(productions);
                productions = with_start;
                start
            }
        };
        let terminals = alphabet.chars().collect();
        debug!(
            "NFA to regular grammar: {} states -> {} nonterminals",
            n,
            productions.len()
        );
        RegularGrammar::from_parts(Grammar::from_parts(start, terminals, productions))
    }
}

fn stack_string(body: &[Token]) -> Vec<StackSymbol> {
    body.iter()
        .map(|t| match t {
            Token::Term(c) => StackSymbol::Term(*c),
            Token::NonTerm(n) => StackSymbol::NonTerm(n.clone()),
        })
        .collect()
}

impl Grammar {
    ///
    /// Top-down recognizer
    ///
    /// The grammar is converted to a form without left recursion. The automaton has
    /// a single state and accepts by empty stack. The initial stack holds the start
    /// symbol, and the transitions are
    /// - expand: pop a nonterminal A and push a body of A, without reading input
    /// - match: read a terminal a and pop a from the top of the stack
    ///
    pub fn to_top_down_pda(&self) -> Pda {
        let g = self.remove_left_recursion();
        let mut transitions = Vec::new();
        for (head, body) in g.rules() {
            transitions.push(Transition::new(
                0,
                None,
                vec![StackSymbol::nonterm(head)],
                0,
                stack_string(body),
            ));
        }
        for c in self.terminals() {
            transitions.push(Transition::new(0, Some(*c), vec![StackSymbol::Term(*c)], 0, vec![]));
        }
        debug!(
            "top-down PDA: {} rules -> {} transitions",
            g.num_rules(),
            transitions.len()
        );
        Pda::from_parts(
            OrderedSet::singleton("q".to_string()),
            self.alphabet(),
            transitions,
            StackSymbol::nonterm(g.start()),
            OrderedSet::new(),
            Acceptance::EmptyStack,
        )
    }

    ///
    /// Bottom-up recognizer
    ///
    /// The grammar is converted to proper form. The automaton has a working state q
    /// and a final state f. The initial stack holds a bottom marker ⊥ and the
    /// transitions are
    /// - shift: read a terminal a and push it
    /// - reduce: pop a body of A (its last symbol on top) and push A, without reading input
    /// - accept: pop `S⊥` and move to f
    ///
    /// If the language contains the empty word, there's also a transition that pops `⊥`
    /// and moves to f.
    ///
    pub fn to_bottom_up_pda(&self) -> Pda {
        let g = self.to_proper();
        let (q, f) = (0, 1);
        let mut transitions = Vec::new();
        for c in self.terminals() {
            transitions.push(Transition::new(q, Some(*c), vec![], q, vec![StackSymbol::Term(*c)]));
        }
        for (head, body) in g.rules() {
            if !body.is_empty() {
                let mut pop = stack_string(body);
                pop.reverse();
                transitions.push(Transition::new(q, None, pop, q, vec![StackSymbol::nonterm(head)]));
            }
        }
        transitions.push(Transition::new(
            q,
            None,
            vec![StackSymbol::nonterm(g.start()), StackSymbol::Bottom],
            f,
            vec![],
        ));
        if g.bodies(g.start()).is_some_and(|b| b.contains(&vec![])) {
            transitions.push(Transition::new(q, None, vec![StackSymbol::Bottom], f, vec![]));
        }
        debug!(
            "bottom-up PDA: {} rules -> {} transitions",
            g.num_rules(),
            transitions.len()
        );
        Pda::from_parts(
            ["q".to_string(), "f".to_string()].into_iter().collect(),
            self.alphabet(),
            transitions,
            StackSymbol::Bottom,
            OrderedSet::singleton(f),
            Acceptance::FinalState,
        )
    }
}
