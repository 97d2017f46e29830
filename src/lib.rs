// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Finite automata, regular expressions, and context-free grammars
//!
//! # Overview
//!
//! This crate represents the classical structures of formal-language theory as
//! explicit values and implements the algorithms that convert between them and
//! reduce them to canonical forms. All structures are immutable once built: every
//! transformation returns a new structure.
//!
//! Automata:
//! - [automata](crate::automata) defines deterministic automata, with completion,
//!   minimization, canonical renaming, and product constructions. It also provides
//!   [AutomatonBuilder](crate::automata::AutomatonBuilder) to construct automata.
//! - [nfa](crate::nfa) defines non-deterministic automata with ε-transitions,
//!   ε-closure, ε-removal, and the subset construction.
//!
//! Regular expressions:
//! - [regex_parser](crate::regex_parser) parses the textbook notation `a.(b+c)*`.
//! - [regular_expressions](crate::regular_expressions) defines the syntax tree and the
//!   Thompson construction.
//!
//! Grammars:
//! - [grammars](crate::grammars) defines context-free grammars, the rule-text
//!   notation `S: aSb | ε`, and a membership test that works for any grammar.
//! - [normal_forms](crate::normal_forms) implements reduction, removal of ε- and
//!   unit productions, proper form, and Chomsky normal form.
//! - [left_recursion](crate::left_recursion) implements left-recursion removal and
//!   Greibach normal form.
//! - [regular_grammars](crate::regular_grammars) defines right-linear grammars.
//!
//! Pushdown automata and conversions:
//! - [pushdown](crate::pushdown) defines pushdown automata and a nondeterministic
//!   recognizer.
//! - [conversions](crate::conversions) converts regular grammars to automata and back,
//!   and builds top-down and bottom-up recognizers for context-free grammars.
//!
//! Closures (reachability, nullable symbols, and so forth) are computed with the
//! [fixpoint](crate::ordered_sets::fixpoint) function on insertion-ordered sets, so
//! all results are deterministic.
//!
//! # Example
//!
//! ```
//! use formal_langs::regular_expressions::Regex;
//!
//! let r = Regex::parse("a.((a+b)*+c).d").unwrap();
//! let dfa = r.to_dfa();
//! assert!(dfa.accepts("aad"));
//! assert!(dfa.accepts("acd"));
//! assert!(!dfa.accepts("abcd"));
//! ```
//!

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod alphabet;
pub mod automata;
pub mod conversions;
pub mod errors;
pub mod grammars;
pub mod left_recursion;
pub mod nfa;
pub mod normal_forms;
pub mod ordered_sets;
pub mod pushdown;
pub mod regex_parser;
pub mod regular_expressions;
pub mod regular_grammars;

mod bfs_queues;
mod labeled_queues;
mod minimizer;
mod partitions;

#[cfg(test)]
mod proptests;
