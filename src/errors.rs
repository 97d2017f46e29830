// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Error codes
//!

use std::fmt::Display;

#[derive(Debug, PartialEq, Eq, Clone)]
///
/// Errors produced when building automata, grammars, and regular expressions
///
/// All structures are validated when they are built. A structure that
/// doesn't satisfy its invariants is never returned.
///
pub enum Error {
    /// The empty-string marker `ε` is used as an ordinary symbol, or a single-character
    /// nonterminal has the same name as a terminal.
    MalformedAlphabet(char),

    /// A symbol is declared twice in an alphabet.
    DuplicateSymbol(char),

    /// A state is used but not declared.
    UnknownState(String),

    /// A symbol is used but not part of the declared alphabet.
    UnknownSymbol(char),

    /// A nonterminal is used but not declared.
    UnknownNonTerminal(String),

    /// A nonterminal name is empty or contains a reserved character
    /// (`<`, `>`, `|`, `:`, `ε`, or whitespace).
    InvalidName(String),

    /// No initial state was given.
    MissingInitialState,

    /// More than one initial state was given for a deterministic automaton
    /// or a pushdown automaton.
    MultipleInitialStates,

    /// Two transitions from the same state on the same symbol go to different states
    /// in a deterministic automaton.
    NondeterministicTransition {
        /// Source state
        state: String,
        /// Transition symbol
        symbol: char,
    },

    /// Regular expression syntax error: a token was found where it's not allowed.
    ///
    /// `position` is the character index of the token in the input;
    /// `found` is the token (or `end of input`).
    UnexpectedToken {
        /// Character index in the regular expression
        position: usize,
        /// Offending token
        found: String,
    },

    /// Regular expression syntax error: unmatched parenthesis at the given position.
    UnbalancedParentheses {
        /// Character index in the regular expression
        position: usize,
    },

    /// A rule is not of the form `head: body | ... | body`.
    InvalidRule(String),

    /// A regular grammar production is not of the form `a`, `aB`, or `ε`.
    UnsupportedProduction {
        /// Nonterminal on the left-hand side
        head: String,
        /// The offending body, in rule-text notation
        body: String,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedAlphabet(c) => write!(f, "malformed alphabet: '{c}' can't be used here"),
            Self::DuplicateSymbol(c) => write!(f, "duplicate symbol '{c}' in alphabet"),
            Self::UnknownState(s) => write!(f, "unknown state {s}"),
            Self::UnknownSymbol(c) => write!(f, "symbol '{c}' is not in the alphabet"),
            Self::UnknownNonTerminal(n) => write!(f, "unknown nonterminal {n}"),
            Self::InvalidName(n) => write!(f, "invalid nonterminal name \"{n}\""),
            Self::MissingInitialState => "no initial state".fmt(f),
            Self::MultipleInitialStates => "more than one initial state".fmt(f),
            Self::NondeterministicTransition { state, symbol } => {
                write!(f, "non-deterministic transitions from {state} on '{symbol}'")
            }
            Self::UnexpectedToken { position, found } => {
                write!(f, "unexpected token {found} at position {position}")
            }
            Self::UnbalancedParentheses { position } => {
                write!(f, "unbalanced parentheses at position {position}")
            }
            Self::InvalidRule(text) => write!(f, "invalid rule \"{text}\""),
            Self::UnsupportedProduction { head, body } => {
                write!(f, "production {head} -> {body} is not regular")
            }
        }
    }
}

impl std::error::Error for Error {}
