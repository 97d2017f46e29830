// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Right-linear grammars
//!
//! A regular grammar is a context-free grammar where every body is either a single
//! terminal `a`, a terminal followed by a nonterminal `aB`, or the empty word.
//! Conversions to and from finite automata are in [conversions](crate::conversions).
//!

use std::fmt::Display;

use crate::{
    errors::Error,
    grammars::{format_body, Grammar, Token},
};

///
/// Regular grammar
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegularGrammar {
    grammar: Grammar,
}

impl RegularGrammar {
    ///
    /// Check that all bodies of a grammar have one of the forms `a`, `aB`, or ε
    ///
    /// # Errors
    ///
    /// [Error::UnsupportedProduction] for the first body that doesn't.
    ///
    pub fn new(grammar: Grammar) -> Result<Self, Error> {
        for (head, body) in grammar.rules() {
            match body.as_slice() {
                [] | [Token::Term(_)] | [Token::Term(_), Token::NonTerm(_)] => (),
                _ => {
                    return Err(Error::UnsupportedProduction {
                        head: head.to_string(),
                        body: format_body(body),
                    })
                }
            }
        }
        Ok(RegularGrammar { grammar })
    }

    pub(crate) fn from_parts(grammar: Grammar) -> Self {
        debug_assert!(grammar.rules().all(|(_, body)| body.len() <= 2));
        RegularGrammar { grammar }
    }

    ///
    /// Parse a regular grammar from rule text
    ///
    /// See [Grammar::parse] for the notation.
    ///
    /// # Example
    ///
    /// ```
    /// use formal_langs::regular_grammars::RegularGrammar;
    ///
    /// let g = RegularGrammar::parse("S", "ab", "S: aS | b").unwrap();
    /// assert!(g.grammar().accepts("aab"));
    /// assert!(RegularGrammar::parse("S", "ab", "S: Sa | b").is_err());
    /// ```
    pub fn parse(start: &str, terminals: &str, rules: &str) -> Result<Self, Error> {
        Self::new(Grammar::parse(start, terminals, rules)?)
    }

    /// The underlying context-free grammar
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Convert to the underlying context-free grammar
    pub fn into_grammar(self) -> Grammar {
        self.grammar
    }
}

impl Display for RegularGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.grammar.fmt(f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_regular_grammar() {
        let g = RegularGrammar::parse(
            "S",
            "abc",
            "S: aA | bC | a | \u{03B5}
             A: bB | aA | b | c
             B: aB | bC | aC | cA | c
             C: a | b | aA | bB",
        )
        .unwrap();
        println!("{g}");
        assert_eq!(g.grammar().num_rules(), 17);
        assert_eq!(g.to_string(), g.grammar().to_string());
    }

    #[test]
    fn test_unsupported() {
        let cases = [
            ("S: aSb | \u{03B5}", "aSb"),
            ("S: Sa | a", "Sa"),
            ("S: ab", "ab"),
            ("S: A\nA: a", "A"),
        ];
        for (rules, body) in cases {
            let result = RegularGrammar::parse("S", "ab", rules);
            println!("{rules:?}: {result:?}");
            assert_eq!(
                result,
                Err(Error::UnsupportedProduction {
                    head: "S".to_string(),
                    body: body.to_string()
                })
            );
        }
    }
}
