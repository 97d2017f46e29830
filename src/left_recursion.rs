// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Left-recursion elimination and Greibach normal form
//!
//! Both transformations start from the proper form of a grammar, so bodies are
//! never empty (except `S -> ε` for a start symbol that doesn't occur in any body)
//! and there are no unit cycles.
//!

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    grammars::{fresh_name, Body, Grammar, Token},
    ordered_sets::{fixpoint, OrderedSet},
};

type Productions = IndexMap<String, OrderedSet<Body>>;

// nonterminal at the start of a body
fn leading_nonterminal(body: &Body) -> Option<&str> {
    match body.first() {
        Some(Token::NonTerm(n)) => Some(n.as_str()),
        _ => None,
    }
}

// replace the bodies of head that start with name by the bodies of name
// followed by the rest
fn substitute_leading(productions: &mut Productions, head: &str, name: &str) {
    let (Some(bodies), Some(replacements)) = (productions.get(head), productions.get(name)) else {
        return;
    };
    if !bodies.iter().any(|b| leading_nonterminal(b) == Some(name)) {
        return;
    }
    let mut new_bodies = OrderedSet::new();
    for body in bodies {
        if leading_nonterminal(body) == Some(name) {
            for r in replacements {
                let mut b = r.clone();
                b.extend_from_slice(&body[1..]);
                new_bodies.insert(b);
            }
        } else {
            new_bodies.insert(body.clone());
        }
    }
    trace!("substitute {name} in {head}: {} bodies", new_bodies.len());
    productions.insert(head.to_string(), new_bodies);
}

// remove direct left recursion on head, using a fresh nonterminal head'
fn remove_direct_recursion(productions: &mut Productions, head: &str) {
    let Some(bodies) = productions.get(head) else {
        return;
    };
    let (recursive, others): (Vec<&Body>, Vec<&Body>) =
        bodies.iter().partition(|b| leading_nonterminal(b) == Some(head));
    if recursive.is_empty() {
        return;
    }
    let tail = fresh_name(&format!("{head}'"), |n| productions.contains_key(n));
    let alphas: Vec<Body> = recursive.iter().map(|b| b[1..].to_vec()).collect();
    let mut head_bodies = OrderedSet::new();
    for beta in others {
        head_bodies.insert(beta.clone());
        let mut b = beta.clone();
        b.push(Token::NonTerm(tail.clone()));
        head_bodies.insert(b);
    }
    let mut tail_bodies = OrderedSet::new();
    for alpha in alphas {
        let mut b = alpha.clone();
        b.push(Token::NonTerm(tail.clone()));
        tail_bodies.insert(alpha);
        tail_bodies.insert(b);
    }
    trace!("direct left recursion on {head}: new nonterminal {tail}");
    productions.insert(head.to_string(), head_bodies);
    productions.insert(tail, tail_bodies);
}

impl Grammar {
    ///
    /// Left corners of a nonterminal
    /// - all nonterminals B such that name derives B α in one or more steps
    ///
    /// Nullable nonterminals at the start of a body are skipped: if A -> B C and B
    /// is nullable then C is a left corner of A.
    ///
    pub fn left_corners(&self, name: &str) -> OrderedSet<String> {
        let nullable = self.nullable_symbols();
        let direct = |n: &str| -> OrderedSet<String> {
            let mut result = OrderedSet::new();
            for body in self.bodies(n).into_iter().flatten() {
                for t in body {
                    match t {
                        Token::Term(_) => break,
                        Token::NonTerm(b) => {
                            result.insert(b.clone());
                            if !nullable.contains(b) {
                                break;
                            }
                        }
                    }
                }
            }
            result
        };
        fixpoint(direct(name), |corners| {
            corners.iter().flat_map(|b| direct(b.as_str())).collect()
        })
    }

    /// Check whether some nonterminal is a left corner of itself
    pub fn is_left_recursive(&self) -> bool {
        self.nonterminals()
            .any(|n| self.left_corners(n).contains(&n.to_string()))
    }

    ///
    /// Remove left recursion
    ///
    /// The grammar is first converted to proper form. Then with the nonterminals in
    /// order A1, ..., An, for each i:
    /// - every body Aj α of Ai with j < i is replaced by β α for all bodies β of Aj
    /// - the direct recursion Ai -> Ai α | β is replaced by Ai -> β | β Ai' and
    ///   Ai' -> α | α Ai'
    ///
    /// The result generates the same language and is not left recursive.
    ///
    pub fn remove_left_recursion(&self) -> Grammar {
        let proper = self.to_proper();
        let mut productions = proper.productions().clone();
        let order: Vec<String> = productions.keys().cloned().collect();
        for (i, head) in order.iter().enumerate() {
            for earlier in &order[..i] {
                substitute_leading(&mut productions, head, earlier);
            }
            remove_direct_recursion(&mut productions, head);
        }
        let result = Grammar::from_parts(
            proper.start().to_string(),
            proper.terminals().clone(),
            productions,
        )
        .reduce();
        debug!(
            "left recursion removal: {} rules -> {} rules, {} nonterminals",
            self.num_rules(),
            result.num_rules(),
            result.num_nonterminals()
        );
        result
    }

    ///
    /// Greibach normal form
    ///
    /// Starting from a grammar without left recursion, leading nonterminals are
    /// replaced by their bodies, in an order where a nonterminal is processed after
    /// all the nonterminals its bodies can start with. Then terminals that are not in
    /// leading position are replaced by proxy nonterminals `[a] -> a`.
    ///
    /// Every body of the result is a terminal followed by zero or more nonterminals.
    /// The only exception is `S -> ε` when the language contains the empty word.
    ///
    pub fn to_gnf(&self) -> Grammar {
        let g = self.remove_left_recursion();
        let mut productions = g.productions().clone();

        // dependencies first
        let mut order = Vec::new();
        let mut visited = OrderedSet::new();
        for name in productions.keys() {
            visit_leading(&productions, name, &mut visited, &mut order);
        }
        for head in &order {
            let leading: OrderedSet<String> = productions[head.as_str()]
                .iter()
                .filter_map(|b| leading_nonterminal(b).map(|n| n.to_string()))
                .collect();
            for name in leading {
                substitute_leading(&mut productions, head, &name);
            }
        }

        // proxies for terminals after the first position
        let mut proxies: HashMap<char, String> = HashMap::new();
        let mut new_productions: Productions = IndexMap::new();
        for (head, bodies) in &productions {
            let mut new_bodies = OrderedSet::new();
            for body in bodies {
                let mut b: Body = Vec::with_capacity(body.len());
                for (k, t) in body.iter().enumerate() {
                    match t {
                        Token::Term(c) if k > 0 => {
                            let name = proxies.entry(*c).or_insert_with(|| {
                                fresh_name(&format!("[{c}]"), |n| productions.contains_key(n))
                            });
                            b.push(Token::NonTerm(name.clone()));
                        }
                        _ => b.push(t.clone()),
                    }
                }
                new_bodies.insert(b);
            }
            new_productions.insert(head.clone(), new_bodies);
        }
        let mut proxies: Vec<(char, String)> = proxies.into_iter().collect();
        proxies.sort_unstable();
        for (c, name) in proxies {
            new_productions.insert(name, OrderedSet::singleton(vec![Token::Term(c)]));
        }

        let result =
            Grammar::from_parts(g.start().to_string(), g.terminals().clone(), new_productions)
                .reduce();
        debug!(
            "GNF: {} rules -> {} rules, {} nonterminals",
            self.num_rules(),
            result.num_rules(),
            result.num_nonterminals()
        );
        result
    }

    ///
    /// Check whether the grammar is in Greibach normal form
    /// - every body is a terminal followed by nonterminals
    /// - the start symbol may have an ε-body if it doesn't occur in any body
    ///
    pub fn is_gnf(&self) -> bool {
        let start_free = !self.start_in_bodies();
        self.rules().all(|(head, body)| match body.split_first() {
            None => head == self.start() && start_free,
            Some((Token::Term(_), rest)) => rest.iter().all(|t| !t.is_terminal()),
            Some((Token::NonTerm(_), _)) => false,
        })
    }
}

// depth-first visit: nonterminals that name's bodies start with come first in order
fn visit_leading(
    productions: &Productions,
    name: &str,
    visited: &mut OrderedSet<String>,
    order: &mut Vec<String>,
) {
    if !visited.insert(name.to_string()) {
        return;
    }
    if let Some(bodies) = productions.get(name) {
        for b in bodies {
            if let Some(n) = leading_nonterminal(b) {
                visit_leading(productions, n, visited, order);
            }
        }
    }
    order.push(name.to_string());
}

#[cfg(test)]
mod test {
    use super::*;

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

    fn same_language(g: &Grammar, h: &Grammar, chars: &str, n: usize) {
        for w in words(chars, n) {
            assert_eq!(g.accepts(&w), h.accepts(&w), "word {w:?}");
        }
    }

    fn expressions() -> Grammar {
        Grammar::parse(
            "E",
            "x+*()",
            "E: E+T | T
             T: T*F | F
             F: (E) | x",
        )
        .unwrap()
    }

    #[test]
    fn test_left_corners() {
        let g = expressions();
        assert_eq!(g.left_corners("E").sorted(), vec!["E", "F", "T"]);
        assert!(g.left_corners("F").is_empty());
        assert!(g.is_left_recursive());

        // hidden left recursion through a nullable prefix
        let g = Grammar::parse("S", "abc", "S: ASb | c\nA: a | \u{03B5}").unwrap();
        let corners = g.left_corners("S");
        println!("left corners of S: {corners}");
        assert!(corners.contains(&"A".to_string()));
        assert!(corners.contains(&"S".to_string()));
        assert!(g.is_left_recursive());

        let g = Grammar::parse("S", "ab", "S: aS | b").unwrap();
        assert!(!g.is_left_recursive());
    }

    #[test]
    fn test_direct_recursion() {
        let g = expressions();
        let h = g.remove_left_recursion();
        println!("Without left recursion:\n{h}");
        assert!(!h.is_left_recursive());
        assert!(h.is_nonterminal("E'"));
        assert!(h.is_nonterminal("T'"));
        same_language(&g, &h, "x+*()", 5);
    }

    #[test]
    fn test_indirect_recursion() {
        let g = Grammar::parse(
            "S",
            "abcde",
            "S: Aa | b
             A: Ac | Sd | e",
        )
        .unwrap();
        assert!(g.is_left_recursive());
        let h = g.remove_left_recursion();
        println!("Without left recursion:\n{h}");
        assert!(!h.is_left_recursive());
        same_language(&g, &h, "abcde", 5);

        let g = Grammar::parse("S", "ab", "S: ASb | \u{03B5}\nA: a | \u{03B5}").unwrap();
        let h = g.remove_left_recursion();
        println!("Without left recursion:\n{h}");
        assert!(!h.is_left_recursive());
        same_language(&g, &h, "ab", 7);
    }

    #[test]
    fn test_gnf() {
        let g = expressions();
        assert!(!g.is_gnf());
        let h = g.to_gnf();
        println!("GNF:\n{h}");
        assert!(h.is_gnf());
        assert!(h.is_nonterminal("[)]"));
        same_language(&g, &h, "x+*()", 5);

        let g = Grammar::parse("S", "ab", "S: aSb | SS | \u{03B5}").unwrap();
        let h = g.to_gnf();
        println!("GNF:\n{h}");
        assert!(h.is_gnf());
        assert!(h.accepts(""));
        same_language(&g, &h, "ab", 8);

        let g = Grammar::parse("S", "abcde", "S: Aa | b\nA: Ac | Sd | e").unwrap();
        let h = g.to_gnf();
        println!("GNF:\n{h}");
        assert!(h.is_gnf());
        same_language(&g, &h, "abcde", 5);
    }

    #[test]
    fn test_empty_language() {
        let g = Grammar::parse("S", "a", "S: Sa").unwrap();
        let h = g.to_gnf();
        println!("GNF:\n{h}");
        assert_eq!(h.num_rules(), 0);
        assert!(h.is_gnf());
        assert!(!h.is_left_recursive());
    }
}
