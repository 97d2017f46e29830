// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Grammar normalization
//!
//! - reduction: removal of non-generating and unreachable symbols
//! - removal of ε-productions
//! - removal of unit productions (bodies that consist of a single nonterminal)
//! - proper form: no ε-productions (except possibly `S' -> ε` for a fresh start
//!   symbol `S'`), no unit productions, no useless symbols
//! - Chomsky normal form
//!
//! All closures are computed with [fixpoint].
//!

use std::collections::HashMap;

use indexmap::IndexMap;
use log::debug;

use crate::{
    grammars::{fresh_name, Body, Grammar, Token},
    ordered_sets::{fixpoint, OrderedSet},
};

impl Grammar {
    ///
    /// Generating nonterminals
    ///
    /// A nonterminal is generating if it derives a string of terminals. This is the
    /// smallest set Ne such that A is in Ne whenever A has a body whose nonterminals
    /// are all in Ne.
    ///
    pub fn generating_symbols(&self) -> OrderedSet<String> {
        fixpoint(OrderedSet::new(), |ne| {
            self.productions()
                .iter()
                .filter(|(_, bodies)| {
                    bodies.iter().any(|body| {
                        body.iter().all(|t| match t {
                            Token::Term(_) => true,
                            Token::NonTerm(n) => ne.contains(n),
                        })
                    })
                })
                .map(|(head, _)| head.clone())
                .collect()
        })
    }

    ///
    /// Reachable symbols
    /// - all tokens that occur in a sentential form derived from the start symbol
    ///
    pub fn reachable_symbols(&self) -> OrderedSet<Token> {
        fixpoint(OrderedSet::singleton(Token::nonterm(self.start())), |reached| {
            reached
                .iter()
                .filter_map(|t| match t {
                    Token::NonTerm(n) => self.bodies(n),
                    Token::Term(_) => None,
                })
                .flatten()
                .flatten()
                .cloned()
                .collect()
        })
    }

    // Keep the nonterminals that satisfy keep, and all bodies that only use them.
    // The start symbol is always kept as a head, but bodies that mention it are
    // dropped unless it satisfies keep.
    fn restrict<F>(&self, keep: F) -> Grammar
    where
        F: Fn(&str) -> bool,
    {
        let productions = self
            .productions()
            .iter()
            .filter(|(head, _)| *head == self.start() || keep(head.as_str()))
            .map(|(head, bodies)| {
                let bodies: OrderedSet<Body> = bodies
                    .iter()
                    .filter(|body| {
                        body.iter().all(|t| match t {
                            Token::Term(_) => true,
                            Token::NonTerm(n) => keep(n.as_str()),
                        })
                    })
                    .cloned()
                    .collect();
                (head.clone(), bodies)
            })
            .collect();
        Grammar::from_parts(self.start().to_string(), self.terminals().clone(), productions)
    }

    ///
    /// Reduced grammar
    /// 1) remove the nonterminals that are not generating and all productions
    ///    that use them
    /// 2) remove the nonterminals and terminals that are not reachable from
    ///    the start symbol
    ///
    /// If the language is empty, the result has only the start symbol, no
    /// productions, and no terminals.
    ///
    pub fn reduce(&self) -> Grammar {
        let generating = self.generating_symbols();
        let g = self.restrict(|n| generating.contains(&n.to_string()));
        let reachable = g.reachable_symbols();
        let g = g.restrict(|n| reachable.contains(&Token::nonterm(n)));
        let nonempty = generating.contains(&g.start().to_string());
        let terminals = g
            .terminals()
            .iter()
            .filter(|&&c| nonempty && reachable.contains(&Token::Term(c)))
            .copied()
            .collect();
        let result = Grammar::from_parts(g.start().to_string(), terminals, g.productions().clone());
        debug!(
            "reduce: {} nonterminals, {} rules -> {} nonterminals, {} rules",
            self.num_nonterminals(),
            self.num_rules(),
            result.num_nonterminals(),
            result.num_rules()
        );
        result
    }

    ///
    /// Nullable nonterminals
    ///
    /// This is the smallest set Nε such that A is in Nε whenever A has a body whose
    /// elements are all nonterminals in Nε (including the empty body).
    ///
    pub fn nullable_symbols(&self) -> OrderedSet<String> {
        fixpoint(OrderedSet::new(), |nullable| {
            self.productions()
                .iter()
                .filter(|(_, bodies)| {
                    bodies
                        .iter()
                        .any(|body| body.iter().all(|t| matches!(t, Token::NonTerm(n) if nullable.contains(n))))
                })
                .map(|(head, _)| head.clone())
                .collect()
        })
    }

    ///
    /// Remove the ε-productions
    /// - every body is replaced by all its variants obtained by erasing a subset
    ///   of its nullable nonterminals (except the empty variant)
    /// - if the start symbol S is nullable, a fresh start symbol S' is added
    ///   with productions `S' -> ε | S`
    ///
    pub fn remove_epsilon_rules(&self) -> Grammar {
        let nullable = self.nullable_symbols();
        let mut productions: IndexMap<String, OrderedSet<Body>> = IndexMap::new();
        let mut start = self.start().to_string();
        if nullable.contains(&start) {
            let new_start = self.fresh_nonterminal(&format!("{start}'"));
            let bodies = [vec![], vec![Token::NonTerm(start)]].into_iter().collect();
            productions.insert(new_start.clone(), bodies);
            start = new_start;
        }

        for (head, bodies) in self.productions() {
            let mut new_bodies = OrderedSet::new();
            for body in bodies {
                // all variants of the body, keeping or erasing every nullable nonterminal
                let mut variants: Vec<Body> = vec![vec![]];
                for t in body {
                    let erasable = matches!(t, Token::NonTerm(n) if nullable.contains(n));
                    variants = variants
                        .into_iter()
                        .flat_map(|v| {
                            let mut kept = v.clone();
                            kept.push(t.clone());
                            if erasable {
                                vec![kept, v]
                            } else {
                                vec![kept]
                            }
                        })
                        .collect();
                }
                new_bodies.extend(variants.into_iter().filter(|v| !v.is_empty()));
            }
            productions.insert(head.clone(), new_bodies);
        }
        Grammar::from_parts(start, self.terminals().clone(), productions)
    }

    ///
    /// Unit closure of a nonterminal
    /// - all nonterminals B such that A derives B using only unit productions
    ///   (including A itself)
    ///
    pub fn unit_closure(&self, name: &str) -> OrderedSet<String> {
        fixpoint(OrderedSet::singleton(name.to_string()), |closure| {
            closure
                .iter()
                .filter_map(|n| self.bodies(n))
                .flatten()
                .filter_map(|body| match body.as_slice() {
                    [Token::NonTerm(b)] => Some(b.clone()),
                    _ => None,
                })
                .collect()
        })
    }

    ///
    /// Remove the unit productions
    /// - the bodies of A are replaced by all the non-unit bodies of the
    ///   nonterminals in the unit closure of A
    ///
    pub fn remove_unit_rules(&self) -> Grammar {
        let is_unit = |body: &Body| matches!(body.as_slice(), [Token::NonTerm(_)]);
        let productions = self
            .nonterminals()
            .map(|head| {
                let bodies: OrderedSet<Body> = self
                    .unit_closure(head)
                    .iter()
                    .filter_map(|b| self.bodies(b))
                    .flatten()
                    .filter(|body| !is_unit(body))
                    .cloned()
                    .collect();
                (head.to_string(), bodies)
            })
            .collect();
        Grammar::from_parts(self.start().to_string(), self.terminals().clone(), productions)
    }

    ///
    /// Proper form
    /// - remove ε-productions, then unit productions, then reduce
    ///
    /// The result generates the same language. It has no unit productions, no useless
    /// symbols, and no ε-productions except `S -> ε` when the language contains ε. In
    /// that case, the start symbol doesn't occur in any body.
    ///
    pub fn to_proper(&self) -> Grammar {
        let result = self.remove_epsilon_rules().remove_unit_rules().reduce();
        debug!(
            "proper form: {} rules -> {} rules",
            self.num_rules(),
            result.num_rules()
        );
        result
    }

    /// Check whether every nonterminal is generating and reachable
    pub fn is_reduced(&self) -> bool {
        let generating = self.generating_symbols();
        let reachable = self.reachable_symbols();
        self.nonterminals()
            .all(|n| generating.contains(&n.to_string()) && reachable.contains(&Token::nonterm(n)))
    }

    // Only the start symbol may have an ε-body, and then it doesn't occur in any body
    fn epsilon_only_at_start(&self) -> bool {
        self.rules()
            .all(|(head, body)| !body.is_empty() || (head == self.start() && !self.start_in_bodies()))
    }

    ///
    /// Check whether the grammar is proper
    /// - no unit productions
    /// - no ε-productions, except for the start symbol if it doesn't occur in any body
    /// - every nonterminal is generating and reachable, or the grammar has no
    ///   productions at all (empty language)
    ///
    pub fn is_proper(&self) -> bool {
        let no_unit = self
            .rules()
            .all(|(_, body)| !matches!(body.as_slice(), [Token::NonTerm(_)]));
        let useful = self.is_reduced() || (self.num_rules() == 0 && self.num_nonterminals() == 1);
        no_unit && self.epsilon_only_at_start() && useful
    }

    ///
    /// Chomsky normal form
    ///
    /// Starting from the proper form:
    /// - in every body of length 2 or more, every terminal a is replaced by a
    ///   nonterminal `[a]` with the production `[a] -> a`
    /// - every body X1 X2 ... Xn with n > 2 is replaced by X1 [X2...Xn], where
    ///   `[X2...Xn]` is a nonterminal for the suffix with production
    ///   `[X2...Xn] -> X2 [X3...Xn]`, down to suffixes of length 2
    ///
    /// Identical suffixes share the same nonterminal. Synthesized names get extra
    /// primes if they clash with existing nonterminals.
    ///
    pub fn to_cnf(&self) -> Grammar {
        let proper = self.to_proper();
        let mut builder = CnfBuilder {
            productions: proper.productions().clone(),
            proxies: HashMap::new(),
            suffixes: HashMap::new(),
        };
        for (head, body) in proper.rules() {
            if body.len() >= 2 {
                builder.remove_body(head, body);
                let tail = builder.suffix(&body[1..]);
                let first = builder.proxy(&body[0]);
                builder.add(head, vec![first, tail]);
            }
        }
        let result = Grammar::from_parts(
            proper.start().to_string(),
            proper.terminals().clone(),
            builder.productions,
        );
        debug!(
            "CNF: {} rules -> {} rules, {} nonterminals",
            self.num_rules(),
            result.num_rules(),
            result.num_nonterminals()
        );
        result
    }

    ///
    /// Check whether the grammar is in Chomsky normal form
    /// - every body is either a terminal or two nonterminals
    /// - the start symbol may have an ε-body if it doesn't occur in any body
    ///
    pub fn is_cnf(&self) -> bool {
        self.epsilon_only_at_start()
            && self.rules().all(|(_, body)| match body.as_slice() {
                [] => true,
                [Token::Term(_)] => true,
                [Token::NonTerm(_), Token::NonTerm(_)] => true,
                _ => false,
            })
    }
}

//
// Synthesized nonterminals for binarization
// - proxies: terminal a -> nonterminal [a]
// - suffixes: sequence of tokens (from the input bodies) -> nonterminal
//
#[derive(Debug)]
struct CnfBuilder {
    productions: IndexMap<String, OrderedSet<Body>>,
    proxies: HashMap<char, String>,
    suffixes: HashMap<Vec<Token>, String>,
}

impl CnfBuilder {
    fn fresh(&self, base: String) -> String {
        fresh_name(&base, |n| self.productions.contains_key(n))
    }

    fn add(&mut self, head: &str, body: Body) {
        self.productions.entry(head.to_string()).or_default().insert(body);
    }

    fn remove_body(&mut self, head: &str, body: &Body) {
        if let Some(bodies) = self.productions.get_mut(head) {
            bodies.retain(|b| b != body);
        }
    }

    // nonterminal that stands for t
    fn proxy(&mut self, t: &Token) -> Token {
        match t {
            Token::NonTerm(_) => t.clone(),
            Token::Term(c) => {
                if let Some(name) = self.proxies.get(c) {
                    return Token::NonTerm(name.clone());
                }
                let name = self.fresh(format!("[{c}]"));
                self.add(&name, vec![t.clone()]);
                self.proxies.insert(*c, name.clone());
                Token::NonTerm(name)
            }
        }
    }

    // nonterminal for a suffix of length >= 1
    fn suffix(&mut self, tokens: &[Token]) -> Token {
        if tokens.len() == 1 {
            return self.proxy(&tokens[0]);
        }
        if let Some(name) = self.suffixes.get(tokens) {
            return Token::NonTerm(name.clone());
        }
        let text: String = tokens
            .iter()
            .map(|t| match t {
                Token::Term(c) => c.to_string(),
                Token::NonTerm(n) => n.clone(),
            })
            .collect();
        let name = self.fresh(format!("[{text}]"));
        // reserve the name before recursing
        self.productions.insert(name.clone(), OrderedSet::new());
        self.suffixes.insert(tokens.to_vec(), name.clone());
        let tail = self.suffix(&tokens[1..]);
        let first = self.proxy(&tokens[0]);
        self.add(&name, vec![first, tail]);
        Token::NonTerm(name)
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

    fn same_language(g: &Grammar, h: &Grammar, chars: &str, n: usize) {
        for w in words(chars, n) {
            assert_eq!(g.accepts(&w), h.accepts(&w), "word {w:?}");
        }
    }

    fn names(set: &OrderedSet<String>) -> Vec<&str> {
        let mut v: Vec<&str> = set.iter().map(|s| s.as_str()).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_generating_and_reduce() {
        let g = Grammar::parse(
            "S",
            "abc",
            "S: aA | B | aD
             A: a | bA
             B: bB
             C: c
             D: aB",
        )
        .unwrap();
        println!("{g}");
        assert_eq!(names(&g.generating_symbols()), vec!["A", "C", "S"]);

        let r = g.reduce();
        println!("Reduced:\n{r}");
        assert_eq!(r.nonterminals().collect::<Vec<_>>(), vec!["S", "A"]);
        assert_eq!(r.terminals().iter().collect::<String>(), "ab");
        assert_eq!(r.num_rules(), 3);
        assert!(r.is_reduced());
        assert!(!g.is_reduced());
        same_language(&g, &r, "abc", 5);

        let empty = Grammar::parse("S", "a", "S: aS\nA: a").unwrap().reduce();
        println!("Empty language:\n{empty}");
        assert_eq!(empty.num_nonterminals(), 1);
        assert_eq!(empty.num_rules(), 0);
        assert!(empty.terminals().is_empty());

        let empty = Grammar::parse("S", "ab", "S: aSA\nA: b").unwrap().reduce();
        println!("Empty language:\n{empty}");
        assert_eq!(empty.nonterminals().collect::<Vec<_>>(), vec!["S"]);
        assert_eq!(empty.num_rules(), 0);
        assert!(empty.terminals().is_empty());
        assert!(!empty.accepts("ab"));
    }

    #[test]
    fn test_nullable_and_epsilon_removal() {
        let g = Grammar::parse(
            "S",
            "ab",
            "S: AB | aS
             A: aA | \u{03B5}
             B: bB | A",
        )
        .unwrap();
        assert_eq!(names(&g.nullable_symbols()), vec!["A", "B", "S"]);

        let h = g.remove_epsilon_rules();
        println!("Without ε-productions:\n{h}");
        assert_eq!(h.start(), "S'");
        assert_eq!(h.nonterminals().next(), Some("S'"));
        let s_bodies = h.bodies("S").unwrap();
        for body in ["AB", "A", "B", "aS", "a"] {
            let g1 = Grammar::parse("S", "ab", &format!("S: {body}\nA: a\nB: b")).unwrap();
            assert!(s_bodies.contains(g1.bodies("S").unwrap().first().unwrap()), "{body}");
        }
        assert_eq!(s_bodies.len(), 5);
        assert!(h.rules().all(|(head, body)| !body.is_empty() || head == "S'"));
        same_language(&g, &h, "ab", 6);
    }

    #[test]
    fn test_unit_rules() {
        let g = Grammar::parse(
            "E",
            "x+*()",
            "E: E+T | T
             T: T*F | F
             F: (E) | x",
        )
        .unwrap();
        assert_eq!(names(&g.unit_closure("E")), vec!["E", "F", "T"]);
        assert_eq!(names(&g.unit_closure("F")), vec!["F"]);

        let h = g.remove_unit_rules();
        println!("Without unit productions:\n{h}");
        assert_eq!(h.bodies("E").unwrap().len(), 4);
        assert_eq!(h.bodies("T").unwrap().len(), 3);
        assert_eq!(h.bodies("F").unwrap().len(), 2);
        assert!(h.is_proper());
        assert!(!g.is_proper());
        same_language(&g, &h, "x+*()", 5);
    }

    #[test]
    fn test_proper_form() {
        let g = Grammar::parse(
            "S",
            "ab",
            "S: aSb | SS | \u{03B5}
             A: a",
        )
        .unwrap();
        let p = g.to_proper();
        println!("Proper form:\n{p}");
        assert!(p.is_proper());
        assert!(p.accepts(""));
        assert!(!p.start_in_bodies());
        assert!(p.bodies("A").is_none());
        same_language(&g, &p, "ab", 6);
    }

    #[test]
    fn test_cnf() {
        let g = Grammar::parse(
            "S",
            "ab",
            "S: aSb | ab | aabb
             <Long>: aaa",
        )
        .unwrap();
        let cnf = g.to_cnf();
        println!("CNF:\n{cnf}");
        assert!(cnf.is_cnf());
        assert!(!g.is_cnf());
        assert!(cnf.is_nonterminal("[a]"));
        assert!(cnf.is_nonterminal("[b]"));
        assert!(cnf.is_nonterminal("[Sb]"));
        // [abb] -> [a][bb] and [bb] -> [b][b]
        assert!(cnf.is_nonterminal("[abb]"));
        assert!(cnf.is_nonterminal("[bb]"));
        assert!(!cnf.is_nonterminal("Long"));
        same_language(&g, &cnf, "ab", 8);

        // ε in the language
        let g = Grammar::parse("S", "ab", "S: aSbS | \u{03B5}").unwrap();
        let cnf = g.to_cnf();
        println!("CNF:\n{cnf}");
        assert!(cnf.is_cnf());
        same_language(&g, &cnf, "ab", 6);
    }

    #[test]
    fn test_cnf_name_clash() {
        let g = Grammar::parse("S", "ab", "S: aS | b\n<[a]>: b").unwrap();
        let cnf = g.to_cnf();
        println!("CNF:\n{cnf}");
        assert!(cnf.is_cnf());
        // [a] is unreachable and removed by the reduction, so the name is free
        assert!(cnf.is_nonterminal("[a]"));
        same_language(&g, &cnf, "ab", 5);

        let g = Grammar::parse("S", "ab", "S: aS | b<[a]>\n<[a]>: b").unwrap();
        let cnf = g.to_cnf();
        println!("CNF:\n{cnf}");
        assert!(cnf.is_nonterminal("[a]'"));
        assert_eq!(cnf.bodies("[a]").map(|b| b.len()), Some(1));
        same_language(&g, &cnf, "ab", 5);
    }
}
