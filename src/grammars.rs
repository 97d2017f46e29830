// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Context-free grammars
//!
//! A grammar is a tuple (N, Σ, P, S) where N is a set of nonterminals (named by
//! strings), Σ is a set of terminals (characters), S in N is the start symbol, and
//! P maps every nonterminal to a set of bodies. A body is a sequence of [Token]s;
//! the empty body is ε.
//!
//! Grammars are written in rule text, one rule per line:
//!
//! ```text
//!   S: aSb | <Rest> | ε
//!   <Rest>: c<Rest> | c
//! ```
//!
//! In a body, a character that's the name of a single-character nonterminal denotes
//! that nonterminal. Any other character must be a terminal. Nonterminals with longer
//! names are written between angle brackets. The character `ε` alone denotes the
//! empty body. Whitespace is ignored.
//!
//! The transformations (normal forms, left-recursion removal, conversions to automata)
//! are implemented in other modules. They all return new grammars.
//!

use std::fmt::Display;

use indexmap::IndexMap;

use crate::{alphabet::{Alphabet, EPSILON}, errors::Error, ordered_sets::OrderedSet};

///
/// Element of a production body
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
    /// Terminal
    Term(char),
    /// Nonterminal
    NonTerm(String),
}

impl Token {
    /// Nonterminal from a name
    pub fn nonterm(name: &str) -> Self {
        Token::NonTerm(name.to_string())
    }

    /// Check whether this is a terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Token::Term(_))
    }

    /// Check whether this is the nonterminal of the given name
    pub fn is_nonterminal(&self, name: &str) -> bool {
        matches!(self, Token::NonTerm(n) if n == name)
    }
}

/// Write a nonterminal name in rule-text notation
pub(crate) fn write_name(f: &mut std::fmt::Formatter<'_>, name: &str) -> std::fmt::Result {
    if name.chars().count() == 1 {
        write!(f, "{name}")
    } else {
        write!(f, "<{name}>")
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Term(c) => c.fmt(f),
            Token::NonTerm(name) => write_name(f, name),
        }
    }
}

/// Production body
pub type Body = Vec<Token>;

/// Body in rule-text notation (ε for the empty body)
pub fn format_body(body: &[Token]) -> String {
    if body.is_empty() {
        EPSILON.to_string()
    } else {
        body.iter().map(|t| t.to_string()).collect()
    }
}

///
/// Check whether a string can be used as a nonterminal name
/// - it must be non-empty
/// - it can't contain whitespace, `ε`, or any of the characters `<`, `>`, `|`, `:`
///
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '<' | '>' | '|' | ':' | EPSILON))
}

///
/// Fresh name derived from base
/// - add primes to base until in_use returns false
///
pub(crate) fn fresh_name(base: &str, in_use: impl Fn(&str) -> bool) -> String {
    let mut name = base.to_string();
    while in_use(&name) {
        name.push('\'');
    }
    name
}

///
/// Context-free grammar
///
/// Every nonterminal has an entry in the production map (possibly with no bodies).
/// The start symbol is always a nonterminal. Equality ignores the order of
/// nonterminals, terminals, and bodies.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    start: String,
    terminals: OrderedSet<char>,
    productions: IndexMap<String, OrderedSet<Body>>,
}

impl Grammar {
    pub(crate) fn from_parts(
        start: String,
        terminals: OrderedSet<char>,
        productions: IndexMap<String, OrderedSet<Body>>,
    ) -> Self {
        debug_assert!(productions.contains_key(&start));
        debug_assert!(productions.values().flatten().flatten().all(|t| match t {
            Token::Term(c) => terminals.contains(c),
            Token::NonTerm(n) => productions.contains_key(n),
        }));
        Grammar {
            start,
            terminals,
            productions,
        }
    }

    ///
    /// Parse a grammar in rule text
    /// - start = name of the start symbol
    /// - terminals = all the terminals
    /// - rules = one rule per line (empty lines are ignored)
    ///
    /// The nonterminals are the start symbol and the heads of all the rules.
    ///
    /// # Example
    ///
    /// ```
    /// use formal_langs::grammars::Grammar;
    ///
    /// let g = Grammar::parse("S", "ab", "S: aSb | ε").unwrap();
    /// assert!(g.accepts("aabb"));
    /// assert!(!g.accepts("aab"));
    /// ```
    pub fn parse(start: &str, terminals: &str, rules: &str) -> Result<Grammar, Error> {
        GrammarBuilder::new(start)
            .terminals(terminals.chars())
            .rules(rules)
            .build()
    }

    /// Start symbol
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Terminals
    pub fn terminals(&self) -> &OrderedSet<char> {
        &self.terminals
    }

    /// Terminals as an alphabet
    pub fn alphabet(&self) -> Alphabet {
        Alphabet::from_set(self.terminals.clone())
    }

    /// Iterator over the nonterminals
    pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
        self.productions.keys().map(|n| n.as_str())
    }

    /// Number of nonterminals
    pub fn num_nonterminals(&self) -> usize {
        self.productions.len()
    }

    /// Check whether name is a nonterminal
    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.productions.contains_key(name)
    }

    /// Check whether c is a terminal
    pub fn is_terminal(&self, c: char) -> bool {
        self.terminals.contains(&c)
    }

    ///
    /// Bodies of the productions of a nonterminal
    /// - return None if name is not a nonterminal
    ///
    pub fn bodies(&self, name: &str) -> Option<&OrderedSet<Body>> {
        self.productions.get(name)
    }

    /// Iterator over all productions as pairs (head, body)
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Body)> {
        self.productions
            .iter()
            .flat_map(|(head, bodies)| bodies.iter().map(move |b| (head.as_str(), b)))
    }

    /// Number of productions
    pub fn num_rules(&self) -> usize {
        self.productions.values().map(|b| b.len()).sum()
    }

    pub(crate) fn productions(&self) -> &IndexMap<String, OrderedSet<Body>> {
        &self.productions
    }

    /// Name derived from base that's not a nonterminal of this grammar
    pub fn fresh_nonterminal(&self, base: &str) -> String {
        fresh_name(base, |n| self.is_nonterminal(n))
    }

    /// Check whether the start symbol occurs in a production body
    pub fn start_in_bodies(&self) -> bool {
        self.rules()
            .any(|(_, body)| body.iter().any(|t| t.is_nonterminal(&self.start)))
    }

    ///
    /// Check whether the grammar generates a word
    ///
    /// This works for any grammar, including grammars with ε-productions, unit
    /// productions, and cycles. The recognizer computes, for every substring w[i..j]
    /// of the word, the set of nonterminals that derive w[i..j], as the least
    /// fixpoint of the productions.
    ///
    pub fn accepts(&self, word: &str) -> bool {
        let w: Vec<char> = word.chars().collect();
        if w.iter().any(|c| !self.terminals.contains(c)) {
            return false;
        }
        let n = w.len();
        let m = self.productions.len();
        let Some(start) = self.productions.get_index_of(&self.start) else {
            return false;
        };

        // derives[index(i, j, a)] iff nonterminal a derives w[i..j]
        let index = |i: usize, j: usize, a: usize| (i * (n + 1) + j) * m + a;
        let mut derives = vec![false; (n + 1) * (n + 1) * m];
        loop {
            let mut changed = false;
            for (a, bodies) in self.productions.values().enumerate() {
                for body in bodies {
                    for i in 0..=n {
                        // positions k such that a prefix of body derives w[i..k]
                        let mut ends = vec![i];
                        for t in body {
                            let mut next = Vec::new();
                            for &p in &ends {
                                match t {
                                    Token::Term(c) => {
                                        if p < n && w[p] == *c {
                                            next.push(p + 1);
                                        }
                                    }
                                    Token::NonTerm(b) => {
                                        if let Some(b) = self.productions.get_index_of(b) {
                                            next.extend((p..=n).filter(|&q| derives[index(p, q, b)]));
                                        }
                                    }
                                }
                            }
                            next.sort_unstable();
                            next.dedup();
                            ends = next;
                            if ends.is_empty() {
                                break;
                            }
                        }
                        for j in ends {
                            if !derives[index(i, j, a)] {
                                derives[index(i, j, a)] = true;
                                changed = true;
                            }
                        }
                    }
                }
            }
            if !changed {
                return derives[index(0, n, start)];
            }
        }
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (head, bodies) in &self.productions {
            write_name(f, head)?;
            write!(f, ":")?;
            for (i, body) in bodies.iter().enumerate() {
                if i > 0 {
                    write!(f, " |")?;
                }
                write!(f, " {}", format_body(body))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

///
/// Grammar builder
///
/// Nonterminals are declared explicitly, or implicitly as the start symbol or the
/// head of a rule. Productions are given either in rule text or as token sequences.
/// Nothing is checked until [build](Self::build) is called.
///
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    start: String,
    terminals: Vec<char>,
    nonterminals: Vec<String>,
    rules: Vec<String>,
    productions: Vec<(String, Body)>,
}

// strip optional angle brackets around a name
fn strip_brackets(name: &str) -> &str {
    name.strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(name)
}

impl GrammarBuilder {
    /// New builder with the given start symbol
    pub fn new(start: impl ToString) -> Self {
        GrammarBuilder {
            start: start.to_string(),
            ..Default::default()
        }
    }

    /// Declare terminals
    pub fn terminals(&mut self, terminals: impl IntoIterator<Item = char>) -> &mut Self {
        self.terminals.extend(terminals);
        self
    }

    /// Declare a nonterminal
    pub fn nonterminal(&mut self, name: impl ToString) -> &mut Self {
        self.nonterminals.push(name.to_string());
        self
    }

    /// Add a rule in rule text `head: body | ... | body`
    pub fn rule(&mut self, text: &str) -> &mut Self {
        self.rules.push(text.to_string());
        self
    }

    /// Add several rules, one per line (empty lines are ignored)
    pub fn rules(&mut self, text: &str) -> &mut Self {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            self.rule(line);
        }
        self
    }

    /// Add a production
    pub fn production(&mut self, head: impl ToString, body: Body) -> &mut Self {
        self.productions.push((head.to_string(), body));
        self
    }

    fn parse_body(
        rule: &str,
        text: &str,
        productions: &IndexMap<String, OrderedSet<Body>>,
        terminals: &Alphabet,
    ) -> Result<Body, Error> {
        let mut body = Vec::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c.is_whitespace() || c == EPSILON {
                continue;
            }
            if c == '<' {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('>') => break,
                        Some(x) => name.push(x),
                        None => return Err(Error::InvalidRule(rule.to_string())),
                    }
                }
                if !productions.contains_key(&name) {
                    return Err(Error::UnknownNonTerminal(name));
                }
                body.push(Token::NonTerm(name));
            } else {
                let name = c.to_string();
                if productions.contains_key(&name) {
                    body.push(Token::NonTerm(name));
                } else if terminals.contains(c) {
                    body.push(Token::Term(c));
                } else {
                    return Err(Error::UnknownSymbol(c));
                }
            }
        }
        Ok(body)
    }

    ///
    /// Construct the grammar
    ///
    /// # Errors
    ///
    /// - the terminals contain a duplicate, ε, whitespace, or one of `<`, `>`, `|`
    /// - a nonterminal name is invalid (see [is_valid_name])
    /// - a single-character nonterminal is also a terminal
    /// - a rule is not of the form `head: body | ... | body`, or has an empty alternative
    /// - a body uses an unknown terminal or nonterminal
    ///
    pub fn build(&self) -> Result<Grammar, Error> {
        let terminals = Alphabet::new(self.terminals.iter().copied())?;
        if let Some(c) = terminals.chars().find(|&c| c.is_whitespace() || matches!(c, '<' | '>' | '|')) {
            return Err(Error::MalformedAlphabet(c));
        }

        let mut split_rules = Vec::with_capacity(self.rules.len());
        for text in &self.rules {
            let (head, rhs) = text
                .split_once(':')
                .ok_or_else(|| Error::InvalidRule(text.clone()))?;
            let head = strip_brackets(head.trim());
            if head.is_empty() {
                return Err(Error::InvalidRule(text.clone()));
            }
            split_rules.push((text, head, rhs));
        }

        let names = std::iter::once(self.start.as_str())
            .chain(self.nonterminals.iter().map(|n| n.as_str()))
            .chain(split_rules.iter().map(|(_, head, _)| *head))
            .chain(self.productions.iter().map(|(head, _)| head.as_str()));
        let mut productions: IndexMap<String, OrderedSet<Body>> = IndexMap::new();
        for name in names {
            if !is_valid_name(name) {
                return Err(Error::InvalidName(name.to_string()));
            }
            let mut chars = name.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if terminals.contains(c) {
                    return Err(Error::MalformedAlphabet(c));
                }
            }
            productions.entry(name.to_string()).or_default();
        }

        let mut new_bodies = Vec::new();
        for (text, head, rhs) in split_rules {
            if rhs.trim().is_empty() {
                continue;
            }
            for alternative in rhs.split('|') {
                if alternative.trim().is_empty() {
                    return Err(Error::InvalidRule(text.clone()));
                }
                let body = Self::parse_body(text, alternative, &productions, &terminals)?;
                new_bodies.push((head.to_string(), body));
            }
        }
        for (head, body) in &self.productions {
            for t in body {
                match t {
                    Token::Term(c) if !terminals.contains(*c) => return Err(Error::UnknownSymbol(*c)),
                    Token::NonTerm(n) if !productions.contains_key(n) => {
                        return Err(Error::UnknownNonTerminal(n.clone()))
                    }
                    _ => {}
                }
            }
            new_bodies.push((head.clone(), body.clone()));
        }
        for (head, body) in new_bodies {
            productions.entry(head).or_default().insert(body);
        }

        Ok(Grammar::from_parts(
            self.start.clone(),
            terminals.chars().collect(),
            productions,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn terminals_of(g: &Grammar) -> String {
        g.terminals().iter().collect()
    }

    #[test]
    fn test_parse() {
        let g = Grammar::parse(
            "S",
            "ab+",
            "S: aSb | <Plus> | \u{03B5}
             <Plus>: + | +<Plus>",
        )
        .unwrap();
        println!("{g}");
        assert_eq!(g.start(), "S");
        assert_eq!(g.nonterminals().collect::<Vec<_>>(), vec!["S", "Plus"]);
        assert_eq!(g.num_rules(), 5);
        let s_bodies = g.bodies("S").unwrap();
        assert!(s_bodies.contains(&vec![Token::Term('a'), Token::nonterm("S"), Token::Term('b')]));
        assert!(s_bodies.contains(&vec![]));
        assert!(g.start_in_bodies());
        assert_eq!(g.bodies("T"), None);
    }

    #[test]
    fn test_round_trip() {
        let g = Grammar::parse(
            "S",
            "abc",
            "S: aA | bC | a | \u{03B5}
             A: bB | aA | b | c
             B: aB | bC | aC | cA | c
             C: a | b | aA | bB
             <Extra>:",
        )
        .unwrap();
        let text = g.to_string();
        println!("{text}");
        let h = Grammar::parse(g.start(), &terminals_of(&g), &text).unwrap();
        assert_eq!(g, h);
        assert_eq!(h.bodies("Extra").map(|b| b.len()), Some(0));

        // every built grammar prints as rule text that parses back to itself
        let g = GrammarBuilder::new("S")
            .terminals("a:(".chars())
            .production("S", vec![Token::Term('a'), Token::Term(':'), Token::Term('a')])
            .production("S", vec![Token::Term('('), Token::nonterm("S")])
            .build()
            .unwrap();
        let text = g.to_string();
        println!("{text}");
        assert_eq!(Grammar::parse("S", "a:(", &text).unwrap(), g);

        // alternatives form a set
        let g1 = Grammar::parse("S", "ab", "S: a | b | a").unwrap();
        let g2 = Grammar::parse("S", "ab", "S: b | a").unwrap();
        assert_eq!(g1, g2);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Grammar::parse("S", "ab", "S aS"),
            Err(Error::InvalidRule("S aS".to_string()))
        );
        assert_eq!(
            Grammar::parse("S", "ab", "S: a | | b"),
            Err(Error::InvalidRule("S: a | | b".to_string()))
        );
        assert_eq!(Grammar::parse("S", "ab", "S: aX"), Err(Error::UnknownSymbol('X')));
        assert_eq!(
            Grammar::parse("S", "ab", "S: a<Rest>"),
            Err(Error::UnknownNonTerminal("Rest".to_string()))
        );
        assert_eq!(
            Grammar::parse("S", "ab", "S: a<Rest"),
            Err(Error::InvalidRule("S: a<Rest".to_string()))
        );
        assert_eq!(Grammar::parse("a", "ab", "a: b"), Err(Error::MalformedAlphabet('a')));
        assert_eq!(Grammar::parse("S", "aa", "S: a"), Err(Error::DuplicateSymbol('a')));
        assert_eq!(
            Grammar::parse("S", "a", "S: a\n<A B>: a"),
            Err(Error::InvalidName("A B".to_string()))
        );

        let result = GrammarBuilder::new("S")
            .terminals("a".chars())
            .production("S", vec![Token::nonterm("T")])
            .build();
        assert_eq!(result, Err(Error::UnknownNonTerminal("T".to_string())));

        // characters of the rule-text notation can't be terminals
        for c in ['|', '<', '>', ' '] {
            let result = GrammarBuilder::new("S")
                .terminals(['a', c])
                .production("S", vec![Token::Term('a'), Token::Term(c), Token::Term('a')])
                .build();
            assert_eq!(result, Err(Error::MalformedAlphabet(c)));
        }
    }

    #[test]
    fn test_builder() {
        let g = GrammarBuilder::new("Expr")
            .terminals("x+".chars())
            .nonterminal("Term")
            .production("Expr", vec![Token::nonterm("Term")])
            .production(
                "Expr",
                vec![Token::nonterm("Expr"), Token::Term('+'), Token::nonterm("Term")],
            )
            .production("Term", vec![Token::Term('x')])
            .build()
            .unwrap();
        println!("{g}");
        assert_eq!(g.to_string(), "<Expr>: <Term> | <Expr>+<Term>\n<Term>: x\n");
        assert!(g.accepts("x+x+x"));
        assert!(!g.accepts("x+"));
        assert_eq!(g.fresh_nonterminal("Expr"), "Expr'");
        assert_eq!(g.fresh_nonterminal("E"), "E");
    }

    #[test]
    fn test_accepts() {
        // balanced parentheses, with ε and unit productions
        let g = Grammar::parse("S", "()", "S: A | SS | \u{03B5}\nA: (S)").unwrap();
        for w in ["", "()", "(())", "()()", "(()())"] {
            assert!(g.accepts(w), "{w}");
        }
        for w in ["(", ")(", "(()", "x"] {
            assert!(!g.accepts(w), "{w}");
        }

        // cycles through unit productions
        let g = Grammar::parse("S", "a", "S: A | a\nA: S").unwrap();
        assert!(g.accepts("a"));
        assert!(!g.accepts("aa"));

        // empty language
        let g = Grammar::parse("S", "a", "S: aS").unwrap();
        assert!(!g.accepts(""));
        assert!(!g.accepts("a"));
    }
}
