// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//
// Property tests on random automata, regular expressions, and grammars.
// Languages are compared on all words over {a, b} up to a bounded length.
//

use proptest::{collection, option, prelude::*};

use crate::{
    automata::{AutomatonBuilder, Dfa},
    grammars::{Grammar, GrammarBuilder, Token},
    nfa::Nfa,
    regular_expressions::Regex,
};

fn words(n: usize) -> Vec<String> {
    let mut result = vec![String::new()];
    let mut last = vec![String::new()];
    for _ in 0..n {
        last = last
            .iter()
            .flat_map(|w| ["a", "b"].map(|c| format!("{w}{c}")))
            .collect();
        result.extend(last.iter().cloned());
    }
    result
}

fn arb_dfa() -> impl Strategy<Value = Dfa> {
    (1usize..7)
        .prop_flat_map(|n| {
            (
                Just(n),
                collection::vec(option::of(0..n), 2 * n),
                collection::vec(any::<bool>(), n),
            )
        })
        .prop_map(|(n, successors, finals)| {
            let mut builder = AutomatonBuilder::new("ab".chars());
            builder.states(0..n).initial_state(0);
            for (i, &f) in finals.iter().enumerate() {
                if f {
                    builder.mark_final(i);
                }
            }
            for (k, target) in successors.iter().enumerate() {
                if let Some(j) = target {
                    let c = if k % 2 == 0 { 'a' } else { 'b' };
                    builder.add_transition(k / 2, c, *j);
                }
            }
            builder.build_dfa().unwrap()
        })
}

// symbol 2 is ε when allowed
fn arb_nfa(with_epsilon: bool) -> impl Strategy<Value = Nfa> {
    let symbols = if with_epsilon { 3 } else { 2 };
    (1usize..6)
        .prop_flat_map(move |n| {
            (
                Just(n),
                collection::vec((0..n, 0..symbols, 0..n), 0..10),
                collection::vec(any::<bool>(), n),
                collection::vec(any::<bool>(), n),
            )
        })
        .prop_map(|(n, edges, initial, finals)| {
            let mut builder = AutomatonBuilder::new("ab".chars());
            builder.states(0..n).initial_state(0);
            for i in 0..n {
                if i > 0 && initial[i] {
                    builder.initial_state(i);
                }
                if finals[i] {
                    builder.mark_final(i);
                }
            }
            for (i, symbol, j) in edges {
                match symbol {
                    0 => builder.add_transition(i, 'a', j),
                    1 => builder.add_transition(i, 'b', j),
                    _ => builder.add_epsilon_transition(i, j),
                };
            }
            builder.build_nfa().unwrap()
        })
}

fn arb_regex() -> impl Strategy<Value = Regex> {
    let leaf = prop_oneof![
        Just(Regex::Epsilon),
        Just(Regex::Literal('a')),
        Just(Regex::Literal('b')),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(r, s)| Regex::alt(r, s)),
            (inner.clone(), inner.clone()).prop_map(|(r, s)| Regex::concat(r, s)),
            inner.prop_map(Regex::star),
        ]
    })
}

// direct definition of the language of a regular expression
fn reference_match(r: &Regex, w: &[char]) -> bool {
    match r {
        Regex::Epsilon => w.is_empty(),
        Regex::Literal(c) => w.len() == 1 && w[0] == *c,
        Regex::Alternation(r, s) => reference_match(r, w) || reference_match(s, w),
        Regex::Concatenation(r, s) => {
            (0..=w.len()).any(|k| reference_match(r, &w[..k]) && reference_match(s, &w[k..]))
        }
        Regex::Star(inner) => {
            w.is_empty()
                || (1..=w.len()).any(|k| reference_match(inner, &w[..k]) && reference_match(r, &w[k..]))
        }
    }
}

const NAMES: [&str; 3] = ["S", "A", "B"];

fn arb_token() -> impl Strategy<Value = Token> {
    prop_oneof![
        prop_oneof![Just('a'), Just('b')].prop_map(Token::Term),
        (0..NAMES.len()).prop_map(|i| Token::nonterm(NAMES[i])),
    ]
}

fn arb_grammar() -> impl Strategy<Value = Grammar> {
    collection::vec((0..NAMES.len(), collection::vec(arb_token(), 0..4)), 0..8).prop_map(|rules| {
        let mut builder = GrammarBuilder::new("S");
        builder.terminals("ab".chars()).nonterminal("A").nonterminal("B");
        for (head, body) in rules {
            builder.production(NAMES[head], body);
        }
        builder.build().unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn minimization_is_idempotent(dfa in arb_dfa()) {
        let m = dfa.minimize();
        prop_assert_eq!(&m.minimize(), &m);
        prop_assert!(m.num_states() <= dfa.complete().remove_unreachable_states().num_states());
        prop_assert!(dfa.equivalent(&m));
        for w in words(6) {
            prop_assert_eq!(dfa.accepts(&w), m.accepts(&w), "word {:?}", w);
        }
    }

    #[test]
    fn determinization_preserves_language(nfa in arb_nfa(false)) {
        let dfa = nfa.to_dfa();
        for w in words(6) {
            prop_assert_eq!(nfa.accepts(&w), dfa.accepts(&w), "word {:?}", w);
        }
    }

    #[test]
    fn epsilon_removal_preserves_language(efa in arb_nfa(true)) {
        let direct = efa.to_dfa();
        let nfa = efa.remove_epsilon();
        prop_assert!(!nfa.has_epsilon_moves());
        let indirect = nfa.to_dfa();
        for w in words(6) {
            prop_assert_eq!(direct.accepts(&w), indirect.accepts(&w), "word {:?}", w);
            prop_assert_eq!(efa.accepts(&w), direct.accepts(&w), "word {:?}", w);
        }
        prop_assert!(direct.equivalent(&indirect));
    }

    #[test]
    fn regex_compilation(r in arb_regex()) {
        prop_assert_eq!(&Regex::parse(&r.to_string()).unwrap(), &r);
        let nfa = r.compile();
        let dfa = r.to_dfa();
        for w in words(5) {
            let chars: Vec<char> = w.chars().collect();
            let expected = reference_match(&r, &chars);
            prop_assert_eq!(nfa.accepts(&w), expected, "{} on {:?}", r, w);
            prop_assert_eq!(dfa.accepts(&w), expected, "{} on {:?}", r, w);
        }
    }

    #[test]
    fn proper_form_preserves_language(g in arb_grammar()) {
        let p = g.to_proper();
        prop_assert!(p.is_proper(), "{}", p);
        for w in words(5) {
            prop_assert_eq!(g.accepts(&w), p.accepts(&w), "word {:?}", w);
        }
    }

    #[test]
    fn cnf_preserves_language(g in arb_grammar()) {
        let cnf = g.to_cnf();
        prop_assert!(cnf.is_cnf(), "{}", cnf);
        for w in words(5) {
            prop_assert_eq!(g.accepts(&w), cnf.accepts(&w), "word {:?}", w);
        }
    }

    #[test]
    fn left_recursion_removal_preserves_language(g in arb_grammar()) {
        let h = g.remove_left_recursion();
        prop_assert!(!h.is_left_recursive(), "{}", h);
        for w in words(5) {
            prop_assert_eq!(g.accepts(&w), h.accepts(&w), "word {:?}", w);
        }
    }

    #[test]
    fn gnf_preserves_language(g in arb_grammar()) {
        let h = g.to_gnf();
        prop_assert!(h.is_gnf(), "{}", h);
        for w in words(5) {
            prop_assert_eq!(g.accepts(&w), h.accepts(&w), "word {:?}", w);
        }
    }

    #[test]
    fn pushdown_recognizers(g in arb_grammar()) {
        let top_down = g.to_top_down_pda();
        let bottom_up = g.to_bottom_up_pda();
        for w in words(4) {
            let expected = g.accepts(&w);
            prop_assert_eq!(top_down.accepts(&w), expected, "top-down on {:?}", w);
            prop_assert_eq!(bottom_up.accepts(&w), expected, "bottom-up on {:?}", w);
        }
    }
}
