// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Parser for regular expressions
//!
//! The syntax is the classic textbook notation, from lowest to highest precedence:
//! - alternation `r + s`
//! - concatenation `r . s` (the dot is required)
//! - Kleene star `r*`
//! - grouping `( r )`, the empty word `ε`, and literal characters
//!
//! ```text
//!   expression := term [ '+' expression ]
//!   term       := factor [ '.' term ]
//!   factor     := primary { '*' }
//!   primary    := '(' expression ')' | 'ε' | literal
//! ```
//!
//! Whitespace is ignored. Every other character is a literal.
//!
//! The recursive-descent parser produces the expression in postfix form. Function
//! [Regex::parse](crate::regular_expressions::Regex::parse) folds the postfix form into
//! a syntax tree.
//!

use std::fmt::Display;

use crate::{alphabet::EPSILON, errors::Error};

///
/// Element of a regular expression in postfix form
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixToken {
    /// The empty word
    Epsilon,
    /// A character
    Literal(char),
    /// Alternation of the two previous operands
    Alternation,
    /// Concatenation of the two previous operands
    Concatenation,
    /// Star of the previous operand
    Star,
}

impl Display for PostfixToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostfixToken::Epsilon => EPSILON.fmt(f),
            PostfixToken::Literal(c) => c.fmt(f),
            PostfixToken::Alternation => '+'.fmt(f),
            PostfixToken::Concatenation => '.'.fmt(f),
            PostfixToken::Star => '*'.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    LeftParen,
    RightParen,
    Plus,
    Dot,
    Star,
    Epsilon,
    Literal(char),
}

impl Token {
    fn from_char(c: char) -> Self {
        match c {
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '+' => Token::Plus,
            '.' => Token::Dot,
            '*' => Token::Star,
            EPSILON => Token::Epsilon,
            c => Token::Literal(c),
        }
    }
}

#[derive(Debug)]
struct Parser {
    // tokens with their position in the input
    tokens: Vec<(usize, Token)>,
    // index of the next token
    next: usize,
    // position of the end of input
    end: usize,
    output: Vec<PostfixToken>,
}

impl Parser {
    fn new(text: &str) -> Self {
        let tokens = text
            .chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .map(|(i, c)| (i, Token::from_char(c)))
            .collect();
        Parser {
            tokens,
            next: 0,
            end: text.chars().count(),
            output: Vec::new(),
        }
    }

    fn peek(&self) -> Option<(usize, Token)> {
        self.tokens.get(self.next).copied()
    }

    // consume the next token if it's equal to t
    fn eat(&mut self, t: Token) -> bool {
        match self.peek() {
            Some((_, x)) if x == t => {
                self.next += 1;
                true
            }
            _ => false,
        }
    }

    // error for the next token (or end of input)
    fn unexpected(&self) -> Error {
        match self.peek() {
            Some((position, Token::RightParen)) => Error::UnbalancedParentheses { position },
            Some((position, t)) => Error::UnexpectedToken {
                position,
                found: t.to_string(),
            },
            None => Error::UnexpectedToken {
                position: self.end,
                found: "end of input".to_string(),
            },
        }
    }

    fn expression(&mut self) -> Result<(), Error> {
        self.term()?;
        if self.eat(Token::Plus) {
            self.expression()?;
            self.output.push(PostfixToken::Alternation);
        }
        Ok(())
    }

    fn term(&mut self) -> Result<(), Error> {
        self.factor()?;
        if self.eat(Token::Dot) {
            self.term()?;
            self.output.push(PostfixToken::Concatenation);
        }
        Ok(())
    }

    fn factor(&mut self) -> Result<(), Error> {
        self.primary()?;
        while self.eat(Token::Star) {
            self.output.push(PostfixToken::Star);
        }
        Ok(())
    }

    fn primary(&mut self) -> Result<(), Error> {
        match self.peek() {
            Some((position, Token::LeftParen)) => {
                self.next += 1;
                self.expression()?;
                if !self.eat(Token::RightParen) {
                    return match self.peek() {
                        None => Err(Error::UnbalancedParentheses { position }),
                        Some(_) => Err(self.unexpected()),
                    };
                }
                Ok(())
            }
            Some((_, Token::Epsilon)) => {
                self.next += 1;
                self.output.push(PostfixToken::Epsilon);
                Ok(())
            }
            Some((_, Token::Literal(c))) => {
                self.next += 1;
                self.output.push(PostfixToken::Literal(c));
                Ok(())
            }
            Some((position, t)) => Err(Error::UnexpectedToken {
                position,
                found: t.to_string(),
            }),
            None => Err(self.unexpected()),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::LeftParen => '('.fmt(f),
            Token::RightParen => ')'.fmt(f),
            Token::Plus => '+'.fmt(f),
            Token::Dot => '.'.fmt(f),
            Token::Star => '*'.fmt(f),
            Token::Epsilon => EPSILON.fmt(f),
            Token::Literal(c) => c.fmt(f),
        }
    }
}

///
/// Convert a regular expression to postfix form
///
/// # Errors
///
/// - [Error::UnbalancedParentheses] if a `(` is not closed or a `)` is not opened
/// - [Error::UnexpectedToken] for any other syntax error, including an empty expression
///
/// # Example
///
/// ```
/// use formal_langs::regex_parser::{to_postfix, PostfixToken::*};
///
/// let postfix = to_postfix("a.(b+c)*").unwrap();
/// assert_eq!(
///     postfix,
///     vec![Literal('a'), Literal('b'), Literal('c'), Alternation, Star, Concatenation]
/// );
/// ```
pub fn to_postfix(text: &str) -> Result<Vec<PostfixToken>, Error> {
    let mut parser = Parser::new(text);
    parser.expression()?;
    if parser.peek().is_some() {
        return Err(parser.unexpected());
    }
    Ok(parser.output)
}

#[cfg(test)]
mod test {
    use super::{PostfixToken::*, *};

    fn postfix_string(text: &str) -> String {
        to_postfix(text).unwrap().iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_postfix() {
        assert_eq!(postfix_string("a"), "a");
        assert_eq!(postfix_string("a+b.c"), "abc.+");
        assert_eq!(postfix_string("(a+b).c"), "ab+c.");
        assert_eq!(postfix_string("a.b*"), "ab*.");
        assert_eq!(postfix_string("a**"), "a**");
        assert_eq!(postfix_string("a.((a+b)*+c).d"), "aab+*c+d..");
        assert_eq!(postfix_string(" a + \u{03B5} "), "a\u{03B5}+");
        assert_eq!(to_postfix("\u{03B5}").unwrap(), vec![Epsilon]);
    }

    #[test]
    fn test_syntax_errors() {
        let errors = ["", "a+", "(a.b", "a.b)", "*a", "a.+b", "ab", "()"];
        for text in errors {
            let result = to_postfix(text);
            println!("{text:?}: {result:?}");
            assert!(result.is_err());
        }

        assert_eq!(
            to_postfix(""),
            Err(Error::UnexpectedToken {
                position: 0,
                found: "end of input".to_string()
            })
        );
        assert_eq!(to_postfix("(a.b"), Err(Error::UnbalancedParentheses { position: 0 }));
        assert_eq!(to_postfix("a.b)"), Err(Error::UnbalancedParentheses { position: 3 }));
        assert_eq!(
            to_postfix("a.+b"),
            Err(Error::UnexpectedToken {
                position: 2,
                found: "+".to_string()
            })
        );
        assert_eq!(
            to_postfix("ab"),
            Err(Error::UnexpectedToken {
                position: 1,
                found: "b".to_string()
            })
        );
    }
}
