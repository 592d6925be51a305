//! Longest-match tokenizer over a grammar's terminals.
//!
//! The tokenizer knows nothing about the grammar structure; it greedily
//! matches the longest terminal spelling at the current position. Input
//! is preprocessed by dropping `//` comment lines and joining the
//! remaining lines.

use crate::grammar::Terminal;
use log::warn;

/// A matched token: the matched text and the terminal that matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    terminal: Terminal,
}

impl Token {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }
}

/// Scans an input text against a fixed terminal alphabet.
#[derive(Debug)]
pub struct Tokenizer {
    terminals: Vec<Terminal>,
    input: String,
    position: usize,
}

impl Tokenizer {
    pub fn new(terminals: &[Terminal], input: &str) -> Self {
        let mut terminals = terminals.to_vec();
        // Longest first; the sort is stable, so equal-length terminals
        // keep their declaration order.
        terminals.sort_by(|a, b| b.value.len().cmp(&a.value.len()));
        Tokenizer {
            terminals,
            input: preprocess(input),
            position: 0,
        }
    }

    /// The next token, skipping over bytes no terminal matches.
    pub fn next_token(&mut self) -> Option<Token> {
        while !self.is_end() {
            let rest = &self.input[self.position..];
            for terminal in &self.terminals {
                if !terminal.value.is_empty() && rest.starts_with(&terminal.value) {
                    self.position += terminal.value.len();
                    return Some(Token {
                        value: terminal.value.clone(),
                        terminal: terminal.clone(),
                    });
                }
            }
            let skipped = rest.chars().next()?;
            warn!(
                "unexpected character {:?} at position {}, skipping",
                skipped, self.position
            );
            self.position += skipped.len_utf8();
        }
        None
    }

    pub fn is_end(&self) -> bool {
        self.position >= self.input.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> &str {
        &self.input[self.position..]
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Drops `//` comment lines and joins the rest without separators.
fn preprocess(input: &str) -> String {
    input
        .lines()
        .filter(|line| !line.starts_with("//"))
        .collect()
}
