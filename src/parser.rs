//! The SLR(1) parser: table construction pipeline and shift/reduce driver.

use crate::automaton::{ItemSet, build_automaton};
use crate::error::{ParseFailure, Result, SlrError};
use crate::first_follow::{compute_first_sets, compute_follow_sets};
use crate::grammar::Grammar;
use crate::json;
use crate::production::{Production, augment};
use crate::symbol::Symbol;
use crate::table::{Action, Conflict, build_tables};
use crate::tree::{AstNode, CstNode, reshape};
use log::debug;
use std::collections::HashMap;

/// A built SLR(1) parser. Construction is one-shot; afterwards the parser
/// is immutable and every `parse` call produces a fresh CST owned by the
/// caller.
#[derive(Debug)]
pub struct SlrParser {
    productions: Vec<Production>,
    augmented_start: String,
    item_sets: Vec<ItemSet>,
    actions: HashMap<(usize, Symbol), Action>,
    gotos: HashMap<(usize, Symbol), usize>,
    conflicts: Vec<Conflict>,
}

impl SlrParser {
    /// Builds the parser: augments the grammar, computes FIRST/FOLLOW,
    /// enumerates the item sets, and fills the tables. Conflicts are
    /// recorded first-write-wins; see [`SlrParser::conflicts`].
    pub fn build(grammar: &Grammar, start_symbol: &str) -> Result<Self> {
        Self::build_with(grammar, start_symbol, false)
    }

    /// Like [`SlrParser::build`], but the first table conflict fails the
    /// build.
    pub fn build_strict(grammar: &Grammar, start_symbol: &str) -> Result<Self> {
        Self::build_with(grammar, start_symbol, true)
    }

    fn build_with(grammar: &Grammar, start_symbol: &str, strict: bool) -> Result<Self> {
        let undefined = grammar.undefined_non_terminals();
        if !undefined.is_empty() {
            return Err(SlrError::UndefinedNonTerminals(undefined));
        }
        if !grammar.defines(start_symbol) {
            return Err(SlrError::UnknownStartSymbol(start_symbol.to_string()));
        }

        let (augmented_start, productions) = augment(grammar, start_symbol);
        for production in &productions {
            if production.rhs.is_empty() {
                return Err(SlrError::EmptyProduction(production.lhs.clone()));
            }
        }
        for (index, production) in productions.iter().enumerate() {
            debug!("production {}: {}", index, production);
        }

        let first_sets = compute_first_sets(&productions);
        let follow_sets = compute_follow_sets(&productions, &augmented_start, &first_sets);
        let automaton = build_automaton(&productions);
        debug!("{} item sets", automaton.item_sets.len());
        let tables = build_tables(
            &productions,
            &automaton,
            &follow_sets,
            &augmented_start,
            strict,
        )?;

        Ok(SlrParser {
            productions,
            augmented_start,
            item_sets: automaton.item_sets,
            actions: tables.actions,
            gotos: tables.gotos,
            conflicts: tables.conflicts,
        })
    }

    /// The augmented productions; index 0 is `S' -> S`.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn augmented_start(&self) -> &str {
        &self.augmented_start
    }

    pub fn item_sets(&self) -> &[ItemSet] {
        &self.item_sets
    }

    /// Conflicts observed during table construction, in write order.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn action(&self, state: usize, symbol: &Symbol) -> Option<&Action> {
        self.actions.get(&(state, symbol.clone()))
    }

    /// The GOTO successor for `(state, symbol)`; holds entries for both
    /// terminal and non-terminal edges.
    pub fn goto(&self, state: usize, symbol: &Symbol) -> Option<usize> {
        self.gotos.get(&(state, symbol.clone())).copied()
    }

    /// Runs the shift/reduce loop over `input` (the `#` marker is
    /// appended internally) and returns the CST root.
    ///
    /// The first failure aborts with a diagnostic carrying the 0-based
    /// token index.
    pub fn parse(&self, input: &[Symbol]) -> Result<CstNode> {
        let mut stream = input.to_vec();
        stream.push(Symbol::end_marker());

        let mut state_stack: Vec<usize> = vec![0];
        let mut node_stack: Vec<CstNode> = Vec::new();
        let mut position = 0;

        loop {
            let state = *state_stack.last().unwrap();
            let symbol = &stream[position];

            let Some(action) = self.action(state, symbol) else {
                return Err(SlrError::Parse {
                    position,
                    state,
                    symbol: symbol.clone(),
                    reason: ParseFailure::NoAction,
                });
            };

            match *action {
                Action::Shift(next) => {
                    state_stack.push(next);
                    node_stack.push(CstNode::leaf(symbol.clone()));
                    position += 1;
                }
                Action::Reduce(index) => {
                    let production = &self.productions[index];
                    let arity = production.rhs.len();
                    state_stack.truncate(state_stack.len() - arity);
                    let children = node_stack.split_off(node_stack.len() - arity);
                    let node =
                        CstNode::internal(Symbol::non_terminal(&production.lhs), children, index);

                    let uncovered = *state_stack.last().unwrap();
                    let lhs = Symbol::non_terminal(&production.lhs);
                    let Some(next) = self.goto(uncovered, &lhs) else {
                        return Err(SlrError::Parse {
                            position,
                            state: uncovered,
                            symbol: lhs,
                            reason: ParseFailure::NoGoto,
                        });
                    };
                    state_stack.push(next);
                    node_stack.push(node);
                }
                Action::Accept => {
                    let root = node_stack.pop();
                    return match root {
                        Some(root) if node_stack.is_empty() => Ok(root),
                        _ => Err(SlrError::Parse {
                            position,
                            state,
                            symbol: symbol.clone(),
                            reason: ParseFailure::ExtraSymbolsAtAccept,
                        }),
                    };
                }
            }
        }
    }

    /// Condenses a CST produced by [`SlrParser::parse`] into an AST using
    /// the per-production directives.
    pub fn to_ast(&self, cst: &CstNode) -> Result<AstNode> {
        reshape(cst, &self.productions)
    }

    /// Stable JSON dump of productions, item sets, and both tables.
    pub fn to_json(&self) -> Result<String> {
        json::dump_parser(self)
    }
}
