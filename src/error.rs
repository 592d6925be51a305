//! Error types for the SLR toolkit.

use crate::symbol::Symbol;
use crate::table::Action;
use std::fmt;
use thiserror::Error;

/// Why the parse driver gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    /// No ACTION entry for the current state and lookahead.
    NoAction,
    /// No GOTO entry for the state uncovered by a reduction.
    NoGoto,
    /// The CST stack held more than the root when Accept was reached.
    ExtraSymbolsAtAccept,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::NoAction => write!(f, "no action"),
            ParseFailure::NoGoto => write!(f, "no goto"),
            ParseFailure::ExtraSymbolsAtAccept => write!(f, "extra symbols at accept"),
        }
    }
}

/// Errors that can occur while parsing grammars, building tables, and
/// driving the parser.
#[derive(Error, Debug)]
pub enum SlrError {
    #[error("Invalid grammar rule: {0}")]
    GrammarSyntax(String),

    #[error("Unknown special terminal: {0}")]
    UnknownEscape(String),

    #[error("Undefined non-terminals: {}", .0.join(", "))]
    UndefinedNonTerminals(Vec<String>),

    #[error("Start symbol \"{0}\" has no rule in the grammar")]
    UnknownStartSymbol(String),

    #[error("Empty production for \"{0}\"; ε-rules are not supported")]
    EmptyProduction(String),

    #[error("Table conflict at state {state} on {symbol}: existing {existing}, proposed {proposed}")]
    TableConflict {
        state: usize,
        symbol: Symbol,
        existing: Action,
        proposed: Action,
    },

    #[error("Syntax error at token {position}: {reason} for {symbol} in state {state}")]
    Parse {
        position: usize,
        state: usize,
        symbol: Symbol,
        reason: ParseFailure,
    },

    #[error("AST directive selects child {index}, but the node has {arity} children")]
    AstShape { index: usize, arity: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, SlrError>;
