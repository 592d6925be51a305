//! Parse actions and ACTION/GOTO table construction.
//!
//! Conflicts do not abort construction by default: the earlier-written
//! action stays, and the conflict is recorded and logged so callers can
//! inspect it programmatically. Strict mode promotes the first conflict
//! to an error.

use crate::automaton::Automaton;
use crate::error::{Result, SlrError};
use crate::first_follow::FollowSets;
use crate::production::Production;
use crate::symbol::Symbol;
use log::warn;
use std::collections::HashMap;
use std::fmt;

/// A parse decision for one `(state, terminal)` cell.
///
/// Missing cells are errors; there is no explicit error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

impl Action {
    /// Wire code used by the JSON dump: SHIFT=0, REDUCE=1, ACCEPT=2
    /// (ERROR=3 is reserved for absent cells and never stored).
    pub fn kind_code(&self) -> i64 {
        match self {
            Action::Shift(_) => 0,
            Action::Reduce(_) => 1,
            Action::Accept => 2,
        }
    }

    /// The state or production operand; `-1` for accept.
    pub fn operand(&self) -> i64 {
        match self {
            Action::Shift(state) => *state as i64,
            Action::Reduce(production) => *production as i64,
            Action::Accept => -1,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "s{}", state),
            Action::Reduce(production) => write!(f, "r{}", production),
            Action::Accept => write!(f, "acc"),
        }
    }
}

/// A shift/reduce or reduce/reduce collision observed during table
/// construction. The kept action is always `existing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub symbol: Symbol,
    pub existing: Action,
    pub proposed: Action,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "conflict at state {} on {}: keeping {}, dropping {}",
            self.state, self.symbol, self.existing, self.proposed
        )
    }
}

/// The finished tables plus every conflict seen while filling them.
#[derive(Debug)]
pub struct Tables {
    pub actions: HashMap<(usize, Symbol), Action>,
    pub gotos: HashMap<(usize, Symbol), usize>,
    pub conflicts: Vec<Conflict>,
}

/// Fills ACTION from the item sets and FOLLOW, and adopts the automaton's
/// transition relation as GOTO.
///
/// Per state, shift actions are written before reduce actions, each group
/// in item order, and FOLLOW symbols are visited sorted. Together with
/// first-write-wins this fixes the outcome of every conflict; in
/// particular a dangling-else collision keeps the shift.
pub fn build_tables(
    productions: &[Production],
    automaton: &Automaton,
    follow_sets: &FollowSets,
    augmented_start: &str,
    strict: bool,
) -> Result<Tables> {
    let gotos = automaton.transitions.clone();
    let mut tables = Tables {
        actions: HashMap::new(),
        gotos,
        conflicts: Vec::new(),
    };

    for (state, items) in automaton.item_sets.iter().enumerate() {
        for item in items {
            let Some(symbol) = item.symbol_after_dot(productions) else {
                continue;
            };
            if !symbol.is_terminal() {
                continue;
            }
            if let Some(&next) = tables.gotos.get(&(state, symbol.clone())) {
                write_action(&mut tables, state, symbol.clone(), Action::Shift(next), strict)?;
            }
        }

        for item in items {
            if !item.is_complete(productions) {
                continue;
            }
            let production = &productions[item.production];
            if production.lhs == augmented_start {
                write_action(&mut tables, state, Symbol::end_marker(), Action::Accept, strict)?;
                continue;
            }
            let mut lookaheads: Vec<Symbol> = follow_sets
                .get(&production.lhs)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            lookaheads.sort();
            for symbol in lookaheads {
                write_action(&mut tables, state, symbol, Action::Reduce(item.production), strict)?;
            }
        }
    }

    Ok(tables)
}

fn write_action(
    tables: &mut Tables,
    state: usize,
    symbol: Symbol,
    proposed: Action,
    strict: bool,
) -> Result<()> {
    let existing = tables.actions.get(&(state, symbol.clone())).copied();
    match existing {
        Some(existing) if existing != proposed => {
            if strict {
                return Err(SlrError::TableConflict {
                    state,
                    symbol,
                    existing,
                    proposed,
                });
            }
            let conflict = Conflict {
                state,
                symbol,
                existing,
                proposed,
            };
            warn!("{}", conflict);
            tables.conflicts.push(conflict);
        }
        Some(_) => {}
        None => {
            tables.actions.insert((state, symbol), proposed);
        }
    }
    Ok(())
}
