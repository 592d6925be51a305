//! FIRST and FOLLOW set computation over the augmented productions.
//!
//! Both computations are least-fixed-point iterations that run until a
//! full pass produces no growth. The grammar model has no ε-productions
//! (empty alternations are rejected before any table work), so FIRST of a
//! sequence depends only on its first symbol.

use crate::production::Production;
use crate::symbol::Symbol;
use std::collections::{HashMap, HashSet};

/// FIRST sets keyed by non-terminal name.
pub type FirstSets = HashMap<String, HashSet<Symbol>>;

/// FOLLOW sets keyed by non-terminal name.
pub type FollowSets = HashMap<String, HashSet<Symbol>>;

/// Computes FIRST for every non-terminal.
///
/// FIRST of a terminal is the terminal itself and is resolved inline; the
/// map only carries non-terminal entries.
pub fn compute_first_sets(productions: &[Production]) -> FirstSets {
    let mut first_sets: FirstSets = HashMap::new();
    for production in productions {
        first_sets.entry(production.lhs.clone()).or_default();
    }

    let mut changed = true;
    while changed {
        changed = false;

        for production in productions {
            if production.rhs.is_empty() {
                continue;
            }

            let addition = first_of_sequence(&first_sets, &production.rhs);
            let set = first_sets.entry(production.lhs.clone()).or_default();
            let before = set.len();
            set.extend(addition);
            if set.len() > before {
                changed = true;
            }
        }
    }

    first_sets
}

/// FIRST of a symbol sequence; with no ε-productions this is FIRST of the
/// first symbol (empty for an empty sequence).
pub fn first_of_sequence(first_sets: &FirstSets, symbols: &[Symbol]) -> HashSet<Symbol> {
    match symbols.first() {
        Some(sym) if sym.is_terminal() => HashSet::from([sym.clone()]),
        Some(sym) => first_sets.get(sym.name()).cloned().unwrap_or_default(),
        None => HashSet::new(),
    }
}

/// Computes FOLLOW for every non-terminal, seeded with `#` in the FOLLOW
/// set of the augmented start symbol.
///
/// For each production `A -> α B β`: FIRST(β) feeds FOLLOW(B), and when
/// `B` closes the RHS, FOLLOW(A) feeds FOLLOW(B).
pub fn compute_follow_sets(
    productions: &[Production],
    augmented_start: &str,
    first_sets: &FirstSets,
) -> FollowSets {
    let mut follow_sets: FollowSets = HashMap::new();
    for production in productions {
        follow_sets.entry(production.lhs.clone()).or_default();
    }
    follow_sets
        .entry(augmented_start.to_string())
        .or_default()
        .insert(Symbol::end_marker());

    let mut changed = true;
    while changed {
        changed = false;

        for production in productions {
            let rhs = &production.rhs;
            for (i, symbol) in rhs.iter().enumerate() {
                if !symbol.is_non_terminal() {
                    continue;
                }

                let mut addition: HashSet<Symbol> = HashSet::new();
                let beta = &rhs[i + 1..];
                if !beta.is_empty() {
                    addition.extend(first_of_sequence(first_sets, beta));
                } else {
                    let follow_lhs = follow_sets
                        .get(&production.lhs)
                        .cloned()
                        .unwrap_or_default();
                    addition.extend(follow_lhs);
                }

                let set = follow_sets.entry(symbol.name().to_string()).or_default();
                let before = set.len();
                set.extend(addition);
                if set.len() > before {
                    changed = true;
                }
            }
        }
    }

    follow_sets
}
