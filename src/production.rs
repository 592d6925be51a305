//! The augmented production model.
//!
//! A `Production` is one alternation of a grammar rule after augmentation,
//! carrying its AST directives and optional semantic action. Productions
//! are immutable once the table is built and are referred to by index
//! everywhere else (items, ACTION entries, CST nodes).

use crate::grammar::{Grammar, GrammarSymbol};
use crate::symbol::Symbol;
use std::fmt;

/// One alternation of the augmented grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: String,
    pub rhs: Vec<Symbol>,
    pub ast_children: Vec<usize>,
    pub do_flatten: bool,
    pub use_all_children: bool,
    pub semantic_action: Option<String>,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rhs: Vec<String> = self.rhs.iter().map(|s| s.to_string()).collect();
        write!(f, "{} -> {}", self.lhs, rhs.join(" "))
    }
}

/// Picks a start name that cannot collide with any grammar non-terminal:
/// `<start>'`, growing by one `'` per collision.
pub fn augmented_start_name(grammar: &Grammar, start: &str) -> String {
    let mut name = format!("{}'", start);
    while grammar.mentions(&name) {
        name.push('\'');
    }
    name
}

/// Builds the augmented production list: `S' -> S` first, then every
/// alternation of every rule in declaration order.
pub fn augment(grammar: &Grammar, start: &str) -> (String, Vec<Production>) {
    let augmented_start = augmented_start_name(grammar, start);

    let mut productions = vec![Production {
        lhs: augmented_start.clone(),
        rhs: vec![Symbol::non_terminal(start)],
        ast_children: vec![0],
        do_flatten: false,
        use_all_children: true,
        semantic_action: None,
    }];

    for rule in grammar.rules() {
        for alternation in &rule.alternations {
            productions.push(Production {
                lhs: rule.left.name.clone(),
                rhs: alternation.iter().map(symbol_of).collect(),
                ast_children: rule.directive.children.clone(),
                do_flatten: rule.directive.do_flatten,
                use_all_children: rule.directive.use_all_children,
                semantic_action: rule.semantic_action.clone(),
            });
        }
    }

    (augmented_start, productions)
}

fn symbol_of(sym: &GrammarSymbol) -> Symbol {
    match sym {
        GrammarSymbol::Terminal(t) => Symbol::terminal(t.value.clone()),
        GrammarSymbol::NonTerminal(nt) => Symbol::non_terminal(nt.name.clone()),
    }
}
