//! Stable JSON rendering of the parser and of syntax trees.
//!
//! Shapes are fixed for golden tests: the parser dump is an object with
//! `productions`, `item_sets`, `action_table`, and `goto_table`; trees
//! are `{type, value, children?}` with `children` absent on leaves.
//! Terminals and non-terminals are collected in first-use order over the
//! productions (with `#` appended to the terminals), so dumps are
//! byte-stable across runs. Everything pretty-prints with 2-space
//! indentation.

use crate::error::Result;
use crate::parser::SlrParser;
use crate::symbol::Symbol;
use crate::tree::{AstNode, CstNode};
use serde_json::{Map, Value, json};

/// Renders the full parser dump.
pub fn dump_parser(parser: &SlrParser) -> Result<String> {
    let productions = parser.productions();

    let mut terminals: Vec<Symbol> = Vec::new();
    let mut non_terminals: Vec<Symbol> = Vec::new();
    for production in productions {
        let lhs = Symbol::non_terminal(&production.lhs);
        if !non_terminals.contains(&lhs) {
            non_terminals.push(lhs);
        }
        for symbol in &production.rhs {
            if symbol.is_terminal() && !terminals.contains(symbol) {
                terminals.push(symbol.clone());
            }
        }
    }
    terminals.push(Symbol::end_marker());

    let productions_json: Vec<Value> = productions
        .iter()
        .enumerate()
        .map(|(index, production)| {
            json!({
                "index": index,
                "left": production.lhs,
                "right": production.rhs.iter().map(symbol_value).collect::<Vec<_>>(),
            })
        })
        .collect();

    let item_sets_json: Vec<Value> = parser
        .item_sets()
        .iter()
        .enumerate()
        .map(|(state, items)| {
            let items_json: Vec<Value> = items
                .iter()
                .map(|item| {
                    let production = &productions[item.production];
                    json!({
                        "non_terminal": production.lhs,
                        "production": production.rhs.iter().map(symbol_value).collect::<Vec<_>>(),
                        "dot_position": item.dot,
                    })
                })
                .collect();
            json!({ "state": state, "items": items_json })
        })
        .collect();

    let action_table_json: Vec<Value> = (0..parser.item_sets().len())
        .map(|state| {
            let mut actions = Map::new();
            for terminal in &terminals {
                if let Some(action) = parser.action(state, terminal) {
                    actions.insert(
                        terminal.name().to_string(),
                        json!({
                            "type": action.kind_code(),
                            "value": action.operand(),
                            "display": action.to_string(),
                        }),
                    );
                }
            }
            json!({ "state": state, "actions": actions })
        })
        .collect();

    let goto_table_json: Vec<Value> = (0..parser.item_sets().len())
        .map(|state| {
            let mut gotos = Map::new();
            for non_terminal in &non_terminals {
                if let Some(next) = parser.goto(state, non_terminal) {
                    gotos.insert(non_terminal.name().to_string(), json!(next));
                }
            }
            json!({ "state": state, "gotos": gotos })
        })
        .collect();

    let mut root = Map::new();
    root.insert("productions".to_string(), Value::Array(productions_json));
    root.insert("item_sets".to_string(), Value::Array(item_sets_json));
    root.insert("action_table".to_string(), Value::Array(action_table_json));
    root.insert("goto_table".to_string(), Value::Array(goto_table_json));

    Ok(serde_json::to_string_pretty(&Value::Object(root))?)
}

/// Renders a CST subtree.
pub fn dump_cst(node: &CstNode) -> Result<String> {
    Ok(serde_json::to_string_pretty(&cst_value(node))?)
}

/// Renders an AST subtree.
pub fn dump_ast(node: &AstNode) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ast_value(node))?)
}

fn cst_value(node: &CstNode) -> Value {
    let children: Vec<Value> = node.children.iter().map(cst_value).collect();
    tree_value(&node.symbol, children)
}

fn ast_value(node: &AstNode) -> Value {
    let children: Vec<Value> = node.children.iter().map(ast_value).collect();
    tree_value(&node.symbol, children)
}

fn tree_value(symbol: &Symbol, children: Vec<Value>) -> Value {
    let mut map = Map::new();
    if !children.is_empty() {
        map.insert("children".to_string(), Value::Array(children));
    }
    map.insert("type".to_string(), json!(type_name(symbol)));
    map.insert("value".to_string(), json!(symbol.name()));
    Value::Object(map)
}

fn symbol_value(symbol: &Symbol) -> Value {
    json!({ "value": symbol.name(), "type": type_name(symbol) })
}

fn type_name(symbol: &Symbol) -> &'static str {
    if symbol.is_terminal() {
        "terminal"
    } else {
        "non-terminal"
    }
}
