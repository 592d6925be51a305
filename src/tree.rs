//! Concrete and abstract syntax trees and the reshaping engine.
//!
//! Internal CST nodes carry the index of the production they reduced by;
//! the productions vector on the parser stays the single owner. Reshaping
//! is a pure function of a node and that vector.

use crate::error::{Result, SlrError};
use crate::json;
use crate::production::Production;
use crate::symbol::Symbol;

/// A concrete-syntax-tree node. Terminal leaves carry no production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstNode {
    pub symbol: Symbol,
    pub children: Vec<CstNode>,
    pub production: Option<usize>,
}

impl CstNode {
    pub fn leaf(symbol: Symbol) -> Self {
        CstNode {
            symbol,
            children: Vec::new(),
            production: None,
        }
    }

    pub fn internal(symbol: Symbol, children: Vec<CstNode>, production: usize) -> Self {
        CstNode {
            symbol,
            children,
            production: Some(production),
        }
    }

    /// Pretty-printed JSON rendering of the subtree.
    pub fn to_json(&self) -> Result<String> {
        json::dump_cst(self)
    }
}

/// An abstract-syntax-tree node, produced once by the reshaper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub symbol: Symbol,
    pub children: Vec<AstNode>,
    pub production: Option<usize>,
}

impl AstNode {
    /// Pretty-printed JSON rendering of the subtree.
    pub fn to_json(&self) -> Result<String> {
        json::dump_ast(self)
    }
}

/// Condenses a CST subtree into an AST subtree.
///
/// The node's production decides which children are visited: all of them
/// for `use_all_children`, otherwise the `ast_children` indices in listed
/// order (duplicates allowed, out-of-range indices are an error). Each
/// visited child whose own production is marked `do_flatten` contributes
/// its reshaped children in place of itself; any other child is kept as a
/// single reshaped node. Leaves copy verbatim.
pub fn reshape(node: &CstNode, productions: &[Production]) -> Result<AstNode> {
    let Some(index) = node.production else {
        return Ok(AstNode {
            symbol: node.symbol.clone(),
            children: Vec::new(),
            production: None,
        });
    };
    let production = &productions[index];

    let mut children = Vec::new();
    if production.use_all_children {
        for child in &node.children {
            reshape_child(child, productions, &mut children)?;
        }
    } else {
        for &selected in &production.ast_children {
            let child = node.children.get(selected).ok_or(SlrError::AstShape {
                index: selected,
                arity: node.children.len(),
            })?;
            reshape_child(child, productions, &mut children)?;
        }
    }

    Ok(AstNode {
        symbol: node.symbol.clone(),
        children,
        production: Some(index),
    })
}

fn reshape_child(
    child: &CstNode,
    productions: &[Production],
    out: &mut Vec<AstNode>,
) -> Result<()> {
    let flatten = child
        .production
        .map(|index| productions[index].do_flatten)
        .unwrap_or(false);
    let reshaped = reshape(child, productions)?;
    if flatten {
        out.extend(reshaped.children);
    } else {
        out.push(reshaped);
    }
    Ok(())
}
