//! Unit tests for the CST→AST reshaping engine

use slr_parser::error::SlrError;
use slr_parser::grammar::Grammar;
use slr_parser::symbol::Symbol;
use slr_parser::tree::{reshape, AstNode, CstNode};
use slr_parser::SlrParser;

fn symbols(values: &[&str]) -> Vec<Symbol> {
    values.iter().map(|v| Symbol::terminal(*v)).collect()
}

fn build_and_parse(source: &str, start: &str, input: &[&str]) -> (SlrParser, CstNode) {
    let grammar = Grammar::parse(source).unwrap();
    let parser = SlrParser::build(&grammar, start).unwrap();
    let cst = parser.parse(&symbols(input)).unwrap();
    (parser, cst)
}

/// Views an AST as a CST again, production indices included, so a second
/// reshape can run over it.
fn as_cst(node: &AstNode) -> CstNode {
    CstNode {
        symbol: node.symbol.clone(),
        children: node.children.iter().map(as_cst).collect(),
        production: node.production,
    }
}

#[test]
fn test_use_all_children_keeps_the_cst_shape() {
    let (parser, cst) = build_and_parse(
        "[; ] \"E\" -> \"E\" '+' \"T\" | \"T\"\n[; ] \"T\" -> 'id'\n",
        "E",
        &["id", "+", "id"],
    );
    let ast = parser.to_ast(&cst).unwrap();

    assert_eq!(ast.symbol, Symbol::non_terminal("E"));
    assert_eq!(ast.children.len(), 3);
    assert_eq!(ast.children[1].symbol, Symbol::terminal("+"));
    assert_eq!(ast.children[0].children.len(), 1);
}

#[test]
fn test_flatten_collapses_left_recursion() {
    let (parser, cst) = build_and_parse(
        "[*; ] \"L\" -> \"L\" ',' \"E\" | \"E\"\n[; ] \"E\" -> 'n'\n",
        "L",
        &["n", ",", "n", ",", "n"],
    );

    // The CST is a left-recursive binary chain.
    assert_eq!(cst.children.len(), 3);
    assert_eq!(cst.children[0].symbol, Symbol::non_terminal("L"));

    // The AST is one L with the three E children spliced up.
    let ast = parser.to_ast(&cst).unwrap();
    assert_eq!(ast.symbol, Symbol::non_terminal("L"));
    let shapes: Vec<Symbol> = ast.children.iter().map(|c| c.symbol.clone()).collect();
    assert_eq!(
        shapes,
        vec![
            Symbol::non_terminal("E"),
            Symbol::terminal(","),
            Symbol::non_terminal("E"),
            Symbol::terminal(","),
            Symbol::non_terminal("E"),
        ]
    );
    for child in &ast.children {
        if child.symbol.is_non_terminal() {
            assert_eq!(child.children.len(), 1);
            assert_eq!(child.children[0].symbol, Symbol::terminal("n"));
        }
    }
}

#[test]
fn test_selective_children_drop_the_rest() {
    let (parser, cst) = build_and_parse(
        "[; 1] \"Paren\" -> '(' \"E\" ')'\n[; ] \"E\" -> 'n'\n",
        "Paren",
        &["(", "n", ")"],
    );
    let ast = parser.to_ast(&cst).unwrap();

    assert_eq!(ast.symbol, Symbol::non_terminal("Paren"));
    assert_eq!(ast.children.len(), 1);
    assert_eq!(ast.children[0].symbol, Symbol::non_terminal("E"));
}

#[test]
fn test_drop_all_children_directive() {
    let (parser, cst) = build_and_parse(
        "[; 0] \"S\" -> \"E\" ';'\n[; -] \"E\" -> 'n' '+' 'n'\n",
        "S",
        &["n", "+", "n", ";"],
    );
    let ast = parser.to_ast(&cst).unwrap();

    assert_eq!(ast.children.len(), 1);
    let expr = &ast.children[0];
    assert_eq!(expr.symbol, Symbol::non_terminal("E"));
    assert!(expr.children.is_empty());
}

#[test]
fn test_duplicate_indices_duplicate_children() {
    let (parser, cst) = build_and_parse(
        "[; 1,1] \"Paren\" -> '(' \"E\" ')'\n[; ] \"E\" -> 'n'\n",
        "Paren",
        &["(", "n", ")"],
    );
    let ast = parser.to_ast(&cst).unwrap();

    assert_eq!(ast.children.len(), 2);
    assert_eq!(ast.children[0], ast.children[1]);
}

#[test]
fn test_out_of_range_index_is_an_error() {
    let (parser, cst) = build_and_parse(
        "[; 5] \"E\" -> 'n'\n",
        "E",
        &["n"],
    );
    let err = parser.to_ast(&cst).unwrap_err();
    match err {
        SlrError::AstShape { index, arity } => {
            assert_eq!(index, 5);
            assert_eq!(arity, 1);
        }
        other => panic!("expected AstShape, got {:?}", other),
    }
}

#[test]
fn test_terminal_leaf_reshapes_to_itself() {
    let leaf = CstNode::leaf(Symbol::terminal("id"));
    let ast = reshape(&leaf, &[]).unwrap();
    assert_eq!(ast.symbol, Symbol::terminal("id"));
    assert!(ast.children.is_empty());
    assert!(ast.production.is_none());
}

#[test]
fn test_reshaping_is_idempotent() {
    let sources = [
        ("[*; ] \"L\" -> \"L\" ',' \"E\" | \"E\"\n[; ] \"E\" -> 'n'\n", "L",
         vec!["n", ",", "n", ",", "n"]),
        ("[; 0] \"S\" -> \"E\" ';'\n[; -] \"E\" -> 'n' '+' 'n'\n", "S",
         vec!["n", "+", "n", ";"]),
        ("[; ] \"E\" -> \"E\" '+' \"T\" | \"T\"\n[; ] \"T\" -> 'id'\n", "E",
         vec!["id", "+", "id"]),
    ];

    for (source, start, input) in sources {
        let (parser, cst) = build_and_parse(source, start, &input);
        let ast = parser.to_ast(&cst).unwrap();
        let again = parser.to_ast(&as_cst(&ast)).unwrap();
        assert_eq!(ast, again);
    }
}
