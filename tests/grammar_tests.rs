//! Unit tests for the grammar source-text parser

use slr_parser::error::SlrError;
use slr_parser::grammar::{Grammar, GrammarSymbol};

#[test]
fn test_parse_grammar_skips_comments_and_blank_lines() {
    let source = "\
# expression grammar
[; ] \"E\" -> \"E\" '+' \"T\" | \"T\"

[; ] \"T\" -> 'id'
";
    let grammar = Grammar::parse(source).unwrap();
    assert_eq!(grammar.rules().len(), 2);
    assert_eq!(grammar.rules()[0].left.name, "E");
    assert_eq!(grammar.rules()[1].left.name, "T");
}

#[test]
fn test_rules_keep_declaration_order() {
    let source = "\
[; ] \"A\" -> 'a'
[; ] \"B\" -> 'b'
[; ] \"A\" -> 'c'
";
    let grammar = Grammar::parse(source).unwrap();
    let names: Vec<&str> = grammar
        .rules()
        .iter()
        .map(|r| r.left.name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "B", "A"]);
}

#[test]
fn test_line_continuation_joins_rules() {
    let source = "[; ] \"E\" -> \"E\" '+' \"T\" \\\n    | \"T\"\n[; ] \"T\" -> 'id'\n";
    let grammar = Grammar::parse(source).unwrap();
    assert_eq!(grammar.rules().len(), 2);
    assert_eq!(grammar.rules()[0].alternations.len(), 2);
}

#[test]
fn test_semantic_action_spans_lines() {
    let source = "[; ] \"E\" -> 'n' `first line\nsecond line`\n";
    let grammar = Grammar::parse(source).unwrap();
    let action = grammar.rules()[0].semantic_action.as_deref().unwrap();
    assert!(action.contains("first line"));
    assert!(action.contains("second line"));
    assert_eq!(grammar.rules()[0].alternations[0].len(), 1);
}

#[test]
fn test_unterminated_semantic_action_is_rejected() {
    let err = Grammar::parse("[; ] \"E\" -> 'n' `never closed\n").unwrap_err();
    assert!(matches!(err, SlrError::GrammarSyntax(_)));
}

#[test]
fn test_unterminated_terminal_reports_fragment() {
    let err = Grammar::parse("[; ] \"E\" -> 'id\n").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Unterminated terminal literal"));
    assert!(message.contains("'id"));
}

#[test]
fn test_missing_directive_is_rejected() {
    let err = Grammar::parse("\"E\" -> 'id'\n").unwrap_err();
    assert!(matches!(err, SlrError::GrammarSyntax(_)));
}

#[test]
fn test_missing_arrow_is_rejected() {
    let err = Grammar::parse("[; ] \"E\" 'id'\n").unwrap_err();
    assert!(err.to_string().contains("->"));
}

#[test]
fn test_unknown_escape_is_named() {
    let err = Grammar::parse("[; ] \"X\" -> <bogus>\n").unwrap_err();
    match err {
        SlrError::UnknownEscape(name) => assert_eq!(name, "bogus"),
        other => panic!("expected UnknownEscape, got {:?}", other),
    }
}

#[test]
fn test_every_escape_resolves() {
    let source = "[; ] \"X\" -> <n> <quot> <squot> <vertical> <rarrow> <langle> <rangle> <hash>\n";
    let grammar = Grammar::parse(source).unwrap();
    let values: Vec<&str> = grammar.rules()[0].alternations[0]
        .iter()
        .map(|sym| match sym {
            GrammarSymbol::Terminal(t) => t.value.as_str(),
            GrammarSymbol::NonTerminal(_) => unreachable!(),
        })
        .collect();
    assert_eq!(values, vec!["\n", "\"", "'", "|", "-", "<", ">", "#"]);
}

#[test]
fn test_undefined_non_terminals_in_first_use_order() {
    let source = "\
[; ] \"S\" -> \"Missing\" 'x' \"Gone\"
[; ] \"T\" -> \"Missing\"
";
    let grammar = Grammar::parse(source).unwrap();
    assert_eq!(
        grammar.undefined_non_terminals(),
        vec!["Missing".to_string(), "Gone".to_string()]
    );
}

#[test]
fn test_undefined_non_terminals_empty_for_closed_grammar() {
    let source = "[; ] \"S\" -> \"T\" | 'x'\n[; ] \"T\" -> 'y'\n";
    let grammar = Grammar::parse(source).unwrap();
    assert!(grammar.undefined_non_terminals().is_empty());
}

#[test]
fn test_terminals_are_distinct_in_first_use_order() {
    let source = "[; ] \"E\" -> \"E\" '+' \"T\" | \"T\"\n[; ] \"T\" -> '(' \"E\" ')' | '+' | 'id'\n";
    let grammar = Grammar::parse(source).unwrap();
    let terminals = grammar.terminals();
    let values: Vec<&str> = terminals.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, vec!["+", "(", ")", "id"]);
}

#[test]
fn test_stray_characters_between_tokens_are_ignored() {
    let grammar = Grammar::parse("[; ] \"E\" -> x 'a' y \"E\" z\n").unwrap();
    assert_eq!(grammar.rules()[0].alternations[0].len(), 2);
}
