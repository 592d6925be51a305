//! Command-line driver: grammar in, table and tree dumps out.

use crate::error::{Result, SlrError};
use crate::grammar::Grammar;
use crate::parser::SlrParser;
use crate::symbol::Symbol;
use crate::tokenizer::{Token, Tokenizer};
use log::{debug, info};
use std::fs;
use std::path::PathBuf;

/// Builds SLR(1) tables for a grammar, parses an input text, and writes
/// the table, CST, and AST dumps as JSON.
#[derive(Debug, clap::Parser)]
#[command(name = "slr_parser", version)]
pub struct Cli {
    /// Grammar definition file.
    #[arg(default_value = "grammar.txt")]
    grammar: PathBuf,

    /// Source text to tokenize and parse.
    #[arg(default_value = "test.mygo")]
    input: PathBuf,

    /// Start symbol of the grammar.
    #[arg(short, long, default_value = "program")]
    start: String,

    /// Output path for the parser table dump.
    #[arg(long, default_value = "slr_parser.json")]
    table_out: PathBuf,

    /// Output path for the concrete syntax tree.
    #[arg(long, default_value = "parser_tree_cst.json")]
    cst_out: PathBuf,

    /// Output path for the abstract syntax tree.
    #[arg(long, default_value = "parser_tree_ast.json")]
    ast_out: PathBuf,

    /// Fail table construction on the first conflict.
    #[arg(long)]
    strict: bool,
}

/// Runs the whole pipeline; the first failing stage aborts.
pub fn run(cli: &Cli) -> Result<()> {
    let grammar_text = fs::read_to_string(&cli.grammar)?;
    let grammar = Grammar::parse(&grammar_text)?;
    info!(
        "parsed {} rules from {}",
        grammar.rules().len(),
        cli.grammar.display()
    );

    let undefined = grammar.undefined_non_terminals();
    if !undefined.is_empty() {
        return Err(SlrError::UndefinedNonTerminals(undefined));
    }

    let input = fs::read_to_string(&cli.input)?;
    let tokens: Vec<Token> = Tokenizer::new(&grammar.terminals(), &input).collect();
    for (index, token) in tokens.iter().enumerate() {
        debug!("token [{}] {:?}", index, token.value());
    }
    info!("{} tokens from {}", tokens.len(), cli.input.display());

    let parser = if cli.strict {
        SlrParser::build_strict(&grammar, &cli.start)?
    } else {
        SlrParser::build(&grammar, &cli.start)?
    };
    if !parser.conflicts().is_empty() {
        info!(
            "table built with {} conflicts (first-write-wins)",
            parser.conflicts().len()
        );
    }

    fs::write(&cli.table_out, parser.to_json()?)?;
    info!("parser tables written to {}", cli.table_out.display());

    let symbols: Vec<Symbol> = tokens
        .iter()
        .map(|token| Symbol::terminal(token.terminal().value.clone()))
        .collect();
    let cst = parser.parse(&symbols)?;
    fs::write(&cli.cst_out, cst.to_json()?)?;
    info!("concrete syntax tree written to {}", cli.cst_out.display());

    let ast = parser.to_ast(&cst)?;
    fs::write(&cli.ast_out, ast.to_json()?)?;
    info!("abstract syntax tree written to {}", cli.ast_out.display());

    Ok(())
}
