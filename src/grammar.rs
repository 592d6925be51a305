//! Grammar source-text parser and the `Grammar` model.
//!
//! The source format is line-oriented. Every rule carries an AST directive
//! in square brackets, a double-quoted left-hand side, `->`, and a list of
//! alternations separated by `|`:
//!
//! ```text
//! # comment
//! [; ]    "E" -> "E" '+' "T" | "T"
//! [; 1]   "Paren" -> '(' "E" ')'
//! [*; ]   "L" -> "L" ',' "E" | "E" `reduce_list`
//! ```
//!
//! Terminals are single-quoted (`'id'`) or angle-bracket escapes (`<n>`),
//! non-terminals are double-quoted, and a backtick block at the end of a
//! rule is an opaque semantic-action string. Lines starting with `#` and
//! blank lines are skipped; a trailing `\` continues the line, and a rule
//! may span lines while a backtick block is open.

use crate::error::{Result, SlrError};
use std::collections::HashSet;
use std::fmt;

/// A terminal spelling as written in the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Terminal {
    pub value: String,
}

impl Terminal {
    /// Resolves an angle-bracket escape name to its terminal.
    ///
    /// The recognised names are exactly `n`, `quot`, `squot`, `vertical`,
    /// `rarrow`, `langle`, `rangle`, and `hash`.
    pub fn escape(name: &str) -> Result<Self> {
        let value = match name {
            "n" => "\n",
            "quot" => "\"",
            "squot" => "'",
            "vertical" => "|",
            "rarrow" => "-",
            "langle" => "<",
            "rangle" => ">",
            "hash" => "#",
            _ => return Err(SlrError::UnknownEscape(name.to_string())),
        };
        Ok(Terminal {
            value: value.to_string(),
        })
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value == "\n" {
            write!(f, "'\\n'")
        } else {
            write!(f, "'{}'", self.value)
        }
    }
}

/// A non-terminal name as written in the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonTerminal {
    pub name: String,
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.name)
    }
}

/// One token of a rule's right-hand side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarSymbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl fmt::Display for GrammarSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarSymbol::Terminal(t) => t.fmt(f),
            GrammarSymbol::NonTerminal(nt) => nt.fmt(f),
        }
    }
}

/// The AST-shaping directive preceding a rule.
///
/// `[; ]` keeps all children, `[; -]` keeps none, `[; 0,2]` selects
/// children by 0-based index, and a leading `*` marks the rule's nodes for
/// flattening into their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstDirective {
    pub do_flatten: bool,
    pub use_all_children: bool,
    pub children: Vec<usize>,
}

impl AstDirective {
    /// Parses the text between the square brackets.
    pub fn parse(text: &str) -> Result<Self> {
        let Some(semicolon) = text.find(';') else {
            return Err(SlrError::GrammarSyntax(format!(
                "Missing ';' in AST directive: {}",
                text
            )));
        };

        let do_flatten = text[..semicolon].contains('*');
        let content: String = text[semicolon + 1..]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if content == "-" {
            return Ok(AstDirective {
                do_flatten,
                use_all_children: false,
                children: Vec::new(),
            });
        }
        if content.is_empty() {
            return Ok(AstDirective {
                do_flatten,
                use_all_children: true,
                children: Vec::new(),
            });
        }

        let mut children = Vec::new();
        for token in content.split(',') {
            let index = token.parse::<usize>().map_err(|_| {
                SlrError::GrammarSyntax(format!(
                    "Invalid child index '{}' in AST directive: {}",
                    token, text
                ))
            })?;
            children.push(index);
        }
        Ok(AstDirective {
            do_flatten,
            use_all_children: false,
            children,
        })
    }
}

impl fmt::Display for AstDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{};", if self.do_flatten { "*" } else { "" })?;
        if self.use_all_children {
            write!(f, " ]")
        } else if self.children.is_empty() {
            write!(f, " -]")
        } else {
            let list: Vec<String> = self.children.iter().map(|i| i.to_string()).collect();
            write!(f, " {}]", list.join(","))
        }
    }
}

/// A grammar rule: an AST directive, a left-hand side, the alternation
/// list, and an optional semantic action shared by every alternation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarRule {
    pub left: NonTerminal,
    pub alternations: Vec<Vec<GrammarSymbol>>,
    pub directive: AstDirective,
    pub semantic_action: Option<String>,
}

impl GrammarRule {
    /// Parses one logical rule line.
    pub fn parse(line: &str) -> Result<Self> {
        let (open, close) = match (line.find('['), line.find(']')) {
            (Some(open), Some(close)) if open < close => (open, close),
            _ => {
                return Err(SlrError::GrammarSyntax(format!(
                    "Rule must start with an AST directive in square brackets: {}",
                    line
                )));
            }
        };
        let directive = AstDirective::parse(&line[open + 1..close])?;

        let rest = &line[close + 1..];
        let Some(arrow) = rest.find("->") else {
            return Err(SlrError::GrammarSyntax(format!(
                "Rule must contain '->': {}",
                line
            )));
        };

        let left = parse_left_hand_side(&rest[..arrow])?;
        let (rhs, semantic_action) = extract_semantic_action(&rest[arrow + 2..])?;
        let alternations = parse_alternations(&rhs)?;
        if alternations.is_empty() {
            return Err(SlrError::GrammarSyntax(format!(
                "Rule has an empty right-hand side: {}",
                line
            )));
        }

        Ok(GrammarRule {
            left,
            alternations,
            directive,
            semantic_action,
        })
    }
}

impl fmt::Display for GrammarRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alternations: Vec<String> = self
            .alternations
            .iter()
            .map(|alt| {
                alt.iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        write!(
            f,
            "{} {} -> {}",
            self.directive,
            self.left,
            alternations.join(" | ")
        )?;
        if let Some(action) = &self.semantic_action {
            write!(f, " `{}`", action)?;
        }
        Ok(())
    }
}

fn parse_left_hand_side(text: &str) -> Result<NonTerminal> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let inner = compact
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| {
            SlrError::GrammarSyntax(format!(
                "NonTerminal must be enclosed in double quotes: {}",
                text.trim()
            ))
        })?;
    Ok(NonTerminal {
        name: inner.to_string(),
    })
}

/// Splits an optional backtick-delimited semantic action off the RHS text.
fn extract_semantic_action(rhs: &str) -> Result<(String, Option<String>)> {
    let Some(start) = rhs.find('`') else {
        return Ok((rhs.to_string(), None));
    };
    let Some(offset) = rhs[start + 1..].find('`') else {
        return Err(SlrError::GrammarSyntax(format!(
            "Unterminated semantic action: {}",
            &rhs[start..]
        )));
    };
    let end = start + 1 + offset;
    let action = rhs[start + 1..end].to_string();
    let mut stripped = String::with_capacity(rhs.len());
    stripped.push_str(&rhs[..start]);
    stripped.push_str(&rhs[end + 1..]);
    Ok((stripped, Some(action)))
}

/// Scans an alternation list.
///
/// Only delimited tokens are recognised; whitespace and stray characters
/// between tokens are skipped. `|` closes the current alternation even
/// when it is empty, which is how holes like `'a' | | 'b'` surface for
/// rejection later.
fn parse_alternations(text: &str) -> Result<Vec<Vec<GrammarSymbol>>> {
    let chars: Vec<char> = text.chars().collect();
    let mut alternations = Vec::new();
    let mut current = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch.is_whitespace() {
            i += 1;
            continue;
        }
        match ch {
            '|' => {
                alternations.push(std::mem::take(&mut current));
                i += 1;
            }
            '\'' => {
                let (inner, next) = read_delimited(&chars, i, '\'').ok_or_else(|| {
                    SlrError::GrammarSyntax(format!(
                        "Unterminated terminal literal: {}",
                        tail(&chars, i)
                    ))
                })?;
                current.push(GrammarSymbol::Terminal(Terminal { value: inner }));
                i = next;
            }
            '"' => {
                let (inner, next) = read_delimited(&chars, i, '"').ok_or_else(|| {
                    SlrError::GrammarSyntax(format!(
                        "Unterminated non-terminal: {}",
                        tail(&chars, i)
                    ))
                })?;
                current.push(GrammarSymbol::NonTerminal(NonTerminal { name: inner }));
                i = next;
            }
            '<' => {
                let (inner, next) = read_delimited(&chars, i, '>').ok_or_else(|| {
                    SlrError::GrammarSyntax(format!(
                        "Unterminated special terminal: {}",
                        tail(&chars, i)
                    ))
                })?;
                current.push(GrammarSymbol::Terminal(Terminal::escape(&inner)?));
                i = next;
            }
            _ => {
                i += 1;
            }
        }
    }

    if !current.is_empty() {
        alternations.push(current);
    }
    Ok(alternations)
}

/// Reads the token content between `chars[open]` and the next `close`
/// character; returns the content and the index past the closer.
fn read_delimited(chars: &[char], open: usize, close: char) -> Option<(String, usize)> {
    let mut i = open + 1;
    while i < chars.len() {
        if chars[i] == close {
            let inner: String = chars[open + 1..i].iter().collect();
            return Some((inner, i + 1));
        }
        i += 1;
    }
    None
}

fn tail(chars: &[char], from: usize) -> String {
    chars[from..].iter().collect()
}

/// A parsed grammar: rules in declaration order.
///
/// Multiple rules with the same left-hand side are kept as separate
/// entries; augmentation concatenates their alternations in declaration
/// order.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<GrammarRule>,
}

impl Grammar {
    /// Parses a whole grammar source text.
    pub fn parse(source: &str) -> Result<Self> {
        let mut rules = Vec::new();
        for line in assemble_logical_lines(source)? {
            rules.push(GrammarRule::parse(&line)?);
        }
        Ok(Grammar { rules })
    }

    pub fn rules(&self) -> &[GrammarRule] {
        &self.rules
    }

    /// True when some rule defines `name`.
    pub fn defines(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.left.name == name)
    }

    /// True when `name` is defined by, or referenced from, any rule.
    pub fn mentions(&self, name: &str) -> bool {
        if self.defines(name) {
            return true;
        }
        self.rules.iter().any(|rule| {
            rule.alternations.iter().flatten().any(|sym| {
                matches!(sym, GrammarSymbol::NonTerminal(nt) if nt.name == name)
            })
        })
    }

    /// Non-terminals referenced on some RHS but never defined, in
    /// first-use order.
    pub fn undefined_non_terminals(&self) -> Vec<String> {
        let defined: HashSet<&str> = self.rules.iter().map(|r| r.left.name.as_str()).collect();
        let mut undefined = Vec::new();
        for rule in &self.rules {
            for sym in rule.alternations.iter().flatten() {
                if let GrammarSymbol::NonTerminal(nt) = sym
                    && !defined.contains(nt.name.as_str())
                    && !undefined.contains(&nt.name)
                {
                    undefined.push(nt.name.clone());
                }
            }
        }
        undefined
    }

    /// Distinct terminals in first-use order; feeds the tokenizer and
    /// keeps table dumps stable.
    pub fn terminals(&self) -> Vec<Terminal> {
        let mut terminals = Vec::new();
        for rule in &self.rules {
            for sym in rule.alternations.iter().flatten() {
                if let GrammarSymbol::Terminal(t) = sym
                    && !terminals.contains(t)
                {
                    terminals.push(t.clone());
                }
            }
        }
        terminals
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

/// Joins physical lines into logical rule lines.
///
/// Comment and blank lines are dropped, a trailing `\` splices the next
/// line, and newlines inside an open backtick block are preserved so
/// semantic actions can span lines.
fn assemble_logical_lines(source: &str) -> Result<Vec<String>> {
    let mut logical = Vec::new();
    let mut buffer = String::new();
    let mut in_action = false;

    for line in source.lines() {
        if !in_action && buffer.is_empty() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
        }

        if line.matches('`').count() % 2 == 1 {
            in_action = !in_action;
        }
        if in_action {
            buffer.push_str(line);
            buffer.push('\n');
            continue;
        }
        if let Some(stripped) = line.strip_suffix('\\') {
            buffer.push_str(stripped);
            continue;
        }
        buffer.push_str(line);
        logical.push(std::mem::take(&mut buffer));
    }

    if in_action {
        return Err(SlrError::GrammarSyntax(format!(
            "Unterminated semantic action: {}",
            buffer.trim_end()
        )));
    }
    if !buffer.is_empty() {
        logical.push(buffer);
    }
    Ok(logical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule_with_alternations() {
        let rule = GrammarRule::parse("[; ] \"E\" -> \"E\" '+' \"T\" | \"T\"").unwrap();
        assert_eq!(rule.left.name, "E");
        assert_eq!(rule.alternations.len(), 2);
        assert_eq!(rule.alternations[0].len(), 3);
        assert!(rule.directive.use_all_children);
        assert!(!rule.directive.do_flatten);
    }

    #[test]
    fn test_parse_directive_forms() {
        assert!(AstDirective::parse("; ").unwrap().use_all_children);
        let drop_all = AstDirective::parse("; -").unwrap();
        assert!(!drop_all.use_all_children);
        assert!(drop_all.children.is_empty());
        let select = AstDirective::parse("*; 0, 2").unwrap();
        assert!(select.do_flatten);
        assert_eq!(select.children, vec![0, 2]);
    }

    #[test]
    fn test_parse_escapes() {
        let rule = GrammarRule::parse("[; ] \"S\" -> <hash> <n> <vertical>").unwrap();
        let values: Vec<&str> = rule.alternations[0]
            .iter()
            .map(|s| match s {
                GrammarSymbol::Terminal(t) => t.value.as_str(),
                GrammarSymbol::NonTerminal(_) => unreachable!(),
            })
            .collect();
        assert_eq!(values, vec!["#", "\n", "|"]);
    }

    #[test]
    fn test_unknown_escape_names_the_culprit() {
        let err = GrammarRule::parse("[; ] \"X\" -> <bogus>").unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_semantic_action_is_captured() {
        let rule = GrammarRule::parse("[; ] \"E\" -> 'n' `push(n)`").unwrap();
        assert_eq!(rule.semantic_action.as_deref(), Some("push(n)"));
        assert_eq!(rule.alternations[0].len(), 1);
    }

    #[test]
    fn test_display_round_trip() {
        let source = "[; 1] \"Paren\" -> '(' \"E\" ')'\n[*; ] \"L\" -> \"L\" ',' \"E\" | \"E\"\n";
        let grammar = Grammar::parse(source).unwrap();
        let reparsed = Grammar::parse(&grammar.to_string()).unwrap();
        assert_eq!(grammar.rules(), reparsed.rules());
    }
}
