//! Line state machine for the netlist statement grammar.

use crate::error::{Result, ScsError};

use super::script::Script;
use super::statement::{Item, Statement};

/// Keywords that open a keyword-delimited region.
const BLOCK_OPEN_KEYWORDS: [&str; 2] = ["subckt", "section"];

/// Keywords that close a keyword-delimited region.
const BLOCK_CLOSE_KEYWORDS: [&str; 2] = ["ends", "endsection"];

/// How a statement sequence ended.
enum Terminator {
    /// Input ran out.
    Eof,
    /// An `ends`/`endsection` statement was consumed.
    CloseKeyword,
    /// A lone `}` line was consumed.
    CloseBrace,
}

/// Parser over the physical lines of a netlist.
pub struct Parser<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser for the given input text.
    pub fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines(),
            line_no: 0,
        }
    }

    /// Parse the whole input into a script.
    pub fn parse(mut self) -> Result<Script> {
        let (items, _) = self.parse_sequence("")?;
        Ok(Script { items })
    }

    /// Parse one statement sequence.
    ///
    /// `initial` seeds the pending logical line (the opening statement of a
    /// keyword region, still carrying any trailing backslash). Returns the
    /// items plus how the sequence ended; callers that opened a region check
    /// the terminator.
    fn parse_sequence(&mut self, initial: &str) -> Result<(Vec<Item>, Terminator)> {
        let mut items = Vec::new();
        let mut had_backslash = has_backslash(initial);
        let mut pending = if had_backslash {
            initial[..initial.len() - 1].to_string()
        } else {
            initial.to_string()
        };
        let mut pending_line = self.line_no;

        while let Some(raw) = self.lines.next() {
            self.line_no += 1;
            let stripped = preprocess(raw);
            let continues = has_plus(&stripped, had_backslash) || had_backslash;
            let segment = strip_continuations(&stripped, had_backslash);
            had_backslash = has_backslash(&stripped);

            if continues {
                if pending.is_empty() {
                    pending_line = self.line_no;
                }
                pending.push_str(segment);
                continue;
            }

            // A non-continuation line starts a new statement: the buffered
            // logical line is complete and can be split.
            if !pending.is_empty() {
                items.push(Item::Statement(Statement::parse_at(&pending, pending_line)?));
                pending.clear();
            }
            let first_word = match segment.split_whitespace().next() {
                Some(word) => word,
                None => continue,
            };

            if BLOCK_OPEN_KEYWORDS.contains(&first_word) {
                let open_line = self.line_no;
                let (block, terminator) = self.parse_sequence(&stripped)?;
                if !matches!(terminator, Terminator::CloseKeyword) {
                    return Err(ScsError::UnterminatedBlock { line: open_line });
                }
                items.push(Item::Block(block));
                had_backslash = false;
            } else if BLOCK_CLOSE_KEYWORDS.contains(&first_word) {
                // The closing statement stays inside the region it closes.
                items.push(Item::Statement(Statement::parse_at(segment, self.line_no)?));
                return Ok((items, Terminator::CloseKeyword));
            } else if let Some(header) = segment.strip_suffix('{') {
                let open_line = self.line_no;
                let mut ns = Statement::parse_at(header.trim(), open_line)?;
                let (children, terminator) = self.parse_sequence("")?;
                if !matches!(terminator, Terminator::CloseBrace) {
                    return Err(ScsError::UnterminatedBlock { line: open_line });
                }
                ns.children = children;
                items.push(Item::Statement(ns));
                had_backslash = false;
            } else if segment == "}" {
                return Ok((items, Terminator::CloseBrace));
            } else {
                pending = segment.to_string();
                pending_line = self.line_no;
            }
        }

        // End of input flushes the last buffered statement.
        if !pending.is_empty() {
            items.push(Item::Statement(Statement::parse_at(&pending, pending_line)?));
        }
        Ok((items, Terminator::Eof))
    }
}

/// Strip the trailing comment, trim, and drop parentheses — but only in the
/// region before the first `=`, so parenthesized values survive.
fn preprocess(raw: &str) -> String {
    let code = raw.split("//").next().unwrap_or(raw).trim();
    match code.split_once('=') {
        Some((head, tail)) => format!("{}={}", head.replace(['(', ')'], ""), tail),
        None => code.replace(['(', ')'], ""),
    }
}

fn has_backslash(line: &str) -> bool {
    line.ends_with('\\')
}

/// A leading `+` continues the previous statement, unless that statement
/// already continued itself with a trailing backslash.
fn has_plus(line: &str, had_backslash: bool) -> bool {
    line.starts_with('+') && !had_backslash
}

fn strip_continuations(line: &str, had_backslash: bool) -> &str {
    let line = line.strip_suffix('\\').unwrap_or(line);
    if has_plus(line, had_backslash) {
        &line[1..]
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Script {
        Parser::new(input).parse().unwrap()
    }

    fn statement(script: &Script, index: usize) -> &Statement {
        script.items[index].as_statement().unwrap()
    }

    #[test]
    fn test_parse_flat_statements() {
        let script = parse("r1 a b resistor R=1k\nc1 b 0 capacitor c=1p\n");
        assert_eq!(script.items.len(), 2);
        assert_eq!(statement(&script, 0).name, "r1");
        assert_eq!(statement(&script, 1).parameters.get("c").unwrap(), "1p");
    }

    #[test]
    fn test_backslash_continuation() {
        let script = parse("r1 a \\\nb resistor R=1k\n");
        let ns = statement(&script, 0);
        assert_eq!(ns.nodes, vec!["a", "b", "resistor"]);
    }

    #[test]
    fn test_plus_continuation() {
        let script = parse("r1 a\n+ b resistor R=1k\n");
        let ns = statement(&script, 0);
        assert_eq!(ns.nodes, vec!["a", "b", "resistor"]);
        assert_eq!(ns.parameters.get("R").unwrap(), "1k");
    }

    #[test]
    fn test_plus_after_backslash_is_literal() {
        // A backslash continuation already joins the lines, so the leading
        // '+' belongs to the text itself.
        let script = parse("v1 in 0 vsource dc=5 \\\n+3\n");
        let ns = statement(&script, 0);
        assert_eq!(ns.parameters.get("dc").unwrap(), "5 +3");
    }

    #[test]
    fn test_chained_continuations() {
        let script = parse("m1 d g \\\ns b \\\nnmos\n+ W=1u\n");
        let ns = statement(&script, 0);
        assert_eq!(ns.nodes, vec!["d", "g", "s", "b", "nmos"]);
        assert_eq!(ns.parameters.get("W").unwrap(), "1u");
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let script = parse("// header comment\n\nr1 a b resistor R=1k // trailing\n\n");
        assert_eq!(script.items.len(), 1);
        assert_eq!(statement(&script, 0).parameters.get("R").unwrap(), "1k");
    }

    #[test]
    fn test_parens_removed_before_equals_only() {
        let script = parse("sens (VO1 VO2) to (R0 R1)\nport1 in 0 port z=(50 0)\n");
        let sens = statement(&script, 0);
        assert_eq!(sens.nodes, vec!["VO1", "VO2", "to", "R0", "R1"]);
        let port = statement(&script, 1);
        assert_eq!(port.parameters.get("z").unwrap(), "(50 0)");
    }

    #[test]
    fn test_keyword_block() {
        let script = parse("subckt inv in out\nm1 out in 0 0 nmos\nends inv\nr1 a b resistor\n");
        assert_eq!(script.items.len(), 2);
        let block = script.items[0].as_block().unwrap();
        assert_eq!(block.len(), 3);
        assert_eq!(block[0].as_statement().unwrap().name, "subckt");
        assert_eq!(block[0].as_statement().unwrap().nodes[0], "inv");
        assert_eq!(block[1].as_statement().unwrap().name, "m1");
        assert_eq!(block[2].as_statement().unwrap().name, "ends");
        assert_eq!(statement(&script, 1).name, "r1");
    }

    #[test]
    fn test_brace_block() {
        let script = parse("opts1 options {\nreltol=1e-3\ntemp=27\n}\nr1 a b resistor\n");
        assert_eq!(script.items.len(), 2);
        let container = statement(&script, 0);
        assert_eq!(container.name, "opts1");
        assert_eq!(container.children.len(), 2);
        let first = container.children[0].as_statement().unwrap();
        assert_eq!(first.parameters.get("reltol").unwrap(), "1e-3");
    }

    #[test]
    fn test_nested_blocks() {
        let input = "subckt outer a\nsubckt inner b\nr1 x y resistor\nends inner\nends outer\n";
        let script = parse(input);
        assert_eq!(script.items.len(), 1);
        let outer = script.items[0].as_block().unwrap();
        assert_eq!(outer[0].as_statement().unwrap().nodes[0], "outer");
        let inner = outer[1].as_block().unwrap();
        assert_eq!(inner[0].as_statement().unwrap().nodes[0], "inner");
        assert_eq!(inner[2].as_statement().unwrap().name, "ends");
    }

    #[test]
    fn test_brace_inside_keyword_block() {
        let input = "section fast\nopts options {\ntemp=27\n}\nendsection\n";
        let script = parse(input);
        let block = script.items[0].as_block().unwrap();
        assert_eq!(block.len(), 3);
        let container = block[1].as_statement().unwrap();
        assert_eq!(container.children.len(), 1);
    }

    #[test]
    fn test_continued_block_header() {
        let script = parse("subckt inv \\\nin out\nr1 in out resistor\nends\n");
        let block = script.items[0].as_block().unwrap();
        let open = block[0].as_statement().unwrap();
        assert_eq!(open.nodes, vec!["inv", "in", "out"]);
    }

    #[test]
    fn test_eof_flushes_pending() {
        let script = parse("r1 a b resistor R=1k");
        assert_eq!(script.items.len(), 1);
    }

    #[test]
    fn test_unterminated_keyword_block() {
        let err = Parser::new("subckt inv in\nr1 a b resistor\n")
            .parse()
            .unwrap_err();
        assert!(matches!(err, ScsError::UnterminatedBlock { line: 1 }));
    }

    #[test]
    fn test_unterminated_brace_block() {
        let err = Parser::new("r1 a b resistor\nopts options {\ntemp=27\n")
            .parse()
            .unwrap_err();
        assert!(matches!(err, ScsError::UnterminatedBlock { line: 2 }));
    }

    #[test]
    fn test_malformed_statement_reports_line() {
        let err = Parser::new("r1 a b resistor\n= 5\n").parse().unwrap_err();
        assert!(matches!(err, ScsError::MalformedStatement { line: 2, .. }));
    }
}
