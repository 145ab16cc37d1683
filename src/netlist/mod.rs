//! Parsing, manipulation and serialization of circuit-description scripts.
//!
//! The dialect is line-oriented. A physical line is first stripped of
//! comments and parentheses, then joined with its continuations, and the
//! resulting logical line is split into name, node list and `key=value`
//! parameters:
//!
//! | Source construct        | Meaning                                      |
//! |-------------------------|----------------------------------------------|
//! | `// text`               | comment, runs to end of line                 |
//! | trailing `\`            | logical line continues on the next line      |
//! | leading `+`             | this line continues the previous one         |
//! | `subckt … ends`         | keyword block, may nest                      |
//! | `section … endsection`  | keyword block, may nest                      |
//! | `header {` … `}`        | brace container owned by its header          |
//!
//! Parentheses are cosmetic node grouping and are removed, but only up to
//! the first `=` so that parenthesized parameter values survive intact.
//!
//! ```
//! use scscript::netlist;
//!
//! let script = netlist::parse("r1 in out resistor R=1k\n").unwrap();
//! let stmt = script.statements()[0];
//! assert_eq!(stmt.name, "r1");
//! assert_eq!(stmt.parameters["R"], "1k");
//! ```

mod parser;
mod script;
mod statement;
mod writer;

use std::fs;
use std::path::Path;

use crate::error::{Result, ScsError};

pub use parser::Parser;
pub use script::Script;
pub use statement::{Item, Statement};
pub use writer::GENERATED_HEADER;

/// Parse netlist text into a [`Script`].
pub fn parse(input: &str) -> Result<Script> {
    Parser::new(input).parse()
}

/// Read and parse a netlist file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Script> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading netlist");
    let input = fs::read_to_string(path).map_err(|e| ScsError::file_read(path, e))?;
    parse(&input)
}
