//! # scscript
//!
//! Parsing, querying and rewriting of Spectre-style circuit-description
//! scripts, plus a typed reader for PSF-ASCII simulation results.
//!
//! This library provides:
//! - A structural parser and serializer for the line-continuation netlist
//!   grammar (`//` comments, `\` and `+` continuations, `subckt`/`section`
//!   blocks, `header { … }` containers)
//! - A query engine over parsed scripts: wildcard or regex field matching,
//!   numeric value predicates, and bulk mutation of the matches
//! - A results reader that decodes sweep traces into typed float and
//!   complex series
//! - A parser for unit-suffixed numbers (`1k`, `100f`, `2.2p`)
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`netlist`] - Parser, statement tree, and serializer for scripts
//! - [`query`] - Search, selection and bulk edits over a [`Script`]
//! - [`results`] - Preamble and value-stream reader for results files
//! - [`number`] - Unit-scaled number parsing
//!
//! ## Usage
//!
//! ```
//! use scscript::{netlist, Query};
//!
//! let mut script = netlist::parse("R1 vid 0 resistor R=1k\n").unwrap();
//! let hits = script.search(&Query::new().with_name("R*")).unwrap();
//! assert_eq!(hits.len(), 1);
//!
//! script.scale_all("R", 2.0);
//! assert_eq!(script.to_string(), "R1 vid 0 resistor R=2000\n");
//! ```

pub mod error;
pub mod netlist;
pub mod number;
pub mod query;
pub mod results;

// Re-export the main types for convenience
pub use error::{Result, ScsError};
pub use netlist::{Item, Script, Statement};
pub use number::scaled_float;
pub use query::{Descend, ParamValue, Query, Selection};
pub use results::ResultsFile;
