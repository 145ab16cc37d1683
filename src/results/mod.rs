//! Typed reader for PSF-ASCII style simulation results.
//!
//! A results file is a run of preamble sections followed by the value
//! stream:
//!
//! | Section  | Contents                                        |
//! |----------|-------------------------------------------------|
//! | `HEADER` | file-level properties                           |
//! | `TYPE`   | value type declarations, scalar or struct       |
//! | `SWEEP`  | the swept variable, when the analysis sweeps    |
//! | `TRACE`  | output name → type declarations                 |
//! | `VALUE`  | the data, one point or one line per sweep step  |
//!
//! The shape of the decoded [`Values`] follows the preamble: with a `SWEEP`
//! section every trace accumulates a [`Series`] over the sweep points,
//! otherwise the stream is a single operating point of named floats.

mod preamble;
mod value;

pub use preamble::{Preamble, Prop};
pub use value::{ResultsFile, Series, TraceValues, Values};

use std::fs;
use std::path::Path;

use crate::error::{Result, ScsError};

/// Parse results text.
pub fn parse(input: &str) -> Result<ResultsFile> {
    parse_filtered(input, None)
}

/// Parse results text, decoding only the named trace. The sweep variable is
/// always decoded alongside it.
pub fn parse_trace(input: &str, trace: &str) -> Result<ResultsFile> {
    parse_filtered(input, Some(trace))
}

/// Read and parse a results file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ResultsFile> {
    parse(&read(path.as_ref())?)
}

/// Read and parse a results file, decoding only the named trace.
pub fn parse_trace_file(path: impl AsRef<Path>, trace: &str) -> Result<ResultsFile> {
    parse_trace(&read(path.as_ref())?, trace)
}

fn read(path: &Path) -> Result<String> {
    tracing::debug!(path = %path.display(), "reading results");
    fs::read_to_string(path).map_err(|e| ScsError::file_read(path, e))
}

fn parse_filtered(input: &str, trace: Option<&str>) -> Result<ResultsFile> {
    let mut lines = input.lines();
    let preamble = preamble::parse(&mut lines)?;
    let values = value::decode(&mut lines, &preamble, trace);
    Ok(ResultsFile { preamble, values })
}
