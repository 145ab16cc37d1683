//! Preamble sections of a results file.

use std::str::Lines;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{Result, ScsError};

/// Lines that end the current section and name the next one.
const SENTINELS: [&str; 6] = [")", "TYPE", "SWEEP", "TRACE", "VALUE", "END"];

/// `"name" KIND PROP(` / `"name" STRUCT(` — a typed entry opening a block.
static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(.+?)"(.*)\s(\w+)\("#).unwrap());

/// `"name" "value"` — a plain string property.
static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""(.+)"\s+"(.+)""#).unwrap());

/// One preamble entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    /// A plain `"name" "value"` string property.
    Value(String),
    /// A typed entry, `"name" KIND PROP( … )`, with its own property block.
    Scalar {
        kind: String,
        props: IndexMap<String, String>,
    },
    /// A compound entry, `"name" STRUCT( … )`, of named sub-entries.
    Struct(IndexMap<String, Prop>),
}

/// The decoded preamble of a results file.
#[derive(Debug, Clone, PartialEq)]
pub struct Preamble {
    /// File-level properties
    pub header: IndexMap<String, Prop>,
    /// Value type declarations
    pub types: IndexMap<String, Prop>,
    /// The swept variable; present only when the analysis sweeps
    pub sweep: Option<IndexMap<String, Prop>>,
    /// Output name → type reference declarations
    pub traces: IndexMap<String, Prop>,
}

impl Preamble {
    /// Name of the swept variable: the first key of the `SWEEP` section.
    pub fn sweep_var(&self) -> Option<&str> {
        self.sweep
            .as_ref()
            .and_then(|props| props.keys().next())
            .map(String::as_str)
    }

    /// Resolve a trace to its `TYPE` entry. A plain trace names its type
    /// directly; a `PROP`'d trace names it through its `units` property,
    /// with the entry's own kind text as a fallback.
    pub fn trace_type(&self, name: &str) -> Option<&Prop> {
        let key: &str = match self.traces.get(name)? {
            Prop::Value(text) => text,
            Prop::Scalar { kind, props } => match props.get("units") {
                Some(units) => units,
                None => {
                    tracing::warn!(trace = name, "trace has no units property, using its kind");
                    kind.trim_matches('"')
                }
            },
            Prop::Struct(_) => return None,
        };
        self.types.get(key)
    }
}

/// Read preamble sections until the value stream starts. The section order
/// is `HEADER`, then any of `TYPE`/`SWEEP`/`TRACE`, ending at `VALUE` or
/// `END`; anything else is an error.
pub(crate) fn parse(lines: &mut Lines<'_>) -> Result<Preamble> {
    let mut preamble = Preamble {
        header: IndexMap::new(),
        types: IndexMap::new(),
        sweep: None,
        traces: IndexMap::new(),
    };
    let mut section = String::from("HEADER");
    loop {
        let (props, sentinel) = match section.as_str() {
            "VALUE" | "END" => return Ok(preamble),
            "HEADER" | "TYPE" | "SWEEP" | "TRACE" => parse_props(lines),
            other => return Err(ScsError::unknown_section(other)),
        };
        match section.as_str() {
            "HEADER" => preamble.header = props,
            "TYPE" => preamble.types = props,
            "SWEEP" => preamble.sweep = Some(props),
            _ => preamble.traces = props,
        }
        section = sentinel.ok_or(ScsError::TruncatedResults)?;
    }
}

/// Parse property entries until a sentinel line (returned) or end of input
/// (`None`). Unrecognized lines, the leading `HEADER` line included, are
/// skipped.
fn parse_props(lines: &mut Lines<'_>) -> (IndexMap<String, Prop>, Option<String>) {
    let mut props = IndexMap::new();
    while let Some(line) = lines.next() {
        let line = line.trim();
        if SENTINELS.contains(&line) {
            return (props, Some(line.to_string()));
        }
        if let Some(caps) = ENTRY_RE.captures(line) {
            let name = caps[1].to_string();
            match &caps[3] {
                "STRUCT" => {
                    let (fields, _) = parse_props(lines);
                    props.insert(name, Prop::Struct(fields));
                }
                "PROP" => {
                    let (pairs, _) = parse_flat(lines);
                    let kind = caps[2].trim().to_string();
                    props.insert(name, Prop::Scalar { kind, props: pairs });
                }
                _ => {}
            }
        } else if let Some(caps) = PAIR_RE.captures(line) {
            props.insert(caps[1].to_string(), Prop::Value(caps[2].to_string()));
        }
    }
    (props, None)
}

/// Parse a flat `"name" "value"` block, as found inside `PROP( … )`.
fn parse_flat(lines: &mut Lines<'_>) -> (IndexMap<String, String>, Option<String>) {
    let mut pairs = IndexMap::new();
    while let Some(line) = lines.next() {
        let line = line.trim();
        if SENTINELS.contains(&line) {
            return (pairs, Some(line.to_string()));
        }
        if let Some(caps) = PAIR_RE.captures(line) {
            pairs.insert(caps[1].to_string(), caps[2].to_string());
        }
    }
    (pairs, None)
}
