//! Decoding of the value stream into typed series.

use std::str::Lines;
use std::sync::LazyLock;

use indexmap::IndexMap;
use num_complex::Complex64;
use regex::Regex;

use crate::number::scaled_float;

use super::preamble::{Preamble, Prop};

/// `"name" value` — one sweep-stream line.
static STREAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""(.+)"\s(.+)"#).unwrap());

/// `"name" "master" value` — one operating-point line.
static POINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(.+)"\s"(.+)"\s(.+)"#).unwrap());

/// `(re im)` — a complex literal, split at its last interior whitespace.
static COMPLEX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((.+)\s(.+)\)").unwrap());

/// A column of decoded values.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Float(Vec<f64>),
    Complex(Vec<Complex64>),
}

impl Series {
    pub fn len(&self) -> usize {
        match self {
            Series::Float(values) => values.len(),
            Series::Complex(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The values as floats, when this is a float series.
    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Series::Float(values) => Some(values),
            Series::Complex(_) => None,
        }
    }

    /// The values as complex numbers, when this is a complex series.
    pub fn as_complex(&self) -> Option<&[Complex64]> {
        match self {
            Series::Float(_) => None,
            Series::Complex(values) => Some(values),
        }
    }
}

/// Everything decoded for one trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceValues {
    /// A scalar trace: one series over the sweep.
    Series(Series),
    /// A struct trace: one series per declared subfield.
    Struct(IndexMap<String, Series>),
}

/// The decoded value stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    /// A single operating point of named values.
    Point(IndexMap<String, f64>),
    /// Per-trace series over the swept variable.
    Sweep(IndexMap<String, TraceValues>),
}

/// A fully parsed results file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsFile {
    pub preamble: Preamble,
    pub values: Values,
}

impl ResultsFile {
    /// Names carrying decoded values, in file order. In sweep mode this
    /// includes the sweep variable itself.
    pub fn trace_names(&self) -> Vec<&str> {
        match &self.values {
            Values::Point(point) => point.keys().map(String::as_str).collect(),
            Values::Sweep(data) => data.keys().map(String::as_str).collect(),
        }
    }

    /// Decoded values of one sweep trace.
    pub fn trace(&self, name: &str) -> Option<&TraceValues> {
        match &self.values {
            Values::Sweep(data) => data.get(name),
            Values::Point(_) => None,
        }
    }

    /// The swept variable's decoded points.
    pub fn sweep_series(&self) -> Option<&[f64]> {
        match self.trace(self.preamble.sweep_var()?)? {
            TraceValues::Series(Series::Float(values)) => Some(values),
            _ => None,
        }
    }
}

/// Decode the value stream in the mode the preamble dictates: sweep series
/// when a `SWEEP` section is present, a single operating point otherwise.
/// `filter` restricts decoding to one trace; the sweep variable is always
/// decoded.
pub(crate) fn decode(lines: &mut Lines<'_>, preamble: &Preamble, filter: Option<&str>) -> Values {
    if preamble.sweep.is_some() {
        Values::Sweep(decode_sweep(lines, preamble, filter))
    } else {
        Values::Point(decode_point(lines, filter))
    }
}

fn decode_point(lines: &mut Lines<'_>, filter: Option<&str>) -> IndexMap<String, f64> {
    let mut point = IndexMap::new();
    while let Some(line) = lines.next() {
        let caps = match POINT_RE.captures(line) {
            Some(caps) => caps,
            None => continue,
        };
        let net = &caps[1];
        if filter.map_or(false, |want| want != net) {
            continue;
        }
        match scaled_float(&caps[3]) {
            Some(value) => {
                point.insert(net.to_string(), value);
            }
            None => tracing::debug!(net = %net, "skipping non-numeric point value"),
        }
    }
    point
}

fn decode_sweep(
    lines: &mut Lines<'_>,
    preamble: &Preamble,
    filter: Option<&str>,
) -> IndexMap<String, TraceValues> {
    // Pre-build one accumulator per decodable trace, the sweep variable
    // first. Traces with no decoder keep no accumulator and their stream
    // lines fall through.
    let mut data: IndexMap<String, TraceValues> = IndexMap::new();
    if let Some(var) = preamble.sweep_var() {
        data.insert(
            var.to_string(),
            TraceValues::Series(Series::Float(Vec::new())),
        );
    }
    for name in preamble.traces.keys() {
        if filter.map_or(false, |want| want != name.as_str()) {
            continue;
        }
        let slot = match preamble.trace_type(name) {
            Some(Prop::Scalar { kind, .. }) if kind == "FLOAT DOUBLE" => {
                TraceValues::Series(Series::Float(Vec::new()))
            }
            Some(Prop::Scalar { kind, .. }) if kind == "COMPLEX DOUBLE" => {
                TraceValues::Series(Series::Complex(Vec::new()))
            }
            Some(Prop::Struct(fields)) => TraceValues::Struct(struct_series(fields)),
            Some(_) => {
                tracing::debug!(trace = %name, "trace kind has no decoder, ignoring");
                continue;
            }
            None => {
                tracing::debug!(trace = %name, "trace has no resolvable type, ignoring");
                continue;
            }
        };
        data.insert(name.clone(), slot);
    }

    // A struct trace's line opens a body where each bare value feeds the
    // next subfield in declaration order, until a lone ')'.
    let mut cursor: Option<(String, usize)> = None;
    while let Some(line) = lines.next() {
        if let Some((name, index)) = cursor.take() {
            let text = line.trim();
            if text == ")" {
                continue;
            }
            append_struct_field(&mut data, &name, index, text);
            cursor = Some((name, index + 1));
            continue;
        }
        let caps = match STREAM_RE.captures(line) {
            Some(caps) => caps,
            None => continue,
        };
        match data.get_mut(&caps[1]) {
            Some(TraceValues::Series(series)) => append_scalar(series, &caps[2]),
            Some(TraceValues::Struct(_)) => cursor = Some((caps[1].to_string(), 0)),
            None => {}
        }
    }
    data
}

/// Empty series for a struct type's subfields, complex where the subfield
/// kind says so, float for everything else. Every declared field gets a
/// series so that positional struct rows stay aligned.
fn struct_series(fields: &IndexMap<String, Prop>) -> IndexMap<String, Series> {
    fields
        .iter()
        .map(|(field, prop)| {
            let series = match prop {
                Prop::Scalar { kind, .. } if kind == "COMPLEX DOUBLE" => {
                    Series::Complex(Vec::new())
                }
                _ => Series::Float(Vec::new()),
            };
            (field.clone(), series)
        })
        .collect()
}

fn append_struct_field(
    data: &mut IndexMap<String, TraceValues>,
    name: &str,
    index: usize,
    text: &str,
) {
    if let Some(TraceValues::Struct(fields)) = data.get_mut(name) {
        match fields.get_index_mut(index) {
            Some((_, series)) => append_scalar(series, text),
            None => tracing::warn!(trace = %name, "struct row longer than its declared fields"),
        }
    }
}

fn append_scalar(series: &mut Series, text: &str) {
    match series {
        Series::Float(values) => match scaled_float(text) {
            Some(value) => values.push(value),
            None => tracing::debug!(value = %text, "skipping undecodable value"),
        },
        Series::Complex(values) => match parse_complex(text) {
            Some(value) => values.push(value),
            None => tracing::warn!(value = %text, "skipping malformed complex value"),
        },
    }
}

fn parse_complex(text: &str) -> Option<Complex64> {
    let caps = COMPLEX_RE.captures(text)?;
    let real = scaled_float(&caps[1])?;
    let imag = scaled_float(&caps[2])?;
    Some(Complex64::new(real, imag))
}
