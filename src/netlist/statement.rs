//! Statement tree types for the netlist description language.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{Result, ScsError};
use crate::number::{format_float, scaled_float};

/// One element of a statement sequence.
///
/// Keyword-delimited regions (`subckt … ends`, `section … endsection`) parse
/// to [`Item::Block`], whose sequence holds the opening statement, the body,
/// and the closing statement. Brace-introduced regions hang off their header
/// statement's `children` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A single statement (possibly a brace container).
    Statement(Statement),
    /// A keyword-delimited region, open and close statements included.
    Block(Vec<Item>),
}

impl Item {
    /// The statement inside, if this item is one.
    pub fn as_statement(&self) -> Option<&Statement> {
        match self {
            Item::Statement(ns) => Some(ns),
            Item::Block(_) => None,
        }
    }

    /// The block sequence inside, if this item is one.
    pub fn as_block(&self) -> Option<&[Item]> {
        match self {
            Item::Statement(_) => None,
            Item::Block(items) => Some(items),
        }
    }
}

impl From<Statement> for Item {
    fn from(ns: Statement) -> Self {
        Item::Statement(ns)
    }
}

/// One record of the netlist description language.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Statement name, the primary key for most matching
    pub name: String,
    /// Connected node/reference names, order-significant
    pub nodes: Vec<String>,
    /// Parameter name → value text, insertion-ordered
    pub parameters: IndexMap<String, String>,
    /// Body of a brace-introduced region, empty otherwise
    pub children: Vec<Item>,
}

impl Statement {
    /// Create a statement with a name and nothing else.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            parameters: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Parse a single logical line into a statement.
    ///
    /// This is the field splitter only: continuations, comments, and brace
    /// handling belong to the full parser. Supports both statement forms:
    ///
    /// ```text
    /// name [node0 node1 ...]
    /// name [node0 node1 ...] [master] param0=val0 param1=val1 ...
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_at(text, 1)
    }

    pub(crate) fn parse_at(text: &str, line: usize) -> Result<Self> {
        let segments: Vec<&str> = text.split('=').collect();
        if segments.len() == 1 {
            // No parameters: name followed by nodes.
            let mut tokens = text.split_whitespace();
            let name = tokens
                .next()
                .ok_or_else(|| ScsError::malformed(line, text))?;
            let mut ns = Self::new(name);
            ns.nodes = tokens.map(str::to_string).collect();
            return Ok(ns);
        }

        // The last whitespace token before the first '=' is the first
        // parameter key; with a single head token it doubles as the name.
        let head: Vec<&str> = segments[0].split_whitespace().collect();
        if head.is_empty() {
            return Err(ScsError::malformed(line, text));
        }
        let mut ns = Self::new(head[0]);
        if head.len() >= 3 {
            ns.nodes = head[1..head.len() - 1]
                .iter()
                .map(|s| s.to_string())
                .collect();
        }
        let mut key = head[head.len() - 1].to_string();

        let tail = &segments[1..];
        for (index, segment) in tail.iter().enumerate() {
            if index == tail.len() - 1 {
                // Final segment: value text kept verbatim, ends trimmed.
                ns.parameters.insert(key, segment.trim().to_string());
                break;
            }
            // Interior segment: everything but the last token is the value
            // of the previous key; the last token is the next key.
            let tokens: Vec<&str> = segment.split_whitespace().collect();
            let (next_key, value_tokens) = tokens
                .split_last()
                .ok_or_else(|| ScsError::malformed(line, text))?;
            ns.parameters.insert(key, value_tokens.join(" "));
            key = next_key.to_string();
        }
        Ok(ns)
    }

    /// The master (template/model) reference: the last node, or `""`.
    pub fn master(&self) -> &str {
        self.nodes.last().map(String::as_str).unwrap_or("")
    }

    /// Rewrite the master. Creates the single node when none exist; an
    /// empty value leaves the statement untouched.
    pub fn set_master(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        match self.nodes.last_mut() {
            Some(last) => *last = value,
            None => self.nodes.push(value),
        }
    }

    /// True when this statement introduces a brace region.
    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }

    /// Substitute a literal substring in the name, every node, and every
    /// parameter key and value. Children are not touched.
    pub fn replace(&mut self, old: &str, new: &str) {
        self.name = self.name.replace(old, new);
        for node in &mut self.nodes {
            *node = node.replace(old, new);
        }
        let parameters = std::mem::take(&mut self.parameters);
        self.parameters = parameters
            .into_iter()
            .map(|(key, value)| (key.replace(old, new), value.replace(old, new)))
            .collect();
    }

    /// Rewrite whichever field equals `key`, first match wins:
    /// the literal keyword `name`, the literal keyword `master`, every node
    /// equal to `key`, then a parameter named `key`.
    pub fn change(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if key == "name" {
            self.name = value;
        } else if key == "master" {
            self.set_master(value);
        } else if self.nodes.iter().any(|node| node == key) {
            for node in &mut self.nodes {
                if node == key {
                    *node = value.clone();
                }
            }
        } else if let Some(slot) = self.parameters.get_mut(key) {
            *slot = value;
        }
    }

    /// Multiply a numeric parameter by `factor`. Missing parameters and
    /// non-numeric (expression) values are left alone.
    pub fn scale(&mut self, param: &str, factor: f64) {
        if let Some(value) = self.parameters.get_mut(param) {
            if let Some(numeric) = scaled_float(value) {
                *value = format_float(numeric * factor);
            }
        }
    }

    /// Insert or update a parameter.
    pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(key.into(), value.into());
    }

    /// Remove a parameter if present, keeping the order of the rest.
    pub fn del_param(&mut self, key: &str) {
        self.parameters.shift_remove(key);
    }
}

impl fmt::Display for Statement {
    /// Render as a single netlist line: `name node0 … key0=val0 …`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for node in &self.nodes {
            write!(f, " {}", node)?;
        }
        for (key, value) in &self.parameters {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}
