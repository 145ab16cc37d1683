//! The parsed netlist document.

use super::statement::{Item, Statement};

/// An ordered netlist document: the parse result and the unit the query
/// engine operates on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    /// Top-level statements and keyword blocks, in source order
    pub items: Vec<Item>,
}

impl Script {
    /// Create an empty script.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of top-level items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the script holds nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the top-level items.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Append a statement at the end.
    pub fn add(&mut self, ns: Statement) {
        self.items.push(Item::Statement(ns));
    }

    /// Insert a statement at a top-level position.
    pub fn insert(&mut self, index: usize, ns: Statement) {
        self.items.insert(index, Item::Statement(ns));
    }

    /// Append every item of another script.
    pub fn extend(&mut self, other: Script) {
        self.items.extend(other.items);
    }

    /// All statements in the document, at any depth, in source order.
    pub fn statements(&self) -> Vec<&Statement> {
        let mut out = Vec::new();
        collect_statements(&self.items, &mut out);
        out
    }

    /// Run `f` over every statement in the document, at any depth.
    pub fn for_each_statement(&mut self, mut f: impl FnMut(&mut Statement)) {
        visit_statements(&mut self.items, &mut f);
    }

    /// Substitute a literal substring in every statement.
    pub fn replace_all(&mut self, old: &str, new: &str) {
        self.for_each_statement(|ns| ns.replace(old, new));
    }

    /// Apply [`Statement::change`] to every statement.
    pub fn change_all(&mut self, key: &str, value: &str) {
        self.for_each_statement(|ns| ns.change(key, value));
    }

    /// Scale a numeric parameter wherever it appears.
    pub fn scale_all(&mut self, param: &str, factor: f64) {
        self.for_each_statement(|ns| ns.scale(param, factor));
    }

    /// Insert or update a parameter on every statement.
    pub fn add_param_all(&mut self, key: &str, value: &str) {
        self.for_each_statement(|ns| ns.add_param(key, value));
    }

    /// Remove a parameter from every statement that has it.
    pub fn del_param_all(&mut self, key: &str) {
        self.for_each_statement(|ns| ns.del_param(key));
    }
}

fn collect_statements<'a>(items: &'a [Item], out: &mut Vec<&'a Statement>) {
    for item in items {
        match item {
            Item::Statement(ns) => {
                out.push(ns);
                collect_statements(&ns.children, out);
            }
            Item::Block(sub) => collect_statements(sub, out),
        }
    }
}

fn visit_statements(items: &mut [Item], f: &mut impl FnMut(&mut Statement)) {
    for item in items {
        match item {
            Item::Statement(ns) => {
                f(ns);
                visit_statements(&mut ns.children, f);
            }
            Item::Block(sub) => visit_statements(sub, f),
        }
    }
}
