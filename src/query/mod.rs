//! Searching and bulk-editing statements in a parsed [`Script`].
//!
//! A [`Query`] is a conjunction of optional field filters:
//!
//! | Filter   | Matches when                                        |
//! |----------|-----------------------------------------------------|
//! | `name`   | the statement name matches the pattern              |
//! | `master` | the last node matches                               |
//! | `node`   | any node matches                                    |
//! | `param`  | any parameter key matches                           |
//! | `value`  | any parameter value matches (text or numeric)       |
//!
//! `param` and `value` given together must hit the same parameter. Patterns
//! are `*` wildcards by default; [`Query::with_regex`] switches every pattern
//! in the query, the descend discriminator included, to anchored regular
//! expressions.
//!
//! [`Descend`] widens a search past the top level: `Yes` also considers the
//! direct statement members of keyword blocks and brace containers (one
//! level down, no further), while `IfMatches(pattern)` matches nothing at
//! the top level and looks only inside regions whose first node — for a
//! `subckt`, its name — matches the pattern.
//!
//! ```
//! use scscript::{netlist, Descend, Query};
//!
//! let script = netlist::parse("subckt inv in out\nm1 out in 0 nmos\nends inv\n").unwrap();
//! let query = Query::new().with_name("m*").with_descend(Descend::Yes);
//! assert_eq!(script.search(&query).unwrap().len(), 1);
//! ```

mod pattern;

pub use pattern::{ParamValue, Pattern};

use crate::error::Result;
use crate::netlist::{Item, Script, Statement};
use crate::number::scaled_float;

/// Where a search looks beyond the top-level statement sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Descend {
    /// Top-level statements only; blocks and container bodies are skipped.
    #[default]
    No,
    /// Also the direct statement members of top-level blocks and containers.
    /// A container whose own fields match is taken itself and not entered.
    Yes,
    /// Only inside regions whose identity matches this pattern; top-level
    /// statements themselves never match.
    IfMatches(String),
}

/// A conjunction of field filters, built up with the `with_*` methods.
/// An empty query matches every statement the descend mode reaches.
#[derive(Debug, Default)]
pub struct Query {
    name: Option<String>,
    master: Option<String>,
    node: Option<String>,
    param: Option<String>,
    value: Option<ParamValue>,
    regex: bool,
    descend: Descend,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on the statement name.
    pub fn with_name(mut self, pattern: impl Into<String>) -> Self {
        self.name = Some(pattern.into());
        self
    }

    /// Filter on the master (last node).
    pub fn with_master(mut self, pattern: impl Into<String>) -> Self {
        self.master = Some(pattern.into());
        self
    }

    /// Filter on any connected node.
    pub fn with_node(mut self, pattern: impl Into<String>) -> Self {
        self.node = Some(pattern.into());
        self
    }

    /// Filter on a parameter key.
    pub fn with_param(mut self, pattern: impl Into<String>) -> Self {
        self.param = Some(pattern.into());
        self
    }

    /// Filter on a parameter value, textual or numeric.
    pub fn with_value(mut self, value: impl Into<ParamValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Filter on a numeric predicate over parameter values. Only meaningful
    /// together with [`Query::with_param`]; a bare predicate matches nothing.
    pub fn with_predicate(mut self, f: impl Fn(f64) -> bool + 'static) -> Self {
        self.value = Some(ParamValue::predicate(f));
        self
    }

    /// Interpret every pattern in this query as a regular expression.
    pub fn with_regex(mut self) -> Self {
        self.regex = true;
        self
    }

    /// Set where the search descends.
    pub fn with_descend(mut self, descend: Descend) -> Self {
        self.descend = descend;
        self
    }

    fn compile(&self) -> Result<CompiledQuery<'_>> {
        Ok(CompiledQuery {
            name: compile_field(&self.name, self.regex)?,
            master: compile_field(&self.master, self.regex)?,
            node: compile_field(&self.node, self.regex)?,
            param: compile_field(&self.param, self.regex)?,
            value: match &self.value {
                Some(ParamValue::Text(text)) => {
                    Some(CompiledValue::Text(Pattern::new(text, self.regex)?))
                }
                Some(ParamValue::Predicate(f)) => Some(CompiledValue::Predicate(f.as_ref())),
                None => None,
            },
            descend: match &self.descend {
                Descend::No => CompiledDescend::No,
                Descend::Yes => CompiledDescend::Yes,
                Descend::IfMatches(pat) => {
                    CompiledDescend::IfMatches(Pattern::new(pat, self.regex)?)
                }
            },
        })
    }
}

fn compile_field(pattern: &Option<String>, regex: bool) -> Result<Option<Pattern>> {
    match pattern {
        Some(text) => Pattern::new(text, regex).map(Some),
        None => Ok(None),
    }
}

enum CompiledValue<'q> {
    Text(Pattern),
    Predicate(&'q dyn Fn(f64) -> bool),
}

impl CompiledValue<'_> {
    fn matches(&self, text: &str) -> bool {
        match self {
            CompiledValue::Text(pat) => pat.matches(text),
            CompiledValue::Predicate(f) => match scaled_float(text) {
                Some(num) => f(num),
                None => false,
            },
        }
    }
}

enum CompiledDescend {
    No,
    Yes,
    IfMatches(Pattern),
}

struct CompiledQuery<'q> {
    name: Option<Pattern>,
    master: Option<Pattern>,
    node: Option<Pattern>,
    param: Option<Pattern>,
    value: Option<CompiledValue<'q>>,
    descend: CompiledDescend,
}

impl CompiledQuery<'_> {
    fn matches(&self, ns: &Statement) -> bool {
        if let Some(pat) = &self.name {
            if !pat.matches(&ns.name) {
                return false;
            }
        }
        if let Some(pat) = &self.master {
            // A master filter only ever matches statements that have one;
            // without nodes there is no master for even "*" to hit.
            if ns.master().is_empty() || !pat.matches(ns.master()) {
                return false;
            }
        }
        if let Some(pat) = &self.node {
            if !ns.nodes.iter().any(|node| pat.matches(node)) {
                return false;
            }
        }
        match (&self.param, &self.value) {
            // Key and value must belong to the same parameter.
            (Some(param), Some(value)) => ns
                .parameters
                .iter()
                .any(|(k, v)| param.matches(k) && value.matches(v)),
            (Some(param), None) => ns.parameters.keys().any(|k| param.matches(k)),
            (None, Some(CompiledValue::Text(pat))) => {
                ns.parameters.values().any(|v| pat.matches(v))
            }
            // A predicate with no key filter matches nothing.
            (None, Some(CompiledValue::Predicate(_))) => false,
            (None, None) => true,
        }
    }
}

/// The first node of the statement introducing a region: for a keyword block
/// the block's opening statement, for a container the header itself.
fn region_ident(item: &Item) -> Option<&str> {
    let intro = match item {
        Item::Statement(ns) => ns,
        Item::Block(sub) => sub.first()?.as_statement()?,
    };
    intro.nodes.first().map(String::as_str)
}

impl Script {
    /// Collect references to every statement matching `query`, in document
    /// order.
    pub fn search(&self, query: &Query) -> Result<Vec<&Statement>> {
        let cq = query.compile()?;
        let mut found = Vec::new();
        match &cq.descend {
            CompiledDescend::No => {
                for item in &self.items {
                    if let Item::Statement(ns) = item {
                        if cq.matches(ns) {
                            found.push(ns);
                        }
                    }
                }
            }
            CompiledDescend::Yes => {
                for item in &self.items {
                    match item {
                        Item::Statement(ns) => {
                            if cq.matches(ns) {
                                found.push(ns);
                            } else {
                                for child in &ns.children {
                                    if let Item::Statement(c) = child {
                                        if cq.matches(c) {
                                            found.push(c);
                                        }
                                    }
                                }
                            }
                        }
                        Item::Block(sub) => {
                            for member in sub {
                                if let Item::Statement(c) = member {
                                    if cq.matches(c) {
                                        found.push(c);
                                    }
                                }
                            }
                        }
                    }
                }
            }
            CompiledDescend::IfMatches(pat) => {
                for item in &self.items {
                    if !region_ident(item).map_or(false, |id| pat.matches(id)) {
                        continue;
                    }
                    let members: &[Item] = match item {
                        Item::Statement(ns) => &ns.children,
                        Item::Block(sub) => sub,
                    };
                    for member in members {
                        if let Item::Statement(c) = member {
                            if cq.matches(c) {
                                found.push(c);
                            }
                        }
                    }
                }
            }
        }
        Ok(found)
    }

    /// Like [`Script::search`], but yields a mutable [`Selection`] carrying
    /// the bulk mutators.
    pub fn select(&mut self, query: &Query) -> Result<Selection<'_>> {
        let cq = query.compile()?;
        let mut picked: Vec<&mut Statement> = Vec::new();
        match &cq.descend {
            CompiledDescend::No => {
                for item in self.items.iter_mut() {
                    if let Item::Statement(ns) = item {
                        if cq.matches(ns) {
                            picked.push(ns);
                        }
                    }
                }
            }
            CompiledDescend::Yes => {
                for item in self.items.iter_mut() {
                    match item {
                        Item::Statement(ns) => {
                            if cq.matches(ns) {
                                picked.push(ns);
                            } else {
                                for child in ns.children.iter_mut() {
                                    if let Item::Statement(c) = child {
                                        if cq.matches(c) {
                                            picked.push(c);
                                        }
                                    }
                                }
                            }
                        }
                        Item::Block(sub) => {
                            for member in sub.iter_mut() {
                                if let Item::Statement(c) = member {
                                    if cq.matches(c) {
                                        picked.push(c);
                                    }
                                }
                            }
                        }
                    }
                }
            }
            CompiledDescend::IfMatches(pat) => {
                for item in self.items.iter_mut() {
                    if !region_ident(item).map_or(false, |id| pat.matches(id)) {
                        continue;
                    }
                    let members: &mut [Item] = match item {
                        Item::Statement(ns) => &mut ns.children,
                        Item::Block(sub) => sub,
                    };
                    for member in members.iter_mut() {
                        if let Item::Statement(c) = member {
                            if cq.matches(c) {
                                picked.push(c);
                            }
                        }
                    }
                }
            }
        }
        Ok(Selection { picked })
    }

    /// Delete every statement matching `query` and return how many were
    /// removed. A matching container goes with its whole body (counted as
    /// one); a keyword block whose members are all removed disappears.
    pub fn remove(&mut self, query: &Query) -> Result<usize> {
        let cq = query.compile()?;
        let mut removed = 0;
        match &cq.descend {
            CompiledDescend::No => {
                self.items.retain(|item| match item {
                    Item::Statement(ns) if cq.matches(ns) => {
                        removed += 1;
                        false
                    }
                    _ => true,
                });
            }
            CompiledDescend::Yes => {
                self.items.retain_mut(|item| match item {
                    Item::Statement(ns) => {
                        if cq.matches(ns) {
                            removed += 1;
                            false
                        } else {
                            remove_members(&mut ns.children, &cq, &mut removed);
                            true
                        }
                    }
                    Item::Block(sub) => {
                        remove_members(sub, &cq, &mut removed);
                        !sub.is_empty()
                    }
                });
            }
            CompiledDescend::IfMatches(pat) => {
                self.items.retain_mut(|item| {
                    if !region_ident(item).map_or(false, |id| pat.matches(id)) {
                        return true;
                    }
                    match item {
                        Item::Statement(ns) => {
                            remove_members(&mut ns.children, &cq, &mut removed);
                            true
                        }
                        Item::Block(sub) => {
                            remove_members(sub, &cq, &mut removed);
                            !sub.is_empty()
                        }
                    }
                });
            }
        }
        Ok(removed)
    }
}

fn remove_members(members: &mut Vec<Item>, cq: &CompiledQuery<'_>, removed: &mut usize) {
    members.retain(|member| match member {
        Item::Statement(c) if cq.matches(c) => {
            *removed += 1;
            false
        }
        _ => true,
    });
}

/// Mutable handle over the statements picked out by [`Script::select`]. The
/// mutators apply their [`Statement`] counterpart to every selected
/// statement.
pub struct Selection<'a> {
    picked: Vec<&'a mut Statement>,
}

impl<'a> Selection<'a> {
    pub fn len(&self) -> usize {
        self.picked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picked.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.picked.iter().map(|ns| &**ns)
    }

    pub fn iter_mut<'s>(&'s mut self) -> impl Iterator<Item = &'s mut Statement> + use<'a, 's> {
        self.picked.iter_mut().map(|ns| &mut **ns)
    }

    /// Substitute a literal substring in every selected statement.
    pub fn replace(&mut self, old: &str, new: &str) {
        for ns in self.picked.iter_mut() {
            ns.replace(old, new);
        }
    }

    /// Apply [`Statement::change`] to every selected statement.
    pub fn change(&mut self, key: &str, value: &str) {
        for ns in self.picked.iter_mut() {
            ns.change(key, value);
        }
    }

    /// Scale a numeric parameter on every selected statement.
    pub fn scale(&mut self, param: &str, factor: f64) {
        for ns in self.picked.iter_mut() {
            ns.scale(param, factor);
        }
    }

    /// Insert or update a parameter on every selected statement.
    pub fn add_param(&mut self, key: &str, value: &str) {
        for ns in self.picked.iter_mut() {
            ns.add_param(key, value);
        }
    }

    /// Remove a parameter from every selected statement.
    pub fn del_param(&mut self, key: &str) {
        for ns in self.picked.iter_mut() {
            ns.del_param(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::parse;

    const DOC: &str = "\
simulator lang=spectre
r1 vid 0 resistor R=1k
R2 in out resistor R=2.2k
c1 out 0 capacitor c=100f
subckt inv in out
m1 out in 0 0 nmos W=1u L=0.1u
m2 out in vdd vdd pmos W=2u L=0.1u
ends inv
opts1 options {
temp=27
reltol=1e-3
}
x1 a y inv
";

    fn names(found: &[&Statement]) -> Vec<String> {
        found.iter().map(|ns| ns.name.clone()).collect()
    }

    #[test]
    fn test_search_by_name_wildcard() {
        let script = parse(DOC).unwrap();
        let found = script.search(&Query::new().with_name("R*")).unwrap();
        assert_eq!(names(&found), vec!["R2"]);
        let found = script.search(&Query::new().with_name("*1")).unwrap();
        assert_eq!(names(&found), vec!["r1", "c1", "opts1", "x1"]);
    }

    #[test]
    fn test_search_regex_mode() {
        let script = parse(DOC).unwrap();
        let star = Query::new().with_name("R*").with_regex();
        assert!(script.search(&star).unwrap().is_empty());
        let classes = Query::new().with_name("[rR][0-9]+").with_regex();
        assert_eq!(names(&script.search(&classes).unwrap()), vec!["r1", "R2"]);
    }

    #[test]
    fn test_search_by_node_and_master() {
        let script = parse(DOC).unwrap();
        let found = script.search(&Query::new().with_node("out")).unwrap();
        assert_eq!(names(&found), vec!["R2", "c1"]);
        let found = script.search(&Query::new().with_master("resistor")).unwrap();
        assert_eq!(names(&found), vec!["r1", "R2"]);
    }

    #[test]
    fn test_master_filter_needs_a_master() {
        // "simulator lang=spectre" has no nodes, so no master pattern can
        // select it, not even the match-anything wildcard.
        let script = parse(DOC).unwrap();
        let found = script.search(&Query::new().with_master("*")).unwrap();
        assert!(!names(&found).contains(&"simulator".to_string()));
        let found = script.search(&Query::new().with_node("*")).unwrap();
        assert!(!names(&found).contains(&"simulator".to_string()));
    }

    #[test]
    fn test_search_param_and_value_same_parameter() {
        let script = parse(DOC).unwrap();
        let found = script
            .search(&Query::new().with_param("R").with_value("2.2k"))
            .unwrap();
        assert_eq!(names(&found), vec!["R2"]);
        // The key and value filters must hit the same parameter.
        let found = script
            .search(&Query::new().with_param("c").with_value("2.2k"))
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_search_value_predicate() {
        let script = parse(DOC).unwrap();
        let over = Query::new().with_param("R").with_predicate(|v| v > 1500.0);
        assert_eq!(names(&script.search(&over).unwrap()), vec!["R2"]);
        // A predicate without a parameter key matches nothing.
        let bare = Query::new().with_predicate(|_| true);
        assert!(script.search(&bare).unwrap().is_empty());
    }

    #[test]
    fn test_predicate_skips_expression_values() {
        let script = parse("r1 a b resistor R=R0*2\nr2 a b resistor R=5k\n").unwrap();
        let any = Query::new().with_param("R").with_predicate(|v| v > 0.0);
        assert_eq!(names(&script.search(&any).unwrap()), vec!["r2"]);
    }

    #[test]
    fn test_descend_into_blocks() {
        let script = parse(DOC).unwrap();
        let query = Query::new().with_name("m*");
        assert!(script.search(&query).unwrap().is_empty());
        let query = query.with_descend(Descend::Yes);
        assert_eq!(names(&script.search(&query).unwrap()), vec!["m1", "m2"]);
    }

    #[test]
    fn test_descend_one_level_only() {
        let script = parse("outer o {\ninner i {\ndeep d x=1\n}\n}\n").unwrap();
        let inner = Query::new().with_name("inner").with_descend(Descend::Yes);
        assert_eq!(script.search(&inner).unwrap().len(), 1);
        let deep = Query::new().with_name("deep").with_descend(Descend::Yes);
        assert!(script.search(&deep).unwrap().is_empty());
    }

    #[test]
    fn test_descend_container_self_match_wins() {
        let script = parse(DOC).unwrap();
        let query = Query::new().with_name("opts1").with_descend(Descend::Yes);
        let found = script.search(&query).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].is_container());
    }

    #[test]
    fn test_descend_if_matches_region() {
        let script = parse(DOC).unwrap();
        let query = Query::new()
            .with_name("m*")
            .with_descend(Descend::IfMatches("inv".to_string()));
        assert_eq!(names(&script.search(&query).unwrap()), vec!["m1", "m2"]);
        // Wrong region identity: nothing is entered.
        let query = Query::new()
            .with_name("m*")
            .with_descend(Descend::IfMatches("buf".to_string()));
        assert!(script.search(&query).unwrap().is_empty());
        // Top-level statements themselves never match in this mode.
        let query = Query::new()
            .with_name("r1")
            .with_descend(Descend::IfMatches("*".to_string()));
        assert!(script.search(&query).unwrap().is_empty());
    }

    #[test]
    fn test_empty_query_matches_reachable_statements() {
        let script = parse(DOC).unwrap();
        let top = script.search(&Query::new()).unwrap();
        assert_eq!(names(&top), vec!["simulator", "r1", "R2", "c1", "opts1", "x1"]);
    }

    #[test]
    fn test_select_and_bulk_scale() {
        let mut script = parse(DOC).unwrap();
        let query = Query::new().with_name("m*").with_descend(Descend::Yes);
        let mut picked = script.select(&query).unwrap();
        assert_eq!(picked.len(), 2);
        picked.scale("W", 2.0);
        let text = script.to_string();
        assert!(text.contains("W=2e-6"));
        assert!(text.contains("W=4e-6"));
    }

    #[test]
    fn test_select_change_and_del() {
        let mut script = parse(DOC).unwrap();
        let query = Query::new().with_master("resistor");
        let mut picked = script.select(&query).unwrap();
        picked.change("R", "10k");
        picked.del_param("missing");
        drop(picked);
        let found = script
            .search(&Query::new().with_param("R").with_value("10k"))
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_remove_top_level() {
        let mut script = parse(DOC).unwrap();
        let removed = script.remove(&Query::new().with_name("c*")).unwrap();
        assert_eq!(removed, 1);
        assert!(script.search(&Query::new().with_name("c1")).unwrap().is_empty());
    }

    #[test]
    fn test_remove_inside_block() {
        let mut script = parse(DOC).unwrap();
        let query = Query::new().with_name("m1").with_descend(Descend::Yes);
        assert_eq!(script.remove(&query).unwrap(), 1);
        let left = Query::new().with_name("m*").with_descend(Descend::Yes);
        assert_eq!(names(&script.search(&left).unwrap()), vec!["m2"]);
    }

    #[test]
    fn test_remove_drops_emptied_block() {
        let mut script = parse("subckt e a b\nends\n").unwrap();
        let all = Query::new().with_descend(Descend::Yes);
        assert_eq!(script.remove(&all).unwrap(), 2);
        assert!(script.is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let script = parse(DOC).unwrap();
        let query = Query::new().with_name("(").with_regex();
        assert!(script.search(&query).is_err());
    }
}
