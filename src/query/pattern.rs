//! Wildcard and regular-expression matching of statement fields.

use std::fmt;

use regex::Regex;

use crate::error::{Result, ScsError};

/// A compiled matcher for one statement field.
///
/// In wildcard mode `*` matches any run of characters and every other
/// character is literal. In regex mode the pattern text is compiled verbatim,
/// anchored so it must cover the whole field.
#[derive(Debug, Clone)]
pub struct Pattern {
    re: Regex,
}

impl Pattern {
    /// Compile `pattern`; `regex` selects regex mode over wildcard mode.
    pub fn new(pattern: &str, regex: bool) -> Result<Self> {
        let anchored = if regex {
            format!("^(?:{})$", pattern)
        } else {
            let literals: Vec<String> = pattern.split('*').map(regex::escape).collect();
            format!("^{}$", literals.join(".*"))
        };
        let re = Regex::new(&anchored).map_err(|e| ScsError::invalid_pattern(pattern, e))?;
        Ok(Pattern { re })
    }

    /// Whether `text` matches the whole pattern.
    pub fn matches(&self, text: &str) -> bool {
        self.re.is_match(text)
    }
}

/// The value half of a parameter filter.
pub enum ParamValue {
    /// Literal text, matched under the query's wildcard/regex rules.
    Text(String),
    /// Numeric predicate; values that do not parse as scaled floats never
    /// match it.
    Predicate(Box<dyn Fn(f64) -> bool>),
}

impl ParamValue {
    /// Build a numeric predicate value.
    pub fn predicate(f: impl Fn(f64) -> bool + 'static) -> Self {
        ParamValue::Predicate(Box::new(f))
    }
}

impl From<&str> for ParamValue {
    fn from(text: &str) -> Self {
        ParamValue::Text(text.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(text: String) -> Self {
        ParamValue::Text(text)
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ParamValue::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScsError;

    #[test]
    fn test_wildcard_matching() {
        let pat = Pattern::new("R*", false).unwrap();
        assert!(pat.matches("R1"));
        assert!(pat.matches("R22"));
        assert!(pat.matches("R"));
        assert!(!pat.matches("r1"));
        assert!(!pat.matches("xR1"));
    }

    #[test]
    fn test_wildcard_is_anchored() {
        let pat = Pattern::new("out", false).unwrap();
        assert!(pat.matches("out"));
        assert!(!pat.matches("output"));
        assert!(!pat.matches("vout"));
    }

    #[test]
    fn test_wildcard_escapes_regex_metacharacters() {
        let pat = Pattern::new("v(out)", false).unwrap();
        assert!(pat.matches("v(out)"));
        assert!(!pat.matches("vout"));
        let pat = Pattern::new("a.b*", false).unwrap();
        assert!(pat.matches("a.bc"));
        assert!(!pat.matches("axbc"));
    }

    #[test]
    fn test_regex_matching() {
        let star = Pattern::new("R*", true).unwrap();
        assert!(!star.matches("R1"));
        assert!(star.matches("RR"));
        let lazy = Pattern::new("R.*?", true).unwrap();
        assert!(lazy.matches("R1"));
        assert!(lazy.matches("R22"));
        assert!(!lazy.matches("r1"));
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let err = Pattern::new("(", true).unwrap_err();
        assert!(matches!(err, ScsError::InvalidPattern { .. }));
    }

    #[test]
    fn test_param_value_from_text() {
        let value = ParamValue::from("1k");
        assert!(matches!(value, ParamValue::Text(ref t) if t == "1k"));
    }
}
