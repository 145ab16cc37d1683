//! Unit-scaled number parsing shared by the netlist and results grammars.
//!
//! Spectre-style inputs write numeric literals in engineering notation with a
//! single-letter scale suffix (`1k`, `100f`, `2.2p`) alongside ordinary
//! decimal and exponential forms. Parameter values may also be algebraic
//! expressions (`R0 * 2`), which must pass through untouched, so conversion
//! is fallible by design and never an error.

/// Scale suffixes recognized by [`scaled_float`], as powers of ten.
///
/// `K` and `k` are synonyms; `_` is the unit suffix; `%` and `c` both mean
/// one hundredth. Uppercase `P` is not in the set.
const SCALE_SUFFIXES: [(char, f64); 16] = [
    ('T', 1e12),
    ('G', 1e9),
    ('M', 1e6),
    ('K', 1e3),
    ('k', 1e3),
    ('_', 1.0),
    ('%', 1e-2),
    ('c', 1e-2),
    ('m', 1e-3),
    ('u', 1e-6),
    ('n', 1e-9),
    ('p', 1e-12),
    ('f', 1e-15),
    ('a', 1e-18),
    ('z', 1e-21),
    ('y', 1e-24),
];

/// Convert a numeric token to a float, honoring scale suffixes.
///
/// Accepts plain and exponential notation (`42`, `-3.0E5`) and suffixed
/// engineering notation (`[sign]digits[.digits]suffix`). Returns `None` for
/// anything else — an unknown suffix, a malformed mantissa, or arbitrary
/// expression text — so the caller can keep the original text.
pub fn scaled_float(token: &str) -> Option<f64> {
    let text = token.trim();
    if text.is_empty() {
        return None;
    }
    // Plain float covers decimal and exponential notation in one step.
    if let Ok(value) = text.parse::<f64>() {
        return Some(value);
    }
    let suffix = text.chars().last()?;
    let factor = scale_factor(suffix)?;
    let mantissa = &text[..text.len() - suffix.len_utf8()];
    if !is_plain_decimal(mantissa) {
        return None;
    }
    let base: f64 = mantissa.parse().ok()?;
    Some(base * factor)
}

/// Look up the multiplier for a scale suffix.
fn scale_factor(suffix: char) -> Option<f64> {
    SCALE_SUFFIXES
        .iter()
        .find(|(c, _)| *c == suffix)
        .map(|(_, factor)| *factor)
}

/// True for `[sign]digits[.digits]` and nothing else.
fn is_plain_decimal(text: &str) -> bool {
    let unsigned = text
        .strip_prefix('+')
        .or_else(|| text.strip_prefix('-'))
        .unwrap_or(text);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match frac_part {
        Some(frac) => !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit()),
        None => true,
    }
}

/// Format a float the way scaled parameter values are written back.
///
/// Plain decimal inside the range where it stays readable, scientific
/// notation outside it. The output reparses to the same value.
pub(crate) fn format_float(value: f64) -> String {
    if value != 0.0 && (value.abs() >= 1e16 || value.abs() < 1e-4) {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Option<f64>, b: Option<f64>) -> bool {
        match (a, b) {
            (Some(x), Some(y)) => (x - y).abs() < x.abs() * 1e-10 + 1e-30,
            (None, None) => true,
            _ => false,
        }
    }

    #[test]
    fn test_scale_suffixes() {
        assert!(approx_eq(scaled_float("1k"), Some(1_000.0)));
        assert!(approx_eq(scaled_float("100f"), Some(1e-13)));
        assert!(approx_eq(scaled_float("2.2p"), Some(2.2e-12)));
        assert!(approx_eq(scaled_float("3.3M"), Some(3.3e6)));
        assert!(approx_eq(scaled_float("5%"), Some(0.05)));
        assert!(approx_eq(scaled_float("7_"), Some(7.0)));
        assert!(approx_eq(scaled_float("+5u"), Some(5e-6)));
        assert!(approx_eq(scaled_float("-2n"), Some(-2e-9)));
    }

    #[test]
    fn test_plain_and_exponential() {
        assert!(approx_eq(scaled_float("42"), Some(42.0)));
        assert!(approx_eq(scaled_float("-12.5"), Some(-12.5)));
        assert!(approx_eq(scaled_float("-3.0E5"), Some(-3e5)));
        assert!(approx_eq(scaled_float("1e-9"), Some(1e-9)));
        assert!(approx_eq(scaled_float("100e-15"), Some(1e-13)));
    }

    #[test]
    fn test_non_numeric_passthrough() {
        assert_eq!(scaled_float("R0*2"), None);
        assert_eq!(scaled_float("vdd"), None);
        assert_eq!(scaled_float(""), None);
        // Uppercase P is not a recognized suffix.
        assert_eq!(scaled_float("1P"), None);
        // Trailing garbage is not silently ignored.
        assert_eq!(scaled_float("1kx"), None);
        // Exponential mantissa cannot take a scale suffix.
        assert_eq!(scaled_float("1e5z"), None);
        // Malformed mantissas.
        assert_eq!(scaled_float(".5k"), None);
        assert_eq!(scaled_float("5.k"), None);
    }

    #[test]
    fn test_format_float_roundtrip() {
        for value in [2000.0, 6.6, 1e-13, 4.4e-12, 0.0, -3.25, 1.5e17] {
            let text = format_float(value);
            assert!(approx_eq(scaled_float(&text), Some(value)), "{}", text);
        }
        assert_eq!(format_float(2000.0), "2000");
        assert_eq!(format_float(1e-13), "1e-13");
    }
}
