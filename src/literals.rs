//! Literal width inference for constants
//!
//! [`classify`] picks the narrowest canonical type for a macro or enumerant
//! value:
//!
//! - Hex and unsigned decimal literals take the first of `i32`, `u32`, `i64`,
//!   `u64` whose range holds the value and are re-rendered as zero-padded hex.
//! - Negative decimal literals are `i32` or `i64` and keep their decimal text.
//! - Anything else that parses as a float is `f32`, text unchanged.
//!
//! Octal is not recognized; `010` is read as decimal ten.

use crate::symbols::{CanonicalType, Scalar};

/// Classify literal text, returning its type and canonical text.
///
/// Returns `None` for non-literals (expressions such as `(A | B)`) and for
/// the ambiguous case of a non-negative value that only parsed as signed.
pub fn classify(text: &str) -> Option<(CanonicalType, String)> {
    let literal = strip_wrapping_parens(text.trim());

    if let Some(hex) = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        let value = u64::from_str_radix(trim_integer_suffix(hex), 16).ok()?;
        return Some(unsigned_literal(value));
    }

    let digits = trim_integer_suffix(literal);
    if let Ok(value) = digits.parse::<u64>() {
        return Some(unsigned_literal(value));
    }

    if let Ok(value) = digits.parse::<i64>() {
        if value < 0 {
            let scalar = if i32::try_from(value).is_ok() {
                Scalar::I32
            } else {
                Scalar::I64
            };
            return Some((CanonicalType::scalar(scalar), value.to_string()));
        }
        log::warn!("Ambiguous literal '{literal}' parsed only as signed, constant rejected");
        return None;
    }

    if looks_like_float(literal) {
        let body = literal.trim_end_matches(['f', 'F']);
        if body.parse::<f64>().is_ok() {
            return Some((CanonicalType::scalar(Scalar::F32), literal.to_string()));
        }
    }

    None
}

/// Narrowest of `i32`, `u32`, `i64`, `u64` holding `value`
pub fn narrowest_integer(value: u64) -> Scalar {
    if value <= i32::MAX as u64 {
        Scalar::I32
    } else if value <= u32::MAX as u64 {
        Scalar::U32
    } else if value <= i64::MAX as u64 {
        Scalar::I64
    } else {
        Scalar::U64
    }
}

fn unsigned_literal(value: u64) -> (CanonicalType, String) {
    let scalar = narrowest_integer(value);
    let text = match scalar.integer_bits() {
        Some(64) => format!("0x{value:016X}"),
        _ => format!("0x{value:08X}"),
    };
    (CanonicalType::scalar(scalar), text)
}

/// Whether `text` is a parenthesized bitwise-OR of names or literals, e.g.
/// `(GL_COLOR_BUFFER_BIT | GL_DEPTH_BUFFER_BIT)`.
pub fn is_flag_expression(text: &str) -> bool {
    let inner = strip_wrapping_parens(text.trim());
    !inner.is_empty()
        && inner.split('|').all(|term| {
            let term = term.trim();
            !term.is_empty() && term.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

fn strip_wrapping_parens(text: &str) -> &str {
    match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => inner.trim(),
        None => text,
    }
}

fn trim_integer_suffix(text: &str) -> &str {
    text.trim_end_matches(['u', 'U', 'l', 'L'])
}

fn looks_like_float(text: &str) -> bool {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    unsigned
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_of(text: &str) -> Option<Scalar> {
        classify(text).and_then(|(ty, _)| ty.as_scalar())
    }

    #[test]
    fn test_hex_widths() {
        assert_eq!(scalar_of("0x7FFFFFFF"), Some(Scalar::I32));
        assert_eq!(scalar_of("0x80000000"), Some(Scalar::U32));
        assert_eq!(scalar_of("0xFFFFFFFF"), Some(Scalar::U32));
        assert_eq!(scalar_of("0x100000000"), Some(Scalar::I64));
        assert_eq!(scalar_of("0xFFFFFFFFFFFFFFFF"), Some(Scalar::U64));
    }

    #[test]
    fn test_hex_rendering() {
        let (_, text) = classify("0x1").unwrap();
        assert_eq!(text, "0x00000001");
        let (_, text) = classify("0x100000000").unwrap();
        assert_eq!(text, "0x0000000100000000");
        let (_, text) = classify("0x8dd9u").unwrap();
        assert_eq!(text, "0x00008DD9");
    }

    #[test]
    fn test_negative_decimal() {
        let (ty, text) = classify("-1").unwrap();
        assert_eq!(ty.as_scalar(), Some(Scalar::I32));
        assert_eq!(text, "-1");
        assert_eq!(scalar_of("-9999999999"), Some(Scalar::I64));
    }

    #[test]
    fn test_unsigned_decimal() {
        let (ty, text) = classify("65536").unwrap();
        assert_eq!(ty.as_scalar(), Some(Scalar::I32));
        assert_eq!(text, "0x00010000");
        assert_eq!(scalar_of("4294967295"), Some(Scalar::U32));
        assert_eq!(scalar_of("(3)"), Some(Scalar::I32));
        assert_eq!(scalar_of("10UL"), Some(Scalar::I32));
    }

    #[test]
    fn test_ambiguous_signed_rejected() {
        assert!(classify("-0").is_none());
    }

    #[test]
    fn test_float_passthrough() {
        let (ty, text) = classify("1.5f").unwrap();
        assert_eq!(ty.as_scalar(), Some(Scalar::F32));
        assert_eq!(text, "1.5f");
        assert_eq!(scalar_of("-0.25"), Some(Scalar::F32));
    }

    #[test]
    fn test_non_literals() {
        assert!(classify("(GLFW_A | GLFW_B)").is_none());
        assert!(classify("inf").is_none());
        assert!(classify("\"3.3\"").is_none());
        assert!(classify("").is_none());
    }

    #[test]
    fn test_flag_expression_shape() {
        assert!(is_flag_expression("(GL_A | GL_B)"));
        assert!(is_flag_expression("GL_A|0x2"));
        assert!(!is_flag_expression("(a + b)"));
        assert!(!is_flag_expression("()"));
    }
}
