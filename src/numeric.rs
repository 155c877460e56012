//! Numeric literal evaluation for qualifier arguments.
//!
//! Range and length bounds in the original schema dialect can exceed `u64`
//! (e.g. `18446744073709551618`), so integer literals evaluate through
//! `i128`. A literal that overflows even `i128` degrades to an `f64`
//! classification instead of failing the parse.

/// A classified numeric literal value.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    /// True when the value has no fractional part. A float literal written
    /// with a zero fraction (`100.00000000`) still counts as integral.
    pub fn is_integral(&self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Float(f) => f.fract() == 0.0,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(v) => *v as f64,
            Number::Float(f) => *f,
        }
    }

    /// The exact integer value if it lies in `[lo, hi]`, `None` otherwise.
    /// Float-classified values never qualify (id and length arguments are
    /// integer-valued by grammar; a float here means an overflowed literal).
    pub fn in_range(&self, lo: i128, hi: i128) -> Option<i128> {
        match self {
            Number::Int(v) if lo <= *v && *v <= hi => Some(*v),
            _ => None,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Evaluate a decimal literal with optional sign and fractional part
/// (range bounds). `-100.0` classifies as Float, `-100` as Int.
pub fn parse_decimal(text: &str) -> Number {
    if text.contains('.') {
        Number::Float(text.parse::<f64>().unwrap_or(f64::NAN))
    } else {
        parse_integer(text)
    }
}

/// Evaluate an integer literal: decimal or `0x` hex, optional sign
/// (id, length and tag values).
pub fn parse_integer(text: &str) -> Number {
    let (neg, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let parsed = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        i128::from_str_radix(hex, 16)
    } else {
        body.parse::<i128>()
    };
    match parsed {
        Ok(v) => Number::Int(if neg { -v } else { v }),
        // Magnitude beyond i128: classify approximately so validation can
        // still report an out-of-range value instead of crashing.
        Err(_) => {
            let approx = body.parse::<f64>().unwrap_or(f64::INFINITY);
            Number::Float(if neg { -approx } else { approx })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_classification() {
        assert_eq!(parse_decimal("42"), Number::Int(42));
        assert_eq!(parse_decimal("-100"), Number::Int(-100));
        assert!(matches!(parse_decimal("1.5"), Number::Float(_)));
        assert!(parse_decimal("100.00000000").is_integral());
        assert!(!parse_decimal("1.5").is_integral());
    }

    #[test]
    fn integer_radix_and_sign() {
        assert_eq!(parse_integer("0x235A"), Number::Int(0x235A));
        assert_eq!(parse_integer("0XFF"), Number::Int(255));
        assert_eq!(parse_integer("-1"), Number::Int(-1));
        assert_eq!(parse_integer("0"), Number::Int(0));
    }

    #[test]
    fn beyond_u64_still_integral() {
        let n = parse_integer("18446744073709551618");
        assert_eq!(n, Number::Int(18446744073709551618i128));
        assert!(n.is_integral());
        assert_eq!(parse_integer("-18446744073709551618"), Number::Int(-18446744073709551618i128));
    }

    #[test]
    fn ordering_across_classes() {
        assert!(parse_decimal("0") < parse_decimal("1.5"));
        assert!(parse_decimal("1") > parse_decimal("0"));
        assert!(parse_decimal("100") > parse_decimal("-100"));
        assert!(parse_integer("-18446744073709551618") <= parse_integer("18446744073709551618"));
    }

    #[test]
    fn range_membership() {
        assert_eq!(parse_integer("0xFFFFFFFF").in_range(0, 0xFFFF_FFFF), Some(0xFFFF_FFFF));
        assert_eq!(parse_integer("0x100000000").in_range(0, 0xFFFF_FFFF), None);
        assert_eq!(parse_integer("-1").in_range(0, 0xFFFF), None);
        assert_eq!(parse_integer("65535").in_range(0, 0xFFFF), Some(65535));
    }
}
