//! Numeric coercion for the arithmetic, comparison and random operators

use rust_decimal::prelude::{FromPrimitive, RoundingStrategy, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// A JSON number split into its integral and floating representations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    /// Integral value that fits in `i64`
    Integer(i64),
    /// Any other finite number
    Float(f64),
}

impl Numeric {
    /// Read a JSON number. Non-numbers yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let Value::Number(n) = value else {
            return None;
        };
        match n.as_i64() {
            Some(i) => Some(Numeric::Integer(i)),
            None => n.as_f64().map(Numeric::Float),
        }
    }

    /// Parse a number out of a string (`"42"`, `" 3.5 "`)
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(i) = text.parse::<i64>() {
            return Some(Numeric::Integer(i));
        }
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Numeric::Float)
    }

    /// Value as a float
    pub fn as_f64(&self) -> f64 {
        match self {
            Numeric::Integer(i) => *i as f64,
            Numeric::Float(f) => *f,
        }
    }

    /// Convert back to JSON. Non-finite floats become `null`.
    pub fn into_value(self) -> Value {
        match self {
            Numeric::Integer(i) => Value::Number(i.into()),
            Numeric::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        }
    }

    /// Equality by numeric value
    pub fn numeric_eq(&self, other: &Numeric) -> bool {
        match (self, other) {
            (Numeric::Integer(a), Numeric::Integer(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }

    /// Ordering by numeric value
    pub fn numeric_cmp(&self, other: &Numeric) -> Option<Ordering> {
        match (self, other) {
            (Numeric::Integer(a), Numeric::Integer(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    /// Addition, staying integral when no overflow occurs
    pub fn add(self, other: Numeric) -> Numeric {
        match (self, other) {
            (Numeric::Integer(a), Numeric::Integer(b)) => a
                .checked_add(b)
                .map_or(Numeric::Float(a as f64 + b as f64), Numeric::Integer),
            (a, b) => Numeric::Float(a.as_f64() + b.as_f64()),
        }
    }

    /// Subtraction, staying integral when no overflow occurs
    pub fn subtract(self, other: Numeric) -> Numeric {
        match (self, other) {
            (Numeric::Integer(a), Numeric::Integer(b)) => a
                .checked_sub(b)
                .map_or(Numeric::Float(a as f64 - b as f64), Numeric::Integer),
            (a, b) => Numeric::Float(a.as_f64() - b.as_f64()),
        }
    }

    /// Multiplication, staying integral when no overflow occurs
    pub fn multiply(self, other: Numeric) -> Numeric {
        match (self, other) {
            (Numeric::Integer(a), Numeric::Integer(b)) => a
                .checked_mul(b)
                .map_or(Numeric::Float(a as f64 * b as f64), Numeric::Integer),
            (a, b) => Numeric::Float(a.as_f64() * b.as_f64()),
        }
    }

    /// Division. Returns `None` for a zero divisor.
    pub fn divide(self, other: Numeric) -> Option<Numeric> {
        if other.as_f64() == 0.0 {
            return None;
        }
        match (self, other) {
            (Numeric::Integer(a), Numeric::Integer(b)) if a.checked_rem(b) == Some(0) => {
                a.checked_div(b).map(Numeric::Integer)
            }
            (a, b) => Some(Numeric::Float(a.as_f64() / b.as_f64())),
        }
    }

    /// Remainder with the sign of the dividend. Returns `None` for a zero divisor.
    pub fn modulo(self, other: Numeric) -> Option<Numeric> {
        if other.as_f64() == 0.0 {
            return None;
        }
        match (self, other) {
            (Numeric::Integer(a), Numeric::Integer(b)) => a.checked_rem(b).map(Numeric::Integer),
            (a, b) => Some(Numeric::Float(a.as_f64() % b.as_f64())),
        }
    }

    /// Round half away from zero to `decimals` places.
    ///
    /// Goes through `Decimal` so that `1.005` rounds the way it is written.
    pub fn round(self, decimals: u32) -> Numeric {
        match self {
            Numeric::Integer(_) => self,
            Numeric::Float(f) => {
                let Some(decimal) = Decimal::from_f64(f) else {
                    return self;
                };
                let rounded =
                    decimal.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
                if decimals == 0 {
                    if let Some(i) = rounded.to_i64() {
                        return Numeric::Integer(i);
                    }
                }
                rounded.to_f64().map_or(self, Numeric::Float)
            }
        }
    }

    /// Largest integer not greater than the value
    pub fn floor(self) -> Numeric {
        match self {
            Numeric::Integer(_) => self,
            Numeric::Float(f) => integral(f.floor()),
        }
    }

    /// Smallest integer not less than the value
    pub fn ceil(self) -> Numeric {
        match self {
            Numeric::Integer(_) => self,
            Numeric::Float(f) => integral(f.ceil()),
        }
    }
}

fn integral(f: f64) -> Numeric {
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Numeric::Integer(f as i64)
    } else {
        Numeric::Float(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_arithmetic_stays_integral() {
        let a = Numeric::Integer(6);
        let b = Numeric::Integer(3);
        assert_eq!(a.add(b).into_value(), json!(9));
        assert_eq!(a.divide(b).map(Numeric::into_value), Some(json!(2)));
        assert_eq!(
            Numeric::Integer(7).divide(b).map(Numeric::into_value),
            Some(json!(7.0 / 3.0))
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(Numeric::Integer(1).divide(Numeric::Integer(0)), None);
        assert_eq!(Numeric::Float(1.5).modulo(Numeric::Float(0.0)), None);
    }

    #[test]
    fn test_overflow_falls_back_to_float() {
        let big = Numeric::Integer(i64::MAX);
        assert!(matches!(big.add(Numeric::Integer(1)), Numeric::Float(_)));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(Numeric::Float(2.5).round(0), Numeric::Integer(3));
        assert_eq!(Numeric::Float(-2.5).round(0), Numeric::Integer(-3));
        assert_eq!(Numeric::Float(1.005).round(2), Numeric::Float(1.01));
        assert_eq!(Numeric::Float(1.7).floor(), Numeric::Integer(1));
        assert_eq!(Numeric::Float(1.2).ceil(), Numeric::Integer(2));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Numeric::parse(" 42 "), Some(Numeric::Integer(42)));
        assert_eq!(Numeric::parse("3.5"), Some(Numeric::Float(3.5)));
        assert_eq!(Numeric::parse("abc"), None);
        assert_eq!(Numeric::parse("inf"), None);
    }
}
