//! Literal values as they appear in solver dictionary files.

use std::fmt;

/// One dictionary literal: the value of an internal field, a boundary
/// parameter, or a probe sample.
///
/// Vectors are always three-component in the modeled solver family.
/// `Word` covers bare identifiers such as `$internalField` references or
/// flux field names (`phi`); `Switch` covers the solver's boolean tokens.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A single floating-point value.
    Scalar(f64),
    /// A parenthesized triple, e.g. `(0 1 0)`.
    Vector([f64; 3]),
    /// A bare word token kept verbatim.
    Word(String),
    /// A boolean token (`true`/`false`/`on`/`off`).
    Switch(bool),
}

impl Value {
    /// Parse a single non-parenthesized token.
    ///
    /// Numbers become [`Value::Scalar`], the solver's boolean tokens become
    /// [`Value::Switch`], anything else is kept as a [`Value::Word`].
    pub fn from_token(token: &str) -> Value {
        match token {
            "true" | "on" | "yes" => return Value::Switch(true),
            "false" | "off" | "no" => return Value::Switch(false),
            _ => {}
        }
        match token.parse::<f64>() {
            Ok(v) => Value::Scalar(v),
            Err(_) => Value::Word(token.to_string()),
        }
    }

    /// The scalar payload, if this is a scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// The vector payload, if this is a vector.
    pub fn as_vector(&self) -> Option<[f64; 3]> {
        match self {
            Value::Vector(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(v)
    }
}

impl From<[f64; 3]> for Value {
    fn from(v: [f64; 3]) -> Self {
        Value::Vector(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Word(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Switch(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(v) => write!(f, "{v}"),
            Value::Vector([x, y, z]) => write!(f, "({x} {y} {z})"),
            Value::Word(w) => f.write_str(w),
            Value::Switch(true) => f.write_str("true"),
            Value::Switch(false) => f.write_str("false"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn token_classification() {
        assert_eq!(Value::from_token("293.15"), Value::Scalar(293.15));
        assert_eq!(Value::from_token("1e5"), Value::Scalar(1e5));
        assert_eq!(Value::from_token("-3"), Value::Scalar(-3.0));
        assert_eq!(Value::from_token("on"), Value::Switch(true));
        assert_eq!(Value::from_token("no"), Value::Switch(false));
        assert_eq!(
            Value::from_token("$internalField"),
            Value::Word("$internalField".into())
        );
    }

    #[test]
    fn vector_rendering() {
        assert_eq!(Value::Vector([0.0, 1.5, 0.0]).to_string(), "(0 1.5 0)");
    }

    proptest! {
        #[test]
        fn scalar_round_trips(v in -1e9f64..1e9) {
            let rendered = Value::Scalar(v).to_string();
            prop_assert_eq!(Value::from_token(&rendered), Value::Scalar(v));
        }
    }
}
