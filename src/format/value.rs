//! Typed parameter values.

use std::fmt;

use crate::error::{ParamError, ParamResult};

/// One value in a param or director file.
///
/// Tokens are sniffed at parse time: integer if it parses as one, else
/// float, else text. Several whitespace-separated tokens form a list whose
/// elements are inferred independently.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

fn looks_numeric(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
}

impl Value {
    /// Infer the type of a single token.
    #[must_use]
    pub fn infer(token: &str) -> Self {
        if let Ok(i) = token.parse::<i64>() {
            return Self::Integer(i);
        }
        if looks_numeric(token) {
            if let Ok(x) = token.parse::<f64>() {
                if x.is_finite() {
                    return Self::Float(x);
                }
            }
        }
        Self::Text(token.to_string())
    }

    /// Infer a value from whitespace-separated tokens; one token collapses
    /// to a scalar. Returns `None` when there are no tokens.
    #[must_use]
    pub fn from_tokens(tokens: &[&str]) -> Option<Self> {
        match tokens {
            [] => None,
            [single] => Some(Self::infer(single)),
            many => Some(Self::List(many.iter().map(|t| Self::infer(t)).collect())),
        }
    }

    /// Whether writing this value and inferring it again gives it back.
    ///
    /// Fails for text with whitespace or that looks like a number, for
    /// non-finite floats, and for empty or nested lists.
    #[must_use]
    pub fn round_trips(&self) -> bool {
        match self {
            Self::List(items) => {
                !items.is_empty()
                    && items
                        .iter()
                        .all(|item| !matches!(item, Self::List(_)) && item.round_trips())
            }
            scalar => {
                let text = scalar.to_string();
                !text.is_empty()
                    && !text.contains(char::is_whitespace)
                    && Self::infer(&text) == *scalar
            }
        }
    }

    /// Numeric value, if this is an integer or a float.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Element `index` of a list value.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&Self> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// Replace element `index` of a list value.
    ///
    /// # Errors
    ///
    /// Returns a validation error if this is not a list or the index is out
    /// of range.
    pub fn set_element(&mut self, index: usize, value: impl Into<Self>) -> ParamResult<()> {
        match self {
            Self::List(items) if index < items.len() => {
                items[index] = value.into();
                Ok(())
            }
            Self::List(items) => Err(ParamError::validation(format!(
                "index {index} out of range for list of length {}",
                items.len()
            ))),
            other => Err(ParamError::validation(format!(
                "cannot index into scalar value '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            // Debug keeps a '.' or exponent so the token re-parses as a float.
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::List(items) => {
                let tokens: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", tokens.join(" "))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_scalars() {
        assert_eq!(Value::infer("42"), Value::Integer(42));
        assert_eq!(Value::infer("-3"), Value::Integer(-3));
        assert_eq!(Value::infer("0.01"), Value::Float(0.01));
        assert_eq!(Value::infer("1e-3"), Value::Float(1e-3));
        assert_eq!(Value::infer(".5"), Value::Float(0.5));
        assert_eq!(Value::infer("snapshot.std"), Value::Text("snapshot.std".into()));
    }

    #[test]
    fn test_infer_keeps_words_as_text() {
        assert_eq!(Value::infer("inf"), Value::Text("inf".into()));
        assert_eq!(Value::infer("nan"), Value::Text("nan".into()));
        assert_eq!(Value::infer("tsc"), Value::Text("tsc".into()));
    }

    #[test]
    fn test_from_tokens() {
        assert_eq!(Value::from_tokens(&[]), None);
        assert_eq!(Value::from_tokens(&["7"]), Some(Value::Integer(7)));
        assert_eq!(
            Value::from_tokens(&["0", "0", "40.0"]),
            Some(Value::List(vec![
                Value::Integer(0),
                Value::Integer(0),
                Value::Float(40.0)
            ]))
        );
    }

    #[test]
    fn test_float_display_reparses_as_float() {
        for x in [1.0, 2.5e-9, 1e20, 0.1 + 0.2, -0.0] {
            let text = Value::Float(x).to_string();
            assert_eq!(Value::infer(&text), Value::Float(x), "{text}");
        }
    }

    #[test]
    fn test_signed_infinity_is_text() {
        assert_eq!(Value::infer("+inf"), Value::Text("+inf".into()));
        assert_eq!(Value::infer("-NaN"), Value::Text("-NaN".into()));
    }

    #[test]
    fn test_round_trips() {
        assert!(Value::from("snapshot.std").round_trips());
        assert!(Value::Float(2.5e-9).round_trips());
        assert!(Value::from_tokens(&["0", "0", "40.0"]).unwrap().round_trips());

        assert!(!Value::from("my run.std").round_trips());
        assert!(!Value::from("").round_trips());
        assert!(!Value::from("42").round_trips());
        assert!(!Value::Float(f64::INFINITY).round_trips());
        assert!(!Value::Float(f64::NAN).round_trips());
        assert!(!Value::List(vec![]).round_trips());
        assert!(!Value::List(vec![Value::List(vec![Value::Integer(1)])]).round_trips());
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::from("x").as_f64(), None);
    }

    #[test]
    fn test_set_element() {
        let mut v = Value::from_tokens(&["1", "1", "1", "0.0001"]).unwrap();
        v.set_element(3, 2.5).unwrap();
        assert_eq!(v.element(3), Some(&Value::Float(2.5)));
        assert!(v.set_element(9, 1.0).is_err());
        assert!(Value::Integer(1).set_element(0, 1.0).is_err());
    }
}
