use indexmap::IndexMap;
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

/// Ordered key/value mapping used for objects and document properties.
pub type Map = IndexMap<String, Value>;

/// A property value as seen by queries and custom functions.
///
/// This mirrors the JSON data model found in front matter, with a distinction
/// between integers and floats and with objects that keep their insertion
/// order (so path listings follow the order keys were written in).
///
/// # Examples
///
/// ```
/// use livevars::Value;
/// use livevars::value::Map;
///
/// let total = Value::Integer(42);
/// let ratio = Value::Float(0.5);
/// let title = Value::String("budget".to_string());
///
/// let mut obj = Map::new();
/// obj.insert("total".to_string(), total);
/// let object = Value::Object(obj);
/// assert!(object.is_container());
/// # let _ = (ratio, title);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null (also what `undefined` evaluates to in custom functions)
    Null,

    /// Boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Sequence of values
    Array(Vec<Value>),

    /// Mapping with string keys, in insertion order
    Object(Map),
}

/// Arithmetic operators shared by `sum` and the custom-function interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arith {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl Value {
    /// JavaScript-style truthiness: `0`, `NaN`, `""`, `null` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Float(n) => *n != 0.0 && !n.is_nan(),
            Value::Integer(n) => *n != 0,
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// True for arrays and objects, the values that get flattened into sub-paths.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable type name, used in error messages and type checks.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Applies a numeric operator to two numbers.
    ///
    /// Integer pairs use checked integer arithmetic; anything involving a
    /// float goes through `Decimal` so whole results come back as integers
    /// and `0.1 + 0.2` does not pick up binary rounding noise. Returns `None`
    /// when either side is not a number or on division by zero.
    pub fn arith(&self, op: Arith, rhs: &Value) -> Option<Value> {
        match (self, rhs) {
            (Value::Integer(a), Value::Integer(b)) => {
                let exact = match op {
                    Arith::Add => a.checked_add(*b),
                    Arith::Subtract => a.checked_sub(*b),
                    Arith::Multiply => a.checked_mul(*b),
                    Arith::Divide if *b == 0 => return None,
                    Arith::Divide if a.checked_rem(*b) == Some(0) => a.checked_div(*b),
                    Arith::Divide => return Some(Value::Float(*a as f64 / *b as f64)),
                    Arith::Remainder => a.checked_rem(*b),
                };
                match exact {
                    Some(n) => Some(Value::Integer(n)),
                    None if *b == 0 => None,
                    None => decimal_op(op, *a as f64, *b as f64),
                }
            }
            (a, b) => decimal_op(op, a.as_float()?, b.as_float()?),
        }
    }
}

fn decimal_op(op: Arith, a: f64, b: f64) -> Option<Value> {
    if matches!(op, Arith::Divide | Arith::Remainder) && b == 0.0 {
        return None;
    }
    if let Some(ad) = Decimal::from_f64(a)
        && let Some(bd) = Decimal::from_f64(b)
    {
        let rd = match op {
            Arith::Add => ad.checked_add(bd),
            Arith::Subtract => ad.checked_sub(bd),
            Arith::Multiply => ad.checked_mul(bd),
            Arith::Divide => ad.checked_div(bd),
            Arith::Remainder => ad.checked_rem(bd),
        };
        if let Some(rd) = rd {
            if rd.is_integer()
                && let Some(r) = rd.to_i64()
            {
                return Some(Value::Integer(r));
            } else if let Some(r) = rd.to_f64() {
                return Some(Value::Float(r));
            }
        }
    }
    let res = match op {
        Arith::Add => a + b,
        Arith::Subtract => a - b,
        Arith::Multiply => a * b,
        Arith::Divide => a / b,
        Arith::Remainder => a % b,
    };
    Some(Value::Float(res))
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_stays_integral() {
        let two = Value::Integer(2);
        let three = Value::Integer(3);
        assert_eq!(two.arith(Arith::Add, &three), Some(Value::Integer(5)));
        assert_eq!(three.arith(Arith::Divide, &two), Some(Value::Float(1.5)));
        assert_eq!(Value::Integer(6).arith(Arith::Divide, &two), Some(Value::Integer(3)));
    }

    #[test]
    fn mixed_arithmetic_collapses_whole_results() {
        let a = Value::Float(1.5);
        let b = Value::Float(2.5);
        assert_eq!(a.arith(Arith::Add, &b), Some(Value::Integer(4)));
        assert_eq!(Value::Integer(2).arith(Arith::Add, &a), Some(Value::Float(3.5)));
    }

    #[test]
    fn division_by_zero_is_none() {
        let zero = Value::Integer(0);
        assert_eq!(Value::Integer(1).arith(Arith::Divide, &zero), None);
        assert_eq!(Value::Float(1.0).arith(Arith::Remainder, &zero), None);
    }

    #[test]
    fn non_numbers_do_not_combine() {
        let s = Value::from("x");
        assert_eq!(s.arith(Arith::Add, &Value::Integer(1)), None);
    }

    #[test]
    fn truthiness_follows_javascript() {
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
        assert!(Value::Integer(-1).is_truthy());
    }
}
