//! Rendering of values into text.
//!
//! Everything a query produces ends up as text in a document, so this module
//! owns the conversions used on the way out:
//!
//! - [`stringify()`] - the inline form: strings verbatim, numbers and booleans
//!   as written, arrays/objects/null as compact JSON
//! - [`to_json()`] / [`to_json_pretty()`] - JSON in property order
//! - [`truncate()`] - length capping for previews and suggestions
//! - [`common_type()`] - the type-homogeneity check behind `sum`
//!
//! # Examples
//!
//! ```
//! use livevars::Value;
//! use livevars::output::{stringify, to_json};
//!
//! assert_eq!(stringify(&Value::String("hi".into())), "hi");
//! assert_eq!(to_json(&Value::String("hi".into())), "\"hi\"");
//! assert_eq!(stringify(&Value::Array(vec![Value::Integer(1)])), "[1]");
//! ```

use crate::value::{Map, Value};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) if n.is_finite() => n.to_string(),
            Value::Float(_) => "null".to_string(),
            Value::String(s) => format!("\"{}\"", escape_json(s)),
            Value::Array(arr) => self.print_array(arr, indent),
            Value::Object(obj) => self.print_object(obj, indent),
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        if arr.is_empty() {
            return "[]".to_string();
        }

        let items: Vec<String> = arr
            .iter()
            .map(|v| self.print_value(v, indent + 1))
            .collect();
        self.wrap('[', ']', items, indent)
    }

    fn print_object(&self, obj: &Map, indent: usize) -> String {
        if obj.is_empty() {
            return "{}".to_string();
        }

        let separator = if self.pretty { ": " } else { ":" };
        let items: Vec<String> = obj
            .iter()
            .map(|(k, v)| {
                format!(
                    "\"{}\"{}{}",
                    escape_json(k),
                    separator,
                    self.print_value(v, indent + 1)
                )
            })
            .collect();
        self.wrap('{', '}', items, indent)
    }

    fn wrap(&self, open: char, close: char, items: Vec<String>, indent: usize) -> String {
        if !self.pretty {
            return format!("{}{}{}", open, items.join(","), close);
        }

        let inner = self.indent(indent + 1);
        let mut result = format!("{}\n", open);
        let lines: Vec<String> = items.iter().map(|item| format!("{}{}", inner, item)).collect();
        result.push_str(&lines.join(",\n"));
        result.push('\n');
        result.push_str(&self.indent(indent));
        result.push(close);
        result
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }
}

fn escape_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Converts a Value to compact JSON, keeping object keys in property order.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to JSON with 2-space indentation.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}

/// Renders a value the way it appears inline in a document.
///
/// Scalars use their plain text form; arrays, objects and null are written
/// as compact JSON so structured properties stay readable and unambiguous.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(n) => n.to_string(),
        Value::Float(n) => format_float(*n),
        Value::Boolean(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => to_json(value),
    }
}

pub(crate) fn format_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else {
        n.to_string()
    }
}

/// Caps `text` at `max` characters, appending `...` when something was cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

/// Returns the type shared by every value, or `"string"` when they differ.
///
/// The first value decides the candidate type; unresolved entries count as
/// `"undefined"`. An empty slice is `"undefined"`.
pub fn common_type(values: &[Option<Value>]) -> &'static str {
    fn kind(value: &Option<Value>) -> &'static str {
        value.as_ref().map_or("undefined", Value::type_name)
    }

    let Some(first) = values.first() else {
        return "undefined";
    };
    let first = kind(first);
    if values.iter().all(|v| kind(v) == first) {
        first
    } else {
        "string"
    }
}
