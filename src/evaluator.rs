use std::{cmp::Ordering, collections::HashMap};

use thiserror::Error;

use crate::{
    ast::{BinOp, Body, Expr, Lambda, Statement, UnaryOp},
    convert::json_to_value,
    lexer::Lexer,
    output::{format_float, to_json},
    parser::{Parser, SyntaxError},
    value::{Arith, Map, Value},
};

/// Names resolvable without a binding.
const GLOBALS: [&str; 8] = [
    "Math",
    "JSON",
    "Object",
    "String",
    "Number",
    "Boolean",
    "parseInt",
    "parseFloat",
];

/// Largest integer a double represents exactly (2^53).
const MAX_SAFE_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Deepest nesting of arrays and objects a script may copy.
const MAX_VALUE_DEPTH: usize = 256;

/// Resource bounds for one custom-function call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLimits {
    /// Evaluated nodes and statements, plus one per character or element
    /// copied or produced, allowed before aborting
    pub max_steps: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        ScriptLimits { max_steps: 100_000 }
    }
}

/// Errors raised while compiling or running a custom function.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("type error: {0}")]
    TypeError(String),

    #[error("{0} is not defined")]
    UndefinedVariable(String),

    #[error("{0} is not a function")]
    NotCallable(String),

    #[error("{receiver}.{method} is not a function")]
    UnknownMethod { receiver: String, method: String },

    #[error("function takes {expected} argument(s) but was called with {got}")]
    Arity { expected: usize, got: usize },

    #[error("step limit of {0} exceeded")]
    StepLimitExceeded(usize),

    #[error("value nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// A compiled custom function.
///
/// # Examples
///
/// ```
/// use livevars::{Script, ScriptLimits, Value};
///
/// let script = Script::compile("(price, qty) => price * qty").unwrap();
/// let total = script
///     .call(vec![Value::Float(2.5), Value::Integer(4)], ScriptLimits::default())
///     .unwrap();
/// assert_eq!(total, Value::Integer(10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    lambda: Lambda,
}

impl Script {
    /// Parses `code`, which must be a function literal.
    pub fn compile(code: &str) -> Result<Self, ScriptError> {
        let lambda = Parser::new(Lexer::new(code))?.parse_function()?;
        Ok(Script { lambda })
    }

    pub fn arity(&self) -> usize {
        self.lambda.arity()
    }

    /// Calls the function with positional arguments.
    ///
    /// The argument count must equal the declared parameter count. Each call
    /// starts from a fresh interpreter, so nothing carries over between calls.
    pub fn call(&self, args: Vec<Value>, limits: ScriptLimits) -> Result<Value, ScriptError> {
        if args.len() != self.arity() {
            return Err(ScriptError::Arity {
                expected: self.arity(),
                got: args.len(),
            });
        }
        Interpreter::new(limits).call(&self.lambda, args)
    }
}

struct Interpreter {
    /// One frame per active call, innermost last
    scopes: Vec<HashMap<String, Value>>,
    steps: usize,
    limits: ScriptLimits,
}

impl Interpreter {
    fn new(limits: ScriptLimits) -> Self {
        Interpreter {
            scopes: Vec::new(),
            steps: 0,
            limits,
        }
    }

    fn charge(&mut self, cost: usize) -> Result<(), ScriptError> {
        self.steps = self.steps.saturating_add(cost);
        if self.steps > self.limits.max_steps {
            Err(ScriptError::StepLimitExceeded(self.limits.max_steps))
        } else {
            Ok(())
        }
    }

    fn call(&mut self, lambda: &Lambda, args: Vec<Value>) -> Result<Value, ScriptError> {
        self.charge(1)?;
        let mut args = args.into_iter();
        let frame: HashMap<_, _> = lambda
            .params
            .iter()
            .map(|param| (param.clone(), args.next().unwrap_or(Value::Null)))
            .collect();
        self.scopes.push(frame);
        let result = match &lambda.body {
            Body::Expr(expr) => self.eval(expr),
            Body::Block(statements) => self.exec_block(statements),
        };
        self.scopes.pop();
        result
    }

    fn exec_block(&mut self, statements: &[Statement]) -> Result<Value, ScriptError> {
        for statement in statements {
            self.charge(1)?;
            match statement {
                Statement::Declare { name, value } => {
                    let value = self.eval(value)?;
                    if let Some(frame) = self.scopes.last_mut() {
                        frame.insert(name.clone(), value);
                    }
                }
                Statement::Return(expr) => return self.eval(expr),
                Statement::Expression(expr) => {
                    self.eval(expr)?;
                }
            }
        }
        Ok(Value::Null)
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|frame| frame.get(name))
    }

    /// True when `name` refers to a global rather than a shadowing binding.
    fn is_global(&self, name: &str) -> bool {
        GLOBALS.contains(&name) && self.lookup(name).is_none()
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        self.charge(1)?;
        match expr {
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Identifier(name) => self.eval_identifier(name),
            Expr::Member { object, property } => {
                if let Expr::Identifier(name) = object.as_ref()
                    && name == "Math"
                    && self.is_global(name)
                {
                    return Ok(math_constant(property));
                }
                let target = self.eval(object)?;
                get_member(&target, property)
            }
            Expr::Index { object, index } => {
                let target = self.eval(object)?;
                let key = self.eval(index)?;
                get_index(&target, &key)
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                Ok(unary(*op, &value))
            }
            Expr::BinaryOp { op, left, right } => self.eval_binary(*op, left, right),
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Call { callee, args } => self.eval_call(callee, args),
            Expr::MethodCall {
                object,
                method,
                args,
            } => self.eval_method_call(object, method, args),
            Expr::Function(_) => Err(ScriptError::TypeError(
                "a function can only be passed directly as a callback".to_string(),
            )),
            Expr::Object(fields) => {
                let mut map = Map::new();
                for (key, expr) in fields {
                    let value = self.eval(expr)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::Object(map))
            }
            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        }
    }

    fn eval_identifier(&mut self, name: &str) -> Result<Value, ScriptError> {
        if let Some(value) = self.lookup(name) {
            // Every read is a copy
            let cost = weight(value, 0)?;
            let value = value.clone();
            self.charge(cost)?;
            return Ok(value);
        }
        match name {
            "NaN" => Ok(Value::Float(f64::NAN)),
            "Infinity" => Ok(Value::Float(f64::INFINITY)),
            _ if GLOBALS.contains(&name) => Err(ScriptError::TypeError(format!(
                "{name} can only be called or used through its members"
            ))),
            _ => Err(ScriptError::UndefinedVariable(name.to_string())),
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, ScriptError> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    fn eval_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> Result<Value, ScriptError> {
        // Logical operators short-circuit and yield one of their operands
        let left = self.eval(left)?;
        match op {
            BinOp::And if !left.is_truthy() => Ok(left),
            BinOp::Or if left.is_truthy() => Ok(left),
            BinOp::NullCoalesce if left != Value::Null => Ok(left),
            BinOp::And | BinOp::Or | BinOp::NullCoalesce => self.eval(right),
            _ => {
                let right = self.eval(right)?;
                if op == BinOp::Add && (is_string_like(&left) || is_string_like(&right)) {
                    let (head, tail) = (js_string(&left), js_string(&right));
                    self.charge(head.len().saturating_add(tail.len()))?;
                    return Ok(Value::String(head + &tail));
                }
                Ok(binary(op, &left, &right))
            }
        }
    }

    fn eval_call(&mut self, callee: &str, args: &[Expr]) -> Result<Value, ScriptError> {
        if self.lookup(callee).is_some() {
            return Err(ScriptError::NotCallable(callee.to_string()));
        }
        if !GLOBALS.contains(&callee) {
            return Err(ScriptError::UndefinedVariable(callee.to_string()));
        }
        let args = self.eval_args(args)?;
        let first = args.first().unwrap_or(&Value::Null);
        match callee {
            "String" => Ok(Value::String(args.first().map(js_string).unwrap_or_default())),
            "Number" => Ok(args.first().map_or(Value::Integer(0), to_numeric)),
            "Boolean" => Ok(Value::Boolean(first.is_truthy())),
            "parseInt" => Ok(parse_int(&js_string(first), args.get(1))),
            "parseFloat" => Ok(from_f64(parse_float(&js_string(first)))),
            _ => Err(ScriptError::NotCallable(callee.to_string())),
        }
    }

    fn eval_method_call(
        &mut self,
        object: &Expr,
        method: &str,
        args: &[Expr],
    ) -> Result<Value, ScriptError> {
        if let Expr::Identifier(name) = object
            && self.is_global(name)
        {
            let args = self.eval_args(args)?;
            let result = global_method(name, method, &args)?;
            if let Value::String(s) = &result {
                self.charge(s.len())?;
            }
            return Ok(result);
        }

        let target = self.eval(object)?;
        match (&target, method) {
            (
                Value::Array(items),
                "map" | "filter" | "find" | "findIndex" | "some" | "every" | "reduce",
            ) => self.array_callback(items, method, args),
            (Value::String(s), _) => {
                let args = self.eval_args(args)?;
                self.string_method(s, method, &args)
            }
            (Value::Array(items), _) => {
                let args = self.eval_args(args)?;
                self.array_method(items, method, &args)
            }
            (Value::Integer(_) | Value::Float(_), _) => {
                let args = self.eval_args(args)?;
                number_method(&target, method, &args)
            }
            (Value::Boolean(_), "toString") => Ok(Value::String(js_string(&target))),
            (Value::Null, _) => Err(ScriptError::TypeError(format!(
                "cannot read properties of null (reading '{method}')"
            ))),
            _ => Err(ScriptError::UnknownMethod {
                receiver: target.type_name().to_string(),
                method: method.to_string(),
            }),
        }
    }

    /// Runs `callback` for one element, passing as many of
    /// `(element, index, array)` as it declares.
    fn invoke(
        &mut self,
        callback: &Lambda,
        item: &Value,
        index: usize,
        items: &[Value],
    ) -> Result<Value, ScriptError> {
        let mut args = vec![item.clone()];
        if callback.arity() > 1 {
            args.push(Value::Integer(index as i64));
        }
        if callback.arity() > 2 {
            self.charge(items_weight(items, 0)?)?;
            args.push(Value::Array(items.to_vec()));
        }
        self.call(callback, args)
    }

    fn array_callback(
        &mut self,
        items: &[Value],
        method: &str,
        args: &[Expr],
    ) -> Result<Value, ScriptError> {
        let Some(Expr::Function(callback)) = args.first() else {
            return Err(ScriptError::TypeError(format!(
                "{method} expects a function literal as its first argument"
            )));
        };

        match method {
            "map" => {
                let mut mapped = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    mapped.push(self.invoke(callback, item, index, items)?);
                }
                Ok(Value::Array(mapped))
            }
            "filter" => {
                let mut kept = Vec::new();
                for (index, item) in items.iter().enumerate() {
                    if self.invoke(callback, item, index, items)?.is_truthy() {
                        kept.push(item.clone());
                    }
                }
                Ok(Value::Array(kept))
            }
            "find" | "findIndex" => {
                for (index, item) in items.iter().enumerate() {
                    if self.invoke(callback, item, index, items)?.is_truthy() {
                        return Ok(if method == "find" {
                            item.clone()
                        } else {
                            Value::Integer(index as i64)
                        });
                    }
                }
                Ok(if method == "find" {
                    Value::Null
                } else {
                    Value::Integer(-1)
                })
            }
            "some" => {
                for (index, item) in items.iter().enumerate() {
                    if self.invoke(callback, item, index, items)?.is_truthy() {
                        return Ok(Value::Boolean(true));
                    }
                }
                Ok(Value::Boolean(false))
            }
            "every" => {
                for (index, item) in items.iter().enumerate() {
                    if !self.invoke(callback, item, index, items)?.is_truthy() {
                        return Ok(Value::Boolean(false));
                    }
                }
                Ok(Value::Boolean(true))
            }
            "reduce" => {
                let mut rest = items.iter().enumerate();
                let mut acc = match args.get(1) {
                    Some(initial) => self.eval(initial)?,
                    None => match rest.next() {
                        Some((_, first)) => first.clone(),
                        None => {
                            return Err(ScriptError::TypeError(
                                "reduce of empty array with no initial value".to_string(),
                            ));
                        }
                    },
                };
                for (index, item) in rest {
                    let mut call_args = vec![acc, item.clone()];
                    if callback.arity() > 2 {
                        call_args.push(Value::Integer(index as i64));
                    }
                    if callback.arity() > 3 {
                        self.charge(items_weight(items, 0)?)?;
                        call_args.push(Value::Array(items.to_vec()));
                    }
                    acc = self.call(callback, call_args)?;
                }
                Ok(acc)
            }
            _ => Err(ScriptError::UnknownMethod {
                receiver: "array".to_string(),
                method: method.to_string(),
            }),
        }
    }

    fn string_method(&mut self, s: &str, method: &str, args: &[Value]) -> Result<Value, ScriptError> {
        let text_arg = |i: usize| args.get(i).map(js_string).unwrap_or_default();
        let chars: Vec<char> = s.chars().collect();
        let len = chars.len();

        let result = match method {
            "toUpperCase" => Value::String(s.to_uppercase()),
            "toLowerCase" => Value::String(s.to_lowercase()),
            "trim" => Value::String(s.trim().to_string()),
            "trimStart" => Value::String(s.trim_start().to_string()),
            "trimEnd" => Value::String(s.trim_end().to_string()),
            "toString" | "valueOf" => Value::String(s.to_string()),
            "includes" => Value::Boolean(s.contains(text_arg(0).as_str())),
            "startsWith" => Value::Boolean(s.starts_with(text_arg(0).as_str())),
            "endsWith" => Value::Boolean(s.ends_with(text_arg(0).as_str())),
            "indexOf" => Value::Integer(
                s.find(text_arg(0).as_str())
                    .map_or(-1, |byte| s[..byte].chars().count() as i64),
            ),
            "slice" => {
                let (start, end) = slice_bounds(args, len);
                Value::String(chars[start..end].iter().collect())
            }
            "charAt" => Value::String(
                index_arg(args.first())
                    .and_then(|i| chars.get(i))
                    .map(char::to_string)
                    .unwrap_or_default(),
            ),
            "at" => relative_index(args.first(), len)
                .map_or(Value::Null, |i| Value::String(chars[i].to_string())),
            "split" => match args.first() {
                None | Some(Value::Null) => Value::Array(vec![Value::String(s.to_string())]),
                Some(separator) => {
                    let separator = js_string(separator);
                    let parts: Vec<Value> = if separator.is_empty() {
                        chars.iter().map(|c| Value::String(c.to_string())).collect()
                    } else {
                        s.split(separator.as_str()).map(Value::from).collect()
                    };
                    self.charge(parts.len())?;
                    Value::Array(parts)
                }
            },
            "replace" => Value::String(s.replacen(text_arg(0).as_str(), &text_arg(1), 1)),
            "replaceAll" => Value::String(s.replace(text_arg(0).as_str(), &text_arg(1))),
            "repeat" => {
                let count = args.first().map_or(0, to_integer);
                let Ok(count) = usize::try_from(count) else {
                    return Err(ScriptError::TypeError(format!(
                        "invalid repeat count {count}"
                    )));
                };
                self.charge(count.saturating_mul(len))?;
                Value::String(s.repeat(count))
            }
            "padStart" | "padEnd" => {
                let target = usize::try_from(args.first().map_or(0, to_integer)).unwrap_or(0);
                let pad = match args.get(1) {
                    None | Some(Value::Null) => " ".to_string(),
                    Some(pad) => js_string(pad),
                };
                if target <= len || pad.is_empty() {
                    Value::String(s.to_string())
                } else {
                    self.charge(target - len)?;
                    let fill: String = pad.chars().cycle().take(target - len).collect();
                    if method == "padStart" {
                        Value::String(fill + s)
                    } else {
                        Value::String(s.to_string() + &fill)
                    }
                }
            }
            "concat" => {
                let mut joined = s.to_string();
                for arg in args {
                    joined.push_str(&js_string(arg));
                }
                self.charge(joined.len())?;
                Value::String(joined)
            }
            _ => {
                return Err(ScriptError::UnknownMethod {
                    receiver: "string".to_string(),
                    method: method.to_string(),
                });
            }
        };
        Ok(result)
    }

    /// Non-callback array methods. Anything that builds a new array or string
    /// is charged for its size before it is built.
    fn array_method(
        &mut self,
        items: &[Value],
        method: &str,
        args: &[Value],
    ) -> Result<Value, ScriptError> {
        let needle = args.first().unwrap_or(&Value::Null);
        let result = match method {
            "join" | "toString" => {
                let separator = match args.first() {
                    Some(separator) if method == "join" && *separator != Value::Null => {
                        js_string(separator)
                    }
                    _ => ",".to_string(),
                };
                let parts: Vec<String> = items.iter().map(join_part).collect();
                let size = parts
                    .iter()
                    .map(String::len)
                    .fold(0, usize::saturating_add)
                    .saturating_add(separator.len().saturating_mul(parts.len().saturating_sub(1)));
                self.charge(size)?;
                Value::String(parts.join(&separator))
            }
            "includes" => Value::Boolean(items.iter().any(|item| strict_eq(item, needle))),
            "indexOf" => Value::Integer(
                items
                    .iter()
                    .position(|item| strict_eq(item, needle))
                    .map_or(-1, |i| i as i64),
            ),
            "slice" => {
                let (start, end) = slice_bounds(args, items.len());
                self.charge(items_weight(&items[start..end], 0)?)?;
                Value::Array(items[start..end].to_vec())
            }
            "concat" => {
                let mut size = items_weight(items, 0)?;
                for arg in args {
                    size = size.saturating_add(weight(arg, 0)?);
                }
                self.charge(size)?;
                let mut joined = items.to_vec();
                for arg in args {
                    match arg {
                        Value::Array(more) => joined.extend(more.iter().cloned()),
                        other => joined.push(other.clone()),
                    }
                }
                Value::Array(joined)
            }
            "reverse" => {
                self.charge(items_weight(items, 0)?)?;
                Value::Array(items.iter().rev().cloned().collect())
            }
            "at" => {
                relative_index(args.first(), items.len()).map_or(Value::Null, |i| items[i].clone())
            }
            _ => {
                return Err(ScriptError::UnknownMethod {
                    receiver: "array".to_string(),
                    method: method.to_string(),
                });
            }
        };
        Ok(result)
    }
}

/// Size of a copy of `value`: one per character, element and key, with
/// scalars free. Fails once arrays and objects nest past [`MAX_VALUE_DEPTH`].
fn weight(value: &Value, depth: usize) -> Result<usize, ScriptError> {
    match value {
        Value::String(s) => Ok(s.len()),
        Value::Array(items) => items_weight(items, depth),
        Value::Object(map) => {
            if depth >= MAX_VALUE_DEPTH {
                return Err(ScriptError::NestingTooDeep(MAX_VALUE_DEPTH));
            }
            map.iter()
                .try_fold(map.len(), |total, (key, item)| -> Result<usize, ScriptError> {
                    Ok(total.saturating_add(key.len()).saturating_add(weight(item, depth + 1)?))
                })
        }
        _ => Ok(0),
    }
}

fn items_weight(items: &[Value], depth: usize) -> Result<usize, ScriptError> {
    if depth >= MAX_VALUE_DEPTH {
        return Err(ScriptError::NestingTooDeep(MAX_VALUE_DEPTH));
    }
    items
        .iter()
        .try_fold(items.len(), |total, item| -> Result<usize, ScriptError> {
            Ok(total.saturating_add(weight(item, depth + 1)?))
        })
}

fn number_method(target: &Value, method: &str, args: &[Value]) -> Result<Value, ScriptError> {
    match method {
        "toFixed" => {
            let n = to_number(target);
            if !n.is_finite() {
                return Ok(Value::String(format_float(n)));
            }
            let digits = args.first().map_or(0, to_integer).clamp(0, 100) as usize;
            Ok(Value::String(format!("{n:.digits$}")))
        }
        "toString" | "valueOf" => Ok(Value::String(js_string(target))),
        _ => Err(ScriptError::UnknownMethod {
            receiver: "number".to_string(),
            method: method.to_string(),
        }),
    }
}

fn global_method(name: &str, method: &str, args: &[Value]) -> Result<Value, ScriptError> {
    let first = args.first().unwrap_or(&Value::Null);
    let result = match (name, method) {
        ("Math", _) => return math(method, args),
        ("JSON", "stringify") => Value::String(to_json(first)),
        ("JSON", "parse") => {
            return serde_json::from_str::<serde_json::Value>(&js_string(first))
                .map(json_to_value)
                .map_err(|e| ScriptError::TypeError(format!("JSON.parse: {e}")));
        }
        ("Object", "keys") => match first {
            Value::Object(map) => Value::Array(map.keys().map(|k| Value::from(k.as_str())).collect()),
            Value::Array(items) => {
                Value::Array((0..items.len()).map(|i| Value::String(i.to_string())).collect())
            }
            _ => Value::Array(Vec::new()),
        },
        ("Object", "values") => match first {
            Value::Object(map) => Value::Array(map.values().cloned().collect()),
            Value::Array(items) => Value::Array(items.clone()),
            _ => Value::Array(Vec::new()),
        },
        ("Object", "entries") => match first {
            Value::Object(map) => Value::Array(
                map.iter()
                    .map(|(k, v)| Value::Array(vec![Value::from(k.as_str()), v.clone()]))
                    .collect(),
            ),
            _ => Value::Array(Vec::new()),
        },
        ("Number", "isInteger") => {
            Value::Boolean(first.is_number() && to_number(first).fract() == 0.0)
        }
        ("Number", "isNaN") => Value::Boolean(first.is_number() && to_number(first).is_nan()),
        ("Number", "parseFloat") => from_f64(parse_float(&js_string(first))),
        ("Number", "parseInt") => parse_int(&js_string(first), args.get(1)),
        _ => {
            return Err(ScriptError::UnknownMethod {
                receiver: name.to_string(),
                method: method.to_string(),
            });
        }
    };
    Ok(result)
}

fn math(method: &str, args: &[Value]) -> Result<Value, ScriptError> {
    let arg = |i: usize| args.get(i).map_or(f64::NAN, to_number);
    let x = arg(0);
    let result = match method {
        // Halves round towards positive infinity
        "round" => (x + 0.5).floor(),
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        "abs" => x.abs(),
        "sqrt" => x.sqrt(),
        "trunc" => x.trunc(),
        "sign" if x == 0.0 || x.is_nan() => x,
        "sign" => x.signum(),
        "pow" => x.powf(arg(1)),
        "min" => args.iter().map(to_number).fold(f64::INFINITY, |acc, n| {
            if acc.is_nan() || n.is_nan() { f64::NAN } else { acc.min(n) }
        }),
        "max" => args.iter().map(to_number).fold(f64::NEG_INFINITY, |acc, n| {
            if acc.is_nan() || n.is_nan() { f64::NAN } else { acc.max(n) }
        }),
        _ => {
            return Err(ScriptError::UnknownMethod {
                receiver: "Math".to_string(),
                method: method.to_string(),
            });
        }
    };
    Ok(from_f64(result))
}

fn math_constant(name: &str) -> Value {
    match name {
        "PI" => Value::Float(std::f64::consts::PI),
        "E" => Value::Float(std::f64::consts::E),
        _ => Value::Null,
    }
}

fn get_member(target: &Value, property: &str) -> Result<Value, ScriptError> {
    match target {
        Value::Null => Err(ScriptError::TypeError(format!(
            "cannot read properties of null (reading '{property}')"
        ))),
        Value::String(s) if property == "length" => Ok(Value::Integer(s.chars().count() as i64)),
        Value::Array(items) if property == "length" => Ok(Value::Integer(items.len() as i64)),
        Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Null)),
        _ => Ok(Value::Null),
    }
}

fn get_index(target: &Value, key: &Value) -> Result<Value, ScriptError> {
    match (target, key) {
        (Value::Array(items), k) if k.is_number() => Ok(index_arg(Some(k))
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(Value::Null)),
        (Value::String(s), k) if k.is_number() => Ok(index_arg(Some(k))
            .and_then(|i| s.chars().nth(i))
            .map_or(Value::Null, |c| Value::String(c.to_string()))),
        (Value::Object(map), k) => Ok(map.get(&js_string(k)).cloned().unwrap_or(Value::Null)),
        (_, k) => get_member(target, &js_string(k)),
    }
}

fn unary(op: UnaryOp, value: &Value) -> Value {
    match op {
        UnaryOp::Not => Value::Boolean(!value.is_truthy()),
        UnaryOp::Plus => to_numeric(value),
        UnaryOp::Negate => match value {
            Value::Integer(n) => n
                .checked_neg()
                .map_or(Value::Float(-(*n as f64)), Value::Integer),
            Value::Float(n) => Value::Float(-n),
            other => from_f64(-to_number(other)),
        },
    }
}

fn binary(op: BinOp, left: &Value, right: &Value) -> Value {
    match op {
        BinOp::Equal => Value::Boolean(loose_eq(left, right)),
        BinOp::NotEqual => Value::Boolean(!loose_eq(left, right)),
        BinOp::StrictEqual => Value::Boolean(strict_eq(left, right)),
        BinOp::StrictNotEqual => Value::Boolean(!strict_eq(left, right)),
        BinOp::LessThan => Value::Boolean(compare(left, right) == Some(Ordering::Less)),
        BinOp::GreaterThan => Value::Boolean(compare(left, right) == Some(Ordering::Greater)),
        BinOp::LessEqual => Value::Boolean(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinOp::GreaterEqual => Value::Boolean(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinOp::Add if is_string_like(left) || is_string_like(right) => {
            Value::String(js_string(left) + &js_string(right))
        }
        BinOp::Add => numeric(Arith::Add, left, right),
        BinOp::Subtract => numeric(Arith::Subtract, left, right),
        BinOp::Multiply => numeric(Arith::Multiply, left, right),
        BinOp::Divide => numeric(Arith::Divide, left, right),
        BinOp::Modulo => numeric(Arith::Remainder, left, right),
        BinOp::And if left.is_truthy() => right.clone(),
        BinOp::Or if !left.is_truthy() => right.clone(),
        BinOp::NullCoalesce if *left == Value::Null => right.clone(),
        BinOp::And | BinOp::Or | BinOp::NullCoalesce => left.clone(),
    }
}

/// Operands that turn `+` into concatenation.
fn is_string_like(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Array(_) | Value::Object(_))
}

fn numeric(op: Arith, left: &Value, right: &Value) -> Value {
    let (a, b) = (to_numeric(left), to_numeric(right));
    a.arith(op, &b).unwrap_or_else(|| {
        // Division by zero and friends follow IEEE 754
        let x = a.as_float().unwrap_or(f64::NAN);
        let y = b.as_float().unwrap_or(f64::NAN);
        Value::Float(match op {
            Arith::Add => x + y,
            Arith::Subtract => x - y,
            Arith::Multiply => x * y,
            Arith::Divide => x / y,
            Arith::Remainder => x % y,
        })
    })
}

fn strict_eq(left: &Value, right: &Value) -> bool {
    if left.is_number() && right.is_number() {
        left.as_float() == right.as_float()
    } else {
        left == right
    }
}

fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Array(_), Value::String(s)) => js_string(left) == *s,
        (Value::String(s), Value::Array(_)) => js_string(right) == *s,
        (a, b) if a.is_number() || b.is_number() => to_number(a) == to_number(b),
        (Value::Boolean(_), _) | (_, Value::Boolean(_)) => to_number(left) == to_number(right),
        _ => strict_eq(left, right),
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => to_number(left).partial_cmp(&to_number(right)),
    }
}

/// Numeric conversion used by arithmetic and `Number(...)`.
pub(crate) fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Boolean(b) => f64::from(u8::from(*b)),
        Value::Integer(n) => *n as f64,
        Value::Float(n) => *n,
        Value::String(s) => string_to_number(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [only] => to_number(only),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

fn string_to_number(s: &str) -> f64 {
    let text = s.trim();
    match text {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if text.starts_with("0x") || text.starts_with("0X") => {
            i64::from_str_radix(&text[2..], 16).map_or(f64::NAN, |n| n as f64)
        }
        _ if text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')) =>
        {
            text.parse().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

/// Numbers stay as they are; anything else goes through [`to_number`].
fn to_numeric(value: &Value) -> Value {
    match value {
        Value::Integer(_) | Value::Float(_) => value.clone(),
        other => from_f64(to_number(other)),
    }
}

/// Whole doubles within the exact range become integers.
fn from_f64(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_SAFE_FLOAT {
        Value::Integer(n as i64)
    } else {
        Value::Float(n)
    }
}

fn to_integer(value: &Value) -> i64 {
    let n = to_number(value);
    if n.is_nan() { 0 } else { n.trunc() as i64 }
}

/// String conversion used by `+`, `String(...)` and `join`.
pub(crate) fn js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(n) => format_float(*n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(join_part).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn join_part(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => js_string(other),
    }
}

fn index_arg(arg: Option<&Value>) -> Option<usize> {
    arg.and_then(Value::as_int)
        .and_then(|n| usize::try_from(n).ok())
}

/// Index counted from the end when negative, `None` when out of range.
fn relative_index(arg: Option<&Value>, len: usize) -> Option<usize> {
    let n = arg.map_or(0, to_integer);
    let index = if n < 0 {
        len.checked_sub(usize::try_from(n.unsigned_abs()).ok()?)?
    } else {
        usize::try_from(n).ok()?
    };
    (index < len).then_some(index)
}

/// Clamped `[start, end)` for `slice(start?, end?)`.
fn slice_bounds(args: &[Value], len: usize) -> (usize, usize) {
    let bound = |arg: Option<&Value>, default: usize| match arg {
        None | Some(Value::Null) => default,
        Some(value) => {
            let n = to_integer(value);
            if n < 0 {
                len.saturating_sub(usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX))
            } else {
                usize::try_from(n).unwrap_or(usize::MAX).min(len)
            }
        }
    };
    let start = bound(args.first(), 0);
    let end = bound(args.get(1), len);
    (start.min(end), end)
}

fn parse_int(text: &str, radix: Option<&Value>) -> Value {
    let text = text.trim();
    let (negative, mut digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let mut radix = radix.map_or(0, to_integer);
    if (radix == 0 || radix == 16)
        && let Some(hex) = digits.strip_prefix("0x").or(digits.strip_prefix("0X"))
    {
        digits = hex;
        radix = 16;
    }
    let radix = if radix == 0 { 10 } else { radix };
    let Ok(radix) = u32::try_from(radix) else {
        return Value::Float(f64::NAN);
    };
    if !(2..=36).contains(&radix) {
        return Value::Float(f64::NAN);
    }

    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix))
        .map_or(digits.len(), |(i, _)| i);
    let digits = &digits[..end];
    if digits.is_empty() {
        return Value::Float(f64::NAN);
    }

    let value = match i64::from_str_radix(digits, radix) {
        Ok(n) => Value::Integer(n),
        Err(_) => Value::Float(
            digits
                .chars()
                .filter_map(|c| c.to_digit(radix))
                .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d)),
        ),
    };
    if negative { unary(UnaryOp::Negate, &value) } else { value }
}

/// Longest numeric prefix, `NaN` when there is none.
fn parse_float(text: &str) -> f64 {
    let text = text.trim_start();
    for (word, value) in [
        ("Infinity", f64::INFINITY),
        ("+Infinity", f64::INFINITY),
        ("-Infinity", f64::NEG_INFINITY),
    ] {
        if text.starts_with(word) {
            return value;
        }
    }

    let bytes = text.as_bytes();
    let digits_at = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_at(sign);
    let mut end = int_end;
    if bytes.get(end) == Some(&b'.') {
        end = digits_at(end + 1);
    }
    // Needs at least one digit before or after the point
    if int_end == sign && end <= sign + 1 {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_digits = end + 1 + usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_at(exp_digits);
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    text[..end].parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_equality() {
        assert!(loose_eq(&Value::from("1"), &Value::Integer(1)));
        assert!(loose_eq(&Value::Boolean(true), &Value::Integer(1)));
        assert!(loose_eq(&Value::Integer(2), &Value::Float(2.0)));
        assert!(!loose_eq(&Value::Null, &Value::Integer(0)));
        assert!(!strict_eq(&Value::from("1"), &Value::Integer(1)));
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!(
            js_string(&Value::Array(vec![
                Value::Integer(1),
                Value::Null,
                Value::from("x")
            ])),
            "1,,x"
        );
        assert_eq!(js_string(&Value::Float(2.5)), "2.5");
        assert_eq!(to_number(&Value::from(" 42 ")), 42.0);
        assert!(to_number(&Value::from("4 2")).is_nan());
    }

    #[test]
    fn test_parse_number_prefixes() {
        assert_eq!(parse_int("42px", None), Value::Integer(42));
        assert_eq!(parse_int("-0x1f", None), Value::Integer(-31));
        assert_eq!(parse_int("101", Some(&Value::Integer(2))), Value::Integer(5));
        assert!(matches!(parse_int("abc", None), Value::Float(n) if n.is_nan()));
        assert_eq!(parse_float("3.25kg"), 3.25);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("1e3x"), 1000.0);
        assert!(parse_float(".").is_nan());
    }

    #[test]
    fn test_relative_index() {
        assert_eq!(relative_index(Some(&Value::Integer(-1)), 3), Some(2));
        assert_eq!(relative_index(Some(&Value::Integer(3)), 3), None);
        assert_eq!(slice_bounds(&[Value::Integer(-2)], 5), (3, 5));
        assert_eq!(slice_bounds(&[Value::Integer(4), Value::Integer(1)], 5), (1, 1));
    }
}
