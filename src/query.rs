//! Query text to [`VarQuery`] and back.
//!
//! A query is a single call, `<name>(<arguments>)`. Arguments stay raw
//! strings here; resolving them against the property store happens in
//! [`crate::functions`].

use std::{fmt, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

use crate::ast::{FunctionKind, VarQuery};

/// `name(body)`, where the body runs to the last `)`.
static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*([A-Za-z_][A-Za-z0-9_]*)\s*\((.*)\)\s*$").expect("invalid call pattern")
});

/// `[vars,] func = code`, the greedy prefix makes the last `, func =` win.
static JS_FUNC_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?:(.*),)?\s*func\s*=\s*(.+)$").expect("invalid jsFunc pattern")
});

/// `[vars,] code = text, lang = language`; the first `, code =` ends the
/// variables and the last `, lang =` ends the code.
static CODE_BLOCK_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?:(.*?),)?\s*code\s*=\s*(.*),\s*lang\s*=\s*(.*?)\s*$")
        .expect("invalid codeBlock pattern")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed query '{0}', expected name(arguments)")]
    MalformedCall(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("cannot parse arguments of {function}: '{arguments}'")]
    ArgumentParsing {
        function: FunctionKind,
        arguments: String,
    },
}

/// Query parser aware of the user's custom function names.
///
/// # Examples
///
/// ```
/// use livevars::{FunctionKind, QueryParser};
///
/// let parser = QueryParser::new().with_custom_functions(["double"]);
/// let query = parser.parse("double(price)").unwrap();
/// assert_eq!(query.function(), &FunctionKind::Custom("double".to_string()));
/// assert_eq!(query.arguments(), ["price"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    custom_functions: Vec<String>,
}

impl QueryParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `names` as callable custom functions. Built-in names win.
    pub fn with_custom_functions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_functions
            .extend(names.into_iter().map(Into::into));
        self
    }

    fn function_kind(&self, name: &str) -> Option<FunctionKind> {
        FunctionKind::builtin(name).or_else(|| {
            self.custom_functions
                .iter()
                .any(|custom| custom == name)
                .then(|| FunctionKind::Custom(name.to_string()))
        })
    }

    pub fn parse(&self, text: &str) -> Result<VarQuery, ParseError> {
        let captures = CALL
            .captures(text)
            .ok_or_else(|| ParseError::MalformedCall(text.to_string()))?;
        let name = &captures[1];
        let function = self
            .function_kind(name)
            .ok_or_else(|| ParseError::UnknownFunction(name.to_string()))?;
        let arguments = parse_args(&function, &captures[2])?;
        Ok(VarQuery::new(function, arguments))
    }

    pub fn try_parse(&self, text: &str) -> Option<VarQuery> {
        self.parse(text).ok()
    }
}

/// Parses a query that calls a built-in function.
///
/// # Examples
///
/// ```
/// use livevars::{FunctionKind, parse_query};
///
/// let query = parse_query("sum(a, notes/b.md/c)").unwrap();
/// assert_eq!(query.function(), &FunctionKind::Sum);
/// assert_eq!(query.arguments(), ["a", "notes/b.md/c"]);
/// ```
pub fn parse_query(text: &str) -> Result<VarQuery, ParseError> {
    QueryParser::new().parse(text)
}

/// [`parse_query`] without the error.
pub fn try_parse_query(text: &str) -> Option<VarQuery> {
    parse_query(text).ok()
}

/// Splits the argument body of a call according to the function's grammar.
///
/// `jsFunc` yields `[code, vars...]` and `codeBlock` yields
/// `[code, lang, vars...]`; everything else is a comma-separated list.
pub fn parse_args(function: &FunctionKind, arguments: &str) -> Result<Vec<String>, ParseError> {
    let failed = || ParseError::ArgumentParsing {
        function: function.clone(),
        arguments: arguments.to_string(),
    };

    match function {
        FunctionKind::JsFunc => {
            let captures = JS_FUNC_ARGS.captures(arguments).ok_or_else(failed)?;
            let code = captures[2].trim();
            if code.is_empty() {
                return Err(failed());
            }
            let mut parsed = vec![code.to_string()];
            parsed.extend(
                captures
                    .get(1)
                    .map(|m| split_references(m.as_str()))
                    .unwrap_or_default(),
            );
            Ok(parsed)
        }
        FunctionKind::CodeBlock => {
            let captures = CODE_BLOCK_ARGS.captures(arguments).ok_or_else(failed)?;
            let mut parsed = vec![captures[2].trim().to_string(), captures[3].to_string()];
            parsed.extend(
                captures
                    .get(1)
                    .map(|m| split_references(m.as_str()))
                    .unwrap_or_default(),
            );
            Ok(parsed)
        }
        _ => Ok(split_list(arguments)),
    }
}

/// Comma-separated, trimmed; a blank list has no items.
fn split_list(list: &str) -> Vec<String> {
    if list.trim().is_empty() {
        return Vec::new();
    }
    split_references(list)
}

/// Comma-separated, trimmed; a blank list is one empty reference.
fn split_references(list: &str) -> Vec<String> {
    list.split(',').map(|item| item.trim().to_string()).collect()
}

impl fmt::Display for VarQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function())?;
        let arguments = self.arguments();
        let references = self.references();
        // Code functions write `, ` even after one empty reference so it reads back
        if !references.is_empty()
            && matches!(self.function(), FunctionKind::JsFunc | FunctionKind::CodeBlock)
        {
            write!(f, "{}, ", references.join(", "))?;
        }
        match self.function() {
            FunctionKind::JsFunc => {
                let code = arguments.first().map_or("", String::as_str);
                write!(f, "func = {code}")?;
            }
            FunctionKind::CodeBlock => {
                let code = arguments.first().map_or("", String::as_str);
                let lang = arguments.get(1).map_or("", String::as_str);
                write!(f, "code = {code}, lang = {lang}")?;
            }
            _ => f.write_str(&references.join(", "))?,
        }
        f.write_str(")")
    }
}
