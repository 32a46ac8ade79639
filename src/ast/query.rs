use std::fmt;

use serde::{Deserialize, Serialize};

/// The function a query calls.
///
/// The built-in set is closed. `Custom` names a user function registered in
/// the settings; its body is looked up at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum FunctionKind {
    /// `get(ref)` - the value of one property
    Get,
    /// `sum(ref, ...)` - numeric sum, or concatenation for anything else
    Sum,
    /// `jsFunc(ref, ..., func = code)` - an inline custom function
    JsFunc,
    /// `codeBlock(ref, ..., code = text, lang = language)` - a templated code block
    CodeBlock,
    /// `concat(...)` - reserved, parses but has no evaluation
    Concat,
    /// A named function from the settings
    Custom(String),
}

impl FunctionKind {
    /// Every built-in function, in the order they are matched.
    pub const BUILTINS: [FunctionKind; 5] = [
        FunctionKind::Get,
        FunctionKind::Sum,
        FunctionKind::JsFunc,
        FunctionKind::CodeBlock,
        FunctionKind::Concat,
    ];

    /// Maps a built-in name to its kind.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "get" => Some(FunctionKind::Get),
            "sum" => Some(FunctionKind::Sum),
            "jsFunc" => Some(FunctionKind::JsFunc),
            "codeBlock" => Some(FunctionKind::CodeBlock),
            "concat" => Some(FunctionKind::Concat),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FunctionKind::Get => "get",
            FunctionKind::Sum => "sum",
            FunctionKind::JsFunc => "jsFunc",
            FunctionKind::CodeBlock => "codeBlock",
            FunctionKind::Concat => "concat",
            FunctionKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<FunctionKind> for String {
    fn from(kind: FunctionKind) -> Self {
        kind.name().to_string()
    }
}

impl From<String> for FunctionKind {
    fn from(name: String) -> Self {
        FunctionKind::builtin(&name).unwrap_or(FunctionKind::Custom(name))
    }
}

/// A parsed query: which function to call and its raw arguments.
///
/// Arguments are unresolved text. Their order follows the evaluator's
/// convention: for `jsFunc` the code comes first, for `codeBlock` the code
/// and language come first, followed by the variable references.
///
/// Arguments are kept in the form the query grammar reads back: trimmed, and
/// for the plain functions a lone empty reference is the same as none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "QueryParts")]
pub struct VarQuery {
    function: FunctionKind,
    arguments: Vec<String>,
}

#[derive(Deserialize)]
struct QueryParts {
    function: FunctionKind,
    arguments: Vec<String>,
}

impl From<QueryParts> for VarQuery {
    fn from(parts: QueryParts) -> Self {
        VarQuery::new(parts.function, parts.arguments)
    }
}

impl VarQuery {
    pub fn new(function: FunctionKind, arguments: Vec<String>) -> Self {
        let mut arguments: Vec<String> = arguments
            .into_iter()
            .map(|argument| argument.trim().to_string())
            .collect();
        let has_code = matches!(function, FunctionKind::JsFunc | FunctionKind::CodeBlock);
        if !has_code && arguments.len() == 1 && arguments[0].is_empty() {
            arguments.clear();
        }
        VarQuery {
            function,
            arguments,
        }
    }

    pub fn function(&self) -> &FunctionKind {
        &self.function
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// The variable references, skipping code and language arguments.
    pub fn references(&self) -> &[String] {
        let skip = match self.function {
            FunctionKind::JsFunc => 1,
            FunctionKind::CodeBlock => 2,
            _ => 0,
        };
        self.arguments.get(skip..).unwrap_or(&[])
    }
}
