//! The function table: evaluates a [`VarQuery`] against a property snapshot.
//!
//! Every failure below the table (unresolvable references, custom code that
//! does not compile or throws, template mismatches) is reported as `None`,
//! which callers render as "undefined".

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::{
    ast::{FunctionKind, VarQuery},
    evaluator::{Script, ScriptLimits},
    output::{common_type, stringify},
    path::lookup,
    settings::CustomFunction,
    store::PropertyTree,
    value::{Arith, Value},
};

/// `{{name}}` placeholders of a code block template.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.+?)\}\}").expect("invalid placeholder pattern"));

/// Everything one evaluation needs, borrowed from its owners.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Document that unqualified references resolve against
    pub current_document: &'a str,
    pub tree: &'a PropertyTree,
    pub custom_functions: &'a [CustomFunction],
    pub limits: ScriptLimits,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(current_document: &'a str, tree: &'a PropertyTree) -> Self {
        EvaluationContext {
            current_document,
            tree,
            custom_functions: &[],
            limits: ScriptLimits::default(),
        }
    }

    pub fn with_custom_functions(mut self, custom_functions: &'a [CustomFunction]) -> Self {
        self.custom_functions = custom_functions;
        self
    }

    pub fn with_limits(mut self, limits: ScriptLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn custom_function(&self, name: &str) -> Option<&'a CustomFunction> {
        self.custom_functions.iter().find(|f| f.name == name)
    }
}

/// Resolves a variable reference to a value.
///
/// A reference without `/` is a property path in the current document.
/// Otherwise everything before the last `/` names the document and the rest
/// is the property path, e.g. `projects/budget.md/items[0].cost`.
pub fn resolve_reference(reference: &str, ctx: &EvaluationContext<'_>) -> Option<Value> {
    if reference.is_empty() {
        return None;
    }
    let (document, property) = match reference.rfind('/') {
        Some(slash) => (&reference[..slash], &reference[slash + 1..]),
        None => (ctx.current_document, reference),
    };

    let Some(properties) = ctx.tree.document(document) else {
        debug!("no document '{}' for reference '{}'", document, reference);
        return None;
    };
    let value = lookup(properties, property).cloned();
    if value.is_none() {
        debug!("'{}' not found in '{}'", property, document);
    }
    value
}

/// Evaluates a parsed query.
///
/// # Examples
///
/// ```
/// use livevars::{EvaluationContext, InMemoryVault, PropertyTree, Value, compute_value, parse_query};
/// use serde_json::json;
///
/// let mut vault = InMemoryVault::new();
/// vault.insert_json("budget.md", json!({"rent": 900, "food": 350}));
/// let tree = PropertyTree::build(&vault).unwrap();
/// let ctx = EvaluationContext::new("budget.md", &tree);
///
/// let query = parse_query("sum(rent, food)").unwrap();
/// assert_eq!(compute_value(&query, &ctx), Some(Value::Integer(1250)));
/// ```
pub fn compute_value(query: &VarQuery, ctx: &EvaluationContext<'_>) -> Option<Value> {
    let args = query.arguments();
    match query.function() {
        FunctionKind::Get => get(args, ctx),
        FunctionKind::Sum => Some(sum(args, ctx)),
        FunctionKind::JsFunc => {
            let (code, references) = args.split_first()?;
            run_custom(code, references, ctx)
        }
        FunctionKind::CodeBlock => code_block(args, ctx),
        FunctionKind::Custom(name) => {
            let Some(function) = ctx.custom_function(name) else {
                warn!("custom function '{}' is not defined", name);
                return None;
            };
            run_custom(&function.code, args, ctx)
        }
        FunctionKind::Concat => {
            warn!("concat is reserved and has no implementation yet");
            None
        }
    }
}

fn get(args: &[String], ctx: &EvaluationContext<'_>) -> Option<Value> {
    let reference = match args {
        // An unfilled slot
        [] => "",
        [reference] => reference.as_str(),
        _ => {
            warn!("get takes exactly one reference, got {}", args.len());
            return None;
        }
    };
    Some(resolve_reference(reference, ctx).unwrap_or_else(|| Value::String(String::new())))
}

/// Numeric sum when every value is a number, concatenation otherwise.
fn sum(args: &[String], ctx: &EvaluationContext<'_>) -> Value {
    let values: Vec<Option<Value>> = args.iter().map(|r| resolve_reference(r, ctx)).collect();

    if values.is_empty() || common_type(&values) == "number" {
        values
            .into_iter()
            .flatten()
            .fold(Value::Integer(0), |acc, value| {
                acc.arith(Arith::Add, &value).unwrap_or(acc)
            })
    } else {
        let text: String = values
            .iter()
            .map(|value| value.as_ref().map(stringify).unwrap_or_default())
            .collect();
        Value::String(text)
    }
}

/// Resolves every reference, `None` if any of them is missing.
fn resolve_all(references: &[String], ctx: &EvaluationContext<'_>) -> Option<Vec<Value>> {
    references
        .iter()
        .map(|reference| {
            let value = resolve_reference(reference, ctx);
            if value.is_none() {
                debug!("unresolved reference '{}'", reference);
            }
            value
        })
        .collect()
}

fn run_custom(code: &str, references: &[String], ctx: &EvaluationContext<'_>) -> Option<Value> {
    let values = resolve_all(references, ctx)?;
    match Script::compile(code).and_then(|script| script.call(values, ctx.limits)) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            warn!("custom function failed: {}", e);
            None
        }
    }
}

fn code_block(args: &[String], ctx: &EvaluationContext<'_>) -> Option<Value> {
    let [code, lang, references @ ..] = args else {
        warn!("codeBlock needs code and lang arguments");
        return None;
    };
    let values = resolve_all(references, ctx)?;

    let placeholders = PLACEHOLDER.find_iter(code).count();
    if placeholders != values.len() {
        warn!(
            "codeBlock has {} placeholder(s) but {} reference(s)",
            placeholders,
            values.len()
        );
        return None;
    }

    let mut values = values.iter();
    let body = PLACEHOLDER.replace_all(code, |_: &Captures<'_>| {
        values.next().map(stringify).unwrap_or_default()
    });
    Some(Value::String(format!("```{lang}\n{body}\n```")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryVault;
    use serde_json::json;

    fn tree() -> PropertyTree {
        let mut vault = InMemoryVault::new();
        vault.insert_json("a.md", json!({"x": 1, "nested": {"list": [10, 20]}}));
        vault.insert_json("dir/b.md", json!({"y": "text"}));
        PropertyTree::build(&vault).unwrap()
    }

    #[test]
    fn test_resolve_reference() {
        let tree = tree();
        let ctx = EvaluationContext::new("a.md", &tree);
        assert_eq!(resolve_reference("x", &ctx), Some(Value::Integer(1)));
        assert_eq!(resolve_reference("nested.list[1]", &ctx), Some(Value::Integer(20)));
        assert_eq!(resolve_reference("dir/b.md/y", &ctx), Some(Value::from("text")));
        assert_eq!(resolve_reference("dir/missing.md/y", &ctx), None);
        assert_eq!(resolve_reference("", &ctx), None);
    }

    #[test]
    fn test_placeholders_are_positional() {
        let tree = tree();
        let ctx = EvaluationContext::new("a.md", &tree);
        let args = ["{{a}} + {{a}}", "py", "x", "dir/b.md/y"].map(String::from);
        assert_eq!(
            code_block(&args, &ctx),
            Some(Value::from("```py\n1 + text\n```"))
        );
    }
}
