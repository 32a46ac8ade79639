//! Parse and evaluate single queries

use std::path::PathBuf;

use super::{CliError, load_settings, open_store};
use crate::{QueryParser, Value, compute_value};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The query to evaluate
    pub query: String,
    /// Vault root directory
    pub vault: PathBuf,
    /// Document the query belongs to, relative to the vault root
    pub note: String,
    /// Settings file holding custom functions
    pub settings: Option<PathBuf>,
}

/// Parses a query and returns its JSON representation.
///
/// Custom function names from `settings` are accepted.
pub fn execute_parse(
    query: &str,
    settings: Option<&std::path::Path>,
) -> Result<serde_json::Value, CliError> {
    let settings = load_settings(settings)?;
    let parser = QueryParser::new().with_custom_functions(settings.function_names());
    let parsed = parser.parse(query)?;
    Ok(serde_json::to_value(parsed)?)
}

/// Evaluates a query in the context of one document.
pub fn execute_eval(options: &EvalOptions) -> Result<Value, CliError> {
    let settings = load_settings(options.settings.as_deref())?;
    let parser = QueryParser::new().with_custom_functions(settings.function_names());
    let query = parser.parse(&options.query)?;

    let store = open_store(&options.vault, Some(&options.note))?;
    let ctx = store
        .context(&options.note, &settings.custom_functions)
        .with_limits(settings.script_limits());

    compute_value(&query, &ctx).ok_or_else(|| CliError::Undefined(options.query.clone()))
}
