//! Manage saved custom functions

use super::CliError;
use crate::{CustomFunction, FunctionKind, Script, SettingsStore};

pub fn list_functions(store: &impl SettingsStore) -> Result<Vec<CustomFunction>, CliError> {
    Ok(store.load()?.custom_functions)
}

/// Compiles and saves a new custom function.
///
/// The name must be an identifier that does not shadow a built-in, and the
/// code must be a function literal.
pub fn add_function(store: &impl SettingsStore, name: &str, code: &str) -> Result<(), CliError> {
    let valid_name = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_name || FunctionKind::builtin(name).is_some() {
        return Err(CliError::InvalidName(name.to_string()));
    }

    Script::compile(code).map_err(|source| CliError::InvalidFunction {
        name: name.to_string(),
        source,
    })?;

    let mut settings = store.load()?;
    if !settings.save_function(name, code.trim()) {
        return Err(CliError::DuplicateFunction(name.to_string()));
    }
    store.save(&settings)?;
    Ok(())
}

pub fn remove_function(store: &impl SettingsStore, name: &str) -> Result<CustomFunction, CliError> {
    let mut settings = store.load()?;
    let removed = settings
        .remove_function(name)
        .ok_or_else(|| CliError::UnknownFunction(name.to_string()))?;
    store.save(&settings)?;
    Ok(removed)
}
