//! CLI support for livevars
//!
//! The command implementations live here rather than in the binary so they
//! can be driven from tests and other tools.

mod docs;
mod eval;
mod functions;
mod paths;
mod render;

pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use eval::{EvalOptions, execute_eval, execute_parse};
pub use functions::{add_function, list_functions, remove_function};
pub use paths::{PathsOptions, execute_paths, execute_preview};
pub use render::{RenderOptions, RenderOutcome, execute_render};

use std::{io, path::Path};

use thiserror::Error;

use crate::{
    FsVault, JsonFileSettingsStore, ParseError, PropertyStore, ScriptError, Settings,
    SettingsError, SettingsStore, SourceError,
};

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("no query provided, pass one as an argument or pipe it to stdin")]
    NoInput,

    #[error("'{0}' has no value")]
    Undefined(String),

    #[error("'{0}' is not a valid function name")]
    InvalidName(String),

    #[error("custom function '{0}' already exists")]
    DuplicateFunction(String),

    #[error("custom function '{0}' does not exist")]
    UnknownFunction(String),

    #[error("custom function '{name}' does not compile: {source}")]
    InvalidFunction {
        name: String,
        #[source]
        source: ScriptError,
    },

    #[error("unknown category: '{0}'\nRun 'livevars docs' to see available categories.")]
    UnknownCategory(String),
}

/// Loads settings from `path`, or the defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Ok(JsonFileSettingsStore::new(path).load()?),
        None => Ok(Settings::default()),
    }
}

/// Indexes the vault at `root`, with `note` as the local scope if given.
pub fn open_store(root: &Path, note: Option<&str>) -> Result<PropertyStore<FsVault>, CliError> {
    let mut store = PropertyStore::new(FsVault::new(root))?;
    if let Some(note) = note {
        store.refresh_for(note)?;
    }
    Ok(store)
}
