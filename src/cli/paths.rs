//! Path suggestions and value previews

use std::path::PathBuf;

use super::{CliError, open_store};
use crate::Property;

/// Options for the paths command
#[derive(Debug, Clone, Default)]
pub struct PathsOptions {
    /// Substring (or prefix) to look for; empty lists everything
    pub filter: String,
    /// Vault root directory
    pub vault: PathBuf,
    /// Document providing the local scope
    pub note: Option<String>,
    /// Match at the start of the path instead of anywhere
    pub prefix: bool,
    /// Only paths inside the local document
    pub local: bool,
}

/// Lists matching paths, local ones first, each with a preview of its value.
pub fn execute_paths(options: &PathsOptions) -> Result<Vec<Property>, CliError> {
    let store = open_store(&options.vault, options.note.as_deref())?;
    let filter = options.filter.as_str();

    let paths = match (options.local, options.prefix) {
        (true, true) => store
            .find_local_paths_containing(filter)
            .into_iter()
            .filter(|p| p.starts_with(filter))
            .collect(),
        (true, false) => store.find_local_paths_containing(filter),
        (false, true) => store.find_paths_starting_with(filter),
        (false, false) => store.find_paths_containing(filter),
    };

    Ok(paths
        .into_iter()
        .map(|key| {
            let value = store.preview_of(&key);
            Property { key, value }
        })
        .collect())
}

/// The preview shown for one path.
pub fn execute_preview(
    vault: &std::path::Path,
    note: Option<&str>,
    path: &str,
) -> Result<String, CliError> {
    let store = open_store(vault, note)?;
    Ok(store.preview_of(path))
}
