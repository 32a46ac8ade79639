//! Re-render the live variables of a document

use std::path::PathBuf;

use tracing::info;

use super::{CliError, load_settings, open_store};
use crate::{QueryParser, markup};

/// Options for the render command
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Vault root directory
    pub vault: PathBuf,
    /// Document to render, relative to the vault root
    pub note: String,
    /// Settings file holding custom functions
    pub settings: Option<PathBuf>,
    /// Write the result back to the document
    pub write: bool,
}

/// Result of a render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// The rendered document text
    pub text: String,
    /// Whether rendering changed anything
    pub changed: bool,
}

/// Recomputes every span of a document.
pub fn execute_render(options: &RenderOptions) -> Result<RenderOutcome, CliError> {
    let settings = load_settings(options.settings.as_deref())?;
    let parser = QueryParser::new().with_custom_functions(settings.function_names());

    let store = open_store(&options.vault, Some(&options.note))?;
    let body = store.source().read_body(&options.note)?;
    let ctx = store
        .context(&options.note, &settings.custom_functions)
        .with_limits(settings.script_limits());

    let text = markup::render(&body, &ctx, &parser);
    let changed = text != body;
    if options.write && changed {
        store.source().write_body(&options.note, &text)?;
        info!("rewrote {}", options.note);
    }
    Ok(RenderOutcome { text, changed })
}
