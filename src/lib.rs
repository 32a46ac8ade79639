//! Live variables for Markdown vaults.
//!
//! Documents carry properties in their YAML front matter. A query such as
//! `sum(rent, bills/march.md/total)` computes a value from those properties,
//! and inline [`markup`] keeps the rendered result next to the query so it can
//! be refreshed when the properties change.
//!
//! The pieces, bottom-up:
//!
//! - [`source`]: where documents and their properties come from
//! - [`store`]: the property tree and path index built from a source
//! - [`query`]: query text to [`VarQuery`]
//! - [`functions`]: evaluating a [`VarQuery`] against a snapshot
//! - [`lexer`], [`parser`], [`evaluator`]: the sandboxed language of custom functions
//! - [`settings`]: persisted custom functions and limits
pub mod ast;
pub mod change;
pub mod cli;
pub mod convert;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod markup;
pub mod output;
pub mod parser;
pub mod path;
pub mod query;
pub mod settings;
pub mod source;
pub mod store;
pub mod value;

pub use ast::{FunctionKind, Lambda, Token, VarQuery};
pub use change::ChangeTracker;
pub use evaluator::{Script, ScriptError, ScriptLimits};
pub use functions::{EvaluationContext, compute_value, resolve_reference};
pub use lexer::{LexError, Lexer, Position};
pub use output::{stringify, to_json, to_json_pretty};
pub use parser::{Parser, SyntaxError};
pub use query::{ParseError, QueryParser, parse_args, parse_query, try_parse_query};
pub use settings::{
    CustomFunction, JsonFileSettingsStore, MemorySettingsStore, Settings, SettingsError,
    SettingsStore,
};
pub use source::{DocumentSource, FsVault, InMemoryVault, Properties, SourceError};
pub use store::{Property, PropertyNode, PropertyStore, PropertyTree};
pub use value::Value;
