//! # Syntax trees
//!
//! Two languages meet in a live-variable query:
//!
//! - the **query language**, a single call such as `sum(a, notes/b.md/c)`,
//!   represented by [`VarQuery`] and [`FunctionKind`] ([query]);
//! - the **custom-function language**, the JavaScript-flavoured function
//!   literal carried by `jsFunc` and by named custom functions, e.g.
//!   `(price, qty) => price * qty`.
//!
//! The custom-function language is deliberately small: expressions,
//! `const`/`let` bindings and `return` inside a function body, and nothing
//! that can loop or reach outside the arguments it is called with.
//!
//! ## Submodules
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, access, operations, calls)
//! - **[operators]** - Binary and prefix operators
//! - **[statements]** - Statements of a braced function body
//! - **[lambda]** - Function literals
//! - **[query]** - Parsed queries
//!
//! ## Examples
//!
//! ```text
//! x => x * 2
//! (a, b) => a + b
//! (items) => items.filter(i => i.done).length
//! function (net) { const rate = 0.2; return net * (1 + rate); }
//! ```
pub mod expressions;
pub mod lambda;
pub mod operators;
pub mod query;
pub mod statements;
pub mod tokens;

pub use expressions::Expr;
pub use lambda::{Body, Lambda};
pub use operators::{BinOp, UnaryOp};
pub use query::{FunctionKind, VarQuery};
pub use statements::Statement;
pub use tokens::Token;
