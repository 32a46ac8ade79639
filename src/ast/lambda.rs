use crate::ast::{Expr, Statement};

/// A function literal.
///
/// Written as an arrow function (`(a, b) => a + b`, `x => x * 2`) or a
/// `function` expression (`function (a, b) { return a + b; }`).
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    /// Parameter names, bound positionally
    pub params: Vec<String>,

    /// Function body
    pub body: Body,
}

/// Body of a [`Lambda`].
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Arrow function with an expression body; its value is returned
    Expr(Box<Expr>),

    /// Braced body; the first `return` ends it, falling off the end returns null
    Block(Vec<Statement>),
}

impl Lambda {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}
