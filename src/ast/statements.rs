use crate::ast::Expr;

/// Statement inside a function block body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Local binding
    ///
    /// # Example
    /// ```text
    /// const rate = 0.2;
    /// ```
    Declare { name: String, value: Expr },

    /// Return from the function
    ///
    /// # Example
    /// ```text
    /// return net * (1 + rate);
    /// ```
    Return(Expr),

    /// Expression evaluated for nothing but its failures
    Expression(Expr),
}
