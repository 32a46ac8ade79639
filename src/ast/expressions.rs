use crate::ast::{BinOp, Lambda, UnaryOp};

/// Abstract Syntax Tree node of a custom-function expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal floating point number
    Float(f64),

    /// Literal integer
    Integer(i64),

    /// String literal
    String(String),

    /// Boolean literal
    Boolean(bool),

    /// `null` or `undefined`
    Null,

    // References
    /// A name: a parameter, a block binding, or a global such as `Math`
    ///
    /// # Examples
    /// ```text
    /// price
    /// Math
    /// ```
    Identifier(String),

    // Access
    /// Member access by name
    ///
    /// # Examples
    /// ```text
    /// item.price
    /// tags.length
    /// ```
    Member {
        object: Box<Expr>,
        property: String,
    },

    /// Computed access
    ///
    /// # Examples
    /// ```text
    /// items[0]
    /// row["total"]
    /// ```
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },

    // Operations
    /// Prefix operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Binary operation (arithmetic, comparison, logical)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Ternary conditional (`cond ? a : b`)
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },

    /// Call of a global function
    ///
    /// # Examples
    /// ```text
    /// String(total)
    /// parseFloat(text)
    /// ```
    Call {
        callee: String,
        args: Vec<Expr>,
    },

    /// Method call
    ///
    /// # Examples
    /// ```text
    /// name.toUpperCase()
    /// items.map(x => x * 2)
    /// Math.max(a, b)
    /// ```
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },

    /// A function literal, only valid as the script itself or as a callback
    /// argument of an array method
    Function(Lambda),

    // Object and Array Literals
    /// Object literal
    ///
    /// # Example
    /// ```text
    /// {total: a + b, label: "sum"}
    /// ```
    Object(Vec<(String, Expr)>),

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [a, b, 3]
    /// ```
    Array(Vec<Expr>),
}
