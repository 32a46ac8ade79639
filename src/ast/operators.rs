/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Comparison
    /// Loose equal (`==`)
    Equal,
    /// Loose not equal (`!=`)
    NotEqual,
    /// Strict equal (`===`)
    StrictEqual,
    /// Strict not equal (`!==`)
    StrictNotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Remainder (`%`)
    Modulo,

    // Logical (short-circuit, yield an operand)
    /// Logical AND (`&&`)
    And,
    /// Logical OR (`||`)
    Or,

    // Null-coalescing
    /// Null-coalescing (`??`)
    NullCoalesce,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!x`
    Not,
    /// `-x`
    Negate,
    /// `+x`, numeric conversion
    Plus,
}
