/// Lexical tokens of the custom-function language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e3
    /// ```
    Float(f64),

    /// Integer
    Integer(i64),

    /// String literal in single or double quotes
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'item #1'
    /// ```
    String(String),

    /// `true` / `false`
    Boolean(bool),

    /// `null`
    Null,

    /// `undefined`, evaluated as null
    Undefined,

    // Identifiers and keywords
    /// Parameter, binding, global or member name
    ///
    /// Starts with a letter, `_` or `$`, followed by letters, digits, `_` or `$`.
    Identifier(String),

    /// `function`
    Function,

    /// `return`
    Return,

    /// `const`, `let` or `var`
    Declare,

    // Operators
    /// Arrow of an arrow function (`=>`)
    Arrow,

    /// Addition or string concatenation
    Plus,

    /// Subtraction or negation
    Minus,

    /// Multiplication
    Star,

    /// Division
    Slash,

    /// Remainder
    Percent,

    /// Loose equality (`==`)
    EqEq,

    /// Strict equality (`===`)
    EqEqEq,

    /// Loose inequality (`!=`)
    NotEq,

    /// Strict inequality (`!==`)
    NotEqEq,

    Lt,
    Gt,
    LtEq,
    GtEq,

    /// Logical AND (`&&`)
    AndAnd,

    /// Logical OR (`||`)
    OrOr,

    /// Logical NOT (`!`)
    Bang,

    /// Ternary condition (`?`)
    Question,

    /// Nullish coalescing (`??`)
    QuestionQuestion,

    /// Ternary branch separator, or key/value separator in object literals
    Colon,

    /// Binding initializer (`=`)
    Assign,

    // Delimiters
    Dot,
    Comma,
    Semicolon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    /// End of input
    Eof,
}
