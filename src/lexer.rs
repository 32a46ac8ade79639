use thiserror::Error;

use crate::ast::Token;

/// Character offset into the source, 0-based.
pub type Position = usize;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: Position },

    #[error("unterminated string starting at position {position}")]
    UnterminatedString { position: Position },

    #[error("invalid escape sequence '\\{ch}' at position {position}")]
    InvalidEscape { ch: char, position: Position },

    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: Position },
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Consumes `len` characters and yields `token`.
    fn take(&mut self, len: usize, token: Token) -> Token {
        self.position += len;
        token
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek_char(1) == Some('/') {
                while let Some(c) = self.current_char() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else if ch == '/' && self.peek_char(1) == Some('*') {
                self.position += 2;
                while self.current_char().is_some()
                    && !(self.current_char() == Some('*') && self.peek_char(1) == Some('/'))
                {
                    self.advance();
                }
                self.position = (self.position + 2).min(self.input.len());
            } else {
                break;
            }
        }
    }

    fn is_identifier_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_' || ch == '$'
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    let escaped = match self.current_char() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some(c @ ('"' | '\'' | '\\' | '`')) => c,
                        Some(c) => {
                            return Err(LexError::InvalidEscape {
                                ch: c,
                                position: self.position,
                            });
                        }
                        None => return Err(LexError::UnterminatedString { position: start }),
                    };
                    result.push(escaped);
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else if (ch == 'e' || ch == 'E')
                && (self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
                    || (matches!(self.peek_char(1), Some('+' | '-'))
                        && self.peek_char(2).is_some_and(|c| c.is_ascii_digit())))
            {
                is_float = true;
                number.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char() {
                    number.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }

        let invalid = || LexError::InvalidNumber {
            text: number.clone(),
            position: start,
        };
        if is_float {
            number.parse::<f64>().map(Token::Float).map_err(|_| invalid())
        } else {
            match number.parse::<i64>() {
                Ok(n) => Ok(Token::Integer(n)),
                // Too large for i64, keep it as a float like JavaScript would
                Err(_) => number.parse::<f64>().map(Token::Float).map_err(|_| invalid()),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        let Some(ch) = self.current_char() else {
            return Ok(Token::Eof);
        };
        let next = self.peek_char(1);
        let third = self.peek_char(2);

        let token = match ch {
            '.' => self.take(1, Token::Dot),
            ',' => self.take(1, Token::Comma),
            ';' => self.take(1, Token::Semicolon),
            ':' => self.take(1, Token::Colon),
            '+' => self.take(1, Token::Plus),
            '-' => self.take(1, Token::Minus),
            '*' => self.take(1, Token::Star),
            '/' => self.take(1, Token::Slash),
            '%' => self.take(1, Token::Percent),
            '(' => self.take(1, Token::LParen),
            ')' => self.take(1, Token::RParen),
            '[' => self.take(1, Token::LBracket),
            ']' => self.take(1, Token::RBracket),
            '{' => self.take(1, Token::LBrace),
            '}' => self.take(1, Token::RBrace),
            '?' if next == Some('?') => self.take(2, Token::QuestionQuestion),
            '?' => self.take(1, Token::Question),
            '=' if next == Some('=') && third == Some('=') => self.take(3, Token::EqEqEq),
            '=' if next == Some('=') => self.take(2, Token::EqEq),
            '=' if next == Some('>') => self.take(2, Token::Arrow),
            '=' => self.take(1, Token::Assign),
            '!' if next == Some('=') && third == Some('=') => self.take(3, Token::NotEqEq),
            '!' if next == Some('=') => self.take(2, Token::NotEq),
            '!' => self.take(1, Token::Bang),
            '<' if next == Some('=') => self.take(2, Token::LtEq),
            '<' => self.take(1, Token::Lt),
            '>' if next == Some('=') => self.take(2, Token::GtEq),
            '>' => self.take(1, Token::Gt),
            '&' if next == Some('&') => self.take(2, Token::AndAnd),
            '|' if next == Some('|') => self.take(2, Token::OrOr),
            '"' | '\'' => Token::String(self.read_string(ch)?),
            c if c.is_ascii_digit() => self.read_number()?,
            c if Self::is_identifier_start(c) => {
                let ident = self.read_identifier();
                match ident.as_str() {
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "null" => Token::Null,
                    "undefined" => Token::Undefined,
                    "function" => Token::Function,
                    "return" => Token::Return,
                    "const" | "let" | "var" => Token::Declare,
                    _ => Token::Identifier(ident),
                }
            }
            c => {
                return Err(LexError::UnexpectedChar {
                    ch: c,
                    position: self.position,
                });
            }
        };
        Ok(token)
    }

    /// Tokenizes the whole input, ending with [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<(Token, Position)>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let position = self.position;
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push((token, position));
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("true false null undefined function return const let");
    assert_eq!(lexer.next_token(), Ok(Token::Boolean(true)));
    assert_eq!(lexer.next_token(), Ok(Token::Boolean(false)));
    assert_eq!(lexer.next_token(), Ok(Token::Null));
    assert_eq!(lexer.next_token(), Ok(Token::Undefined));
    assert_eq!(lexer.next_token(), Ok(Token::Function));
    assert_eq!(lexer.next_token(), Ok(Token::Return));
    assert_eq!(lexer.next_token(), Ok(Token::Declare));
    assert_eq!(lexer.next_token(), Ok(Token::Declare));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_arrow_function() {
    let mut lexer = Lexer::new("(a,b) => a+b");
    assert_eq!(lexer.next_token(), Ok(Token::LParen));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("a".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Comma));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("b".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::RParen));
    assert_eq!(lexer.next_token(), Ok(Token::Arrow));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("a".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Plus));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("b".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_multi_char_operators() {
    let mut lexer = Lexer::new("=== !== == != ?? && || <= >=");
    let expected = [
        Token::EqEqEq,
        Token::NotEqEq,
        Token::EqEq,
        Token::NotEq,
        Token::QuestionQuestion,
        Token::AndAnd,
        Token::OrOr,
        Token::LtEq,
        Token::GtEq,
    ];
    for token in expected {
        assert_eq!(lexer.next_token(), Ok(token));
    }
}

#[test]
fn test_numbers_and_strings() {
    let mut lexer = Lexer::new(r#"42 3.5 1e3 'it\'s' "a\nb""#);
    assert_eq!(lexer.next_token(), Ok(Token::Integer(42)));
    assert_eq!(lexer.next_token(), Ok(Token::Float(3.5)));
    assert_eq!(lexer.next_token(), Ok(Token::Float(1000.0)));
    assert_eq!(lexer.next_token(), Ok(Token::String("it's".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::String("a\nb".to_string())));
}

#[test]
fn test_comments_are_skipped() {
    let mut lexer = Lexer::new("a // trailing\n/* block */ b");
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("a".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("b".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_errors() {
    assert_eq!(
        Lexer::new("'open").next_token(),
        Err(LexError::UnterminatedString { position: 0 })
    );
    assert_eq!(
        Lexer::new("a # b").tokenize(),
        Err(LexError::UnexpectedChar { ch: '#', position: 2 })
    );
}
