use crate::error::{CelError, Span};

/// CEL reserved words that must never resolve as identifiers.
///
/// `in` is absent from this list because the dialect lexes it as the
/// membership operator, never as an identifier. `true` and `false` are
/// reserved rather than literals; booleans only arise from operators.
pub const RESERVED_IDENTIFIERS: &[&str] = &[
    "as",
    "break",
    "const",
    "continue",
    "else",
    "false",
    "for",
    "function",
    "if",
    "import",
    "let",
    "loop",
    "package",
    "namespace",
    "return",
    "true",
    "var",
    "void",
    "while",
];

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    Dot,
    Minus,
    Plus,

    // One or two character tokens
    BangEqual,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals. Numeric lexemes store digits only: the `0x` prefix and the
    // `u` suffix are consumed by the lexer and encoded in the token type.
    Integer,
    HexInteger,
    UnsignedInteger,
    UnsignedHexInteger,
    String,
    Identifier,
    ReservedIdentifier,

    // Keywords
    In,

    // Special
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, span: Span) -> Self {
        Self {
            token_type,
            lexeme,
            span,
        }
    }
}

pub struct Lexer {
    source: String,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: String) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, CelError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::new(
            TokenType::Eof,
            "".to_string(),
            Span::single(self.current),
        ));

        Ok(self.tokens.clone())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) -> Result<(), CelError> {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            '[' => self.add_token(TokenType::LeftBracket),
            ']' => self.add_token(TokenType::RightBracket),
            ',' => self.add_token(TokenType::Comma),
            ':' => self.add_token(TokenType::Colon),
            '.' => self.add_token(TokenType::Dot),
            '-' => self.add_token(TokenType::Minus),
            '+' => self.add_token(TokenType::Plus),
            '!' => {
                if self.match_char('=') {
                    self.add_token(TokenType::BangEqual);
                } else {
                    return Err(CelError::unrecognized_character(
                        Span::single(self.current - 1),
                        "Unexpected character: '!'".to_string(),
                    ));
                }
            }
            '=' => {
                if self.match_char('=') {
                    self.add_token(TokenType::EqualEqual);
                } else {
                    return Err(CelError::unrecognized_character(
                        Span::single(self.current - 1),
                        "Unexpected character: '='".to_string(),
                    ));
                }
            }
            '<' => {
                let token_type = if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(token_type);
            }
            '>' => {
                let token_type = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type);
            }
            ' ' | '\r' | '\t' | '\n' => {
                // Whitespace is insignificant between tokens
            }
            '"' => self.string()?,
            c if c.is_ascii_digit() => self.number()?,
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            _ => {
                return Err(CelError::unrecognized_character(
                    Span::single(self.current - 1),
                    format!("Unexpected character: '{}'", c),
                ));
            }
        }

        Ok(())
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        if c != '\0' {
            self.current += c.len_utf8();
        }
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn string(&mut self) -> Result<(), CelError> {
        while self.peek() != '"' && !self.is_at_end() {
            self.advance();
        }

        if self.is_at_end() {
            return Err(CelError::unrecognized_character(
                Span::new(self.start, self.current),
                "Unterminated string".to_string(),
            ));
        }

        // Consume the closing "
        self.advance();

        // The string value is the slice between the quotes
        let start_content = self.start + 1;
        let end_content = self.current - 1;
        let string_slice = &self.source[start_content..end_content];

        self.add_token_with_content(TokenType::String, string_slice.to_string());
        Ok(())
    }

    fn number(&mut self) -> Result<(), CelError> {
        let first = &self.source[self.start..self.current];

        // 0x / 0X prefix switches to hex digits, case-insensitive
        if first == "0" && (self.peek() == 'x' || self.peek() == 'X') {
            self.advance();
            let digits_start = self.current;

            while self.peek().is_ascii_hexdigit() {
                self.advance();
            }

            if self.current == digits_start {
                return Err(CelError::unrecognized_character(
                    Span::new(self.start, self.current),
                    "Expected hex digits after '0x'".to_string(),
                ));
            }

            let digits = self.source[digits_start..self.current].to_string();
            let token_type = if self.match_char('u') || self.match_char('U') {
                TokenType::UnsignedHexInteger
            } else {
                TokenType::HexInteger
            };
            self.add_token_with_content(token_type, digits);
            return Ok(());
        }

        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let digits = self.source[self.start..self.current].to_string();
        let token_type = if self.match_char('u') || self.match_char('U') {
            TokenType::UnsignedInteger
        } else {
            TokenType::Integer
        };
        self.add_token_with_content(token_type, digits);
        Ok(())
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text = &self.source[self.start..self.current];
        let token_type = if text == "in" {
            TokenType::In
        } else if RESERVED_IDENTIFIERS.contains(&text) {
            TokenType::ReservedIdentifier
        } else {
            TokenType::Identifier
        };

        self.add_token(token_type);
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text = &self.source[self.start..self.current];
        self.add_token_with_content(token_type, text.to_string());
    }

    fn add_token_with_content(&mut self, token_type: TokenType, lexeme: String) {
        self.tokens.push(Token::new(
            token_type,
            lexeme,
            Span::new(self.start, self.current),
        ));
    }
}
