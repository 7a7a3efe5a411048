//! Lexer for Sluice expressions.
//!
//! The lexer converts source text into a stream of tokens. Malformed input
//! produces [`TokenKind::Error`] tokens; the parser turns those into errors.

use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Lexer for Sluice source.
pub struct Lexer<'src> {
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            rest: source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        let Some(c) = self.peek_char() else {
            let span = Span::point(start, start_line, start_column);
            return Token::new(TokenKind::Eof, span);
        };

        let kind = match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '.' => self.single(TokenKind::Dot),
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '/' => self.single(TokenKind::Slash),
            '%' => self.single(TokenKind::Percent),
            '^' => self.single(TokenKind::Caret),
            '~' => self.single(TokenKind::Tilde),
            '*' => self.one_or_two('*', TokenKind::Star, TokenKind::StarStar),
            '=' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Error("expected '==' (assignment is not supported)".into())
                }
            }
            '!' => self.one_or_two('=', TokenKind::Bang, TokenKind::BangEq),
            '&' => self.one_or_two('&', TokenKind::Amp, TokenKind::AmpAmp),
            '<' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::LessEq
                } else if self.eat('<') {
                    TokenKind::ShiftLeft
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                self.advance();
                if self.eat('=') {
                    TokenKind::GreaterEq
                } else if self.eat('>') {
                    TokenKind::ShiftRight
                } else {
                    TokenKind::Greater
                }
            }
            '|' => self.scan_bar(),
            '?' => {
                self.advance();
                if self.eat('.') {
                    TokenKind::QuestionDot
                } else if self.eat('[') {
                    TokenKind::QuestionBracket
                } else {
                    TokenKind::Error("expected '?.' or '?['".into())
                }
            }
            '"' | '\'' => self.scan_string(c),
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_ident_start(c) => self.scan_ident(),
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character: {c}"))
            }
        };

        Token::new(
            kind,
            Span::new(start, self.position, start_line, start_column),
        )
    }

    /// Tokenizes all source and returns a vector of tokens ending in `Eof`.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Consumes the next character if it is `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn one_or_two(&mut self, second: char, one: TokenKind, two: TokenKind) -> TokenKind {
        self.advance();
        if self.eat(second) { two } else { one }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Scans `||`, a stage introducer `|name:`, or a bitwise `|`.
    fn scan_bar(&mut self) -> TokenKind {
        self.advance(); // consume '|'
        if self.eat('|') {
            return TokenKind::BarBar;
        }

        let name_len: usize = self
            .rest
            .chars()
            .take_while(|&c| is_ident_char(c))
            .map(char::len_utf8)
            .sum();
        let starts_ident = self.peek_char().is_some_and(is_ident_start);
        if starts_ident && self.rest[name_len..].starts_with(':') {
            let name = self.rest[..name_len].to_string();
            for _ in 0..=name.chars().count() {
                self.advance();
            }
            TokenKind::PipeStage(name)
        } else {
            TokenKind::Bar
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        self.advance(); // consume opening quote
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek_char() {
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('0') => '\0',
                        Some(c @ ('\\' | '"' | '\'')) => c,
                        Some(c) => {
                            return TokenKind::Error(format!("invalid escape sequence: \\{c}"));
                        }
                        None => {
                            return TokenKind::Error(
                                "unexpected end of input in string escape".into(),
                            );
                        }
                    };
                    self.advance();
                    text.push(escaped);
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
                None => {
                    return TokenKind::Error("unterminated string literal".into());
                }
            }
        }
        TokenKind::String(text)
    }

    /// Scans a number: digits, an optional fraction, and an optional exponent.
    ///
    /// The text is kept verbatim; conversion happens at compile time.
    fn scan_number(&mut self) -> TokenKind {
        let mut text = String::new();
        self.take_digits(&mut text);

        let mut lookahead = self.rest.chars();
        lookahead.next();
        if self.peek_char() == Some('.') && lookahead.next().is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.advance();
            self.take_digits(&mut text);
        }

        if let Some(e @ ('e' | 'E')) = self.peek_char() {
            let mut lookahead = self.rest.chars();
            lookahead.next();
            let next = lookahead.next();
            let after_sign = if matches!(next, Some('+' | '-')) {
                lookahead.next()
            } else {
                next
            };
            if after_sign.is_some_and(|c| c.is_ascii_digit()) {
                text.push(e);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.peek_char() {
                    text.push(sign);
                    self.advance();
                }
                self.take_digits(&mut text);
            }
        }

        TokenKind::Number(text)
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_ident(&mut self) -> TokenKind {
        let mut name = String::new();
        while let Some(c) = self.peek_char() {
            if is_ident_char(c) {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }

        match name.as_str() {
            "null" => TokenKind::Null,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Ident(name),
        }
    }
}

/// Returns true if `c` can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// Returns true if `c` can continue an identifier.
fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
