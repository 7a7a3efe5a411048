//! Token types for Sluice expressions.
//!
//! Tokens are the output of the lexer and input to the parser.

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Token types for Sluice expressions.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `:`
    Colon,

    // Accessors
    /// `.`
    Dot,
    /// `?.`
    QuestionDot,
    /// `?[`
    QuestionBracket,

    // Arithmetic
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `**`
    StarStar,

    // Logical and comparison
    /// `!`
    Bang,
    /// `&&`
    AmpAmp,
    /// `||`
    BarBar,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,

    // Bitwise
    /// `&`
    Amp,
    /// `|` not followed by a stage name
    Bar,
    /// `^`
    Caret,
    /// `~`
    Tilde,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,

    /// Pipe stage introducer like `|map:`, carrying the stage name.
    PipeStage(String),

    // Literals
    /// `null`
    Null,
    /// `true`
    True,
    /// `false`
    False,
    /// Numeric literal, kept as source text.
    Number(String),
    /// String literal with escapes resolved.
    String(String),
    /// Identifier like `score` or `$item`
    Ident(String),

    // Meta
    /// End of input
    Eof,
    /// Lexer error
    Error(String),
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Comma => "','",
            Self::Colon => "':'",
            Self::Dot => "'.'",
            Self::QuestionDot => "'?.'",
            Self::QuestionBracket => "'?['",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Percent => "'%'",
            Self::StarStar => "'**'",
            Self::Bang => "'!'",
            Self::AmpAmp => "'&&'",
            Self::BarBar => "'||'",
            Self::EqEq => "'=='",
            Self::BangEq => "'!='",
            Self::Less => "'<'",
            Self::LessEq => "'<='",
            Self::Greater => "'>'",
            Self::GreaterEq => "'>='",
            Self::Amp => "'&'",
            Self::Bar => "'|'",
            Self::Caret => "'^'",
            Self::Tilde => "'~'",
            Self::ShiftLeft => "'<<'",
            Self::ShiftRight => "'>>'",
            Self::PipeStage(_) => "pipe stage",
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Ident(_) => "identifier",
            Self::Eof => "end of input",
            Self::Error(_) => "error",
        }
    }
}
