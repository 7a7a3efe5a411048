//! Parser for Sluice expressions.
//!
//! Converts a token stream into an [`Expr`] tree using precedence climbing.
//! Lowest to highest binding:
//!
//! | level    | syntax                                  |
//! |----------|-----------------------------------------|
//! | pipe     | `base |stage: body ...`                 |
//! | binary   | `||` `&&` `|` `^` `&` `== !=` `< <= > >=` `<< >>` `+ -` `* / %` `**` |
//! | unary    | `-x` `!x` `~x`                          |
//! | postfix  | `x[i]` `x[a:b:c]` `x.name` and `?` forms |
//! | primary  | literals, names, calls, `( )` `[ ]` `{ }` |
//!
//! A stage body is a binary expression; nest a pipe inside one with parentheses.

use sluice_foundation::{Error, ErrorKind, Result};

use crate::ast::{BinaryOp, Expr, Literal, PipeStage, UnaryOp};
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Parser for Sluice source.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead).
    current: Token,
    /// Source text (for error messages).
    source: &'src str,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            source,
        }
    }

    /// Parses the whole source as one expression.
    ///
    /// # Errors
    /// Returns a `ParseError` if the source is not a single well-formed
    /// expression.
    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.parse_pipe()?;
        if self.current.kind != TokenKind::Eof {
            return Err(self.error(&format!(
                "unexpected {} after expression",
                self.current.kind.name()
            )));
        }
        Ok(expr)
    }

    fn parse_pipe(&mut self) -> Result<Expr> {
        let base = self.parse_binary(1)?;
        if !matches!(self.current.kind, TokenKind::PipeStage(_)) {
            return Ok(base);
        }

        let mut stages = Vec::new();
        while let TokenKind::PipeStage(name) = &self.current.kind {
            let name = name.clone();
            let start = self.current.span;
            self.advance();
            let body = self.parse_binary(1)?;
            let span = start.merge(body.span());
            stages.push(PipeStage { name, body, span });
        }

        let span = stages
            .last()
            .map_or(base.span(), |stage| base.span().merge(stage.span));
        Ok(Expr::Pipe {
            base: Box::new(base),
            stages,
            span,
        })
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr> {
        let mut left = self.parse_unary()?;

        while let Some(op) = binary_op(&self.current.kind) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();

            let next_min = if op.is_right_assoc() {
                precedence
            } else {
                precedence + 1
            };
            let right = self.parse_binary(next_min)?;
            let span = left.span().merge(right.span());
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.current.kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            _ => return self.parse_postfix(),
        };
        let start = self.current.span;
        self.advance();
        let operand = self.parse_unary()?;
        let span = start.merge(operand.span());
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            expr = match self.current.kind {
                TokenKind::LBracket => self.parse_bracket(expr, false)?,
                TokenKind::QuestionBracket => self.parse_bracket(expr, true)?,
                TokenKind::Dot => self.parse_member(expr, false)?,
                TokenKind::QuestionDot => self.parse_member(expr, true)?,
                _ => return Ok(expr),
            };
        }
    }

    /// Parses `[index]` or `[low:high:step]` after `base`.
    fn parse_bracket(&mut self, base: Expr, optional: bool) -> Result<Expr> {
        self.advance(); // consume '[' or '?['

        let first = if self.current.kind == TokenKind::Colon {
            None
        } else {
            Some(self.parse_pipe()?)
        };

        if self.current.kind != TokenKind::Colon {
            let index = first.ok_or_else(|| self.error("expected index expression"))?;
            let end = self.current.span;
            self.expect(&TokenKind::RBracket)?;
            let span = base.span().merge(end);
            return Ok(Expr::Index {
                base: Box::new(base),
                index: Box::new(index),
                optional,
                span,
            });
        }

        self.advance(); // consume first ':'
        let high = self.parse_slice_bound()?;
        let step = if self.current.kind == TokenKind::Colon {
            self.advance();
            self.parse_slice_bound()?
        } else {
            None
        };

        let end = self.current.span;
        self.expect(&TokenKind::RBracket)?;
        let span = base.span().merge(end);
        Ok(Expr::Slice {
            base: Box::new(base),
            low: first.map(Box::new),
            high,
            step,
            optional,
            span,
        })
    }

    fn parse_slice_bound(&mut self) -> Result<Option<Box<Expr>>> {
        if matches!(self.current.kind, TokenKind::Colon | TokenKind::RBracket) {
            Ok(None)
        } else {
            Ok(Some(Box::new(self.parse_pipe()?)))
        }
    }

    fn parse_member(&mut self, base: Expr, optional: bool) -> Result<Expr> {
        self.advance(); // consume '.' or '?.'
        let TokenKind::Ident(name) = &self.current.kind else {
            return Err(self.error(&format!(
                "expected member name, found {}",
                self.current.kind.name()
            )));
        };
        let name = name.clone();
        let span = base.span().merge(self.current.span);
        self.advance();
        Ok(Expr::Member {
            base: Box::new(base),
            name,
            optional,
            span,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let span = self.current.span;
        let literal = match &self.current.kind {
            TokenKind::Null => Literal::Null,
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::Number(text) => Literal::Number(text.clone()),
            TokenKind::String(s) => Literal::String(s.clone()),
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                if self.current.kind == TokenKind::LParen {
                    return self.parse_call(name, span);
                }
                return Ok(Expr::Identifier(name, span));
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_pipe()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBracket => return self.parse_array(),
            TokenKind::LBrace => return self.parse_object(),
            TokenKind::Eof => return Err(self.error("unexpected end of input")),
            TokenKind::Error(msg) => return Err(self.error(msg)),
            other => return Err(self.error(&format!("unexpected {}", other.name()))),
        };
        self.advance();
        Ok(Expr::Literal(literal, span))
    }

    fn parse_call(&mut self, name: String, start: Span) -> Result<Expr> {
        self.advance(); // consume '('
        let (args, end) = self.parse_list(&TokenKind::RParen)?;
        Ok(Expr::Call {
            name,
            args,
            span: start.merge(end),
        })
    }

    fn parse_array(&mut self) -> Result<Expr> {
        let start = self.current.span;
        self.advance(); // consume '['
        let (items, end) = self.parse_list(&TokenKind::RBracket)?;
        Ok(Expr::Array(items, start.merge(end)))
    }

    /// Parses comma-separated expressions up to and including `close`.
    ///
    /// A trailing comma is allowed. Returns the items and the span of `close`.
    fn parse_list(&mut self, close: &TokenKind) -> Result<(Vec<Expr>, Span)> {
        let mut items = Vec::new();
        while self.current.kind != *close {
            items.push(self.parse_pipe()?);
            if self.current.kind == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        let end = self.current.span;
        self.expect(close)?;
        Ok((items, end))
    }

    fn parse_object(&mut self) -> Result<Expr> {
        let start = self.current.span;
        self.advance(); // consume '{'

        let mut entries = Vec::new();
        while self.current.kind != TokenKind::RBrace {
            let key = match &self.current.kind {
                TokenKind::Ident(name) | TokenKind::String(name) => name.clone(),
                other => {
                    return Err(self.error(&format!(
                        "expected object key, found {}",
                        other.name()
                    )));
                }
            };
            self.advance();
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_pipe()?;
            entries.push((key, value));

            if self.current.kind == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }

        let end = self.current.span;
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::Object(entries, start.merge(end)))
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    /// Expects the current token to be of a specific kind, then advances.
    fn expect(&mut self, expected: &TokenKind) -> Result<()> {
        let matches =
            std::mem::discriminant(&self.current.kind) == std::mem::discriminant(expected);

        if matches {
            self.advance();
            Ok(())
        } else if let TokenKind::Error(msg) = &self.current.kind {
            Err(self.error(msg))
        } else {
            Err(self.error(&format!(
                "expected {}, found {}",
                expected.name(),
                self.current.kind.name()
            )))
        }
    }

    /// Creates a parse error at the current position.
    fn error(&self, message: &str) -> Error {
        self.error_at(self.current.span, message)
    }

    /// Creates a parse error at a specific span.
    fn error_at(&self, span: Span, message: &str) -> Error {
        Error::new(ErrorKind::ParseError {
            message: message.to_string(),
            line: span.line,
            column: span.column,
            context: self.context_at(span),
        })
    }

    /// Returns the source line containing `span`.
    fn context_at(&self, span: Span) -> String {
        let start = span.start.min(self.source.len());
        let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.source[start..]
            .find('\n')
            .map_or(self.source.len(), |i| start + i);

        self.source[line_start..line_end].to_string()
    }
}

/// Maps a token to the infix operator it spells, if any.
fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::StarStar => BinaryOp::Pow,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::BarBar => BinaryOp::Or,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::BangEq => BinaryOp::Ne,
        TokenKind::Less => BinaryOp::Lt,
        TokenKind::LessEq => BinaryOp::Le,
        TokenKind::Greater => BinaryOp::Gt,
        TokenKind::GreaterEq => BinaryOp::Ge,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Bar => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::ShiftLeft => BinaryOp::Shl,
        TokenKind::ShiftRight => BinaryOp::Shr,
        _ => return None,
    };
    Some(op)
}

/// Parses source into a syntax tree.
///
/// # Errors
/// Returns a `ParseError` if the source cannot be parsed.
pub fn parse(source: &str) -> Result<Expr> {
    Parser::new(source).parse()
}
