//! Formula text to [`Expr`] conversion.
//!
//! Grammar (whitespace insignificant, leading `=` optional):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | primary
//! primary := number | identifier | '(' expr ')'
//! ```
//!
//! Identifiers are letter runs followed by digits (`A1`, `cx5`) and are kept
//! verbatim; whether they name a valid cell is not the parser's concern.

use thiserror::Error;

use super::cell_id::CellId;
use super::expr::{BinaryOp, Expr};

/// Formula sigil.
pub const FORMULA_PREFIX: char = '=';

/// Maximum depth of nested parentheses and unary operators.
pub const MAX_NESTING: usize = 256;

/// Malformed formula text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Syntax error at offset {offset}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        ParseError {
            offset,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
}

fn describe(token: Option<&(usize, Token)>) -> String {
    match token {
        None => "end of input".to_string(),
        Some((_, Token::Number(n))) => format!("number {}", n),
        Some((_, Token::Ident(s))) => format!("identifier '{}'", s),
        Some((_, Token::Op(c))) => format!("operator '{}'", c),
        Some((_, Token::LParen)) => "'('".to_string(),
        Some((_, Token::RParen)) => "')'".to_string(),
    }
}

fn tokenize(text: &str, base: usize) -> Result<Vec<(usize, Token)>, ParseError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
            }
            b'+' | b'-' | b'*' | b'/' => {
                tokens.push((base + start, Token::Op(c as char)));
                i += 1;
            }
            b'(' => {
                tokens.push((base + start, Token::LParen));
                i += 1;
            }
            b')' => {
                tokens.push((base + start, Token::RParen));
                i += 1;
            }
            b'0'..=b'9' | b'.' => {
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                // Optional exponent, only consumed when followed by digits.
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        while j < bytes.len() && bytes[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let literal = &text[start..i];
                let value = literal.parse::<f64>().map_err(|_| {
                    ParseError::new(base + start, format!("invalid number '{}'", literal))
                })?;
                tokens.push((base + start, Token::Number(value)));
            }
            b'A'..=b'Z' | b'a'..=b'z' => {
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let letters_end = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if letters_end == i {
                    return Err(ParseError::new(
                        base + start,
                        format!("expected digits after '{}'", &text[start..i]),
                    ));
                }
                tokens.push((base + start, Token::Ident(text[start..i].to_string())));
            }
            _ => {
                let ch = text[start..].chars().next().unwrap_or('?');
                return Err(ParseError::new(
                    base + start,
                    format!("unexpected character '{}'", ch),
                ));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(usize, Token)> {
        self.tokens.get(self.pos)
    }

    fn peek_op(&self) -> Option<char> {
        match self.peek() {
            Some((_, Token::Op(c))) => Some(*c),
            _ => None,
        }
    }

    fn offset(&self) -> usize {
        self.peek().map(|(offset, _)| *offset).unwrap_or(self.end)
    }

    fn unexpected(&self) -> ParseError {
        ParseError::new(self.offset(), format!("unexpected {}", describe(self.peek())))
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::new(
                self.offset(),
                format!("formula nested deeper than {} levels", MAX_NESTING),
            ));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.peek_op() {
            let op = match op {
                '+' => BinaryOp::Add,
                '-' => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek_op() {
            let op = match op {
                '*' => BinaryOp::Mul,
                '/' => BinaryOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_op() {
            Some(sign @ ('-' | '+')) => {
                self.pos += 1;
                self.enter()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(if sign == '-' { Expr::neg(inner) } else { inner })
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let Some((offset, token)) = self.tokens.get(self.pos).cloned() else {
            return Err(self.unexpected());
        };
        match token {
            Token::Number(n) => {
                self.pos += 1;
                Ok(Expr::Number(n))
            }
            Token::Ident(name) => {
                self.pos += 1;
                Ok(Expr::Ref(CellId::new(name)))
            }
            Token::LParen => {
                self.pos += 1;
                self.enter()?;
                let inner = self.expr()?;
                self.depth -= 1;
                match self.peek() {
                    Some((_, Token::RParen)) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    None => Err(ParseError::new(
                        offset,
                        "unbalanced parenthesis: missing ')'",
                    )),
                    Some(_) => Err(self.unexpected()),
                }
            }
            Token::RParen | Token::Op(_) => Err(self.unexpected()),
        }
    }
}

/// Parse formula text (with or without the leading `=`) into an expression tree.
pub fn parse_formula(text: &str) -> Result<Expr, ParseError> {
    let leading_ws = text.len() - text.trim_start().len();
    let trimmed = text.trim();
    let (body, base) = match trimmed.strip_prefix(FORMULA_PREFIX) {
        Some(rest) => (rest, leading_ws + FORMULA_PREFIX.len_utf8()),
        None => (trimmed, leading_ws),
    };

    let tokens = tokenize(body, base)?;
    if tokens.is_empty() {
        return Err(ParseError::new(base, "empty formula"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        end: base + body.len(),
        depth: 0,
    };
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some((offset, Token::RParen)) => Err(ParseError::new(
            *offset,
            "unbalanced parenthesis: unexpected ')'",
        )),
        Some(_) => Err(parser.unexpected()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Expr {
        Expr::Number(n)
    }

    fn id(name: &str) -> Expr {
        Expr::Ref(CellId::new(name))
    }

    #[test]
    fn test_parse_precedence() {
        let expr = parse_formula("=1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Add,
                num(1.0),
                Expr::binary(BinaryOp::Mul, num(2.0), num(3.0))
            )
        );
    }

    #[test]
    fn test_parse_left_associative() {
        let expr = parse_formula("=8 - 2 - 1").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, num(8.0), num(2.0)),
                num(1.0)
            )
        );
    }

    #[test]
    fn test_parse_unary_and_refs() {
        let expr = parse_formula("= -BB8 * (CX5)").unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinaryOp::Mul, Expr::neg(id("BB8")), id("CX5"))
        );
    }

    #[test]
    fn test_parse_without_sigil() {
        assert_eq!(parse_formula("A1").unwrap(), id("A1"));
    }

    #[test]
    fn test_parse_number_forms() {
        assert_eq!(parse_formula("=.5").unwrap(), num(0.5));
        assert_eq!(parse_formula("=1e3").unwrap(), num(1000.0));
        assert_eq!(parse_formula("=2.5E-1").unwrap(), num(0.25));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_formula("=").is_err());
        assert!(parse_formula("=1 +").is_err());
        assert!(parse_formula("=(1 + 2").is_err());
        assert!(parse_formula("=1 + 2)").is_err());
        assert!(parse_formula("=1 $ 2").is_err());
        assert!(parse_formula("=A").is_err());
        assert!(parse_formula("=1.2.3").is_err());
        assert!(parse_formula("=2 3").is_err());
    }

    #[test]
    fn test_parse_error_offset() {
        let err = parse_formula("=1 + $").unwrap_err();
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn test_parse_nesting_limit() {
        let deep = format!("={}1{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        let err = parse_formula(&deep).unwrap_err();
        assert!(err.message.contains("nested"));

        let ok = format!("={}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(parse_formula(&ok).unwrap(), num(1.0));
    }
}
