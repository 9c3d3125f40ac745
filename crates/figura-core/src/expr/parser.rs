use super::lexer::{Tok, tokenize};
use super::{BinOp, Expr, ExprError, Func, MAX_DEPTH};
use std::ops::Range;

pub(crate) fn parse(src: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(src)?;
    let mut p = Parser {
        tokens,
        pos: 0,
        depth: 0,
        abs_depth: 0,
        end: src.len(),
    };
    let expr = p.sum()?;
    match p.peek() {
        None => Ok(expr),
        Some(tok) => Err(p.unexpected(tok.clone())),
    }
}

struct Parser {
    tokens: Vec<(Tok, Range<usize>)>,
    pos: usize,
    depth: usize,
    /// Open `|..|` groups; inside one a `|` closes instead of starting an implicit product.
    abs_depth: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.end)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self, tok: Tok) -> ExprError {
        ExprError::UnexpectedToken {
            position: self.position(),
            found: tok.describe(),
        }
    }

    fn expect(&mut self, want: Tok) -> Result<(), ExprError> {
        match self.peek() {
            Some(tok) if *tok == want => {
                self.pos += 1;
                Ok(())
            }
            Some(tok) => Err(self.unexpected(tok.clone())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep { max: MAX_DEPTH });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn sum(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.product()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Plus) => BinOp::Add,
                Some(Tok::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.product()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn starts_primary(&self) -> bool {
        match self.peek() {
            Some(Tok::Number(_) | Tok::Ident(_) | Tok::Pi | Tok::LParen) => true,
            Some(Tok::Pipe) => self.abs_depth == 0,
            _ => false,
        }
    }

    fn product(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Star) => {
                    self.pos += 1;
                    BinOp::Mul
                }
                Some(Tok::Slash) => {
                    self.pos += 1;
                    BinOp::Div
                }
                // `2x`, `3sin(x)`, `2(x+1)`
                _ if self.starts_primary() => BinOp::Mul,
                _ => return Ok(lhs),
            };
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        let negate = match self.peek() {
            Some(Tok::Minus) => true,
            Some(Tok::Plus) => false,
            _ => return self.power(),
        };
        self.pos += 1;
        self.enter()?;
        let inner = self.unary();
        self.leave();
        let inner = inner?;
        Ok(if negate {
            Expr::Neg(Box::new(inner))
        } else {
            inner
        })
    }

    fn power(&mut self) -> Result<Expr, ExprError> {
        let base = self.primary()?;
        if matches!(self.peek(), Some(Tok::Caret)) {
            self.pos += 1;
            self.enter()?;
            let exp = self.unary();
            self.leave();
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exp?)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let position = self.position();
        let Some(tok) = self.bump() else {
            return Err(ExprError::UnexpectedEnd);
        };
        match tok {
            Tok::Number(v) => Ok(Expr::Number(v)),
            Tok::Pi => Ok(Expr::Number(std::f64::consts::PI)),
            Tok::Ident(name) => match name.as_str() {
                "x" => Ok(Expr::Var),
                "pi" => Ok(Expr::Number(std::f64::consts::PI)),
                "e" => Ok(Expr::Number(std::f64::consts::E)),
                _ => {
                    let Some(func) = Func::from_name(&name) else {
                        return Err(ExprError::UnknownIdentifier { name, position });
                    };
                    self.expect(Tok::LParen)?;
                    self.enter()?;
                    let saved_abs = std::mem::replace(&mut self.abs_depth, 0);
                    let arg = self.sum();
                    self.abs_depth = saved_abs;
                    self.leave();
                    let arg = arg?;
                    self.expect(Tok::RParen)?;
                    Ok(Expr::Call(func, Box::new(arg)))
                }
            },
            Tok::LParen => {
                self.enter()?;
                let saved_abs = std::mem::replace(&mut self.abs_depth, 0);
                let inner = self.sum();
                self.abs_depth = saved_abs;
                self.leave();
                let inner = inner?;
                self.expect(Tok::RParen)?;
                Ok(inner)
            }
            Tok::Pipe => {
                self.enter()?;
                self.abs_depth += 1;
                let inner = self.sum();
                self.abs_depth -= 1;
                self.leave();
                let inner = inner?;
                self.expect(Tok::Pipe)?;
                Ok(Expr::Call(Func::Abs, Box::new(inner)))
            }
            other => Err(ExprError::UnexpectedToken {
                position,
                found: other.describe(),
            }),
        }
    }
}
