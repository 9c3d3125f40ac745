//! Restricted single-variable expression evaluator.
//!
//! Plotted functions arrive as untrusted text such as `2x^2 - 3sin(x)`. The source is lexed and
//! parsed into a small tree that can only reference `x`, the constants `pi`/`e` and a fixed set
//! of functions; nothing else is reachable from an expression.

mod lexer;
mod parser;

/// Longest accepted source text, in bytes.
pub const MAX_SOURCE_LEN: usize = 512;
/// Deepest accepted nesting of unary operators, groups and calls.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("unknown identifier `{name}` at {position}")]
    UnknownIdentifier { name: String, position: usize },

    #[error("unexpected {found} at {position}")]
    UnexpectedToken { found: String, position: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("invalid character `{found}` at {position}")]
    InvalidCharacter { found: String, position: usize },

    #[error("expression is {len} bytes long (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("expression nests deeper than {max} levels")]
    TooDeep { max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Abs,
    Sqrt,
    Ln,
    Log,
    Exp,
}

impl Func {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "abs" => Func::Abs,
            "sqrt" => Func::Sqrt,
            "ln" => Func::Ln,
            "log" => Func::Log,
            "exp" => Func::Exp,
            _ => return None,
        })
    }

    fn apply(self, v: f64) -> f64 {
        match self {
            Func::Sin => v.sin(),
            Func::Cos => v.cos(),
            Func::Tan => v.tan(),
            Func::Abs => v.abs(),
            Func::Sqrt => v.sqrt(),
            Func::Ln => v.ln(),
            Func::Log => v.log10(),
            Func::Exp => v.exp(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Var,
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Number(v) => *v,
            Expr::Var => x,
            Expr::Neg(inner) => -inner.eval(x),
            Expr::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.eval(x), rhs.eval(x));
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Pow => a.powf(b),
                }
            }
            Expr::Call(func, arg) => func.apply(arg.eval(x)),
        }
    }
}

/// A parsed expression, reusable across many samples.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    source: String,
    root: Expr,
}

impl CompiledExpr {
    pub fn compile(src: &str) -> Result<Self, ExprError> {
        if src.len() > MAX_SOURCE_LEN {
            return Err(ExprError::TooLong {
                len: src.len(),
                max: MAX_SOURCE_LEN,
            });
        }
        let root = parser::parse(src)?;
        Ok(Self {
            source: src.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// `f(x)`, or `NaN` wherever the result is not a finite number.
    pub fn eval(&self, x: f64) -> f64 {
        let v = self.root.eval(x);
        if v.is_finite() { v } else { f64::NAN }
    }
}

/// One-shot evaluation; any parse failure yields `NaN`.
pub fn evaluate(src: &str, x: f64) -> f64 {
    match CompiledExpr::compile(src) {
        Ok(expr) => expr.eval(x),
        Err(err) => {
            tracing::debug!(expr = src, error = %err, "expression rejected");
            f64::NAN
        }
    }
}
