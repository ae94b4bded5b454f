//! Restricted expression language for Function components.
//!
//! Expressions are arithmetic over one free variable `x` (the component's
//! input value). They are tokenized, parsed into an [`Expr`] tree once, and
//! interpreted directly for every sample. Nothing is ever handed to a host
//! interpreter.
//!
//! ```
//! use sf_expr::Expression;
//!
//! let expr = Expression::parse("2 * sin(pi * x) + (x > 1)").unwrap();
//! assert_eq!(expr.eval(0.0).unwrap(), 0.0);
//! assert!((expr.eval(1.5).unwrap() - (-1.0)).abs() < 1e-12);
//! ```
//!
//! # Grammar
//!
//! ```text
//! expr       := comparison
//! comparison := additive (("<" | "<=" | ">" | ">=" | "==" | "!=") additive)?
//! additive   := term (("+" | "-") term)*
//! term       := unary (("*" | "/" | "%") unary)*
//! unary      := ("-" | "+") unary | power
//! power      := primary (("^" | "**") unary)?
//! primary    := number | "x" | "pi" | "e" | ident "(" args ")" | "(" expr ")"
//! ```

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{BinaryOp, Expr, Func, UnaryOp};
pub use error::{ExprError, ExprResult};
pub use parser::MAX_DEPTH;

use std::fmt;

/// A parsed expression together with the text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Expr,
}

impl Expression {
    /// Tokenize and parse `source`.
    pub fn parse(source: impl Into<String>) -> ExprResult<Self> {
        let source = source.into();
        let tokens = lexer::Lexer::new(&source).tokenize()?;
        let root = parser::Parser::new(tokens).parse()?;
        Ok(Self { source, root })
    }

    /// Evaluate at input value `x`.
    pub fn eval(&self, x: f64) -> ExprResult<f64> {
        eval::evaluate(&self.root, x)
    }

    /// Original expression text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed tree.
    pub fn root(&self) -> &Expr {
        &self.root
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
