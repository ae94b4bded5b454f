//! Tree-walking interpreter.

use crate::ast::{BinaryOp, Expr, Func, UnaryOp};
use crate::error::{ExprError, ExprResult};

/// Evaluate `expr` with the free variable bound to `x`.
///
/// Intermediate infinities are allowed (`1 / (1 / 0)` is `0`); only a
/// non-finite final result is an error.
pub fn evaluate(expr: &Expr, x: f64) -> ExprResult<f64> {
    let value = eval_node(expr, x);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExprError::NonFinite { value, x })
    }
}

fn eval_node(expr: &Expr, x: f64) -> f64 {
    match expr {
        Expr::Number(n) => *n,
        Expr::Var => x,
        Expr::Unary { op, operand } => {
            let v = eval_node(operand, x);
            match op {
                UnaryOp::Neg => -v,
                UnaryOp::Plus => v,
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            let a = eval_node(lhs, x);
            let b = eval_node(rhs, x);
            match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Rem => a % b,
                BinaryOp::Pow => a.powf(b),
                BinaryOp::Lt => truth(a < b),
                BinaryOp::Le => truth(a <= b),
                BinaryOp::Gt => truth(a > b),
                BinaryOp::Ge => truth(a >= b),
                BinaryOp::Eq => truth(a == b),
                BinaryOp::Ne => truth(a != b),
            }
        }
        Expr::Call { func, args } => call(*func, args, x),
    }
}

fn call(func: Func, args: &[Expr], x: f64) -> f64 {
    let arg = |i: usize| eval_node(&args[i], x);
    match func {
        // only the taken branch is evaluated
        Func::If => {
            if arg(0) != 0.0 {
                arg(1)
            } else {
                arg(2)
            }
        }
        Func::Sin => arg(0).sin(),
        Func::Cos => arg(0).cos(),
        Func::Tan => arg(0).tan(),
        Func::Asin => arg(0).asin(),
        Func::Acos => arg(0).acos(),
        Func::Atan => arg(0).atan(),
        Func::Sinh => arg(0).sinh(),
        Func::Cosh => arg(0).cosh(),
        Func::Tanh => arg(0).tanh(),
        Func::Exp => arg(0).exp(),
        Func::Ln => arg(0).ln(),
        Func::Log10 => arg(0).log10(),
        Func::Log2 => arg(0).log2(),
        Func::Sqrt => arg(0).sqrt(),
        Func::Abs => arg(0).abs(),
        Func::Floor => arg(0).floor(),
        Func::Ceil => arg(0).ceil(),
        Func::Round => arg(0).round(),
        Func::Sign => {
            let a = arg(0);
            if a == 0.0 { 0.0 } else { a.signum() }
        }
        Func::Min => arg(0).min(arg(1)),
        Func::Max => arg(0).max(arg(1)),
        Func::Pow => arg(0).powf(arg(1)),
        Func::Atan2 => arg(0).atan2(arg(1)),
    }
}

fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}
