use crate::ast::{BinaryOp, Expr, Func, UnaryOp};
use crate::error::ExprError;
use crate::token::{Spanned, Token};

/// Deepest nesting of parentheses, calls, signs and operator chains
/// accepted in one expression.
pub const MAX_DEPTH: usize = 256;

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// `tokens` must end with [`Token::Eof`], as produced by the lexer.
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<Expr, ExprError> {
        if self.check(&Token::Eof) {
            return Err(ExprError::Empty);
        }
        let expr = self.parse_comparison()?;
        self.expect(&Token::Eof, "operator or end of expression")?;
        Ok(expr)
    }

    // ── Helpers ──────────────────────────────────────────────

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map_or(&Token::Eof, |s| &s.token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |s| s.span.start)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(expected)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), ExprError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn descend(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep {
                limit: MAX_DEPTH,
                pos: self.offset(),
            });
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn unexpected(&self, what: &str) -> ExprError {
        ExprError::UnexpectedToken {
            expected: what.to_string(),
            found: self.peek().to_string(),
            pos: self.offset(),
        }
    }

    // ── Grammar ──────────────────────────────────────────────

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.parse_additive()?;
        let op = match self.peek() {
            Token::Lt => BinaryOp::Lt,
            Token::Le => BinaryOp::Le,
            Token::Gt => BinaryOp::Gt,
            Token::Ge => BinaryOp::Ge,
            Token::EqEq => BinaryOp::Eq,
            Token::Ne => BinaryOp::Ne,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_additive()?;
        Ok(binary(op, lhs, rhs))
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_term()?;
        // Every link of a left-associative chain adds one level to the tree.
        let mut chained = 0;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            self.descend()?;
            chained += 1;
            let rhs = self.parse_term()?;
            lhs = binary(op, lhs, rhs);
        }
        self.ascend(chained);
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_unary()?;
        let mut chained = 0;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            self.descend()?;
            chained += 1;
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs);
        }
        self.ascend(chained);
        Ok(lhs)
    }

    /// Every recursive path of the grammar passes through here, so the depth
    /// check also bounds the parser's own recursion.
    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        self.descend()?;
        let expr = self.parse_signed()?;
        self.ascend(1);
        Ok(expr)
    }

    fn parse_signed(&mut self) -> Result<Expr, ExprError> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Plus,
            _ => return self.parse_power(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_power(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_primary()?;
        if self.eat(&Token::Caret) || self.eat(&Token::StarStar) {
            // right associative: the exponent may itself be a power
            let exponent = self.parse_unary()?;
            return Ok(binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let pos = self.offset();
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_comparison()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::Ident(name) => {
                self.advance();
                if self.check(&Token::LParen) {
                    return self.parse_call(&name, pos);
                }
                match name.as_str() {
                    "x" => Ok(Expr::Var),
                    "pi" => Ok(Expr::Number(std::f64::consts::PI)),
                    "e" => Ok(Expr::Number(std::f64::consts::E)),
                    _ => Err(ExprError::UnknownIdentifier { name, pos }),
                }
            }
            _ => Err(self.unexpected("number, 'x', function or '('")),
        }
    }

    fn parse_call(&mut self, name: &str, pos: usize) -> Result<Expr, ExprError> {
        let func = Func::lookup(name).ok_or_else(|| ExprError::UnknownFunction {
            name: name.to_string(),
            pos,
        })?;
        self.expect(&Token::LParen, "'('")?;

        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.parse_comparison()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RParen, "',' or ')'")?;
                break;
            }
        }

        if args.len() != func.arity() {
            return Err(ExprError::Arity {
                name: func.name(),
                expected: func.arity(),
                found: args.len(),
            });
        }
        Ok(Expr::Call { func, args })
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> Result<Expr, ExprError> {
        Parser::new(Lexer::new(src).tokenize()?).parse()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse("1 + 2 * x").unwrap();
        let Expr::Binary { op, rhs, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(*rhs, Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn unary_minus_applies_after_power() {
        let expr = parse("-x^2").unwrap();
        let Expr::Unary { op, operand } = expr else {
            panic!("expected unary");
        };
        assert_eq!(op, UnaryOp::Neg);
        assert!(matches!(*operand, Expr::Binary { op: BinaryOp::Pow, .. }));
    }

    #[test]
    fn calls_check_arity() {
        assert!(parse("max(x, 1)").is_ok());
        let err = parse("max(x)").unwrap_err();
        assert_eq!(
            err,
            ExprError::Arity {
                name: "max",
                expected: 2,
                found: 1
            }
        );
        assert!(parse("sin()").is_err());
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            parse("y + 1").unwrap_err(),
            ExprError::UnknownIdentifier {
                name: "y".into(),
                pos: 0
            }
        );
        assert_eq!(
            parse("2 * eval(x)").unwrap_err(),
            ExprError::UnknownFunction {
                name: "eval".into(),
                pos: 4
            }
        );
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(parse("").unwrap_err(), ExprError::Empty);
        assert_eq!(parse("   ").unwrap_err(), ExprError::Empty);
        assert!(matches!(
            parse("(x + 1").unwrap_err(),
            ExprError::UnexpectedToken { .. }
        ));
        assert!(matches!(
            parse("x x").unwrap_err(),
            ExprError::UnexpectedToken { pos: 2, .. }
        ));
        assert!(parse("x < 1 < 2").is_err());
        assert!(parse("1 +").is_err());
    }

    #[test]
    fn nesting_beyond_the_limit_is_rejected() {
        let ok = format!("{}x{}", "(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        assert!(parse(&ok).is_ok());

        let deep = format!("{}x{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(
            parse(&deep).unwrap_err(),
            ExprError::TooDeep {
                limit: MAX_DEPTH,
                pos: MAX_DEPTH,
            }
        );
    }

    #[test]
    fn depth_is_released_after_each_group() {
        let group = format!("{}x{}", "(".repeat(200), ")".repeat(200));
        let src = format!("{group} + {group} * {group}");
        assert!(parse(&src).is_ok());
    }
}
