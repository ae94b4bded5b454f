use crate::error::ExprError;
use crate::token::{Span, Spanned, Token};

pub struct Lexer<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, ExprError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let is_eof = spanned.token == Token::Eof;
            tokens.push(spanned);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).map(|(_, c)| *c)
    }

    /// Byte offset of char index `idx` (end of input past the last char).
    fn byte_pos(&self, idx: usize) -> usize {
        self.chars.get(idx).map_or(self.src.len(), |(b, _)| *b)
    }

    fn spanned(&self, token: Token, start: usize) -> Spanned {
        Spanned {
            token,
            span: Span {
                start: self.byte_pos(start),
                end: self.byte_pos(self.pos),
            },
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Result<Spanned, ExprError> {
        self.skip_whitespace();

        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(self.spanned(Token::Eof, start));
        };

        if ch.is_ascii_digit() || (ch == '.' && matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()))
        {
            return self.lex_number(start);
        }
        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(self.lex_ident(start));
        }

        self.pos += 1;
        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => {
                if self.peek() == Some('*') {
                    self.pos += 1;
                    Token::StarStar
                } else {
                    Token::Star
                }
            }
            '/' => Token::Slash,
            '%' => Token::Percent,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '<' => self.with_eq(Token::Le, Token::Lt),
            '>' => self.with_eq(Token::Ge, Token::Gt),
            '=' if self.peek() == Some('=') => {
                self.pos += 1;
                Token::EqEq
            }
            '!' if self.peek() == Some('=') => {
                self.pos += 1;
                Token::Ne
            }
            _ => {
                return Err(ExprError::UnexpectedChar {
                    ch,
                    pos: self.byte_pos(start),
                });
            }
        };
        Ok(self.spanned(token, start))
    }

    fn with_eq(&mut self, with: Token, without: Token) -> Token {
        if self.peek() == Some('=') {
            self.pos += 1;
            with
        } else {
            without
        }
    }

    fn lex_number(&mut self, start: usize) -> Result<Spanned, ExprError> {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        // exponent only when digits follow: `2e` lexes as `2` then `e`
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            if matches!(self.peek_at(1 + sign), Some(d) if d.is_ascii_digit()) {
                self.pos += 1 + sign;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        let text = &self.src[self.byte_pos(start)..self.byte_pos(self.pos)];
        let value: f64 = text.parse().map_err(|_| ExprError::InvalidNumber {
            text: text.to_string(),
            pos: self.byte_pos(start),
        })?;
        Ok(self.spanned(Token::Number(value), start))
    }

    fn lex_ident(&mut self, start: usize) -> Spanned {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let text = &self.src[self.byte_pos(start)..self.byte_pos(self.pos)];
        self.spanned(Token::Ident(text.to_string()), start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn operators_and_numbers() {
        assert_eq!(
            kinds("1.5e3 ** x <= .5"),
            vec![
                Token::Number(1500.0),
                Token::StarStar,
                Token::Ident("x".into()),
                Token::Le,
                Token::Number(0.5),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn exponent_needs_digits() {
        assert_eq!(
            kinds("2e"),
            vec![Token::Number(2.0), Token::Ident("e".into()), Token::Eof]
        );
    }

    #[test]
    fn spans_are_byte_offsets() {
        let tokens = Lexer::new("  sin(x)").tokenize().unwrap();
        assert_eq!(tokens[0].span, Span { start: 2, end: 5 });
        assert_eq!(tokens[2].span, Span { start: 6, end: 7 });
    }

    #[test]
    fn rejects_unknown_characters() {
        let err = Lexer::new("x ; 1").tokenize().unwrap_err();
        assert_eq!(err, ExprError::UnexpectedChar { ch: ';', pos: 2 });
        assert!(Lexer::new("x = 1").tokenize().is_err());
        assert!(Lexer::new("1.2.3").tokenize().is_err());
    }
}
