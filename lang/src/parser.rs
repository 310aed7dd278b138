// lang/src/parser.rs
// 원천 식 재귀 하강 파서
//
// 우선순위 (낮은 것부터):
// - 범위 `a..b`
// - 덧셈/뺄셈
// - 곱셈/나눗셈
// - 단항 `-`
// - 거듭제곱 `^` (오른쪽 결합)
use std::fmt;

use crate::ast::{BinaryOp, Expr};
use crate::lexer::{Lexer, Span, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// 식 하나를 끝까지 읽는다. 남는 토큰이 있으면 오류.
    pub fn parse_statement_body(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr()?;
        if !self.is_at_end() {
            return Err(self.error("식 뒤에 남은 토큰이 있습니다"));
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_range()
    }

    fn parse_range(&mut self) -> Result<Expr, ParseError> {
        let l = self.parse_additive()?;
        if self.check(&TokenKind::DotDot) {
            self.advance();
            let r = self.parse_additive()?;
            return Ok(Expr::binary(BinaryOp::Range, l, r));
        }
        Ok(l)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut l = self.parse_multiplicative()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let r = self.parse_multiplicative()?;
            l = Expr::binary(op, l, r);
        }
        Ok(l)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut l = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let r = self.parse_unary()?;
            l = Expr::binary(op, l, r);
        }
        Ok(l)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Minus) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        if self.check(&TokenKind::Plus) {
            self.advance();
            return self.parse_unary();
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_primary()?;
        if self.check(&TokenKind::Caret) {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Expr::binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(text) => Ok(Expr::Number(text)),
            TokenKind::StringLit(body) => Ok(Expr::Str(body)),
            TokenKind::Variable(name) => {
                // `$name(…)`은 `$`를 뗀 호출로 읽는다
                if self.check(&TokenKind::LParen) {
                    return self.parse_call(name);
                }
                Ok(Expr::Var(name))
            }
            TokenKind::Ident(name) => {
                if self.check(&TokenKind::LParen) {
                    return self.parse_call(name);
                }
                Ok(Expr::Const(name))
            }
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')'가 필요합니다")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                let items = self.parse_args(&TokenKind::RBracket, "']'가 필요합니다")?;
                Ok(Expr::List(items))
            }
            TokenKind::Eof => Err(ParseError {
                span: token.span,
                message: "식이 비어 있거나 중간에 끝났습니다".to_string(),
            }),
            _ => Err(ParseError {
                span: token.span,
                message: format!("예상하지 못한 토큰 '{}'", token.raw),
            }),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LParen, "'('가 필요합니다")?;
        let args = self.parse_args(&TokenKind::RParen, "')'가 필요합니다")?;
        Ok(Expr::Call { name, args })
    }

    fn parse_args(&mut self, close: &TokenKind, m: &str) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.check(close) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            self.expect(close, m)?;
            return Ok(args);
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }
    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.pos += 1;
            return self.tokens[self.pos - 1].clone();
        }
        self.current().clone()
    }
    fn is_at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }
    fn check(&self, k: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(k)
    }
    fn expect(&mut self, k: &TokenKind, m: &str) -> Result<Token, ParseError> {
        if self.check(k) {
            Ok(self.advance())
        } else {
            Err(self.error(m))
        }
    }
    fn error(&self, m: &str) -> ParseError {
        ParseError {
            span: self.current().span,
            message: m.to_string(),
        }
    }
}

/// 편리 함수: 식 문자열 → 트리
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let tokens = Lexer::new(source).tokenize().map_err(|e| ParseError {
        span: Span::new(e.pos, e.pos + 1),
        message: e.message,
    })?;
    Parser::new(tokens).parse_statement_body()
}

#[derive(Debug, Clone)]
pub struct ParseError {
    pub span: Span,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "파서 오류: {} ({}..{})", self.message, self.span.start, self.span.end)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(text: &str) -> Expr {
        Expr::Number(text.to_string())
    }

    #[test]
    fn precedence_and_associativity() {
        let expr = parse_expression("1+2*3").expect("parse");
        assert_eq!(
            expr,
            Expr::binary(BinaryOp::Add, num("1"), Expr::binary(BinaryOp::Mul, num("2"), num("3")))
        );
        let expr = parse_expression("2^3^2").expect("parse");
        assert_eq!(
            expr,
            Expr::binary(BinaryOp::Pow, num("2"), Expr::binary(BinaryOp::Pow, num("3"), num("2")))
        );
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        let expr = parse_expression("-2^2").expect("parse");
        assert_eq!(
            expr,
            Expr::Neg(Box::new(Expr::binary(BinaryOp::Pow, num("2"), num("2"))))
        );
    }

    #[test]
    fn calls_lists_and_ranges() {
        let expr = parse_expression("switch($a, [1,2], 1..3)").expect("parse");
        assert_eq!(
            expr,
            Expr::call(
                "switch",
                vec![
                    Expr::Var("a".into()),
                    Expr::List(vec![num("1"), num("2")]),
                    Expr::binary(BinaryOp::Range, num("1"), num("3")),
                ]
            )
        );
        assert_eq!(parse_expression("f()").expect("parse"), Expr::call("f", vec![]));
    }

    #[test]
    fn dollar_call_drops_the_sigil() {
        assert_eq!(
            parse_expression("$rint(5)").expect("parse"),
            Expr::call("rint", vec![num("5")])
        );
    }

    #[test]
    fn bare_identifiers_are_constants() {
        assert_eq!(parse_expression("pi").expect("parse"), Expr::Const("pi".into()));
    }

    #[test]
    fn malformed_inputs_are_errors() {
        assert!(parse_expression("rint(5").is_err());
        assert!(parse_expression("1 2").is_err());
        assert!(parse_expression("").is_err());
        assert!(parse_expression("x = 1").is_err());
    }
}
