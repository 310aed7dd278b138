// lang/src/lexer.rs
// 원천 식 토큰화 (구조 재작성 단계용)
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(String), Ident(String), Variable(String), StringLit(String),
    Plus, Minus, Star, Slash, Caret, DotDot, Comma,
    LParen, RParen, LBracket, RBracket, Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span { pub start: usize, pub end: usize }
impl Span { pub fn new(start: usize, end: usize) -> Self { Self { start, end } } }

#[derive(Debug, Clone)]
pub struct Token { pub kind: TokenKind, pub span: Span, pub raw: String }

pub struct Lexer<'a> { source: &'a str, pos: usize }

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self { Self { source, pos: 0 } }
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while !self.is_eof() {
            self.skip_whitespace();
            if self.is_eof() { break; }
            tokens.push(self.next_token()?);
        }
        tokens.push(Token { kind: TokenKind::Eof, span: Span::new(self.pos, self.pos), raw: String::new() });
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let ch = self.peek_char().ok_or_else(|| LexError::new(self.pos, "EOF"))?;
        let kind = match ch {
            '0'..='9' => return self.read_number(),
            '"' => return self.read_string(),
            '$' => return self.read_variable(),
            'a'..='z' | 'A'..='Z' | '_' => return self.read_ident(),
            '+' => { self.advance(); TokenKind::Plus },
            '-' => { self.advance(); TokenKind::Minus },
            '*' => {
                self.advance();
                if self.peek_char() == Some('*') { self.advance(); TokenKind::Caret } else { TokenKind::Star }
            }
            '/' => { self.advance(); TokenKind::Slash },
            '^' => { self.advance(); TokenKind::Caret },
            ',' => { self.advance(); TokenKind::Comma },
            '(' => { self.advance(); TokenKind::LParen },
            ')' => { self.advance(); TokenKind::RParen },
            '[' => { self.advance(); TokenKind::LBracket },
            ']' => { self.advance(); TokenKind::RBracket },
            '.' => {
                if self.peek_ahead(1) == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::DotDot
                } else if self.peek_ahead(1).map(|c| c.is_ascii_digit()).unwrap_or(false) {
                    return self.read_number();
                } else {
                    return Err(LexError::new(start, "홀로 쓰인 '.'"));
                }
            }
            other => return Err(LexError::new(start, &format!("알 수 없는 문자 '{}'", other))),
        };
        Ok(Token { kind, span: Span::new(start, self.pos), raw: self.source[start..self.pos].to_string() })
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        while let Some(ch) = self.peek_char() { if ch.is_ascii_digit() { self.advance(); } else { break; } }
        // `1..5`의 `..`는 소수점이 아니다
        if self.peek_char() == Some('.') && self.peek_ahead(1).map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.advance();
            while let Some(ch) = self.peek_char() { if ch.is_ascii_digit() { self.advance(); } else { break; } }
        }
        let raw = self.source[start..self.pos].to_string();
        Ok(Token { kind: TokenKind::Number(raw.clone()), span: Span::new(start, self.pos), raw })
    }

    /// 따옴표 안 내용을 이스케이프 그대로 보관한다.
    fn read_string(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        self.advance();
        let body_start = self.pos;
        while let Some(ch) = self.peek_char() {
            match ch {
                '\\' => { self.advance(); self.advance(); }
                '"' => {
                    let body = self.source[body_start..self.pos].to_string();
                    self.advance();
                    return Ok(Token { kind: TokenKind::StringLit(body), span: Span::new(start, self.pos), raw: self.source[start..self.pos].to_string() });
                }
                _ => self.advance(),
            }
        }
        Err(LexError::new(start, "문자열이 닫히지 않았습니다"))
    }

    fn read_variable(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        self.advance();
        let name_start = self.pos;
        while let Some(ch) = self.peek_char() { if ch.is_ascii_alphanumeric() || ch == '_' { self.advance(); } else { break; } }
        if self.pos == name_start {
            return Err(LexError::new(start, "'$' 뒤에 이름이 없습니다"));
        }
        let name = self.source[name_start..self.pos].to_string();
        Ok(Token { kind: TokenKind::Variable(name), span: Span::new(start, self.pos), raw: self.source[start..self.pos].to_string() })
    }

    fn read_ident(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        while let Some(ch) = self.peek_char() { if ch.is_ascii_alphanumeric() || ch == '_' { self.advance(); } else { break; } }
        Ok(Token { kind: TokenKind::Ident(self.source[start..self.pos].to_string()), span: Span::new(start, self.pos), raw: self.source[start..self.pos].to_string() })
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() { if ch.is_whitespace() { self.advance(); } else { break; } }
    }

    fn peek_char(&self) -> Option<char> { self.source[self.pos..].chars().next() }
    fn peek_ahead(&self, n: usize) -> Option<char> { self.source[self.pos..].chars().nth(n) }
    fn advance(&mut self) { if let Some(ch) = self.peek_char() { self.pos += ch.len_utf8(); } }
    fn is_eof(&self) -> bool { self.pos >= self.source.len() }
}

#[derive(Debug, Clone)]
pub struct LexError { pub pos: usize, pub message: String }
impl LexError { fn new(pos: usize, message: &str) -> Self { Self { pos, message: message.to_string() } } }
impl fmt::Display for LexError { fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "렉서 오류: {}", self.message) } }
impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().expect("tokenize").into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn range_is_not_a_decimal_point() {
        assert_eq!(
            kinds("1..5"),
            vec![TokenKind::Number("1".into()), TokenKind::DotDot, TokenKind::Number("5".into()), TokenKind::Eof]
        );
        assert_eq!(kinds("2.5"), vec![TokenKind::Number("2.5".into()), TokenKind::Eof]);
    }

    #[test]
    fn variables_and_calls() {
        assert_eq!(
            kinds("rint($a)"),
            vec![
                TokenKind::Ident("rint".into()),
                TokenKind::LParen,
                TokenKind::Variable("a".into()),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_keep_escapes() {
        assert_eq!(
            kinds(r#"maple("a\"b")"#)[2],
            TokenKind::StringLit(r#"a\"b"#.into())
        );
    }

    #[test]
    fn double_star_is_caret() {
        assert_eq!(kinds("2**3")[1], TokenKind::Caret);
    }

    #[test]
    fn braces_are_rejected() {
        assert!(Lexer::new("{1,2}").tokenize().is_err());
        assert!(Lexer::new("\"open").tokenize().is_err());
    }
}
