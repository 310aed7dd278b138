// lang/src/scheme.rs
// 원천 변수 이름 → 정본 변수 토큰 (연습문제 하나 범위)
use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::error::ConvertIssue;

/// 색인용으로 예약된 글자
pub const RESERVED_TOKEN: char = 'i';

/// a–h, j–v, 그다음 wa…wz, xa…xz, ya…yz, za…zz
pub fn canonical_tokens() -> &'static [String] {
    static TOKENS: OnceLock<Vec<String>> = OnceLock::new();
    TOKENS.get_or_init(|| {
        let mut tokens: Vec<String> = ('a'..='v')
            .filter(|c| *c != RESERVED_TOKEN)
            .map(String::from)
            .collect();
        for head in ['w', 'x', 'y', 'z'] {
            tokens.extend(('a'..='z').map(|tail| format!("{}{}", head, tail)));
        }
        tokens
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeEntry {
    pub source: String,
    pub token: String,
}

#[derive(Debug, Clone, Default)]
pub struct VariableScheme {
    entries: Vec<SchemeEntry>,
    index: HashMap<String, usize>,
}

impl VariableScheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// 처음 보는 이름에 다음 토큰을 준다. 이미 있으면 같은 토큰과 `false`.
    pub fn assign(&mut self, source: &str) -> Result<(String, bool), ConvertIssue> {
        if let Some(&idx) = self.index.get(source) {
            return Ok((self.entries[idx].token.clone(), false));
        }
        let token = canonical_tokens()
            .get(self.entries.len())
            .cloned()
            .ok_or_else(|| ConvertIssue::SchemeExhausted { name: source.to_string() })?;
        self.index.insert(source.to_string(), self.entries.len());
        self.entries.push(SchemeEntry {
            source: source.to_string(),
            token: token.clone(),
        });
        Ok((token, true))
    }

    pub fn token_of(&self, source: &str) -> Option<&str> {
        self.index
            .get(source)
            .map(|&idx| self.entries[idx].token.as_str())
    }

    pub fn entries(&self) -> &[SchemeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 통째로 같은 식별자만 바꾼다. 한 번 훑으므로 바뀐 토큰이 다시 바뀌지 않는다.
    pub fn substitute(&self, text: &str) -> String {
        if self.entries.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut word = String::new();
        for ch in text.chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' || (ch == '$' && word.is_empty()) {
                word.push(ch);
                continue;
            }
            self.flush_word(&mut out, &mut word);
            if ch == '$' {
                word.push(ch);
            } else {
                out.push(ch);
            }
        }
        self.flush_word(&mut out, &mut word);
        out
    }

    fn flush_word(&self, out: &mut String, word: &mut String) {
        if word.is_empty() {
            return;
        }
        match self.token_of(word) {
            Some(token) => {
                out.push('$');
                out.push_str(token);
            }
            None => out.push_str(word),
        }
        word.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_enumeration() {
        let tokens = canonical_tokens();
        assert_eq!(tokens.len(), 125);
        assert_eq!(tokens[0], "a");
        assert_eq!(tokens[8], "j");
        assert!(!tokens.iter().any(|t| t == "i"));
        assert_eq!(tokens[21], "wa");
        assert_eq!(tokens[124], "zz");
    }

    #[test]
    fn first_seen_order_and_stability() {
        let mut scheme = VariableScheme::new();
        assert_eq!(scheme.assign("$x").expect("token"), ("a".to_string(), true));
        assert_eq!(scheme.assign("$y").expect("token"), ("b".to_string(), true));
        assert_eq!(scheme.assign("$x").expect("token"), ("a".to_string(), false));
        assert_eq!(scheme.len(), 2);
    }

    #[test]
    fn substitution_is_whole_token() {
        let mut scheme = VariableScheme::new();
        for name in ["$a", "$ab", "$b"] {
            scheme.assign(name).expect("token");
        }
        assert_eq!(scheme.substitute("$ab+$a*$b"), "$b+$a*$c");
        assert_eq!(scheme.substitute("maple(\"x+$ab\")"), "maple(\"x+$b\")");
        assert_eq!(scheme.substitute("$abc"), "$abc");
    }

    #[test]
    fn substituted_tokens_are_not_substituted_again() {
        let mut scheme = VariableScheme::new();
        for name in ["$b", "$a"] {
            scheme.assign(name).expect("token");
        }
        // $b → $a, $a → $b
        assert_eq!(scheme.substitute("$b-$a"), "$a-$b");
    }

    #[test]
    fn exhausted_scheme_is_an_error() {
        let mut scheme = VariableScheme::new();
        for idx in 0..125 {
            scheme.assign(&format!("$v{}", idx)).expect("token");
        }
        let err = scheme.assign("$overflow").expect_err("exhausted");
        assert_eq!(err.code(), "E_SCHEME_EXHAUSTED");
    }
}
