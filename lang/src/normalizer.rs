// lang/src/normalizer.rs
// 곱셈 정규화: 원천이 허용하는 암묵적 곱을 `*`로 드러낸다.
//
// 규칙:
// - 등록 함수 `name(` 만 한 덩어리(호출)로 두고 글자 사이를 쪼개지 않는다
// - 등록되지 않은 이름 뒤 `(`는 곱이다 (`xy(1)` → `x*y*(1)`)
// - 여러 자리 수는 한 원자로 읽는다
// - 이미 정의된 변수 이름과 보호 이름은 글자 단위로 쪼개지 않는다
// - 문자열 리터럴 안은 건드리지 않는다
use std::collections::BTreeSet;

use crate::term_map::{is_protected_name, is_ta_function};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Atom {
    Word(String),
    Number(String),
    /// 이름 + `(`
    Func(String),
    Open,
    Close,
    Space(String),
    Str(String),
    Other(String),
}

impl Atom {
    fn text(&self) -> String {
        match self {
            Atom::Word(text) | Atom::Number(text) | Atom::Space(text) | Atom::Str(text) | Atom::Other(text) => {
                text.clone()
            }
            Atom::Func(name) => format!("{}(", name),
            Atom::Open => "(".to_string(),
            Atom::Close => ")".to_string(),
        }
    }

    /// 곱의 왼쪽 피연산자가 될 수 있는지
    fn ends_operand(&self) -> bool {
        matches!(self, Atom::Word(_) | Atom::Number(_) | Atom::Close)
    }

    /// 곱의 오른쪽 피연산자를 시작할 수 있는지
    fn starts_operand(&self) -> bool {
        matches!(self, Atom::Word(_) | Atom::Number(_) | Atom::Func(_) | Atom::Open)
    }
}

/// 한 연습문제 안에서 쓰는 곱셈 정규화기. 문장을 차례로 넣으면 정의된 변수를 기억한다.
#[derive(Debug, Clone, Default)]
pub struct MultiplicationNormalizer {
    known_vars: BTreeSet<String>,
    protected: BTreeSet<String>,
}

impl MultiplicationNormalizer {
    pub fn new(extra_protected: &[String]) -> Self {
        Self {
            known_vars: BTreeSet::new(),
            protected: extra_protected.iter().map(|name| name.trim().to_string()).collect(),
        }
    }

    /// 이후 문장에서 통째로 다룰 변수 이름
    pub fn remember(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.known_vars.insert(name.to_string());
        }
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known_vars.contains(name)
    }

    /// 문장 본문(등호 오른쪽)에 `*`를 넣는다.
    pub fn normalize(&self, body: &str) -> String {
        let atoms = self.split_words(scan_atoms(body));
        let mut out = String::with_capacity(body.len() + 8);
        let mut prev: Option<&Atom> = None;

        for (idx, atom) in atoms.iter().enumerate() {
            if let Atom::Space(text) = atom {
                let next = atoms.get(idx + 1);
                let joins = prev.map(Atom::ends_operand).unwrap_or(false)
                    && next.map(Atom::starts_operand).unwrap_or(false);
                if joins {
                    out.push('*');
                } else {
                    out.push_str(text);
                }
                // 공백은 인접 판단에서 빠진다
                prev = None;
                continue;
            }
            if let Some(left) = prev {
                if left.ends_operand() && atom.starts_operand() {
                    out.push('*');
                }
            }
            out.push_str(&atom.text());
            prev = Some(atom);
        }
        out
    }

    fn keeps_whole(&self, word: &str) -> bool {
        self.known_vars.contains(word)
            || is_protected_name(word)
            || self.protected.contains(word)
            || word.contains('_')
    }

    /// 모르는 낱말을 글자(숫자 묶음) 단위 원자로 쪼갠다.
    fn split_words(&self, atoms: Vec<Atom>) -> Vec<Atom> {
        let mut out = Vec::with_capacity(atoms.len());
        for atom in atoms {
            let Atom::Word(word) = atom else {
                out.push(atom);
                continue;
            };
            if self.keeps_whole(&word) {
                out.push(Atom::Word(word));
                continue;
            }
            let (head, rest) = match word.strip_prefix('$') {
                Some(stripped) => {
                    let mut chars = stripped.chars();
                    match chars.next() {
                        Some(first) => (format!("${}", first), chars.as_str().to_string()),
                        None => (word.clone(), String::new()),
                    }
                }
                None => (String::new(), word.clone()),
            };
            if !head.is_empty() {
                out.push(Atom::Word(head));
            }
            out.extend(letter_atoms(&rest));
        }
        out
    }
}

fn letter_atoms(text: &str) -> Vec<Atom> {
    let mut out = Vec::new();
    let mut digits = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        if !digits.is_empty() {
            out.push(Atom::Number(std::mem::take(&mut digits)));
        }
        out.push(Atom::Word(ch.to_string()));
    }
    if !digits.is_empty() {
        out.push(Atom::Number(digits));
    }
    out
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn scan_atoms(body: &str) -> Vec<Atom> {
    let chars: Vec<char> = body.chars().collect();
    let mut atoms = Vec::new();
    let mut pos = 0usize;

    while pos < chars.len() {
        let ch = chars[pos];
        let start = pos;
        match ch {
            '"' => {
                pos += 1;
                while pos < chars.len() {
                    if chars[pos] == '\\' {
                        pos += 2;
                        continue;
                    }
                    pos += 1;
                    if chars[pos - 1] == '"' {
                        break;
                    }
                }
                let end = pos.min(chars.len());
                atoms.push(Atom::Str(chars[start..end].iter().collect()));
            }
            '0'..='9' => {
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
                let fraction = chars.get(pos) == Some(&'.')
                    && chars.get(pos + 1).map(|c| c.is_ascii_digit()).unwrap_or(false);
                if fraction {
                    pos += 1;
                    while pos < chars.len() && chars[pos].is_ascii_digit() {
                        pos += 1;
                    }
                }
                atoms.push(Atom::Number(chars[start..pos].iter().collect()));
            }
            '$' | 'a'..='z' | 'A'..='Z' | '_' => {
                pos += 1;
                while pos < chars.len() && is_word_char(chars[pos]) {
                    pos += 1;
                }
                let word: String = chars[start..pos].iter().collect();
                // 등록 함수만 호출로 읽는다. `$rint(…)`처럼 `$`가 붙어도 같다.
                let call = is_ta_function(word.strip_prefix('$').unwrap_or(&word));
                if call && chars.get(pos) == Some(&'(') {
                    pos += 1;
                    atoms.push(Atom::Func(word));
                } else {
                    atoms.push(Atom::Word(word));
                }
            }
            '(' => {
                pos += 1;
                atoms.push(Atom::Open);
            }
            ')' => {
                pos += 1;
                atoms.push(Atom::Close);
            }
            c if c.is_whitespace() => {
                while pos < chars.len() && chars[pos].is_whitespace() {
                    pos += 1;
                }
                atoms.push(Atom::Space(chars[start..pos].iter().collect()));
            }
            '*' if chars.get(pos + 1) == Some(&'*') => {
                pos += 2;
                atoms.push(Atom::Other("^".to_string()));
            }
            _ => {
                pos += 1;
                atoms.push(Atom::Other(ch.to_string()));
            }
        }
    }
    atoms
}
