// lang/src/splitter.rs
// 알고리즘 문자열 → `name = expr` 문장 목록
use serde::Serialize;

use crate::patterns;

/// 문자열 리터럴로 쓰인 괄호. 괄호 균형 셈에서 빠진다.
const OPEN_LITERAL: &str = "\"(\"";
const CLOSE_LITERAL: &str = "\")\"";
const OPEN_MARKER: char = '\u{E000}';
const CLOSE_MARKER: char = '\u{E001}';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub name: String,
    pub raw_expression: String,
    pub order: usize,
}

impl Statement {
    /// 첫 `=` 기준으로 이름과 식을 나눈다. `=`가 없으면 이름이 빈 문장이 된다.
    pub fn parse(segment: &str, order: usize) -> Self {
        match segment.find('=') {
            Some(eq) => Self {
                name: segment[..eq].trim().to_string(),
                raw_expression: segment[eq + 1..].trim().to_string(),
                order,
            },
            None => Self {
                name: String::new(),
                raw_expression: segment.trim().to_string(),
                order,
            },
        }
    }

    pub fn text(&self) -> String {
        if self.name.is_empty() {
            return self.raw_expression.clone();
        }
        format!("{}={}", self.name, self.raw_expression)
    }

    pub fn is_assignment(&self) -> bool {
        !self.name.is_empty()
    }
}

pub fn split_statements(algorithm: &str) -> Vec<Statement> {
    split_segments(algorithm)
        .iter()
        .enumerate()
        .map(|(order, segment)| Statement::parse(segment, order))
        .collect()
}

/// `;` 경계에서 자르되, 그때까지 괄호가 맞고 따옴표가 짝수일 때만 경계로 인정한다.
pub fn split_segments(algorithm: &str) -> Vec<String> {
    let collapsed = collapse_separators(algorithm);
    let masked = collapsed
        .replace(OPEN_LITERAL, &OPEN_MARKER.to_string())
        .replace(CLOSE_LITERAL, &CLOSE_MARKER.to_string());

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut open = 0usize;
    let mut close = 0usize;
    let mut quotes = 0usize;
    let mut prev: Option<char> = None;

    for ch in masked.chars() {
        match ch {
            ';' if open == close && quotes % 2 == 0 => {
                push_segment(&mut segments, &current);
                current.clear();
                open = 0;
                close = 0;
                quotes = 0;
                prev = None;
                continue;
            }
            '(' => open += 1,
            ')' => close += 1,
            '"' if prev != Some('\\') => quotes += 1,
            _ => {}
        }
        current.push(ch);
        prev = Some(ch);
    }
    push_segment(&mut segments, &current);
    segments
}

/// `condition:…;` 문장을 떼어 낸다. 남은 알고리즘과 조건 목록을 돌려준다.
pub fn extract_conditions(algorithm: &str) -> (String, Vec<String>) {
    let re = patterns::condition();
    let conditions: Vec<String> = re
        .find_iter(algorithm)
        .map(|m| m.as_str().to_string())
        .collect();
    if conditions.is_empty() {
        return (algorithm.to_string(), conditions);
    }
    let stripped = re.replace_all(algorithm, "").into_owned();
    (stripped, conditions)
}

fn collapse_separators(algorithm: &str) -> String {
    patterns::double_separator()
        .replace_all(algorithm, ";")
        .into_owned()
}

fn push_segment(segments: &mut Vec<String>, raw: &str) {
    let restored = raw
        .replace(OPEN_MARKER, OPEN_LITERAL)
        .replace(CLOSE_MARKER, CLOSE_LITERAL);
    let trimmed = restored.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced(text: &str) -> bool {
        let masked = text.replace(OPEN_LITERAL, "").replace(CLOSE_LITERAL, "");
        let open = masked.matches('(').count();
        let close = masked.matches(')').count();
        let quotes = masked.matches('"').count() - masked.matches("\\\"").count();
        open == close && quotes % 2 == 0
    }

    #[test]
    fn splits_simple_statements() {
        let stmts = split_statements("$a=rint(5);$b = $a+1;");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].name, "$a");
        assert_eq!(stmts[0].raw_expression, "rint(5)");
        assert_eq!(stmts[1].name, "$b");
        assert_eq!(stmts[1].raw_expression, "$a+1");
        assert_eq!(stmts[1].order, 1);
    }

    #[test]
    fn rejoin_of_two_statements_is_stable() {
        let first = "$a=maple(\"x;y\")";
        let second = "$b=if(gt($a,1),1,2)";
        let joined = format!("{};{};", first, second);
        assert_eq!(split_segments(&joined), vec![first.to_string(), second.to_string()]);
    }

    #[test]
    fn semicolon_inside_parens_or_quotes_is_content() {
        let segments = split_segments("$a=f(1;2);$b=\"x;y\";$c=3");
        assert_eq!(segments, vec!["$a=f(1;2)", "$b=\"x;y\"", "$c=3"]);
        for segment in &segments {
            assert!(balanced(segment));
        }
    }

    #[test]
    fn literal_parens_in_strings_do_not_count() {
        let segments = split_segments("$a=strcat(\"(\", $b);$c=strcat($d, \")\");");
        assert_eq!(segments, vec!["$a=strcat(\"(\", $b)", "$c=strcat($d, \")\")"]);
    }

    #[test]
    fn double_separators_collapse() {
        let segments = split_segments("$a=1;; ;$b=2;");
        assert_eq!(segments, vec!["$a=1", "$b=2"]);
    }

    #[test]
    fn unbalanced_input_degrades_to_one_statement() {
        let stmts = split_statements("$a=f(1;$b=2;");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].raw_expression, "f(1;$b=2;");
    }

    #[test]
    fn statement_without_equals_has_no_name() {
        let stmts = split_statements("rint(3)");
        assert!(!stmts[0].is_assignment());
        assert_eq!(stmts[0].text(), "rint(3)");
    }

    #[test]
    fn conditions_are_extracted() {
        let (rest, conditions) = extract_conditions("$a=rint(5);condition:gt($a,1);$b=2;");
        assert_eq!(rest, "$a=rint(5);$b=2;");
        assert_eq!(conditions, vec!["condition:gt($a,1);"]);
    }
}
