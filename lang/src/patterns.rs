// lang/src/patterns.rs
// 변환기 전체가 쓰는 고정 정규식
use std::sync::OnceLock;

use regex::Regex;

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("고정 정규식"))
}

/// `condition:…;` 문장
pub fn condition() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    cached(&CELL, r"condition ?: ?.*?;")
}

/// 겹친 `;` 구분자
pub fn double_separator() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    cached(&CELL, r";(\s*;)+")
}

/// 글자 뒤가 아닌 `(정수,정수)` 쌍
pub fn numeric_pair() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    cached(&CELL, r"(^|[^A-Za-z0-9_$])\((-?\d+),(-?\d+)\)")
}

/// `var = lower..upper`
pub fn range_binding() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    cached(&CELL, r"^(.+)=(.+)\.\.(.+)$")
}

/// 원천 상수 자리표시자 `Pi`
pub fn pi_placeholder() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    cached(&CELL, r"\bPi\b")
}

/// 식 안의 함수 호출 이름
pub fn call_name() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    cached(&CELL, r"([A-Za-z_][A-Za-z0-9_]*)\s*\(")
}

/// 답 안의 `${name}` 표기
pub fn braced_variable() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    cached(&CELL, r"\$\{(\w+)\}")
}
