// lang/src/term_map.rs
// 원천(Maple T.A.) 함수 등록부와 대상(SOWISO) 재작성 규칙표

/// 함수 이름 하나에 붙는 구조 재작성 규칙
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewriteRule {
    /// 이름만 바꾼다
    Rename(&'static str),
    /// 이름을 바꾸고 인자 순서를 뒤집는다
    RenameReversed(&'static str),
    /// `if(c, a, b)` → `c ? a : b`
    Ternary,
    /// 첫 인자를 색인으로, 나머지를 목록 하나로 묶는다
    IndexedList {
        target: &'static str,
        zero_base: bool,
    },
    /// 정수 난수: 상한을 하나 줄인다
    RandomInt,
    /// 닫힌 구간 난수: 상한은 그대로
    InclusiveRange,
    /// 모든 인자를 목록 하나로 묶는다
    Aggregate(&'static str),
    /// 인자가 모두 리터럴이면 통째로 네이티브 식으로 감싼다
    NativeIfLiteral,
    /// `frac(a, b)` → `a / b`
    Fraction,
    /// 접두/접미 규칙으로 이름을 만든다 (arcsin → asin, hypsin → sinh)
    TrigAffix,
    Logarithm {
        base10: bool,
    },
}

#[derive(Clone, Copy)]
pub struct RuleEntry {
    pub source: &'static str,
    pub rule: RewriteRule,
}

pub const REWRITE_RULES: [RuleEntry; 37] = [
    RuleEntry { source: "eq", rule: RewriteRule::Rename("sw_eq") },
    RuleEntry { source: "ge", rule: RewriteRule::Rename("sw_ge") },
    RuleEntry { source: "le", rule: RewriteRule::Rename("sw_le") },
    RuleEntry { source: "ne", rule: RewriteRule::Rename("sw_ne") },
    RuleEntry { source: "not", rule: RewriteRule::Rename("sw_not") },
    RuleEntry { source: "gt", rule: RewriteRule::Rename("sw_gt") },
    RuleEntry { source: "lt", rule: RewriteRule::Rename("sw_lt") },
    RuleEntry { source: "if", rule: RewriteRule::Ternary },
    RuleEntry { source: "decimal", rule: RewriteRule::RenameReversed("round") },
    RuleEntry { source: "int", rule: RewriteRule::Rename("sw_int") },
    RuleEntry { source: "sig", rule: RewriteRule::RenameReversed("sw_round_sig") },
    RuleEntry { source: "lsu", rule: RewriteRule::RenameReversed("sw_lsu") },
    RuleEntry {
        source: "switch",
        rule: RewriteRule::IndexedList { target: "sw_alist", zero_base: true },
    },
    RuleEntry {
        source: "indexof",
        rule: RewriteRule::IndexedList { target: "sw_ilist", zero_base: false },
    },
    RuleEntry {
        source: "rank",
        rule: RewriteRule::IndexedList { target: "sw_rank", zero_base: false },
    },
    RuleEntry { source: "rint", rule: RewriteRule::RandomInt },
    RuleEntry { source: "rand", rule: RewriteRule::Rename("sw_rand_float") },
    RuleEntry { source: "range", rule: RewriteRule::InclusiveRange },
    RuleEntry { source: "fact", rule: RewriteRule::Rename("sw_fact") },
    RuleEntry { source: "gcd", rule: RewriteRule::Rename("sw_gcd") },
    RuleEntry { source: "numfmt", rule: RewriteRule::Rename("numfmt") },
    RuleEntry { source: "max", rule: RewriteRule::Aggregate("sw_max") },
    RuleEntry { source: "min", rule: RewriteRule::Aggregate("sw_min") },
    RuleEntry { source: "strcat", rule: RewriteRule::Aggregate("sw_concat") },
    RuleEntry { source: "binomial", rule: RewriteRule::NativeIfLiteral },
    RuleEntry { source: "frac", rule: RewriteRule::Fraction },
    RuleEntry { source: "csc", rule: RewriteRule::NativeIfLiteral },
    RuleEntry { source: "sec", rule: RewriteRule::NativeIfLiteral },
    RuleEntry { source: "cot", rule: RewriteRule::NativeIfLiteral },
    RuleEntry { source: "arcsin", rule: RewriteRule::TrigAffix },
    RuleEntry { source: "arccos", rule: RewriteRule::TrigAffix },
    RuleEntry { source: "arctan", rule: RewriteRule::TrigAffix },
    RuleEntry { source: "hypsin", rule: RewriteRule::TrigAffix },
    RuleEntry { source: "hypcos", rule: RewriteRule::TrigAffix },
    RuleEntry { source: "hyptan", rule: RewriteRule::TrigAffix },
    RuleEntry { source: "ln", rule: RewriteRule::Logarithm { base10: false } },
    RuleEntry { source: "log", rule: RewriteRule::Logarithm { base10: true } },
];

/// 역쌍곡 함수는 접두 규칙 하나로 충분해서 표에는 넣지 않는다.
const ARC_HYPERBOLIC: [&str; 3] = ["archypsin", "archypcos", "archyptan"];

/// 원천 플랫폼 함수 등록부. 곱셈 정규화가 이름 안 글자를 곱으로 쪼개지 않도록 보호한다.
pub const TA_FUNCTIONS: &[&str] = &[
    "eq", "ge", "le", "ne", "not", "gt", "lt", "if", "decimal", "int", "sig", "lsu", "sum",
    "switch", "rint", "rand", "range", "fact", "frac", "gcd", "indexof", "rank", "numfmt", "max",
    "min", "strcat", "binomial", "erf", "inverf", "invstudentst", "studentst", "java", "maple",
    "mathml", "plotmaple", "cos", "sin", "tan", "csc", "sec", "cot", "abs", "sqrt", "arcsin",
    "arccos", "arctan", "hypsin", "hypcos", "hyptan", "archypsin", "archypcos", "archyptan", "ln",
    "log", "exp", "floor",
];

/// 대상에서도 같은 이름/같은 인자로 동작하는 함수
pub const PASSTHROUGH_FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "abs", "sqrt", "exp", "floor", "erf", "inverf", "studentst",
    "invstudentst", "maple", "pow",
];

/// 곱셈 정규화가 한 덩어리로 두는 맨 이름
pub const PROTECTED_NAMES: &[&str] = &[
    "pi", "Pi", "true", "false", "string", "ascending", "descending", "infinity",
];

pub const NATIVE_WRAPPER: &str = "sw_maxima_native";
pub const PRESENTATION_WRAPPER: &str = "sw_maxima";
pub const PLATFORM_EVAL: &str = "maple";

pub fn find_rule(name: &str) -> Option<RewriteRule> {
    if ARC_HYPERBOLIC.contains(&name) {
        return Some(RewriteRule::TrigAffix);
    }
    REWRITE_RULES
        .iter()
        .find(|entry| entry.source == name)
        .map(|entry| entry.rule)
}

pub fn is_ta_function(name: &str) -> bool {
    TA_FUNCTIONS.iter().any(|entry| *entry == name)
}

pub fn is_passthrough(name: &str) -> bool {
    PASSTHROUGH_FUNCTIONS.iter().any(|entry| *entry == name)
}

pub fn is_protected_name(name: &str) -> bool {
    PROTECTED_NAMES.iter().any(|entry| *entry == name)
}

/// arc-/hyp-/archyp- 접두를 대상 이름으로 바꾼다.
pub fn trig_affix_target(name: &str) -> Option<String> {
    if let Some(rest) = name.strip_prefix("archyp") {
        return Some(format!("a{}h", rest));
    }
    if let Some(rest) = name.strip_prefix("hyp") {
        return Some(format!("{}h", rest));
    }
    name.strip_prefix("arc").map(|rest| format!("a{}", rest))
}

/// 문자열 안에 등록된 원천 함수 호출(`name(`)이 있는지
pub fn contains_ta_call(text: &str) -> bool {
    TA_FUNCTIONS
        .iter()
        .any(|name| text.contains(&format!("{}(", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trig_affixes() {
        assert_eq!(trig_affix_target("arcsin").as_deref(), Some("asin"));
        assert_eq!(trig_affix_target("hypcos").as_deref(), Some("cosh"));
        assert_eq!(trig_affix_target("archyptan").as_deref(), Some("atanh"));
        assert_eq!(trig_affix_target("sin"), None);
    }

    #[test]
    fn arc_hyperbolic_resolves_without_table_entry() {
        assert_eq!(find_rule("archypsin"), Some(RewriteRule::TrigAffix));
        assert_eq!(find_rule("rint"), Some(RewriteRule::RandomInt));
        assert_eq!(find_rule("plotmaple"), None);
    }

    #[test]
    fn registry_lookups() {
        assert!(is_ta_function("maple"));
        assert!(is_ta_function("archypcos"));
        assert!(!is_ta_function("Matrix"));
        assert!(is_protected_name("Pi"));
        assert!(contains_ta_call("1 + rint(4)"));
        assert!(!contains_ta_call("1 + $rint"));
    }
}
