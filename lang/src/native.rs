// lang/src/native.rs
// 원천 플랫폼 평가 호출 `maple("…")` 처리
//
// 순서:
// - 백틱 제거, `Pi` → `float(%pi)`
// - 표현 전용 관용구(ExportPresentation)는 문자열만 떼어 표현 래퍼로
// - 호출/목록/범위가 없으면 그대로 네이티브 래퍼로
// - 모든 호출 이름이 1:1이면 이름만 바꿔 네이티브 래퍼로
// - 아니면 호출 트리 변환을 거쳐 네이티브 래퍼로 (경고)
use crate::call_tree::CallTreeBuilder;
use crate::dialect::MappingTable;
use crate::error::ConvertIssue;
use crate::patterns;
use crate::printer::{escape_native, native_call};
use crate::term_map::{PLATFORM_EVAL, PRESENTATION_WRAPPER};

const PRESENTATION_IDIOM: &str = "ExportPresentation";
const TARGET_PI: &str = "float(%pi)";

#[derive(Debug, Clone, PartialEq)]
pub struct NativeOutcome {
    pub text: String,
    pub warning: bool,
    /// 래퍼로 바꾼 조각이 있는지
    pub wrapped: bool,
    /// 변환하지 못하고 남은 조각이 있는지
    pub unresolved: bool,
    pub issues: Vec<ConvertIssue>,
}

/// 조각 안쪽 변환 결과 (래퍼 씌우기 전)
struct InnerConversion {
    text: String,
    warning: bool,
    issues: Vec<ConvertIssue>,
}

/// 문자열 안의 `maple("…")` 위치
struct PlatformCall {
    start: usize,
    end: usize,
    /// 따옴표 안 원문 (이스케이프 유지)
    raw: String,
}

pub struct NativeDelegator<'a> {
    table: &'a MappingTable,
    depth_limit: usize,
}

impl<'a> NativeDelegator<'a> {
    pub fn new(table: &'a MappingTable, depth_limit: usize) -> Self {
        Self { table, depth_limit }
    }

    pub fn delegate(&self, definition: &str) -> NativeOutcome {
        if !definition.contains(&format!("{}(", PLATFORM_EVAL)) {
            return NativeOutcome {
                text: definition.to_string(),
                warning: false,
                wrapped: false,
                unresolved: false,
                issues: Vec::new(),
            };
        }
        let cleaned = definition.replace('`', "");
        let cleaned = patterns::pi_placeholder()
            .replace_all(&cleaned, TARGET_PI)
            .into_owned();

        let mut outcome = NativeOutcome {
            text: String::with_capacity(cleaned.len()),
            warning: false,
            wrapped: false,
            unresolved: false,
            issues: Vec::new(),
        };
        let mut cursor = 0usize;
        for call in find_platform_calls(&cleaned) {
            outcome.text.push_str(&cleaned[cursor..call.start]);
            cursor = call.end;
            match self.resolve(&unescape(&call.raw)) {
                Ok(inner) => {
                    outcome.text.push_str(&inner.text);
                    outcome.warning |= inner.warning;
                    outcome.wrapped = true;
                    outcome.issues.extend(inner.issues);
                }
                Err(issue) => {
                    outcome.text.push_str(&cleaned[call.start..call.end]);
                    outcome.warning = true;
                    outcome.unresolved = true;
                    outcome.issues.push(issue);
                }
            }
        }
        outcome.text.push_str(&cleaned[cursor..]);
        if outcome.text.contains(&format!("{}(", PLATFORM_EVAL)) && !outcome.unresolved {
            // 문자열 인자가 아니거나 닫히지 않은 호출
            outcome.unresolved = true;
            outcome.warning = true;
            outcome
                .issues
                .push(ConvertIssue::malformed("platform call without a closed string argument"));
        }
        outcome
    }

    /// 바깥 조각 하나 → 대체 문자열
    fn resolve(&self, inner: &str) -> Result<InnerConversion, ConvertIssue> {
        if inner.contains(PRESENTATION_IDIOM) {
            let argument = presentation_argument(inner).ok_or_else(|| {
                ConvertIssue::ambiguity(PRESENTATION_IDIOM, "presentation argument is not a plain expression")
            })?;
            return Ok(InnerConversion {
                text: format!("{}(\"{}\")", PRESENTATION_WRAPPER, escape_native(&argument)),
                warning: true,
                issues: vec![ConvertIssue::ambiguity(
                    PRESENTATION_IDIOM,
                    "only the presented expression is kept",
                )],
            });
        }
        let converted = self.convert_inner(inner, 1)?;
        let unsupported = converted
            .issues
            .iter()
            .any(|issue| matches!(issue, ConvertIssue::UnsupportedFunction { .. }));
        let mut issues = converted.issues;
        let text = if unsupported {
            issues.retain(|issue| !matches!(issue, ConvertIssue::OpaqueFallback { .. }));
            issues.push(ConvertIssue::opaque(inner));
            native_call(inner)
        } else {
            native_call(&converted.text)
        };
        Ok(InnerConversion { text, warning: converted.warning, issues })
    }

    fn convert_inner(&self, inner: &str, depth: usize) -> Result<InnerConversion, ConvertIssue> {
        if depth > self.depth_limit {
            return Err(ConvertIssue::NestingLimit { depth: self.depth_limit });
        }

        // 안쪽 `maple("…")`는 이미 네이티브 문맥이므로 식만 남긴다
        let mut flattened = String::with_capacity(inner.len());
        let mut warning = false;
        let mut issues = Vec::new();
        let mut cursor = 0usize;
        for call in find_platform_calls(inner) {
            flattened.push_str(&inner[cursor..call.start]);
            let nested = self.convert_inner(&unescape(&call.raw), depth + 1)?;
            flattened.push('(');
            flattened.push_str(&nested.text);
            flattened.push(')');
            warning = true;
            issues.push(ConvertIssue::ambiguity(PLATFORM_EVAL, "nested platform call is inlined"));
            issues.extend(nested.issues);
            cursor = call.end;
        }
        flattened.push_str(&inner[cursor..]);

        let names: Vec<String> = patterns::call_name()
            .captures_iter(&flattened)
            .map(|caps| caps[1].to_string())
            .collect();

        let structured = flattened.contains(|c: char| c == '[' || c == '{') || flattened.contains("..");
        if names.is_empty() && !structured {
            return Ok(InnerConversion { text: flattened, warning, issues });
        }
        if !names.is_empty() && names.iter().all(|name| self.table.contains(name)) {
            let text = patterns::call_name()
                .replace_all(&flattened, |caps: &regex::Captures| {
                    let target = self.table.target(&caps[1]).unwrap_or(&caps[1]);
                    format!("{}(", target)
                })
                .into_owned();
            return Ok(InnerConversion { text, warning, issues });
        }

        let outcome = CallTreeBuilder::new(self.table).convert(&flattened);
        if let Some(fatal) = outcome.issues.iter().find(|issue| issue.is_fatal()) {
            return Err(fatal.clone());
        }
        issues.extend(outcome.issues);
        issues.push(ConvertIssue::opaque(&flattened));
        Ok(InnerConversion { text: outcome.text, warning: true, issues })
    }
}

/// `ExportPresentation(…)`의 인자. 호출/따옴표/`]`/범위가 있으면 None.
fn presentation_argument(inner: &str) -> Option<String> {
    let at = inner.find(PRESENTATION_IDIOM)? + PRESENTATION_IDIOM.len();
    let rest = &inner[at..];
    let rest = rest.strip_prefix(']').unwrap_or(rest);
    let rest = rest.strip_prefix('(')?;
    let mut depth = 1usize;
    let mut end = None;
    for (idx, ch) in rest.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(idx);
                    break;
                }
            }
            _ => {}
        }
    }
    let argument = &rest[..end?];
    let plain = !patterns::call_name().is_match(argument)
        && !argument.contains('\'')
        && !argument.contains(']')
        && !argument.contains("..");
    plain.then(|| argument.trim().to_string())
}

fn find_platform_calls(text: &str) -> Vec<PlatformCall> {
    let opener = format!("{}(\"", PLATFORM_EVAL);
    let bytes = text.as_bytes();
    let mut calls = Vec::new();
    let mut search_from = 0usize;

    while let Some(found) = text[search_from..].find(&opener) {
        let start = search_from + found;
        search_from = start + opener.len();
        let preceded = start > 0 && {
            let prev = bytes[start - 1];
            prev.is_ascii_alphanumeric() || prev == b'_' || prev == b'$'
        };
        if preceded {
            continue;
        }
        let body_start = start + opener.len();
        let mut idx = body_start;
        let mut close = None;
        while idx < bytes.len() {
            match bytes[idx] {
                b'\\' => idx += 2,
                b'"' => {
                    close = Some(idx);
                    break;
                }
                _ => idx += 1,
            }
        }
        let Some(quote) = close else { break };
        let after = text[quote + 1..].trim_start();
        if !after.starts_with(')') {
            continue;
        }
        let end = text.len() - after.len() + 1;
        calls.push(PlatformCall {
            start,
            end,
            raw: text[body_start..quote].to_string(),
        });
        search_from = end;
    }
    calls
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
            continue;
        }
        out.push(ch);
    }
    out
}
