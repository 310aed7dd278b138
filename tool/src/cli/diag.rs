use std::fs;
use std::path::Path;

use serde_json::json;
use ta2sw_lang::{BatchSummary, ConvertIssue, ExerciseConversion};

pub fn build_diag(code: &str, detail: &str, hint: Option<String>, fix: Option<String>) -> String {
    let mut out = format!("{} {}", code, detail);
    if let Some(h) = hint {
        if !h.is_empty() {
            out.push_str(&format!(" hint={}", h));
        }
    }
    if let Some(f) = fix {
        if !f.is_empty() {
            out.push_str(&format!(" fix={}", f));
        }
    }
    out
}

fn issue_hint(issue: &ConvertIssue) -> Option<String> {
    match issue {
        ConvertIssue::UnsupportedFunction { name } => {
            Some(format!("config.extra_mappings에 `{}` 대응을 추가", name))
        }
        ConvertIssue::NestingLimit { .. } => Some("--native-depth 값을 올리기".to_string()),
        _ => None,
    }
}

/// 문제 하나당 stderr 한 줄
pub fn issue_lines(exercise: &ExerciseConversion) -> Vec<String> {
    let label = exercise.label();
    let mut lines = Vec::new();
    for var in &exercise.variables {
        for issue in &var.result.issues {
            let detail = format!("{} {}: {}", label, var.source_name, issue_message(issue));
            lines.push(build_diag(issue.code(), &detail, issue_hint(issue), None));
        }
    }
    lines
}

/// 문제 하나당 JSON 한 줄
pub fn jsonl_lines(exercise: &ExerciseConversion) -> Vec<String> {
    let label = exercise.label();
    let mut lines = Vec::new();
    for var in &exercise.variables {
        for issue in &var.result.issues {
            let line = json!({
                "kind": "convert",
                "exercise": label,
                "variable": var.source_name,
                "code": issue.code(),
                "message": issue_message(issue),
            });
            lines.push(line.to_string());
        }
    }
    lines
}

pub fn summary_line(summary: &BatchSummary) -> String {
    format!(
        "ta2sw: {} exercises, ok={}, fallback={}, failed={}",
        summary.exercises, summary.ok, summary.fallback, summary.failed
    )
}

pub fn write_jsonl(path: &Path, lines: &[String]) -> Result<(), String> {
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    fs::write(path, text).map_err(|e| format!("E_CLI_WRITE {}", e))
}

/// Display에서 코드 접두를 뗀 본문
fn issue_message(issue: &ConvertIssue) -> String {
    let text = issue.to_string();
    text.strip_prefix(issue.code())
        .map(|rest| rest.trim_start().to_string())
        .unwrap_or(text)
}
