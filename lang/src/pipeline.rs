// lang/src/pipeline.rs
// 연습문제 하나/여러 개 변환
//
// 조건 분리 → 답 변수 → 문장 분리 → 곱셈 정규화 → 목록 전처리
// → 구조 재작성 → 네이티브 위임 → 변수 치환 → 주석
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::ConvertConfig;
use crate::dialect::MappingTable;
use crate::error::ConvertIssue;
use crate::native::NativeDelegator;
use crate::normalizer::MultiplicationNormalizer;
use crate::patterns;
use crate::rewriter::Rewriter;
use crate::scheme::{SchemeEntry, VariableScheme};
use crate::splitter::{extract_conditions, split_statements, Statement};
use crate::term_map::contains_ta_call;

const FINGERPRINT_PREFIX_LEN: usize = 12;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseInput {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub algorithm: String,
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    Ok,
    /// 네이티브 래퍼를 썼다
    Fallback,
    /// 대응이 없어 원문을 남겼다
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub target_expression: String,
    pub status: ConversionStatus,
    pub warning: bool,
    pub comment: String,
    pub issues: Vec<ConvertIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedVariable {
    pub order: usize,
    pub source_name: String,
    /// `$a` 꼴. 이름 없는 문장이거나 토큰이 바닥나면 빈 문자열.
    pub canonical_name: String,
    pub original: String,
    pub result: ConversionResult,
}

impl ConvertedVariable {
    /// (정본 이름, 대상 정의, 경고, 주석)
    pub fn contract(&self) -> (&str, &str, bool, &str) {
        (
            &self.canonical_name,
            &self.result.target_expression,
            self.result.warning,
            &self.result.comment,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseConversion {
    pub uid: Option<String>,
    pub fingerprint: String,
    pub variables: Vec<ConvertedVariable>,
    pub scheme: Vec<SchemeEntry>,
    pub conditions: Vec<String>,
    pub answer: Option<String>,
    pub comment: String,
    /// 변수 중 하나라도 경고가 있으면 참
    pub warning: bool,
}

impl ExerciseConversion {
    pub fn label(&self) -> String {
        match &self.uid {
            Some(uid) => uid.clone(),
            None => format!("unknown ({})", self.short_fingerprint()),
        }
    }

    pub fn short_fingerprint(&self) -> &str {
        let end = self.fingerprint.len().min(FINGERPRINT_PREFIX_LEN);
        &self.fingerprint[..end]
    }

    pub fn count(&self, status: ConversionStatus) -> usize {
        self.variables
            .iter()
            .filter(|var| var.result.status == status)
            .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub exercises: usize,
    pub variables: usize,
    pub ok: usize,
    pub fallback: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl BatchSummary {
    fn add(&mut self, exercise: &ExerciseConversion) {
        self.exercises += 1;
        self.variables += exercise.variables.len();
        self.ok += exercise.count(ConversionStatus::Ok);
        self.fallback += exercise.count(ConversionStatus::Fallback);
        self.failed += exercise.count(ConversionStatus::Failed);
        self.warnings += exercise
            .variables
            .iter()
            .filter(|var| var.result.warning)
            .count();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchConversion {
    pub exercises: Vec<ExerciseConversion>,
    pub summary: BatchSummary,
}

/// blake3(algorithm + "\n" + answer) 16진수
pub fn fingerprint(input: &ExerciseInput) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(input.algorithm.as_bytes());
    hasher.update(b"\n");
    hasher.update(input.answer.as_deref().unwrap_or("").as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// 설정 하나로 여러 연습문제를 변환한다. 1:1 표는 한 번만 만든다.
pub struct ExerciseConverter<'a> {
    config: &'a ConvertConfig,
    table: MappingTable,
}

/// 문장 하나의 중간 결과 (변수 치환 전)
struct StatementConversion {
    target: String,
    status: ConversionStatus,
    warning: bool,
    platform_failure: bool,
    issues: Vec<ConvertIssue>,
}

impl<'a> ExerciseConverter<'a> {
    pub fn new(config: &'a ConvertConfig) -> Self {
        Self {
            config,
            table: config.mapping_table(),
        }
    }

    pub fn convert(&self, input: &ExerciseInput) -> ExerciseConversion {
        let fingerprint = fingerprint(input);
        let (algorithm, conditions) = extract_conditions(&input.algorithm);
        let (algorithm, answer) = prepare_answer(algorithm, input.answer.as_deref());

        let mut normalizer = MultiplicationNormalizer::new(&self.config.protected_names);
        let mut rewriter = Rewriter::new();
        let delegator = NativeDelegator::new(&self.table, self.config.native_depth_limit);
        let mut scheme = VariableScheme::new();
        let mut variables = Vec::new();

        for statement in split_statements(&algorithm) {
            normalizer.remember(&statement.name);
            let mut converted = self.convert_statement(&statement, &normalizer, &mut rewriter, &delegator);

            let canonical_name = if statement.is_assignment() {
                match scheme.assign(&statement.name) {
                    Ok((token, fresh)) => {
                        if !fresh {
                            converted
                                .issues
                                .push(ConvertIssue::ambiguity(&statement.name, "redefined variable"));
                            converted.warning = true;
                        }
                        format!("${}", token)
                    }
                    Err(issue) => {
                        converted.status = ConversionStatus::Failed;
                        converted.warning = true;
                        converted.issues.push(issue);
                        String::new()
                    }
                }
            } else {
                converted.status = ConversionStatus::Failed;
                converted.warning = true;
                converted
                    .issues
                    .push(ConvertIssue::malformed("statement is not an assignment"));
                String::new()
            };

            variables.push((statement, canonical_name, converted));
        }

        let variables: Vec<ConvertedVariable> = variables
            .into_iter()
            .map(|(statement, canonical_name, converted)| {
                finish_variable(statement, canonical_name, converted, &scheme)
            })
            .collect();
        let answer = answer.map(|text| scheme.substitute(&text));
        let warning = variables.iter().any(|var| var.result.warning);

        let mut conversion = ExerciseConversion {
            uid: input.uid.clone(),
            fingerprint,
            variables,
            scheme: scheme.entries().to_vec(),
            conditions,
            answer,
            comment: String::new(),
            warning,
        };
        conversion.comment = exercise_comment(&conversion);
        conversion
    }

    fn convert_statement(
        &self,
        statement: &Statement,
        normalizer: &MultiplicationNormalizer,
        rewriter: &mut Rewriter,
        delegator: &NativeDelegator<'_>,
    ) -> StatementConversion {
        let body = normalizer.normalize(&statement.raw_expression);
        let body = bracket_numeric_pairs(&body);

        let rewritten = match rewriter.rewrite_statement(&body) {
            Ok(outcome) => outcome,
            Err(issue) => {
                return StatementConversion {
                    target: statement.raw_expression.clone(),
                    status: ConversionStatus::Failed,
                    warning: true,
                    platform_failure: false,
                    issues: vec![issue],
                };
            }
        };
        let native = delegator.delegate(&rewritten.text);

        let unsupported = rewritten
            .issues
            .iter()
            .any(|issue| matches!(issue, ConvertIssue::UnsupportedFunction { .. }));
        let mut issues = rewritten.issues;
        issues.extend(native.issues);
        let fatal = issues.iter().any(ConvertIssue::is_fatal);

        let status = if native.unresolved || unsupported || fatal {
            ConversionStatus::Failed
        } else if rewritten.opaque || native.wrapped {
            ConversionStatus::Fallback
        } else {
            ConversionStatus::Ok
        };
        StatementConversion {
            target: native.text,
            warning: rewritten.warning || native.warning || !issues.is_empty(),
            status,
            platform_failure: native.unresolved,
            issues,
        }
    }
}

pub fn convert_exercise(input: &ExerciseInput, config: &ConvertConfig) -> ExerciseConversion {
    ExerciseConverter::new(config).convert(input)
}

pub fn convert_batch(inputs: &[ExerciseInput], config: &ConvertConfig) -> BatchConversion {
    let converter = ExerciseConverter::new(config);
    let mut summary = BatchSummary::default();
    let exercises = inputs
        .iter()
        .map(|input| {
            let exercise = converter.convert(input);
            summary.add(&exercise);
            exercise
        })
        .collect();
    BatchConversion { exercises, summary }
}

/// 답이 원천 함수를 부르면 답 변수로 옮기고, 답은 그 변수 목록이 된다.
fn prepare_answer(mut algorithm: String, answer: Option<&str>) -> (String, Option<String>) {
    let Some(answer) = answer else {
        return (algorithm, None);
    };
    let answer = patterns::braced_variable()
        .replace_all(answer.trim(), "$$${1}")
        .into_owned();
    if !contains_ta_call(&answer) {
        return (algorithm, Some(answer));
    }

    if !algorithm.trim().is_empty() && !algorithm.trim_end().ends_with(';') {
        algorithm.push(';');
    }
    let parts: Vec<&str> = answer
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    let names: Vec<String> = if parts.len() > 1 {
        (1..=parts.len()).map(|idx| format!("$answer{}", idx)).collect()
    } else {
        vec!["$answer".to_string()]
    };
    for (name, part) in names.iter().zip(parts.iter()) {
        algorithm.push_str(&format!("{}={};", name, part));
    }
    (algorithm, Some(names.join(", ")))
}

/// `(1,2)` → `[1,2]` (함수 인자 괄호는 제외)
fn bracket_numeric_pairs(body: &str) -> String {
    patterns::numeric_pair()
        .replace_all(body, "${1}[${2},${3}]")
        .into_owned()
}

fn finish_variable(
    statement: Statement,
    canonical_name: String,
    converted: StatementConversion,
    scheme: &VariableScheme,
) -> ConvertedVariable {
    let mut target = scheme.substitute(&converted.target);
    if target.ends_with(';') {
        target.pop();
    }
    let original = statement.text();
    let mut comment = match converted.status {
        ConversionStatus::Failed if converted.platform_failure => {
            format!("This maple function could not be converted:\n{}", original)
        }
        ConversionStatus::Failed => format!("Variable conversion failed. Original variable: {}", original),
        _ => format!("Original variable:\n{}", original),
    };
    if converted.warning {
        let codes: Vec<&str> = converted
            .issues
            .iter()
            .map(ConvertIssue::code)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if codes.is_empty() {
            comment.push_str("\nNeeds manual review");
        } else {
            comment.push_str(&format!("\nNeeds manual review: {}", codes.join(", ")));
        }
    }
    ConvertedVariable {
        order: statement.order,
        source_name: statement.name,
        canonical_name,
        original,
        result: ConversionResult {
            target_expression: target,
            status: converted.status,
            warning: converted.warning,
            comment,
            issues: converted.issues,
        },
    }
}

fn exercise_comment(conversion: &ExerciseConversion) -> String {
    let mut comment = format!("Maple uid:\n{}\n", conversion.label());
    if !conversion.conditions.is_empty() {
        comment.push_str("\nConditions:\n");
        for condition in &conversion.conditions {
            comment.push_str(condition);
            comment.push('\n');
        }
    }
    if !conversion.scheme.is_empty() {
        comment.push_str("\nVariable replacement scheme:\n");
        for entry in &conversion.scheme {
            comment.push_str(&format!("{} => ${}\n", entry.source, entry.token));
        }
    }
    let mut failed: Vec<&str> = conversion
        .variables
        .iter()
        .filter(|var| var.result.status == ConversionStatus::Failed && !var.canonical_name.is_empty())
        .map(|var| var.canonical_name.as_str())
        .collect();
    if !failed.is_empty() {
        failed.sort();
        failed.dedup();
        comment.push_str("\nThe following variables could not be converted:\n");
        comment.push_str(&failed.join(", "));
        comment.push('\n');
    }
    comment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(algorithm: &str, answer: Option<&str>) -> ExerciseConversion {
        let input = ExerciseInput {
            uid: Some("q-1".to_string()),
            algorithm: algorithm.to_string(),
            answer: answer.map(str::to_string),
        };
        convert_exercise(&input, &ConvertConfig::default())
    }

    #[test]
    fn answers_with_calls_become_variables() {
        let (algorithm, answer) = prepare_answer("$a=rint(5)".to_string(), Some("sqrt($a)"));
        assert_eq!(algorithm, "$a=rint(5);$answer=sqrt($a);");
        assert_eq!(answer.as_deref(), Some("$answer"));

        let (algorithm, answer) = prepare_answer("$a=1;".to_string(), Some("sqrt($a);abs($a);"));
        assert_eq!(algorithm, "$a=1;$answer1=sqrt($a);$answer2=abs($a);");
        assert_eq!(answer.as_deref(), Some("$answer1, $answer2"));
    }

    #[test]
    fn plain_answers_are_kept() {
        let (algorithm, answer) = prepare_answer("$a=1;".to_string(), Some("${a}+1"));
        assert_eq!(algorithm, "$a=1;");
        assert_eq!(answer.as_deref(), Some("$a+1"));
    }

    #[test]
    fn numeric_pairs_become_lists() {
        assert_eq!(bracket_numeric_pairs("switch($i,(1,2),(-3,4))"), "switch($i,[1,2],[-3,4])");
        assert_eq!(bracket_numeric_pairs("rint(1,2)"), "rint(1,2)");
    }

    #[test]
    fn exercise_end_to_end() {
        let result = exercise("$x=rint(5);$y=$x+1;condition:gt($y,2);", Some("$y"));
        assert_eq!(result.conditions, vec!["condition:gt($y,2);"]);
        assert_eq!(result.variables.len(), 2);
        assert_eq!(result.variables[0].contract().0, "$a");
        assert_eq!(result.variables[0].result.target_expression, "rand(0, 4)");
        assert_eq!(result.variables[1].result.target_expression, "$a + 1");
        assert_eq!(result.answer.as_deref(), Some("$b"));
        assert!(!result.warning);
        assert!(result.comment.starts_with("Maple uid:\nq-1\n"));
        assert!(result.comment.contains("Conditions:\ncondition:gt($y,2);\n"));
        assert!(result.comment.contains("Variable replacement scheme:\n$x => $a\n$y => $b\n"));
        assert_eq!(
            result.variables[0].result.comment,
            "Original variable:\n$x=rint(5)"
        );
    }

    #[test]
    fn malformed_statement_fails_with_original_text() {
        let result = exercise("$a=rint(5;", None);
        let var = &result.variables[0];
        assert_eq!(var.result.status, ConversionStatus::Failed);
        assert_eq!(var.result.target_expression, "rint(5");
        assert!(var.result.comment.starts_with("Variable conversion failed. Original variable: $a=rint(5"));
        assert!(result.comment.contains("The following variables could not be converted:\n$a\n"));
    }

    #[test]
    fn platform_calls_fall_back_to_native() {
        let result = exercise("$a=maple(\"sin(Foo(x))\");", None);
        let var = &result.variables[0];
        assert_eq!(var.result.status, ConversionStatus::Fallback);
        assert_eq!(var.result.target_expression, "sw_maxima_native(\"sin(Foo(x))\")");
        assert!(var.result.warning);
        assert!(var.result.comment.contains("Needs manual review: W_OPAQUE_FALLBACK, W_UNSUPPORTED_FUNCTION"));
    }

    #[test]
    fn restructured_platform_call_explains_its_warning() {
        let result = exercise("$a=maple(\"op(2, [1,2,3])\");", None);
        let var = &result.variables[0];
        assert_eq!(var.result.target_expression, "sw_maxima_native(\"part([1,2,3],2)\")");
        assert!(var.result.warning);
        assert_eq!(
            var.result.comment,
            "Original variable:\n$a=maple(\"op(2, [1,2,3])\")\nNeeds manual review: W_OPAQUE_FALLBACK"
        );
    }

    #[test]
    fn unconvertible_platform_call_is_reported() {
        let result = exercise("$a=maple(\"MathML[ExportPresentation](sin(x))\");", None);
        let var = &result.variables[0];
        assert_eq!(var.result.status, ConversionStatus::Failed);
        assert!(var.result.comment.starts_with("This maple function could not be converted:\n$a="));
    }

    #[test]
    fn redefinition_reuses_the_token() {
        let result = exercise("$a=1;$b=2;$a=$b+1;", None);
        assert_eq!(result.scheme.len(), 2);
        assert_eq!(result.variables[2].canonical_name, "$a");
        assert_eq!(result.variables[2].result.target_expression, "$b + 1");
        assert!(result.variables[2].result.warning);
    }

    #[test]
    fn unknown_uid_uses_fingerprint() {
        let input = ExerciseInput {
            uid: None,
            algorithm: "$a=1;".to_string(),
            answer: None,
        };
        let result = convert_exercise(&input, &ConvertConfig::default());
        assert_eq!(result.fingerprint.len(), 64);
        assert!(result.comment.starts_with(&format!("Maple uid:\nunknown ({})", &result.fingerprint[..12])));
        assert_eq!(fingerprint(&input), result.fingerprint);
    }

    #[test]
    fn batch_summary_counts_statuses() {
        let inputs = vec![
            ExerciseInput {
                uid: Some("1".to_string()),
                algorithm: "$a=rint(5);$b=pi;".to_string(),
                answer: None,
            },
            ExerciseInput {
                uid: Some("2".to_string()),
                algorithm: "$a=rint(5;".to_string(),
                answer: None,
            },
        ];
        let batch = convert_batch(&inputs, &ConvertConfig::default());
        assert_eq!(batch.summary.exercises, 2);
        assert_eq!(batch.summary.variables, 3);
        assert_eq!(batch.summary.ok, 1);
        assert_eq!(batch.summary.fallback, 1);
        assert_eq!(batch.summary.failed, 1);
        assert_eq!(batch.summary.warnings, 2);
    }
}
