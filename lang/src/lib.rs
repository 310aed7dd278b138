// lang/src/lib.rs
// Maple T.A. 알고리즘 → SOWISO 변수 정의 변환기 코어
//
// 단계:
// - Splitter: `;` 문장 분리
// - Normalizer: 암묵적 곱 드러내기
// - Parser/Rewriter/Printer: 원천 함수 → 대상 함수
// - Native: `maple("…")` 조각 위임
// - Scheme: 변수 이름 정본화

pub mod ast;
pub mod call_tree;
pub mod config;
pub mod dialect;
pub mod error;
pub mod lexer;
pub mod native;
pub mod normalizer;
pub mod parser;
pub mod patterns;
pub mod pipeline;
pub mod printer;
pub mod rewriter;
pub mod scheme;
pub mod splitter;
pub mod term_map;

pub use ast::{BinaryOp, Expr};
pub use call_tree::{convert_call_tree, parse_call_tree, CallTreeBuilder, CallTreeOutcome, ExpressionNode};
pub use config::{ConvertConfig, NATIVE_DEPTH_ENV};
pub use dialect::MappingTable;
pub use error::{ConfigError, ConvertIssue};
pub use lexer::{LexError, Lexer, Token, TokenKind};
pub use native::{NativeDelegator, NativeOutcome};
pub use normalizer::MultiplicationNormalizer;
pub use parser::{parse_expression, ParseError, Parser};
pub use pipeline::{
    convert_batch, convert_exercise, BatchConversion, BatchSummary, ConversionResult, ConversionStatus,
    ConvertedVariable, ExerciseConversion, ExerciseConverter, ExerciseInput,
};
pub use printer::print_expr;
pub use rewriter::{RewriteOutcome, Rewriter};
pub use scheme::{SchemeEntry, VariableScheme};
pub use splitter::{extract_conditions, split_statements, Statement};

/// 편리 함수: 알고리즘 문자열 하나 → 변환 결과 (uid/답 없음)
pub fn convert_algorithm(algorithm: &str, config: &ConvertConfig) -> ExerciseConversion {
    let input = ExerciseInput {
        uid: None,
        algorithm: algorithm.to_string(),
        answer: None,
    };
    convert_exercise(&input, config)
}
