// lang/src/ast.rs
// 구조 재작성 단계의 식 트리

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    /// `a..b`
    Range,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => " + ",
            BinaryOp::Sub => " - ",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Range => "..",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Range => 1,
            BinaryOp::Add | BinaryOp::Sub => 2,
            BinaryOp::Mul | BinaryOp::Div => 3,
            BinaryOp::Pow => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(String),
    /// 따옴표 안 내용 (이스케이프 유지)
    Str(String),
    /// `$` 뺀 이름
    Var(String),
    /// 호출 문맥 없는 맨 이름 (pi, true, …)
    Const(String),
    Call { name: String, args: Vec<Expr> },
    List(Vec<Expr>),
    Neg(Box<Expr>),
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    Ternary { cond: Box<Expr>, then: Box<Expr>, other: Box<Expr> },
    /// 네이티브 식으로 감쌀 원문 (이스케이프 전)
    Native(String),
}

pub const UNARY_PRECEDENCE: u8 = 4;
pub const TERNARY_PRECEDENCE: u8 = 0;
pub const ATOM_PRECEDENCE: u8 = 9;

impl Expr {
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call { name: name.into(), args }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Neg(_) => UNARY_PRECEDENCE,
            Expr::Ternary { .. } => TERNARY_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }

    /// 수/문자열/상수와 그 부호 반전만 리터럴로 본다.
    pub fn is_literal(&self) -> bool {
        match self {
            Expr::Number(_) | Expr::Str(_) | Expr::Const(_) => true,
            Expr::Neg(inner) => matches!(inner.as_ref(), Expr::Number(_)),
            _ => false,
        }
    }

    pub fn contains_call(&self) -> bool {
        match self {
            Expr::Call { .. } => true,
            Expr::List(items) => items.iter().any(Expr::contains_call),
            Expr::Neg(inner) => inner.contains_call(),
            Expr::Binary { left, right, .. } => left.contains_call() || right.contains_call(),
            Expr::Ternary { cond, then, other } => {
                cond.contains_call() || then.contains_call() || other.contains_call()
            }
            _ => false,
        }
    }

    pub fn contains_const(&self) -> bool {
        match self {
            Expr::Const(_) => true,
            Expr::Call { args, .. } => args.iter().any(Expr::contains_const),
            Expr::List(items) => items.iter().any(Expr::contains_const),
            Expr::Neg(inner) => inner.contains_const(),
            Expr::Binary { left, right, .. } => left.contains_const() || right.contains_const(),
            Expr::Ternary { cond, then, other } => {
                cond.contains_const() || then.contains_const() || other.contains_const()
            }
            _ => false,
        }
    }

    /// 정수 리터럴이면 그 값
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Expr::Number(text) => text.parse::<i64>().ok(),
            Expr::Neg(inner) => inner.as_integer().and_then(i64::checked_neg),
            _ => None,
        }
    }

    pub fn integer(value: i64) -> Self {
        if value < 0 {
            Expr::Neg(Box::new(Expr::Number(value.unsigned_abs().to_string())))
        } else {
            Expr::Number(value.to_string())
        }
    }
}
