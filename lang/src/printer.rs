// lang/src/printer.rs
// 식 트리 → 대상 문법 문자열
use crate::ast::{BinaryOp, Expr, UNARY_PRECEDENCE};
use crate::term_map::NATIVE_WRAPPER;

pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::new();
    printer.write_expr(expr);
    printer.output
}

/// 네이티브 래퍼의 문자열 인자 규칙: `\`와 `"`만 이스케이프한다.
pub fn escape_native(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for ch in text.chars() {
        if ch == '\\' || ch == '"' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

pub fn native_call(text: &str) -> String {
    format!("{}(\"{}\")", NATIVE_WRAPPER, escape_native(text))
}

struct Printer {
    output: String,
}

impl Printer {
    fn new() -> Self {
        Self { output: String::new() }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Number(text) | Expr::Const(text) => self.write(text),
            Expr::Str(body) => {
                self.write("\"");
                self.write(body);
                self.write("\"");
            }
            Expr::Var(name) => {
                self.write("$");
                self.write(name);
            }
            Expr::Call { name, args } => {
                self.write(name);
                self.write("(");
                self.write_list(args);
                self.write(")");
            }
            Expr::List(items) => {
                self.write("[");
                self.write_list(items);
                self.write("]");
            }
            Expr::Neg(inner) => {
                self.write("-");
                self.write_operand(inner, inner.precedence() < UNARY_PRECEDENCE);
            }
            Expr::Binary { op, left, right } => {
                let prec = op.precedence();
                let left_parens = if *op == BinaryOp::Pow {
                    left.precedence() <= prec
                } else {
                    left.precedence() < prec
                };
                let right_parens = if *op == BinaryOp::Pow {
                    right.precedence() < prec
                } else {
                    right.precedence() <= prec
                };
                self.write_operand(left, left_parens);
                self.write(op.symbol());
                self.write_operand(right, right_parens);
            }
            Expr::Ternary { cond, then, other } => {
                self.write_branch(cond);
                self.write(" ? ");
                self.write_branch(then);
                self.write(" : ");
                self.write_branch(other);
            }
            Expr::Native(text) => self.write(&native_call(text)),
        }
    }

    fn write_list(&mut self, items: &[Expr]) {
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                self.write(", ");
            }
            self.write_expr(item);
        }
    }

    fn write_operand(&mut self, expr: &Expr, parens: bool) {
        if parens {
            self.write("(");
            self.write_expr(expr);
            self.write(")");
        } else {
            self.write_expr(expr);
        }
    }

    fn write_branch(&mut self, expr: &Expr) {
        let nested = matches!(expr, Expr::Ternary { .. });
        self.write_operand(expr, nested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;

    fn reprint(source: &str) -> String {
        print_expr(&parse_expression(source).expect("parse"))
    }

    #[test]
    fn parentheses_follow_precedence() {
        assert_eq!(reprint("(1+2)*3"), "(1 + 2)*3");
        assert_eq!(reprint("1-(2-3)"), "1 - (2 - 3)");
        assert_eq!(reprint("(1-2)-3"), "1 - 2 - 3");
        assert_eq!(reprint("(2^3)^2"), "(2^3)^2");
        assert_eq!(reprint("-(1+$a)"), "-(1 + $a)");
    }

    #[test]
    fn calls_lists_and_strings() {
        assert_eq!(reprint("f($a,[1,2],\"x\")"), "f($a, [1, 2], \"x\")");
    }

    #[test]
    fn ternary_nesting_is_parenthesized() {
        let inner = Expr::Ternary {
            cond: Box::new(Expr::Var("b".into())),
            then: Box::new(Expr::Number("1".into())),
            other: Box::new(Expr::Number("2".into())),
        };
        let outer = Expr::Ternary {
            cond: Box::new(Expr::Var("a".into())),
            then: Box::new(inner),
            other: Box::new(Expr::Number("3".into())),
        };
        assert_eq!(print_expr(&outer), "$a ? ($b ? 1 : 2) : 3");
    }

    #[test]
    fn native_text_is_escaped() {
        assert_eq!(
            print_expr(&Expr::Native("f(\"a\")".into())),
            "sw_maxima_native(\"f(\\\"a\\\")\")"
        );
    }
}
