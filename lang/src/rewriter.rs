// lang/src/rewriter.rs
// 문장 단위 구조 재작성: 원천 함수 → 대상 함수
//
// 방문 순서: 들어갈 때(네이티브 탈출) → 자식 → 나올 때(규칙 적용).
// 들어갈 때 바뀐 하위 트리는 더 내려가지 않는다.
use crate::ast::{BinaryOp, Expr};
use crate::error::ConvertIssue;
use crate::parser::parse_expression;
use crate::printer::print_expr;
use crate::term_map::{find_rule, is_passthrough, trig_affix_target, RewriteRule};

#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOutcome {
    pub text: String,
    /// 사람이 다시 봐야 하는지
    pub warning: bool,
    /// 네이티브 래퍼를 하나라도 만들었는지
    pub opaque: bool,
    pub issues: Vec<ConvertIssue>,
}

#[derive(Debug, Default)]
pub struct Rewriter {
    call_depth: usize,
    opaque: bool,
    issues: Vec<ConvertIssue>,
}

impl Rewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 문장 본문 하나를 파싱해 재작성한다. 파싱 실패는 `MalformedInput`.
    pub fn rewrite_statement(&mut self, body: &str) -> Result<RewriteOutcome, ConvertIssue> {
        let expr = parse_expression(body).map_err(|e| ConvertIssue::malformed(e.to_string()))?;
        let rewritten = self.rewrite(expr);
        let issues = std::mem::take(&mut self.issues);
        Ok(RewriteOutcome {
            text: print_expr(&rewritten),
            warning: !issues.is_empty(),
            opaque: self.opaque,
            issues,
        })
    }

    /// 트리 하나를 재작성한다. 상태는 매번 새로 시작한다.
    pub fn rewrite(&mut self, expr: Expr) -> Expr {
        self.call_depth = 0;
        self.opaque = false;
        self.issues.clear();
        self.visit(expr)
    }

    fn visit(&mut self, expr: Expr) -> Expr {
        if let Some(replaced) = self.enter(&expr) {
            return replaced;
        }
        let expr = match expr {
            Expr::Call { name, args } => {
                self.call_depth += 1;
                let args = args.into_iter().map(|arg| self.visit(arg)).collect();
                self.call_depth -= 1;
                Expr::Call { name, args }
            }
            Expr::List(items) => Expr::List(items.into_iter().map(|item| self.visit(item)).collect()),
            Expr::Neg(inner) => Expr::Neg(Box::new(self.visit(*inner))),
            Expr::Binary { op, left, right } => {
                let left = self.visit(*left);
                let right = self.visit(*right);
                Expr::binary(op, left, right)
            }
            Expr::Ternary { cond, then, other } => Expr::Ternary {
                cond: Box::new(self.visit(*cond)),
                then: Box::new(self.visit(*then)),
                other: Box::new(self.visit(*other)),
            },
            other => other,
        };
        self.leave(expr)
    }

    fn enter(&mut self, expr: &Expr) -> Option<Expr> {
        match expr {
            Expr::Call { name, args } if name == "sum" && args.len() == 4 => {
                let text = format!(
                    "sum(({}), {}, {}, {})",
                    print_expr(&args[3]),
                    print_expr(&args[0]),
                    print_expr(&args[1]),
                    print_expr(&args[2])
                );
                Some(self.wrap_native(text))
            }
            Expr::Call { name, args }
                if find_rule(name) == Some(RewriteRule::NativeIfLiteral)
                    && !args.is_empty()
                    && args.iter().all(Expr::is_literal) =>
            {
                Some(self.wrap_native(print_expr(expr)))
            }
            Expr::Binary { .. } if expr.contains_const() && !expr.contains_call() => {
                Some(self.wrap_native(print_expr(expr)))
            }
            _ => None,
        }
    }

    fn leave(&mut self, expr: Expr) -> Expr {
        match expr {
            Expr::Call { name, args } => self.rewrite_call(name, args),
            Expr::Binary { op: BinaryOp::Pow, left, right } => Expr::call("pow", vec![*left, *right]),
            Expr::Const(name) => {
                if self.call_depth > 0 {
                    Expr::Str(name)
                } else {
                    self.wrap_native(name)
                }
            }
            other => other,
        }
    }

    fn rewrite_call(&mut self, name: String, mut args: Vec<Expr>) -> Expr {
        let Some(rule) = find_rule(&name) else {
            if !is_passthrough(&name) {
                self.issues.push(ConvertIssue::unsupported(&name));
            }
            return Expr::Call { name, args };
        };
        match rule {
            RewriteRule::Rename(target) => Expr::call(target, args),
            RewriteRule::RenameReversed(target) => {
                args.reverse();
                Expr::call(target, args)
            }
            RewriteRule::Ternary => {
                if args.len() != 3 {
                    return self.ambiguous(name, args, "expects condition, then and else");
                }
                let other = args.pop();
                let then = args.pop();
                let cond = args.pop();
                match (cond, then, other) {
                    (Some(cond), Some(then), Some(other)) => Expr::Ternary {
                        cond: Box::new(cond),
                        then: Box::new(then),
                        other: Box::new(other),
                    },
                    _ => Expr::Call { name, args },
                }
            }
            RewriteRule::IndexedList { target, zero_base } => {
                if args.len() < 2 {
                    return self.ambiguous(name, args, "expects an index and at least one value");
                }
                let rest = args.split_off(1);
                let index = args.remove(0);
                let index = if zero_base { decrement(index) } else { index };
                Expr::call(target, vec![Expr::List(rest), index])
            }
            RewriteRule::RandomInt => match args.len() {
                1 => {
                    let upper = args.remove(0);
                    Expr::call("rand", vec![Expr::integer(0), decrement(upper)])
                }
                2 | 3 => {
                    let upper = args.remove(1);
                    args.insert(1, decrement(upper));
                    let target = if args.len() == 3 { "sw_rand_steps" } else { "rand" };
                    Expr::call(target, args)
                }
                _ => self.ambiguous(name, args, "expects one to three arguments"),
            },
            RewriteRule::InclusiveRange => match args.len() {
                1 => {
                    args.insert(0, Expr::integer(0));
                    Expr::call("rand", args)
                }
                2 => Expr::call("rand", args),
                3 => Expr::call("sw_rand_steps", args),
                _ => self.ambiguous(name, args, "expects one to three arguments"),
            },
            RewriteRule::Aggregate(target) => Expr::call(target, vec![Expr::List(args)]),
            RewriteRule::NativeIfLiteral => {
                self.ambiguous(name, args, "only literal arguments can be kept as native expression")
            }
            RewriteRule::Fraction => {
                if args.len() != 2 {
                    return self.ambiguous(name, args, "expects numerator and denominator");
                }
                let denominator = args.remove(1);
                let numerator = args.remove(0);
                Expr::binary(BinaryOp::Div, numerator, denominator)
            }
            RewriteRule::TrigAffix => match trig_affix_target(&name) {
                Some(target) => Expr::Call { name: target, args },
                None => Expr::Call { name, args },
            },
            RewriteRule::Logarithm { base10 } => {
                if base10 {
                    args.push(Expr::integer(10));
                }
                Expr::call("log", args)
            }
        }
    }

    fn ambiguous(&mut self, name: String, args: Vec<Expr>, detail: &str) -> Expr {
        self.issues.push(ConvertIssue::ambiguity(&name, format!("{} (got {})", detail, args.len())));
        Expr::Call { name, args }
    }

    fn wrap_native(&mut self, text: String) -> Expr {
        self.opaque = true;
        self.issues.push(ConvertIssue::opaque(&text));
        Expr::Native(text)
    }
}

/// 정수 리터럴은 그 자리에서 1 줄이고, 그 밖의 식(넘침 포함)은 `- 1`을 붙인다.
fn decrement(expr: Expr) -> Expr {
    match expr.as_integer().and_then(|value| value.checked_sub(1)) {
        Some(value) => Expr::integer(value),
        None => Expr::binary(BinaryOp::Sub, expr, Expr::integer(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(body: &str) -> RewriteOutcome {
        Rewriter::new().rewrite_statement(body).expect("rewrite")
    }

    fn text(body: &str) -> String {
        rewrite(body).text
    }

    #[test]
    fn random_integer_bounds() {
        assert_eq!(text("rint(5)"), "rand(0, 4)");
        assert_eq!(text("rint(2,10)"), "rand(2, 9)");
        assert_eq!(text("rint(1,10,2)"), "sw_rand_steps(1, 9, 2)");
        assert_eq!(text("rint($n)"), "rand(0, $n - 1)");
        assert_eq!(text("rint(-3,0)"), "rand(-3, -1)");
    }

    #[test]
    fn decrement_at_integer_limits_does_not_overflow() {
        assert_eq!(text("rint(1,-9223372036854775807)"), "rand(1, -9223372036854775808)");
        assert_eq!(text("rint(1,-9223372036854775808)"), "rand(1, -9223372036854775808 - 1)");
    }

    #[test]
    fn inclusive_range_and_float_random() {
        assert_eq!(text("range(5)"), "rand(0, 5)");
        assert_eq!(text("range(1,10,3)"), "sw_rand_steps(1, 10, 3)");
        assert_eq!(text("rand(1,2)"), "sw_rand_float(1, 2)");
    }

    #[test]
    fn comparisons_and_conditionals() {
        assert_eq!(text("if(gt($a,1),$a,2)"), "sw_gt($a, 1) ? $a : 2");
        assert_eq!(text("not(eq($a,$b))"), "sw_not(sw_eq($a, $b))");
    }

    #[test]
    fn reversed_arguments() {
        assert_eq!(text("decimal(2,$a)"), "round($a, 2)");
        assert_eq!(text("sig(3,$a)"), "sw_round_sig($a, 3)");
    }

    #[test]
    fn indexed_lists() {
        assert_eq!(text("switch(2,$a,$b,$c)"), "sw_alist([$a, $b, $c], 1)");
        assert_eq!(text("switch($i,1,2)"), "sw_alist([1, 2], $i - 1)");
        assert_eq!(text("indexof($x,1,2)"), "sw_ilist([1, 2], $x)");
        let outcome = rewrite("switch(1)");
        assert!(outcome.warning);
        assert_eq!(outcome.issues[0].code(), "W_STRUCTURAL_AMBIGUITY");
    }

    #[test]
    fn aggregates_collect_one_list() {
        assert_eq!(text("max(1,$a,3)"), "sw_max([1, $a, 3])");
        assert_eq!(text("strcat(\"a\",$b)"), "sw_concat([\"a\", $b])");
    }

    #[test]
    fn literal_special_functions_go_native() {
        let outcome = rewrite("binomial(5,2)");
        assert_eq!(outcome.text, "sw_maxima_native(\"binomial(5, 2)\")");
        assert!(outcome.opaque);
        assert!(outcome.warning);
        let outcome = rewrite("csc($a)");
        assert_eq!(outcome.text, "csc($a)");
        assert_eq!(outcome.issues[0].code(), "W_STRUCTURAL_AMBIGUITY");
    }

    #[test]
    fn fraction_trig_and_log() {
        assert_eq!(text("frac(1,$a)"), "1/$a");
        assert_eq!(text("arcsin($a)"), "asin($a)");
        assert_eq!(text("hypcos($a)"), "cosh($a)");
        assert_eq!(text("archyptan($a)"), "atanh($a)");
        assert_eq!(text("ln($a)"), "log($a)");
        assert_eq!(text("log($a)"), "log($a, 10)");
    }

    #[test]
    fn power_becomes_call() {
        assert_eq!(text("$a^2"), "pow($a, 2)");
        assert_eq!(text("($a+1)^(2*$b)"), "pow($a + 1, 2*$b)");
    }

    #[test]
    fn constants_inside_calls_are_strings() {
        let outcome = rewrite("sqrt(pi)");
        assert_eq!(outcome.text, "sqrt(\"pi\")");
        assert!(!outcome.opaque);
    }

    #[test]
    fn bare_constants_and_constant_arithmetic_go_native() {
        let outcome = rewrite("pi");
        assert_eq!(outcome.text, "sw_maxima_native(\"pi\")");
        assert!(outcome.opaque);
        let outcome = rewrite("2*pi^2");
        assert_eq!(outcome.text, "sw_maxima_native(\"2*pi^2\")");
        assert_eq!(outcome.issues.len(), 1);
    }

    #[test]
    fn constant_next_to_call_is_not_wrapped_whole() {
        assert_eq!(text("2*sqrt(pi)"), "2*sqrt(\"pi\")");
    }

    #[test]
    fn four_argument_sum_is_native_at_entry() {
        let outcome = rewrite("sum(i,1,$n,i^2)");
        assert_eq!(outcome.text, "sw_maxima_native(\"sum((i^2), i, 1, $n)\")");
        assert!(outcome.opaque);
    }

    #[test]
    fn unknown_functions_are_kept_and_reported() {
        let outcome = rewrite("plotmaple($a)");
        assert_eq!(outcome.text, "plotmaple($a)");
        assert_eq!(outcome.issues, vec![ConvertIssue::unsupported("plotmaple")]);
        let outcome = rewrite("maple(\"x\")");
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn parse_failure_is_malformed() {
        let err = Rewriter::new().rewrite_statement("rint(5").expect_err("malformed");
        assert_eq!(err.code(), "E_MALFORMED_INPUT");
    }

    #[test]
    fn state_resets_between_statements() {
        let mut rewriter = Rewriter::new();
        let first = rewriter.rewrite_statement("pi").expect("rewrite");
        assert!(first.opaque);
        let second = rewriter.rewrite_statement("rint(3)").expect("rewrite");
        assert!(!second.opaque);
        assert!(second.issues.is_empty());
    }
}
