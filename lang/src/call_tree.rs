// lang/src/call_tree.rs
// 중첩 호출 문자열 → 호출 트리 → 1:1 이름 치환/특수형 재구성 → 문자열
//
// 이 단계의 입력은 네이티브 조각 안쪽 원천 식이다. 문자열 리터럴은 없다고 본다.
use crate::dialect::MappingTable;
use crate::error::ConvertIssue;
use crate::patterns;

/// 인자 하나 = 조각들의 나열 (`f(x)+1` → [Call f, Leaf "+1"])
pub type Fragment = Vec<ExpressionNode>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionNode {
    Leaf(String),
    /// 이름이 빈 호출은 묶음 괄호
    Call { name: String, args: Vec<Fragment> },
}

impl ExpressionNode {
    pub fn leaf(text: impl Into<String>) -> Self {
        ExpressionNode::Leaf(text.into())
    }

    pub fn render(&self) -> String {
        match self {
            ExpressionNode::Leaf(text) => text.clone(),
            ExpressionNode::Call { name, args } => {
                let rendered: Vec<String> = args
                    .iter()
                    .map(|arg| render_fragment(arg))
                    .filter(|arg| !arg.is_empty())
                    .collect();
                format!("{}({})", name, rendered.join(","))
            }
        }
    }
}

pub fn render_fragment(nodes: &[ExpressionNode]) -> String {
    nodes.iter().map(ExpressionNode::render).collect()
}

fn contains_call(nodes: &[ExpressionNode]) -> bool {
    nodes
        .iter()
        .any(|node| matches!(node, ExpressionNode::Call { name, .. } if !name.is_empty()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallTreeOutcome {
    pub text: String,
    pub warning: bool,
    pub issues: Vec<ConvertIssue>,
}

/// 괄호 깊이로 짝을 맞추는 커서 파서
struct Cursor<'a> {
    chars: &'a [char],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(chars: &'a [char]) -> Self {
        Self { chars, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// `in_args`이면 바깥 깊이의 `,`/`)` 앞에서 멈춘다.
    fn parse_fragment(&mut self, in_args: bool) -> Result<Fragment, ConvertIssue> {
        let mut nodes = Vec::new();
        let mut leaf = String::new();
        let mut bracket_depth = 0usize;

        while let Some(ch) = self.peek() {
            match ch {
                '(' => {
                    let name = take_trailing_name(&mut leaf);
                    if !leaf.is_empty() {
                        nodes.push(ExpressionNode::Leaf(std::mem::take(&mut leaf)));
                    }
                    let open_at = self.pos;
                    self.pos += 1;
                    let args = self.parse_args(open_at)?;
                    nodes.push(ExpressionNode::Call { name, args });
                    continue;
                }
                ')' if in_args && bracket_depth == 0 => break,
                ',' if in_args && bracket_depth == 0 => break,
                '[' | '{' => bracket_depth += 1,
                ']' | '}' => bracket_depth = bracket_depth.saturating_sub(1),
                _ => {}
            }
            leaf.push(ch);
            self.pos += 1;
        }
        if !leaf.is_empty() {
            nodes.push(ExpressionNode::Leaf(leaf));
        }
        Ok(nodes)
    }

    fn parse_args(&mut self, open_at: usize) -> Result<Vec<Fragment>, ConvertIssue> {
        let mut args = Vec::new();
        loop {
            let fragment = self.parse_fragment(true)?;
            args.push(trim_fragment(fragment));
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') => {
                    self.pos += 1;
                    return Ok(args);
                }
                _ => {
                    return Err(ConvertIssue::malformed(format!(
                        "unclosed '(' at {}",
                        open_at
                    )))
                }
            }
        }
    }
}

/// 잎 끝의 식별자를 떼어 호출 이름으로 쓴다. 숫자로 시작하면 묶음 괄호.
fn take_trailing_name(leaf: &mut String) -> String {
    let split_at = leaf
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(leaf.len());
    let name = leaf[split_at..].to_string();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return String::new();
    }
    leaf.truncate(split_at);
    name
}

fn trim_fragment(mut nodes: Fragment) -> Fragment {
    if let Some(ExpressionNode::Leaf(text)) = nodes.first_mut() {
        *text = text.trim_start().to_string();
    }
    if let Some(ExpressionNode::Leaf(text)) = nodes.last_mut() {
        *text = text.trim_end().to_string();
    }
    nodes.retain(|node| !matches!(node, ExpressionNode::Leaf(text) if text.is_empty()));
    nodes
}

pub fn parse_call_tree(text: &str) -> Result<Fragment, ConvertIssue> {
    let chars: Vec<char> = text.chars().collect();
    let mut cursor = Cursor::new(&chars);
    let nodes = cursor.parse_fragment(false)?;
    Ok(trim_fragment(nodes))
}

/// 호출 트리 변환기. 특수형을 먼저 보고, 그 다음 1:1 표를 본다.
pub struct CallTreeBuilder<'a> {
    table: &'a MappingTable,
    issues: Vec<ConvertIssue>,
}

impl<'a> CallTreeBuilder<'a> {
    pub fn new(table: &'a MappingTable) -> Self {
        Self { table, issues: Vec::new() }
    }

    pub fn convert(mut self, text: &str) -> CallTreeOutcome {
        if !text.contains('(') {
            return CallTreeOutcome { text: text.to_string(), warning: false, issues: Vec::new() };
        }
        let nodes = match parse_call_tree(text) {
            Ok(nodes) => nodes,
            Err(issue) => {
                return CallTreeOutcome { text: text.to_string(), warning: true, issues: vec![issue] };
            }
        };
        let converted = self.convert_fragment(nodes);
        CallTreeOutcome {
            text: render_fragment(&converted),
            warning: !self.issues.is_empty(),
            issues: self.issues,
        }
    }

    fn convert_fragment(&mut self, nodes: Fragment) -> Fragment {
        nodes
            .into_iter()
            .map(|node| match node {
                ExpressionNode::Call { name, args } => self.convert_call(name, args),
                leaf => leaf,
            })
            .collect()
    }

    fn convert_call(&mut self, name: String, args: Vec<Fragment>) -> ExpressionNode {
        let args: Vec<Fragment> = args.into_iter().map(|arg| self.convert_fragment(arg)).collect();
        if name.is_empty() {
            return ExpressionNode::Call { name, args };
        }
        match name.as_str() {
            "int" | "Int" => self.integral(name, args),
            "seq" => self.sequence(name, args),
            "op" => self.element(name, args),
            "convert" => self.coercion(name, args),
            "evalb" => self.tagged(name, args, "pred"),
            "evalf" => self.tagged(name, args, "float"),
            "sort" => self.sorted(name, args),
            _ => match self.table.target(&name) {
                Some(target) => ExpressionNode::Call { name: target.to_string(), args },
                None => {
                    self.issues.push(ConvertIssue::unsupported(&name));
                    ExpressionNode::Call { name, args }
                }
            },
        }
    }

    fn integral(&mut self, name: String, mut args: Vec<Fragment>) -> ExpressionNode {
        if args.len() != 2 {
            return self.ambiguous(name, args, "expects integrand and variable or range");
        }
        if name == "Int" {
            self.issues.push(ConvertIssue::ambiguity(&name, "inert integral is evaluated"));
        }
        let binding = render_fragment(&args[1]);
        if let Some((var, lower, upper)) = split_range_binding(&binding) {
            args.truncate(1);
            args.push(vec![ExpressionNode::leaf(var)]);
            args.push(vec![ExpressionNode::leaf(lower)]);
            args.push(vec![ExpressionNode::leaf(upper)]);
        }
        ExpressionNode::Call { name: "integrate".to_string(), args }
    }

    fn sequence(&mut self, name: String, mut args: Vec<Fragment>) -> ExpressionNode {
        match args.len() {
            1 => {
                let range = render_fragment(&args[0]);
                let Some((lower, upper)) = range.split_once("..") else {
                    return self.ambiguous(name, args, "single argument must be a range");
                };
                let args = ["x", "x", lower.trim(), upper.trim()]
                    .iter()
                    .map(|text| vec![ExpressionNode::leaf(*text)])
                    .collect();
                ExpressionNode::Call { name: "makelist".to_string(), args }
            }
            2 => {
                let binding = render_fragment(&args[1]);
                let Some((var, lower, upper)) = split_range_binding(&binding) else {
                    return self.ambiguous(name, args, "second argument must be var=a..b");
                };
                args.truncate(1);
                args.push(vec![ExpressionNode::leaf(var)]);
                args.push(vec![ExpressionNode::leaf(lower)]);
                args.push(vec![ExpressionNode::leaf(upper)]);
                ExpressionNode::Call { name: "makelist".to_string(), args }
            }
            _ => self.ambiguous(name, args, "expects one or two arguments"),
        }
    }

    fn element(&mut self, name: String, mut args: Vec<Fragment>) -> ExpressionNode {
        match args.len() {
            1 => ExpressionNode::Call { name: "part".to_string(), args },
            2 => {
                let index = &args[0];
                if contains_call(index) || render_fragment(index).starts_with('[') {
                    return self.ambiguous(name, args, "list of positions is not supported");
                }
                args.reverse();
                ExpressionNode::Call { name: "part".to_string(), args }
            }
            _ => self.ambiguous(name, args, "expects one or two arguments"),
        }
    }

    fn coercion(&mut self, name: String, mut args: Vec<Fragment>) -> ExpressionNode {
        if args.len() == 2 && render_fragment(&args[1]) == "string" {
            args.truncate(1);
            return ExpressionNode::Call { name: "string".to_string(), args };
        }
        self.ambiguous(name, args, "only conversion to string is supported")
    }

    fn tagged(&mut self, name: String, mut args: Vec<Fragment>, tag: &str) -> ExpressionNode {
        if args.len() != 1 {
            return self.ambiguous(name, args, "expects one argument");
        }
        args.push(vec![ExpressionNode::leaf(tag)]);
        ExpressionNode::Call { name: "ev".to_string(), args }
    }

    fn sorted(&mut self, name: String, mut args: Vec<Fragment>) -> ExpressionNode {
        match args.len() {
            1 => ExpressionNode::Call { name, args },
            2 => {
                let comparator = match render_fragment(&args[1]).as_str() {
                    "ascending" => "orderlessp",
                    "descending" => "ordergreatp",
                    _ => return self.ambiguous(name, args, "only ascending/descending order is supported"),
                };
                args[1] = vec![ExpressionNode::leaf(comparator)];
                ExpressionNode::Call { name, args }
            }
            _ => self.ambiguous(name, args, "variable and comparator lists are not supported"),
        }
    }

    fn ambiguous(&mut self, name: String, args: Vec<Fragment>, detail: &str) -> ExpressionNode {
        self.issues.push(ConvertIssue::ambiguity(&name, detail));
        ExpressionNode::Call { name, args }
    }
}

/// `var=lower..upper` → (var, lower, upper)
fn split_range_binding(text: &str) -> Option<(String, String, String)> {
    let caps = patterns::range_binding().captures(text)?;
    Some((
        caps[1].trim().to_string(),
        caps[2].trim().to_string(),
        caps[3].trim().to_string(),
    ))
}

/// 편리 함수: 내장 표로 변환
pub fn convert_call_tree(text: &str, table: &MappingTable) -> CallTreeOutcome {
    CallTreeBuilder::new(table).convert(text)
}
