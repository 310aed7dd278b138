use ta2sw_lang::{convert_algorithm, ConversionStatus, ConvertConfig, ConvertedVariable};

pub fn run(algorithm: &str, config: &ConvertConfig) -> Result<(), String> {
    if algorithm.trim().is_empty() {
        return Err("E_CLI_EMPTY 변환할 알고리즘이 비어 있음".to_string());
    }
    let exercise = convert_algorithm(algorithm, config);
    for var in &exercise.variables {
        println!("{}", render_variable(var));
    }
    Ok(())
}

fn status_name(status: ConversionStatus) -> &'static str {
    match status {
        ConversionStatus::Ok => "ok",
        ConversionStatus::Fallback => "fallback",
        ConversionStatus::Failed => "failed",
    }
}

fn render_variable(var: &ConvertedVariable) -> String {
    let (name, definition, _, comment) = var.contract();
    let name = if name.is_empty() { "?" } else { name };
    let mut out = format!("{} = {}  [{}]", name, definition, status_name(var.result.status));
    for line in comment.lines() {
        out.push_str("\n    ");
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_line_with_comments() {
        let exercise = convert_algorithm("$n=rint(5);", &ConvertConfig::default());
        let text = render_variable(&exercise.variables[0]);
        assert_eq!(text, "$a = rand(0, 4)  [ok]\n    Original variable:\n    $n=rint(5)");
    }

    #[test]
    fn empty_algorithm_is_rejected() {
        let err = run("  ", &ConvertConfig::default()).expect_err("empty");
        assert!(err.starts_with("E_CLI_EMPTY"));
    }
}
