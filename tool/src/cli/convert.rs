use std::fs;
use std::path::{Path, PathBuf};

use ta2sw_lang::{convert_batch, ConvertConfig, ExerciseInput};

use crate::cli::diag::{issue_lines, jsonl_lines, summary_line, write_jsonl};

pub struct ConvertArgs {
    pub out: Option<PathBuf>,
    pub diag_jsonl: Option<PathBuf>,
    pub quiet: bool,
}

pub fn run(path: &Path, config: &ConvertConfig, args: ConvertArgs) -> Result<(), String> {
    let source = fs::read_to_string(path).map_err(|e| format!("E_CLI_READ {}", e))?;
    let inputs = parse_inputs(&source)?;
    check_batch_size(inputs.len(), config.max_exercises)?;

    let batch = convert_batch(&inputs, config);

    let mut jsonl = Vec::new();
    for exercise in &batch.exercises {
        if !args.quiet {
            for line in issue_lines(exercise) {
                eprintln!("{}", line);
            }
        }
        if args.diag_jsonl.is_some() {
            jsonl.extend(jsonl_lines(exercise));
        }
    }
    if let Some(diag_path) = args.diag_jsonl.as_ref() {
        write_jsonl(diag_path, &jsonl)?;
    }

    let text = serde_json::to_string_pretty(&batch).map_err(|e| format!("E_CLI_JSON {}", e))?;
    match args.out.as_ref() {
        Some(out_path) => {
            if let Some(parent) = out_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| format!("E_CLI_WRITE {}", e))?;
                }
            }
            fs::write(out_path, format!("{}\n", text)).map_err(|e| format!("E_CLI_WRITE {}", e))?;
        }
        None => println!("{}", text),
    }
    eprintln!("{}", summary_line(&batch.summary));
    Ok(())
}

fn parse_inputs(source: &str) -> Result<Vec<ExerciseInput>, String> {
    serde_json::from_str(source).map_err(|e| format!("E_CONVERT_INPUT 연습문제 JSON 배열이 아님: {}", e))
}

/// 한도를 넘으면 몇 묶음으로 나눠야 하는지 알려 준다.
fn check_batch_size(count: usize, max: usize) -> Result<(), String> {
    if count <= max {
        return Ok(());
    }
    let chunks = count.div_ceil(max);
    Err(format!(
        "E_BATCH_TOO_LARGE {} exercises exceed the limit of {}; split into {} chunks",
        count, max, chunks
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_limit_reports_chunks() {
        assert!(check_batch_size(100, 100).is_ok());
        let err = check_batch_size(250, 100).expect_err("too large");
        assert_eq!(err, "E_BATCH_TOO_LARGE 250 exercises exceed the limit of 100; split into 3 chunks");
    }

    #[test]
    fn inputs_accept_missing_fields() {
        let inputs = parse_inputs(r#"[{"algorithm": "$a=1;"}, {"uid": "9", "algorithm": "", "answer": "$a"}]"#)
            .expect("inputs");
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].uid, None);
        assert_eq!(inputs[1].answer.as_deref(), Some("$a"));
        let err = parse_inputs("{}").expect_err("object");
        assert!(err.starts_with("E_CONVERT_INPUT"));
    }
}
