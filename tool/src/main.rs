use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "ta2sw")]
#[command(about = "Maple T.A. 알고리즘 → SOWISO 변수 정의 변환 도구")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 연습문제 JSON 배열을 한꺼번에 변환
    Convert {
        file: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long = "diag-jsonl", alias = "diag")]
        diag_jsonl: Option<PathBuf>,
        #[arg(long = "max-exercises")]
        max_exercises: Option<usize>,
        #[arg(long = "native-depth")]
        native_depth: Option<usize>,
        #[arg(long)]
        quiet: bool,
    },
    /// 알고리즘 문자열 하나를 변환해 변수별로 출력
    Expr {
        algorithm: String,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long = "native-depth")]
        native_depth: Option<usize>,
    },
    /// 문장 분리 결과만 출력
    Split { algorithm: String },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Convert {
            file,
            out,
            config,
            diag_jsonl,
            max_exercises,
            native_depth,
            quiet,
        } => {
            let overrides = cli::config::ConfigOverrides {
                native_depth,
                max_exercises,
            };
            cli::config::load(config.as_deref(), overrides).and_then(|config| {
                let args = cli::convert::ConvertArgs {
                    out,
                    diag_jsonl,
                    quiet,
                };
                cli::convert::run(&file, &config, args)
            })
        }
        Commands::Expr {
            algorithm,
            config,
            native_depth,
        } => {
            let overrides = cli::config::ConfigOverrides {
                native_depth,
                max_exercises: None,
            };
            cli::config::load(config.as_deref(), overrides)
                .and_then(|config| cli::expr::run(&algorithm, &config))
        }
        Commands::Split { algorithm } => cli::split::run(&algorithm),
    };
    if let Err(err) = result {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
