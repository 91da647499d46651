use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;

mod files;
mod stages;

use files::get_file_name;

#[derive(Parser)]
struct Cli {
    /// Stop after lexing and print the token stream.
    #[arg(long, group = "stage")]
    lex: bool,

    /// Stop after parsing and print the AST.
    #[arg(long, group = "stage")]
    parse: bool,

    /// Run lexing, parsing and semantic analysis, then print the symbol table.
    #[arg(long, group = "stage")]
    validate: bool,

    file_path: std::path::PathBuf,
}

fn main() -> ExitCode {
    let arg = Cli::parse();
    let file_path = arg.file_path.to_string_lossy().into_owned();
    let file_name = get_file_name(&file_path);

    let result = if arg.lex {
        stages::lexer_stage(&file_path)
    } else if arg.parse {
        stages::parser_stage(&file_path, file_name)
    } else {
        // no flag given: --validate is the whole pipeline this compiler runs.
        stages::validate_stage(&file_path, file_name)
    };

    if let Err(err) = result {
        eprintln!("{} {err}", "error:".red().bold());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
