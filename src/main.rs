mod ast;
mod error;
mod evaluator;
mod lexer;
mod parser;
mod repl;
mod runner;
mod value;

use clap::{Arg, Command};
use evaluator::Context;
use std::fs;
use std::path::Path;
use value::Value;

fn main() {
    let matches = Command::new("celeval")
        .about("An evaluator for a restricted CEL expression dialect")
        .arg(
            Arg::new("expression")
                .help("The expression to evaluate")
                .value_name("EXPR")
                .index(1),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .help("Evaluate the contents of a file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("context")
                .short('c')
                .long("context")
                .help("Evaluation context as a CEL map literal, e.g. '{\"a\": 1}'")
                .value_name("MAP"),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive mode")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let context = matches
        .get_one::<String>("context")
        .map(|source| parse_context(source));

    if let Some(file_path) = matches.get_one::<String>("file") {
        run_file(file_path, context.as_ref());
    } else if let Some(expression) = matches.get_one::<String>("expression") {
        runner::run(expression, None, context.as_ref());
    } else {
        repl::start(context.as_ref());
    }
}

/// The context argument is itself a CEL map literal, evaluated with no
/// context of its own.
fn parse_context(source: &str) -> Context {
    match celeval_pipeline(source) {
        Ok(Value::Map(map)) => Context::from(map),
        Ok(other) => {
            eprintln!(
                "Error: context must be a map literal, got {}",
                other.type_name()
            );
            std::process::exit(1);
        }
        Err(error) => {
            error.report(source, Some("<context>"));
            std::process::exit(1);
        }
    }
}

fn celeval_pipeline(source: &str) -> Result<Value, error::CelError> {
    let mut lexer = lexer::Lexer::new(source.to_string());
    let tokens = lexer.scan_tokens()?;
    let mut parser = parser::Parser::new(tokens);
    let expr = parser.parse()?;
    evaluator::Evaluator::new(None).evaluate(&expr)
}

fn run_file(path: &str, context: Option<&Context>) {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        std::process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => {
            runner::run(source.trim(), Some(path.to_str().unwrap()), context);
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
