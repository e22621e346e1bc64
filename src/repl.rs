use crate::evaluator::{Context, Evaluator};
use crate::lexer::Lexer;
use crate::parser::Parser;
use std::io::{self, Write};

/// Interactive loop: each line is an independent expression evaluated
/// against the same optional context.

pub fn start(context: Option<&Context>) {
    println!("celeval v0.1.0");
    println!("Type 'exit' or press Ctrl+C to quit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    println!("Goodbye!");
                    break;
                }

                run_repl_command(line, context);
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn run_repl_command(source: &str, context: Option<&Context>) {
    // Lexical analysis
    let mut lexer = Lexer::new(source.to_string());
    let tokens = match lexer.scan_tokens() {
        Ok(tokens) => tokens,
        Err(error) => {
            error.report(source, None);
            return;
        }
    };

    // Parsing
    let mut parser = Parser::new(tokens);
    let expr = match parser.parse() {
        Ok(expr) => expr,
        Err(error) => {
            error.report(source, None);
            return;
        }
    };

    // Evaluation
    match Evaluator::new(context).evaluate(&expr) {
        Ok(value) => println!("{}", value),
        Err(error) => error.report(source, None),
    }
}
