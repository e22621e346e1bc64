use crate::evaluator::{Context, Evaluator};
use crate::lexer::Lexer;
use crate::parser::Parser;

/// One-shot pipeline driver for the CLI: evaluate a source string and print
/// the resulting value, reporting any error as a source-annotated diagnostic.

pub fn run(source: &str, filename: Option<&str>, context: Option<&Context>) {
    // Lexical analysis
    let mut lexer = Lexer::new(source.to_string());
    let tokens = match lexer.scan_tokens() {
        Ok(tokens) => tokens,
        Err(error) => {
            error.report(source, filename);
            return;
        }
    };

    // Parsing
    let mut parser = Parser::new(tokens);
    let expr = match parser.parse() {
        Ok(expr) => expr,
        Err(error) => {
            error.report(source, filename);
            return;
        }
    };

    // Evaluation
    match Evaluator::new(context).evaluate(&expr) {
        Ok(value) => println!("{}", value),
        Err(error) => error.report(source, filename),
    }
}
