// celeval - a restricted CEL expression evaluator
//
// This is the core library for celeval, an evaluator for a small
// side-effect-free dialect of the Common Expression Language: comparisons,
// addition and subtraction, list and map literals, indexing, membership
// tests, and identifier lookup against a caller-supplied context.

// Public modules
pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{ArithOp, CompareOp, Expr};
pub use error::{CelError, ErrorKind, Span};
pub use evaluator::{Context, Evaluator};
pub use lexer::{Lexer, Token, TokenType, RESERVED_IDENTIFIERS};
pub use parser::Parser;
pub use value::Value;

/// Run the full lex -> parse -> evaluate pipeline over a source string.
///
/// The context is optional; the undefined-identifier message distinguishes
/// "no context passed" from "context searched but key absent".
pub fn evaluate(source: &str, context: Option<&Context>) -> Result<Value, CelError> {
    let mut lexer = Lexer::new(source.to_string());
    let tokens = lexer.scan_tokens()?;

    let mut parser = Parser::new(tokens);
    let expr = parser.parse()?;

    Evaluator::new(context).evaluate(&expr)
}

/// Identical capability to [`evaluate`], exposed under both names for API
/// ergonomics.
pub fn parse(source: &str, context: Option<&Context>) -> Result<Value, CelError> {
    evaluate(source, context)
}

/// The fixed reserved-identifier set, exported for introspection.
pub fn reserved_identifiers() -> &'static [&'static str] {
    RESERVED_IDENTIFIERS
}
