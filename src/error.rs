use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

/// One variant per failure mode of the lex -> parse -> evaluate pipeline.
/// Every error is terminal; nothing is retried or recovered internally.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    UnrecognizedCharacter,
    SyntaxError,
    ReservedIdentifierUsed,
    UndefinedIdentifier,
    KeyNotFound,
    IndexTypeMismatch,
    IndexOutOfRange,
    TypeMismatch,
}

#[derive(Debug, Clone)]
pub struct CelError {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
    pub help: Option<String>,
}

impl CelError {
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: None,
        }
    }

    pub fn new_with_help(kind: ErrorKind, span: Span, message: String, help: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: Some(help),
        }
    }

    pub fn unrecognized_character(span: Span, message: String) -> Self {
        Self::new(ErrorKind::UnrecognizedCharacter, span, message)
    }

    pub fn syntax_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::SyntaxError, span, message)
    }

    pub fn syntax_error_with_help(span: Span, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::SyntaxError, span, message, help)
    }

    pub fn reserved_identifier(span: Span) -> Self {
        Self::new(
            ErrorKind::ReservedIdentifierUsed,
            span,
            "Detected reserved identifier. This is not allowed".to_string(),
        )
    }

    pub fn undefined_identifier(span: Span, message: String) -> Self {
        Self::new(ErrorKind::UndefinedIdentifier, span, message)
    }

    pub fn key_not_found(span: Span, key: &str) -> Self {
        Self::new(
            ErrorKind::KeyNotFound,
            span,
            format!("Key \"{}\" not found in map", key),
        )
    }

    pub fn index_type_mismatch(span: Span, message: String) -> Self {
        Self::new(ErrorKind::IndexTypeMismatch, span, message)
    }

    pub fn index_out_of_range(span: Span, index: i64, length: usize) -> Self {
        Self::new(
            ErrorKind::IndexOutOfRange,
            span,
            format!(
                "List index {} out of range for list of length {}",
                index, length
            ),
        )
    }

    pub fn type_mismatch(span: Span, message: String) -> Self {
        Self::new(ErrorKind::TypeMismatch, span, message)
    }

    pub fn type_mismatch_with_help(span: Span, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::TypeMismatch, span, message, help)
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<expr>");

        let color = match self.kind {
            ErrorKind::UnrecognizedCharacter => Color::Red,
            ErrorKind::SyntaxError => Color::Yellow,
            _ => Color::Magenta,
        };

        let kind_str = match self.kind {
            ErrorKind::UnrecognizedCharacter => "Lexical Error",
            ErrorKind::SyntaxError => "Syntax Error",
            ErrorKind::ReservedIdentifierUsed => "Reserved Identifier",
            ErrorKind::UndefinedIdentifier => "Undefined Identifier",
            ErrorKind::KeyNotFound => "Key Not Found",
            ErrorKind::IndexTypeMismatch => "Index Type Mismatch",
            ErrorKind::IndexOutOfRange => "Index Out Of Range",
            ErrorKind::TypeMismatch => "Type Mismatch",
        };

        let mut report_builder = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(format!("{}: {}", kind_str.fg(color), self.message))
            .with_label(
                Label::new((filename, self.span.start..self.span.end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        report_builder
            .finish()
            .print((filename, Source::from(source)))
            .unwrap();
    }
}

impl fmt::Display for CelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CelError {}
