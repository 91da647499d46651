use core::fmt;
use lexer::Token;
use shared_context::{Span, source_map::SourceMap};

#[derive(Debug)]
pub enum ErrorType {
    UnexpectedToken {
        expected: &'static str,
        found: Token,
        span: Span,
    },
    UnexpectedEof {
        expected: &'static str,
    },
    InvalidTypeSpecifier(Span),
    InvalidDeclarator(Span),
    LexFailure {
        lexeme: String,
        span: Span,
    },
}

/// A fully-formatted parse error, ready for display.
///
/// Mirrors `semantic_analysis::semantic_error::SemanticErr`: the
/// variant-specific formatting happens once, at construction time,
/// using `SourceMap::format_message` for the caret-pointing source
/// excerpt, and `Display` just prints the cached string.
#[derive(Debug)]
pub struct ParseErr {
    formatted: String,
}

impl ParseErr {
    pub fn new(err: ErrorType, source_map: &SourceMap) -> Self {
        let formatted = match err {
            ErrorType::UnexpectedToken {
                expected,
                found,
                span,
            } => source_map.format_message(
                format!("expected {expected}, found '{found}'"),
                span,
            ),
            ErrorType::UnexpectedEof { expected } => {
                format!("unexpected end of input, expected {expected}")
            }
            ErrorType::InvalidTypeSpecifier(span) => {
                source_map.format_message("invalid combination of type specifiers".to_string(), span)
            }
            ErrorType::InvalidDeclarator(span) => {
                source_map.format_message("invalid declarator".to_string(), span)
            }
            ErrorType::LexFailure { lexeme, span } => {
                source_map.format_message(format!("invalid token '{lexeme}'"), span)
            }
        };

        Self { formatted }
    }
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted)
    }
}

impl std::error::Error for ParseErr {}
