use core::fmt;
use shared_context::{Span, source_map::SourceMap};

/// The closed family of conditions this crate rejects a program for.
///
/// Several related-but-distinct C-level mistakes are folded into the
/// nearest matching variant here (carrying a `detail` string with the
/// specific wording) rather than growing the enum without bound: a
/// dereference of a non-pointer and a subscript of a non-pointer are
/// both `NonArithmeticOperand`-shaped "wrong kind of operand" errors,
/// for instance.
#[derive(Debug)]
pub enum ErrorType {
    UndeclaredIdentifier { span: Span },
    Redeclaration { first: Span, second: Span },
    DuplicateLabel { first: Span, second: Span },
    UnresolvedGoto { span: Span },
    InvalidLValue { span: Span },
    OrphanBreakContinue { what: &'static str, span: Span },
    IllegalStorageClass { span: Span },
    BlockScopedFunctionDefinition { span: Span },
    BlockScopedStaticFunction { span: Span },
    ConflictingTypes { first: Span, second: Span },
    RedefinedFunction { first: Span, second: Span },
    ConflictingLinkage { first: Span, second: Span },
    ConflictingInitializers { first: Span, second: Span },
    NonConstantStaticInit { span: Span },
    InitializerOnExtern { span: Span },
    NotCallable { span: Span },
    ArityMismatch { expected: usize, found: usize, span: Span },
    ArgTypeMismatch { span: Span },
    IncompatibleCast { span: Span },
    NonScalarCondition { span: Span },
    NonArithmeticOperand { detail: &'static str, span: Span },
    /// An internal assertion failure: a bug in this crate, never a
    /// user-facing diagnosis of the input program. Kept out of the
    /// taxonomy above on purpose so a reviewer can see at a glance
    /// which variants are reachable from a mere malformed program.
    Internal(&'static str),
}

/// A fully-formatted semantic error, ready for display.
///
/// Mirrors `parser::parse_err::ParseErr`: formatting happens once, at
/// construction time, using `SourceMap::format_message` for the
/// caret-pointing source excerpt, and `Display` just prints the cached
/// string.
#[derive(Debug)]
pub struct SemanticErr {
    formatted: String,
}

impl SemanticErr {
    pub fn new(err: ErrorType, source_map: &SourceMap) -> Self {
        let formatted = match err {
            ErrorType::UndeclaredIdentifier { span } => {
                source_map.format_message("use of undeclared identifier".to_string(), span)
            }
            ErrorType::Redeclaration { first, second } => format!(
                "{}{}",
                source_map.format_message("conflicting declaration".to_string(), second),
                source_map.format_message("previous declaration is here".to_string(), first),
            ),
            ErrorType::DuplicateLabel { first, second } => format!(
                "{}{}",
                source_map.format_message("duplicate label".to_string(), second),
                source_map.format_message("previously defined here".to_string(), first),
            ),
            ErrorType::UnresolvedGoto { span } => {
                source_map.format_message("goto to undeclared label".to_string(), span)
            }
            ErrorType::InvalidLValue { span } => {
                source_map.format_message("expression is not assignable".to_string(), span)
            }
            ErrorType::OrphanBreakContinue { what, span } => source_map
                .format_message(format!("'{what}' statement not within a loop"), span),
            ErrorType::IllegalStorageClass { span } => source_map.format_message(
                "storage class specifier is not allowed here".to_string(),
                span,
            ),
            ErrorType::BlockScopedFunctionDefinition { span } => source_map.format_message(
                "a function definition is not allowed inside a block".to_string(),
                span,
            ),
            ErrorType::BlockScopedStaticFunction { span } => source_map.format_message(
                "block-scoped function declarations cannot be static".to_string(),
                span,
            ),
            ErrorType::ConflictingTypes { first, second } => format!(
                "{}{}",
                source_map.format_message(
                    "conflicting types for this declaration".to_string(),
                    second
                ),
                source_map.format_message("previous declaration is here".to_string(), first),
            ),
            ErrorType::RedefinedFunction { first, second } => format!(
                "{}{}",
                source_map.format_message("redefinition of function".to_string(), second),
                source_map.format_message("previously defined here".to_string(), first),
            ),
            ErrorType::ConflictingLinkage { first, second } => format!(
                "{}{}",
                source_map
                    .format_message("this declaration's linkage conflicts".to_string(), second),
                source_map.format_message("previous declaration is here".to_string(), first),
            ),
            ErrorType::ConflictingInitializers { first, second } => format!(
                "{}{}",
                source_map.format_message("conflicting initializers".to_string(), second),
                source_map.format_message("previously initialized here".to_string(), first),
            ),
            ErrorType::NonConstantStaticInit { span } => source_map.format_message(
                "initializer of a static-duration object must be a constant".to_string(),
                span,
            ),
            ErrorType::InitializerOnExtern { span } => source_map.format_message(
                "'extern' declaration cannot have an initializer".to_string(),
                span,
            ),
            ErrorType::NotCallable { span } => {
                source_map.format_message("called object is not a function".to_string(), span)
            }
            ErrorType::ArityMismatch {
                expected,
                found,
                span,
            } => source_map.format_message(
                format!("function expects {expected} argument(s), found {found}"),
                span,
            ),
            ErrorType::ArgTypeMismatch { span } => source_map
                .format_message("argument type does not match parameter".to_string(), span),
            ErrorType::IncompatibleCast { span } => {
                source_map.format_message("invalid cast between these types".to_string(), span)
            }
            ErrorType::NonScalarCondition { span } => source_map.format_message(
                "condition must have arithmetic or pointer type".to_string(),
                span,
            ),
            ErrorType::NonArithmeticOperand { detail, span } => {
                source_map.format_message(detail.to_string(), span)
            }
            ErrorType::Internal(detail) => {
                format!("internal compiler error: {detail}")
            }
        };

        Self { formatted }
    }
}

impl fmt::Display for SemanticErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted)
    }
}

impl std::error::Error for SemanticErr {}
