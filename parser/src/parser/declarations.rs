use super::Parser;
use crate::ast::*;
use crate::parse_err::ErrorType;
use lexer::Token;
use shared_context::{SpannedIdentifier, Type};

/// The base type plus storage class named by a declaration's leading
/// specifier-and-qualifier run (`static unsigned long`, `extern int`,
/// `void`, ...), before any declarator (`*`, the name, `[N]`) is read.
pub(super) struct Specifiers {
    pub(super) base: Option<Type>,
    pub(super) is_void: bool,
    pub(super) storage_class: StorageClass,
}

impl<'src, 'ctx> Parser<'src, 'ctx> {
    /// Consumes the leading run of type-specifier and storage-class
    /// keywords. Supports the combinations ISO C actually allows
    /// (`int`, `long`, `long int`, `unsigned`, `unsigned int`,
    /// `unsigned long`, `unsigned long int`, `double`, `void`) plus at
    /// most one storage-class keyword, in any order relative to the
    /// type specifiers (as C itself permits).
    pub(super) fn parse_specifiers(&mut self) -> Result<Specifiers, ErrorType> {
        let start = self.current_span();
        let (mut saw_int, mut saw_long, mut saw_unsigned, mut saw_double, mut saw_void) =
            (false, false, false, false, false);
        let mut storage_class = StorageClass::None;

        loop {
            match self.peek() {
                Some(Token::Int) => {
                    saw_int = true;
                    self.advance();
                }
                Some(Token::Long) => {
                    saw_long = true;
                    self.advance();
                }
                Some(Token::Unsigned) => {
                    saw_unsigned = true;
                    self.advance();
                }
                Some(Token::Double) => {
                    saw_double = true;
                    self.advance();
                }
                Some(Token::Void) => {
                    saw_void = true;
                    self.advance();
                }
                Some(Token::Static) => {
                    storage_class = StorageClass::Static;
                    self.advance();
                }
                Some(Token::Extern) => {
                    storage_class = StorageClass::Extern;
                    self.advance();
                }
                _ => break,
            }
        }

        if saw_void {
            if saw_int || saw_long || saw_unsigned || saw_double {
                return Err(ErrorType::InvalidTypeSpecifier(start));
            }
            return Ok(Specifiers {
                base: None,
                is_void: true,
                storage_class,
            });
        }

        let base = match (saw_double, saw_unsigned, saw_long, saw_int) {
            (true, false, false, false) => Type::Double,
            (false, true, true, _) => Type::ULong,
            (false, true, false, _) => Type::UInt,
            (false, false, true, _) => Type::Long,
            (false, false, false, true) => Type::Int,
            _ => return Err(ErrorType::InvalidTypeSpecifier(start)),
        };

        Ok(Specifiers {
            base: Some(base),
            is_void: false,
            storage_class,
        })
    }

    /// Consumes a run of `*` tokens, returning how many were seen.
    pub(super) fn parse_pointer_stars(&mut self) -> usize {
        let mut count = 0;
        while self.peek() == Some(Token::Mul) {
            self.advance();
            count += 1;
        }
        count
    }

    /// Applies `pointer_count` levels of pointer wrapping (innermost,
    /// nearest the base type), matching ISO C's binding of prefix `*`.
    pub(super) fn apply_pointers(&mut self, mut ty: Type, pointer_count: usize) -> Type {
        for _ in 0..pointer_count {
            let id = self.ctx.type_interner.intern_pointer(ty);
            ty = Type::Pointer(id);
        }
        ty
    }

    /// Consumes zero or more `[N]` suffixes and wraps `ty` in nested
    /// arrays, outermost-first in source order (`a[2][3]` is an array
    /// of 2 arrays of 3, matching postfix `[]` binding tighter than `*`
    /// and left-to-right nesting for multi-dimensional declarators).
    fn apply_array_suffixes(&mut self, ty: Type) -> Result<Type, ErrorType> {
        let mut dims = Vec::new();
        while self.peek() == Some(Token::LeftBracket) {
            self.advance();
            let span = self.current_span();
            let size = match self.peek() {
                Some(Token::ConstantInt) => {
                    let text = self.tokens[self.pos].text;
                    self.advance();
                    text.parse::<u64>()
                        .map_err(|_| ErrorType::InvalidDeclarator(span))?
                }
                _ => return Err(ErrorType::InvalidDeclarator(span)),
            };
            self.expect(Token::RightBracket, "']'")?;
            dims.push(size);
        }

        let mut result = ty;
        for size in dims.into_iter().rev() {
            let id = self.ctx.type_interner.intern_array(size, result);
            result = Type::Array(id);
        }
        Ok(result)
    }

    /// Parses one comma-separated parameter list between an already
    /// consumed `(` and a trailing `)`. `(void)` denotes zero
    /// parameters; `()` is rejected (K&R-style empty parameter lists
    /// are not supported).
    fn parse_param_list(&mut self) -> Result<Vec<(Type, SpannedIdentifier)>, ErrorType> {
        if self.peek() == Some(Token::Void) && self.peek_nth(1) == Some(Token::RightParenthesis) {
            self.advance();
            return Ok(Vec::new());
        }

        let mut params = Vec::new();
        loop {
            let specifiers = self.parse_specifiers()?;
            let base = specifiers
                .base
                .ok_or_else(|| ErrorType::InvalidDeclarator(self.current_span()))?;
            let pointer_count = self.parse_pointer_stars();
            let ty = self.apply_pointers(base, pointer_count);
            let name = self.expect_identifier()?;
            params.push((ty, name));

            if self.peek() == Some(Token::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(params)
    }

    /// Parses one file-scope declaration: a function declaration or
    /// definition, or a variable declaration.
    pub(super) fn parse_file_scope_declaration(&mut self) -> Result<Declaration, ErrorType> {
        self.parse_declaration()
    }

    /// Parses one declaration, dispatching to a function or variable
    /// declarator once the specifiers and the name are known. Shared
    /// between file scope and block scope: storage-class legality
    /// (e.g. no block-scope function definitions) is enforced later,
    /// by identifier resolution, not by the grammar.
    pub(super) fn parse_declaration(&mut self) -> Result<Declaration, ErrorType> {
        let start = self.current_span();
        let specifiers = self.parse_specifiers()?;
        let base = specifiers
            .base
            .unwrap_or(Type::Int); // `void` is only meaningful as a function return type
        let pointer_count = self.parse_pointer_stars();
        let ty = self.apply_pointers(base, pointer_count);
        let name = self.expect_identifier()?;

        if self.peek() == Some(Token::LeftParenthesis) {
            self.advance();
            let params = self.parse_param_list()?;
            self.expect(Token::RightParenthesis, "')'")?;

            let param_types: Vec<Type> = params.iter().map(|(t, _)| *t).collect();
            let ret_type = if specifiers.is_void { Type::Int } else { ty };
            let type_id = self.ctx.type_interner.intern_function(ret_type, &param_types);
            let param_names: Vec<SpannedIdentifier> = params.into_iter().map(|(_, n)| n).collect();

            let body = if self.peek() == Some(Token::LeftCurlyBracket) {
                Some(self.parse_block()?)
            } else {
                self.expect(Token::Semicolon, "';'")?;
                None
            };
            let span = start.merge(&self.previous_span());

            Ok(Declaration::FunDecl(FunctionDecl::new(
                name,
                type_id,
                param_names,
                body,
                specifiers.storage_class,
                span,
            )))
        } else {
            let ty = self.apply_array_suffixes(ty)?;
            let init = if self.peek() == Some(Token::Assignment) {
                self.advance();
                Some(self.parse_expression(0)?)
            } else {
                None
            };
            self.expect(Token::Semicolon, "';'")?;
            let span = start.merge(&self.previous_span());

            Ok(Declaration::VarDecl(VariableDecl::new(
                name,
                ty,
                init,
                specifiers.storage_class,
                span,
            )))
        }
    }

    /// Parses a `for`-loop initializer declaration: the same variable
    /// declarator grammar as a statement, but without the trailing
    /// semicolon consumed here (the caller, `parse_for_init`, owns it).
    pub(super) fn parse_variable_declaration(&mut self) -> Result<VariableDecl, ErrorType> {
        let start = self.current_span();
        let specifiers = self.parse_specifiers()?;
        let base = specifiers
            .base
            .ok_or_else(|| ErrorType::InvalidDeclarator(start))?;
        let pointer_count = self.parse_pointer_stars();
        let ty = self.apply_pointers(base, pointer_count);
        let name = self.expect_identifier()?;
        let ty = self.apply_array_suffixes(ty)?;

        let init = if self.peek() == Some(Token::Assignment) {
            self.advance();
            Some(self.parse_expression(0)?)
        } else {
            None
        };
        let span = start.merge(&self.previous_span());

        Ok(VariableDecl::new(name, ty, init, specifiers.storage_class, span))
    }

    /// Returns true if the upcoming tokens begin a declaration rather
    /// than a statement, i.e. a type-specifier or storage-class
    /// keyword.
    pub(super) fn at_declaration_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Int
                    | Token::Long
                    | Token::Unsigned
                    | Token::Double
                    | Token::Void
                    | Token::Static
                    | Token::Extern
            )
        )
    }
}
