use super::{ResolverContext, ScopeEntry};
use crate::IdentifierResolver;
use crate::semantic_error::ErrorType;
use parser::ast::{Block, Declaration, FunctionDecl, StorageClass, VariableDecl};
use shared_context::SpannedIdentifier;

impl<'src, 'ctx> IdentifierResolver<'src, 'ctx> {
    pub(super) fn resolve_global_declaration(
        &mut self,
        decl: Declaration,
        ctx: &mut ResolverContext,
    ) -> Result<Declaration, ErrorType> {
        match decl {
            Declaration::FunDecl(fun_decl) => {
                Ok(Declaration::FunDecl(self.resolve_function_declaration(fun_decl, ctx)?))
            }
            Declaration::VarDecl(var_decl) => {
                Ok(Declaration::VarDecl(self.resolve_file_scope_variable(var_decl, ctx)?))
            }
        }
    }

    /// Resolves a declaration appearing inside a block.
    ///
    /// Function definitions cannot appear here (C forbids nested
    /// functions); a block-scoped function prototype cannot be
    /// `static` (internal linkage only applies at file scope).
    pub(super) fn resolve_local_declaration(
        &mut self,
        decl: Declaration,
        ctx: &mut ResolverContext,
    ) -> Result<Declaration, ErrorType> {
        match decl {
            Declaration::FunDecl(fun_decl) => {
                if fun_decl.has_body() {
                    return Err(ErrorType::BlockScopedFunctionDefinition {
                        span: fun_decl.get_span(),
                    });
                }
                if fun_decl.get_storage_class() == StorageClass::Static {
                    return Err(ErrorType::BlockScopedStaticFunction {
                        span: fun_decl.get_span(),
                    });
                }
                Ok(Declaration::FunDecl(self.resolve_function_declaration(fun_decl, ctx)?))
            }
            Declaration::VarDecl(var_decl) => {
                Ok(Declaration::VarDecl(self.resolve_local_variable_declaration(var_decl, ctx)?))
            }
        }
    }

    /// A file-scope object always has linkage (external unless marked
    /// `static`, which this pass does not distinguish — the
    /// type-checker resolves internal vs. external linkage from the
    /// storage class once it populates the symbol table).
    fn resolve_file_scope_variable(
        &mut self,
        var_decl: VariableDecl,
        ctx: &mut ResolverContext,
    ) -> Result<VariableDecl, ErrorType> {
        let (name, var_type, mut init, storage_class, span) = var_decl.into_parts();
        let (identifier, name_span) = name.into_parts();
        let symbol = identifier.get_symbol();

        let canonical = self.linked_identifier(symbol);
        ctx.insert(
            symbol,
            ScopeEntry {
                canonical,
                span: name_span,
                has_linkage: true,
            },
        );

        if let Some(expr) = init {
            init = Some(self.resolve_expression(expr, ctx)?);
        }

        Ok(VariableDecl::new(
            SpannedIdentifier::new(canonical, name_span),
            var_type,
            init,
            storage_class,
            span,
        ))
    }

    /// Resolves a block-scoped variable declaration.
    ///
    /// `extern` declarations always resolve to whatever canonical
    /// identifier linkage has already settled on this name (minting
    /// one the first time it's seen); every other declaration is a
    /// plain automatic (or block-scoped `static`) object and gets a
    /// fresh identifier, rejecting a second declaration of the same
    /// name in the same scope.
    pub(super) fn resolve_local_variable_declaration(
        &mut self,
        var_decl: VariableDecl,
        ctx: &mut ResolverContext,
    ) -> Result<VariableDecl, ErrorType> {
        let (name, var_type, mut init, storage_class, span) = var_decl.into_parts();
        let (identifier, name_span) = name.into_parts();
        let symbol = identifier.get_symbol();

        let resolved_name = if storage_class == StorageClass::Extern {
            if let Some(prev) = ctx.lookup_current(symbol) {
                if !prev.has_linkage {
                    return Err(ErrorType::ConflictingLinkage {
                        first: prev.span,
                        second: name_span,
                    });
                }
            }
            let canonical = self.linked_identifier(symbol);
            ctx.insert(
                symbol,
                ScopeEntry {
                    canonical,
                    span: name_span,
                    has_linkage: true,
                },
            );
            SpannedIdentifier::new(canonical, name_span)
        } else {
            if let Some(prev) = ctx.lookup_current(symbol) {
                return Err(ErrorType::Redeclaration {
                    first: prev.span,
                    second: name_span,
                });
            }
            let canonical = self.name_gen.fresh(symbol);
            ctx.insert(
                symbol,
                ScopeEntry {
                    canonical,
                    span: name_span,
                    has_linkage: false,
                },
            );
            SpannedIdentifier::new(canonical, name_span)
        };

        if let Some(expr) = init {
            init = Some(self.resolve_expression(expr, ctx)?);
        }

        Ok(VariableDecl::new(resolved_name, var_type, init, storage_class, span))
    }

    /// Resolves a function declaration or definition, file-scope or
    /// block-scope. A name already bound in the current scope without
    /// linkage conflicts; one bound with linkage can be redeclared
    /// freely here (the type checker validates signature and linkage
    /// consistency once the symbol table is populated).
    fn resolve_function_declaration(
        &mut self,
        function: FunctionDecl,
        ctx: &mut ResolverContext,
    ) -> Result<FunctionDecl, ErrorType> {
        let (name, type_id, params, body, storage_class, span) = function.into_parts();
        let (identifier, name_span) = name.into_parts();
        let symbol = identifier.get_symbol();

        if let Some(prev) = ctx.lookup_current(symbol) {
            if !prev.has_linkage {
                return Err(ErrorType::Redeclaration {
                    first: prev.span,
                    second: name_span,
                });
            }
        }

        let canonical = self.linked_identifier(symbol);
        ctx.insert(
            symbol,
            ScopeEntry {
                canonical,
                span: name_span,
                has_linkage: true,
            },
        );

        ctx.push_scope(); // parameters + top-level function body share one scope
        let resolved_params = self.resolve_params(params, ctx)?;

        let resolved_body = if let Some(block) = body {
            let prev_canonical = std::mem::take(&mut self.label_canonical);
            let prev_declared = std::mem::take(&mut self.label_declared);
            let prev_refs = std::mem::take(&mut self.goto_refs);

            let result = self
                .resolve_function_body(block, ctx)
                .and_then(|resolved| {
                    self.validate_gotos()?;
                    Ok(resolved)
                });

            self.label_canonical = prev_canonical;
            self.label_declared = prev_declared;
            self.goto_refs = prev_refs;
            Some(result?)
        } else {
            None
        };

        ctx.pop_scope();

        Ok(FunctionDecl::new(
            SpannedIdentifier::new(canonical, name_span),
            type_id,
            resolved_params,
            resolved_body,
            storage_class,
            span,
        ))
    }

    fn resolve_params(
        &mut self,
        params: Vec<SpannedIdentifier>,
        ctx: &mut ResolverContext,
    ) -> Result<Vec<SpannedIdentifier>, ErrorType> {
        let mut resolved = Vec::with_capacity(params.len());
        for param in params {
            let (identifier, span) = param.into_parts();
            let symbol = identifier.get_symbol();
            if let Some(prev) = ctx.lookup_current(symbol) {
                return Err(ErrorType::Redeclaration {
                    first: prev.span,
                    second: span,
                });
            }
            let canonical = self.name_gen.fresh(symbol);
            ctx.insert(
                symbol,
                ScopeEntry {
                    canonical,
                    span,
                    has_linkage: false,
                },
            );
            resolved.push(SpannedIdentifier::new(canonical, span));
        }
        Ok(resolved)
    }

    fn resolve_function_body(
        &mut self,
        block: Block,
        ctx: &mut ResolverContext,
    ) -> Result<Block, ErrorType> {
        let (items, span) = block.into_parts();
        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            resolved.push(self.resolve_block_item(item, ctx)?);
        }
        Ok(Block::new(resolved, span))
    }
}
