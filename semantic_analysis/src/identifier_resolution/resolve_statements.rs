use super::ResolverContext;
use crate::IdentifierResolver;
use crate::semantic_error::ErrorType;
use parser::ast::*;
use shared_context::SpannedIdentifier;

impl<'src, 'ctx> IdentifierResolver<'src, 'ctx> {
    pub(crate) fn resolve_statement(
        &mut self,
        stmt: Statement,
        ctx: &mut ResolverContext,
    ) -> Result<Statement, ErrorType> {
        let (kind, span) = stmt.into_parts();

        let resolved_kind = match kind {
            StatementType::Return(expr) => StatementType::Return(self.resolve_expression(expr, ctx)?),
            StatementType::ExprStatement(expr) => {
                StatementType::ExprStatement(self.resolve_expression(expr, ctx)?)
            }
            StatementType::Null => StatementType::Null,
            StatementType::Compound(block) => StatementType::Compound(self.resolve_block(block, ctx)?),
            // Loop labeling (which loop a `break`/`continue` targets) is
            // the next pass's job; identifier resolution just leaves
            // these untouched.
            StatementType::Break(label) => StatementType::Break(label),
            StatementType::Continue(label) => StatementType::Continue(label),
            StatementType::IfStatement {
                condition,
                if_clause,
                else_clause,
            } => {
                let condition = self.resolve_expression(condition, ctx)?;
                let if_clause = Box::new(self.resolve_statement(*if_clause, ctx)?);
                let else_clause = match else_clause {
                    Some(clause) => Some(Box::new(self.resolve_statement(*clause, ctx)?)),
                    None => None,
                };
                StatementType::IfStatement {
                    condition,
                    if_clause,
                    else_clause,
                }
            }
            StatementType::While {
                condition,
                body,
                label,
            } => StatementType::While {
                condition: self.resolve_expression(condition, ctx)?,
                body: Box::new(self.resolve_statement(*body, ctx)?),
                label,
            },
            StatementType::DoWhile {
                condition,
                body,
                label,
            } => StatementType::DoWhile {
                condition: self.resolve_expression(condition, ctx)?,
                body: Box::new(self.resolve_statement(*body, ctx)?),
                label,
            },
            StatementType::For {
                init,
                condition,
                post,
                body,
                label,
            } => {
                ctx.push_scope();
                let init = self.resolve_for_init(init, ctx)?;
                let condition = self.resolve_optional_expr(condition, ctx)?;
                let post = self.resolve_optional_expr(post, ctx)?;
                let body = Box::new(self.resolve_statement(*body, ctx)?);
                ctx.pop_scope();
                StatementType::For {
                    init,
                    condition,
                    post,
                    body,
                    label,
                }
            }
            StatementType::Goto(name) => {
                let (identifier, name_span) = name.into_parts();
                let canonical = self.label_identifier(identifier.get_symbol());
                self.goto_refs.push((identifier.get_symbol(), span));
                StatementType::Goto(SpannedIdentifier::new(canonical, name_span))
            }
            StatementType::Label(name, body) => {
                let (identifier, name_span) = name.into_parts();
                let symbol = identifier.get_symbol();
                if let Some(&first) = self.label_declared.get(&symbol) {
                    return Err(ErrorType::DuplicateLabel {
                        first,
                        second: name_span,
                    });
                }
                let canonical = self.label_identifier(symbol);
                self.label_declared.insert(symbol, name_span);
                let body = Box::new(self.resolve_statement(*body, ctx)?);
                StatementType::Label(SpannedIdentifier::new(canonical, name_span), body)
            }
        };

        Ok(Statement::new(resolved_kind, span))
    }

    /// `for`-init declarations cannot carry a storage class: `for
    /// (static int i = 0; ...)` is rejected here before it ever reaches
    /// the usual variable-declaration resolution.
    fn resolve_for_init(
        &mut self,
        init: ForInit,
        ctx: &mut ResolverContext,
    ) -> Result<ForInit, ErrorType> {
        match init {
            ForInit::D(decl) => {
                let (name, var_type, expr, storage_class, span) = decl.into_parts();
                if storage_class != StorageClass::None {
                    return Err(ErrorType::IllegalStorageClass { span });
                }
                let decl = VariableDecl::new(name, var_type, expr, storage_class, span);
                Ok(ForInit::D(self.resolve_local_variable_declaration(decl, ctx)?))
            }
            ForInit::E(optional_expr) => {
                Ok(ForInit::E(self.resolve_optional_expr(optional_expr, ctx)?))
            }
        }
    }
}
