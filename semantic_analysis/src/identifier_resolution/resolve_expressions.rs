use super::ResolverContext;
use crate::IdentifierResolver;
use crate::semantic_error::ErrorType;
use parser::ast::*;
use shared_context::SpannedIdentifier;

/// Whether `kind` denotes something this language lets appear on the
/// left of `=`/`+=`/etc.: a variable, a dereference, or a subscript.
/// Anything else (a constant, a cast, a binary expression, ...) is
/// rejected before type checking ever sees it.
fn is_lvalue_shaped(kind: &ExpressionType) -> bool {
    matches!(
        kind,
        ExpressionType::Var(_) | ExpressionType::Dereference(_) | ExpressionType::Subscript { .. }
    )
}

impl<'src, 'ctx> IdentifierResolver<'src, 'ctx> {
    pub(super) fn resolve_expression(
        &mut self,
        expr: Expression,
        ctx: &mut ResolverContext,
    ) -> Result<Expression, ErrorType> {
        let (kind, result_type, span) = expr.into_parts();

        let resolved_kind = match kind {
            ExpressionType::Constant(c) => ExpressionType::Constant(c),
            ExpressionType::Var(name) => self.resolve_var(name, ctx)?,
            ExpressionType::Cast { target_type, expr } => ExpressionType::Cast {
                target_type,
                expr: Box::new(self.resolve_expression(*expr, ctx)?),
            },
            ExpressionType::Unary { operator, operand } => ExpressionType::Unary {
                operator,
                operand: Box::new(self.resolve_expression(*operand, ctx)?),
            },
            ExpressionType::Binary {
                operator,
                operand1,
                operand2,
            } => ExpressionType::Binary {
                operator,
                operand1: Box::new(self.resolve_expression(*operand1, ctx)?),
                operand2: Box::new(self.resolve_expression(*operand2, ctx)?),
            },
            ExpressionType::Assignment { lvalue, rvalue } => {
                let lvalue = self.resolve_expression(*lvalue, ctx)?;
                if !is_lvalue_shaped(lvalue.get_kind_ref()) {
                    return Err(ErrorType::InvalidLValue { span: lvalue.get_span() });
                }
                ExpressionType::Assignment {
                    lvalue: Box::new(lvalue),
                    rvalue: Box::new(self.resolve_expression(*rvalue, ctx)?),
                }
            }
            ExpressionType::CompoundAssignment {
                operator,
                lvalue,
                rvalue,
            } => {
                let lvalue = self.resolve_expression(*lvalue, ctx)?;
                if !is_lvalue_shaped(lvalue.get_kind_ref()) {
                    return Err(ErrorType::InvalidLValue { span: lvalue.get_span() });
                }
                ExpressionType::CompoundAssignment {
                    operator,
                    lvalue: Box::new(lvalue),
                    rvalue: Box::new(self.resolve_expression(*rvalue, ctx)?),
                }
            }
            ExpressionType::Conditional { cond, cons, alt } => ExpressionType::Conditional {
                cond: Box::new(self.resolve_expression(*cond, ctx)?),
                cons: Box::new(self.resolve_expression(*cons, ctx)?),
                alt: Box::new(self.resolve_expression(*alt, ctx)?),
            },
            ExpressionType::FunctionCall { name, args } => self.resolve_call(name, args, ctx)?,
            ExpressionType::Dereference(inner) => {
                ExpressionType::Dereference(Box::new(self.resolve_expression(*inner, ctx)?))
            }
            ExpressionType::AddrOf(inner) => {
                let inner = self.resolve_expression(*inner, ctx)?;
                if !is_lvalue_shaped(inner.get_kind_ref()) {
                    return Err(ErrorType::InvalidLValue { span: inner.get_span() });
                }
                ExpressionType::AddrOf(Box::new(inner))
            }
            ExpressionType::Subscript { array, index } => ExpressionType::Subscript {
                array: Box::new(self.resolve_expression(*array, ctx)?),
                index: Box::new(self.resolve_expression(*index, ctx)?),
            },
        };

        Ok(Expression::new(resolved_kind, result_type, span))
    }

    pub(crate) fn resolve_optional_expr(
        &mut self,
        optional: Option<Expression>,
        ctx: &mut ResolverContext,
    ) -> Result<Option<Expression>, ErrorType> {
        optional.map(|expr| self.resolve_expression(expr, ctx)).transpose()
    }

    fn resolve_var(
        &mut self,
        name: SpannedIdentifier,
        ctx: &ResolverContext,
    ) -> Result<ExpressionType, ErrorType> {
        let (identifier, span) = name.into_parts();
        match ctx.lookup(identifier.get_symbol()) {
            Some(entry) => Ok(ExpressionType::Var(SpannedIdentifier::new(entry.canonical, span))),
            None => Err(ErrorType::UndeclaredIdentifier { span }),
        }
    }

    fn resolve_call(
        &mut self,
        name: SpannedIdentifier,
        args: Vec<Box<Expression>>,
        ctx: &mut ResolverContext,
    ) -> Result<ExpressionType, ErrorType> {
        let (identifier, span) = name.into_parts();
        let entry = ctx
            .lookup(identifier.get_symbol())
            .ok_or(ErrorType::UndeclaredIdentifier { span })?;

        let mut resolved_args = Vec::with_capacity(args.len());
        for arg in args {
            resolved_args.push(Box::new(self.resolve_expression(*arg, ctx)?));
        }

        Ok(ExpressionType::FunctionCall {
            name: SpannedIdentifier::new(entry.canonical, span),
            args: resolved_args,
        })
    }
}
