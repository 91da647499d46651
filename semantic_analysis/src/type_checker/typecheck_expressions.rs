use crate::{TypeChecker, semantic_error::ErrorType};
use parser::ast::*;
use shared_context::{
    Span, SpannedIdentifier, Type,
    symbol_table::EntryType,
    type_interner::TypeNode,
};

impl<'src, 'ctx> TypeChecker<'src, 'ctx> {
    /// Array-to-pointer decay, materialized as an explicit `Cast` so no
    /// implicit conversion is left unrepresented in the tree. Applied at
    /// every operand position except the direct target of `&`.
    pub(crate) fn decay(&mut self, expr: Expression) -> Expression {
        let Type::Array(id) = expr.get_type() else {
            return expr;
        };
        let elem = match self.ty_interner.get(id) {
            TypeNode::Array { elem, .. } => *elem,
            _ => unreachable!("Type::Array must intern a TypeNode::Array"),
        };
        let span = expr.get_span();
        let ptr_id = self.ty_interner.intern_pointer(elem);
        let target_type = Type::Pointer(ptr_id);
        Expression::new(
            ExpressionType::Cast {
                target_type,
                expr: Box::new(expr),
            },
            target_type,
            span,
        )
    }

    /// `Double` and any pointer type never convert into one another;
    /// every other arithmetic or pointer pairing is allowed.
    fn validate_cast(source: Type, target: Type) -> bool {
        !((source == Type::Double && target.is_pointer()) || (source.is_pointer() && target == Type::Double))
    }

    /// convert an Expression by wrapping it in a cast, unless it is
    /// already of the target type
    pub(crate) fn convert_to(expr: Expression, target_type: Type) -> Result<Expression, ErrorType> {
        let expr_type = expr.get_type();
        if target_type == expr_type {
            return Ok(expr);
        }
        if !Self::validate_cast(expr_type, target_type) {
            return Err(ErrorType::IncompatibleCast {
                span: expr.get_span(),
            });
        }
        let span = expr.get_span();
        let inner = ExpressionType::Cast {
            target_type,
            expr: Box::new(expr),
        };
        Ok(Expression::new(inner, target_type, span))
    }

    /// uses C conversion rules to get the common type between two types:
    /// the common type is the type an expression having type1 and type2
    /// as operands should have. `Double` wins outright; among integer
    /// types, equal signedness promotes to the higher rank, and mixed
    /// signedness promotes to whichever side's rank can represent the
    /// other.
    fn get_common_type(type1: Type, type2: Type) -> Type {
        if type1 == type2 {
            return type1;
        }
        if type1 == Type::Double || type2 == Type::Double {
            return Type::Double;
        }
        if type1.is_signed() == type2.is_signed() {
            if type1.rank() >= type2.rank() { type1 } else { type2 }
        } else {
            let (signed, unsigned) = if type1.is_signed() {
                (type1, type2)
            } else {
                (type2, type1)
            };
            if unsigned.rank() >= signed.rank() { unsigned } else { signed }
        }
    }

    /// equalize the types of two operands according to C common type rules
    ///
    /// return the tuple (converted_op1, converted_op2, common_type)
    fn equalize_operands(
        operand1: Expression,
        operand2: Expression,
    ) -> Result<(Expression, Expression, Type), ErrorType> {
        let common_type = Self::get_common_type(operand1.get_type(), operand2.get_type());
        let converted_op1 = Self::convert_to(operand1, common_type)?;
        let converted_op2 = Self::convert_to(operand2, common_type)?;
        Ok((converted_op1, converted_op2, common_type))
    }

    /// Type checks an expression recursively.
    pub(crate) fn typecheck_expression(&mut self, expr: Expression) -> Result<Expression, ErrorType> {
        let (inner, _, span) = expr.into_parts();

        match inner {
            ExpressionType::Constant(c) => {
                let ty = c.get_type();
                Ok(Expression::new(ExpressionType::Constant(c), ty, span))
            }
            ExpressionType::Var(ident) => self.typecheck_var_expression(ident, span),
            ExpressionType::Cast { target_type, expr } => {
                self.typecheck_cast_expression(*expr, target_type, span)
            }
            ExpressionType::Unary { operator, operand } => {
                self.typecheck_unary_expression(operator, *operand, span)
            }
            ExpressionType::Binary {
                operator,
                operand1,
                operand2,
            } => self.typecheck_binary_expression(operator, *operand1, *operand2, span),
            ExpressionType::Assignment { lvalue, rvalue } => {
                self.typecheck_assignment_expression(*lvalue, *rvalue, span)
            }
            ExpressionType::CompoundAssignment {
                operator,
                lvalue,
                rvalue,
            } => self.typecheck_compound_assignment_expression(operator, *lvalue, *rvalue, span),
            ExpressionType::Conditional { cond, cons, alt } => {
                self.typecheck_conditional_expression(*cond, *cons, *alt, span)
            }
            ExpressionType::FunctionCall { name, args } => {
                self.typecheck_function_call_expression(name, args, span)
            }
            ExpressionType::Dereference(inner) => self.typecheck_dereference_expression(*inner, span),
            ExpressionType::AddrOf(inner) => self.typecheck_addr_of_expression(*inner, span),
            ExpressionType::Subscript { array, index } => {
                self.typecheck_subscript_expression(*array, *index, span)
            }
        }
    }

    /// type check cast expressions
    fn typecheck_cast_expression(
        &mut self,
        expr: Expression,
        target_type: Type,
        span: Span,
    ) -> Result<Expression, ErrorType> {
        let checked_expr = self.typecheck_expression(expr)?;
        let decayed = self.decay(checked_expr);
        if !Self::validate_cast(decayed.get_type(), target_type) {
            return Err(ErrorType::IncompatibleCast { span });
        }
        let inner = ExpressionType::Cast {
            target_type,
            expr: Box::new(decayed),
        };
        Ok(Expression::new(inner, target_type, span))
    }

    /// Type check unary expressions
    fn typecheck_unary_expression(
        &mut self,
        operator: UnaryOP,
        operand: Expression,
        span: Span,
    ) -> Result<Expression, ErrorType> {
        let checked_operand = self.typecheck_expression(operand)?;
        let operand = self.decay(checked_operand);

        match operator {
            UnaryOP::LogicalNot => {
                if !operand.get_type().is_scalar() {
                    return Err(ErrorType::NonScalarCondition {
                        span: operand.get_span(),
                    });
                }
                let inner = ExpressionType::Unary {
                    operator,
                    operand: Box::new(operand),
                };
                Ok(Expression::new(inner, Type::Int, span))
            }
            UnaryOP::Negate => {
                if !operand.get_type().is_arithmetic() {
                    return Err(ErrorType::NonArithmeticOperand {
                        detail: "operand of unary '-' must have arithmetic type",
                        span: operand.get_span(),
                    });
                }
                let ty = operand.get_type();
                let inner = ExpressionType::Unary {
                    operator,
                    operand: Box::new(operand),
                };
                Ok(Expression::new(inner, ty, span))
            }
            UnaryOP::Complement => {
                if !operand.get_type().is_integer() {
                    return Err(ErrorType::NonArithmeticOperand {
                        detail: "operand of '~' must have integer type",
                        span: operand.get_span(),
                    });
                }
                let ty = operand.get_type();
                let inner = ExpressionType::Unary {
                    operator,
                    operand: Box::new(operand),
                };
                Ok(Expression::new(inner, ty, span))
            }
        }
    }

    /// Type check binary expressions
    fn typecheck_binary_expression(
        &mut self,
        operator: BinaryOP,
        operand1: Expression,
        operand2: Expression,
        span: Span,
    ) -> Result<Expression, ErrorType> {
        let checked_op1 = self.typecheck_expression(operand1)?;
        let op1 = self.decay(checked_op1);
        let checked_op2 = self.typecheck_expression(operand2)?;
        let op2 = self.decay(checked_op2);

        // for logical operators, the type of operands doesn't matter, only
        // their truthness (and they must be scalar); hence no conversion.
        if operator.is_logical() {
            if !op1.get_type().is_scalar() {
                return Err(ErrorType::NonScalarCondition {
                    span: op1.get_span(),
                });
            }
            if !op2.get_type().is_scalar() {
                return Err(ErrorType::NonScalarCondition {
                    span: op2.get_span(),
                });
            }
            let inner = ExpressionType::Binary {
                operator,
                operand1: Box::new(op1),
                operand2: Box::new(op2),
            };
            return Ok(Expression::new(inner, Type::Int, span));
        }

        if operator.is_arithmetic() {
            if !op1.get_type().is_arithmetic() {
                return Err(ErrorType::NonArithmeticOperand {
                    detail: "left operand must have arithmetic type",
                    span: op1.get_span(),
                });
            }
            if !op2.get_type().is_arithmetic() {
                return Err(ErrorType::NonArithmeticOperand {
                    detail: "right operand must have arithmetic type",
                    span: op2.get_span(),
                });
            }
            if operator == BinaryOP::Remainder
                && (!op1.get_type().is_integer() || !op2.get_type().is_integer())
            {
                return Err(ErrorType::NonArithmeticOperand {
                    detail: "operands of '%' must have integer type",
                    span,
                });
            }
            let (con_op1, con_op2, common_type) = Self::equalize_operands(op1, op2)?;
            let inner = ExpressionType::Binary {
                operator,
                operand1: Box::new(con_op1),
                operand2: Box::new(con_op2),
            };
            return Ok(Expression::new(inner, common_type, span));
        }

        // Relational/equality: pointer operands must match exactly (no
        // conversion); arithmetic operands go through the usual
        // conversions. Either way the result is `Int`.
        if op1.get_type().is_pointer() || op2.get_type().is_pointer() {
            if op1.get_type() != op2.get_type() {
                return Err(ErrorType::NonArithmeticOperand {
                    detail: "pointer comparison requires operands of the same pointer type",
                    span,
                });
            }
            let inner = ExpressionType::Binary {
                operator,
                operand1: Box::new(op1),
                operand2: Box::new(op2),
            };
            return Ok(Expression::new(inner, Type::Int, span));
        }

        let (con_op1, con_op2, _) = Self::equalize_operands(op1, op2)?;
        let inner = ExpressionType::Binary {
            operator,
            operand1: Box::new(con_op1),
            operand2: Box::new(con_op2),
        };
        Ok(Expression::new(inner, Type::Int, span))
    }

    /// Type check conditional expressions (ternary operator)
    fn typecheck_conditional_expression(
        &mut self,
        cond: Expression,
        cons: Expression,
        alt: Expression,
        span: Span,
    ) -> Result<Expression, ErrorType> {
        let checked_cond = self.typecheck_expression(cond)?;
        let cond = self.decay(checked_cond);
        if !cond.get_type().is_scalar() {
            return Err(ErrorType::NonScalarCondition { span: cond.get_span() });
        }

        let checked_cons = self.typecheck_expression(cons)?;
        let cons = self.decay(checked_cons);
        let checked_alt = self.typecheck_expression(alt)?;
        let alt = self.decay(checked_alt);

        let (con_cons, con_alt, common_type) = if cons.get_type().is_pointer() || alt.get_type().is_pointer() {
            if cons.get_type() != alt.get_type() {
                return Err(ErrorType::NonArithmeticOperand {
                    detail: "branches of '?:' must have the same pointer type",
                    span,
                });
            }
            let ty = cons.get_type();
            (cons, alt, ty)
        } else {
            Self::equalize_operands(cons, alt)?
        };

        let inner = ExpressionType::Conditional {
            cond: Box::new(cond),
            cons: Box::new(con_cons),
            alt: Box::new(con_alt),
        };
        Ok(Expression::new(inner, common_type, span))
    }

    /// Type check variable usage
    fn typecheck_var_expression(
        &self,
        sp_ident: SpannedIdentifier,
        span: Span,
    ) -> Result<Expression, ErrorType> {
        // after the identifier resolution pass, every variable name in scope
        // names a declaration that has already been type checked (we walk
        // declarations in source order), so this lookup should never miss.
        let entry = self.symbol_table.get(sp_ident.get_identifier()).ok_or(
            ErrorType::Internal("a variable reference survived identifier resolution without a symbol table entry"),
        )?;

        if let EntryType::Scalar(var_type) = entry.entry_type {
            let inner = ExpressionType::Var(sp_ident);
            Ok(Expression::new(inner, var_type, span))
        } else {
            // Attempting to use a function name as a value
            Err(ErrorType::NonArithmeticOperand {
                detail: "a function name cannot be used as a value",
                span,
            })
        }
    }

    /// Type check assignments
    fn typecheck_assignment_expression(
        &mut self,
        lvalue: Expression,
        rvalue: Expression,
        span: Span,
    ) -> Result<Expression, ErrorType> {
        let checked_lvalue = self.typecheck_expression(lvalue)?;
        if checked_lvalue.get_type().is_array() {
            return Err(ErrorType::InvalidLValue {
                span: checked_lvalue.get_span(),
            });
        }
        let checked_rvalue = self.typecheck_expression(rvalue)?;
        let rvalue = self.decay(checked_rvalue);
        let left_type = checked_lvalue.get_type();
        let con_rvalue = Self::convert_to(rvalue, left_type)?;

        let inner = ExpressionType::Assignment {
            lvalue: Box::new(checked_lvalue),
            rvalue: Box::new(con_rvalue),
        };
        Ok(Expression::new(inner, left_type, span))
    }

    /// Type check compound assignments (`+=`, `-=`, `*=`, `/=`, `%=`). The
    /// right-hand side is promoted to the common type of both operands;
    /// the assignment's own result type stays the lvalue's type, the same
    /// as a plain assignment.
    fn typecheck_compound_assignment_expression(
        &mut self,
        operator: BinaryOP,
        lvalue: Expression,
        rvalue: Expression,
        span: Span,
    ) -> Result<Expression, ErrorType> {
        let checked_lvalue = self.typecheck_expression(lvalue)?;
        if checked_lvalue.get_type().is_array() {
            return Err(ErrorType::InvalidLValue {
                span: checked_lvalue.get_span(),
            });
        }
        let checked_rvalue = self.typecheck_expression(rvalue)?;
        let rvalue = self.decay(checked_rvalue);

        let left_type = checked_lvalue.get_type();
        if left_type.is_pointer() || rvalue.get_type().is_pointer() {
            return Err(ErrorType::NonArithmeticOperand {
                detail: "pointer operands are not allowed in a compound assignment",
                span,
            });
        }
        if operator == BinaryOP::Remainder
            && (!left_type.is_integer() || !rvalue.get_type().is_integer())
        {
            return Err(ErrorType::NonArithmeticOperand {
                detail: "operands of '%=' must have integer type",
                span,
            });
        }

        let common_type = Self::get_common_type(left_type, rvalue.get_type());
        let con_rvalue = Self::convert_to(rvalue, common_type)?;

        let inner = ExpressionType::CompoundAssignment {
            operator,
            lvalue: Box::new(checked_lvalue),
            rvalue: Box::new(con_rvalue),
        };
        Ok(Expression::new(inner, left_type, span))
    }

    /// Type check function calls
    fn typecheck_function_call_expression(
        &mut self,
        sp_iden: SpannedIdentifier,
        args: Vec<Box<Expression>>,
        span: Span,
    ) -> Result<Expression, ErrorType> {
        let entry = self.symbol_table.get(sp_iden.get_identifier()).ok_or(
            ErrorType::Internal("a function call survived identifier resolution without a symbol table entry"),
        )?;

        let type_id = match entry.entry_type {
            EntryType::Func(type_id) => type_id,
            EntryType::Scalar(_) => return Err(ErrorType::NotCallable { span }),
        };

        let (ret, params) = self.function_shape(type_id);
        if args.len() != params.len() {
            return Err(ErrorType::ArityMismatch {
                expected: params.len(),
                found: args.len(),
                span,
            });
        }
        let params: Vec<Type> = params.to_vec();

        let mut converted_args = Vec::with_capacity(args.len());
        for (arg, param_type) in args.into_iter().zip(params) {
            let checked_arg = self.typecheck_expression(*arg)?;
            let decayed = self.decay(checked_arg);
            let arg_span = decayed.get_span();
            let converted = Self::convert_to(decayed, param_type)
                .map_err(|_| ErrorType::ArgTypeMismatch { span: arg_span })?;
            converted_args.push(Box::new(converted));
        }
        let inner = ExpressionType::FunctionCall {
            name: sp_iden,
            args: converted_args,
        };
        Ok(Expression::new(inner, ret, span))
    }

    /// Type check pointer dereference (`*p`)
    fn typecheck_dereference_expression(
        &mut self,
        inner: Expression,
        span: Span,
    ) -> Result<Expression, ErrorType> {
        let checked = self.typecheck_expression(inner)?;
        let decayed = self.decay(checked);
        match decayed.get_type() {
            Type::Pointer(id) => {
                let pointee = match self.ty_interner.get(id) {
                    TypeNode::Pointer(t) => *t,
                    _ => unreachable!("Type::Pointer must intern a TypeNode::Pointer"),
                };
                let result = ExpressionType::Dereference(Box::new(decayed));
                Ok(Expression::new(result, pointee, span))
            }
            _ => Err(ErrorType::NonArithmeticOperand {
                detail: "cannot dereference a non-pointer expression",
                span: decayed.get_span(),
            }),
        }
    }

    /// Type check address-of (`&lvalue`). Unlike every other operand
    /// position, the inner expression is not decayed: `&array` must see
    /// the array's own type so the result is a pointer to the array, not
    /// a pointer to its element.
    fn typecheck_addr_of_expression(
        &mut self,
        inner: Expression,
        span: Span,
    ) -> Result<Expression, ErrorType> {
        let checked = self.typecheck_expression(inner)?;
        let ty = checked.get_type();
        let ptr_id = self.ty_interner.intern_pointer(ty);
        let result = ExpressionType::AddrOf(Box::new(checked));
        Ok(Expression::new(result, Type::Pointer(ptr_id), span))
    }

    /// Type check subscript (`a[i]`), which typechecks the same as the
    /// pointer arithmetic `*(a+i)`: one operand decays to a pointer, the
    /// other must be an integer, and either order (`a[i]` or `i[a]`) is
    /// accepted.
    fn typecheck_subscript_expression(
        &mut self,
        array: Expression,
        index: Expression,
        span: Span,
    ) -> Result<Expression, ErrorType> {
        let checked_array = self.typecheck_expression(array)?;
        let array = self.decay(checked_array);
        let checked_index = self.typecheck_expression(index)?;
        let index = self.decay(checked_index);

        let (base, offset, pointee) = if let Type::Pointer(id) = array.get_type() {
            if !index.get_type().is_integer() {
                return Err(ErrorType::NonArithmeticOperand {
                    detail: "subscript requires a pointer/array operand and an integer index",
                    span,
                });
            }
            let pointee = match self.ty_interner.get(id) {
                TypeNode::Pointer(t) => *t,
                _ => unreachable!("Type::Pointer must intern a TypeNode::Pointer"),
            };
            (array, index, pointee)
        } else if let Type::Pointer(id) = index.get_type() {
            if !array.get_type().is_integer() {
                return Err(ErrorType::NonArithmeticOperand {
                    detail: "subscript requires a pointer/array operand and an integer index",
                    span,
                });
            }
            let pointee = match self.ty_interner.get(id) {
                TypeNode::Pointer(t) => *t,
                _ => unreachable!("Type::Pointer must intern a TypeNode::Pointer"),
            };
            (index, array, pointee)
        } else {
            return Err(ErrorType::NonArithmeticOperand {
                detail: "subscript requires a pointer/array operand and an integer index",
                span,
            });
        };

        let result = ExpressionType::Subscript {
            array: Box::new(base),
            index: Box::new(offset),
        };
        Ok(Expression::new(result, pointee, span))
    }
}
