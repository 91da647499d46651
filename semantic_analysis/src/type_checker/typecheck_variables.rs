use crate::{TypeChecker, semantic_error::ErrorType};
use parser::ast::{Constant, Expression, ExpressionType, StorageClass, UnaryOP, VariableDecl};
use shared_context::{
    Span, SpannedIdentifier, Type,
    symbol_table::{EntryType, IdenAttrs, InitialValue, StaticInit},
    type_interner::TypeNode,
};

/// A folded compile-time constant, still carrying its arithmetic type so
/// a further `Cast`/`Negate`/`Complement` layer can be folded on top of it.
#[derive(Clone, Copy)]
enum ConstValue {
    Int(i32),
    Long(i64),
    UInt(u32),
    ULong(u64),
    Double(f64),
}

impl ConstValue {
    fn from_constant(c: Constant) -> Self {
        match c {
            Constant::Int(v) => ConstValue::Int(v),
            Constant::Long(v) => ConstValue::Long(v),
            Constant::UInt(v) => ConstValue::UInt(v),
            Constant::ULong(v) => ConstValue::ULong(v),
            Constant::Double(v) => ConstValue::Double(v),
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            ConstValue::Int(v) => v as i64,
            ConstValue::Long(v) => v,
            ConstValue::UInt(v) => v as i64,
            ConstValue::ULong(v) => v as i64,
            ConstValue::Double(v) => v as i64,
        }
    }

    fn as_u64(self) -> u64 {
        match self {
            ConstValue::Int(v) => v as u64,
            ConstValue::Long(v) => v as u64,
            ConstValue::UInt(v) => v as u64,
            ConstValue::ULong(v) => v,
            ConstValue::Double(v) => v as u64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            ConstValue::Int(v) => v as f64,
            ConstValue::Long(v) => v as f64,
            ConstValue::UInt(v) => v as f64,
            ConstValue::ULong(v) => v as f64,
            ConstValue::Double(v) => v,
        }
    }

    fn negate(self) -> Self {
        match self {
            ConstValue::Int(v) => ConstValue::Int(v.wrapping_neg()),
            ConstValue::Long(v) => ConstValue::Long(v.wrapping_neg()),
            ConstValue::UInt(v) => ConstValue::UInt(v.wrapping_neg()),
            ConstValue::ULong(v) => ConstValue::ULong(v.wrapping_neg()),
            ConstValue::Double(v) => ConstValue::Double(-v),
        }
    }

    fn complement(self) -> Self {
        match self {
            ConstValue::Int(v) => ConstValue::Int(!v),
            ConstValue::Long(v) => ConstValue::Long(!v),
            ConstValue::UInt(v) => ConstValue::UInt(!v),
            ConstValue::ULong(v) => ConstValue::ULong(!v),
            ConstValue::Double(_) => unreachable!("'~' only typechecks on integer operands"),
        }
    }

    /// Reinterprets the value as if cast to `target`, the same truncating/
    /// widening rules a runtime `Cast` node would apply.
    fn cast_to(self, target: Type) -> Self {
        match target {
            Type::Int => ConstValue::Int(self.as_i64() as i32),
            Type::Long => ConstValue::Long(self.as_i64()),
            Type::UInt => ConstValue::UInt(self.as_u64() as u32),
            Type::ULong => ConstValue::ULong(self.as_u64()),
            Type::Double => ConstValue::Double(self.as_f64()),
            Type::Pointer(_) => ConstValue::ULong(self.as_u64()),
            Type::Array(_) => unreachable!("an array is never a cast target"),
        }
    }

    fn to_static_init(self, target: Type) -> StaticInit {
        match self.cast_to(target) {
            ConstValue::Int(v) => StaticInit::IntInit(v),
            ConstValue::Long(v) => StaticInit::LongInit(v),
            ConstValue::UInt(v) => StaticInit::UIntInit(v),
            ConstValue::ULong(v) => StaticInit::ULongInit(v),
            ConstValue::Double(v) => StaticInit::double(v),
        }
    }
}

/// Folds a (already type-checked) expression into a compile-time constant.
/// Only the handful of forms a static initializer can legally take in this
/// grammar survive: a bare constant, `-`/`~` of one, and the `Cast` nodes
/// the type checker itself inserts for the assignment conversion.
fn fold_constant(expr: &Expression) -> Result<ConstValue, ErrorType> {
    match expr.get_kind_ref() {
        ExpressionType::Constant(c) => Ok(ConstValue::from_constant(*c)),
        ExpressionType::Unary {
            operator: UnaryOP::Negate,
            operand,
        } => Ok(fold_constant(operand)?.negate()),
        ExpressionType::Unary {
            operator: UnaryOP::Complement,
            operand,
        } => Ok(fold_constant(operand)?.complement()),
        ExpressionType::Cast { target_type, expr } => Ok(fold_constant(expr)?.cast_to(*target_type)),
        _ => Err(ErrorType::NonConstantStaticInit { span: expr.get_span() }),
    }
}

impl<'src, 'ctx> TypeChecker<'src, 'ctx> {
    /// Size in bytes of `ty`, used to build a `ZeroInit` for an
    /// uninitialized static-duration array.
    fn size_of(&self, ty: Type) -> u64 {
        match ty {
            Type::Int | Type::UInt => 4,
            Type::Long | Type::ULong | Type::Double | Type::Pointer(_) => 8,
            Type::Array(id) => match self.ty_interner.get(id) {
                TypeNode::Array { size, elem } => size * self.size_of(*elem),
                _ => unreachable!("Type::Array must intern a TypeNode::Array"),
            },
        }
    }

    /// The zero-valued static initializer for `ty`: a single zero scalar
    /// for arithmetic/pointer types, or one `ZeroInit` spanning the whole
    /// object for an array.
    fn zero_static_init(&self, ty: Type) -> Vec<StaticInit> {
        match ty {
            Type::Int => vec![StaticInit::IntInit(0)],
            Type::Long => vec![StaticInit::LongInit(0)],
            Type::UInt => vec![StaticInit::UIntInit(0)],
            Type::ULong => vec![StaticInit::ULongInit(0)],
            Type::Double => vec![StaticInit::double(0.0)],
            Type::Pointer(_) => vec![StaticInit::ULongInit(0)],
            Type::Array(_) => vec![StaticInit::ZeroInit(self.size_of(ty))],
        }
    }

    /// Type checks a static initializer expression and folds it down to
    /// its `StaticInit` representation, converting to `target_type` first
    /// (the same assignment-conversion rule a runtime initializer gets).
    fn fold_static_initializer(
        &mut self,
        expr: Expression,
        target_type: Type,
    ) -> Result<Vec<StaticInit>, ErrorType> {
        let span = expr.get_span();
        let checked = self.typecheck_expression(expr)?;
        let decayed = self.decay(checked);
        let converted =
            Self::convert_to(decayed, target_type).map_err(|_| ErrorType::NonConstantStaticInit { span })?;
        let value = fold_constant(&converted)?;
        Ok(vec![value.to_static_init(target_type)])
    }

    /// Combines the initializer state of a redeclaration with what's
    /// already on record. `Initial` beats `Tentative` beats `NoInitializer`;
    /// two explicit `Initial`s conflict.
    fn merge_initial_values(
        prev: InitialValue,
        current: InitialValue,
        prev_span: Span,
        span: Span,
    ) -> Result<InitialValue, ErrorType> {
        match (prev, current) {
            (InitialValue::Initial(_), InitialValue::Initial(_)) => {
                Err(ErrorType::ConflictingInitializers { first: prev_span, second: span })
            }
            (InitialValue::Initial(v), _) => Ok(InitialValue::Initial(v)),
            (_, InitialValue::Initial(v)) => Ok(InitialValue::Initial(v)),
            (InitialValue::Tentative, _) | (_, InitialValue::Tentative) => Ok(InitialValue::Tentative),
            (InitialValue::NoInitializer, InitialValue::NoInitializer) => Ok(InitialValue::NoInitializer),
        }
    }

    /// Registers a static-duration object (a file-scope declaration of any
    /// storage class, or a block-scope `extern`/`static`) in the symbol
    /// table.
    ///
    /// Block-scope `extern` variables share this path because the
    /// resolver keeps their canonical name identical to the file-scope
    /// spelling, so a prior file-scope entry (if any) is found and merged
    /// exactly as a second file-scope declaration would be. Block-scope
    /// `static` variables are minted a fresh canonical name by the
    /// resolver, so `self.symbol_table.get` never finds a prior entry for
    /// them and the merge branch below simply doesn't fire.
    fn register_static_variable(
        &mut self,
        sp_iden: SpannedIdentifier,
        var_type: Type,
        span: Span,
        storage_class: StorageClass,
        mut init_value: InitialValue,
    ) -> Result<(), ErrorType> {
        let mut is_global = storage_class != StorageClass::Static;

        if let Some(prev) = self.symbol_table.get(sp_iden.get_identifier()) {
            match prev.entry_type {
                EntryType::Scalar(prev_type) if prev_type == var_type => {}
                _ => {
                    return Err(ErrorType::ConflictingTypes {
                        first: prev.span,
                        second: span,
                    });
                }
            }
            // A prior declaration's linkage wins; internal linkage is sticky.
            is_global = prev.attrs.is_global();
            let prev_init = prev
                .attrs
                .init_value()
                .cloned()
                .unwrap_or(InitialValue::NoInitializer);
            let prev_span = prev.span;
            init_value = Self::merge_initial_values(prev_init, init_value, prev_span, span)?;
        }

        self.symbol_table.put(
            sp_iden.get_identifier(),
            EntryType::Scalar(var_type),
            IdenAttrs::StaticAttrs {
                is_global,
                init: init_value,
            },
            span,
        );
        Ok(())
    }

    /// Type checks a file-scope variable declaration.
    ///
    /// The initializer, if present, must fold to a compile-time constant;
    /// absent one, a non-`extern` declaration is `Tentative`, an `extern`
    /// one is `NoInitializer`. The initializer expression is fully
    /// absorbed into the symbol table's `StaticInit` list, so the
    /// returned declaration carries no `init` of its own.
    pub(crate) fn typecheck_global_variable_declaration(
        &mut self,
        var_decl: VariableDecl,
    ) -> Result<VariableDecl, ErrorType> {
        let (sp_iden, var_type, init, storage_class, span) = var_decl.into_parts();

        let init_value = match init {
            Some(expr) => InitialValue::Initial(self.fold_static_initializer(expr, var_type)?),
            None if storage_class == StorageClass::Extern => InitialValue::NoInitializer,
            None => InitialValue::Tentative,
        };

        self.register_static_variable(sp_iden, var_type, span, storage_class, init_value)?;

        Ok(VariableDecl::new(sp_iden, var_type, None, storage_class, span))
    }

    /// Type checks a block-scope variable declaration, dispatching on
    /// storage class: `extern` forbids an initializer and defers to
    /// file-scope linkage; `static` requires a constant initializer (or
    /// defaults to zero) and is always its own definition, never merged
    /// with another declaration; plain automatic storage type checks its
    /// initializer as an ordinary expression, converted to the declared
    /// type.
    pub(crate) fn typecheck_local_variable_declaration(
        &mut self,
        var_decl: VariableDecl,
    ) -> Result<VariableDecl, ErrorType> {
        let (sp_iden, var_type, init, storage_class, span) = var_decl.into_parts();

        match storage_class {
            StorageClass::Extern => {
                if let Some(expr) = &init {
                    return Err(ErrorType::InitializerOnExtern { span: expr.get_span() });
                }
                self.register_static_variable(
                    sp_iden,
                    var_type,
                    span,
                    storage_class,
                    InitialValue::NoInitializer,
                )?;
                Ok(VariableDecl::new(sp_iden, var_type, None, storage_class, span))
            }
            StorageClass::Static => {
                let init_value = match init {
                    Some(expr) => InitialValue::Initial(self.fold_static_initializer(expr, var_type)?),
                    None => InitialValue::Initial(self.zero_static_init(var_type)),
                };
                self.register_static_variable(sp_iden, var_type, span, storage_class, init_value)?;
                Ok(VariableDecl::new(sp_iden, var_type, None, storage_class, span))
            }
            StorageClass::None => {
                self.symbol_table.put(
                    sp_iden.get_identifier(),
                    EntryType::Scalar(var_type),
                    IdenAttrs::LocalAttrs,
                    span,
                );
                let checked_init = match init {
                    Some(expr) => {
                        let checked = self.typecheck_expression(expr)?;
                        let decayed = self.decay(checked);
                        Some(Self::convert_to(decayed, var_type)?)
                    }
                    None => None,
                };
                Ok(VariableDecl::new(sp_iden, var_type, checked_init, storage_class, span))
            }
        }
    }
}
