use crate::{TypeChecker, semantic_error::ErrorType};
use parser::ast::*;
use shared_context::{
    Span, SpannedIdentifier, Type,
    symbol_table::EntryType,
    symbol_table::IdenAttrs,
    type_interner::{TypeID, TypeNode},
};

impl<'src, 'ctx> TypeChecker<'src, 'ctx> {
    /// The (return type, parameter types) of an interned function type.
    ///
    /// # Panics
    /// Panics if `ty_id` doesn't intern a `TypeNode::Func` — every
    /// `TypeID` reachable from a `FunctionDecl` or an `EntryType::Func`
    /// was minted by `intern_function`, so this is an internal
    /// invariant, not a user-facing condition.
    pub(super) fn function_shape(&self, ty_id: TypeID) -> (Type, &'src [Type]) {
        match self.ty_interner.get(ty_id) {
            TypeNode::Func { ret, params } => (*ret, params),
            _ => unreachable!("a function's TypeID must intern a TypeNode::Func"),
        }
    }

    /// Type checks a function declaration.
    ///
    /// # Behavior
    /// - Checks if a function with the same name was previously declared.
    ///   - Ensures consistent types.
    ///   - Detects duplicate definitions.
    ///   - Enforces that linkage, once external, cannot be narrowed to internal.
    /// - Registers the function in the symbol table.
    /// - Type checks the function body if present.
    pub(crate) fn typecheck_function_declaration(
        &mut self,
        function: FunctionDecl,
    ) -> Result<FunctionDecl, ErrorType> {
        let (sp_iden, ty_id, params, body, storage_class, span) = function.into_parts();

        let has_body = body.is_some();
        let mut is_global = storage_class != StorageClass::Static;
        let mut is_defined = false;

        if let Some((prev_global, prev_defined)) =
            self.check_previous_function_decl(sp_iden, ty_id, storage_class, span, has_body)?
        {
            is_global = prev_global;
            is_defined = prev_defined;
        }

        self.symbol_table.put(
            sp_iden.get_identifier(),
            EntryType::Func(ty_id),
            IdenAttrs::FunAttrs {
                is_defined: is_defined || has_body,
                is_global,
            },
            span,
        );

        if let Some(block) = body {
            // Function parameters are treated as variables within the function scope.
            self.register_function_params(&params, ty_id, span);
            let typechecked_body = Some(self.typecheck_block(block, ty_id)?);
            Ok(FunctionDecl::new(
                sp_iden,
                ty_id,
                params,
                typechecked_body,
                storage_class,
                span,
            ))
        } else {
            Ok(FunctionDecl::new(
                sp_iden, ty_id, params, None, storage_class, span,
            ))
        }
    }

    /// Checks for a previous declaration of the same function.
    ///
    /// Returns `Some((is_global, is_defined))` carried over from the
    /// prior entry, or `None` if this is the first declaration seen.
    fn check_previous_function_decl(
        &self,
        sp_iden: SpannedIdentifier,
        ty_id: TypeID,
        storage_class: StorageClass,
        span: Span,
        has_body: bool,
    ) -> Result<Option<(bool, bool)>, ErrorType> {
        let Some(prev_entry) = self.symbol_table.get(sp_iden.get_identifier()) else {
            return Ok(None);
        };

        if prev_entry.entry_type != EntryType::Func(ty_id) {
            return Err(ErrorType::ConflictingTypes {
                first: prev_entry.span,
                second: span,
            });
        }
        let prev_global = prev_entry.attrs.is_global();
        let prev_defined = prev_entry.attrs.is_defined();

        if prev_defined && has_body {
            return Err(ErrorType::RedefinedFunction {
                first: prev_entry.span,
                second: sp_iden.get_span(),
            });
        }
        // Once a function has external linkage, a later `static`
        // redeclaration can't narrow it back to internal.
        if prev_global && storage_class == StorageClass::Static {
            return Err(ErrorType::ConflictingLinkage {
                first: prev_entry.span,
                second: span,
            });
        }

        Ok(Some((prev_global, prev_defined)))
    }

    /// Registers the parameters of a function as local variables.
    fn register_function_params(&mut self, params: &[SpannedIdentifier], ty_id: TypeID, span: Span) {
        let (_, param_types) = self.function_shape(ty_id);
        for (sp_iden, param_type) in params.iter().zip(param_types) {
            self.symbol_table.put(
                sp_iden.get_identifier(),
                EntryType::Scalar(*param_type),
                IdenAttrs::LocalAttrs,
                span,
            );
        }
    }
}
