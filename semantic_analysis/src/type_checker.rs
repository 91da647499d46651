use crate::semantic_error::{ErrorType, SemanticErr};
use parser::ast::*;
use shared_context::{
    source_map::SourceMap,
    symbol_table::SymbolTable,
    type_interner::{TypeID, TypeInterner},
};

mod typecheck_expressions;
mod typecheck_functions;
mod typecheck_statements;
mod typecheck_variables;

/// Third pass: type checking.
///
/// Walks the resolved, labeled AST and rebuilds every expression node
/// with its real type, inserting an explicit `Cast` wherever an
/// implicit conversion is required (usual arithmetic conversions,
/// assignment conversions, array-to-pointer decay). Populates the
/// symbol table with every function and object's type and linkage.
///
/// `ty_interner` is mutable because array decay and `&expr` both
/// intern a new `Pointer` type node on the fly — the parser's
/// `TypeInterner` only ever saw the pointer/array/function shapes
/// spelled out in source, never the ones type checking itself needs
/// to manufacture.
pub(crate) struct TypeChecker<'src, 'ctx> {
    ty_interner: &'ctx mut TypeInterner<'src>,
    symbol_table: &'ctx mut SymbolTable,
    source_map: &'ctx SourceMap<'src>,
}

impl<'src, 'ctx> TypeChecker<'src, 'ctx> {
    pub fn new(
        symbol_table: &'ctx mut SymbolTable,
        ty_interner: &'ctx mut TypeInterner<'src>,
        source_map: &'ctx SourceMap<'src>,
    ) -> Self {
        Self {
            ty_interner,
            symbol_table,
            source_map,
        }
    }

    pub fn typecheck_program(&mut self, program: Program) -> Result<Program, SemanticErr> {
        let declarations = program.into_parts();
        let mut checked = Vec::with_capacity(declarations.len());

        for decl in declarations {
            checked.push(
                self.typecheck_global_declaration(decl)
                    .map_err(|err| SemanticErr::new(err, self.source_map))?,
            );
        }

        Ok(Program::new(checked))
    }

    fn typecheck_global_declaration(&mut self, decl: Declaration) -> Result<Declaration, ErrorType> {
        match decl {
            Declaration::FunDecl(fun_decl) => {
                Ok(Declaration::FunDecl(self.typecheck_function_declaration(fun_decl)?))
            }
            Declaration::VarDecl(var_decl) => {
                Ok(Declaration::VarDecl(self.typecheck_global_variable_declaration(var_decl)?))
            }
        }
    }

    fn typecheck_local_declaration(&mut self, decl: Declaration) -> Result<Declaration, ErrorType> {
        match decl {
            Declaration::FunDecl(fun_decl) => {
                Ok(Declaration::FunDecl(self.typecheck_function_declaration(fun_decl)?))
            }
            Declaration::VarDecl(var_decl) => {
                Ok(Declaration::VarDecl(self.typecheck_local_variable_declaration(var_decl)?))
            }
        }
    }

    /// Type checks a block. `curr_fun` is the interned type of the
    /// enclosing function, consulted by `return` statements to convert
    /// their operand to the declared return type.
    fn typecheck_block(&mut self, block: Block, curr_fun: TypeID) -> Result<Block, ErrorType> {
        let (items, span) = block.into_parts();
        let mut checked = Vec::with_capacity(items.len());
        for item in items {
            checked.push(self.typecheck_block_item(item, curr_fun)?);
        }
        Ok(Block::new(checked, span))
    }

    fn typecheck_block_item(
        &mut self,
        item: BlockItem,
        curr_fun: TypeID,
    ) -> Result<BlockItem, ErrorType> {
        match item {
            BlockItem::D(decl) => Ok(BlockItem::D(self.typecheck_local_declaration(decl)?)),
            BlockItem::S(stmt) => Ok(BlockItem::S(self.typecheck_statement(stmt, curr_fun)?)),
        }
    }
}
