use crate::semantic_error::{ErrorType, SemanticErr};
use parser::ast::*;
use shared_context::{
    Identifier, NameGenerator,
    interner::{Interner, Symbol},
    source_map::SourceMap,
};

/// Second pass of semantic analysis: loop labeling.
///
/// Every `while`/`do`/`for` loop is given a unique label identifier;
/// every `break`/`continue` is rewritten to carry the label of its
/// nearest enclosing loop, or rejected if it has none. `goto`/label
/// resolution already happened in identifier resolution — this pass
/// only concerns itself with loop nesting.
pub(crate) struct LoopLabeling<'src, 'ctx> {
    source_map: &'ctx SourceMap<'src>,
    name_gen: NameGenerator,
    /// The single interned spelling every loop label is hinted by;
    /// loops are told apart by `NameGenerator`'s counter, not by
    /// distinct strings, so this only needs to be interned once.
    loop_symbol: Symbol,
}

impl<'src, 'ctx> LoopLabeling<'src, 'ctx> {
    pub fn new(interner: &mut Interner<'src>, source_map: &'ctx SourceMap<'src>, start: usize) -> Self {
        Self {
            source_map,
            name_gen: NameGenerator::with_start(start),
            loop_symbol: interner.intern("loop"),
        }
    }

    fn make_label(&mut self) -> Identifier {
        self.name_gen.fresh(self.loop_symbol)
    }

    /// Total number of identifiers minted across identifier resolution
    /// and loop labeling; later stages seed their own counters from
    /// this so no generated name collides with one of these labels.
    pub fn label_count(&self) -> usize {
        self.name_gen.count()
    }

    pub fn label_program(&mut self, program: Program) -> Result<Program, SemanticErr> {
        let declarations = program.into_parts();
        let mut labeled = Vec::with_capacity(declarations.len());
        for decl in declarations {
            labeled.push(match decl {
                Declaration::VarDecl(_) => decl,
                Declaration::FunDecl(fun_decl) => {
                    Declaration::FunDecl(self.label_function_decl(fun_decl)?)
                }
            });
        }
        Ok(Program::new(labeled))
    }

    fn label_function_decl(&mut self, function: FunctionDecl) -> Result<FunctionDecl, SemanticErr> {
        let (name, type_id, params, body, storage_class, span) = function.into_parts();
        let labeled_body = match body {
            Some(block) => Some(
                self.label_block(block, None)
                    .map_err(|err| SemanticErr::new(err, self.source_map))?,
            ),
            None => None,
        };
        Ok(FunctionDecl::new(
            name,
            type_id,
            params,
            labeled_body,
            storage_class,
            span,
        ))
    }

    fn label_block(&mut self, block: Block, curr_loop: Option<Identifier>) -> Result<Block, ErrorType> {
        let (items, span) = block.into_parts();
        let mut labeled = Vec::with_capacity(items.len());
        for item in items {
            labeled.push(self.label_block_item(item, curr_loop)?);
        }
        Ok(Block::new(labeled, span))
    }

    fn label_block_item(
        &mut self,
        item: BlockItem,
        curr_loop: Option<Identifier>,
    ) -> Result<BlockItem, ErrorType> {
        match item {
            BlockItem::S(stmt) => Ok(BlockItem::S(self.label_statement(stmt, curr_loop)?)),
            decl @ BlockItem::D(_) => Ok(decl),
        }
    }

    fn label_statement(
        &mut self,
        stmt: Statement,
        curr_loop: Option<Identifier>,
    ) -> Result<Statement, ErrorType> {
        let (kind, span) = stmt.into_parts();
        let labeled_kind = match kind {
            StatementType::Break(_) => match curr_loop {
                Some(label) => StatementType::Break(label),
                None => {
                    return Err(ErrorType::OrphanBreakContinue {
                        what: "break",
                        span,
                    });
                }
            },
            StatementType::Continue(_) => match curr_loop {
                Some(label) => StatementType::Continue(label),
                None => {
                    return Err(ErrorType::OrphanBreakContinue {
                        what: "continue",
                        span,
                    });
                }
            },
            StatementType::Compound(block) => StatementType::Compound(self.label_block(block, curr_loop)?),
            StatementType::IfStatement {
                condition,
                if_clause,
                else_clause,
            } => {
                let if_clause = Box::new(self.label_statement(*if_clause, curr_loop)?);
                let else_clause = match else_clause {
                    Some(stmt) => Some(Box::new(self.label_statement(*stmt, curr_loop)?)),
                    None => None,
                };
                StatementType::IfStatement {
                    condition,
                    if_clause,
                    else_clause,
                }
            }
            StatementType::While { condition, body, .. } => {
                let label = self.make_label();
                let body = Box::new(self.label_statement(*body, Some(label))?);
                StatementType::While {
                    condition,
                    body,
                    label,
                }
            }
            StatementType::DoWhile { condition, body, .. } => {
                let label = self.make_label();
                let body = Box::new(self.label_statement(*body, Some(label))?);
                StatementType::DoWhile {
                    condition,
                    body,
                    label,
                }
            }
            StatementType::For {
                init,
                condition,
                post,
                body,
                ..
            } => {
                let label = self.make_label();
                let body = Box::new(self.label_statement(*body, Some(label))?);
                StatementType::For {
                    init,
                    condition,
                    post,
                    body,
                    label,
                }
            }
            // `goto`/label statements carry no loop context of their
            // own, but a label may wrap a loop or another control
            // statement, so recursion still has to reach through it.
            StatementType::Label(name, body) => {
                StatementType::Label(name, Box::new(self.label_statement(*body, curr_loop)?))
            }
            other @ (StatementType::Return(_)
            | StatementType::ExprStatement(_)
            | StatementType::Goto(_)
            | StatementType::Null) => other,
        };

        Ok(Statement::new(labeled_kind, span))
    }
}
