use identifier_resolution::IdentifierResolver;
use loop_labeling::LoopLabeling;
use parser::ast::Program;
use shared_context::{
    interner::Interner, source_map::SourceMap, symbol_table::SymbolTable,
    type_interner::TypeInterner,
};
use type_checker::TypeChecker;

use crate::semantic_error::SemanticErr;

// Modules for specific semantic passes
mod identifier_resolution;
mod loop_labeling;
pub mod semantic_error;
mod type_checker;

/// Runs the three semantic-analysis passes over a parsed `Program`, in
/// order: identifier resolution, loop labeling, type checking. Each pass
/// consumes the previous pass's AST and hands the next one a rewritten
/// tree; the symbol table and type interner are threaded through from
/// the caller's `CompilerContext` and populated in place.
pub fn analize<'src, 'ctx>(
    interner: &mut Interner<'src>,
    symbol_table: &'ctx mut SymbolTable,
    ty_interner: &'ctx mut TypeInterner<'src>,
    source_map: &'ctx SourceMap<'src>,
    program: Program,
) -> Result<Program, SemanticErr> {
    // Identifier Resolution Pass
    let mut id_resolver = IdentifierResolver::new(source_map);
    let resolved_program = id_resolver.resolve_program(program)?;

    // Loop Labeling Pass
    let mut loop_labeling = LoopLabeling::new(interner, source_map, id_resolver.var_count());
    let labeled_program = loop_labeling.label_program(resolved_program)?;

    // Type Checking Pass
    let mut type_checker = TypeChecker::new(symbol_table, ty_interner, source_map);
    type_checker.typecheck_program(labeled_program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::ast::*;
    use shared_context::symbol_table::EntryType;
    use shared_context::{CompilerContext, Identifier};

    /// Lexes, parses, and analyzes `source`, handing the result and the
    /// populated `CompilerContext` to `check`. Parse failures panic the
    /// test immediately; these fixtures are meant to exercise semantic
    /// analysis, not the parser.
    fn with_analysis<R>(source: &str, check: impl FnOnce(Result<Program, SemanticErr>, &CompilerContext) -> R) -> R {
        let arena = shared_context::Bump::new();
        let mut ctx = CompilerContext::new(&arena, "test.c", source);
        let lexer = lexer::Lexer::new(source);
        let program_ast = parser::parse(lexer, &mut ctx).expect("fixture must parse");

        let CompilerContext {
            interner,
            source_map,
            symbol_table,
            type_interner,
        } = &mut ctx;
        let result = analize(interner, symbol_table, type_interner, source_map, program_ast);

        check(result, &ctx)
    }

    fn local_names(ctx: &CompilerContext, hint: &str) -> Vec<String> {
        let mut names: Vec<String> = ctx
            .symbol_table
            .get_table_ref()
            .keys()
            .map(|id| id.render(&ctx.interner))
            .filter(|name| name.starts_with(hint))
            .collect();
        names.sort();
        names
    }

    fn find_function_body(program: Program, fn_name: &str, ctx: &CompilerContext) -> Block {
        for decl in program.into_parts() {
            if let Declaration::FunDecl(f) = decl {
                let (sp_iden, _, _, body, _, _) = f.into_parts();
                if sp_iden.get_identifier().render(&ctx.interner) == fn_name {
                    return body.expect("function must have a body");
                }
            }
        }
        panic!("no function named {fn_name}");
    }

    /// Walks every statement reachable from `stmt`, recording the label
    /// of each loop it enters and of each `break`/`continue` it finds.
    fn collect_labels(stmt: Statement, loop_labels: &mut Vec<Identifier>, jump_labels: &mut Vec<Identifier>) {
        let (kind, _) = stmt.into_parts();
        match kind {
            StatementType::While { body, label, .. } | StatementType::DoWhile { body, label, .. } => {
                loop_labels.push(label);
                collect_labels(*body, loop_labels, jump_labels);
            }
            StatementType::For { body, label, .. } => {
                loop_labels.push(label);
                collect_labels(*body, loop_labels, jump_labels);
            }
            StatementType::Break(label) | StatementType::Continue(label) => jump_labels.push(label),
            StatementType::Compound(block) => {
                let (items, _) = block.into_parts();
                for item in items {
                    if let BlockItem::S(s) = item {
                        collect_labels(s, loop_labels, jump_labels);
                    }
                }
            }
            StatementType::IfStatement {
                if_clause,
                else_clause,
                ..
            } => {
                collect_labels(*if_clause, loop_labels, jump_labels);
                if let Some(e) = else_clause {
                    collect_labels(*e, loop_labels, jump_labels);
                }
            }
            StatementType::Label(_, body) => collect_labels(*body, loop_labels, jump_labels),
            _ => {}
        }
    }

    fn find_return_expr(block: Block) -> Option<Expression> {
        let (items, _) = block.into_parts();
        for item in items {
            if let BlockItem::S(stmt) = item {
                let (kind, _) = stmt.into_parts();
                if let StatementType::Return(expr) = kind {
                    return Some(expr);
                }
            }
        }
        None
    }

    #[test]
    fn empty_program_analyzes_to_an_empty_symbol_table() {
        with_analysis("", |result, ctx| {
            let program = result.expect("an empty translation unit is valid");
            assert!(program.into_parts().is_empty());
            assert!(ctx.symbol_table.get_table_ref().is_empty());
        });
    }

    #[test]
    fn two_explicit_file_scope_initializers_conflict() {
        with_analysis("int x = 3; int x = 4;", |result, _ctx| {
            let err = result.expect_err("redefining x's initializer must fail");
            assert!(err.to_string().contains("conflicting initializers"));
        });
    }

    #[test]
    fn block_scope_redeclarations_get_distinct_canonical_names() {
        let source = "int f(void){ { int x = 1; } { int x = 2; } return 0; }";
        with_analysis(source, |result, ctx| {
            result.expect("two disjoint blocks may each declare their own x");
            let names = local_names(ctx, "x.");
            assert_eq!(names.len(), 2, "expected two distinct canonical names for x, got {names:?}");
            assert_ne!(names[0], names[1]);
        });
    }

    #[test]
    fn a_name_out_of_its_blocks_scope_is_undeclared() {
        let source = "int f(void){ { int x = 1; } { int x = 2; } return x; }";
        with_analysis(source, |result, _ctx| {
            let err = result.expect_err("x from either inner block is out of scope at the return");
            assert!(err.to_string().contains("undeclared identifier"));
        });
    }

    #[test]
    fn internal_linkage_sticks_across_redeclaration() {
        let source = "static int g(void); int g(void){ return 0; }";
        with_analysis(source, |result, ctx| {
            result.expect("a static-then-plain redeclaration of the same function is fine");
            let entry = ctx
                .symbol_table
                .get_table_ref()
                .iter()
                .find(|(_, e)| matches!(e.entry_type, EntryType::Func(_)))
                .map(|(_, e)| e)
                .expect("g must be in the symbol table");
            assert!(!entry.attrs.is_global(), "linkage must stay internal once declared static");
        });
    }

    #[test]
    fn dropping_linkage_to_static_after_external_is_rejected() {
        let source = "int h(void){ return 0; } static int h(void);";
        with_analysis(source, |result, _ctx| {
            let err = result.expect_err("a function cannot narrow external linkage to internal");
            assert!(err.to_string().contains("linkage"));
        });
    }

    #[test]
    fn break_is_tagged_with_its_enclosing_loops_id() {
        let source = "int main(void){ while(1){ if(1) break; } return 0; }";
        with_analysis(source, |result, ctx| {
            let program = result.expect("a break inside a while loop is valid");
            let body = find_function_body(program, "main", ctx);
            let (items, _) = body.into_parts();
            let mut loop_labels = Vec::new();
            let mut jump_labels = Vec::new();
            for item in items {
                if let BlockItem::S(stmt) = item {
                    collect_labels(stmt, &mut loop_labels, &mut jump_labels);
                }
            }
            assert_eq!(loop_labels.len(), 1);
            assert_eq!(jump_labels, loop_labels, "the break must carry the while loop's id");
        });
    }

    #[test]
    fn orphan_break_outside_any_loop_is_rejected() {
        with_analysis("int main(void){ break; return 0; }", |result, _ctx| {
            let err = result.expect_err("break outside a loop has nowhere to jump");
            assert!(err.to_string().contains("break") || err.to_string().contains("continue"));
        });
    }

    #[test]
    fn forward_goto_resolves_to_a_label_declared_later() {
        with_analysis("int main(void){ goto l; l: return 0; }", |result, _ctx| {
            result.expect("a forward goto to a label later in the same function is valid");
        });
    }

    #[test]
    fn goto_with_no_matching_label_is_rejected() {
        with_analysis("int main(void){ goto nowhere; return 0; }", |result, _ctx| {
            let err = result.expect_err("there is no label named nowhere in this function");
            assert!(err.to_string().contains("goto"));
        });
    }

    #[test]
    fn mixed_signedness_comparison_inserts_a_promoting_cast() {
        let source = "int main(void){ unsigned int u = 1; int i = -1; return u < i; }";
        with_analysis(source, |result, ctx| {
            let program = result.expect("comparing unsigned and signed ints is allowed, with promotion");
            let body = find_function_body(program, "main", ctx);
            let expr = find_return_expr(body).expect("main must end in a return");
            let ExpressionType::Binary { operand1, operand2, .. } = expr.get_kind_ref() else {
                panic!("expected the comparison to survive as a Binary node");
            };
            assert!(
                !matches!(operand1.get_kind_ref(), ExpressionType::Cast { .. }),
                "the already-unsigned operand needs no cast"
            );
            let ExpressionType::Cast { target_type, .. } = operand2.get_kind_ref() else {
                panic!("the signed operand must be wrapped in a promoting Cast, got {:?}", operand2.get_kind_ref());
            };
            assert_eq!(*target_type, Type::UInt);
            assert_eq!(expr.get_type(), Type::Int, "relational operators always produce Int");
        });
    }
}
