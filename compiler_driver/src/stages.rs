use colored::Colorize;
use parser::parse;
use semantic_analysis::analize;
use shared_context::symbol_table::IdenAttrs;
use shared_context::{Bump, CompilerContext};
use std::{error::Error, fs};

/// lex the program then exit without starting the other stages
pub fn lexer_stage(file_path: &str) -> Result<(), Box<dyn Error>> {
    let input_string = fs::read_to_string(file_path)?;

    let mut lexer = lexer::Lexer::new(&input_string);

    while let Some(tok) = lexer.next() {
        match tok {
            Ok(tok) => println!("matched string: {}, token type: {:?}", tok.get_lexeme(), tok.get_token()),
            Err(err) => return Err(err.to_string().into()),
        }
    }

    Ok(())
}

/// lex and parse the program, printing the resulting AST, then exit
/// without running semantic analysis
pub fn parser_stage(file_path: &str, file_name: &str) -> Result<(), Box<dyn Error>> {
    let input_string = fs::read_to_string(file_path)?;

    let lexer = lexer::Lexer::new(&input_string);
    let arena = Bump::new();
    let mut ctx = CompilerContext::new(&arena, file_name, &input_string);
    let program_ast = parse(lexer, &mut ctx)?;

    println!("{program_ast:#?}");

    Ok(())
}

/// run the full pipeline through semantic analysis and print the
/// populated symbol table; this is as far as this compiler goes.
pub fn validate_stage(file_path: &str, file_name: &str) -> Result<(), Box<dyn Error>> {
    let input_string = fs::read_to_string(file_path)?;

    let lexer = lexer::Lexer::new(&input_string);
    let arena = Bump::new();
    let mut ctx = CompilerContext::new(&arena, file_name, &input_string);
    let program_ast = parse(lexer, &mut ctx)?;

    let CompilerContext {
        interner,
        source_map,
        symbol_table,
        type_interner,
    } = &mut ctx;

    analize(interner, symbol_table, type_interner, source_map, program_ast)?;

    print_symbol_table(&ctx);

    Ok(())
}

fn print_symbol_table(ctx: &CompilerContext) {
    println!("{}", "symbol table:".bold());
    for (name, entry) in ctx.symbol_table.get_table_ref() {
        let rendered = name.render(&ctx.interner);
        let kind = match &entry.attrs {
            IdenAttrs::FunAttrs { is_defined, is_global } => {
                format!("function, defined={is_defined}, global={is_global}")
            }
            IdenAttrs::StaticAttrs { is_global, init } => {
                format!("static, global={is_global}, init={init:?}")
            }
            IdenAttrs::LocalAttrs => "local".to_string(),
        };
        println!("  {} : {:?} ({kind})", rendered.cyan(), entry.entry_type);
    }
}
