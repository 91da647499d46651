use crate::semantic_error::{ErrorType, SemanticErr};
use parser::ast::*;
use shared_context::{Identifier, NameGenerator, Span, SpannedIdentifier, interner::Symbol, source_map::SourceMap};
use std::collections::{HashMap, VecDeque};

mod resolve_declaration;
mod resolve_expressions;
mod resolve_statements;

/// One binding visible in a scope: the canonical identifier it resolves
/// to, the span of the declaration currently on record, and whether it
/// has linkage.
///
/// A binding with linkage (every function, every file-scope object,
/// every block-scoped `extern`) keeps its source spelling as its
/// canonical identifier (`id` 0) so separate declarations of the same
/// name, possibly in unrelated scopes, agree on which entity they
/// name. A binding without linkage (an ordinary local, a parameter, a
/// block-scoped `static`) gets an identifier minted fresh by
/// `NameGenerator`, so a shadowed outer `x` and an inner `x` never
/// collide once separated from their lexical scope.
#[derive(Clone, Copy)]
struct ScopeEntry {
    canonical: Identifier,
    span: Span,
    has_linkage: bool,
}

/// One nested lexical scope: a fresh block, a function's parameter
/// list plus its top-level body, or the file scope.
struct Scope {
    entries: HashMap<Symbol, ScopeEntry>,
}

impl Scope {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

/// The stack of scopes active while resolving one program, innermost
/// scope at the front.
struct ResolverContext {
    scopes: VecDeque<Scope>,
}

impl ResolverContext {
    fn new() -> Self {
        Self {
            scopes: VecDeque::new(),
        }
    }

    fn push_scope(&mut self) {
        self.scopes.push_front(Scope::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop_front();
    }

    fn insert(&mut self, symbol: Symbol, entry: ScopeEntry) {
        self.scopes
            .front_mut()
            .expect("resolver context has no active scope")
            .entries
            .insert(symbol, entry);
    }

    /// Searches every active scope, innermost first.
    fn lookup(&self, symbol: Symbol) -> Option<ScopeEntry> {
        self.scopes
            .iter()
            .find_map(|scope| scope.entries.get(&symbol).copied())
    }

    /// Searches only the current (innermost) scope.
    fn lookup_current(&self, symbol: Symbol) -> Option<ScopeEntry> {
        self.scopes
            .front()
            .expect("resolver context has no active scope")
            .entries
            .get(&symbol)
            .copied()
    }
}

/// First pass of semantic analysis: identifier resolution.
///
/// Gives every declaration a canonical [`Identifier`] (renaming
/// no-linkage locals so shadowing can never collide after scopes are
/// erased), rejects redeclarations and uses of undeclared names, and
/// resolves every `goto`/label pair within each function.
///
/// `external_linkage` tracks, program-wide, the canonical identifier
/// already assigned to every name that has ever been declared with
/// linkage. It is consulted only when resolving a declaration that
/// itself has linkage (a function, a file-scope object, or a
/// block-scoped `extern`): a name's scope entries disappear along with
/// the scope once a block exits, but its linkage must still be
/// recognized by a later, unrelated block that declares `extern` with
/// the same name — this map is what survives the scope pop.
pub(crate) struct IdentifierResolver<'src, 'ctx> {
    source_map: &'ctx SourceMap<'src>,
    name_gen: NameGenerator,
    external_linkage: HashMap<Symbol, Identifier>,
    /// Per-function label bookkeeping, reset at the start of every
    /// function body: each label name's canonical identifier, minted
    /// lazily the first time a `goto` or a label statement names it
    /// (whichever comes first — a `goto` may forward-reference a label
    /// that appears later in the same function).
    label_canonical: HashMap<Symbol, Identifier>,
    /// Label names actually declared so far, mapped to the span of
    /// their declaration (for `DuplicateLabel` diagnostics).
    label_declared: HashMap<Symbol, Span>,
    /// Every `goto` target seen, to be checked against `label_declared`
    /// once the whole function body has been walked.
    goto_refs: Vec<(Symbol, Span)>,
}

impl<'src, 'ctx> IdentifierResolver<'src, 'ctx> {
    pub fn new(source_map: &'ctx SourceMap<'src>) -> Self {
        Self {
            source_map,
            name_gen: NameGenerator::new(),
            external_linkage: HashMap::new(),
            label_canonical: HashMap::new(),
            label_declared: HashMap::new(),
            goto_refs: Vec::new(),
        }
    }

    /// Number of no-linkage identifiers minted so far. The loop
    /// labeling pass seeds its own counter from this value so the two
    /// passes' generated names never collide.
    pub fn var_count(&self) -> usize {
        self.name_gen.count()
    }

    /// Returns the canonical identifier linkage has already settled on
    /// `symbol`, minting and recording one (the symbol itself, at `id`
    /// 0) the first time this name is seen with linkage.
    fn linked_identifier(&mut self, symbol: Symbol) -> Identifier {
        *self
            .external_linkage
            .entry(symbol)
            .or_insert_with(|| Identifier::new(symbol, 0))
    }

    /// The canonical identifier for a label name, minted the first
    /// time this name is encountered (as either a `goto` or a label
    /// statement) in the current function.
    fn label_identifier(&mut self, symbol: Symbol) -> Identifier {
        *self
            .label_canonical
            .entry(symbol)
            .or_insert_with(|| Identifier::new(symbol, 0))
    }

    /// Checks every `goto` recorded so far in the current function
    /// against the labels actually declared.
    fn validate_gotos(&self) -> Result<(), ErrorType> {
        for (symbol, span) in &self.goto_refs {
            if !self.label_declared.contains_key(symbol) {
                return Err(ErrorType::UnresolvedGoto { span: *span });
            }
        }
        Ok(())
    }

    pub fn resolve_program(&mut self, program: Program) -> Result<Program, SemanticErr> {
        let declarations = program.into_parts();
        let mut ctx = ResolverContext::new();
        ctx.push_scope(); // file scope

        let mut resolved = Vec::with_capacity(declarations.len());
        for decl in declarations {
            resolved.push(
                self.resolve_global_declaration(decl, &mut ctx)
                    .map_err(|err| SemanticErr::new(err, self.source_map))?,
            );
        }

        ctx.pop_scope();
        Ok(Program::new(resolved))
    }

    fn resolve_block(
        &mut self,
        block: Block,
        ctx: &mut ResolverContext,
    ) -> Result<Block, ErrorType> {
        ctx.push_scope();
        let (items, span) = block.into_parts();
        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            resolved.push(self.resolve_block_item(item, ctx)?);
        }
        ctx.pop_scope();
        Ok(Block::new(resolved, span))
    }

    fn resolve_block_item(
        &mut self,
        item: BlockItem,
        ctx: &mut ResolverContext,
    ) -> Result<BlockItem, ErrorType> {
        Ok(match item {
            BlockItem::D(decl) => BlockItem::D(self.resolve_local_declaration(decl, ctx)?),
            BlockItem::S(stmt) => BlockItem::S(self.resolve_statement(stmt, ctx)?),
        })
    }
}
