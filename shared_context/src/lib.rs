// Crate-level imports and re-exports
use crate::interner::Interner;
use crate::source_map::SourceMap;
use crate::symbol_table::SymbolTable;
use crate::type_interner::TypeInterner;
pub use bumpalo::Bump; // Memory arena used for efficient allocation
use interner::Symbol;

// Submodules
pub mod interner; // Deduplicates strings and creates Symbols
pub mod source_map; // Maps AST positions to source code positions
pub mod symbol_table; // Stores symbols, types, and their metadata
pub mod type_interner; // Canonicalizes function types behind a stable handle

pub use symbol_table::Type;

/// Global compiler context
/// Holds the state shared across all compiler stages
/// This includes the interner, symbol table, type interner and source map
pub struct CompilerContext<'a> {
    pub interner: Interner<'a>,         // For interning strings into Symbols
    pub source_map: SourceMap<'a>,      // Maps AST nodes to source positions
    pub symbol_table: SymbolTable,      // Tracks variable/function declarations
    pub type_interner: TypeInterner<'a>, // Canonicalizes function types
}

impl<'a> CompilerContext<'a> {
    /// Creates a new compiler context
    ///
    /// # Arguments
    /// - `arena`: Memory arena for allocations
    /// - `file_name`: Name of the source file
    /// - `source_code`: The source code itself
    pub fn new(arena: &'a Bump, file_name: &'a str, source_code: &'a str) -> Self {
        let interner = Interner::new(arena);
        let source_map = SourceMap::new(file_name, source_code);
        let symbol_table = SymbolTable::new();
        let type_interner = TypeInterner::new(arena);

        Self {
            interner,
            source_map,
            symbol_table,
            type_interner,
        }
    }
}

/// Represents a region in the source code
/// Used for error reporting and mapping AST nodes to positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize, // Starting byte offset in source
    pub end: usize,   // Ending byte offset in source
    pub line: usize,  // Line number in source
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 0,
        }
    }
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    /// returns a tuple (start, line)
    /// used in keeping track of the position during parsing
    pub fn get_start_and_line(&self) -> (usize, usize) {
        (self.start, self.line)
    }

    /// smallest span covering both `self` and `other`
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line,
        }
    }
}

/// Represents a unique identifier in the program
/// Interned via `Interner` for fast comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Identifier {
    symbol: Symbol, // Interned string representing the identifier name
    id: usize,      // Unique numeric ID for disambiguation
}

impl Identifier {
    pub fn new(symbol: Symbol, id: usize) -> Self {
        Self { symbol, id }
    }

    pub fn get_symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn get_id(&self) -> usize {
        self.id
    }

    pub fn into_parts(self) -> (Symbol, usize) {
        (self.symbol, self.id)
    }

    /// Renders `hint.k` for a minted name, or the bare spelling for one
    /// that was never disambiguated (`id == 0`, e.g. a function name,
    /// which only ever has one canonical spelling).
    pub fn render(&self, interner: &Interner) -> String {
        let spelling = interner.lookup(self.symbol);
        if self.id == 0 {
            spelling.to_string()
        } else {
            format!("{spelling}.{}", self.id)
        }
    }
}

impl Default for Identifier {
    fn default() -> Self {
        Self {
            symbol: Symbol(0),
            id: 0,
        }
    }
}

/// A combination of an identifier and its location in the source
/// Useful for precise error reporting and symbol tracking
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct SpannedIdentifier {
    identifier: Identifier, // The identifier itself
    span: Span,             // Location in source code
}

impl SpannedIdentifier {
    pub fn new(identifier: Identifier, span: Span) -> Self {
        Self { identifier, span }
    }

    pub fn get_identifier(&self) -> Identifier {
        self.identifier
    }

    pub fn get_span(&self) -> Span {
        self.span
    }

    pub fn into_parts(self) -> (Identifier, Span) {
        (self.identifier, self.span)
    }
}

/// Monotonic fresh-name generator.
///
/// Mints canonical identifiers `hint.k`, where `hint` is the interned
/// spelling the name is hinted by (the source label name for labels, a
/// stable per-declaration hint for variables) and `k` is a counter
/// private to one analysis run. Two fresh identifiers never compare
/// equal because `k` is part of `Identifier`'s structural equality, so
/// there is nothing for a textual separator to disambiguate in memory;
/// `k` is only rendered into a `hint.k` string at the point a later
/// stage needs one printable name (see `Identifier::render`).
pub struct NameGenerator {
    counter: usize,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self { counter: 1 }
    }

    pub fn with_start(counter: usize) -> Self {
        Self { counter }
    }

    /// Mint a fresh canonical identifier hinted by `hint`.
    pub fn fresh(&mut self, hint: Symbol) -> Identifier {
        let id = self.counter;
        self.counter += 1;
        Identifier::new(hint, id)
    }

    /// Number of names minted so far; downstream stages seed their own
    /// counters from this so two numberings never collide.
    pub fn count(&self) -> usize {
        self.counter
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new()
    }
}
