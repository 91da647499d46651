use crate::type_interner::TypeID;
use crate::{Identifier, Span};
use std::collections::HashMap;

/// The closed family of C types this front-end understands.
///
/// `Int`, `Long`, `UInt`, `ULong` and `Double` are self-contained and
/// carry no payload; `Pointer`/`Array` recurse through the shared
/// [`crate::type_interner::TypeInterner`] via a `TypeID` handle rather
/// than a boxed `Type`, which keeps `Type` itself `Copy` — it is
/// threaded by value through every expression node during type
/// checking, and a `Box` in the enum would force a clone at every one
/// of those sites instead of a bitwise copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Long,
    UInt,
    ULong,
    Double,
    Pointer(TypeID),
    Array(TypeID),
}

impl Type {
    /// `Int`, `Long`, `UInt`, `ULong` or `Double`.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Type::Int | Type::Long | Type::UInt | Type::ULong | Type::Double
        )
    }

    /// Any of the four integer types.
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int | Type::Long | Type::UInt | Type::ULong)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    /// Arithmetic or pointer: valid as a condition in `if`/`while`/`for`/`?:`.
    pub fn is_scalar(&self) -> bool {
        self.is_arithmetic() || self.is_pointer()
    }

    /// `Int` and `Long` are signed; `UInt` and `ULong` are not.
    /// Only meaningful for integer types.
    pub fn is_signed(&self) -> bool {
        matches!(self, Type::Int | Type::Long)
    }

    /// Conversion rank among same-signedness integer types:
    /// `Int`/`UInt` rank below `Long`/`ULong`. Not meaningful outside
    /// the integer family.
    pub fn rank(&self) -> u8 {
        match self {
            Type::Int | Type::UInt => 0,
            Type::Long | Type::ULong => 1,
            Type::Double | Type::Pointer(_) | Type::Array(_) => {
                panic!("rank is only defined for integer types")
            }
        }
    }
}

/// What kind of entity an identifier in the symbol table names.
///
/// Kept distinct from `Type` (rather than folding a `FunType` variant
/// into it) because most consumers need to branch on "is this a
/// function or a scalar" without re-entering the type interner to
/// inspect a `TypeNode::Func`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Scalar(Type),
    Func(TypeID),
}

/// One compile-time constant belonging to a static initializer list.
///
/// `DoubleInit::bits` is `value.to_bits()`, carried alongside the
/// `f64` so code generation can emit the exact IEEE-754 bit pattern
/// without re-deriving it through host float formatting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StaticInit {
    IntInit(i32),
    LongInit(i64),
    UIntInit(u32),
    ULongInit(u64),
    DoubleInit { value: f64, bits: u64 },
    ZeroInit(u64),
}

impl StaticInit {
    pub fn double(value: f64) -> Self {
        StaticInit::DoubleInit {
            value,
            bits: value.to_bits(),
        }
    }
}

/// The initialization state of a file- or static-scoped variable.
#[derive(Debug, Clone, PartialEq)]
pub enum InitialValue {
    /// Declared without an initializer and without `extern`; becomes a
    /// zero-initialized definition if the translation unit never
    /// supplies an explicit one.
    Tentative,
    /// A definite initializer, already lowered to static-init constants.
    Initial(Vec<StaticInit>),
    /// `extern` declaration with no initializer: not a definition.
    NoInitializer,
}

impl InitialValue {
    pub fn is_constant(&self) -> bool {
        matches!(self, InitialValue::Initial(_))
    }
}

/// Metadata about an identifier beyond its type: linkage and, for
/// static-duration objects, their initializer state.
#[derive(Debug, Clone, PartialEq)]
pub enum IdenAttrs {
    /// `is_defined`: whether a body has been seen yet.
    /// `is_global`: whether the function has external linkage.
    FunAttrs { is_defined: bool, is_global: bool },
    /// `is_global`: whether the object has external linkage.
    StaticAttrs {
        is_global: bool,
        init: InitialValue,
    },
    /// An ordinary automatic-storage-duration variable; the type alone
    /// carries all the information callers need.
    LocalAttrs,
}

impl IdenAttrs {
    pub fn is_global(&self) -> bool {
        match self {
            IdenAttrs::FunAttrs { is_global, .. } => *is_global,
            IdenAttrs::StaticAttrs { is_global, .. } => *is_global,
            IdenAttrs::LocalAttrs => false,
        }
    }

    pub fn is_defined(&self) -> bool {
        match self {
            IdenAttrs::FunAttrs { is_defined, .. } => *is_defined,
            IdenAttrs::StaticAttrs { .. } => true,
            IdenAttrs::LocalAttrs => true,
        }
    }

    pub fn init_value(&self) -> Option<&InitialValue> {
        match self {
            IdenAttrs::StaticAttrs { init, .. } => Some(init),
            _ => None,
        }
    }
}

/// One entry in the symbol table: an identifier's type, its linkage /
/// storage attributes, and the span of the declaration that produced
/// the entry currently on record (used for "first declared here"
/// diagnostics on conflicting redeclarations).
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub entry_type: EntryType,
    pub attrs: IdenAttrs,
    pub span: Span,
}

/// Process-scoped mapping from canonical identifier to [`SymbolEntry`].
///
/// Written throughout the analysis pass and read both during the pass
/// (cross-referencing a use-site's type against its declaration) and
/// afterward, by the downstream stages this crate hands the table to.
pub struct SymbolTable {
    table: HashMap<Identifier, SymbolEntry>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a new, empty symbol table.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Inserts or replaces the entry for `name`.
    pub fn put(&mut self, name: Identifier, entry_type: EntryType, attrs: IdenAttrs, span: Span) {
        self.table.insert(
            name,
            SymbolEntry {
                entry_type,
                attrs,
                span,
            },
        );
    }

    /// Looks up the entry for `name`, if any.
    pub fn get(&self, name: Identifier) -> Option<&SymbolEntry> {
        self.table.get(&name)
    }

    pub fn contains(&self, name: Identifier) -> bool {
        self.table.contains_key(&name)
    }

    /// A reference to the backing map, for consumers (e.g. code
    /// generation) that need to iterate every symbol once analysis is
    /// complete.
    pub fn get_table_ref(&self) -> &HashMap<Identifier, SymbolEntry> {
        &self.table
    }
}
