use crate::symbol_table::Type;
use bumpalo::Bump;
use std::collections::HashMap;

/// A unique handle for an interned compound type (pointer, array or
/// function). Equality between two compound types reduces to comparing
/// these IDs directly, without walking the referenced type graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeID(u32);

/// The shape behind one `TypeID`.
///
/// `Int`/`Long`/`UInt`/`ULong`/`Double` carry no payload and so need no
/// handle — `Type` stores them inline. `Pointer`/`Array`/`Func` recurse
/// through other `Type`s, and since `Type` itself must stay `Copy` (it
/// is threaded through the AST by value at every expression node), the
/// recursive edges are interned here instead of boxed: a pointer-to-T
/// or array-of-T is a small struct living in the arena, referenced by
/// a `u32` handle that's cheap to copy and cheap to compare.
#[derive(Debug, PartialEq, Eq, Hash)]
pub enum TypeNode<'a> {
    Pointer(Type),
    Array { size: u64, elem: Type },
    Func { ret: Type, params: &'a [Type] },
}

/// Canonicalizes every compound type seen during one analysis run.
///
/// Structurally identical shapes share one `TypeID`, giving O(1)
/// equality for `Pointer`/`Array`/`Func` types the same way plain
/// scalar types get it for free from deriving `PartialEq`. This is the
/// interning arena the repository's type system had previously built
/// only for function types (`FuncTypeId`); it is generalized here to
/// every recursive `Type` shape since pointers and arrays recurse the
/// same way function types do.
pub struct TypeInterner<'a> {
    arena: &'a Bump,
    map: HashMap<&'a TypeNode<'a>, TypeID>,
    nodes: Vec<&'a TypeNode<'a>>,
}

impl<'a> TypeInterner<'a> {
    /// Creates a new, empty type interner using the given arena.
    pub fn new(arena: &'a Bump) -> Self {
        Self {
            arena,
            map: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    fn intern_node(&mut self, node: TypeNode<'a>) -> TypeID {
        if let Some(&id) = self.map.get(&node) {
            return id;
        }
        let allocated: &'a TypeNode<'a> = self.arena.alloc(node);
        let id = TypeID(self.nodes.len() as u32);
        self.nodes.push(allocated);
        self.map.insert(allocated, id);
        id
    }

    /// Interns `Pointer(ref_type)`.
    pub fn intern_pointer(&mut self, ref_type: Type) -> TypeID {
        self.intern_node(TypeNode::Pointer(ref_type))
    }

    /// Interns `Array(size, elem)`.
    pub fn intern_array(&mut self, size: u64, elem: Type) -> TypeID {
        self.intern_node(TypeNode::Array { size, elem })
    }

    /// Interns a function type composed of `ret` and `params`.
    ///
    /// `params` is copied into the arena so the returned `TypeID`
    /// borrows no caller-owned memory.
    pub fn intern_function(&mut self, ret: Type, params: &[Type]) -> TypeID {
        let params_copy: &'a [Type] = self.arena.alloc_slice_copy(params);
        self.intern_node(TypeNode::Func {
            ret,
            params: params_copy,
        })
    }

    /// Retrieves the canonical [`TypeNode`] corresponding to `id`.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this interner. Every `TypeID`
    /// reachable from the AST was minted by exactly the `TypeInterner`
    /// threaded through the current analysis run, so a mismatch here
    /// is an internal bug, not a user-facing condition.
    pub fn get(&self, id: TypeID) -> &'a TypeNode<'a> {
        self.nodes[id.0 as usize]
    }
}
