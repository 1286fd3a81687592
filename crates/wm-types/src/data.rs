//! The arena payload (spec §3's type grammar) and the environments that map
//! names to schemes and ADT declarations.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::ids::{HoleId, TyVar, TypeId};

/// Why a [`TypeData::Unknown`] node exists. Drives how Layer-3 explains a
/// hole back to the user (spec §3's "Holes").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoleProvenance {
    /// An explicit `?` written by the user.
    ExplicitHole,
    /// A name that resolves to a binding the loader couldn't find (a missing
    /// or unresolved import).
    MissingImport,
    /// An effect row that is still under active inference — not yet closed.
    ActiveRowInference,
    /// Layer-2 reached a genuine conflict and fell back to a hole rather than
    /// report an unrecoverable type.
    PartialConflictFallback,
}

/// A node in the type arena. Compound variants hold [`TypeId`]s into the
/// same arena rather than nesting `Box<Type>` directly, per spec §5's
/// memory discipline.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeData {
    Unit,
    Int,
    Bool,
    Char,
    String,
    /// An unbound (or not-yet-resolved-to-root) unification variable.
    Var(TyVar),
    Func {
        from: TypeId,
        to: TypeId,
    },
    Tuple(Vec<TypeId>),
    /// Declared-order field map — iteration order is the invariant (spec
    /// §8's "Declared-order records").
    Record(IndexMap<String, TypeId>),
    Constructor {
        name: String,
        args: Vec<TypeId>,
    },
    Array {
        length: u32,
        element: TypeId,
    },
    /// A row-polymorphic effect set. `cases` maps an effect label to an
    /// optional payload type (`None` for a label with no carried value);
    /// `tail` is the open row variable, if any; `has_tail_wildcard` marks a
    /// row that absorbs any unmatched label without constraining it
    /// further (the discharge case, spec §9).
    EffectRow {
        cases: IndexMap<String, Option<TypeId>>,
        tail: Option<TypeId>,
        has_tail_wildcard: bool,
    },
    /// A hole: permissive during unification, resolved/classified later by
    /// the Layer-2 solver.
    Unknown {
        id: HoleId,
        provenance: HoleProvenance,
    },
}

/// A `forall`-quantified type (spec §3's "Schemes"). `quantifiers` names the
/// variables generalized over; `ty` is the (possibly still-containing-those-
/// variables) body.
#[derive(Clone, Debug, PartialEq)]
pub struct Scheme {
    pub quantifiers: Vec<TyVar>,
    pub ty: TypeId,
}

impl Scheme {
    #[must_use]
    pub fn monomorphic(ty: TypeId) -> Self {
        Scheme { quantifiers: Vec::new(), ty }
    }

    #[must_use]
    pub fn is_monomorphic(&self) -> bool {
        self.quantifiers.is_empty()
    }
}

/// One constructor of an ADT (spec §3's "Type declarations").
#[derive(Clone, Debug, PartialEq)]
pub struct ConstructorInfo {
    pub name: String,
    pub args: Vec<TypeId>,
}

/// What a declared type name resolves to: either a type alias, or an ADT
/// with one or more constructors, or an anonymous record shape.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeInfo {
    Alias { parameters: Vec<TyVar>, target: TypeId },
    Adt { parameters: Vec<TyVar>, constructors: Vec<ConstructorInfo> },
    Record { parameters: Vec<TyVar>, fields: IndexMap<String, TypeId> },
}

/// Lexically scoped name -> scheme bindings. Cloned wholesale at a module
/// boundary (spec §5's concurrency model: "the operator table and import
/// environment... are cloned at the module boundary"), so scopes are plain
/// owned maps rather than anything reference-counted.
#[derive(Clone, Debug, Default)]
pub struct ValueEnv {
    scopes: Vec<FxHashMap<String, Scheme>>,
}

impl ValueEnv {
    #[must_use]
    pub fn new() -> Self {
        ValueEnv { scopes: vec![FxHashMap::default()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn bind(&mut self, name: impl Into<String>, scheme: Scheme) {
        self.scopes
            .last_mut()
            .expect("ValueEnv always has at least one scope")
            .insert(name.into(), scheme);
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Scheme> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// All schemes currently in scope, innermost first — used to compute the
    /// environment's free variables when generalizing (spec §3's
    /// generalization rule).
    pub fn schemes(&self) -> impl Iterator<Item = &Scheme> {
        self.scopes.iter().rev().flat_map(|scope| scope.values())
    }
}

/// Name -> ADT/alias/record declaration map, seeded per module (spec §6).
#[derive(Clone, Debug, Default)]
pub struct TypeEnv {
    entries: FxHashMap<String, TypeInfo>,
}

impl TypeEnv {
    #[must_use]
    pub fn new() -> Self {
        TypeEnv::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, info: TypeInfo) {
        self.entries.insert(name.into(), info);
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&TypeInfo> {
        self.entries.get(name)
    }

    /// All declared type names and their info, for callers that need to scan
    /// (e.g. resolving a constructor name back to its declaring type).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeInfo)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge another module's exported type environment into this one,
    /// preferring `other`'s entries on name collision (mirrors
    /// [`wm_ast::OperatorTable::merge`]'s incoming-wins convention).
    pub fn merge(&mut self, other: TypeEnv) {
        self.entries.extend(other.entries);
    }
}
