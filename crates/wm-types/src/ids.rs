//! Identity newtypes for the type arena (spec §5's "Memory discipline").

use ena::unify::{UnifyKey, UnifyValue};

/// An index into the [`crate::arena::TypeArena`]. The preferred
/// implementation strategy from spec §5: every `Type` — compound or
/// variable — lives in the arena, and substitution is a `TypeId → TypeId`
/// relation rather than a structural rewrite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub(crate) u32);

/// The union-find key for a monotype unification variable (`Type::Var` in
/// spec §3). Implements `ena::unify::UnifyKey` so the arena's unifier can
/// reuse `ena`'s union-find table directly, the same way the wider
/// Hindley-Milner corpus in this workspace's reference pack does (see
/// `mesh-typeck`'s `InferCtx`, grounded in `ena::unify::InPlaceUnificationTable`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TyVar(pub(crate) u32);

/// `ena`'s `UnifyValue` can't be implemented directly on `Option<TypeId>`
/// (orphan rules — both are foreign to this crate), so it wraps in a local
/// newtype. `None` means "still an unbound variable"; `Some(t)` means the
/// variable's equivalence class has been bound to the type at `t`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VarValue(pub Option<TypeId>);

impl UnifyValue for VarValue {
    type Error = ena::unify::NoError;

    /// Invoked by `ena` when two variables in different equivalence classes
    /// are unioned. The caller (`TypeArena::bind_var`) only unions two
    /// variables once it has confirmed both are still unbound, so in
    /// practice this always resolves `(None, None) -> None`; the `Some`
    /// arms exist for robustness, not because the arena relies on them to
    /// merge two *different* bound types (that merge happens through a
    /// real `unify` call instead).
    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        Ok(match (a.0, b.0) {
            (Some(t), _) => VarValue(Some(t)),
            (None, Some(t)) => VarValue(Some(t)),
            (None, None) => VarValue(None),
        })
    }
}

impl UnifyKey for TyVar {
    type Value = VarValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

/// Identifies an [`crate::data::HoleProvenance`]-tagged unfilled type (spec
/// §3's "Holes"). Stable across Layer-1 → Layer-2 → Layer-3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HoleId(pub u32);
