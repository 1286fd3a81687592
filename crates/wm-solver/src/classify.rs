//! Hole classification (spec §4.4's "Hole classification"): once the
//! fixpoint has settled, every [`wm_types::TypeData::Unknown`] hole the
//! arena saw constraints against is resolved to one of four states.

use rustc_hash::FxHashMap;
use wm_types::{HoleId, TypeArena, TypeId};

/// What became of a hole after the fixpoint loop settled.
#[derive(Clone, Debug, PartialEq)]
pub enum HoleState {
    /// Every observed constraint unified into one concrete representative.
    Solved(TypeId),
    /// Constraints narrowed the hole but it is still itself a `Var`/`Unknown`
    /// — not fully pinned down, but not contradictory either.
    Partial(TypeId),
    /// Two or more observed constraints could not be unified with each
    /// other. Carries every distinct constraint seen, substituted, for
    /// Layer-3 to report.
    Conflicted(Vec<TypeId>),
    /// No constraint was ever recorded against this hole.
    Unsolved,
}

/// Classifies every hole the arena recorded constraints for (spec §4.4).
/// Holes with no observed constraint are still included as `Unsolved` so
/// Layer-3 can report them without re-deriving the hole list.
pub fn classify_holes(arena: &mut TypeArena, holes: &[HoleId]) -> FxHashMap<HoleId, HoleState> {
    holes.iter().map(|&id| (id, classify_hole(arena, id))).collect()
}

fn classify_hole(arena: &mut TypeArena, hole: HoleId) -> HoleState {
    let constraints = arena.hole_constraints(hole).to_vec();
    if constraints.is_empty() {
        return HoleState::Unsolved;
    }

    let mut representative = constraints[0];
    let mut conflicted = false;
    for &candidate in &constraints[1..] {
        if arena.unify(representative, candidate).is_err() {
            conflicted = true;
        } else {
            representative = candidate;
        }
    }

    if conflicted {
        let substituted = constraints.iter().map(|&c| arena.substitute(c)).collect();
        return HoleState::Conflicted(substituted);
    }

    let resolved = arena.substitute(representative);
    if is_unresolved(arena, resolved) {
        HoleState::Partial(resolved)
    } else {
        HoleState::Solved(resolved)
    }
}

fn is_unresolved(arena: &TypeArena, id: TypeId) -> bool {
    matches!(arena.get(id), wm_types::TypeData::Unknown { .. } | wm_types::TypeData::Var(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_types::HoleProvenance;

    #[test]
    fn a_hole_with_no_recorded_constraint_is_unsolved() {
        let mut arena = TypeArena::new();
        let ty = arena.fresh_hole(HoleProvenance::ExplicitHole);
        let id = match arena.get(ty) {
            wm_types::TypeData::Unknown { id, .. } => *id,
            _ => unreachable!(),
        };
        let mut states = classify_holes(&mut arena, &[id]);
        assert_eq!(states.remove(&id), Some(HoleState::Unsolved));
    }

    #[test]
    fn a_hole_unified_against_one_concrete_type_is_solved() {
        let mut arena = TypeArena::new();
        let hole_ty = arena.fresh_hole(HoleProvenance::ExplicitHole);
        let int_ty = arena.int();
        arena.unify(hole_ty, int_ty).unwrap();
        let id = match arena.get(hole_ty) {
            wm_types::TypeData::Unknown { id, .. } => *id,
            _ => unreachable!(),
        };
        let mut states = classify_holes(&mut arena, &[id]);
        match states.remove(&id) {
            Some(HoleState::Solved(ty)) => assert_eq!(arena.get(ty), &wm_types::TypeData::Int),
            other => panic!("expected Solved, got {other:?}"),
        }
    }
}
