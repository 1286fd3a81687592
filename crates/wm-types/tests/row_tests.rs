use indexmap::IndexMap;
use wm_types::{TypeArena, UnifyError};

fn row(
    arena: &mut TypeArena,
    cases: &[(&str, Option<wm_types::TypeId>)],
    tail: Option<wm_types::TypeId>,
    wildcard: bool,
) -> wm_types::TypeId {
    let map: IndexMap<String, Option<wm_types::TypeId>> =
        cases.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    arena.effect_row(map, tail, wildcard)
}

#[test]
fn identical_closed_rows_unify() {
    let mut arena = TypeArena::new();
    let int = arena.int();
    let a = row(&mut arena, &[("Throw", Some(int))], None, false);
    let b = row(&mut arena, &[("Throw", Some(int))], None, false);
    assert!(arena.unify(a, b).is_ok());
}

#[test]
fn closed_rows_with_different_labels_conflict() {
    let mut arena = TypeArena::new();
    let a = row(&mut arena, &[("Throw", None)], None, false);
    let b = row(&mut arena, &[("Log", None)], None, false);
    assert_eq!(arena.unify(a, b), Err(UnifyError::TypeMismatch));
}

#[test]
fn an_open_tail_absorbs_a_label_missing_from_the_other_side() {
    let mut arena = TypeArena::new();
    let tail_var = arena.fresh_var();
    let a = row(&mut arena, &[("Throw", None)], None, false);
    let b = row(&mut arena, &[], Some(tail_var), false);
    assert!(arena.unify(a, b).is_ok());
}

#[test]
fn a_tail_wildcard_absorbs_any_unmatched_label() {
    let mut arena = TypeArena::new();
    let a = row(&mut arena, &[("Throw", None), ("Log", None)], None, true);
    let b = row(&mut arena, &[("Throw", None)], None, false);
    assert!(arena.unify(a, b).is_ok());
}

#[test]
fn mismatched_payload_types_for_a_shared_label_conflict() {
    let mut arena = TypeArena::new();
    let int = arena.int();
    let bool_ = arena.bool();
    let a = row(&mut arena, &[("Throw", Some(int))], None, false);
    let b = row(&mut arena, &[("Throw", Some(bool_))], None, false);
    assert_eq!(arena.unify(a, b), Err(UnifyError::TypeMismatch));
}

#[test]
fn closed_row_missing_a_label_with_no_tail_conflicts() {
    let mut arena = TypeArena::new();
    let a = row(&mut arena, &[("Throw", None)], None, false);
    let b = row(&mut arena, &[], None, false);
    assert_eq!(arena.unify(a, b), Err(UnifyError::TypeMismatch));
}
