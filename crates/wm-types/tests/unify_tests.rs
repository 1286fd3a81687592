use wm_types::{HoleProvenance, TypeArena, UnifyError};

#[test]
fn identical_primitives_unify() {
    let mut arena = TypeArena::new();
    let a = arena.int();
    let b = arena.int();
    assert!(arena.unify(a, b).is_ok());
}

#[test]
fn mismatched_primitives_fail() {
    let mut arena = TypeArena::new();
    let a = arena.int();
    let b = arena.bool();
    assert_eq!(arena.unify(a, b), Err(UnifyError::TypeMismatch));
}

#[test]
fn unifying_a_var_with_a_concrete_type_binds_it() {
    let mut arena = TypeArena::new();
    let v = arena.fresh_var();
    let int = arena.int();
    arena.unify(v, int).unwrap();
    let resolved = arena.substitute(v);
    assert_eq!(resolved, arena.int());
}

#[test]
fn two_vars_unified_together_then_bound_share_a_resolution() {
    let mut arena = TypeArena::new();
    let v1 = arena.fresh_var();
    let v2 = arena.fresh_var();
    arena.unify(v1, v2).unwrap();
    let int = arena.int();
    arena.unify(v1, int).unwrap();
    assert_eq!(arena.substitute(v2), arena.int());
}

#[test]
fn occurs_check_rejects_a_self_referential_binding() {
    let mut arena = TypeArena::new();
    let v = arena.fresh_var();
    let int = arena.int();
    let wrapped = arena.tuple(vec![int, v]);
    assert_eq!(arena.unify(v, wrapped), Err(UnifyError::OccursCycle));
}

#[test]
fn function_types_unify_structurally() {
    let mut arena = TypeArena::new();
    let int = arena.int();
    let bool_ = arena.bool();
    let f1 = arena.func(int, bool_);
    let v1 = arena.fresh_var();
    let v2 = arena.fresh_var();
    let f2 = arena.func(v1, v2);
    arena.unify(f1, f2).unwrap();
    assert_eq!(arena.substitute(v1), int);
    assert_eq!(arena.substitute(v2), bool_);
}

#[test]
fn tuple_arity_mismatch_is_reported() {
    let mut arena = TypeArena::new();
    let int = arena.int();
    let a = arena.tuple(vec![int, int]);
    let b = arena.tuple(vec![int]);
    assert_eq!(arena.unify(a, b), Err(UnifyError::ArityMismatch { expected: 2, found: 1 }));
}

#[test]
fn constructor_name_mismatch_is_reported_as_arity_mismatch() {
    let mut arena = TypeArena::new();
    let a = arena.constructor("Some", vec![]);
    let b = arena.constructor("None", vec![]);
    assert_eq!(arena.unify(a, b), Err(UnifyError::ArityMismatch { expected: 0, found: 0 }));
}

#[test]
fn record_with_a_missing_field_is_reported() {
    let mut arena = TypeArena::new();
    let int = arena.int();
    let mut fa = indexmap::IndexMap::new();
    fa.insert("x".to_string(), int);
    fa.insert("y".to_string(), int);
    let a = arena.record(fa);

    let mut fb = indexmap::IndexMap::new();
    fb.insert("x".to_string(), int);
    let b = arena.record(fb);

    assert_eq!(arena.unify(a, b), Err(UnifyError::MissingField { field: "y".to_string() }));
}

#[test]
fn unifying_against_a_hole_always_succeeds_and_is_recorded() {
    let mut arena = TypeArena::new();
    let hole = arena.fresh_hole(HoleProvenance::ExplicitHole);
    let int = arena.int();
    arena.unify(hole, int).unwrap();
    let wm_types::TypeData::Unknown { id, .. } = arena.get(hole).clone() else {
        panic!("expected a hole");
    };
    assert_eq!(arena.hole_constraints(id), &[int]);
}

#[test]
fn substitution_is_idempotent() {
    let mut arena = TypeArena::new();
    let v = arena.fresh_var();
    let int = arena.int();
    arena.unify(v, int).unwrap();
    let once = arena.substitute(v);
    let twice = arena.substitute(once);
    assert_eq!(once, twice);
}
