use wm_types::{Scheme, TypeArena, ValueEnv};

#[test]
fn a_variable_free_in_the_body_and_absent_from_the_env_is_quantified() {
    let mut arena = TypeArena::new();
    let v = arena.fresh_var();
    let identity = arena.func(v, v);
    let env = ValueEnv::new();
    let scheme = arena.generalize(&env, identity);
    assert_eq!(scheme.quantifiers.len(), 1);
}

#[test]
fn a_variable_also_free_in_the_environment_is_not_quantified() {
    let mut arena = TypeArena::new();
    let v = arena.fresh_var();
    let mut env = ValueEnv::new();
    env.bind("x", Scheme::monomorphic(v));
    let identity = arena.func(v, v);
    let scheme = arena.generalize(&env, identity);
    assert!(scheme.quantifiers.is_empty());
}

#[test]
fn instantiating_a_polymorphic_scheme_twice_yields_independent_variables() {
    let mut arena = TypeArena::new();
    let v = arena.fresh_var();
    let identity = arena.func(v, v);
    let env = ValueEnv::new();
    let scheme = arena.generalize(&env, identity);

    let inst_a = arena.instantiate(&scheme);
    let inst_b = arena.instantiate(&scheme);

    let int = arena.int();
    let wm_types::TypeData::Func { from: from_a, .. } = arena.get(inst_a).clone() else {
        panic!("expected a function type");
    };
    arena.unify(from_a, int).unwrap();

    let bool_ = arena.bool();
    let wm_types::TypeData::Func { from: from_b, .. } = arena.get(inst_b).clone() else {
        panic!("expected a function type");
    };
    arena.unify(from_b, bool_).unwrap();

    assert_eq!(arena.substitute(from_a), int);
    assert_eq!(arena.substitute(from_b), bool_);
}

#[test]
fn a_monomorphic_scheme_has_no_quantifiers() {
    let mut arena = TypeArena::new();
    let int = arena.int();
    let scheme = Scheme::monomorphic(int);
    assert!(scheme.is_monomorphic());
    assert_eq!(arena.instantiate(&scheme), int);
}
